//! Context processing
//!
//! Local contexts are turned into new active contexts here. The processor is
//! pure with respect to I/O: a remote context that is not cached yet makes
//! processing stop with [`Interrupt::Suspend`]; the caller fetches the
//! document, hands it to [`ContextProcessor::insert_document`] and runs the
//! same processing step again.

use indexmap::IndexMap;
use lru::LruCache;
use rustc_hash::FxHashMap;
use serde_json::{Map, Value};
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::{debug, warn};

use super::context::{ContainerMapping, Context, Direction, TermDefinition};
use super::error::{fail, Interrupt, JsonLdErrorCode as Code, Step};
use super::iri::{
    ends_with_gen_delim, has_scheme, is_absolute_iri, is_blank_node_label, is_keyword,
    looks_like_keyword, resolve_iri,
};
use super::loader::RemoteDocument;
use super::options::{ParserOptions, ProcessingMode};

/// Context keys that are not term definitions
const CONTEXT_KEYWORDS: &[&str] = &[
    "@base",
    "@direction",
    "@import",
    "@language",
    "@propagate",
    "@protected",
    "@version",
    "@vocab",
];

const TERM_DEFINITION_KEYS: &[&str] = &[
    "@id",
    "@reverse",
    "@container",
    "@context",
    "@direction",
    "@index",
    "@language",
    "@nest",
    "@prefix",
    "@protected",
    "@type",
];

/// URL a context reference loads from; `None` when it is relative and there is no base
pub(crate) fn context_url(base_url: Option<&str>, reference: &str) -> Option<String> {
    match base_url {
        Some(base) => resolve_iri(base, reference),
        None if is_absolute_iri(reference) => Some(reference.to_owned()),
        None => None,
    }
}

pub(crate) struct ContextProcessor {
    cache: LruCache<String, Arc<RemoteDocument>>,
    /// Documents delivered for the step currently being retried; never evicted mid-step
    pinned: FxHashMap<String, Arc<RemoteDocument>>,
    max_recursion: usize,
    normalize_language_tags: bool,
    mode: ProcessingMode,
}

impl ContextProcessor {
    pub fn new(options: &ParserOptions) -> Self {
        let capacity = NonZeroUsize::new(options.remote_context_cache_size.max(1))
            .unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: LruCache::new(capacity),
            pinned: FxHashMap::default(),
            max_recursion: options.max_context_recursion,
            normalize_language_tags: options.normalize_language_tags,
            mode: options.processing_mode,
        }
    }

    pub fn insert_document(&mut self, url: &str, document: RemoteDocument) {
        let document = Arc::new(document);
        self.pinned.insert(url.to_owned(), document.clone());
        self.cache.put(url.to_owned(), document);
    }

    pub fn is_cached(&self, url: &str) -> bool {
        self.pinned.contains_key(url) || self.cache.contains(url)
    }

    /// Forget the documents pinned for the last suspended step
    pub fn unpin(&mut self) {
        self.pinned.clear();
    }

    fn remote(&mut self, url: &str) -> Step<Arc<RemoteDocument>> {
        if let Some(document) = self.pinned.get(url) {
            return Ok(document.clone());
        }
        if let Some(document) = self.cache.get(url) {
            debug!(url, "remote context cache hit");
            return Ok(document.clone());
        }
        Err(Interrupt::Suspend(url.to_owned()))
    }

    /// Process `local` on top of `active`
    pub fn process(
        &mut self,
        active: &Arc<Context>,
        local: &Value,
        base_url: Option<&str>,
        override_protected: bool,
        propagate: bool,
    ) -> Step<Arc<Context>> {
        let mut remote_contexts = Vec::new();
        self.process_with(
            active,
            local,
            base_url,
            &mut remote_contexts,
            override_protected,
            propagate,
            true,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn process_with(
        &mut self,
        active: &Arc<Context>,
        local: &Value,
        base_url: Option<&str>,
        remote_contexts: &mut Vec<String>,
        override_protected: bool,
        mut propagate: bool,
        validate_scoped: bool,
    ) -> Step<Arc<Context>> {
        let mut result: Context = (**active).clone();
        if let Value::Object(map) = local {
            if let Some(value) = map.get("@propagate") {
                match value.as_bool() {
                    Some(b) => propagate = b,
                    None => return fail(Code::InvalidPropagateValue, "@propagate must be a boolean"),
                }
            }
        }
        if !propagate && result.previous.is_none() {
            result.previous = Some(active.clone());
        }

        let contexts: Vec<&Value> = match local {
            Value::Array(items) => items.iter().collect(),
            other => vec![other],
        };
        for context in contexts {
            match context {
                Value::Null => {
                    if !override_protected && result.has_protected_terms() {
                        return fail(
                            Code::InvalidContextNullification,
                            "cannot nullify a context containing protected terms",
                        );
                    }
                    let previous = result.previous.take();
                    result = Context::new(active.original_base.clone(), self.mode);
                    if !propagate {
                        result.previous = previous;
                    }
                }
                Value::String(reference) => {
                    let Some(url) = context_url(base_url, reference) else {
                        return fail(
                            Code::LoadingDocumentFailed,
                            format!("cannot resolve context reference '{}'", reference),
                        );
                    };
                    if !validate_scoped && remote_contexts.contains(&url) {
                        continue;
                    }
                    if remote_contexts.len() >= self.max_recursion {
                        return fail(
                            Code::ContextOverflow,
                            format!("too many nested remote contexts loading '{}'", url),
                        );
                    }
                    let document = self.remote(&url)?;
                    let Some(nested) = document.document.as_object().and_then(|o| o.get("@context")) else {
                        return fail(
                            Code::InvalidRemoteContext,
                            format!("'{}' has no top-level @context", url),
                        );
                    };
                    remote_contexts.push(url);
                    let current = Arc::new(result);
                    let processed = self.process_with(
                        &current,
                        nested,
                        Some(&document.document_url),
                        remote_contexts,
                        false,
                        true,
                        validate_scoped,
                    );
                    remote_contexts.pop();
                    result = (*processed?).clone();
                }
                Value::Object(map) => {
                    self.process_object(
                        &mut result,
                        map,
                        base_url,
                        remote_contexts,
                        override_protected,
                    )?;
                }
                _ => return fail(Code::InvalidLocalContext, "a context must be an object, a string or null"),
            }
        }
        Ok(Arc::new(result))
    }

    fn process_object(
        &mut self,
        result: &mut Context,
        map: &Map<String, Value>,
        base_url: Option<&str>,
        remote_contexts: &mut Vec<String>,
        override_protected: bool,
    ) -> Step<()> {
        if let Some(version) = map.get("@version") {
            if version.as_f64() != Some(1.1) {
                return fail(Code::InvalidVersionValue, format!("unsupported @version {}", version));
            }
            if self.mode == ProcessingMode::JsonLd10 {
                return fail(Code::ProcessingModeConflict, "@version 1.1 in json-ld-1.0 mode");
            }
        }

        let imported;
        let map = match map.get("@import") {
            None => map,
            Some(import) => {
                if self.mode == ProcessingMode::JsonLd10 {
                    return fail(Code::InvalidContextEntry, "@import requires json-ld-1.1");
                }
                let Some(reference) = import.as_str() else {
                    return fail(Code::InvalidImportValue, "@import must be a string");
                };
                let Some(url) = context_url(base_url, reference) else {
                    return fail(Code::InvalidImportValue, format!("cannot resolve '{}'", reference));
                };
                let document = self.remote(&url)?;
                let Some(Value::Object(import_map)) =
                    document.document.as_object().and_then(|o| o.get("@context"))
                else {
                    return fail(Code::InvalidRemoteContext, format!("'{}' has no @context object", url));
                };
                if import_map.contains_key("@import") {
                    return fail(Code::InvalidContextEntry, "imported context must not contain @import");
                }
                let mut merged = import_map.clone();
                for (k, v) in map {
                    if k != "@import" {
                        merged.insert(k.clone(), v.clone());
                    }
                }
                imported = merged;
                &imported
            }
        };

        if let Some(base) = map.get("@base") {
            if remote_contexts.is_empty() {
                match base {
                    Value::Null => result.base = None,
                    Value::String(iri) if is_absolute_iri(iri) => result.base = Some(iri.clone()),
                    Value::String(iri) => match result.base.as_deref().and_then(|b| resolve_iri(b, iri)) {
                        Some(resolved) => result.base = Some(resolved),
                        None => {
                            return fail(Code::InvalidBaseIri, format!("cannot resolve @base '{}'", iri))
                        }
                    },
                    _ => return fail(Code::InvalidBaseIri, "@base must be a string or null"),
                }
            }
        }

        if let Some(vocab) = map.get("@vocab") {
            match vocab {
                Value::Null => result.vocab = None,
                Value::String(v) => {
                    let expanded = if self.mode == ProcessingMode::JsonLd10 {
                        Some(v.clone())
                    } else {
                        result.expand_iri(v, true, true)
                    };
                    match expanded {
                        Some(iri) if has_scheme(&iri) || is_blank_node_label(&iri) => {
                            result.vocab = Some(iri)
                        }
                        _ => {
                            return fail(
                                Code::InvalidVocabMapping,
                                format!("@vocab '{}' is not an IRI", v),
                            )
                        }
                    }
                }
                _ => return fail(Code::InvalidVocabMapping, "@vocab must be a string or null"),
            }
        }

        if let Some(language) = map.get("@language") {
            match language {
                Value::Null => result.language = None,
                Value::String(tag) => result.language = Some(self.language_tag(tag)),
                _ => return fail(Code::InvalidDefaultLanguage, "@language must be a string or null"),
            }
        }

        if let Some(direction) = map.get("@direction") {
            if self.mode == ProcessingMode::JsonLd10 {
                return fail(Code::InvalidContextEntry, "@direction requires json-ld-1.1");
            }
            match direction {
                Value::Null => result.direction = None,
                Value::String(d) => match Direction::parse(d) {
                    Some(d) => result.direction = Some(d),
                    None => return fail(Code::InvalidBaseDirection, format!("invalid @direction '{}'", d)),
                },
                _ => return fail(Code::InvalidBaseDirection, "@direction must be a string or null"),
            }
        }

        if map.contains_key("@propagate") && self.mode == ProcessingMode::JsonLd10 {
            return fail(Code::InvalidContextEntry, "@propagate requires json-ld-1.1");
        }

        let protected = match map.get("@protected") {
            None => false,
            Some(Value::Bool(b)) => *b,
            Some(_) => return fail(Code::InvalidProtectedValue, "@protected must be a boolean"),
        };

        // Collect raw definitions first; the builder resolves dependencies between them
        let mut builder = TermBuilder {
            processor: self,
            result,
            local: map,
            defined: IndexMap::new(),
            base_url,
            protected,
            override_protected,
            remote_contexts,
        };
        let worklist: Vec<&String> = map
            .keys()
            .filter(|k| !CONTEXT_KEYWORDS.contains(&k.as_str()))
            .collect();
        for term in worklist {
            builder.define(term)?;
        }
        Ok(())
    }

    fn language_tag(&self, tag: &str) -> String {
        if self.normalize_language_tags {
            tag.to_ascii_lowercase()
        } else {
            tag.to_owned()
        }
    }
}

/// Builds the term definitions of one local context object
struct TermBuilder<'a> {
    processor: &'a mut ContextProcessor,
    result: &'a mut Context,
    local: &'a Map<String, Value>,
    /// `false` while a definition is in progress, `true` once done
    defined: IndexMap<String, bool>,
    base_url: Option<&'a str>,
    protected: bool,
    override_protected: bool,
    remote_contexts: &'a mut Vec<String>,
}

impl TermBuilder<'_> {
    fn mode(&self) -> ProcessingMode {
        self.processor.mode
    }

    /// IRI expansion that first defines terms of the local context it depends on
    fn expand(&mut self, value: &str, document_relative: bool, vocab: bool) -> Step<Option<String>> {
        if is_keyword(value) {
            return Ok(Some(value.to_owned()));
        }
        if looks_like_keyword(value) {
            return Ok(None);
        }
        if self.local.contains_key(value) && self.defined.get(value) != Some(&true) {
            self.define(value)?;
        }
        if let Some(colon) = value.find(':').filter(|&i| i > 0) {
            let prefix = &value[..colon];
            if self.local.contains_key(prefix) && self.defined.get(prefix) != Some(&true) {
                self.define(prefix)?;
            }
        }
        Ok(self.result.expand_iri(value, document_relative, vocab))
    }

    fn define(&mut self, term: &str) -> Step<()> {
        match self.defined.get(term) {
            Some(true) => return Ok(()),
            Some(false) => {
                return fail(Code::CyclicIriMapping, format!("term '{}' depends on itself", term))
            }
            None => {}
        }
        if term.is_empty() {
            return fail(Code::InvalidTermDefinition, "empty term");
        }
        self.defined.insert(term.to_owned(), false);
        let value = self.local.get(term).cloned().unwrap_or(Value::Null);

        if term == "@type" {
            let valid = self.mode() == ProcessingMode::JsonLd11
                && value.as_object().map_or(false, |m| {
                    !m.is_empty()
                        && m.iter().all(|(k, v)| match k.as_str() {
                            "@container" => v == "@set",
                            "@protected" => v.is_boolean(),
                            _ => false,
                        })
                });
            if !valid {
                return fail(Code::KeywordRedefinition, "@type may only set @container: @set and @protected");
            }
        } else if is_keyword(term) {
            return fail(Code::KeywordRedefinition, format!("cannot redefine keyword {}", term));
        } else if looks_like_keyword(term) {
            warn!(term, "ignoring term that looks like a keyword");
            self.defined.insert(term.to_owned(), true);
            return Ok(());
        }

        let previous = self.result.terms.remove(term);
        let (map, simple_term) = match value {
            Value::Null => {
                let mut m = Map::new();
                m.insert("@id".to_owned(), Value::Null);
                (m, false)
            }
            Value::String(s) => {
                let mut m = Map::new();
                m.insert("@id".to_owned(), Value::String(s));
                (m, true)
            }
            Value::Object(m) => (m, false),
            _ => {
                return fail(
                    Code::InvalidTermDefinition,
                    format!("definition of '{}' must be a string, an object or null", term),
                )
            }
        };

        let mut def = TermDefinition::default();
        def.protected = match map.get("@protected") {
            None => self.protected,
            Some(_) if self.mode() == ProcessingMode::JsonLd10 => {
                return fail(Code::InvalidTermDefinition, "@protected requires json-ld-1.1")
            }
            Some(Value::Bool(b)) => *b,
            Some(_) => return fail(Code::InvalidProtectedValue, "@protected must be a boolean"),
        };

        if let Some(type_mapping) = map.get("@type") {
            let Some(raw) = type_mapping.as_str() else {
                return fail(Code::InvalidTypeMapping, format!("@type of '{}' must be a string", term));
            };
            let expanded = self.expand(raw, false, true)?;
            let valid = match expanded.as_deref() {
                Some("@id") | Some("@vocab") => true,
                Some("@json") | Some("@none") => self.mode() == ProcessingMode::JsonLd11,
                Some(iri) => is_absolute_iri(iri),
                None => false,
            };
            if !valid {
                return fail(Code::InvalidTypeMapping, format!("invalid @type '{}' for '{}'", raw, term));
            }
            def.type_mapping = expanded;
        }

        if let Some(reverse) = map.get("@reverse") {
            if map.contains_key("@id") || map.contains_key("@nest") {
                return fail(Code::InvalidReverseProperty, format!("'{}' mixes @reverse with @id or @nest", term));
            }
            let Some(raw) = reverse.as_str() else {
                return fail(Code::InvalidIriMapping, "@reverse must be a string");
            };
            if looks_like_keyword(raw) {
                warn!(term, value = raw, "ignoring @reverse that looks like a keyword");
                self.defined.insert(term.to_owned(), true);
                return Ok(());
            }
            match self.expand(raw, false, true)? {
                Some(iri) if iri.contains(':') && !is_keyword(&iri) => def.iri = Some(iri),
                _ => return fail(Code::InvalidIriMapping, format!("invalid @reverse '{}'", raw)),
            }
            if let Some(container) = map.get("@container") {
                match container {
                    Value::Null => {}
                    Value::String(c) if c == "@set" => def.container.insert(ContainerMapping::SET),
                    Value::String(c) if c == "@index" => def.container.insert(ContainerMapping::INDEX),
                    _ => {
                        return fail(
                            Code::InvalidReverseProperty,
                            "reverse properties only support @set and @index containers",
                        )
                    }
                }
            }
            def.reverse = true;
            self.result.terms.insert(term.to_owned(), Arc::new(def));
            self.defined.insert(term.to_owned(), true);
            return Ok(());
        }

        let id = map.get("@id").filter(|id| id.as_str() != Some(term));
        if let Some(id) = id {
            match id {
                Value::Null => def.iri = None,
                Value::String(raw) => {
                    if !is_keyword(raw) && looks_like_keyword(raw) {
                        warn!(term, value = raw.as_str(), "ignoring @id that looks like a keyword");
                        self.defined.insert(term.to_owned(), true);
                        return Ok(());
                    }
                    let expanded = match self.expand(raw, false, true)? {
                        Some(iri) if is_keyword(&iri) || iri.contains(':') => iri,
                        _ => return fail(Code::InvalidIriMapping, format!("'{}' does not map to an IRI", term)),
                    };
                    if expanded == "@context" {
                        return fail(Code::InvalidKeywordAlias, "@context cannot be aliased");
                    }
                    let inner = term.get(1..term.len().saturating_sub(1)).unwrap_or("");
                    if inner.contains(':') || term.contains('/') {
                        self.defined.insert(term.to_owned(), true);
                        if self.expand(term, false, true)?.as_deref() != Some(expanded.as_str()) {
                            return fail(
                                Code::InvalidIriMapping,
                                format!("term '{}' looks like an IRI but maps elsewhere", term),
                            );
                        }
                    }
                    if !term.contains(':')
                        && !term.contains('/')
                        && simple_term
                        && (ends_with_gen_delim(&expanded) || is_blank_node_label(&expanded))
                    {
                        def.prefix = true;
                    }
                    def.iri = Some(expanded);
                }
                _ => return fail(Code::InvalidIriMapping, format!("@id of '{}' must be a string", term)),
            }
        } else if let Some(colon) = term.find(':').filter(|&i| i > 0) {
            let (prefix, suffix) = (&term[..colon], &term[colon + 1..]);
            if self.local.contains_key(prefix) {
                self.define(prefix)?;
            }
            def.iri = match self.result.terms.get(prefix).and_then(|d| d.iri.clone()) {
                Some(iri) if !suffix.starts_with("//") => Some(format!("{}{}", iri, suffix)),
                _ => Some(term.to_owned()),
            };
        } else if term.contains('/') {
            match self.expand(term, false, true)? {
                Some(iri) if has_scheme(&iri) => def.iri = Some(iri),
                _ => return fail(Code::InvalidIriMapping, format!("'{}' is not an IRI", term)),
            }
        } else if term == "@type" {
            def.iri = Some("@type".to_owned());
        } else {
            match &self.result.vocab {
                Some(vocab) => def.iri = Some(format!("{}{}", vocab, term)),
                None => {
                    return fail(
                        Code::InvalidIriMapping,
                        format!("'{}' has no IRI mapping and there is no @vocab", term),
                    )
                }
            }
        }

        if let Some(container) = map.get("@container") {
            let values: Vec<&Value> = match container {
                Value::Array(items) if self.mode() == ProcessingMode::JsonLd11 => items.iter().collect(),
                other => vec![other],
            };
            for value in values {
                match value.as_str().and_then(ContainerMapping::flag) {
                    Some(flag) => def.container.insert(flag),
                    None => {
                        return fail(
                            Code::InvalidContainerMapping,
                            format!("invalid @container {} for '{}'", container, term),
                        )
                    }
                }
            }
            if !def.container.is_valid(self.mode()) {
                return fail(
                    Code::InvalidContainerMapping,
                    format!("invalid @container combination {} for '{}'", container, term),
                );
            }
            if def.container.has(ContainerMapping::TYPE) {
                match def.type_mapping.as_deref() {
                    None => def.type_mapping = Some("@id".to_owned()),
                    Some("@id") | Some("@vocab") => {}
                    Some(_) => {
                        return fail(Code::InvalidTypeMapping, "@type containers need @id or @vocab typing")
                    }
                }
            }
        }

        if let Some(index) = map.get("@index") {
            if self.mode() == ProcessingMode::JsonLd10 || !def.container.has(ContainerMapping::INDEX) {
                return fail(Code::InvalidTermDefinition, "@index needs an @index container");
            }
            let Some(raw) = index.as_str() else {
                return fail(Code::InvalidTermDefinition, "@index must be a string");
            };
            match self.expand(raw, false, true)? {
                Some(iri) if is_absolute_iri(&iri) => def.index = Some(raw.to_owned()),
                _ => return fail(Code::InvalidTermDefinition, format!("@index '{}' is not an IRI", raw)),
            }
        }

        if let Some(scoped) = map.get("@context") {
            if self.mode() == ProcessingMode::JsonLd10 {
                return fail(Code::InvalidTermDefinition, "scoped contexts require json-ld-1.1");
            }
            let snapshot = Arc::new(self.result.clone());
            let checked = self.processor.process_with(
                &snapshot,
                scoped,
                self.base_url,
                self.remote_contexts,
                true,
                true,
                false,
            );
            match checked {
                Ok(_) => {}
                Err(Interrupt::Suspend(url)) => return Err(Interrupt::Suspend(url)),
                Err(Interrupt::Fail(e)) => {
                    return fail(
                        Code::InvalidScopedContext,
                        format!("scoped context of '{}': {}", term, e),
                    )
                }
            }
            def.context = Some(scoped.clone());
            def.base_url = self.base_url.map(str::to_owned);
        }

        if !map.contains_key("@type") {
            if let Some(language) = map.get("@language") {
                def.language = match language {
                    Value::Null => Some(None),
                    Value::String(tag) => Some(Some(self.processor.language_tag(tag))),
                    _ => return fail(Code::InvalidLanguageMapping, format!("invalid @language for '{}'", term)),
                };
            }
            if let Some(direction) = map.get("@direction") {
                def.direction = match direction {
                    Value::Null => Some(None),
                    Value::String(d) if Direction::parse(d).is_some() => Some(Direction::parse(d)),
                    _ => return fail(Code::InvalidBaseDirection, format!("invalid @direction for '{}'", term)),
                };
            }
        }

        if let Some(nest) = map.get("@nest") {
            if self.mode() == ProcessingMode::JsonLd10 {
                return fail(Code::InvalidTermDefinition, "@nest requires json-ld-1.1");
            }
            match nest.as_str() {
                Some(n) if !is_keyword(n) || n == "@nest" => def.nest = Some(n.to_owned()),
                _ => return fail(Code::InvalidNestValue, format!("invalid @nest for '{}'", term)),
            }
        }

        if let Some(prefix) = map.get("@prefix") {
            if self.mode() == ProcessingMode::JsonLd10 || term.contains(':') || term.contains('/') {
                return fail(Code::InvalidTermDefinition, format!("'{}' cannot carry @prefix", term));
            }
            let Some(flag) = prefix.as_bool() else {
                return fail(Code::InvalidPrefixValue, "@prefix must be a boolean");
            };
            if flag && def.is_keyword_alias() {
                return fail(Code::InvalidTermDefinition, "keyword aliases cannot be prefixes");
            }
            def.prefix = flag;
        }

        if let Some(unknown) = map.keys().find(|k| !TERM_DEFINITION_KEYS.contains(&k.as_str())) {
            return fail(
                Code::InvalidTermDefinition,
                format!("unexpected '{}' in definition of '{}'", unknown, term),
            );
        }

        let def = match previous {
            Some(previous) if previous.protected && !self.override_protected => {
                if !def.same_definition(&previous) {
                    return fail(
                        Code::ProtectedTermRedefinition,
                        format!("protected term '{}' cannot be redefined", term),
                    );
                }
                previous
            }
            _ => Arc::new(def),
        };
        self.result.terms.insert(term.to_owned(), def);
        self.defined.insert(term.to_owned(), true);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jsonld::error::JsonLdErrorCode;
    use serde_json::json;

    fn processor() -> ContextProcessor {
        ContextProcessor::new(&ParserOptions::default())
    }

    fn root() -> Arc<Context> {
        Arc::new(Context::new(Some("http://example.org/doc".into()), ProcessingMode::JsonLd11))
    }

    fn process(local: Value) -> Step<Arc<Context>> {
        processor().process(&root(), &local, Some("http://example.org/doc"), false, true)
    }

    fn error_code(result: Step<Arc<Context>>) -> JsonLdErrorCode {
        match result {
            Err(Interrupt::Fail(e)) => e.code,
            Err(Interrupt::Suspend(url)) => panic!("unexpected suspension on {}", url),
            Ok(_) => panic!("expected an error"),
        }
    }

    #[test]
    fn test_simple_terms() {
        let ctx = process(json!({
            "@vocab": "http://schema.org/",
            "foaf": "http://xmlns.com/foaf/0.1/",
            "knows": {"@id": "foaf:knows", "@type": "@id"},
            "tags": {"@container": "@set"}
        }))
        .unwrap();
        let knows = ctx.term("knows").unwrap();
        assert_eq!(knows.iri.as_deref(), Some("http://xmlns.com/foaf/0.1/knows"));
        assert_eq!(knows.type_mapping.as_deref(), Some("@id"));
        assert!(ctx.term("foaf").unwrap().prefix);
        assert_eq!(ctx.term("tags").unwrap().iri.as_deref(), Some("http://schema.org/tags"));
    }

    #[test]
    fn test_forward_reference_is_resolved() {
        // "name" uses the prefix defined after it
        let ctx = process(json!({
            "name": "ex:name",
            "ex": "http://example.org/ns#"
        }))
        .unwrap();
        assert_eq!(ctx.term("name").unwrap().iri.as_deref(), Some("http://example.org/ns#name"));
    }

    #[test]
    fn test_cyclic_mapping() {
        let code = error_code(process(json!({
            "a": {"@id": "b:x"},
            "b": {"@id": "a:y"}
        })));
        assert_eq!(code, JsonLdErrorCode::CyclicIriMapping);
    }

    #[test]
    fn test_protected_redefinition() {
        let mut p = processor();
        let first = p
            .process(
                &root(),
                &json!({"@protected": true, "name": "http://schema.org/name"}),
                None,
                false,
                true,
            )
            .unwrap();

        let same = p.process(&first, &json!({"name": "http://schema.org/name"}), None, false, true);
        assert!(same.is_ok());

        let different = p.process(&first, &json!({"name": "http://example.org/name"}), None, false, true);
        assert_eq!(error_code(different), JsonLdErrorCode::ProtectedTermRedefinition);

        // property-scoped contexts may override
        let overridden = p.process(&first, &json!({"name": "http://example.org/name"}), None, true, true);
        assert!(overridden.is_ok());

        let nullified = p.process(&first, &Value::Null, None, false, true);
        assert_eq!(error_code(nullified), JsonLdErrorCode::InvalidContextNullification);
    }

    #[test]
    fn test_null_context_keeps_original_base() {
        let mut p = processor();
        let ctx = p
            .process(&root(), &json!({"@base": "http://other.example/", "@vocab": "http://v/"}), None, false, true)
            .unwrap();
        assert_eq!(ctx.base.as_deref(), Some("http://other.example/"));
        let reset = p.process(&ctx, &Value::Null, None, false, true).unwrap();
        assert_eq!(reset.base.as_deref(), Some("http://example.org/doc"));
        assert!(reset.vocab.is_none());
    }

    #[test]
    fn test_remote_context_suspends_then_resumes() {
        let mut p = processor();
        let local = json!("http://example.org/ctx.jsonld");
        match p.process(&root(), &local, Some("http://example.org/doc"), false, true) {
            Err(Interrupt::Suspend(url)) => assert_eq!(url, "http://example.org/ctx.jsonld"),
            _ => panic!("expected suspension"),
        }
        p.insert_document(
            "http://example.org/ctx.jsonld",
            RemoteDocument::new(
                "http://example.org/ctx.jsonld",
                json!({"@context": {"name": "http://schema.org/name"}}),
            ),
        );
        let ctx = p
            .process(&root(), &local, Some("http://example.org/doc"), false, true)
            .unwrap();
        assert_eq!(ctx.term("name").unwrap().iri.as_deref(), Some("http://schema.org/name"));
    }

    #[test]
    fn test_recursive_remote_context_overflows() {
        let mut p = processor();
        p.insert_document(
            "http://example.org/loop",
            RemoteDocument::new("http://example.org/loop", json!({"@context": "http://example.org/loop"})),
        );
        let code = error_code(p.process(&root(), &json!("http://example.org/loop"), None, false, true));
        assert_eq!(code, JsonLdErrorCode::ContextOverflow);
    }

    #[test]
    fn test_type_scoped_context_keeps_previous() {
        let mut p = processor();
        let base = p.process(&root(), &json!({"@vocab": "http://v/"}), None, false, true).unwrap();
        let scoped = p.process(&base, &json!({"x": "http://x/"}), None, false, false).unwrap();
        assert!(scoped.previous.is_some());
        let reverted = scoped.for_node_objects();
        assert!(reverted.term("x").is_none());
    }

    #[test]
    fn test_invalid_entries() {
        assert_eq!(error_code(process(json!({"@version": 1.0}))), JsonLdErrorCode::InvalidVersionValue);
        assert_eq!(error_code(process(json!({"@language": 5}))), JsonLdErrorCode::InvalidDefaultLanguage);
        assert_eq!(error_code(process(json!({"@id": "http://x/"}))), JsonLdErrorCode::KeywordRedefinition);
        assert_eq!(
            error_code(process(json!({"p": {"@id": "http://x/p", "@container": "@foo"}}))),
            JsonLdErrorCode::InvalidContainerMapping
        );
        assert_eq!(
            error_code(process(json!({"p": {"@id": "http://x/p", "@type": "relative"}}))),
            JsonLdErrorCode::InvalidTypeMapping
        );
        assert_eq!(error_code(process(json!(42))), JsonLdErrorCode::InvalidLocalContext);
        assert_eq!(
            error_code(process(json!({"ctx": {"@id": "@context"}}))),
            JsonLdErrorCode::InvalidKeywordAlias
        );
        assert_eq!(
            error_code(process(json!({"p": {"@id": "http://x/p", "@context": {"@vocab": 5}}}))),
            JsonLdErrorCode::InvalidScopedContext
        );
    }

    #[test]
    fn test_context_url() {
        assert_eq!(
            context_url(Some("http://example.org/dir/doc"), "ctx.jsonld").as_deref(),
            Some("http://example.org/dir/ctx.jsonld")
        );
        assert_eq!(
            context_url(None, "http://example.org/ctx").as_deref(),
            Some("http://example.org/ctx")
        );
        assert_eq!(context_url(None, "ctx.jsonld"), None);
        let code = error_code(processor().process(&root(), &json!("ctx.jsonld"), None, false, true));
        assert_eq!(code, JsonLdErrorCode::LoadingDocumentFailed);
    }

    #[test]
    fn test_import() {
        let mut p = processor();
        p.insert_document(
            "http://example.org/base-ctx",
            RemoteDocument::new(
                "http://example.org/base-ctx",
                json!({"@context": {"name": "http://schema.org/name", "age": "http://schema.org/age"}}),
            ),
        );
        let ctx = p
            .process(
                &root(),
                &json!({"@import": "http://example.org/base-ctx", "age": "http://example.org/age"}),
                None,
                false,
                true,
            )
            .unwrap();
        assert_eq!(ctx.term("name").unwrap().iri.as_deref(), Some("http://schema.org/name"));
        assert_eq!(ctx.term("age").unwrap().iri.as_deref(), Some("http://example.org/age"));
    }
}
