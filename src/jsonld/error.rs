//! JSON-LD error types

use std::fmt;
use thiserror::Error;

/// Position of an event in the source text (1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextPosition {
    pub line: u64,
    pub column: u64,
    pub offset: u64,
}

impl fmt::Display for TextPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Machine-readable error codes.
///
/// The JSON-LD 1.1 API error codes plus the streaming, RDF-star and
/// tokenizer conditions of this parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JsonLdErrorCode {
    CollidingKeywords,
    ContextOverflow,
    CyclicIriMapping,
    InvalidBaseDirection,
    InvalidBaseIri,
    InvalidContainerMapping,
    InvalidContextEntry,
    InvalidContextNullification,
    InvalidDefaultLanguage,
    InvalidIdValue,
    InvalidImportValue,
    InvalidIncludedValue,
    InvalidIndexValue,
    InvalidIriMapping,
    InvalidKeywordAlias,
    InvalidLanguageMapValue,
    InvalidLanguageMapping,
    InvalidLanguageTaggedString,
    InvalidLanguageTaggedValue,
    InvalidLocalContext,
    InvalidNestValue,
    InvalidPrefixValue,
    InvalidPropagateValue,
    InvalidProtectedValue,
    InvalidRemoteContext,
    InvalidReversePropertyMap,
    InvalidReverseProperty,
    InvalidReversePropertyValue,
    InvalidReverseValue,
    InvalidScopedContext,
    InvalidSetOrListObject,
    InvalidTermDefinition,
    InvalidTypeMapping,
    InvalidTypeValue,
    InvalidTypedValue,
    InvalidValueObject,
    InvalidValueObjectValue,
    InvalidVersionValue,
    InvalidVocabMapping,
    IriConfusedWithPrefix,
    KeywordRedefinition,
    LoadingDocumentFailed,
    LoadingRemoteContextFailed,
    MultipleContextLinkHeaders,
    ProcessingModeConflict,
    ProtectedTermRedefinition,
    InvalidStreamingKeyOrder,
    InvalidEmbeddedNode,
    InvalidAnnotation,
    SyntaxError,
    UnclosedDocument,
}

impl JsonLdErrorCode {
    /// The error code string as written in the JSON-LD API
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CollidingKeywords => "colliding keywords",
            Self::ContextOverflow => "context overflow",
            Self::CyclicIriMapping => "cyclic IRI mapping",
            Self::InvalidBaseDirection => "invalid base direction",
            Self::InvalidBaseIri => "invalid base IRI",
            Self::InvalidContainerMapping => "invalid container mapping",
            Self::InvalidContextEntry => "invalid context entry",
            Self::InvalidContextNullification => "invalid context nullification",
            Self::InvalidDefaultLanguage => "invalid default language",
            Self::InvalidIdValue => "invalid @id value",
            Self::InvalidImportValue => "invalid @import value",
            Self::InvalidIncludedValue => "invalid @included value",
            Self::InvalidIndexValue => "invalid @index value",
            Self::InvalidIriMapping => "invalid IRI mapping",
            Self::InvalidKeywordAlias => "invalid keyword alias",
            Self::InvalidLanguageMapValue => "invalid language map value",
            Self::InvalidLanguageMapping => "invalid language mapping",
            Self::InvalidLanguageTaggedString => "invalid language-tagged string",
            Self::InvalidLanguageTaggedValue => "invalid language-tagged value",
            Self::InvalidLocalContext => "invalid local context",
            Self::InvalidNestValue => "invalid @nest value",
            Self::InvalidPrefixValue => "invalid @prefix value",
            Self::InvalidPropagateValue => "invalid @propagate value",
            Self::InvalidProtectedValue => "invalid @protected value",
            Self::InvalidRemoteContext => "invalid remote context",
            Self::InvalidReversePropertyMap => "invalid reverse property map",
            Self::InvalidReverseProperty => "invalid reverse property",
            Self::InvalidReversePropertyValue => "invalid reverse property value",
            Self::InvalidReverseValue => "invalid @reverse value",
            Self::InvalidScopedContext => "invalid scoped context",
            Self::InvalidSetOrListObject => "invalid set or list object",
            Self::InvalidTermDefinition => "invalid term definition",
            Self::InvalidTypeMapping => "invalid type mapping",
            Self::InvalidTypeValue => "invalid type value",
            Self::InvalidTypedValue => "invalid typed value",
            Self::InvalidValueObject => "invalid value object",
            Self::InvalidValueObjectValue => "invalid value object value",
            Self::InvalidVersionValue => "invalid @version value",
            Self::InvalidVocabMapping => "invalid vocab mapping",
            Self::IriConfusedWithPrefix => "IRI confused with prefix",
            Self::KeywordRedefinition => "keyword redefinition",
            Self::LoadingDocumentFailed => "loading document failed",
            Self::LoadingRemoteContextFailed => "loading remote context failed",
            Self::MultipleContextLinkHeaders => "multiple context link headers",
            Self::ProcessingModeConflict => "processing mode conflict",
            Self::ProtectedTermRedefinition => "protected term redefinition",
            Self::InvalidStreamingKeyOrder => "invalid streaming key order",
            Self::InvalidEmbeddedNode => "invalid embedded node",
            Self::InvalidAnnotation => "invalid annotation",
            Self::SyntaxError => "syntax error",
            Self::UnclosedDocument => "unclosed document",
        }
    }
}

impl fmt::Display for JsonLdErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fatal parse error; terminates the quad stream
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{code}: {message}{}", render_position(.position))]
pub struct JsonLdError {
    pub code: JsonLdErrorCode,
    pub message: String,
    pub position: Option<TextPosition>,
}

fn render_position(position: &Option<TextPosition>) -> String {
    match position {
        Some(p) => format!(" (at {})", p),
        None => String::new(),
    }
}

impl JsonLdError {
    pub fn new(code: JsonLdErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            position: None,
        }
    }

    /// Attach a position unless one is already known
    pub fn at(mut self, position: Option<TextPosition>) -> Self {
        if self.position.is_none() {
            self.position = position;
        }
        self
    }
}

pub type JsonLdResult<T> = Result<T, JsonLdError>;

/// Why an engine step could not complete.
///
/// `Suspend` is not an error: a remote document is needed before the step
/// can be retried.
#[derive(Debug)]
pub(crate) enum Interrupt {
    Suspend(String),
    Fail(JsonLdError),
}

impl From<JsonLdError> for Interrupt {
    fn from(e: JsonLdError) -> Self {
        Interrupt::Fail(e)
    }
}

pub(crate) type Step<T> = Result<T, Interrupt>;

/// Shorthand for building an [`Interrupt::Fail`]
pub(crate) fn fail<T>(code: JsonLdErrorCode, message: impl Into<String>) -> Step<T> {
    Err(Interrupt::Fail(JsonLdError::new(code, message)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = JsonLdError::new(JsonLdErrorCode::CollidingKeywords, "@id appears twice");
        assert_eq!(err.to_string(), "colliding keywords: @id appears twice");

        let err = err.at(Some(TextPosition { line: 3, column: 7, offset: 40 }));
        assert_eq!(
            err.to_string(),
            "colliding keywords: @id appears twice (at line 3, column 7)"
        );
    }

    #[test]
    fn test_position_not_overwritten() {
        let first = Some(TextPosition { line: 1, column: 1, offset: 0 });
        let second = Some(TextPosition { line: 9, column: 9, offset: 99 });
        let err = JsonLdError::new(JsonLdErrorCode::SyntaxError, "x").at(first).at(second);
        assert_eq!(err.position, first);
    }
}
