//! Async and synchronous front ends of the expander
//!
//! [`JsonLdStreamParser`] reads bytes from any `AsyncRead`, tokenizes them as
//! they arrive and sends quads through a bounded channel. Remote contexts are
//! fetched concurrently with reading; a `@context` string is fetched as soon
//! as it is tokenized, even while the engine is still busy with earlier
//! events.

use bytes::BytesMut;
use futures::future::BoxFuture;
use futures::stream::FuturesUnordered;
use futures::{FutureExt, Stream, StreamExt};
use rustc_hash::{FxHashMap, FxHashSet};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context as TaskContext, Poll};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, trace};

use super::error::{JsonLdError, JsonLdErrorCode, JsonLdResult};
use super::expander::Expander;
use super::context_processor::context_url;
use super::loader::{DocumentLoader, HttpLoader, LoaderError, RemoteDocument, StaticDocumentLoader};
use super::options::ParserOptions;
use super::tokenizer::{JsonEvent, JsonTokenizer, Scalar};
use crate::rdf::Quad;

const READ_CHUNK: usize = 8 * 1024;

/// Events kept queued behind a suspended entry before reading pauses
const MAX_BACKLOG: usize = 64 * 1024;

type Fetch = BoxFuture<'static, (String, Result<RemoteDocument, LoaderError>)>;

/// Streaming JSON-LD to RDF parser
#[derive(Clone)]
pub struct JsonLdStreamParser {
    options: ParserOptions,
    loader: Arc<dyn DocumentLoader>,
}

impl JsonLdStreamParser {
    /// Parser fetching remote contexts over HTTP
    pub fn new(options: ParserOptions) -> Self {
        Self {
            options,
            loader: Arc::new(HttpLoader::new()),
        }
    }

    pub fn with_loader(mut self, loader: Arc<dyn DocumentLoader>) -> Self {
        self.loader = loader;
        self
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Start parsing `reader` on a background task.
    ///
    /// The returned stream yields quads in document order and ends after the
    /// first error. Dropping it stops the task.
    pub fn parse<R>(&self, reader: R) -> QuadStream
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(self.options.channel_capacity.max(1));
        let options = self.options.clone();
        let loader = Arc::clone(&self.loader);
        let task = tokio::spawn(async move {
            if let Err(e) = drive(reader, options, loader, &tx).await {
                debug!(error = %e, "parse failed");
                let _ = tx.send(Err(e)).await;
            }
        });
        QuadStream {
            inner: ReceiverStream::new(rx),
            task,
        }
    }
}

/// Quads produced by [`JsonLdStreamParser::parse`]
pub struct QuadStream {
    inner: ReceiverStream<JsonLdResult<Quad>>,
    task: JoinHandle<()>,
}

impl Stream for QuadStream {
    type Item = JsonLdResult<Quad>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }
}

impl Drop for QuadStream {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn fetch(loader: Arc<dyn DocumentLoader>, url: String) -> Fetch {
    async move {
        let result = loader.load(&url).await;
        (url, result)
    }
    .boxed()
}

struct Fetcher {
    loader: Arc<dyn DocumentLoader>,
    running: FuturesUnordered<Fetch>,
    in_flight: FxHashSet<String>,
    /// Failed prefetches nobody has asked for yet
    failures: FxHashMap<String, LoaderError>,
}

impl Fetcher {
    fn start(&mut self, expander: &Expander, url: &str) {
        if self.in_flight.contains(url) || self.failures.contains_key(url) || expander.is_cached(url) {
            return;
        }
        trace!(url, "fetching remote context");
        self.in_flight.insert(url.to_owned());
        self.running.push(fetch(Arc::clone(&self.loader), url.to_owned()));
    }
}

async fn drive<R>(
    mut reader: R,
    options: ParserOptions,
    loader: Arc<dyn DocumentLoader>,
    tx: &mpsc::Sender<JsonLdResult<Quad>>,
) -> JsonLdResult<()>
where
    R: AsyncRead + Unpin,
{
    let base = options.base_iri.clone();
    let mut expander = Expander::new(options)?;
    let mut tokenizer = JsonTokenizer::new();
    let mut buffer = BytesMut::with_capacity(READ_CHUNK);
    let mut fetcher = Fetcher {
        loader,
        running: FuturesUnordered::new(),
        in_flight: FxHashSet::default(),
        failures: FxHashMap::default(),
    };
    let mut eof = false;
    let mut after_context_key = false;
    // tokenizer or read failure, reported once the quads before it are out
    let mut failure: Option<JsonLdError> = None;

    loop {
        let ready: Vec<Quad> = expander.drain().collect();
        for quad in ready {
            if tx.send(Ok(quad)).await.is_err() {
                debug!("quad receiver dropped, stopping");
                return Ok(());
            }
        }
        if let Some(e) = expander.error() {
            return Err(e.clone());
        }
        if let Some(e) = failure.take() {
            return Err(e);
        }
        if expander.is_done() {
            return Ok(());
        }

        if let Some(url) = expander.blocked_on().map(str::to_owned) {
            if let Some(e) = fetcher.failures.remove(&url) {
                // the failure is recorded by the expander
                let _ = expander.provide_context(&url, Err(e));
                continue;
            }
            fetcher.start(&expander, &url);
        }

        let reading = !eof && expander.backlog() < MAX_BACKLOG;
        tokio::select! {
            Some((url, result)) = fetcher.running.next(), if !fetcher.running.is_empty() => {
                fetcher.in_flight.remove(&url);
                match result {
                    Ok(document) => {
                        let _ = expander.provide_context(&url, Ok(document));
                    }
                    Err(e) if expander.blocked_on() == Some(url.as_str()) => {
                        let _ = expander.provide_context(&url, Err(e));
                    }
                    Err(e) => {
                        fetcher.failures.insert(url, e);
                    }
                }
            }
            read = reader.read_buf(&mut buffer), if reading => {
                match read {
                    Ok(0) => {
                        tokenizer.end();
                        eof = true;
                    }
                    Ok(_) => {
                        tokenizer.feed(&buffer);
                        buffer.clear();
                    }
                    Err(e) => {
                        failure = Some(JsonLdError::new(JsonLdErrorCode::LoadingDocumentFailed, e.to_string()));
                        continue;
                    }
                }
                let fed = feed_events(
                    &mut tokenizer,
                    &mut expander,
                    &mut fetcher,
                    base.as_deref(),
                    &mut after_context_key,
                );
                if let Err(e) = fed.and_then(|()| if eof { tokenizer.finish() } else { Ok(()) }) {
                    failure = Some(e);
                    continue;
                }
                if eof {
                    let _ = expander.finish();
                }
            }
            else => break,
        }
    }
    match expander.error() {
        Some(e) => Err(e.clone()),
        None => Ok(()),
    }
}

/// Pass every complete event to the expander, prefetching `@context` references
fn feed_events(
    tokenizer: &mut JsonTokenizer,
    expander: &mut Expander,
    fetcher: &mut Fetcher,
    base: Option<&str>,
    after_context_key: &mut bool,
) -> JsonLdResult<()> {
    while let Some((event, position)) = tokenizer.next_event()? {
        if *after_context_key {
            // resolved exactly as the context processor will resolve it
            if let JsonEvent::Value(Scalar::String(reference)) = &event {
                if let Some(url) = context_url(base, reference) {
                    fetcher.start(expander, &url);
                }
            }
        }
        *after_context_key = matches!(&event, JsonEvent::Key(key) if key == "@context");
        if expander.feed_at(event, Some(position)).is_err() {
            // recorded by the expander
            break;
        }
    }
    Ok(())
}

fn resolve_blocked(expander: &mut Expander, loader: &StaticDocumentLoader) -> JsonLdResult<()> {
    while let Some(url) = expander.blocked_on().map(str::to_owned) {
        let result = loader.get(&url);
        expander.provide_context(&url, result)?;
    }
    Ok(())
}

/// Expand a complete document without a runtime; remote contexts come from `loader`
pub fn quads_from_slice_with_loader(
    input: &[u8],
    options: ParserOptions,
    loader: &StaticDocumentLoader,
) -> JsonLdResult<Vec<Quad>> {
    let mut expander = Expander::new(options)?;
    resolve_blocked(&mut expander, loader)?;
    let mut tokenizer = JsonTokenizer::new();
    tokenizer.feed(input);
    tokenizer.end();
    let mut quads = Vec::new();
    while let Some((event, position)) = tokenizer.next_event()? {
        expander.feed_at(event, Some(position))?;
        resolve_blocked(&mut expander, loader)?;
        quads.extend(expander.drain());
    }
    tokenizer.finish()?;
    expander.finish()?;
    resolve_blocked(&mut expander, loader)?;
    quads.extend(expander.drain());
    Ok(quads)
}

/// Expand a complete document; any remote context is an error
pub fn quads_from_slice(input: &[u8], options: ParserOptions) -> JsonLdResult<Vec<Quad>> {
    quads_from_slice_with_loader(input, options, &StaticDocumentLoader::new())
}

pub fn quads_from_str(input: &str, options: ParserOptions) -> JsonLdResult<Vec<Quad>> {
    quads_from_slice(input.as_bytes(), options)
}

pub fn quads_from_str_with_loader(
    input: &str,
    options: ParserOptions,
    loader: &StaticDocumentLoader,
) -> JsonLdResult<Vec<Quad>> {
    quads_from_slice_with_loader(input.as_bytes(), options, loader)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn opts() -> ParserOptions {
        ParserOptions::default().with_blank_node_prefix("b")
    }

    fn nquads(quads: &[Quad]) -> Vec<String> {
        quads.iter().map(|q| q.to_string()).collect()
    }

    #[test]
    fn test_sync_with_static_loader() {
        let loader = StaticDocumentLoader::new().with_document(
            "http://example.org/ctx.jsonld",
            json!({"@context": {"knows": {"@id": "http://xmlns.com/foaf/0.1/knows", "@type": "@id"}}}),
        );
        let quads = quads_from_str_with_loader(
            r#"{"@context": "http://example.org/ctx.jsonld", "@id": "http://example.org/a", "knows": "http://example.org/b"}"#,
            opts(),
            &loader,
        )
        .unwrap();
        assert_eq!(
            nquads(&quads),
            vec!["<http://example.org/a> <http://xmlns.com/foaf/0.1/knows> <http://example.org/b> ."]
        );
    }

    #[test]
    fn test_sync_missing_context() {
        let err = quads_from_str(r#"{"@context": "http://example.org/nowhere", "@id": "http://example.org/a"}"#, opts())
            .unwrap_err();
        assert_eq!(err.code, JsonLdErrorCode::LoadingRemoteContextFailed);
    }

    #[test]
    fn test_sync_syntax_error() {
        let err = quads_from_str(r#"{"@id": }"#, opts()).unwrap_err();
        assert_eq!(err.code, JsonLdErrorCode::SyntaxError);
    }

    /// Records every URL it is asked for
    #[derive(Default)]
    struct RecordingLoader {
        requested: std::sync::Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl DocumentLoader for RecordingLoader {
        async fn load(&self, url: &str) -> Result<RemoteDocument, LoaderError> {
            self.requested.lock().unwrap().push(url.to_owned());
            Err(LoaderError::NotFound(url.to_owned()))
        }
    }

    #[tokio::test]
    async fn test_relative_context_without_base_is_not_fetched() {
        let loader = Arc::new(RecordingLoader::default());
        let parser = JsonLdStreamParser::new(opts()).with_loader(loader.clone());
        let input: &'static [u8] = br#"{"@context": "ctx.jsonld", "@id": "http://example.org/a"}"#;
        let results: Vec<JsonLdResult<Quad>> = parser.parse(input).collect().await;
        let err = results.into_iter().find_map(Result::err).unwrap();
        assert_eq!(err.code, JsonLdErrorCode::LoadingDocumentFailed);
        assert!(loader.requested.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_relative_context_resolved_against_base() {
        let loader = Arc::new(StaticDocumentLoader::new().with_document(
            "http://example.org/dir/ctx.jsonld",
            json!({"@context": {"@vocab": "http://schema.org/"}}),
        ));
        let parser = JsonLdStreamParser::new(opts().with_base_iri("http://example.org/dir/doc"))
            .with_loader(loader);
        let input: &'static [u8] = br#"{"@context": "ctx.jsonld", "@id": "a", "name": "A"}"#;
        let quads: Vec<Quad> = parser.parse(input).map(|r| r.unwrap()).collect().await;
        assert_eq!(
            nquads(&quads),
            vec![r#"<http://example.org/dir/a> <http://schema.org/name> "A" ."#]
        );
    }

    #[tokio::test]
    async fn test_async_stream() {
        let loader = Arc::new(StaticDocumentLoader::new().with_document(
            "http://example.org/ctx",
            json!({"@context": {"@vocab": "http://schema.org/"}}),
        ));
        let parser = JsonLdStreamParser::new(opts()).with_loader(loader);
        let input: &'static [u8] =
            br#"{"@context": "http://example.org/ctx", "@id": "http://example.org/a", "name": "A"}"#;
        let quads: Vec<Quad> = parser
            .parse(input)
            .map(|r| r.unwrap())
            .collect()
            .await;
        assert_eq!(
            nquads(&quads),
            vec![r#"<http://example.org/a> <http://schema.org/name> "A" ."#]
        );
    }
}
