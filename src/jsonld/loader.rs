//! Remote document loading
//!
//! The engine never performs I/O itself; loaders are driven by the async
//! parser (or by the synchronous helpers, which only accept a
//! [`StaticDocumentLoader`]).

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use serde_json::Value;
use std::sync::RwLock;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Loader errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoaderError {
    /// Transport failure
    #[error("HTTP error: {0}")]
    Http(String),

    /// Non-success status
    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },

    /// Body is not JSON
    #[error("invalid JSON in {url}: {message}")]
    Json { url: String, message: String },

    /// Unsupported or missing media type
    #[error("unsupported content type {content_type:?} for {url}")]
    ContentType { url: String, content_type: Option<String> },

    /// Not known to a static loader
    #[error("document not found: {0}")]
    NotFound(String),
}

/// A loaded JSON-LD document
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteDocument {
    /// Final URL after redirects; relative references resolve against it
    pub document_url: String,
    pub document: Value,
    /// Context announced through a `Link` header
    pub context_url: Option<String>,
    pub content_type: Option<String>,
}

impl RemoteDocument {
    pub fn new(document_url: impl Into<String>, document: Value) -> Self {
        Self {
            document_url: document_url.into(),
            document,
            context_url: None,
            content_type: None,
        }
    }
}

/// Fetches remote documents (contexts and `@import` targets)
#[async_trait]
pub trait DocumentLoader: Send + Sync {
    async fn load(&self, url: &str) -> Result<RemoteDocument, LoaderError>;
}

/// Loader backed by `reqwest`
#[derive(Debug, Clone)]
pub struct HttpLoader {
    client: reqwest::Client,
}

impl HttpLoader {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self { client }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for HttpLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentLoader for HttpLoader {
    async fn load(&self, url: &str) -> Result<RemoteDocument, LoaderError> {
        debug!(url, "fetching remote document");
        let response = self
            .client
            .get(url)
            .header(
                reqwest::header::ACCEPT,
                "application/ld+json, application/json;q=0.9, */*;q=0.1",
            )
            .send()
            .await
            .map_err(|e| LoaderError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoaderError::Status {
                url: url.to_owned(),
                status: status.as_u16(),
            });
        }

        let document_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        if let Some(ct) = &content_type {
            let is_json = ct
                .parse::<mime::Mime>()
                .map(|m| m.subtype() == mime::JSON || m.suffix() == Some(mime::JSON))
                .unwrap_or(false);
            if !is_json {
                return Err(LoaderError::ContentType {
                    url: url.to_owned(),
                    content_type: content_type.clone(),
                });
            }
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| LoaderError::Http(e.to_string()))?;
        let document = serde_json::from_slice(&body).map_err(|e| LoaderError::Json {
            url: url.to_owned(),
            message: e.to_string(),
        })?;

        Ok(RemoteDocument {
            document_url,
            document,
            context_url: None,
            content_type,
        })
    }
}

/// In-memory loader, mostly for tests and offline use
#[derive(Debug, Default)]
pub struct StaticDocumentLoader {
    documents: RwLock<FxHashMap<String, Value>>,
}

impl StaticDocumentLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a document; the URL doubles as its base
    pub fn add(&self, url: impl Into<String>, document: Value) {
        if let Ok(mut documents) = self.documents.write() {
            documents.insert(url.into(), document);
        }
    }

    pub fn with_document(self, url: impl Into<String>, document: Value) -> Self {
        self.add(url, document);
        self
    }

    pub fn get(&self, url: &str) -> Result<RemoteDocument, LoaderError> {
        let documents = self
            .documents
            .read()
            .map_err(|_| LoaderError::NotFound(url.to_owned()))?;
        documents
            .get(url)
            .map(|doc| RemoteDocument::new(url, doc.clone()))
            .ok_or_else(|| LoaderError::NotFound(url.to_owned()))
    }
}

#[async_trait]
impl DocumentLoader for StaticDocumentLoader {
    async fn load(&self, url: &str) -> Result<RemoteDocument, LoaderError> {
        self.get(url)
    }
}
