//! Options derived from an HTTP response, and opening documents by URL

use mime::Mime;
use reqwest::header::{HeaderMap, CONTENT_TYPE, LINK};
use serde_json::Value;
use tokio::io::{AsyncWriteExt, DuplexStream};
use tracing::{debug, warn};

use super::error::{JsonLdError, JsonLdErrorCode as Code, JsonLdResult};
use super::iri::{is_absolute_iri, resolve_iri};
use super::options::ParserOptions;
use crate::rdf::vocab::jsonld::{CONTEXT_LINK_REL, STREAMING_PROFILE};

/// One entry of a `Link` header
#[derive(Debug, Clone, PartialEq)]
struct LinkValue {
    target: String,
    rel: Vec<String>,
}

/// Split a `Link` header value into its links
fn parse_links(header: &str) -> Vec<LinkValue> {
    let mut links = Vec::new();
    let mut rest = header.trim();
    while let Some(start) = rest.find('<') {
        let Some(end) = rest[start..].find('>') else { break };
        let target = rest[start + 1..start + end].trim().to_owned();
        rest = &rest[start + end + 1..];
        // parameters run until the next link
        let params_end = next_link_start(rest);
        let params = &rest[..params_end];
        rest = &rest[params_end..];

        let mut rel = Vec::new();
        for param in params.split(';') {
            let Some((name, value)) = param.split_once('=') else { continue };
            if name.trim().eq_ignore_ascii_case("rel") {
                rel.extend(value.trim().trim_matches('"').split_whitespace().map(str::to_owned));
            }
        }
        links.push(LinkValue { target, rel });
    }
    links
}

/// Offset of the `,` separating the next link, ignoring commas in quotes
fn next_link_start(s: &str) -> usize {
    let mut quoted = false;
    for (i, c) in s.char_indices() {
        match c {
            '"' => quoted = !quoted,
            ',' if !quoted => return i + 1,
            _ => {}
        }
    }
    s.len()
}

fn is_json(mime: &Mime) -> bool {
    mime.subtype() == mime::JSON || mime.suffix() == Some(mime::JSON)
}

/// Parser options for a document served with the given media type and headers.
///
/// `application/ld+json` is read as is; its `profile` parameter may request
/// the streaming profile. Any other JSON media type needs exactly one context
/// `Link` header, which becomes part of the initial context.
pub fn options_from_response(
    options: &ParserOptions,
    base_iri: &str,
    content_type: Option<&str>,
    headers: &HeaderMap,
) -> JsonLdResult<ParserOptions> {
    let mut derived = options.clone();
    derived.base_iri = Some(base_iri.to_owned());

    let mime: Mime = content_type
        .unwrap_or("application/json")
        .parse()
        .map_err(|_| {
            JsonLdError::new(
                Code::LoadingDocumentFailed,
                format!("invalid content type {:?}", content_type),
            )
        })?;
    if !is_json(&mime) {
        return Err(JsonLdError::new(
            Code::LoadingDocumentFailed,
            format!("{} is not a JSON media type", mime),
        ));
    }

    if mime.subtype() == "ld" && mime.suffix() == Some(mime::JSON) {
        if let Some(profile) = mime.get_param("profile") {
            if profile.as_str().split_whitespace().any(|p| p == STREAMING_PROFILE) {
                debug!("streaming profile requested by media type");
                derived.streaming_profile = Some(true);
            }
        }
        return Ok(derived);
    }

    let contexts: Vec<String> = headers
        .get_all(LINK)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(parse_links)
        .filter(|link| link.rel.iter().any(|r| r == CONTEXT_LINK_REL))
        .map(|link| link.target)
        .collect();
    let context = match contexts.as_slice() {
        [] if options.ignore_missing_context_link_header => {
            warn!(base_iri, "plain JSON without a context link header");
            return Ok(derived);
        }
        [] => {
            return Err(JsonLdError::new(
                Code::LoadingDocumentFailed,
                "plain JSON needs a context link header",
            ))
        }
        [one] => one,
        _ => {
            return Err(JsonLdError::new(
                Code::MultipleContextLinkHeaders,
                "more than one context link header",
            ))
        }
    };
    let url = if is_absolute_iri(context) {
        context.clone()
    } else {
        resolve_iri(base_iri, context).unwrap_or_else(|| context.clone())
    };
    derived.initial_context = Some(match derived.initial_context.take() {
        None => Value::String(url),
        Some(Value::Array(mut items)) => {
            items.push(Value::String(url));
            Value::Array(items)
        }
        Some(existing) => Value::Array(vec![existing, Value::String(url)]),
    });
    Ok(derived)
}

/// Fetch a document and stream its body.
///
/// Returns the options derived from the response together with a reader over
/// the body, which is copied in the background as it arrives.
pub async fn open_url(
    client: &reqwest::Client,
    url: &str,
    options: &ParserOptions,
) -> JsonLdResult<(ParserOptions, DuplexStream)> {
    let failed = |e: String| JsonLdError::new(Code::LoadingDocumentFailed, format!("{}: {}", url, e));
    let mut response = client
        .get(url)
        .header(
            reqwest::header::ACCEPT,
            "application/ld+json, application/json;q=0.9",
        )
        .send()
        .await
        .map_err(|e| failed(e.to_string()))?;
    if !response.status().is_success() {
        return Err(failed(format!("status {}", response.status())));
    }
    let base = response.url().to_string();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let derived = options_from_response(options, &base, content_type.as_deref(), response.headers())?;

    let (mut writer, reader) = tokio::io::duplex(64 * 1024);
    tokio::spawn(async move {
        loop {
            match response.chunk().await {
                Ok(Some(chunk)) => {
                    if writer.write_all(&chunk).await.is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!(error = %e, "document body interrupted");
                    break;
                }
            }
        }
        let _ = writer.shutdown().await;
    });
    Ok((derived, reader))
}
