//! Execution of built documents through the transport and the result cache.

use crate::cache::QueryCache;
use crate::document::QueryDocument;
use crate::error::PeakFormError;
use crate::transport::Transport;
use serde_json::Value;

/// How a single `execute` call participates in a result cache.
///
/// The cache is injected per call; the engine never owns one. Read and write
/// participation are chosen independently so callers can, for example, warm a
/// cache without ever serving from it.
#[derive(Clone, Copy, Default)]
pub enum CacheMode<'a> {
    /// No cache interaction at all.
    #[default]
    Bypass,
    /// Serve hits from the cache, never write back.
    Read(&'a dyn QueryCache),
    /// Serve hits and record successful payloads.
    ReadWrite(&'a dyn QueryCache),
}

impl<'a> CacheMode<'a> {
    fn reader(&self) -> Option<&'a dyn QueryCache> {
        match self {
            CacheMode::Bypass => None,
            CacheMode::Read(cache) | CacheMode::ReadWrite(cache) => Some(*cache),
        }
    }

    fn writer(&self) -> Option<&'a dyn QueryCache> {
        match self {
            CacheMode::Bypass | CacheMode::Read(_) => None,
            CacheMode::ReadWrite(cache) => Some(*cache),
        }
    }
}

/// Execute one document and resolve its payload at `operation_field`.
///
/// A cache hit on the literal query signature resolves without touching the
/// transport. A successful response that lacks `operation_field` (or carries
/// JSON null there) resolves to `Ok(None)`: payload absence is not an error;
/// singleton lookups legitimately miss. Transport failures surface as `Err`
/// with a normalized message and are never retried here.
///
/// Every call resolves exactly once, to exactly one of the three outcomes.
pub async fn execute<T: Transport + ?Sized>(
    transport: &T,
    document: &QueryDocument,
    operation_field: &str,
    cache: CacheMode<'_>,
) -> Result<Option<Value>, PeakFormError> {
    let key = document.cache_key();

    if let Some(store) = cache.reader() {
        if let Some(hit) = store.get(&key) {
            tracing::debug!(operation_field, "serving query from cache");
            return Ok(Some(hit));
        }
    }

    tracing::debug!(operation_field, "sending query document");
    let data = transport.send(&document.text, &document.variables).await?;

    let payload = data
        .get(operation_field)
        .filter(|value| !value.is_null())
        .cloned();

    match payload {
        None => {
            tracing::debug!(operation_field, "operation resolved no payload");
            Ok(None)
        }
        Some(payload) => {
            if let Some(store) = cache.writer() {
                store.put(&key, payload.clone());
            }
            Ok(Some(payload))
        }
    }
}
