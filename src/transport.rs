//! The send/receive boundary.
//!
//! The engine treats the transport as an opaque primitive: a document and its
//! variable bindings go out, a decoded response object keyed by operation
//! field name comes back, or a transport-level error normalized to a
//! human-readable message. Retry policy, if any, lives here or in the caller,
//! never in the engine.

use crate::document::QueryDocument;
use crate::error::PeakFormError;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Mutex};

#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one query document and resolve to the decoded `data` object.
    async fn send(
        &self,
        text: &str,
        variables: &BTreeMap<String, Value>,
    ) -> Result<Value, PeakFormError>;
}

/// HTTP transport posting `{query, variables}` as JSON.
///
/// A response whose top-level `errors` array is non-empty is a transport
/// failure carrying the first error's `message`; otherwise the `data` object
/// is the resolved value.
#[cfg(feature = "http")]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

#[cfg(feature = "http")]
impl HttpTransport {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn from_config(config: &crate::config::PeakFormConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
        }
    }
}

#[cfg(feature = "http")]
#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        text: &str,
        variables: &BTreeMap<String, Value>,
    ) -> Result<Value, PeakFormError> {
        let body = serde_json::json!({ "query": text, "variables": variables });
        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(api_key) = &self.api_key {
            request = request.header("x-api-key", api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| PeakFormError::Transport(e.to_string()))?;
        let decoded: Value = response
            .json()
            .await
            .map_err(|e| PeakFormError::Transport(e.to_string()))?;

        if let Some(errors) = decoded.get("errors").and_then(Value::as_array) {
            if let Some(first) = errors.first() {
                let message = first
                    .get("message")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| first.to_string());
                return Err(PeakFormError::Transport(message));
            }
        }

        Ok(decoded.get("data").cloned().unwrap_or(Value::Null))
    }
}

/// One request recorded by [`MockTransport`].
#[derive(Debug, Clone)]
pub struct SentDocument {
    pub text: String,
    pub variables: BTreeMap<String, Value>,
}

impl SentDocument {
    pub fn operation_name(&self) -> &str {
        operation_name(&self.text)
    }

    pub fn as_document(&self) -> QueryDocument {
        QueryDocument {
            text: self.text.clone(),
            variables: self.variables.clone(),
        }
    }
}

#[derive(Default)]
struct MockInner {
    scripted: Mutex<HashMap<String, VecDeque<Result<Value, String>>>>,
    fallback: Mutex<VecDeque<Result<Value, String>>>,
    sent: Mutex<Vec<SentDocument>>,
}

/// Scripted in-memory transport: the test seam for everything above the
/// builder. Responses are queued per operation name (with a FIFO fallback for
/// single-operation tests) and every sent document is recorded.
#[derive(Clone, Default)]
pub struct MockTransport {
    inner: Arc<MockInner>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful `data` payload for `operation_name`.
    pub fn script(&self, operation_name: &str, payload: Value) {
        self.inner
            .scripted
            .lock()
            .expect("mock transport lock")
            .entry(operation_name.to_string())
            .or_default()
            .push_back(Ok(payload));
    }

    /// Queue a transport failure for `operation_name`.
    pub fn script_error(&self, operation_name: &str, message: impl Into<String>) {
        self.inner
            .scripted
            .lock()
            .expect("mock transport lock")
            .entry(operation_name.to_string())
            .or_default()
            .push_back(Err(message.into()));
    }

    /// Queue a successful `data` payload for whatever operation comes next.
    pub fn push(&self, payload: Value) {
        self.inner
            .fallback
            .lock()
            .expect("mock transport lock")
            .push_back(Ok(payload));
    }

    /// Queue a transport failure for whatever operation comes next.
    pub fn push_error(&self, message: impl Into<String>) {
        self.inner
            .fallback
            .lock()
            .expect("mock transport lock")
            .push_back(Err(message.into()));
    }

    /// Number of documents actually sent.
    pub fn calls(&self) -> usize {
        self.inner.sent.lock().expect("mock transport lock").len()
    }

    /// Every document sent so far, in order.
    pub fn sent(&self) -> Vec<SentDocument> {
        self.inner
            .sent
            .lock()
            .expect("mock transport lock")
            .clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(
        &self,
        text: &str,
        variables: &BTreeMap<String, Value>,
    ) -> Result<Value, PeakFormError> {
        let name = operation_name(text).to_string();
        self.inner
            .sent
            .lock()
            .expect("mock transport lock")
            .push(SentDocument {
                text: text.to_string(),
                variables: variables.clone(),
            });

        let scripted = self
            .inner
            .scripted
            .lock()
            .expect("mock transport lock")
            .get_mut(&name)
            .and_then(VecDeque::pop_front);
        let next = match scripted {
            Some(outcome) => Some(outcome),
            None => self
                .inner
                .fallback
                .lock()
                .expect("mock transport lock")
                .pop_front(),
        };

        match next {
            Some(Ok(payload)) => Ok(payload),
            Some(Err(message)) => Err(PeakFormError::Transport(message)),
            None => Err(PeakFormError::Transport(format!(
                "no scripted response for operation {name}"
            ))),
        }
    }
}

/// Operation name of a generated document: the identifier after `query `.
fn operation_name(text: &str) -> &str {
    let rest = text.strip_prefix("query ").unwrap_or(text);
    let end = rest
        .find(|c: char| c == '(' || c.is_whitespace())
        .unwrap_or(rest.len());
    &rest[..end]
}
