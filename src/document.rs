use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Variable name the backend uses for pagination cursors.
pub const CURSOR_VARIABLE: &str = "nextToken";

/// Sentinel bound to the cursor variable by [`QueryDocument::normalized_for_cache`].
pub const CURSOR_SENTINEL: &str = "not_defined";

/// A generated operation definition plus the bindings for every parameter it
/// declares.
///
/// Variables live in a `BTreeMap` so that serializing them is canonical: two
/// documents built from the same inputs produce the same [`cache_key`],
/// regardless of the order bindings were inserted in.
///
/// [`cache_key`]: QueryDocument::cache_key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryDocument {
    pub text: String,
    pub variables: BTreeMap<String, Value>,
}

impl QueryDocument {
    /// Cache identity of this exact request: the document text followed by
    /// the canonical JSON of its variable bindings. Unique per distinct
    /// request shape, cursor included.
    pub fn cache_key(&self) -> String {
        let variables =
            serde_json::to_string(&self.variables).unwrap_or_else(|_| "{}".to_string());
        format!("{}{}", self.text, variables)
    }

    /// Copy of this document with the cursor variable pinned to a fixed
    /// sentinel, so two requests differing only in cursor compare equal as
    /// cache candidates.
    ///
    /// Cursor-independence is opt-in: the execution engine itself always keys
    /// on the literal bindings. Use this only when "have I ever issued this
    /// query at all" is the question, and [`with_cursor`] to get back a
    /// sendable document.
    ///
    /// [`with_cursor`]: QueryDocument::with_cursor
    pub fn normalized_for_cache(&self) -> QueryDocument {
        let mut normalized = self.clone();
        normalized.variables.insert(
            CURSOR_VARIABLE.to_string(),
            Value::String(CURSOR_SENTINEL.to_string()),
        );
        normalized
    }

    /// Reinstate a concrete cursor into a normalized document. An absent
    /// cursor binds JSON null, which the backend reads as "first page".
    pub fn with_cursor(&self, cursor: Option<&str>) -> QueryDocument {
        let mut document = self.clone();
        let bound = match cursor {
            Some(token) => Value::String(token.to_string()),
            None => Value::Null,
        };
        document
            .variables
            .insert(CURSOR_VARIABLE.to_string(), bound);
        document
    }
}

/// A pre-rendered argument fragment: either a boolean filter predicate or an
/// exploded ID list, paired with the concrete values its `$name` placeholders
/// bind to.
///
/// Both [`generate_filter`] and [`generate_id_list`] produce this shape; the
/// builder splices `text` into the field invocation ahead of the plain
/// arguments and merges `params` into the declared variables.
///
/// [`generate_filter`]: crate::builder::generate_filter
/// [`generate_id_list`]: crate::builder::generate_id_list
#[derive(Debug, Clone, PartialEq)]
pub struct ArgumentClause {
    pub text: String,
    pub params: BTreeMap<String, Value>,
}
