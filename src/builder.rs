//! Pure construction of wire-format query documents.
//!
//! Everything here is a function of its inputs: no I/O, no shared state. The
//! backend accepts one fixed operation shape (named operation, typed variable
//! list, field projection, optional argument clause, optional cursor), so the
//! builder is a template expander, not a query-language compiler.

use crate::document::{ArgumentClause, QueryDocument};
use serde_json::Value;
use std::collections::BTreeMap;

/// Body shape of a generated operation. Exactly one shape per document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryShape {
    /// Bare object: the projection wraps the payload directly.
    Single,
    /// Paginated list: projection inside `items { … }` plus a `nextToken`.
    List,
    /// Batch-by-ID: projection inside `items { … }` plus `unretrievedItems`.
    Batch,
}

/// Declared parameter type for a variable name.
///
/// This is a fixed, closed rule set keyed on the literal name: the backend
/// only binds string and int literals, so everything that is not a `limit`
/// or the `ids` list is a non-null string.
fn declared_type(name: &str) -> &'static str {
    match name {
        "limit" => "Int",
        "ids" => "[String]!",
        _ => "String!",
    }
}

/// Build a query document for one operation.
///
/// Declares one typed parameter per key of `input_variables` merged with the
/// clause's params, invokes `field_name` with the clause text first (when
/// present) followed by the plain arguments, and wraps `output_fields`
/// according to `shape`.
///
/// `output_fields` must be non-empty; field names are not validated against a
/// schema, that is the caller's responsibility.
pub fn build_query<S: AsRef<str>>(
    operation_name: &str,
    field_name: &str,
    input_variables: &BTreeMap<String, Value>,
    output_fields: &[S],
    clause: Option<&ArgumentClause>,
    shape: QueryShape,
) -> QueryDocument {
    debug_assert!(!output_fields.is_empty(), "empty field projection");

    let mut variables = input_variables.clone();
    if let Some(clause) = clause {
        variables.extend(clause.params.clone());
    }

    let mut text = String::new();
    text.push_str("query ");
    text.push_str(operation_name);

    if !variables.is_empty() {
        text.push('(');
        for (i, name) in variables.keys().enumerate() {
            if i > 0 {
                text.push_str(", ");
            }
            text.push('$');
            text.push_str(name);
            text.push_str(": ");
            text.push_str(declared_type(name));
        }
        text.push(')');
    }

    text.push_str(" {\n    ");
    text.push_str(field_name);

    if !input_variables.is_empty() || clause.is_some() {
        text.push('(');
        if let Some(clause) = clause {
            text.push_str(&clause.text);
        }
        for (i, name) in input_variables.keys().enumerate() {
            if i > 0 || clause.is_some() {
                text.push_str(", ");
            }
            text.push_str(name);
            text.push_str(": $");
            text.push_str(name);
        }
        text.push(')');
    }

    text.push_str(" {\n");
    let nested = matches!(shape, QueryShape::List | QueryShape::Batch);
    if nested {
        text.push_str("        items {\n");
    }
    for field in output_fields {
        if nested {
            text.push_str("    ");
        }
        text.push_str("        ");
        text.push_str(field.as_ref());
        text.push('\n');
    }
    match shape {
        QueryShape::Single => {}
        QueryShape::List => {
            text.push_str("        }\n        nextToken\n");
        }
        QueryShape::Batch => {
            text.push_str("        }\n        unretrievedItems {\n            id\n        }\n");
        }
    }
    text.push_str("    }\n}");

    QueryDocument { text, variables }
}

/// Serialize a nested and/or/not/comparison predicate into an argument
/// clause.
///
/// The predicate is JSON-encoded and stripped of quotation marks, so `$name`
/// placeholders embedded as strings come out as bare parameter references:
///
/// ```
/// use peakform_sdk::builder::generate_filter;
/// use serde_json::json;
/// use std::collections::BTreeMap;
///
/// let mut params = BTreeMap::new();
/// params.insert("searchQuery".to_string(), json!("ben"));
/// let filter = generate_filter(&json!({"name": {"contains": "$searchQuery"}}), params);
/// assert_eq!(filter.text, "filter: {name:{contains:$searchQuery}}");
/// ```
///
/// Composable recursively; pathological depth is the caller's concern.
pub fn generate_filter(predicate: &Value, params: BTreeMap<String, Value>) -> ArgumentClause {
    let encoded = predicate.to_string().replace(['"', '\''], "");
    ArgumentClause {
        text: format!("filter: {encoded}"),
        params,
    }
}

/// Explode an ordered identifier sequence into an `ids: [$id0, $id1, …, ]`
/// clause with one positional parameter per identifier.
///
/// Only string and int literals are bindable on the wire, so a list of opaque
/// IDs becomes individually named parameters. Positional naming preserves the
/// request order, letting callers reconcile result order against it.
pub fn generate_id_list(ids: &[&str]) -> ArgumentClause {
    let mut text = String::from("ids: [");
    let mut params = BTreeMap::new();
    for (i, id) in ids.iter().enumerate() {
        let name = format!("id{i}");
        text.push('$');
        text.push_str(&name);
        text.push_str(", ");
        params.insert(name, Value::String((*id).to_string()));
    }
    text.push(']');
    ArgumentClause { text, params }
}
