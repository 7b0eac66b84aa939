//! Key Namespace Builders
//!
//! Pure functions producing canonical cache keys from domain identifiers.
//!
//! Keys have the shape `{namespace}:{part}:{part}...`. Parts are escaped so an
//! identifier containing `:` can never collide with a key of a different shape,
//! and filter objects are encoded with their fields sorted so two filters with
//! the same content always map to the same key.

use serde_json::Value;

/// Separator between key parts.
pub const SEPARATOR: char = ':';

// == Key Namespace ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyNamespace {
    User,
    Document,
    Collection,
    Search,
    Dashboard,
    Analysis,
}

impl KeyNamespace {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyNamespace::User => "user",
            KeyNamespace::Document => "doc",
            KeyNamespace::Collection => "collection",
            KeyNamespace::Search => "search",
            KeyNamespace::Dashboard => "dashboard",
            KeyNamespace::Analysis => "analysis",
        }
    }

    /// Prefix matching every key in the namespace, for `delete_prefix`.
    pub fn prefix(&self) -> String {
        format!("{}{}", self.as_str(), SEPARATOR)
    }

    /// Builds a key in this namespace from already-canonical parts.
    pub fn key<I, S>(&self, parts: I) -> String
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut key = self.as_str().to_string();
        for part in parts {
            key.push(SEPARATOR);
            key.push_str(&escape_part(part.as_ref()));
        }
        key
    }
}

// == Builders ==
pub fn user_key(user_id: &str) -> String {
    KeyNamespace::User.key([user_id])
}

pub fn document_key(collection: &str, document_id: &str) -> String {
    KeyNamespace::Document.key([collection, document_id])
}

/// Prefix covering every cached document of one collection.
pub fn document_collection_prefix(collection: &str) -> String {
    let mut prefix = KeyNamespace::Document.key([collection]);
    prefix.push(SEPARATOR);
    prefix
}

/// One page of a collection listing.
pub fn collection_page_key(collection: &str, page: u32, per_page: u32) -> String {
    KeyNamespace::Collection.key([
        collection.to_string(),
        page.to_string(),
        per_page.to_string(),
    ])
}

/// Search results for a filter object. Field order in `filters` does not matter.
pub fn search_key(collection: &str, filters: &Value) -> String {
    KeyNamespace::Search.key([collection.to_string(), canonical_json(filters)])
}

pub fn dashboard_key(user_id: &str, view: &str) -> String {
    KeyNamespace::Dashboard.key([user_id, view])
}

/// Cached model output for a document.
pub fn analysis_key(document_id: &str, model: &str) -> String {
    KeyNamespace::Analysis.key([document_id, model])
}

// == Canonical Encoding ==
/// Compact JSON with object fields sorted recursively.
///
/// Arrays keep their order since it is meaningful.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut fields: Vec<(&String, &Value)> = map.iter().collect();
            fields.sort_by(|a, b| a.0.cmp(b.0));

            out.push('{');
            for (i, (name, field)) in fields.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(name.clone()).to_string());
                out.push(':');
                write_canonical(field, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

/// Escapes `%` and the separator so parts cannot be confused with structure.
fn escape_part(part: &str) -> String {
    let mut escaped = String::with_capacity(part.len());
    for c in part.chars() {
        match c {
            '%' => escaped.push_str("%25"),
            SEPARATOR => escaped.push_str("%3A"),
            other => escaped.push(other),
        }
    }
    escaped
}
