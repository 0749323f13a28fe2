use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field name stamped on every inserted document with the insertion
/// time as an ISO-8601 UTC string. Written exactly once, never mutated
/// by this layer afterwards.
pub const ADDED_AT: &str = "added_at";

/// Reserved field holding the owner identity used by the ownership
/// guard on `update`/`delete`.
pub const UID_FIELD: &str = "uid";

/// A plain field-name to value mapping, the shape every document takes
/// once it crosses the facade boundary.
pub type Fields = Map<String, Value>;

/// A store-native document: the storage key plus the raw field payload,
/// exactly as the backing client returned it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDocument {
    pub doc_id: String,
    pub fields: Fields,
}

impl RawDocument {
    pub fn new(doc_id: impl Into<String>, fields: Fields) -> Self {
        Self {
            doc_id: doc_id.into(),
            fields,
        }
    }
}

/// Converts one store-native document into a plain field mapping,
/// discarding the storage envelope. Documents with no payload come out
/// as an empty mapping, which [`filter_empty`] then drops.
pub fn parse_doc(raw: RawDocument) -> Fields {
    raw.fields
}

/// Drops empty mappings from a normalized document sequence, preserving
/// the store's iteration order for the rest.
pub fn filter_empty(docs: impl IntoIterator<Item = Fields>) -> Vec<Fields> {
    docs.into_iter().filter(|d| !d.is_empty()).collect()
}

/// Normalizes a present document, mapping an empty payload to [`None`].
/// Point reads go through here so they see the same shape as scans.
pub fn normalize(raw: RawDocument) -> Option<Fields> {
    let fields = parse_doc(raw);
    if fields.is_empty() { None } else { Some(fields) }
}
