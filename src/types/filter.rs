//! # Equality Filters
//!
//! A [`Filter`] is an unordered set of (field, value) equality
//! constraints combined conjunctively: a document matches only when
//! every named field is present and equal to the given value. An empty
//! filter matches everything, so a filtered read degrades to a full
//! scan rather than an error.
//!
//! Values compare by JSON value equality: arrays and objects must match
//! exactly, never by subset. The Postgres client compiles each
//! constraint to its own exact-match predicate to keep that meaning.

use serde_json::Value;

use crate::types::Fields;

/// Conjunction of equality constraints over document fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    constraints: Vec<(String, Value)>,
}

impl Filter {
    /// A filter with no constraints; matches every document.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Adds an `field == value` constraint.
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.constraints.push((field.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// The individual (field, value) constraints, in insertion order.
    /// Repeated fields stay repeated; every constraint renders its own
    /// predicate, so contradictory constraints match nothing.
    pub fn constraints(&self) -> &[(String, Value)] {
        &self.constraints
    }

    /// True when every constrained field is present and equal.
    pub fn matches(&self, fields: &Fields) -> bool {
        self.constraints
            .iter()
            .all(|(field, value)| fields.get(field) == Some(value))
    }
}

impl From<Fields> for Filter {
    fn from(key_values: Fields) -> Self {
        Self {
            constraints: key_values.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(pairs: &[(&str, Value)]) -> Fields {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.clone()))
            .collect()
    }

    #[test]
    fn empty_matches_all() {
        let f = Filter::empty();
        assert!(f.matches(&Fields::new()));
        assert!(f.matches(&doc(&[("a", json!(1))])));
    }

    #[test]
    fn conjunction() {
        let f = Filter::empty().eq("a", json!(1)).eq("b", json!("x"));
        assert!(f.matches(&doc(&[("a", json!(1)), ("b", json!("x")), ("c", json!(true))])));
        assert!(!f.matches(&doc(&[("a", json!(1))])));
        assert!(!f.matches(&doc(&[("a", json!(1)), ("b", json!("y"))])));
    }

    #[test]
    fn missing_field_never_matches() {
        let f = Filter::empty().eq("missing", json!(null));
        // The constraint requires the field to be present, even for null.
        assert!(!f.matches(&Fields::new()));
        assert!(f.matches(&doc(&[("missing", json!(null))])));
    }

    #[test]
    fn array_values_compare_exactly() {
        // A one-element array only equals a one-element array; a stored
        // superset must not match.
        let f = Filter::empty().eq("tags", json!(["a"]));
        assert!(f.matches(&doc(&[("tags", json!(["a"]))])));
        assert!(!f.matches(&doc(&[("tags", json!(["a", "b"]))])));
    }

    #[test]
    fn repeated_fields_stay_conjunctive() {
        let f = Filter::empty().eq("k", json!(1)).eq("k", json!(2));
        assert_eq!(f.constraints().len(), 2);
        assert!(!f.matches(&doc(&[("k", json!(1))])));
        assert!(!f.matches(&doc(&[("k", json!(2))])));
    }

    #[test]
    fn from_fields() {
        let kv = doc(&[("uid", json!("u1"))]);
        let f = Filter::from(kv);
        assert_eq!(f.constraints().len(), 1);
        assert!(f.matches(&doc(&[("uid", json!("u1")), ("x", json!(2))])));
    }
}
