//! Ordered query parameters shared by request building and cache keys.

use std::collections::BTreeMap;
use std::fmt::Display;

use serde::Serialize;

/// Query parameters for a provider call.
///
/// Parameters are kept sorted by name, so two logically identical parameter
/// sets compare (and serialize) equal regardless of insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct QueryParams(BTreeMap<String, String>);

impl QueryParams {
    /// An empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`, replacing any previous value.
    pub fn set(mut self, key: impl Into<String>, value: impl Display) -> Self {
        self.insert(key, value);
        self
    }

    /// Set `key` only when `value` is present.
    pub fn set_opt<V: Display>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.set(key, value),
            None => self,
        }
    }

    /// In-place variant of [`QueryParams::set`].
    pub fn insert(&mut self, key: impl Into<String>, value: impl Display) {
        self.0.insert(key.into(), value.to_string());
    }

    /// Look up a parameter.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// `defaults` overlaid with `self`; explicit parameters win.
    pub fn with_defaults(&self, defaults: &QueryParams) -> QueryParams {
        let mut merged = defaults.0.clone();
        merged.extend(self.0.iter().map(|(k, v)| (k.clone(), v.clone())));
        QueryParams(merged)
    }

    /// Iterate parameters in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insertion_order_does_not_matter() {
        let a = QueryParams::new().set("page", 1).set("query", "dune");
        let b = QueryParams::new().set("query", "dune").set("page", 1);
        assert_eq!(a, b);
        let pairs: Vec<_> = a.iter().collect();
        assert_eq!(pairs, vec![("page", "1"), ("query", "dune")]);
    }

    #[test]
    fn optional_values_are_skipped() {
        let params = QueryParams::new()
            .set_opt("year", None::<u16>)
            .set_opt("region", Some("US"));
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("region"), Some("US"));
        assert_eq!(params.get("year"), None);
    }

    #[test]
    fn explicit_values_override_defaults() {
        let defaults = QueryParams::new().set("api_key", "k").set("language", "en");
        let merged = QueryParams::new().set("language", "fr").with_defaults(&defaults);
        assert_eq!(merged.get("api_key"), Some("k"));
        assert_eq!(merged.get("language"), Some("fr"));
    }
}
