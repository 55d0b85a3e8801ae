//! Query-string parsing for endpoints with repeatable filter params.
//!
//! The dashboard filters send `?state=A&state=B` (and sometimes
//! `?state=A,B`); axum's `Query` extractor rejects a repeated key when the
//! target field is a single `Option<String>`, so these endpoints parse the
//! raw query string instead.

/// Decoded query pairs in request order
pub struct QueryPairs(Vec<(String, String)>);

impl QueryPairs {
    pub fn parse(raw: Option<&str>) -> Self {
        let pairs = raw
            .map(|q| serde_urlencoded::from_str::<Vec<(String, String)>>(q).unwrap_or_default())
            .unwrap_or_default();
        Self(pairs)
    }

    /// Single-valued param; the last occurrence wins, empties count as absent
    pub fn last(&self, key: &str) -> Option<String> {
        self.0
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// Repeatable param: every occurrence collected, each value additionally
    /// comma-split, empties dropped
    pub fn list(&self, key: &str) -> Vec<String> {
        self.0
            .iter()
            .filter(|(k, _)| k == key)
            .flat_map(|(_, v)| v.split(','))
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .collect()
    }

    /// Repeatable param re-joined with commas, for the request DTOs whose
    /// filter fields carry comma-separated lists
    pub fn joined(&self, key: &str) -> Option<String> {
        let values = self.list(key);
        if values.is_empty() {
            None
        } else {
            Some(values.join(","))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_keys_collected() {
        let pairs = QueryPairs::parse(Some("state=Maharashtra&state=Karnataka"));
        assert_eq!(pairs.list("state"), vec!["Maharashtra", "Karnataka"]);
        assert_eq!(pairs.joined("state").as_deref(), Some("Maharashtra,Karnataka"));
    }

    #[test]
    fn test_comma_lists_also_split() {
        let pairs = QueryPairs::parse(Some("state=Maharashtra,Karnataka&state=Delhi"));
        assert_eq!(pairs.list("state"), vec!["Maharashtra", "Karnataka", "Delhi"]);
    }

    #[test]
    fn test_percent_encoding_decoded() {
        let pairs = QueryPairs::parse(Some("state=Tamil%20Nadu&city=Mumbai+Suburban"));
        assert_eq!(pairs.list("state"), vec!["Tamil Nadu"]);
        assert_eq!(pairs.list("city"), vec!["Mumbai Suburban"]);
    }

    #[test]
    fn test_last_occurrence_wins() {
        let pairs = QueryPairs::parse(Some("date_from=2025-01-01&date_from=2025-02-01"));
        assert_eq!(pairs.last("date_from").as_deref(), Some("2025-02-01"));
    }

    #[test]
    fn test_empty_values_dropped() {
        let pairs = QueryPairs::parse(Some("state=&state=Delhi&city="));
        assert_eq!(pairs.list("state"), vec!["Delhi"]);
        assert!(pairs.joined("city").is_none());
        assert!(pairs.last("city").is_none());
    }

    #[test]
    fn test_absent_query() {
        let pairs = QueryPairs::parse(None);
        assert!(pairs.list("state").is_empty());
        assert!(pairs.last("date_from").is_none());
    }
}
