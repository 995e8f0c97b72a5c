//! Payload normalization.
//!
//! Strips fields that legitimately differ between client implementations
//! before any comparison happens.

use crate::payload::model::Payload;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Fields dropped at every depth unless the caller overrides the ignore set.
///
/// `builderBaseRank` is only populated by some client versions; `status_code`
/// and `timestamp` are response bookkeeping.
pub const DEFAULT_IGNORED_FIELDS: &[&str] = &["builderBaseRank", "status_code", "timestamp"];

/// Keys starting with this prefix are client-internal and never compared.
pub const DEFAULT_PRIVATE_PREFIX: &str = "_";

/// Which mapping keys normalization removes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeRules {
    ignore: BTreeSet<String>,
    private_prefix: String,
}

impl Default for NormalizeRules {
    fn default() -> Self {
        Self {
            ignore: DEFAULT_IGNORED_FIELDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            private_prefix: DEFAULT_PRIVATE_PREFIX.to_string(),
        }
    }
}

impl NormalizeRules {
    /// Rules that drop nothing
    pub fn none() -> Self {
        Self {
            ignore: BTreeSet::new(),
            private_prefix: String::new(),
        }
    }

    /// Add a field name to the ignore set
    pub fn ignore_field(mut self, field: impl Into<String>) -> Self {
        self.ignore.insert(field.into());
        self
    }

    /// Add several field names to the ignore set
    pub fn ignore_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Replace the private-key prefix. An empty prefix disables the convention.
    pub fn with_private_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.private_prefix = prefix.into();
        self
    }

    pub fn ignored(&self) -> &BTreeSet<String> {
        &self.ignore
    }

    pub fn private_prefix(&self) -> &str {
        &self.private_prefix
    }

    /// True if a mapping key is dropped by these rules
    pub fn excludes(&self, key: &str) -> bool {
        if !self.private_prefix.is_empty() && key.starts_with(&self.private_prefix) {
            return true;
        }
        self.ignore.contains(key)
    }

    /// Normalize a payload.
    ///
    /// Mappings lose excluded keys and have their values normalized;
    /// sequences keep their order with each element normalized; scalars are
    /// copied unchanged. The result is a fixed point: normalizing it again
    /// yields an equal payload.
    pub fn normalize(&self, value: &Payload) -> Payload {
        match value {
            Value::Object(map) => {
                let kept: Map<String, Value> = map
                    .iter()
                    .filter(|(key, _)| !self.excludes(key))
                    .map(|(key, child)| (key.clone(), self.normalize(child)))
                    .collect();
                Value::Object(kept)
            }
            Value::Array(items) => Value::Array(items.iter().map(|v| self.normalize(v)).collect()),
            scalar => scalar.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_rules_drop_ignored_and_private_keys() {
        let rules = NormalizeRules::default();
        let raw = json!({
            "tag": "#2PP",
            "_raw": {"anything": 1},
            "status_code": 200,
            "timestamp": 1700000000,
            "builderBaseRank": 12,
            "members": 3
        });

        assert_eq!(rules.normalize(&raw), json!({"tag": "#2PP", "members": 3}));
    }

    #[test]
    fn test_ignored_fields_are_dropped_at_any_depth() {
        let rules = NormalizeRules::default();
        let raw = json!({
            "memberList": [
                {"name": "a", "builderBaseRank": 1, "_cache": true},
                {"name": "b", "nested": {"timestamp": 5, "keep": null}}
            ]
        });

        assert_eq!(
            rules.normalize(&raw),
            json!({"memberList": [{"name": "a"}, {"name": "b", "nested": {"keep": null}}]})
        );
    }

    #[test]
    fn test_ignored_names_inside_sequences_of_scalars_survive() {
        // Only mapping keys are filtered; string values that look like keys stay.
        let rules = NormalizeRules::default();
        let raw = json!(["timestamp", "_private", 1]);
        assert_eq!(rules.normalize(&raw), raw);
    }

    #[test]
    fn test_scalars_pass_through() {
        let rules = NormalizeRules::default();
        for v in [json!(null), json!(true), json!(1), json!(2.5), json!("s")] {
            assert_eq!(rules.normalize(&v), v);
        }
    }

    #[test]
    fn test_custom_ignore_field() {
        let rules = NormalizeRules::default().ignore_field("clanPoints");
        assert!(rules.excludes("clanPoints"));
        assert_eq!(
            rules.normalize(&json!({"clanPoints": 1, "clanLevel": 2})),
            json!({"clanLevel": 2})
        );
    }

    #[test]
    fn test_empty_prefix_disables_private_convention() {
        let rules = NormalizeRules::none();
        assert!(!rules.excludes("_raw"));
        assert!(!rules.excludes("timestamp"));

        let rules = NormalizeRules::default().with_private_prefix("");
        assert!(!rules.excludes("_raw"));
        assert!(rules.excludes("timestamp"));
    }

    #[test]
    fn test_custom_private_prefix() {
        let rules = NormalizeRules::default().with_private_prefix("$");
        assert!(rules.excludes("$meta"));
        assert!(!rules.excludes("_raw"));
    }
}
