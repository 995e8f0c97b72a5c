//! Payload representation and kind inspection.

use serde_json::Value;

/// Recursively structured response data as returned by either client.
///
/// `serde_json::Value` is already the tagged variant we need: `Object` is a
/// mapping, `Array` a sequence, everything else a scalar leaf.
pub type Payload = Value;

/// Runtime kind of a payload node.
///
/// Integers and floats are distinct kinds, as are booleans and numbers, so a
/// client that emits `1.0` where the other emits `1` is caught by the walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadKind {
    Mapping,
    Sequence,
    String,
    Integer,
    Float,
    Boolean,
    Null,
}

impl PayloadKind {
    /// Classify a payload node
    pub fn of(value: &Payload) -> Self {
        match value {
            Value::Object(_) => PayloadKind::Mapping,
            Value::Array(_) => PayloadKind::Sequence,
            Value::String(_) => PayloadKind::String,
            Value::Number(n) if n.is_i64() || n.is_u64() => PayloadKind::Integer,
            Value::Number(_) => PayloadKind::Float,
            Value::Bool(_) => PayloadKind::Boolean,
            Value::Null => PayloadKind::Null,
        }
    }

    /// Lower-case name used in mismatch messages
    pub fn name(&self) -> &'static str {
        match self {
            PayloadKind::Mapping => "mapping",
            PayloadKind::Sequence => "sequence",
            PayloadKind::String => "string",
            PayloadKind::Integer => "integer",
            PayloadKind::Float => "float",
            PayloadKind::Boolean => "boolean",
            PayloadKind::Null => "null",
        }
    }
}

impl std::fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
