//! Divergence localization.
//!
//! Walks two normalized payloads in lockstep and reports the first place they
//! disagree. Mapping keys are visited in sorted order, sequence elements by
//! index, and the walk stops at the first difference.

use crate::payload::model::{Payload, PayloadKind};
use serde_json::Value;
use std::collections::BTreeSet;

/// Label of the path's starting point
pub const ROOT_LABEL: &str = "root";

/// Which side of the comparison a key is absent from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// What went wrong at a given path
#[derive(Debug, Clone, PartialEq)]
pub enum DifferenceKind {
    /// The two nodes are of different kinds; descent stops here
    TypeMismatch {
        left: PayloadKind,
        right: PayloadKind,
    },
    /// A mapping key exists on one side only
    MissingKey { missing_from: Side },
    /// Two sequences have different lengths
    LengthMismatch { left: usize, right: usize },
    /// Two scalars of the same kind hold different values
    ValueMismatch { left: Value, right: Value },
}

/// First difference found between two payloads
#[derive(Debug, Clone, PartialEq)]
pub struct Difference {
    /// Dotted/indexed path such as `root.memberList[3].name`
    pub path: String,
    pub kind: DifferenceKind,
}

impl Difference {
    /// Human-readable description using custom side labels
    ///
    /// ```
    /// use clandiff_core::payload::difference::find_difference;
    /// use serde_json::json;
    ///
    /// let diff = find_difference(&json!({"a": 1}), &json!({})).unwrap();
    /// assert_eq!(diff.describe("in-process", "external"), "root.a: missing from external payload");
    /// ```
    pub fn describe(&self, left_label: &str, right_label: &str) -> String {
        match &self.kind {
            DifferenceKind::TypeMismatch { left, right } => {
                format!("{}: type mismatch {} vs {}", self.path, left, right)
            }
            DifferenceKind::MissingKey { missing_from } => {
                let label = match missing_from {
                    Side::Left => left_label,
                    Side::Right => right_label,
                };
                format!("{}: missing from {} payload", self.path, label)
            }
            DifferenceKind::LengthMismatch { left, right } => {
                format!("{}: sequence length {} vs {}", self.path, left, right)
            }
            DifferenceKind::ValueMismatch { left, right } => {
                format!("{}: value mismatch {} vs {}", self.path, left, right)
            }
        }
    }
}

impl std::fmt::Display for Difference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.describe("left", "right"))
    }
}

/// Locate the first difference between two payloads, starting at `root`.
///
/// Returns `None` when the payloads are structurally equal.
pub fn find_difference(left: &Payload, right: &Payload) -> Option<Difference> {
    find_difference_at(left, right, ROOT_LABEL.to_string())
}

fn find_difference_at(left: &Value, right: &Value, path: String) -> Option<Difference> {
    let left_kind = PayloadKind::of(left);
    let right_kind = PayloadKind::of(right);
    if left_kind != right_kind {
        return Some(Difference {
            path,
            kind: DifferenceKind::TypeMismatch {
                left: left_kind,
                right: right_kind,
            },
        });
    }

    match (left, right) {
        (Value::Object(a), Value::Object(b)) => {
            let keys: BTreeSet<&String> = a.keys().chain(b.keys()).collect();
            for key in keys {
                let child_path = format!("{}.{}", path, key);
                match (a.get(key.as_str()), b.get(key.as_str())) {
                    (None, _) => {
                        return Some(Difference {
                            path: child_path,
                            kind: DifferenceKind::MissingKey {
                                missing_from: Side::Left,
                            },
                        })
                    }
                    (_, None) => {
                        return Some(Difference {
                            path: child_path,
                            kind: DifferenceKind::MissingKey {
                                missing_from: Side::Right,
                            },
                        })
                    }
                    (Some(av), Some(bv)) => {
                        if let Some(diff) = find_difference_at(av, bv, child_path) {
                            return Some(diff);
                        }
                    }
                }
            }
            None
        }
        (Value::Array(a), Value::Array(b)) => {
            if a.len() != b.len() {
                return Some(Difference {
                    path,
                    kind: DifferenceKind::LengthMismatch {
                        left: a.len(),
                        right: b.len(),
                    },
                });
            }
            a.iter()
                .zip(b.iter())
                .enumerate()
                .find_map(|(idx, (av, bv))| find_difference_at(av, bv, format!("{}[{}]", path, idx)))
        }
        _ if left != right => Some(Difference {
            path,
            kind: DifferenceKind::ValueMismatch {
                left: left.clone(),
                right: right.clone(),
            },
        }),
        _ => None,
    }
}
