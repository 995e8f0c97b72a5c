//! Structural payload comparison.
//!
//! Compares two JSON payloads fetched through different clients and reports
//! whether they agree once client-specific noise is removed.
//!
//! ## Entry point
//!
//! ```
//! use clandiff_core::payload::{evaluate, CompareOptions, Verdict};
//! use serde_json::json;
//!
//! let verdict = evaluate(
//!     &json!({"a": {"x": 1, "y": 2}}),
//!     &json!({"a": {"x": 1, "y": 3}}),
//!     &CompareOptions::default(),
//! );
//! match verdict {
//!     Verdict::Mismatch(diff) => assert_eq!(diff.to_string(), "root.a.y: value mismatch 2 vs 3"),
//!     Verdict::Equivalent(_) => unreachable!(),
//! }
//! ```
//!
//! ## Guarantees
//!
//! - **Normalization is idempotent**: ignored fields and `_`-prefixed keys are
//!   dropped at every depth, and a normalized payload normalizes to itself.
//! - **Mapping order is irrelevant, sequence order is not.**
//! - **First difference only**: the walk short-circuits in sorted-key,
//!   ascending-index order.

pub mod canonical;
pub mod compare;
pub mod difference;
pub mod model;
pub mod normalize;

pub use canonical::canonical_text;
pub use compare::{compare_payloads, evaluate, CompareOptions, Equivalence, Verdict};
pub use difference::{find_difference, Difference, DifferenceKind, Side};
pub use model::{Payload, PayloadKind};
pub use normalize::{NormalizeRules, DEFAULT_IGNORED_FIELDS, DEFAULT_PRIVATE_PREFIX};
