//! Structural comparator.
//!
//! Entry points are [`evaluate`], which returns a [`Verdict`], and
//! [`compare_payloads`], which turns a mismatch into an `ERR_MISMATCH` error
//! for callers that treat divergence as a failed run.

use crate::errors::{ExError, ExErrorKind, Result};
use crate::payload::canonical::canonical_text;
use crate::payload::difference::{find_difference, Difference, DifferenceKind, ROOT_LABEL};
use crate::payload::model::{Payload, PayloadKind};
use crate::payload::normalize::NormalizeRules;
use crate::{log_op_end, log_op_start};
use std::time::Instant;

/// Comparison settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareOptions {
    pub rules: NormalizeRules,
    /// Accept payloads whose canonical text matches even when direct
    /// equality fails. Disabled by `--strict`.
    pub canonical_fallback: bool,
    pub left_label: String,
    pub right_label: String,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            rules: NormalizeRules::default(),
            canonical_fallback: true,
            left_label: "left".to_string(),
            right_label: "right".to_string(),
        }
    }
}

impl CompareOptions {
    pub fn with_rules(mut self, rules: NormalizeRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.canonical_fallback = !strict;
        self
    }

    pub fn with_labels(mut self, left: impl Into<String>, right: impl Into<String>) -> Self {
        self.left_label = left.into();
        self.right_label = right.into();
        self
    }
}

/// How two payloads were judged equivalent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Equivalence {
    /// Normalized payloads are structurally equal
    Identical,
    /// Only the canonical text agrees (e.g. `1` vs `1.0`)
    Canonical,
}

/// Outcome of comparing two payloads
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Equivalent(Equivalence),
    Mismatch(Difference),
}

impl Verdict {
    pub fn is_equivalent(&self) -> bool {
        matches!(self, Verdict::Equivalent(_))
    }
}

impl Equivalence {
    /// One-line success message for the CLI
    pub fn summary(&self, options: &CompareOptions) -> String {
        match self {
            Equivalence::Identical => format!(
                "Success: {} and {} responses match byte-for-byte.",
                options.left_label, options.right_label
            ),
            Equivalence::Canonical => format!(
                "Success: {} and {} responses match after key normalization.",
                options.left_label, options.right_label
            ),
        }
    }
}

/// Normalize both payloads and decide whether they are equivalent.
///
/// Tier 1 is direct equality of the normalized payloads. Tier 2, when
/// enabled, compares canonical text. Only if both fail is the first
/// difference located.
pub fn evaluate(left: &Payload, right: &Payload, options: &CompareOptions) -> Verdict {
    let left = options.rules.normalize(left);
    let right = options.rules.normalize(right);

    if left == right {
        return Verdict::Equivalent(Equivalence::Identical);
    }

    if options.canonical_fallback && canonical_text(&left) == canonical_text(&right) {
        return Verdict::Equivalent(Equivalence::Canonical);
    }

    // Tier 1 failed, so the walk finds something; the fallback keeps the
    // function total.
    let diff = find_difference(&left, &right).unwrap_or_else(|| Difference {
        path: ROOT_LABEL.to_string(),
        kind: DifferenceKind::TypeMismatch {
            left: PayloadKind::of(&left),
            right: PayloadKind::of(&right),
        },
    });
    Verdict::Mismatch(diff)
}

/// Compare two payloads, mapping a mismatch to an `ERR_MISMATCH` error
///
/// # Errors
///
/// `Mismatch`, with the difference path as subject and a message naming both
/// sides, when the payloads are not equivalent.
pub fn compare_payloads(
    left: &Payload,
    right: &Payload,
    options: &CompareOptions,
) -> Result<Equivalence> {
    let start = Instant::now();
    log_op_start!("compare_payloads");

    match evaluate(left, right, options) {
        Verdict::Equivalent(eq) => {
            log_op_end!(
                "compare_payloads",
                duration_ms = start.elapsed().as_millis() as u64,
                equivalence = ?eq
            );
            Ok(eq)
        }
        Verdict::Mismatch(diff) => {
            let err = mismatch_error(&diff, options);
            crate::log_op_error!(
                "compare_payloads",
                err,
                duration_ms = start.elapsed().as_millis() as u64,
                diff_path = diff.path.as_str()
            );
            Err(err)
        }
    }
}

/// Build the error reported for a located difference
pub fn mismatch_error(diff: &Difference, options: &CompareOptions) -> ExError {
    ExError::new(ExErrorKind::Mismatch)
        .with_op("compare_payloads")
        .with_subject(diff.path.clone())
        .with_message(format!(
            "Mismatch detected between {} and {} payloads: {}",
            options.left_label,
            options.right_label,
            diff.describe(&options.left_label, &options.right_label)
        ))
}
