use std::fmt;

use serde::{Deserialize, Serialize};

use crate::api::ProcessOutcome;

/// Quality grade the pipeline assigns to a processed item.
///
/// Grades describe how the run went; they never decide routing. An item
/// with a poor grade can still publish if the pipeline said so, and the
/// reverse also holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    /// Clean run, output publishable as-is.
    A,
    /// Minor issues, still auto-publishable.
    B,
    /// Numeric or date mismatch; the item may be resubmitted.
    C,
    /// Serious issue, the output needs a human before it ships.
    D,
}

impl Grade {
    pub fn is_auto_publishable(&self) -> bool {
        matches!(self, Grade::A | Grade::B)
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Grade::C)
    }

    pub fn needs_review(&self) -> bool {
        matches!(self, Grade::D)
    }

    /// Short human-readable description for status output.
    pub fn describe(&self) -> &'static str {
        match self {
            Grade::A => "clean",
            Grade::B => "minor issues",
            Grade::C => "retryable",
            Grade::D => "needs review",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
        };
        write!(f, "{letter}")
    }
}

/// Which bucket a processed item landed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Disposition {
    /// Pipeline succeeded and the article went live.
    Published,
    /// Pipeline succeeded but the article is waiting for a human.
    Held,
    /// Pipeline did not complete for this item.
    Failed,
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let word = match self {
            Disposition::Published => "published",
            Disposition::Held => "held",
            Disposition::Failed => "failed",
        };
        write!(f, "{word}")
    }
}

/// Sorts a process outcome into its disposition bucket.
pub struct GradingPolicy;

impl GradingPolicy {
    /// Routing looks only at the `success` and `published` flags; the
    /// grade is recorded for display but never consulted here.
    pub fn classify(outcome: &ProcessOutcome) -> Disposition {
        if !outcome.success {
            Disposition::Failed
        } else if outcome.published {
            Disposition::Published
        } else {
            Disposition::Held
        }
    }
}
