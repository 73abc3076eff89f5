//! Pass Record - one completed recomputation pass

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Record of a committed recomputation pass.
///
/// Failed passes are never recorded: they leave no trace in the graph.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PassRecord {
    pass: u64,
    trigger: String,
    recomputed: Vec<String>,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
}

impl PassRecord {
    pub(crate) fn new(
        pass: u64,
        trigger: impl Into<String>,
        recomputed: Vec<String>,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            pass,
            trigger: trigger.into(),
            recomputed,
            started_at,
            finished_at: Utc::now(),
        }
    }

    /// Sequence number (the build pass is 0).
    #[must_use]
    pub const fn pass(&self) -> u64 {
        self.pass
    }

    /// Name of the parameter that triggered the pass, or `"build"` / `"all"`.
    #[must_use]
    pub fn trigger(&self) -> &str {
        &self.trigger
    }

    /// Cells recomputed, in the order they ran.
    #[must_use]
    pub fn recomputed(&self) -> &[String] {
        &self.recomputed
    }

    /// True if `cell` ran during this pass.
    #[must_use]
    pub fn ran(&self, cell: &str) -> bool {
        self.recomputed.iter().any(|name| name == cell)
    }

    /// When the pass started
    #[must_use]
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// When the pass committed
    #[must_use]
    pub const fn finished_at(&self) -> DateTime<Utc> {
        self.finished_at
    }
}
