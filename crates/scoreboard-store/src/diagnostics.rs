//! Failure bookkeeping for the degrading store operations.
//!
//! The degrading entry points on [`crate::ScoreStore`] return the same value
//! for "nothing stored" and "storage failed". Callers that care about the
//! difference read a [`DiagnosticsSnapshot`] instead.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;

use crate::error::StoreError;

/// Which side of the failure policy an operation falls under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    Write,
    Read,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub operation: &'static str,
    pub kind: FailureKind,
    pub message: String,
    pub at: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DiagnosticsSnapshot {
    pub write_failures: u64,
    pub read_failures: u64,
    pub last_failure: Option<Failure>,
}

impl DiagnosticsSnapshot {
    pub fn is_healthy(&self) -> bool {
        self.last_failure.is_none()
    }
}

#[derive(Debug, Default)]
pub struct Diagnostics {
    inner: Mutex<DiagnosticsSnapshot>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&self, operation: &'static str, kind: FailureKind, error: &StoreError) {
        let mut inner = self.inner.lock();
        match kind {
            FailureKind::Write => inner.write_failures += 1,
            FailureKind::Read => inner.read_failures += 1,
        }
        inner.last_failure = Some(Failure {
            operation,
            kind,
            message: error.to_string(),
            at: Utc::now(),
        });
    }

    pub fn snapshot(&self) -> DiagnosticsSnapshot {
        self.inner.lock().clone()
    }

    pub fn reset(&self) {
        *self.inner.lock() = DiagnosticsSnapshot::default();
    }
}
