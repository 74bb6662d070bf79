//! Run Summary - one row per completed simulation run

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::row::{FieldValue, ResultRow, RowField};

/// Summary of a single simulation run.
///
/// The typical payload for a parameter sweep: every participating process
/// appends one `RunSummary` per run to its own result file, and aggregation
/// tooling merges the per-rank files afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunSummary {
    timesteps: u64,
    agent_count: u64,
    runtime_ms: u64,
    finished_at: DateTime<Utc>,
    parameters: Option<serde_json::Value>,
}

impl RunSummary {
    /// Create a run summary with the current completion timestamp.
    ///
    /// # Arguments
    ///
    /// * `timesteps` - Number of simulation timesteps executed
    /// * `agent_count` - Agent population at the end of the run
    /// * `runtime_ms` - Wall-clock runtime in milliseconds
    #[must_use]
    pub fn new(timesteps: u64, agent_count: u64, runtime_ms: u64) -> Self {
        Self {
            timesteps,
            agent_count,
            runtime_ms,
            finished_at: Utc::now(),
            parameters: None,
        }
    }

    /// Create a builder for constructing a run summary with optional fields.
    #[must_use]
    pub fn builder(timesteps: u64, agent_count: u64, runtime_ms: u64) -> RunSummaryBuilder {
        RunSummaryBuilder::new(timesteps, agent_count, runtime_ms)
    }

    /// Number of simulation timesteps executed.
    #[must_use]
    pub const fn timesteps(&self) -> u64 {
        self.timesteps
    }

    /// Agent population at the end of the run.
    #[must_use]
    pub const fn agent_count(&self) -> u64 {
        self.agent_count
    }

    /// Wall-clock runtime in milliseconds.
    #[must_use]
    pub const fn runtime_ms(&self) -> u64 {
        self.runtime_ms
    }

    /// Completion timestamp.
    #[must_use]
    pub const fn finished_at(&self) -> DateTime<Utc> {
        self.finished_at
    }

    /// Run parameters, if any.
    #[must_use]
    pub const fn parameters(&self) -> Option<&serde_json::Value> {
        self.parameters.as_ref()
    }
}

impl ResultRow for RunSummary {
    fn fields(&self) -> Vec<RowField> {
        vec![
            RowField::new("timesteps", FieldValue::UInt64(self.timesteps)),
            RowField::new("agent_count", FieldValue::UInt64(self.agent_count)),
            RowField::new("runtime_ms", FieldValue::UInt64(self.runtime_ms)),
            RowField::new("finished_at", FieldValue::Timestamp(self.finished_at)),
            RowField::new(
                "parameters",
                FieldValue::Text(
                    self.parameters
                        .as_ref()
                        .map(ToString::to_string)
                        .unwrap_or_default(),
                ),
            ),
        ]
    }
}

/// Builder for `RunSummary`.
#[derive(Debug)]
pub struct RunSummaryBuilder {
    timesteps: u64,
    agent_count: u64,
    runtime_ms: u64,
    finished_at: DateTime<Utc>,
    parameters: Option<serde_json::Value>,
}

impl RunSummaryBuilder {
    /// Create a new builder with required fields.
    #[must_use]
    pub fn new(timesteps: u64, agent_count: u64, runtime_ms: u64) -> Self {
        Self {
            timesteps,
            agent_count,
            runtime_ms,
            finished_at: Utc::now(),
            parameters: None,
        }
    }

    /// Set the run parameters (stored as a JSON text column).
    #[must_use]
    pub fn parameters(mut self, parameters: serde_json::Value) -> Self {
        self.parameters = Some(parameters);
        self
    }

    /// Set a custom completion timestamp (useful for replays/testing).
    #[must_use]
    pub const fn finished_at(mut self, finished_at: DateTime<Utc>) -> Self {
        self.finished_at = finished_at;
        self
    }

    /// Build the `RunSummary`.
    #[must_use]
    pub fn build(self) -> RunSummary {
        RunSummary {
            timesteps: self.timesteps,
            agent_count: self.agent_count,
            runtime_ms: self.runtime_ms,
            finished_at: self.finished_at,
            parameters: self.parameters,
        }
    }
}
