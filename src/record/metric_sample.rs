//! Metric Sample - scalar metric observations as rows

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::row::{FieldValue, ResultRow, RowField};

/// A single scalar metric observation.
///
/// Appending one `MetricSample` per step to a metric's own table yields a
/// time-series that reads back in step order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricSample {
    key: String,
    step: u64,
    value: f64,
    timestamp: DateTime<Utc>,
}

impl MetricSample {
    /// Create a metric sample with the current timestamp.
    ///
    /// # Arguments
    ///
    /// * `key` - Metric name (e.g., "total_energy", "agent_count")
    /// * `step` - Simulation step the value was observed at
    /// * `value` - Observed value
    #[must_use]
    pub fn new(key: impl Into<String>, step: u64, value: f64) -> Self {
        Self {
            key: key.into(),
            step,
            value,
            timestamp: Utc::now(),
        }
    }

    /// Metric name.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Simulation step the value was observed at.
    #[must_use]
    pub const fn step(&self) -> u64 {
        self.step
    }

    /// Observed value.
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.value
    }

    /// Wall-clock time of the observation.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

impl ResultRow for MetricSample {
    fn fields(&self) -> Vec<RowField> {
        vec![
            RowField::new("key", FieldValue::Text(self.key.clone())),
            RowField::new("step", FieldValue::UInt64(self.step)),
            RowField::new("value", FieldValue::Float64(self.value)),
            RowField::new("timestamp", FieldValue::Timestamp(self.timestamp)),
        ]
    }
}
