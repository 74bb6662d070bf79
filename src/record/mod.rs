//! Ready-made result record types
//!
//! Shipped payloads implementing [`crate::row::ResultRow`], one struct per
//! table shape:
//!
//! ```text
//! RunSummary   -> one row per completed simulation run
//! MetricSample -> one row per scalar metric observation [time-series]
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use simtrack::record::RunSummary;
//! use simtrack::recorder::ResultRecorder;
//!
//! let recorder = ResultRecorder::new();
//! let summary = RunSummary::new(10_000, 482, 93_512);
//! recorder.append("soma_growth", "Soma growth parameter sweep", &summary);
//! ```

mod metric_sample;
mod run_summary;

pub use metric_sample::MetricSample;
pub use run_summary::{RunSummary, RunSummaryBuilder};
