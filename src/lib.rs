//! # Simtrack: Per-Process Experiment Result Recording
//!
//! Simtrack records experiment results from distributed agent-based
//! simulation runs. Each process appends rows to its own Arrow/Parquet
//! result file, partitioned by `(experiment name, host, rank)`, so a
//! multi-process run needs no cross-process locking and result-aggregation
//! tooling can merge the per-rank files afterwards.
//!
//! A small visualization-control component wires simulation state to an
//! owned GUI frame behind a trait seam; it shares no code with the recorder
//! and can be ignored by headless deployments.
//!
//! ## Design
//!
//! - **One file per process**: the file naming contract
//!   `<dir>/<name>_results.<host>-<rank>.parquet` is the concurrency model
//! - **Fail visibly, continue**: a failed append is logged, never raised;
//!   losing one result snapshot must not abort a simulation run
//! - **Runtime capability check**: without a launcher rank in the
//!   environment the recorder degrades to a logged no-op
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use simtrack::record::RunSummary;
//! use simtrack::recorder::ResultRecorder;
//!
//! let recorder = ResultRecorder::new();
//! let summary = RunSummary::builder(10_000, 482, 93_512)
//!     .parameters(serde_json::json!({"diffusion_coeff": 0.4}))
//!     .build();
//! recorder.append("soma_growth", "Soma growth parameter sweep", &summary);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod error;
pub mod identity;
pub mod record;
pub mod recorder;
pub mod row;
pub mod viz;

pub use error::{Error, Result};
pub use identity::{EnvIdentity, FixedIdentity, IdentitySource, ProcessIdentity};
pub use recorder::{ResultFile, ResultRecorder};
pub use row::{FieldValue, ResultRow, RowField};
pub use viz::{Theme, VisFrame, VizController};
