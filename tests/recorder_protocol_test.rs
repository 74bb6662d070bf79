//! Result-append protocol tests
//!
//! Covers the per-process append contract: file naming, accumulation across
//! recorder restarts, description preservation, failure absorption, and the
//! degraded no-launcher branch.

use std::fs;

use anyhow::Result;
use arrow::array::Int64Array;
use simtrack::identity::NoIdentity;
use simtrack::row::{FieldValue, ResultRow, RowField};
use simtrack::{Error, FixedIdentity, ProcessIdentity, ResultFile, ResultRecorder};
use tempfile::tempdir;

struct Observation {
    trial: i64,
}

impl ResultRow for Observation {
    fn fields(&self) -> Vec<RowField> {
        vec![RowField::new("trial", FieldValue::Int64(self.trial))]
    }
}

struct FloatObservation {
    trial: f64,
}

impl ResultRow for FloatObservation {
    fn fields(&self) -> Vec<RowField> {
        vec![RowField::new("trial", FieldValue::Float64(self.trial))]
    }
}

fn recorder_for(dir: &std::path::Path, rank: u32) -> ResultRecorder {
    ResultRecorder::builder()
        .output_dir(dir)
        .identity_source(FixedIdentity::new(ProcessIdentity::new("node01", rank)))
        .build()
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}

// =============================================================================
// Naming Contract
// =============================================================================

#[test]
fn test_append_creates_file_at_contract_path() -> Result<()> {
    let dir = tempdir()?;
    let recorder = recorder_for(dir.path(), 2);

    recorder.try_append("sweep", "sweep results", &Observation { trial: 1 })?;

    let expected = dir.path().join("sweep_results.node01-2.parquet");
    assert!(expected.exists());
    Ok(())
}

#[test]
fn test_ranks_never_share_a_file() -> Result<()> {
    let dir = tempdir()?;
    let rank0 = recorder_for(dir.path(), 0);
    let rank1 = recorder_for(dir.path(), 1);

    rank0.try_append("sweep", "sweep results", &Observation { trial: 10 })?;
    rank1.try_append("sweep", "sweep results", &Observation { trial: 20 })?;

    let file0 = ResultFile::open(dir.path().join("sweep_results.node01-0.parquet"))?;
    let file1 = ResultFile::open(dir.path().join("sweep_results.node01-1.parquet"))?;
    assert_eq!(file0.num_rows(), 1);
    assert_eq!(file1.num_rows(), 1);
    Ok(())
}

#[test]
fn test_empty_name_rejected() {
    let dir = tempdir().unwrap();
    let recorder = recorder_for(dir.path(), 0);

    let err = recorder
        .try_append("", "no name", &Observation { trial: 1 })
        .unwrap_err();
    assert!(matches!(err, Error::InvalidName(_)));
}

// =============================================================================
// Table Creation & Accumulation
// =============================================================================

#[test]
fn test_first_append_creates_table_with_brief() -> Result<()> {
    let dir = tempdir()?;
    let recorder = recorder_for(dir.path(), 0);

    recorder.try_append("growth", "Growth curve experiment", &Observation { trial: 7 })?;

    let file = ResultFile::open(dir.path().join("growth_results.node01-0.parquet"))?;
    assert_eq!(file.table_name(), "growth");
    assert_eq!(file.brief(), "Growth curve experiment");
    assert_eq!(file.num_rows(), 1);
    Ok(())
}

#[test]
fn test_appends_accumulate_across_restarts_in_order() -> Result<()> {
    let dir = tempdir()?;

    // Each iteration builds a fresh recorder, simulating a process restart
    // with the same (name, host, rank).
    for trial in [10, 20, 30] {
        let recorder = recorder_for(dir.path(), 0);
        recorder.try_append("sweep", "sweep results", &Observation { trial })?;
    }

    let file = ResultFile::open(dir.path().join("sweep_results.node01-0.parquet"))?;
    assert_eq!(file.num_rows(), 3);

    let mut read_back = Vec::new();
    for batch in file.batches() {
        let column = batch
            .column(0)
            .as_any()
            .downcast_ref::<Int64Array>()
            .expect("trial column");
        read_back.extend(column.values().iter().copied());
    }
    assert_eq!(read_back, vec![10, 20, 30]);
    Ok(())
}

#[test]
fn test_brief_from_first_append_is_preserved() -> Result<()> {
    let dir = tempdir()?;
    let recorder = recorder_for(dir.path(), 0);

    recorder.try_append("sweep", "original description", &Observation { trial: 1 })?;
    recorder.try_append("sweep", "a different description", &Observation { trial: 2 })?;

    let file = ResultFile::open(dir.path().join("sweep_results.node01-0.parquet"))?;
    assert_eq!(file.brief(), "original description");
    assert_eq!(file.num_rows(), 2);
    Ok(())
}

// =============================================================================
// Failure Absorption
// =============================================================================

#[test]
fn test_schema_mismatch_reported_and_rows_intact() -> Result<()> {
    init_tracing();
    let dir = tempdir()?;
    let recorder = recorder_for(dir.path(), 0);

    recorder.try_append("sweep", "sweep results", &Observation { trial: 1 })?;

    let err = recorder
        .try_append("sweep", "sweep results", &FloatObservation { trial: 2.0 })
        .unwrap_err();
    assert!(matches!(err, Error::SchemaMismatch { .. }));

    // The absorbing entry point must return normally on the same failure.
    recorder.append("sweep", "sweep results", &FloatObservation { trial: 2.0 });

    let file = ResultFile::open(dir.path().join("sweep_results.node01-0.parquet"))?;
    assert_eq!(file.num_rows(), 1);
    Ok(())
}

#[test]
fn test_foreign_table_file_rejected() -> Result<()> {
    let dir = tempdir()?;
    let recorder = recorder_for(dir.path(), 0);

    recorder.try_append("alpha", "alpha results", &Observation { trial: 1 })?;

    // Masquerade the alpha file as beta's: the stored table name no longer
    // matches the append target.
    fs::rename(
        dir.path().join("alpha_results.node01-0.parquet"),
        dir.path().join("beta_results.node01-0.parquet"),
    )?;

    let err = recorder
        .try_append("beta", "beta results", &Observation { trial: 2 })
        .unwrap_err();
    assert!(matches!(err, Error::TableMismatch { .. }));
    Ok(())
}

#[test]
fn test_failed_append_leaves_no_partial_file() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("does-not-exist");
    let recorder = ResultRecorder::builder()
        .output_dir(&missing)
        .identity_source(FixedIdentity::new(ProcessIdentity::new("node01", 0)))
        .build();

    let result = recorder.try_append("sweep", "sweep results", &Observation { trial: 1 });
    assert!(result.is_err());

    // Neither a target nor a temporary file may appear anywhere.
    assert!(!missing.exists());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

// =============================================================================
// Degraded Mode (no multi-process launcher)
// =============================================================================

#[test]
fn test_no_identity_degrades_to_logged_noop() {
    init_tracing();
    let dir = tempdir().unwrap();
    let recorder = ResultRecorder::builder()
        .output_dir(dir.path())
        .identity_source(NoIdentity)
        .build();

    // Absorbing entry point: returns normally, writes nothing.
    recorder.append("sweep", "sweep results", &Observation { trial: 1 });
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);

    // Fallible twin reports the unsupported environment.
    let err = recorder
        .try_append("sweep", "sweep results", &Observation { trial: 1 })
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedEnvironment(_)));
}

// =============================================================================
// Property Tests
// =============================================================================

mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        /// Property: N appends yield exactly N rows, whatever the values.
        #[test]
        fn prop_append_count_preserved(values in prop::collection::vec(any::<i64>(), 1..6)) {
            let dir = tempdir().unwrap();
            let recorder = recorder_for(dir.path(), 0);

            for &trial in &values {
                recorder
                    .try_append("sweep", "sweep results", &Observation { trial })
                    .unwrap();
            }

            let file = ResultFile::open(dir.path().join("sweep_results.node01-0.parquet")).unwrap();
            prop_assert_eq!(file.num_rows(), values.len());
        }

        /// Property: distinct ranks map to distinct paths for any name.
        #[test]
        fn prop_rank_paths_distinct(rank_a in 0u32..1000, rank_b in 0u32..1000) {
            prop_assume!(rank_a != rank_b);
            let recorder = ResultRecorder::builder().output_dir("/results").build();
            let path_a = recorder
                .result_path("sweep", &ProcessIdentity::new("node01", rank_a))
                .unwrap();
            let path_b = recorder
                .result_path("sweep", &ProcessIdentity::new("node01", rank_b))
                .unwrap();
            prop_assert_ne!(path_a, path_b);
        }
    }
}
