//! Per-process result recording (Arrow/Parquet)
//!
//! **Append-Only Write Pattern**:
//! - One result file per `(experiment name, host, rank)` tuple
//! - Write pattern: read-merge-rewrite with an atomic rename, one row per append
//! - The per-rank file naming IS the concurrency control: processes never
//!   share a file, so no locking is needed across a multi-process run
//! - Within one process, concurrent appends to the same name must be
//!   serialized by the caller
//!
//! Failures never propagate out of [`ResultRecorder::append`]: losing one
//! result snapshot must not abort a whole simulation run, so errors are
//! logged and the call returns. [`ResultRecorder::try_append`] exposes the
//! same protocol with a `Result` for callers that need to observe failures.

use std::collections::HashMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::file::properties::WriterProperties;

use crate::identity::{EnvIdentity, IdentitySource, ProcessIdentity};
use crate::row::{batch_for, describe_columns, schema_for, ResultRow};
use crate::{Error, Result};

/// File extension of result files.
pub const FILE_EXT: &str = "parquet";

/// Schema metadata key carrying the table name.
const TABLE_NAME_KEY: &str = "simtrack.table.name";

/// Schema metadata key carrying the table description.
const TABLE_BRIEF_KEY: &str = "simtrack.table.brief";

/// Recorder appending one experiment result at a time to the calling
/// process's own result file.
pub struct ResultRecorder {
    output_dir: Option<PathBuf>,
    identity: Box<dyn IdentitySource>,
}

impl ResultRecorder {
    /// Create a recorder with environment-based identity detection and the
    /// process working directory as output location.
    #[must_use]
    pub fn new() -> Self {
        Self {
            output_dir: None,
            identity: Box::new(EnvIdentity::new()),
        }
    }

    /// Create a recorder builder.
    #[must_use]
    pub fn builder() -> RecorderBuilder {
        RecorderBuilder::default()
    }

    /// Append one result row to the table `name`, logging instead of
    /// returning any failure.
    ///
    /// This is the production entry point: a failed write costs one result
    /// snapshot, never the run.
    pub fn append(&self, name: &str, brief: &str, row: &dyn ResultRow) {
        if let Err(err) = self.try_append(name, brief, row) {
            tracing::error!(experiment = name, error = %err, "failed to record result");
        }
    }

    /// Append one result row to the table `name`.
    ///
    /// Creates the per-process result file and table on first use (with
    /// `brief` as the table description); appends to the existing table
    /// thereafter, preserving every previously written row and the original
    /// description.
    ///
    /// # Errors
    ///
    /// Returns an error when the experiment name is invalid, the process
    /// identity is unavailable, the on-disk column structure does not match
    /// the row, or the storage layer fails. No partial row is left behind in
    /// any of these cases.
    pub fn try_append(&self, name: &str, brief: &str, row: &dyn ResultRow) -> Result<()> {
        validate_name(name)?;

        let Some(identity) = self.identity.identity() else {
            return Err(Error::UnsupportedEnvironment(
                "no multi-process launcher rank found in the environment".to_string(),
            ));
        };

        let path = self.result_path(name, &identity)?;

        let (schema, mut batches) = if path.exists() {
            let existing = ResultFile::open(&path)?;
            if existing.table_name() != name {
                return Err(Error::TableMismatch {
                    expected: name.to_string(),
                    found: existing.table_name().to_string(),
                });
            }
            // Bind the new row to the column structure already on disk.
            let incoming = schema_for(row, HashMap::new())?;
            if existing.schema().fields() != incoming.fields() {
                return Err(Error::SchemaMismatch {
                    table: name.to_string(),
                    existing: describe_columns(existing.schema()),
                    incoming: describe_columns(&incoming),
                });
            }
            tracing::debug!(experiment = name, path = %path.display(), "appending to existing result table");
            (existing.schema.clone(), existing.batches)
        } else {
            let mut metadata = HashMap::new();
            metadata.insert(TABLE_NAME_KEY.to_string(), name.to_string());
            metadata.insert(TABLE_BRIEF_KEY.to_string(), brief.to_string());
            tracing::debug!(experiment = name, path = %path.display(), "creating result table");
            (schema_for(row, metadata)?, Vec::new())
        };

        batches.push(batch_for(row, schema.clone())?);
        persist(&path, &schema, &batches)
    }

    /// Target file path for `name` as written by the given process:
    /// `<output-dir>/<name>_results.<host>-<rank>.parquet`.
    ///
    /// Downstream aggregation tooling relies on this exact layout.
    ///
    /// # Errors
    ///
    /// Returns an error if no output directory was configured and the
    /// process working directory cannot be resolved.
    pub fn result_path(&self, name: &str, identity: &ProcessIdentity) -> Result<PathBuf> {
        let dir = match &self.output_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir()?,
        };
        Ok(dir.join(format!(
            "{name}_results.{host}-{rank}.{FILE_EXT}",
            host = identity.host(),
            rank = identity.rank()
        )))
    }
}

impl Default for ResultRecorder {
    fn default() -> Self {
        Self::new()
    }
}

/// Recorder builder
#[derive(Default)]
pub struct RecorderBuilder {
    output_dir: Option<PathBuf>,
    identity: Option<Box<dyn IdentitySource>>,
}

impl RecorderBuilder {
    /// Set the directory result files are written to.
    ///
    /// Defaults to the process working directory, resolved per append.
    #[must_use]
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Set the process identity source.
    ///
    /// Defaults to launcher environment detection ([`EnvIdentity`]).
    #[must_use]
    pub fn identity_source(mut self, source: impl IdentitySource + 'static) -> Self {
        self.identity = Some(Box::new(source));
        self
    }

    /// Build the recorder.
    #[must_use]
    pub fn build(self) -> ResultRecorder {
        ResultRecorder {
            output_dir: self.output_dir,
            identity: self
                .identity
                .unwrap_or_else(|| Box::new(EnvIdentity::new())),
        }
    }
}

/// A result file read back from disk.
///
/// The read surface for result-aggregation tooling and tests: table
/// identity, description, and every persisted row batch in write order.
pub struct ResultFile {
    table_name: String,
    brief: String,
    schema: SchemaRef,
    batches: Vec<RecordBatch>,
}

impl ResultFile {
    /// Open a result file and read back its table.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not a result file
    /// (missing table metadata), or a row batch is corrupt.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())
            .map_err(|e| Error::StorageError(format!("failed to open result file: {e}")))?;
        let builder = ParquetRecordBatchReaderBuilder::try_new(file)
            .map_err(|e| Error::StorageError(format!("failed to parse result file: {e}")))?;
        let schema = builder.schema().clone();

        let table_name = schema
            .metadata()
            .get(TABLE_NAME_KEY)
            .cloned()
            .ok_or_else(|| {
                Error::StorageError(format!(
                    "{} is not a result file (missing table metadata)",
                    path.as_ref().display()
                ))
            })?;
        let brief = schema
            .metadata()
            .get(TABLE_BRIEF_KEY)
            .cloned()
            .unwrap_or_default();

        let reader = builder
            .build()
            .map_err(|e| Error::StorageError(format!("failed to read result file: {e}")))?;
        let mut batches = Vec::new();
        for batch in reader {
            let batch =
                batch.map_err(|e| Error::StorageError(format!("failed to read row batch: {e}")))?;
            // Normalize each batch onto the file schema so later re-writes
            // compare and write against a single schema instance.
            batches.push(RecordBatch::try_new(schema.clone(), batch.columns().to_vec())?);
        }

        Ok(Self {
            table_name,
            brief,
            schema,
            batches,
        })
    }

    /// Name of the table stored in this file.
    #[must_use]
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// One-line table description supplied when the table was created.
    #[must_use]
    pub fn brief(&self) -> &str {
        &self.brief
    }

    /// Column structure of the table.
    #[must_use]
    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    /// All persisted row batches, in write order.
    #[must_use]
    pub fn batches(&self) -> &[RecordBatch] {
        &self.batches
    }

    /// Total number of rows in the table.
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(RecordBatch::num_rows).sum()
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidName("name is empty".to_string()));
    }
    if name.contains(['/', '\\']) || name.contains("..") {
        return Err(Error::InvalidName(format!(
            "'{name}' contains path components"
        )));
    }
    Ok(())
}

/// Write all batches to a temporary sibling, sync, then atomically rename
/// over the target. A failure anywhere leaves the target untouched.
fn persist(path: &Path, schema: &SchemaRef, batches: &[RecordBatch]) -> Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    if let Err(err) = write_all(&tmp, schema, batches) {
        let _ = fs::remove_file(&tmp);
        return Err(err);
    }
    if let Err(err) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(err.into());
    }
    Ok(())
}

fn write_all(tmp: &Path, schema: &SchemaRef, batches: &[RecordBatch]) -> Result<()> {
    let file = File::create(tmp)?;
    let props = WriterProperties::builder().build();
    let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;
    for batch in batches {
        writer.write(batch)?;
    }
    // Finalize the footer, then push the bytes to disk before the rename
    // makes the file visible under its real name.
    let file = writer.into_inner()?;
    file.sync_all()?;
    Ok(())
}
