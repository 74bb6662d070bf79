//! Row capability for appendable result payloads
//!
//! Anything the recorder can append implements [`ResultRow`]: the type
//! reports its named, typed field values and this module turns them into an
//! Arrow schema plus a one-row `RecordBatch`. Column layout is derived from
//! the values themselves, so a payload type defines its table structure in
//! one place.

use std::collections::HashMap;
use std::sync::Arc;

use arrow::array::{
    ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray, TimestampMicrosecondArray,
    UInt64Array,
};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, Utc};

use crate::{Error, Result};

/// A single typed field value of a result row.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Boolean flag column
    Bool(bool),
    /// Signed 64-bit integer column
    Int64(i64),
    /// Unsigned 64-bit integer column
    UInt64(u64),
    /// 64-bit float column
    Float64(f64),
    /// UTF-8 text column
    Text(String),
    /// UTC timestamp column (microsecond precision)
    Timestamp(DateTime<Utc>),
}

impl FieldValue {
    /// Arrow data type this value maps to.
    #[must_use]
    pub fn data_type(&self) -> DataType {
        match self {
            Self::Bool(_) => DataType::Boolean,
            Self::Int64(_) => DataType::Int64,
            Self::UInt64(_) => DataType::UInt64,
            Self::Float64(_) => DataType::Float64,
            Self::Text(_) => DataType::Utf8,
            Self::Timestamp(_) => DataType::Timestamp(TimeUnit::Microsecond, Some("UTC".into())),
        }
    }

    fn into_single_array(self) -> ArrayRef {
        match self {
            Self::Bool(v) => Arc::new(BooleanArray::from(vec![v])),
            Self::Int64(v) => Arc::new(Int64Array::from(vec![v])),
            Self::UInt64(v) => Arc::new(UInt64Array::from(vec![v])),
            Self::Float64(v) => Arc::new(Float64Array::from(vec![v])),
            Self::Text(v) => Arc::new(StringArray::from(vec![v])),
            Self::Timestamp(v) => Arc::new(
                TimestampMicrosecondArray::from(vec![v.timestamp_micros()]).with_timezone("UTC"),
            ),
        }
    }
}

/// A named field of a result row.
#[derive(Debug, Clone, PartialEq)]
pub struct RowField {
    name: &'static str,
    value: FieldValue,
}

impl RowField {
    /// Create a named field.
    #[must_use]
    pub fn new(name: &'static str, value: FieldValue) -> Self {
        Self { name, value }
    }

    /// Column name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Current value.
    #[must_use]
    pub const fn value(&self) -> &FieldValue {
        &self.value
    }
}

/// Capability required of any payload appendable by the recorder.
///
/// Implementors return their current field values each time `fields` is
/// called; the recorder reads them once per append and retains no ownership
/// of the payload.
pub trait ResultRow {
    /// Named, typed field values making up one row, in column order.
    fn fields(&self) -> Vec<RowField>;
}

/// Build the Arrow schema for a row, with table identity carried as
/// schema-level metadata.
///
/// # Errors
///
/// Returns [`Error::RowError`] if the row has no fields or duplicate column
/// names.
pub fn schema_for(row: &dyn ResultRow, metadata: HashMap<String, String>) -> Result<SchemaRef> {
    let fields = row.fields();
    if fields.is_empty() {
        return Err(Error::RowError("row has no fields".to_string()));
    }
    let mut seen = Vec::with_capacity(fields.len());
    for f in &fields {
        if seen.contains(&f.name()) {
            return Err(Error::RowError(format!("duplicate column name: {}", f.name())));
        }
        seen.push(f.name());
    }

    let arrow_fields: Vec<Field> = fields
        .iter()
        .map(|f| Field::new(f.name(), f.value().data_type(), false))
        .collect();
    Ok(Arc::new(Schema::new_with_metadata(arrow_fields, metadata)))
}

/// Build a one-row `RecordBatch` from the row's current field values.
///
/// # Errors
///
/// Returns an error if the schema or batch cannot be constructed.
pub fn batch_for(row: &dyn ResultRow, schema: SchemaRef) -> Result<RecordBatch> {
    let arrays: Vec<ArrayRef> = row
        .fields()
        .into_iter()
        .map(|f| f.value.into_single_array())
        .collect();
    Ok(RecordBatch::try_new(schema, arrays)?)
}

/// Render a schema's column layout as `name:type` pairs for diagnostics.
#[must_use]
pub fn describe_columns(schema: &Schema) -> String {
    schema
        .fields()
        .iter()
        .map(|f| format!("{}:{}", f.name(), f.data_type()))
        .collect::<Vec<_>>()
        .join(", ")
}
