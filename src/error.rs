use thiserror::Error;

use crate::data::model::FieldType;

// ---------------------------------------------------------------------------
// Dataset / filter errors
// ---------------------------------------------------------------------------

/// A criterion or mutation referenced something the dataset schema does not have.
///
/// These are surfaced to the caller as-is: silently matching nothing would be
/// indistinguishable from an empty result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("field '{field}' is not a column of the dataset")]
    UnknownField { field: String },

    #[error("field '{field}' holds {found} values, expected {expected}")]
    FieldType {
        field: String,
        expected: FieldType,
        found: FieldType,
    },

    #[error("no column name contains '{marker}'")]
    MissingColumn { marker: String },

    #[error("row {row} does not exist (dataset has {len} rows)")]
    NoSuchRow { row: usize, len: usize },
}

// ---------------------------------------------------------------------------
// Audio transform errors
// ---------------------------------------------------------------------------

/// Rejections raised before an audio transform touches any sample.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformError {
    #[error("{parameter} = {value} is outside the accepted range {bounds}")]
    OutOfRange {
        parameter: &'static str,
        value: f64,
        bounds: &'static str,
    },

    #[error("sample rate must be positive, got {0}")]
    InvalidSampleRate(u32),
}
