use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::error::SchemaError;

// ---------------------------------------------------------------------------
// FieldValue – a single cell of the dataset
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value.
/// Option lists are keyed in `BTreeMap`s, so `FieldValue` must be `Ord`.
#[derive(Debug, Clone)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    /// Calendar day; any time of day in the source is dropped.
    Date(NaiveDate),
    Missing,
}

// -- Manual Eq/Ord so we can key a BTreeMap by FieldValue --

impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for FieldValue {}

impl PartialOrd for FieldValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FieldValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use FieldValue::*;
        fn discriminant(v: &FieldValue) -> u8 {
            match v {
                Missing => 0,
                Number(_) => 1,
                Text(_) => 2,
                Date(_) => 3,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Number(a), Number(b)) => a.total_cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            (Date(a), Date(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{s}"),
            FieldValue::Number(v) => write!(f, "{v}"),
            FieldValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            FieldValue::Missing => write!(f, "<missing>"),
        }
    }
}

impl FieldValue {
    pub fn is_missing(&self) -> bool {
        matches!(self, FieldValue::Missing)
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// The column type this value belongs to; `None` for `Missing`, which fits any column.
    pub fn field_type(&self) -> Option<FieldType> {
        match self {
            FieldValue::Text(_) => Some(FieldType::Text),
            FieldValue::Number(_) => Some(FieldType::Number),
            FieldValue::Date(_) => Some(FieldType::Date),
            FieldValue::Missing => None,
        }
    }

    /// Parse raw cell text as a value of the given column type.
    ///
    /// Empty (or whitespace-only) input is `Missing`. Returns `None` when the
    /// text cannot be read as `ty`.
    pub fn parse_as(raw: &str, ty: FieldType) -> Option<FieldValue> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Some(FieldValue::Missing);
        }
        match ty {
            FieldType::Text => Some(FieldValue::Text(raw.to_string())),
            FieldType::Number => parse_number(trimmed).map(FieldValue::Number),
            FieldType::Date => parse_date(trimmed).map(FieldValue::Date),
        }
    }

    /// Text written to a CSV cell. `Missing` is the empty cell.
    pub fn to_cell(&self) -> String {
        match self {
            FieldValue::Missing => String::new(),
            other => other.to_string(),
        }
    }
}

/// Finite floats only; "nan"/"inf" stay text. Negative zero reads as zero.
pub fn parse_number(s: &str) -> Option<f64> {
    s.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(|v| v + 0.0)
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d.%m.%Y"];
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Parse a calendar day from the handful of layouts spreadsheet exports use.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}

// ---------------------------------------------------------------------------
// Schema – column names and their inferred types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Text,
    Number,
    Date,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Date => "date",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub ty: FieldType,
}

/// Ordered column list, fixed when the dataset is loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.field_type(name).is_some()
    }

    pub fn field_type(&self, name: &str) -> Option<FieldType> {
        self.fields.iter().find(|f| f.name == name).map(|f| f.ty)
    }

    /// Type of `name`, or `SchemaError::UnknownField`.
    pub fn require(&self, name: &str) -> Result<FieldType, SchemaError> {
        self.field_type(name).ok_or_else(|| SchemaError::UnknownField {
            field: name.to_string(),
        })
    }

    /// First column whose name contains `marker` (e.g. the folder-link column).
    pub fn find_containing(&self, marker: &str) -> Result<&str, SchemaError> {
        self.fields
            .iter()
            .map(|f| f.name.as_str())
            .find(|name| name.contains(marker))
            .ok_or_else(|| SchemaError::MissingColumn {
                marker: marker.to_string(),
            })
    }

    /// Check that `value` may be stored in column `name`.
    pub fn check_value(&self, name: &str, value: &FieldValue) -> Result<(), SchemaError> {
        let expected = self.require(name)?;
        match value.field_type() {
            Some(found) if found != expected => Err(SchemaError::FieldType {
                field: name.to_string(),
                expected,
                found,
            }),
            _ => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Record – one row of the CSV
// ---------------------------------------------------------------------------

static MISSING: FieldValue = FieldValue::Missing;

/// A single recording (one row of the source CSV).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    values: BTreeMap<String, FieldValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of `field`; absent fields read as `Missing`.
    pub fn get(&self, field: &str) -> &FieldValue {
        self.values.get(field).unwrap_or(&MISSING)
    }

    pub fn set(&mut self, field: impl Into<String>, value: FieldValue) {
        let field = field.into();
        if value.is_missing() {
            self.values.remove(&field);
        } else {
            self.values.insert(field, value);
        }
    }

    pub fn with(mut self, field: impl Into<String>, value: FieldValue) -> Self {
        self.set(field, value);
        self
    }

    /// Non-missing `(field, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed dataset. Every record conforms to `schema`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    schema: Schema,
    records: Vec<Record>,
}

impl Dataset {
    /// Build a dataset, rejecting records whose values do not fit the schema.
    pub fn new(schema: Schema, records: Vec<Record>) -> Result<Self, SchemaError> {
        for record in &records {
            for (field, value) in record.iter() {
                schema.check_value(field, value)?;
            }
        }
        Ok(Self { schema, records })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn record(&self, row: usize) -> Option<&Record> {
        self.records.get(row)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Name of the column holding the recording's folder URL.
    pub fn folder_link_field(&self, marker: &str) -> Result<&str, SchemaError> {
        self.schema.find_containing(marker)
    }

    pub fn push_record(&mut self, record: Record) -> Result<(), SchemaError> {
        for (field, value) in record.iter() {
            self.schema.check_value(field, value)?;
        }
        self.records.push(record);
        Ok(())
    }

    pub fn set_value(
        &mut self,
        row: usize,
        field: &str,
        value: FieldValue,
    ) -> Result<(), SchemaError> {
        self.schema.check_value(field, &value)?;
        let len = self.records.len();
        let record = self
            .records
            .get_mut(row)
            .ok_or(SchemaError::NoSuchRow { row, len })?;
        record.set(field, value);
        Ok(())
    }

    pub fn remove_record(&mut self, row: usize) -> Result<Record, SchemaError> {
        if row >= self.records.len() {
            return Err(SchemaError::NoSuchRow {
                row,
                len: self.records.len(),
            });
        }
        Ok(self.records.remove(row))
    }
}
