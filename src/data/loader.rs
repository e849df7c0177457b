use std::io::{Read, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};

use super::model::{Dataset, Field, FieldType, FieldValue, Record, Schema};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load the dataset from a CSV file.
///
/// Column types are inferred from the cells: a column is a number column when
/// every non-empty cell is a finite float already written the way a save would
/// write it, a date column when every non-empty cell is a `YYYY-MM-DD` day, and
/// text otherwise. Anything else (timestamps, zero-padded ids) stays text so a
/// save gives back the same cells. Columns named in `date_columns` are always
/// dates; cells there that do not parse are coerced to missing.
pub fn load_csv(path: &Path, date_columns: &[String]) -> Result<Dataset> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening CSV {}", path.display()))?;
    let dataset = read_csv(file, date_columns)
        .with_context(|| format!("reading CSV {}", path.display()))?;
    log::info!(
        "Loaded {} records with columns {:?} from {}",
        dataset.len(),
        dataset.schema().names().collect::<Vec<_>>(),
        path.display()
    );
    Ok(dataset)
}

/// Write the dataset back to a CSV file, header first, in schema order.
pub fn save_csv(dataset: &Dataset, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating CSV {}", path.display()))?;
    write_csv(dataset, file).with_context(|| format!("writing CSV {}", path.display()))?;
    log::info!("Saved {} records to {}", dataset.len(), path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Reader / writer
// ---------------------------------------------------------------------------

pub fn read_csv<R: Read>(source: R, date_columns: &[String]) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(source);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if let Some(dup) = first_duplicate(&headers) {
        bail!("CSV header repeats column '{dup}'");
    }

    let mut rows: Vec<Vec<String>> = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        rows.push(record.iter().map(|cell| cell.to_string()).collect());
    }

    let fields: Vec<Field> = headers
        .iter()
        .enumerate()
        .map(|(col_idx, name)| {
            let ty = if date_columns.iter().any(|c| c == name) {
                FieldType::Date
            } else {
                infer_type(rows.iter().map(|r| cell(r, col_idx)))
            };
            Field {
                name: name.clone(),
                ty,
            }
        })
        .collect();

    let mut records = Vec::with_capacity(rows.len());
    for (row_no, row) in rows.iter().enumerate() {
        let mut record = Record::new();
        for (col_idx, field) in fields.iter().enumerate() {
            let raw = cell(row, col_idx);
            let value = FieldValue::parse_as(raw, field.ty).unwrap_or_else(|| {
                log::warn!(
                    "CSV row {row_no}: '{raw}' in column '{}' is not a {}, treating as missing",
                    field.name,
                    field.ty
                );
                FieldValue::Missing
            });
            record.set(field.name.clone(), value);
        }
        records.push(record);
    }

    Ok(Dataset::new(Schema::new(fields), records)?)
}

pub fn write_csv<W: Write>(dataset: &Dataset, sink: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(sink);
    let names: Vec<&str> = dataset.schema().names().collect();
    writer.write_record(&names).context("writing CSV header")?;
    for (row_no, record) in dataset.records().iter().enumerate() {
        writer
            .write_record(names.iter().map(|name| record.get(name).to_cell()))
            .with_context(|| format!("writing CSV row {row_no}"))?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Type inference
// ---------------------------------------------------------------------------

/// Short rows read as blank in their missing columns.
fn cell(row: &[String], col_idx: usize) -> &str {
    row.get(col_idx).map(String::as_str).unwrap_or("")
}

fn infer_type<'a>(cells: impl Iterator<Item = &'a str>) -> FieldType {
    let non_empty: Vec<&str> = cells.filter(|c| !c.trim().is_empty()).collect();
    let all_written_as = |ty: FieldType| {
        non_empty.iter().all(|&c| {
            FieldValue::parse_as(c, ty).is_some_and(|v| v.to_cell() == c)
        })
    };
    if non_empty.is_empty() {
        FieldType::Text
    } else if all_written_as(FieldType::Number) {
        FieldType::Number
    } else if all_written_as(FieldType::Date) {
        FieldType::Date
    } else {
        FieldType::Text
    }
}

fn first_duplicate(headers: &[String]) -> Option<&str> {
    headers
        .iter()
        .enumerate()
        .find(|(i, h)| headers[..*i].contains(h))
        .map(|(_, h)| h.as_str())
}
