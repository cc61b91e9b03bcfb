use std::fs::File;
use std::io::Read;
use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray, Float32Array, Float64Array, Int32Array, Int64Array};
use arrow::datatypes::{DataType, Int32Type, Int64Type};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::DataLoadError;
use super::model::{
    BOOSTER_COLUMN, Dataset, LaunchRecord, OUTCOME_COLUMN, PAYLOAD_COLUMN, REQUIRED_COLUMNS,
    SITE_COLUMN,
};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the launch dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row naming at least the four required columns
/// * `.json`    – `[{ "Launch Site": "...", "Payload Mass (kg)": 0.0, ... }, ...]`
/// * `.parquet` – one Arrow column per required field
///
/// Extra columns (the pandas index, `Flight Number`, ...) are ignored.
pub fn load_file(path: &Path) -> Result<Dataset, DataLoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let open = || {
        File::open(path).map_err(|source| DataLoadError::Io {
            path: path.to_path_buf(),
            source,
        })
    };

    let dataset = match ext.as_str() {
        "csv" => load_csv(open()?)?,
        "json" => load_json(open()?)?,
        "parquet" | "pq" => load_parquet(open()?)?,
        other => return Err(DataLoadError::UnsupportedFormat(other.to_string())),
    };

    log::info!(
        "Loaded {} launches from {} ({} sites, payload {}..={} kg)",
        dataset.len(),
        path.display(),
        dataset.sites().len(),
        dataset.min_payload(),
        dataset.max_payload()
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// Cell parsing shared by the text formats
// ---------------------------------------------------------------------------

fn parse_payload(s: &str, row: usize) -> Result<f64, DataLoadError> {
    s.trim().parse::<f64>().map_err(|_| DataLoadError::Malformed {
        row,
        column: PAYLOAD_COLUMN,
        value: s.to_string(),
    })
}

/// `class` is 0/1 in the source table; pandas sometimes writes it as a float.
fn parse_outcome(s: &str, row: usize) -> Result<bool, DataLoadError> {
    match s.trim() {
        "1" | "1.0" | "true" | "True" => Ok(true),
        "0" | "0.0" | "false" | "False" => Ok(false),
        other => Err(DataLoadError::Malformed {
            row,
            column: OUTCOME_COLUMN,
            value: other.to_string(),
        }),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Parse CSV text with a header row. Column order does not matter.
pub fn load_csv<R: Read>(reader: R) -> Result<Dataset, DataLoadError> {
    let mut reader = csv::Reader::from_reader(reader);
    let headers = reader.headers()?.clone();

    let mut idx = [0usize; 4];
    for (slot, name) in idx.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or(DataLoadError::MissingColumn(name))?;
    }
    let [site_idx, payload_idx, outcome_idx, booster_idx] = idx;

    let mut records = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result?;
        let cell = |i: usize| record.get(i).unwrap_or("");

        records.push(LaunchRecord {
            site: cell(site_idx).to_string(),
            payload_mass: parse_payload(cell(payload_idx), row)?,
            outcome: parse_outcome(cell(outcome_idx), row)?,
            booster: cell(booster_idx).to_string(),
        });
    }

    Dataset::from_records(records)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   {
///     "Launch Site": "CCAFS LC-40",
///     "Payload Mass (kg)": 525.0,
///     "class": 0,
///     "Booster Version Category": "v1.0"
///   },
///   ...
/// ]
/// ```
pub fn load_json<R: Read>(reader: R) -> Result<Dataset, DataLoadError> {
    let root: JsonValue = serde_json::from_reader(reader)?;
    let rows = root.as_array().ok_or_else(|| DataLoadError::Malformed {
        row: 0,
        column: SITE_COLUMN,
        value: "top-level value is not an array".to_string(),
    })?;

    let mut records = Vec::with_capacity(rows.len());
    for (row, value) in rows.iter().enumerate() {
        let obj = value.as_object().ok_or_else(|| DataLoadError::Malformed {
            row,
            column: SITE_COLUMN,
            value: value.to_string(),
        })?;
        let field = |name: &'static str| obj.get(name).ok_or(DataLoadError::MissingColumn(name));

        records.push(LaunchRecord {
            site: json_string(field(SITE_COLUMN)?, row, SITE_COLUMN)?,
            payload_mass: json_payload(field(PAYLOAD_COLUMN)?, row)?,
            outcome: json_outcome(field(OUTCOME_COLUMN)?, row)?,
            booster: json_string(field(BOOSTER_COLUMN)?, row, BOOSTER_COLUMN)?,
        });
    }

    Dataset::from_records(records)
}

fn json_string(val: &JsonValue, row: usize, column: &'static str) -> Result<String, DataLoadError> {
    val.as_str()
        .map(str::to_string)
        .ok_or_else(|| DataLoadError::Malformed {
            row,
            column,
            value: val.to_string(),
        })
}

fn json_payload(val: &JsonValue, row: usize) -> Result<f64, DataLoadError> {
    val.as_f64().ok_or_else(|| DataLoadError::Malformed {
        row,
        column: PAYLOAD_COLUMN,
        value: val.to_string(),
    })
}

fn json_outcome(val: &JsonValue, row: usize) -> Result<bool, DataLoadError> {
    match val {
        JsonValue::Bool(b) => Ok(*b),
        JsonValue::Number(n) => parse_outcome(&n.to_string(), row),
        other => Err(DataLoadError::Malformed {
            row,
            column: OUTCOME_COLUMN,
            value: other.to_string(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file of launch records.
///
/// Expected schema:
/// - `Launch Site`, `Booster Version Category`: Utf8 / LargeUtf8
/// - `Payload Mass (kg)`: Float64, Float32, Int64 or Int32
/// - `class`: Int64, Int32 or Boolean
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
pub fn load_parquet(file: File) -> Result<Dataset, DataLoadError> {
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

    let mut records = Vec::new();
    for batch in reader {
        let batch = batch?;
        append_batch(&batch, &mut records)?;
    }

    Dataset::from_records(records)
}

fn column<'a>(batch: &'a RecordBatch, name: &'static str) -> Result<&'a ArrayRef, DataLoadError> {
    let idx = batch
        .schema()
        .index_of(name)
        .map_err(|_| DataLoadError::MissingColumn(name))?;
    Ok(batch.column(idx))
}

fn append_batch(batch: &RecordBatch, out: &mut Vec<LaunchRecord>) -> Result<(), DataLoadError> {
    let site = column(batch, SITE_COLUMN)?;
    let payload = column(batch, PAYLOAD_COLUMN)?;
    let outcome = column(batch, OUTCOME_COLUMN)?;
    let booster = column(batch, BOOSTER_COLUMN)?;

    // Row numbers in errors are relative to the whole file.
    let offset = out.len();
    for i in 0..batch.num_rows() {
        let row = offset + i;
        out.push(LaunchRecord {
            site: arrow_string(site, i, row, SITE_COLUMN)?,
            payload_mass: arrow_payload(payload, i, row)?,
            outcome: arrow_outcome(outcome, i, row)?,
            booster: arrow_string(booster, i, row, BOOSTER_COLUMN)?,
        });
    }
    Ok(())
}

fn null_cell(row: usize, column: &'static str) -> DataLoadError {
    DataLoadError::Malformed {
        row,
        column,
        value: "<null>".to_string(),
    }
}

fn wrong_type(col: &ArrayRef, column: &'static str) -> DataLoadError {
    DataLoadError::ColumnType {
        column,
        found: format!("{:?}", col.data_type()),
    }
}

fn arrow_string(
    col: &ArrayRef,
    i: usize,
    row: usize,
    column: &'static str,
) -> Result<String, DataLoadError> {
    if col.is_null(i) {
        return Err(null_cell(row, column));
    }
    match col.data_type() {
        DataType::Utf8 => Ok(col.as_string::<i32>().value(i).to_string()),
        DataType::LargeUtf8 => Ok(col.as_string::<i64>().value(i).to_string()),
        _ => Err(wrong_type(col, column)),
    }
}

fn arrow_payload(col: &ArrayRef, i: usize, row: usize) -> Result<f64, DataLoadError> {
    if col.is_null(i) {
        return Err(null_cell(row, PAYLOAD_COLUMN));
    }
    let any = col.as_any();
    if let Some(arr) = any.downcast_ref::<Float64Array>() {
        Ok(arr.value(i))
    } else if let Some(arr) = any.downcast_ref::<Float32Array>() {
        Ok(arr.value(i) as f64)
    } else if let Some(arr) = any.downcast_ref::<Int64Array>() {
        Ok(arr.value(i) as f64)
    } else if let Some(arr) = any.downcast_ref::<Int32Array>() {
        Ok(arr.value(i) as f64)
    } else {
        Err(wrong_type(col, PAYLOAD_COLUMN))
    }
}

fn arrow_outcome(col: &ArrayRef, i: usize, row: usize) -> Result<bool, DataLoadError> {
    if col.is_null(i) {
        return Err(null_cell(row, OUTCOME_COLUMN));
    }
    let raw = match col.data_type() {
        DataType::Boolean => return Ok(col.as_boolean().value(i)),
        DataType::Int64 => col.as_primitive::<Int64Type>().value(i),
        DataType::Int32 => col.as_primitive::<Int32Type>().value(i) as i64,
        _ => return Err(wrong_type(col, OUTCOME_COLUMN)),
    };
    match raw {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(DataLoadError::Malformed {
            row,
            column: OUTCOME_COLUMN,
            value: other.to_string(),
        }),
    }
}
