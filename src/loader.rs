//! File loading: turns a path plus declared file type into a [`Dataset`].
//!
//! The existence check runs before the declared type is even parsed, so a
//! missing file is always reported as `NotFound`. Parser failures are wrapped
//! in `LoadFailure` with the underlying message.

use std::{fmt, path::Path, str::FromStr};

use calamine::{Data, DataType, Range, Reader, Xls, Xlsx, open_workbook};
use log::{debug, info};
use serde_json::{Map, Value as JsonValue};

use crate::{
    data::Value,
    dataset::Dataset,
    error::{AnalysisError, Result},
    io_utils,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Csv,
    Xlsx,
    Xls,
    Json,
    Txt,
}

impl FileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Csv => "csv",
            FileType::Xlsx => "xlsx",
            FileType::Xls => "xls",
            FileType::Json => "json",
            FileType::Txt => "txt",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileType {
    type Err = AnalysisError;

    fn from_str(value: &str) -> Result<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "csv" => Ok(FileType::Csv),
            "xlsx" => Ok(FileType::Xlsx),
            "xls" => Ok(FileType::Xls),
            "json" => Ok(FileType::Json),
            "txt" => Ok(FileType::Txt),
            _ => Err(AnalysisError::UnsupportedType(value.to_string())),
        }
    }
}

/// Loads `path` as `declared_type`.
pub fn load(path: &Path, declared_type: &str) -> Result<Dataset> {
    if !path.exists() {
        return Err(AnalysisError::NotFound(path.to_path_buf()));
    }
    let file_type = declared_type.parse::<FileType>()?;
    let dataset = load_as(path, file_type)?;
    info!(
        "Loaded {:?} as {} with {} row(s) across {} column(s)",
        path,
        file_type,
        dataset.row_count(),
        dataset.column_count()
    );
    Ok(dataset)
}

pub fn load_as(path: &Path, file_type: FileType) -> Result<Dataset> {
    match file_type {
        FileType::Csv => load_csv(path),
        FileType::Txt => load_tsv(path),
        FileType::Xlsx => {
            let mut workbook: Xlsx<_> = open_workbook(path).map_err(load_failure)?;
            let range = first_sheet(&mut workbook)?;
            dataset_from_range(&range)
        }
        FileType::Xls => {
            let mut workbook: Xls<_> = open_workbook(path).map_err(load_failure)?;
            let range = first_sheet(&mut workbook)?;
            dataset_from_range(&range)
        }
        FileType::Json => load_json(path),
    }
}

fn load_failure(err: impl fmt::Display) -> AnalysisError {
    AnalysisError::LoadFailure(err.to_string())
}

fn load_csv(path: &Path) -> Result<Dataset> {
    let bytes = io_utils::read_input_bytes(path).map_err(load_failure)?;
    let (text, encoding) = io_utils::decode_with_fallback(&bytes, io_utils::CSV_ENCODINGS);
    debug!("Parsing {:?} as CSV decoded with {}", path, encoding);
    parse_delimited(&text, io_utils::DEFAULT_CSV_DELIMITER)
}

fn load_tsv(path: &Path) -> Result<Dataset> {
    let bytes = io_utils::read_input_bytes(path).map_err(load_failure)?;
    let text = io_utils::decode_lossy(&bytes);
    parse_delimited(&text, io_utils::DEFAULT_TSV_DELIMITER)
}

fn parse_delimited(text: &str, delimiter: u8) -> Result<Dataset> {
    let (headers, rows) = io_utils::read_delimited(text, delimiter)
        .map_err(|err| AnalysisError::LoadFailure(format!("{err:#}")))?;
    if headers.is_empty() {
        return Err(AnalysisError::LoadFailure(
            "No columns to parse from file".to_string(),
        ));
    }
    Dataset::from_text_rows(headers, rows)
}

fn first_sheet<R>(workbook: &mut R) -> Result<Range<Data>>
where
    R: Reader<std::io::BufReader<std::fs::File>>,
    R::Error: fmt::Display,
{
    workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AnalysisError::LoadFailure("Workbook has no worksheets".to_string()))?
        .map_err(load_failure)
}

/// First row is the header; the rest are data rows.
fn dataset_from_range(range: &Range<Data>) -> Result<Dataset> {
    let mut rows = range.rows();
    let headers = match rows.next() {
        Some(header_row) => header_row.iter().map(header_text).collect::<Vec<_>>(),
        None => {
            return Err(AnalysisError::LoadFailure(
                "No columns to parse from worksheet".to_string(),
            ));
        }
    };
    let mut columns: Vec<Vec<Value>> = vec![Vec::new(); headers.len()];
    for row in rows {
        for (idx, column) in columns.iter_mut().enumerate() {
            column.push(row.get(idx).map(cell_value).unwrap_or(Value::Missing));
        }
    }
    let columns = columns.into_iter().map(narrow_whole_floats).collect();
    Dataset::from_value_columns(headers, columns)
}

fn header_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Empty => String::new(),
        Data::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        other => other.to_string(),
    }
}

fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Empty | Data::Error(_) => Value::Missing,
        Data::Int(i) => Value::Integer(*i),
        Data::Float(f) => Value::Float(*f),
        Data::Bool(b) => Value::Boolean(*b),
        Data::String(s) => Value::Text(s.clone()),
        Data::DateTime(_) | Data::DateTimeIso(_) => cell
            .as_datetime()
            .map(Value::Timestamp)
            .unwrap_or_else(|| Value::Text(cell.to_string())),
        Data::DurationIso(s) => Value::Text(s.clone()),
    }
}

/// Spreadsheets store every number as a float; a complete column of whole
/// numbers is narrowed back to integers.
fn narrow_whole_floats(values: Vec<Value>) -> Vec<Value> {
    let all_whole = !values.is_empty()
        && values.iter().all(|value| match value {
            Value::Float(f) => f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64,
            Value::Integer(_) => true,
            _ => false,
        });
    if !all_whole {
        return values;
    }
    values
        .into_iter()
        .map(|value| match value {
            Value::Float(f) => Value::Integer(f as i64),
            other => other,
        })
        .collect()
}

fn load_json(path: &Path) -> Result<Dataset> {
    let bytes = io_utils::read_input_bytes(path).map_err(load_failure)?;
    let root: JsonValue = serde_json::from_slice(&bytes).map_err(load_failure)?;
    match root {
        JsonValue::Array(records) => dataset_from_records(&records),
        JsonValue::Object(columns) => dataset_from_column_object(&columns),
        _ => Err(AnalysisError::LoadFailure(
            "Expected a JSON array of records or an object of columns".to_string(),
        )),
    }
}

/// `[{"a": 1, "b": "x"}, ...]`; columns appear in first-seen key order.
fn dataset_from_records(records: &[JsonValue]) -> Result<Dataset> {
    let mut headers: Vec<String> = Vec::new();
    for (idx, record) in records.iter().enumerate() {
        let object = record.as_object().ok_or_else(|| {
            AnalysisError::LoadFailure(format!("Record {idx} is not a JSON object"))
        })?;
        for key in object.keys() {
            if !headers.iter().any(|h| h == key) {
                headers.push(key.clone());
            }
        }
    }
    let columns = headers
        .iter()
        .map(|header| {
            records
                .iter()
                .map(|record| record.get(header).map(json_cell).unwrap_or(Value::Missing))
                .collect::<Vec<_>>()
        })
        .collect();
    Dataset::from_value_columns(headers, columns)
}

/// `{"a": [1, 2], ...}` or `{"a": {"0": 1, "1": 2}, ...}`.
fn dataset_from_column_object(columns: &Map<String, JsonValue>) -> Result<Dataset> {
    let mut headers = Vec::with_capacity(columns.len());
    let mut values = Vec::with_capacity(columns.len());
    for (name, column) in columns {
        let cells = match column {
            JsonValue::Array(items) => items.iter().map(json_cell).collect::<Vec<_>>(),
            JsonValue::Object(indexed) => indexed.values().map(json_cell).collect::<Vec<_>>(),
            _ => {
                return Err(AnalysisError::LoadFailure(format!(
                    "Column '{name}' must be an array or an object of values"
                )));
            }
        };
        headers.push(name.clone());
        values.push(cells);
    }
    Dataset::from_value_columns(headers, values)
}

fn json_cell(value: &JsonValue) -> Value {
    match value {
        JsonValue::Null => Value::Missing,
        JsonValue::Bool(b) => Value::Boolean(*b),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => n.as_f64().map(Value::Float).unwrap_or(Value::Missing),
        },
        JsonValue::String(s) => Value::Text(s.clone()),
        JsonValue::Array(items) => Value::List(items.iter().map(json_cell).collect()),
        JsonValue::Object(_) => Value::Text(value.to_string()),
    }
}
