use std::fmt;

use anyhow::{Result, anyhow};
use chrono::{NaiveDate, NaiveDateTime};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Tokens read as missing cells in delimited text.
const MISSING_TOKENS: &[&str] = &[
    "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "NULL", "null", "None", "#N/A", "#NA",
    "<NA>",
];

#[derive(Debug, Clone, Serialize, PartialEq)]
pub enum Value {
    Missing,
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Text(String),
    Timestamp(NaiveDateTime),
    List(Vec<Value>),
}

impl Value {
    /// `Missing` and NaN floats both count as absent.
    pub fn is_missing(&self) -> bool {
        match self {
            Value::Missing => true,
            Value::Float(f) => f.is_nan(),
            _ => false,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) if !f.is_nan() => Some(*f),
            _ => None,
        }
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            Value::Missing => ColumnKind::Missing,
            Value::Float(f) if f.is_nan() => ColumnKind::Missing,
            Value::Integer(_) => ColumnKind::Integer,
            Value::Float(_) => ColumnKind::Float,
            Value::Boolean(_) => ColumnKind::Boolean,
            Value::Timestamp(_) => ColumnKind::Timestamp,
            Value::Text(_) | Value::List(_) => ColumnKind::Text,
        }
    }

    pub fn as_display(&self) -> String {
        match self {
            Value::Missing => String::new(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) if f.is_nan() => String::new(),
            Value::Float(f) => {
                if f.fract() == 0.0 && f.abs() < 1e15 {
                    format!("{f:.1}")
                } else {
                    f.to_string()
                }
            }
            Value::Boolean(b) => b.to_string(),
            Value::Text(s) => s.clone(),
            Value::Timestamp(ts) => ts.format("%Y-%m-%d %H:%M:%S").to_string(),
            Value::List(items) => format!("[{}]", items.iter().map(Value::as_display).join(", ")),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Integer,
    Float,
    Boolean,
    Text,
    Timestamp,
    Missing,
}

impl ColumnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::Integer => "integer",
            ColumnKind::Float => "float",
            ColumnKind::Boolean => "boolean",
            ColumnKind::Text => "text",
            ColumnKind::Timestamp => "timestamp",
            ColumnKind::Missing => "missing",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnKind::Integer | ColumnKind::Float)
    }

    pub fn is_categorical(&self) -> bool {
        matches!(self, ColumnKind::Text)
    }

    /// Uniform kind of a column of already typed cells. Missing cells are
    /// ignored; integers mixed with floats widen to float; any other mix is text.
    pub fn infer(values: &[Value]) -> ColumnKind {
        let mut kind = ColumnKind::Missing;
        for value in values {
            let next = value.kind();
            kind = match (kind, next) {
                (current, ColumnKind::Missing) => current,
                (ColumnKind::Missing, next) => next,
                (current, next) if current == next => current,
                (ColumnKind::Integer, ColumnKind::Float) | (ColumnKind::Float, ColumnKind::Integer) => {
                    ColumnKind::Float
                }
                _ => return ColumnKind::Text,
            };
        }
        kind
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn is_missing_token(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty() || MISSING_TOKENS.contains(&trimmed)
}

pub fn parse_boolean(value: &str) -> Option<bool> {
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("true") {
        Some(true)
    } else if trimmed.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

pub fn parse_naive_date(value: &str) -> Result<NaiveDate> {
    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%m/%d/%Y", "%d-%m-%Y"];
    for fmt in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(value, fmt) {
            return Ok(parsed);
        }
    }
    Err(anyhow!("Failed to parse '{value}' as date"))
}

pub fn parse_naive_datetime(value: &str) -> Result<NaiveDateTime> {
    const DATETIME_FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y/%m/%d %H:%M:%S",
        "%d/%m/%Y %H:%M:%S",
        "%m/%d/%Y %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];
    for fmt in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, fmt) {
            return Ok(parsed);
        }
    }
    Err(anyhow!("Failed to parse '{value}' as datetime"))
}

/// Dates and datetimes both land on a timestamp; a bare date is midnight.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if let Ok(dt) = parse_naive_datetime(trimmed) {
        return Some(dt);
    }
    parse_naive_date(trimmed)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Converts a raw text cell into a value of the given column kind. Cells that
/// do not fit the kind are kept as text so nothing is silently dropped.
pub fn parse_cell(raw: &str, kind: ColumnKind) -> Value {
    if is_missing_token(raw) {
        return Value::Missing;
    }
    let trimmed = raw.trim();
    let parsed = match kind {
        ColumnKind::Integer => trimmed.parse::<i64>().ok().map(Value::Integer),
        ColumnKind::Float => trimmed.parse::<f64>().ok().map(Value::Float),
        ColumnKind::Boolean => parse_boolean(trimmed).map(Value::Boolean),
        ColumnKind::Timestamp => parse_timestamp(trimmed).map(Value::Timestamp),
        ColumnKind::Text | ColumnKind::Missing => None,
    };
    parsed.unwrap_or_else(|| Value::Text(raw.to_string()))
}
