//! In-memory tabular model shared by every operation.
//!
//! A [`Dataset`] is an ordered list of named [`Column`]s that all hold the same
//! number of cells. Text sources (CSV/TSV) are typed column by column through a
//! `KindCandidate` that tallies what each non-missing cell parses as, in the
//! same spirit as schema probing: a column only becomes numeric, boolean, or
//! temporal when every non-missing cell agrees.

use std::collections::HashSet;

use crate::{
    data::{ColumnKind, Value, is_missing_token, parse_boolean, parse_cell, parse_timestamp},
    error::{AnalysisError, Result},
};

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
    pub values: Vec<Value>,
}

impl Column {
    /// Builds a column from typed cells, inferring its kind.
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        let kind = ColumnKind::infer(&values);
        Self {
            name: name.into(),
            kind,
            values,
        }
    }

    /// Builds a column from raw text cells, inferring the kind first and then
    /// parsing each cell into it.
    pub fn from_text(name: impl Into<String>, raw: &[String]) -> Self {
        let mut candidate = KindCandidate::default();
        for value in raw {
            candidate.update(value);
        }
        let kind = candidate.decide();
        let values = raw.iter().map(|cell| parse_cell(cell, kind)).collect();
        Self {
            name: name.into(),
            kind,
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_numeric(&self) -> bool {
        self.kind.is_numeric()
    }

    pub fn is_categorical(&self) -> bool {
        self.kind.is_categorical()
    }

    /// Numeric view of the column; `None` marks a missing or non-numeric cell.
    pub fn numeric_values(&self) -> Vec<Option<f64>> {
        self.values.iter().map(Value::as_f64).collect()
    }

    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_missing()).count()
    }
}

#[derive(Default)]
struct KindCandidate {
    non_empty: usize,
    integer_matches: usize,
    float_matches: usize,
    boolean_matches: usize,
    timestamp_matches: usize,
    unclassified: usize,
}

impl KindCandidate {
    fn update(&mut self, value: &str) {
        if is_missing_token(value) {
            return;
        }
        let trimmed = value.trim();
        self.non_empty += 1;

        if trimmed.parse::<i64>().is_ok() {
            self.integer_matches += 1;
        } else if trimmed.parse::<f64>().is_ok() {
            self.float_matches += 1;
        } else if parse_boolean(trimmed).is_some() {
            self.boolean_matches += 1;
        } else if parse_timestamp(trimmed).is_some() {
            self.timestamp_matches += 1;
        } else {
            self.unclassified += 1;
        }
    }

    fn decide(&self) -> ColumnKind {
        if self.non_empty == 0 {
            return ColumnKind::Missing;
        }
        if self.unclassified > 0 {
            return ColumnKind::Text;
        }
        if self.integer_matches == self.non_empty {
            ColumnKind::Integer
        } else if self.integer_matches + self.float_matches == self.non_empty {
            ColumnKind::Float
        } else if self.boolean_matches == self.non_empty {
            ColumnKind::Boolean
        } else if self.timestamp_matches == self.non_empty {
            ColumnKind::Timestamp
        } else {
            ColumnKind::Text
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
    row_count: usize,
}

impl Dataset {
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let row_count = columns.first().map(Column::len).unwrap_or(0);
        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if column.len() != row_count {
                return Err(AnalysisError::LoadFailure(format!(
                    "Column '{}' has {} row(s) but expected {row_count}",
                    column.name,
                    column.len()
                )));
            }
            if !seen.insert(column.name.as_str()) {
                return Err(AnalysisError::LoadFailure(format!(
                    "Duplicate column name '{}'",
                    column.name
                )));
            }
        }
        Ok(Self { columns, row_count })
    }

    /// Types a grid of text rows read from a delimited file. Header names are
    /// made unique and short rows are padded with missing cells.
    pub fn from_text_rows(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        let headers = unique_headers(headers);
        let mut cells: Vec<Vec<String>> = vec![Vec::with_capacity(rows.len()); headers.len()];
        for (row_idx, row) in rows.into_iter().enumerate() {
            if row.len() > headers.len() {
                return Err(AnalysisError::LoadFailure(format!(
                    "Expected {} field(s) in line {}, saw {}",
                    headers.len(),
                    row_idx + 2,
                    row.len()
                )));
            }
            let mut fields = row.into_iter();
            for column in cells.iter_mut() {
                column.push(fields.next().unwrap_or_default());
            }
        }
        let columns = headers
            .into_iter()
            .zip(cells)
            .map(|(name, raw)| Column::from_text(name, &raw))
            .collect();
        Dataset::new(columns)
    }

    /// Builds a dataset from already typed columns (spreadsheet and JSON sources).
    pub fn from_value_columns(headers: Vec<String>, values: Vec<Vec<Value>>) -> Result<Self> {
        let headers = unique_headers(headers);
        let columns = headers
            .into_iter()
            .zip(values)
            .map(|(name, cells)| Column::new(name, cells))
            .collect();
        Dataset::new(columns)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn column(&self, name: &str) -> Result<&Column> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| AnalysisError::UnknownColumn(name.to_string()))
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// `[rows, columns]`
    pub fn shape(&self) -> [usize; 2] {
        [self.row_count, self.columns.len()]
    }

    /// A dataset without rows or without columns has nothing to chart or analyze.
    pub fn is_empty(&self) -> bool {
        self.row_count == 0 || self.columns.is_empty()
    }

    pub fn numeric_columns(&self) -> Vec<&Column> {
        self.columns.iter().filter(|c| c.is_numeric()).collect()
    }

    pub fn categorical_columns(&self) -> Vec<&Column> {
        self.columns.iter().filter(|c| c.is_categorical()).collect()
    }
}

/// Blank headers become `column_<n>`; repeats get `.1`, `.2`, ... suffixes.
fn unique_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(headers.len());
    let mut unique = Vec::with_capacity(headers.len());
    for (idx, header) in headers.into_iter().enumerate() {
        let base = if header.trim().is_empty() {
            format!("column_{}", idx + 1)
        } else {
            header
        };
        let mut candidate = base.clone();
        let mut suffix = 1;
        while seen.contains(&candidate) {
            candidate = format!("{base}.{suffix}");
            suffix += 1;
        }
        seen.insert(candidate.clone());
        unique.push(candidate);
    }
    unique
}
