use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use crate::{coerce::coerce, dataset::Dataset};

pub const DEFAULT_PREVIEW_ROWS: i64 = 100;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewPayload {
    pub columns: Vec<String>,
    pub data: Vec<Map<String, JsonValue>>,
    pub total_rows: usize,
    pub preview_rows: usize,
    pub dtypes: Map<String, JsonValue>,
    pub shape: [usize; 2],
}

impl PreviewPayload {
    /// Rows as display strings, for the terminal table.
    pub fn table_rows(&self) -> Vec<Vec<String>> {
        self.data
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .map(|name| match row.get(name) {
                        Some(JsonValue::Null) | None => String::new(),
                        Some(JsonValue::String(s)) => s.clone(),
                        Some(other) => other.to_string(),
                    })
                    .collect()
            })
            .collect()
    }
}

/// Negative requests preview nothing; requests past the end return every row.
pub fn clamp_rows(requested: i64, available: usize) -> usize {
    usize::try_from(requested.max(0))
        .unwrap_or(usize::MAX)
        .min(available)
}

pub fn preview(dataset: &Dataset, rows: i64) -> PreviewPayload {
    let preview_rows = clamp_rows(rows, dataset.row_count());
    let data = (0..preview_rows)
        .map(|row| {
            dataset
                .columns()
                .iter()
                .map(|column| (column.name.clone(), coerce(&column.values[row])))
                .collect::<Map<_, _>>()
        })
        .collect();
    let dtypes = dataset
        .columns()
        .iter()
        .map(|column| {
            (
                column.name.clone(),
                JsonValue::String(column.kind.as_str().to_string()),
            )
        })
        .collect();
    PreviewPayload {
        columns: dataset.column_names(),
        data,
        total_rows: dataset.row_count(),
        preview_rows,
        dtypes,
        shape: dataset.shape(),
    }
}
