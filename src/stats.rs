use itertools::Itertools;
use serde_json::{Map, Value as JsonValue, json};

use crate::{
    coerce::{coerce_float, coerce_optional},
    dataset::{Column, Dataset},
    error::{AnalysisError, Result},
};

/// Statistic names in output order.
pub const DESCRIBE_STATS: &[&str] = &["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStats {
    pub name: String,
    values: Vec<f64>,
    sum: f64,
    min: Option<f64>,
    max: Option<f64>,
}

impl ColumnStats {
    pub fn with_column(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: Vec::new(),
            sum: 0.0,
            min: None,
            max: None,
        }
    }

    /// Ingests every non-missing numeric cell of `column`.
    pub fn from_column(column: &Column) -> Self {
        let mut stats = Self::with_column(column.name.clone());
        for value in column.numeric_values().into_iter().flatten() {
            stats.add_value(value);
        }
        stats
    }

    pub fn add_value(&mut self, value: f64) {
        self.sum += value;
        self.min = Some(self.min.map_or(value, |current| current.min(value)));
        self.max = Some(self.max.map_or(value, |current| current.max(value)));
        self.values.push(value);
    }

    pub fn count(&self) -> usize {
        self.values.len()
    }

    pub fn mean(&self) -> Option<f64> {
        if self.values.is_empty() {
            None
        } else {
            Some(self.sum / self.count() as f64)
        }
    }

    /// Sample standard deviation (n - 1 denominator), taken over deviations
    /// from the mean so large magnitudes keep their spread.
    pub fn std_dev(&self) -> Option<f64> {
        if self.count() < 2 {
            return None;
        }
        let mean = self.mean()?;
        let squared_deviations = self
            .values
            .iter()
            .map(|value| (value - mean).powi(2))
            .sum::<f64>();
        Some((squared_deviations / (self.count() - 1) as f64).sqrt())
    }

    pub fn min(&self) -> Option<f64> {
        self.min
    }

    pub fn max(&self) -> Option<f64> {
        self.max
    }

    /// Quantile with linear interpolation between the two nearest ranks.
    pub fn quantile(&self, q: f64) -> Option<f64> {
        if self.values.is_empty() {
            return None;
        }
        let sorted = self
            .values
            .iter()
            .copied()
            .sorted_by(|a, b| a.total_cmp(b))
            .collect::<Vec<_>>();
        let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
        let lower = position.floor() as usize;
        let upper = position.ceil() as usize;
        let fraction = position - lower as f64;
        Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
    }

    pub fn render(&self) -> Map<String, JsonValue> {
        let mut row = Map::new();
        row.insert("count".to_string(), json!(self.count()));
        row.insert("mean".to_string(), coerce_optional(self.mean()));
        row.insert("std".to_string(), coerce_optional(self.std_dev()));
        row.insert("min".to_string(), coerce_optional(self.min()));
        row.insert("25%".to_string(), coerce_optional(self.quantile(0.25)));
        row.insert("50%".to_string(), coerce_optional(self.quantile(0.5)));
        row.insert("75%".to_string(), coerce_optional(self.quantile(0.75)));
        row.insert("max".to_string(), coerce_optional(self.max()));
        row
    }
}

/// Descriptive statistics for every numeric column, keyed by column name.
pub fn describe(dataset: &Dataset) -> Result<(Vec<String>, Map<String, JsonValue>)> {
    let numeric = dataset.numeric_columns();
    if numeric.is_empty() {
        return Err(AnalysisError::NoNumericColumns("descriptive statistics"));
    }
    let mut result = Map::new();
    for column in &numeric {
        let stats = ColumnStats::from_column(column);
        result.insert(column.name.clone(), JsonValue::Object(stats.render()));
    }
    let names = numeric.iter().map(|c| c.name.clone()).collect();
    Ok((names, result))
}

#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// `values[i][j]` is the correlation of `columns[i]` with `columns[j]`;
    /// NaN where it is undefined.
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, row: usize, column: usize) -> f64 {
        self.values[row][column]
    }

    /// `{a: {a: 1.0, b: ..}, b: {..}}`
    pub fn to_nested_map(&self) -> Map<String, JsonValue> {
        let mut outer = Map::new();
        for (i, row_name) in self.columns.iter().enumerate() {
            let mut inner = Map::new();
            for (j, column_name) in self.columns.iter().enumerate() {
                inner.insert(column_name.clone(), coerce_float(self.get(i, j)));
            }
            outer.insert(row_name.clone(), JsonValue::Object(inner));
        }
        outer
    }
}

/// Pearson correlation between every pair of numeric columns over the rows
/// where both are present. The diagonal is fixed at 1.0 and each pair is
/// computed once, so the matrix is symmetric.
pub fn correlation_matrix(columns: &[&Column]) -> CorrelationMatrix {
    let series = columns
        .iter()
        .map(|c| c.numeric_values())
        .collect::<Vec<_>>();
    let n = series.len();
    let mut values = vec![vec![f64::NAN; n]; n];
    for (i, row) in values.iter_mut().enumerate() {
        row[i] = 1.0;
    }
    for (i, j) in (0..n).tuple_combinations() {
        let r = pearson(&series[i], &series[j]);
        values[i][j] = r;
        values[j][i] = r;
    }
    CorrelationMatrix {
        columns: columns.iter().map(|c| c.name.clone()).collect(),
        values,
    }
}

pub fn correlation(dataset: &Dataset) -> Result<CorrelationMatrix> {
    let numeric = dataset.numeric_columns();
    if numeric.len() < 2 {
        return Err(AnalysisError::InsufficientColumns("Correlation analysis"));
    }
    Ok(correlation_matrix(&numeric))
}

fn pearson(left: &[Option<f64>], right: &[Option<f64>]) -> f64 {
    let pairs = left
        .iter()
        .zip(right)
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .collect::<Vec<_>>();
    if pairs.len() < 2 {
        return f64::NAN;
    }
    let n = pairs.len() as f64;
    let mean_a = pairs.iter().map(|(a, _)| a).sum::<f64>() / n;
    let mean_b = pairs.iter().map(|(_, b)| b).sum::<f64>() / n;
    let mut covariance = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (a, b) in &pairs {
        let da = a - mean_a;
        let db = b - mean_b;
        covariance += da * db;
        var_a += da * da;
        var_b += db * db;
    }
    if var_a == 0.0 || var_b == 0.0 {
        return f64::NAN;
    }
    (covariance / (var_a.sqrt() * var_b.sqrt())).clamp(-1.0, 1.0)
}

#[derive(Debug, Clone, PartialEq)]
pub struct MissingSummary {
    pub result: Map<String, JsonValue>,
    pub total_missing: usize,
}

/// Missing count and percentage for every column, plus the grand total.
pub fn missing_values(dataset: &Dataset) -> MissingSummary {
    let total_rows = dataset.row_count();
    let mut result = Map::new();
    let mut total_missing = 0usize;
    for column in dataset.columns() {
        let missing = column.missing_count();
        total_missing += missing;
        let percentage = if total_rows == 0 {
            f64::NAN
        } else {
            missing as f64 / total_rows as f64 * 100.0
        };
        result.insert(
            column.name.clone(),
            json!({
                "missing_count": missing,
                "missing_percentage": coerce_float(percentage),
                "total_rows": total_rows,
            }),
        );
    }
    MissingSummary {
        result,
        total_missing,
    }
}
