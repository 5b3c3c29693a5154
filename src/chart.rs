//! Chart specification builder.
//!
//! Charts are emitted as Vega-Lite v5 documents with the data inlined, so a
//! browser can render them with `vega-embed` without a second request. This
//! module decides which columns and which chart variant to draw; rendering is
//! left to the client.
//!
//! # Mapping
//!
//! | kind        | mark              | encoding                                      |
//! |-------------|-------------------|-----------------------------------------------|
//! | `histogram` | `bar`             | binned X, `count()` on Y                      |
//! | `scatter`   | `point`           | X, Y, optional color                          |
//! | `line`      | `line`            | X, Y, optional color                          |
//! | `bar`       | `bar`             | X against Y, or X against its value counts    |
//! | `box`       | `boxplot`         | Y, optional X grouping                        |
//! | `heatmap`   | `rect` + `text`   | correlation matrix of the numeric columns     |

use std::{fmt, str::FromStr};

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue, json};

use crate::{
    coerce::{coerce, coerce_float},
    columns::{Purpose, RequestedColumns, non_blank, select_default},
    data::ColumnKind,
    dataset::Dataset,
    error::{AnalysisError, Result},
    frequency, stats,
};

const VEGA_LITE_SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v5.json";
const BAR_TOP_VALUES: usize = 20;
const COUNT_FIELD: &str = "count";
pub const HEATMAP_TITLE: &str = "Correlation Heatmap";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Histogram,
    Scatter,
    Line,
    Bar,
    Box,
    Heatmap,
}

impl ChartKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::Histogram => "histogram",
            ChartKind::Scatter => "scatter",
            ChartKind::Line => "line",
            ChartKind::Bar => "bar",
            ChartKind::Box => "box",
            ChartKind::Heatmap => "heatmap",
        }
    }

    pub fn default_title(&self) -> String {
        let name = self.as_str();
        let mut chars = name.chars();
        let capitalized = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
            None => String::new(),
        };
        format!("{capitalized} Chart")
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartKind {
    type Err = AnalysisError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim() {
            "histogram" => Ok(ChartKind::Histogram),
            "scatter" => Ok(ChartKind::Scatter),
            "line" => Ok(ChartKind::Line),
            "bar" => Ok(ChartKind::Bar),
            "box" => Ok(ChartKind::Box),
            "heatmap" => Ok(ChartKind::Heatmap),
            _ => Err(AnalysisError::UnsupportedChartType(value.to_string())),
        }
    }
}

/// What the caller asked for. Kept immutable; resolved names live in
/// [`ChartMetadata`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChartRequest {
    pub chart_type: String,
    #[serde(default)]
    pub x_column: Option<String>,
    #[serde(default)]
    pub y_column: Option<String>,
    #[serde(default)]
    pub color_column: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// Serialized chart document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ChartSpec(JsonValue);

impl ChartSpec {
    pub fn as_json(&self) -> &JsonValue {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartMetadata {
    pub chart_type: String,
    pub x_column: Option<String>,
    pub y_column: Option<String>,
    pub color_column: Option<String>,
    pub data_shape: [usize; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPayload {
    pub chart: ChartSpec,
    pub metadata: ChartMetadata,
}

struct Resolved {
    x: Option<String>,
    y: Option<String>,
    color: Option<String>,
}

/// Resolves columns for `kind` and builds the chart. The dataset must already
/// be known to be non-empty.
pub fn build(dataset: &Dataset, kind: ChartKind, request: &ChartRequest) -> Result<ChartPayload> {
    let x = non_blank(request.x_column.as_deref());
    let y = non_blank(request.y_column.as_deref());
    let color = non_blank(request.color_column.as_deref()).map(str::to_string);
    let title = non_blank(request.title.as_deref())
        .map(str::to_string)
        .unwrap_or_else(|| kind.default_title());

    let (spec, resolved) = match kind {
        ChartKind::Histogram => {
            let columns =
                select_default(dataset, RequestedColumns::single(x), Purpose::NumericSingle)?;
            let spec = histogram(dataset, &columns.primary, &title)?;
            (spec, Resolved {
                x: Some(columns.primary),
                y: y.map(str::to_string),
                color,
            })
        }
        ChartKind::Scatter => {
            let columns =
                select_default(dataset, RequestedColumns::pair(x, y), Purpose::NumericPair)?;
            let y_name = columns.secondary.unwrap_or_default();
            let spec = xy_chart(
                dataset,
                "point",
                &columns.primary,
                &y_name,
                color.as_deref(),
                &title,
            )?;
            (spec, Resolved {
                x: Some(columns.primary),
                y: Some(y_name),
                color,
            })
        }
        ChartKind::Line => {
            let (Some(x), Some(y)) = (x, y) else {
                return Err(AnalysisError::MissingColumns("A line chart"));
            };
            let spec = xy_chart(dataset, "line", x, y, color.as_deref(), &title)?;
            (spec, Resolved {
                x: Some(x.to_string()),
                y: Some(y.to_string()),
                color,
            })
        }
        ChartKind::Bar => {
            let columns = select_default(
                dataset,
                RequestedColumns::single(x),
                Purpose::CategoricalSingle,
            )?;
            let spec = match y {
                Some(y) => bar_chart(dataset, &columns.primary, y, &title)?,
                None => frequency_bar_chart(dataset, &columns.primary, &title)?,
            };
            (spec, Resolved {
                x: Some(columns.primary),
                y: y.map(str::to_string),
                color,
            })
        }
        ChartKind::Box => {
            let columns =
                select_default(dataset, RequestedColumns::single(y), Purpose::NumericSingle)?;
            let spec = box_chart(dataset, x, &columns.primary, &title)?;
            (spec, Resolved {
                x: x.map(str::to_string),
                y: Some(columns.primary),
                color,
            })
        }
        ChartKind::Heatmap => {
            let spec = heatmap(dataset)?;
            (spec, Resolved {
                x: x.map(str::to_string),
                y: y.map(str::to_string),
                color,
            })
        }
    };
    debug!(
        "Built {} chart with x={:?} y={:?} color={:?}",
        kind, resolved.x, resolved.y, resolved.color
    );

    Ok(ChartPayload {
        chart: spec,
        metadata: ChartMetadata {
            chart_type: kind.as_str().to_string(),
            x_column: resolved.x,
            y_column: resolved.y,
            color_column: resolved.color,
            data_shape: dataset.shape(),
        },
    })
}

fn histogram(dataset: &Dataset, x: &str, title: &str) -> Result<ChartSpec> {
    let values = inline_values(dataset, &[x])?;
    let x_column = dataset.column(x)?;
    let mut x_encoding = field_encoding(x, x_column.kind);
    if x_column.is_numeric() {
        x_encoding.insert("bin".to_string(), json!(true));
    }
    document(
        title,
        values,
        json!("bar"),
        json!({
            "x": x_encoding,
            "y": {"aggregate": "count", "type": "quantitative"},
        }),
    )
}

fn xy_chart(
    dataset: &Dataset,
    mark: &str,
    x: &str,
    y: &str,
    color: Option<&str>,
    title: &str,
) -> Result<ChartSpec> {
    let mut fields = vec![x, y];
    fields.extend(color);
    let values = inline_values(dataset, &fields)?;
    let mut encoding = Map::new();
    encoding.insert(
        "x".to_string(),
        JsonValue::Object(field_encoding(x, dataset.column(x)?.kind)),
    );
    encoding.insert(
        "y".to_string(),
        JsonValue::Object(field_encoding(y, dataset.column(y)?.kind)),
    );
    if let Some(color) = color {
        encoding.insert(
            "color".to_string(),
            JsonValue::Object(field_encoding(color, dataset.column(color)?.kind)),
        );
    }
    document(title, values, json!(mark), JsonValue::Object(encoding))
}

fn bar_chart(dataset: &Dataset, x: &str, y: &str, title: &str) -> Result<ChartSpec> {
    let values = inline_values(dataset, &[x, y])?;
    let mut x_encoding = field_encoding(x, dataset.column(x)?.kind);
    x_encoding.insert("sort".to_string(), JsonValue::Null);
    document(
        title,
        values,
        json!("bar"),
        json!({
            "x": x_encoding,
            "y": field_encoding(y, dataset.column(y)?.kind),
        }),
    )
}

/// Bars of the most frequent X values, in frequency order.
fn frequency_bar_chart(dataset: &Dataset, x: &str, title: &str) -> Result<ChartSpec> {
    let column = dataset.column(x)?;
    let counts = frequency::value_counts(column, BAR_TOP_VALUES);
    let count_field = count_field_for(x);
    let values = counts
        .iter()
        .map(|row| {
            let mut record = Map::new();
            record.insert(x.to_string(), coerce(&row.value));
            record.insert(count_field.clone(), json!(row.count));
            JsonValue::Object(record)
        })
        .collect::<Vec<_>>();
    let mut x_encoding = field_encoding(x, column.kind);
    if column.kind.is_numeric() {
        x_encoding.insert("type".to_string(), json!("ordinal"));
    }
    x_encoding.insert("sort".to_string(), JsonValue::Null);
    document(
        title,
        values,
        json!("bar"),
        json!({
            "x": x_encoding,
            "y": {"field": escape_field(&count_field), "type": "quantitative", "title": COUNT_FIELD},
        }),
    )
}

/// The count lives beside the X values, so it must not reuse the X name.
fn count_field_for(x: &str) -> String {
    let mut field = COUNT_FIELD.to_string();
    while field == x {
        field.insert(0, '_');
    }
    field
}

fn box_chart(dataset: &Dataset, x: Option<&str>, y: &str, title: &str) -> Result<ChartSpec> {
    let mut fields = vec![y];
    fields.extend(x);
    let values = inline_values(dataset, &fields)?;
    let mut encoding = Map::new();
    if let Some(x) = x {
        let mut x_encoding = field_encoding(x, dataset.column(x)?.kind);
        x_encoding.insert("type".to_string(), json!("nominal"));
        encoding.insert("x".to_string(), JsonValue::Object(x_encoding));
    }
    encoding.insert(
        "y".to_string(),
        JsonValue::Object(field_encoding(y, dataset.column(y)?.kind)),
    );
    document(
        title,
        values,
        json!({"type": "boxplot", "extent": 1.5}),
        JsonValue::Object(encoding),
    )
}

fn heatmap(dataset: &Dataset) -> Result<ChartSpec> {
    let numeric = dataset.numeric_columns();
    if numeric.is_empty() {
        return Err(AnalysisError::NoNumericColumns("a heatmap"));
    }
    let matrix = stats::correlation_matrix(&numeric);
    let mut values = Vec::with_capacity(matrix.columns.len() * matrix.columns.len());
    for (i, row_name) in matrix.columns.iter().enumerate() {
        for (j, column_name) in matrix.columns.iter().enumerate() {
            values.push(json!({
                "row": row_name,
                "column": column_name,
                "correlation": coerce_float(matrix.get(i, j)),
            }));
        }
    }
    let order = json!(matrix.columns);
    let spec = json!({
        "$schema": VEGA_LITE_SCHEMA,
        "title": HEATMAP_TITLE,
        "data": {"values": values},
        "encoding": {
            "x": {"field": "column", "type": "nominal", "sort": order, "title": null},
            "y": {"field": "row", "type": "nominal", "sort": order, "title": null},
        },
        "layer": [
            {
                "mark": "rect",
                "encoding": {
                    "color": {
                        "field": "correlation",
                        "type": "quantitative",
                        "scale": {"domain": [-1, 1], "scheme": "redblue"},
                    },
                },
            },
            {
                "mark": "text",
                "encoding": {
                    "text": {"field": "correlation", "type": "quantitative", "format": ".2f"},
                },
            },
        ],
    });
    Ok(ChartSpec(spec))
}

fn document(
    title: &str,
    values: Vec<JsonValue>,
    mark: JsonValue,
    encoding: JsonValue,
) -> Result<ChartSpec> {
    if !encoding.is_object() {
        return Err(AnalysisError::ChartBuildFailure(
            "encoding must be an object".to_string(),
        ));
    }
    Ok(ChartSpec(json!({
        "$schema": VEGA_LITE_SCHEMA,
        "title": title,
        "data": {"values": values},
        "mark": mark,
        "encoding": encoding,
    })))
}

/// One JSON object per row holding the requested fields.
fn inline_values(dataset: &Dataset, fields: &[&str]) -> Result<Vec<JsonValue>> {
    let mut selected = Vec::with_capacity(fields.len());
    for name in fields {
        if selected.iter().any(|(existing, _)| existing == name) {
            continue;
        }
        selected.push((*name, dataset.column(name)?));
    }
    let rows = (0..dataset.row_count())
        .map(|row| {
            let mut record = Map::new();
            for (name, column) in &selected {
                record.insert(name.to_string(), coerce(&column.values[row]));
            }
            JsonValue::Object(record)
        })
        .collect();
    Ok(rows)
}

fn field_encoding(name: &str, kind: ColumnKind) -> Map<String, JsonValue> {
    let mut encoding = Map::new();
    encoding.insert("field".to_string(), json!(escape_field(name)));
    encoding.insert("type".to_string(), json!(measure_type(kind)));
    encoding.insert("title".to_string(), json!(name));
    encoding
}

fn measure_type(kind: ColumnKind) -> &'static str {
    match kind {
        ColumnKind::Integer | ColumnKind::Float => "quantitative",
        ColumnKind::Timestamp => "temporal",
        ColumnKind::Boolean | ColumnKind::Text | ColumnKind::Missing => "nominal",
    }
}

/// Vega-Lite reads `.` and `[` in field names as nested access.
fn escape_field(name: &str) -> String {
    let mut escaped = String::with_capacity(name.len());
    for ch in name.chars() {
        if matches!(ch, '.' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
