use std::{fmt, str::FromStr};

use log::debug;
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use crate::{
    dataset::Dataset,
    error::{AnalysisError, Result},
    stats,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisKind {
    Describe,
    Correlation,
    MissingValues,
}

impl AnalysisKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisKind::Describe => "describe",
            AnalysisKind::Correlation => "correlation",
            AnalysisKind::MissingValues => "missing_values",
        }
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisKind {
    type Err = AnalysisError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim() {
            "describe" => Ok(AnalysisKind::Describe),
            "correlation" => Ok(AnalysisKind::Correlation),
            "missing_values" => Ok(AnalysisKind::MissingValues),
            _ => Err(AnalysisError::UnsupportedAnalysisType(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisPayload {
    pub analysis_type: String,
    pub result: Map<String, JsonValue>,
    /// Columns the result covers.
    pub columns: Vec<String>,
    pub shape: [usize; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_missing: Option<usize>,
}

pub fn analyze(dataset: &Dataset, kind: AnalysisKind) -> Result<AnalysisPayload> {
    let (result, columns, total_missing) = match kind {
        AnalysisKind::Describe => {
            let (columns, result) = stats::describe(dataset)?;
            (result, columns, None)
        }
        AnalysisKind::Correlation => {
            let matrix = stats::correlation(dataset)?;
            (matrix.to_nested_map(), matrix.columns, None)
        }
        AnalysisKind::MissingValues => {
            let summary = stats::missing_values(dataset);
            (
                summary.result,
                dataset.column_names(),
                Some(summary.total_missing),
            )
        }
    };
    debug!("{} analysis covered {} column(s)", kind, columns.len());
    Ok(AnalysisPayload {
        analysis_type: kind.as_str().to_string(),
        result,
        columns,
        shape: dataset.shape(),
        total_missing,
    })
}
