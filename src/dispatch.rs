//! Routes a loaded dataset to preview, chart building, or statistics.
//!
//! Charts and analyses reject an empty dataset before their kind string is
//! parsed, so an empty file reports `EmptyDataset` even for an unknown kind.
//! Preview accepts empty datasets.

use serde::Serialize;

use crate::{
    analysis::{self, AnalysisKind, AnalysisPayload},
    chart::{self, ChartKind, ChartPayload, ChartRequest},
    dataset::Dataset,
    error::{AnalysisError, Result},
    preview::{self, PreviewPayload},
};

#[derive(Debug, Clone, Copy)]
pub enum Operation<'a> {
    Preview { rows: i64 },
    Chart(&'a ChartRequest),
    Analysis { kind: &'a str },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Outcome {
    Preview(PreviewPayload),
    Chart(ChartPayload),
    Analysis(AnalysisPayload),
}

pub fn run(dataset: &Dataset, operation: Operation<'_>) -> Result<Outcome> {
    match operation {
        Operation::Preview { rows } => Ok(Outcome::Preview(preview::preview(dataset, rows))),
        Operation::Chart(request) => {
            ensure_not_empty(dataset)?;
            let kind: ChartKind = request.chart_type.parse()?;
            chart::build(dataset, kind, request).map(Outcome::Chart)
        }
        Operation::Analysis { kind } => {
            ensure_not_empty(dataset)?;
            let kind: AnalysisKind = kind.parse()?;
            analysis::analyze(dataset, kind).map(Outcome::Analysis)
        }
    }
}

fn ensure_not_empty(dataset: &Dataset) -> Result<()> {
    if dataset.is_empty() {
        Err(AnalysisError::EmptyDataset)
    } else {
        Ok(())
    }
}
