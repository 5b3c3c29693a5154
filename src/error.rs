//! Typed failures raised by the loader, column selector, and dispatcher.
//!
//! Each variant maps onto an HTTP-style status via [`AnalysisError::status_code`]:
//! a missing file is `404`, anything the caller can fix by changing the request
//! (unsupported types, empty datasets, unusable columns) is `400`, and parse or
//! chart generation failures are `500`.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnalysisError>;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("Unsupported chart type: {0}")]
    UnsupportedChartType(String),

    #[error("Unsupported analysis type: {0}")]
    UnsupportedAnalysisType(String),

    #[error("Failed to load file: {0}")]
    LoadFailure(String),

    #[error("Dataset is empty")]
    EmptyDataset,

    #[error("No suitable column available for {0}")]
    NoSuitableColumn(&'static str),

    #[error("No numeric columns available for {0}")]
    NoNumericColumns(&'static str),

    #[error("{0} requires at least two numeric columns")]
    InsufficientColumns(&'static str),

    #[error("{0} requires both X and Y columns")]
    MissingColumns(&'static str),

    #[error("Column '{0}' not found in dataset")]
    UnknownColumn(String),

    #[error("Chart generation failed: {0}")]
    ChartBuildFailure(String),
}

impl AnalysisError {
    pub fn status_code(&self) -> u16 {
        match self {
            AnalysisError::NotFound(_) => 404,
            AnalysisError::UnsupportedType(_)
            | AnalysisError::UnsupportedChartType(_)
            | AnalysisError::UnsupportedAnalysisType(_)
            | AnalysisError::EmptyDataset
            | AnalysisError::NoSuitableColumn(_)
            | AnalysisError::NoNumericColumns(_)
            | AnalysisError::InsufficientColumns(_)
            | AnalysisError::MissingColumns(_)
            | AnalysisError::UnknownColumn(_) => 400,
            AnalysisError::LoadFailure(_) | AnalysisError::ChartBuildFailure(_) => 500,
        }
    }
}
