//! Request-level operations shared by the CLI and the HTTP server.
//!
//! Each operation loads the file named in the request, dispatches it, and
//! converts any failure into a [`ServiceError`] carrying the status code the
//! caller should see. Failures are logged here, once.

use std::path::Path;

use anyhow::{Context, Result};
use log::{error, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    chart::ChartRequest,
    dataset::Dataset,
    dispatch::{self, Operation, Outcome},
    error::AnalysisError,
    loader,
};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PreviewRequest {
    pub file_path: String,
    pub file_type: String,
    #[serde(default)]
    pub rows: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VisualizeRequest {
    pub file_path: String,
    pub file_type: String,
    #[serde(flatten)]
    pub chart: ChartRequest,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnalyzeRequest {
    pub file_path: String,
    pub file_type: String,
    pub analysis_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{detail}")]
pub struct ServiceError {
    pub status: u16,
    pub detail: String,
}

impl ServiceError {
    /// Typed failures keep their own status and message; anything else is an
    /// internal error prefixed with the operation name.
    pub fn from_failure(operation: &str, err: &anyhow::Error) -> Self {
        match err.downcast_ref::<AnalysisError>() {
            Some(analysis) => ServiceError {
                status: analysis.status_code(),
                detail: analysis.to_string(),
            },
            None => ServiceError {
                status: 500,
                detail: format!("{operation} failed: {err:#}"),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody<'a> {
    pub detail: &'a str,
}

pub fn preview(request: &PreviewRequest, default_rows: i64) -> Result<Outcome, ServiceError> {
    let rows = request.rows.unwrap_or(default_rows);
    respond("Preview", || {
        let dataset = load(&request.file_path, &request.file_type)?;
        Ok(dispatch::run(&dataset, Operation::Preview { rows })?)
    })
}

pub fn visualize(request: &VisualizeRequest) -> Result<Outcome, ServiceError> {
    respond("Visualization", || {
        let dataset = load(&request.file_path, &request.file_type)?;
        Ok(dispatch::run(&dataset, Operation::Chart(&request.chart))?)
    })
}

pub fn analyze(request: &AnalyzeRequest) -> Result<Outcome, ServiceError> {
    respond("Analysis", || {
        let dataset = load(&request.file_path, &request.file_type)?;
        Ok(dispatch::run(
            &dataset,
            Operation::Analysis {
                kind: &request.analysis_type,
            },
        )?)
    })
}

/// Logs and converts a failure raised outside an operation body, such as a
/// worker pool error in the HTTP layer.
pub fn internal_failure(operation: &str, err: anyhow::Error) -> ServiceError {
    let failure = ServiceError::from_failure(operation, &err);
    error!("{operation} failed ({}): {err:#}", failure.status);
    failure
}

fn respond<F>(operation: &str, body: F) -> Result<Outcome, ServiceError>
where
    F: FnOnce() -> Result<Outcome>,
{
    match body() {
        Ok(outcome) => {
            info!("{operation} completed");
            Ok(outcome)
        }
        Err(err) => Err(internal_failure(operation, err)),
    }
}

fn load(path: &str, file_type: &str) -> Result<Dataset> {
    loader::load(Path::new(path), file_type)
        .with_context(|| format!("Loading {path:?} as {file_type}"))
}
