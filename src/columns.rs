//! Default column selection for charts.
//!
//! Selection is a pure function of the dataset schema and the caller's
//! request: the request is never rewritten, the resolved names come back as a
//! separate [`ResolvedColumns`] value. Names supplied by the caller are passed
//! through untouched; a bad name surfaces later as a dataset lookup error.

use log::debug;

use crate::{
    dataset::Dataset,
    error::{AnalysisError, Result},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purpose {
    NumericSingle,
    NumericPair,
    CategoricalSingle,
}

/// Caller-supplied names for the slots a purpose fills. `primary` is the one
/// column of the single purposes and the X of a pair; `secondary` is the Y.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestedColumns<'a> {
    pub primary: Option<&'a str>,
    pub secondary: Option<&'a str>,
}

impl<'a> RequestedColumns<'a> {
    pub fn single(primary: Option<&'a str>) -> Self {
        Self {
            primary,
            secondary: None,
        }
    }

    pub fn pair(primary: Option<&'a str>, secondary: Option<&'a str>) -> Self {
        Self { primary, secondary }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedColumns {
    pub primary: String,
    pub secondary: Option<String>,
}

pub fn select_default(
    dataset: &Dataset,
    requested: RequestedColumns<'_>,
    purpose: Purpose,
) -> Result<ResolvedColumns> {
    let primary = non_blank(requested.primary);
    let secondary = non_blank(requested.secondary);

    let resolved = match purpose {
        Purpose::NumericSingle => ResolvedColumns {
            primary: match primary {
                Some(name) => name.to_string(),
                None => dataset
                    .numeric_columns()
                    .first()
                    .map(|c| c.name.clone())
                    .ok_or(AnalysisError::NoSuitableColumn("a numeric chart"))?,
            },
            secondary: None,
        },
        Purpose::NumericPair => match (primary, secondary) {
            (Some(x), Some(y)) => ResolvedColumns {
                primary: x.to_string(),
                secondary: Some(y.to_string()),
            },
            (x, y) => {
                let numeric = dataset.numeric_columns();
                if numeric.len() < 2 {
                    return Err(AnalysisError::InsufficientColumns("A scatter chart"));
                }
                ResolvedColumns {
                    primary: x.map(str::to_string).unwrap_or_else(|| numeric[0].name.clone()),
                    secondary: Some(
                        y.map(str::to_string)
                            .unwrap_or_else(|| numeric[1].name.clone()),
                    ),
                }
            }
        },
        Purpose::CategoricalSingle => ResolvedColumns {
            primary: match primary {
                Some(name) => name.to_string(),
                None => dataset
                    .categorical_columns()
                    .first()
                    .map(|c| c.name.clone())
                    .ok_or(AnalysisError::NoSuitableColumn("a bar chart"))?,
            },
            secondary: None,
        },
    };
    debug!("Resolved columns for {:?}: {:?}", purpose, resolved);
    Ok(resolved)
}

/// Blank names count as omitted.
pub fn non_blank(name: Option<&str>) -> Option<&str> {
    name.filter(|n| !n.trim().is_empty())
}
