mod common;

use common::TestWorkspace;
use datashare::{
    chart::{ChartRequest, HEATMAP_TITLE},
    dispatch::{self, Operation, Outcome},
    error::AnalysisError,
    loader,
};
use serde_json::{Value as JsonValue, json};

fn chart(chart_type: &str) -> ChartRequest {
    ChartRequest {
        chart_type: chart_type.to_string(),
        ..ChartRequest::default()
    }
}

fn expect_chart(outcome: Outcome) -> datashare::chart::ChartPayload {
    match outcome {
        Outcome::Chart(payload) => payload,
        other => panic!("expected chart outcome, got {other:?}"),
    }
}

fn expect_analysis(outcome: Outcome) -> datashare::analysis::AnalysisPayload {
    match outcome {
        Outcome::Analysis(payload) => payload,
        other => panic!("expected analysis outcome, got {other:?}"),
    }
}

#[test]
fn preview_of_150_rows_returns_requested_ten() {
    let workspace = TestWorkspace::new();
    let dataset = loader::load(&workspace.numeric_csv("rows.csv", 150), "csv").unwrap();
    let Outcome::Preview(payload) =
        dispatch::run(&dataset, Operation::Preview { rows: 10 }).unwrap()
    else {
        panic!("expected preview");
    };
    assert_eq!(payload.preview_rows, 10);
    assert_eq!(payload.total_rows, 150);
    assert_eq!(payload.data.len(), 10);
    assert_eq!(payload.columns, vec!["a", "b", "c"]);
}

#[test]
fn preview_past_the_end_returns_every_row() {
    let workspace = TestWorkspace::new();
    let dataset = loader::load(&workspace.numeric_csv("rows.csv", 7), "csv").unwrap();
    let Outcome::Preview(payload) =
        dispatch::run(&dataset, Operation::Preview { rows: 1000 }).unwrap()
    else {
        panic!("expected preview");
    };
    assert_eq!(payload.preview_rows, 7);
    assert_eq!(payload.data.len(), 7);
}

#[test]
fn scatter_defaults_to_first_two_numeric_columns() {
    let workspace = TestWorkspace::new();
    let dataset = loader::load(&workspace.numeric_csv("abc.csv", 5), "csv").unwrap();
    let payload = expect_chart(dispatch::run(&dataset, Operation::Chart(&chart("scatter"))).unwrap());
    assert_eq!(payload.metadata.x_column.as_deref(), Some("a"));
    assert_eq!(payload.metadata.y_column.as_deref(), Some("b"));
    assert_eq!(payload.metadata.data_shape, [5, 3]);
    assert_eq!(payload.chart.as_json()["mark"], json!("point"));
    assert_eq!(payload.chart.as_json()["title"], json!("Scatter Chart"));
}

#[test]
fn every_chart_kind_rejects_an_empty_dataset() {
    let workspace = TestWorkspace::new();
    let dataset = loader::load(&workspace.write("empty.csv", "a,b,c\n"), "csv").unwrap();
    for kind in ["histogram", "scatter", "line", "bar", "box", "heatmap", "pie"] {
        let err = dispatch::run(&dataset, Operation::Chart(&chart(kind))).unwrap_err();
        assert!(matches!(err, AnalysisError::EmptyDataset), "{kind}: {err}");
        assert_eq!(err.status_code(), 400);
    }
}

#[test]
fn unknown_chart_kind_is_unsupported() {
    let workspace = TestWorkspace::new();
    let dataset = loader::load(&workspace.numeric_csv("abc.csv", 3), "csv").unwrap();
    let err = dispatch::run(&dataset, Operation::Chart(&chart("pie"))).unwrap_err();
    assert!(matches!(err, AnalysisError::UnsupportedChartType(ref kind) if kind == "pie"));
    assert_eq!(err.status_code(), 400);
}

#[test]
fn bar_without_y_keeps_twenty_most_frequent_values() {
    let workspace = TestWorkspace::new();
    let mut contents = String::from("label\n");
    for i in 0..30 {
        // label_i appears i + 1 times
        for _ in 0..=i {
            contents.push_str(&format!("label_{i}\n"));
        }
    }
    let dataset = loader::load(&workspace.write("labels.csv", &contents), "csv").unwrap();
    let payload = expect_chart(dispatch::run(&dataset, Operation::Chart(&chart("bar"))).unwrap());
    let bars = payload.chart.as_json()["data"]["values"]
        .as_array()
        .unwrap()
        .clone();
    assert_eq!(bars.len(), 20);
    assert_eq!(bars[0], json!({"label": "label_29", "count": 30}));
    let counts = bars
        .iter()
        .map(|bar| bar["count"].as_u64().unwrap())
        .collect::<Vec<_>>();
    assert!(counts.windows(2).all(|pair| pair[0] >= pair[1]));
    assert_eq!(payload.metadata.y_column, None);
}

#[test]
fn line_without_both_axes_is_a_bad_request() {
    let workspace = TestWorkspace::new();
    let dataset = loader::load(&workspace.numeric_csv("abc.csv", 3), "csv").unwrap();
    let err = dispatch::run(&dataset, Operation::Chart(&chart("line"))).unwrap_err();
    assert!(matches!(err, AnalysisError::MissingColumns(_)));
    assert_eq!(err.status_code(), 400);
}

#[test]
fn caller_title_overrides_default_except_for_heatmap() {
    let workspace = TestWorkspace::new();
    let dataset = loader::load(&workspace.numeric_csv("abc.csv", 4), "csv").unwrap();
    let mut request = chart("histogram");
    request.title = Some("Spread of a".to_string());
    let payload = expect_chart(dispatch::run(&dataset, Operation::Chart(&request)).unwrap());
    assert_eq!(payload.chart.as_json()["title"], json!("Spread of a"));

    request.chart_type = "heatmap".to_string();
    let payload = expect_chart(dispatch::run(&dataset, Operation::Chart(&request)).unwrap());
    assert_eq!(payload.chart.as_json()["title"], json!(HEATMAP_TITLE));
}

#[test]
fn text_only_dataset_has_no_numeric_summaries() {
    let workspace = TestWorkspace::new();
    let dataset =
        loader::load(&workspace.write("text.csv", "name,city\nann,oslo\nbo,rome\n"), "csv").unwrap();
    let describe = dispatch::run(&dataset, Operation::Analysis { kind: "describe" }).unwrap_err();
    assert!(matches!(describe, AnalysisError::NoNumericColumns(_)));
    let correlation =
        dispatch::run(&dataset, Operation::Analysis { kind: "correlation" }).unwrap_err();
    assert!(matches!(correlation, AnalysisError::InsufficientColumns(_)));
    let heatmap = dispatch::run(&dataset, Operation::Chart(&chart("heatmap"))).unwrap_err();
    assert!(matches!(heatmap, AnalysisError::NoNumericColumns(_)));
}

#[test]
fn correlation_matrix_is_symmetric_with_unit_diagonal() {
    let workspace = TestWorkspace::new();
    let dataset = loader::load(
        &workspace.write(
            "corr.csv",
            "x,y,z\n1,2,9\n2,4,3\n3,5,7\n4,4,1\n5,8,\n",
        ),
        "csv",
    )
    .unwrap();
    let payload = expect_analysis(
        dispatch::run(&dataset, Operation::Analysis { kind: "correlation" }).unwrap(),
    );
    for a in &payload.columns {
        assert_eq!(payload.result[a][a], json!(1.0));
        for b in &payload.columns {
            assert_eq!(payload.result[a][b], payload.result[b][a]);
        }
    }
}

#[test]
fn describe_reports_statistics_in_order() {
    let workspace = TestWorkspace::new();
    let dataset =
        loader::load(&workspace.write("d.csv", "v,label\n1,a\n2,b\n3,c\n4,d\n"), "csv").unwrap();
    let payload =
        expect_analysis(dispatch::run(&dataset, Operation::Analysis { kind: "describe" }).unwrap());
    assert_eq!(payload.columns, vec!["v"]);
    let stats = payload.result["v"].as_object().unwrap();
    assert_eq!(
        stats.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["count", "mean", "std", "min", "25%", "50%", "75%", "max"]
    );
    assert_eq!(stats["count"], json!(4));
    assert_eq!(stats["mean"], json!(2.5));
    assert_eq!(stats["25%"], json!(1.75));
}

#[test]
fn missing_total_matches_per_column_counts() {
    let workspace = TestWorkspace::new();
    let dataset = loader::load(
        &workspace.write("gaps.csv", "a,b,c\n1,,x\nNA,2,\n3,null,z\n"),
        "csv",
    )
    .unwrap();
    let payload = expect_analysis(
        dispatch::run(&dataset, Operation::Analysis { kind: "missing_values" }).unwrap(),
    );
    let per_column: u64 = payload
        .result
        .values()
        .map(|entry| entry["missing_count"].as_u64().unwrap())
        .sum();
    assert_eq!(payload.total_missing, Some(per_column as usize));
    assert_eq!(per_column, 4);
    assert_eq!(payload.columns, vec!["a", "b", "c"]);
}

#[test]
fn unknown_analysis_kind_is_unsupported() {
    let workspace = TestWorkspace::new();
    let dataset = loader::load(&workspace.numeric_csv("abc.csv", 3), "csv").unwrap();
    let err = dispatch::run(&dataset, Operation::Analysis { kind: "forecast" }).unwrap_err();
    assert!(matches!(err, AnalysisError::UnsupportedAnalysisType(_)));
}

#[test]
fn missing_numeric_cells_coerce_to_null() {
    let workspace = TestWorkspace::new();
    let dataset = loader::load(&workspace.write("n.csv", "v\n1.5\nNaN\n\n"), "csv").unwrap();
    let Outcome::Preview(payload) = dispatch::run(&dataset, Operation::Preview { rows: 3 }).unwrap()
    else {
        panic!("expected preview");
    };
    assert_eq!(payload.data[1]["v"], JsonValue::Null);
    let rendered = serde_json::to_string(&payload).unwrap();
    assert!(!rendered.contains("NaN"));
}
