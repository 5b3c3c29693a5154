mod common;

use chrono::NaiveDate;
use common::TestWorkspace;
use datashare::{
    data::{ColumnKind, Value},
    error::AnalysisError,
    loader::{self, FileType},
};
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

#[test]
fn csv_counts_rows_and_infers_kinds() {
    let workspace = TestWorkspace::new();
    let path = workspace.numeric_csv("numbers.csv", 150);
    let dataset = loader::load(&path, "csv").expect("load csv");
    assert_eq!(dataset.shape(), [150, 3]);
    assert_eq!(dataset.column("a").unwrap().kind, ColumnKind::Integer);
    assert_eq!(dataset.column("b").unwrap().kind, ColumnKind::Float);
    assert_eq!(dataset.column("c").unwrap().kind, ColumnKind::Text);
}

#[test]
fn csv_falls_back_to_gbk() {
    let workspace = TestWorkspace::new();
    let (encoded, _, had_errors) = encoding_rs::GBK.encode("名称,数量\n苹果,3\n香蕉,5\n");
    assert!(!had_errors);
    let path = workspace.write_bytes("gbk.csv", &encoded);
    let dataset = loader::load(&path, "csv").expect("load gbk csv");
    assert_eq!(dataset.column_names(), vec!["名称", "数量"]);
    assert_eq!(
        dataset.column("名称").unwrap().values[0],
        Value::Text("苹果".to_string())
    );
    assert_eq!(dataset.column("数量").unwrap().kind, ColumnKind::Integer);
}

#[test]
fn csv_strips_utf8_bom_and_reads_missing_tokens() {
    let workspace = TestWorkspace::new();
    let path = workspace.write_bytes("bom.csv", b"\xEF\xBB\xBFid,score\n1,NA\n2,4.5\n3,\n");
    let dataset = loader::load(&path, "csv").expect("load csv");
    let score = dataset.column("score").unwrap();
    assert_eq!(dataset.column_names(), vec!["id", "score"]);
    assert_eq!(score.kind, ColumnKind::Float);
    assert_eq!(score.missing_count(), 2);
}

#[test]
fn csv_pads_short_rows_and_renames_headers() {
    let workspace = TestWorkspace::new();
    let path = workspace.write("ragged.csv", "a,,a\n1,2\n3,4,5\n");
    let dataset = loader::load(&path, "csv").expect("load csv");
    assert_eq!(dataset.column_names(), vec!["a", "column_2", "a.1"]);
    assert!(dataset.column("a.1").unwrap().values[0].is_missing());
}

#[test]
fn csv_with_extra_fields_fails_to_load() {
    let workspace = TestWorkspace::new();
    let path = workspace.write("wide.csv", "a,b\n1,2,3\n");
    let err = loader::load(&path, "csv").unwrap_err();
    assert!(matches!(err, AnalysisError::LoadFailure(_)));
    assert_eq!(err.status_code(), 500);
}

#[test]
fn txt_is_tab_delimited() {
    let workspace = TestWorkspace::new();
    let path = workspace.write("table.txt", "city\tpop\nOslo\t700000\nBergen\t285000\n");
    let dataset = loader::load(&path, "txt").expect("load txt");
    assert_eq!(dataset.shape(), [2, 2]);
    assert_eq!(dataset.column("pop").unwrap().values[1], Value::Integer(285000));
}

#[test]
fn empty_text_file_fails_to_load() {
    let workspace = TestWorkspace::new();
    let path = workspace.write("empty.csv", "");
    let err = loader::load(&path, "csv").unwrap_err();
    assert!(matches!(err, AnalysisError::LoadFailure(_)));
}

#[test]
fn header_only_csv_is_an_empty_dataset() {
    let workspace = TestWorkspace::new();
    let path = workspace.write("header.csv", "a,b\n");
    let dataset = loader::load(&path, "csv").expect("load csv");
    assert_eq!(dataset.shape(), [0, 2]);
    assert!(dataset.is_empty());
}

#[test]
fn json_records_and_column_objects_load() {
    let workspace = TestWorkspace::new();
    let records = workspace.write(
        "records.json",
        r#"[{"name": "a", "qty": 1}, {"name": "b", "qty": null, "ok": true}]"#,
    );
    let dataset = loader::load(&records, "json").expect("load records");
    assert_eq!(dataset.column_names(), vec!["name", "qty", "ok"]);
    assert_eq!(dataset.column("qty").unwrap().kind, ColumnKind::Integer);
    assert_eq!(dataset.column("ok").unwrap().kind, ColumnKind::Boolean);

    let columns = workspace.write("columns.json", r#"{"x": [1.5, 2.5], "y": ["p", "q"]}"#);
    let dataset = loader::load(&columns, "json").expect("load columns");
    assert_eq!(dataset.shape(), [2, 2]);
    assert_eq!(dataset.column("x").unwrap().kind, ColumnKind::Float);
}

#[test]
fn json_scalar_root_fails_to_load() {
    let workspace = TestWorkspace::new();
    let path = workspace.write("scalar.json", "42");
    assert!(matches!(
        loader::load(&path, "json"),
        Err(AnalysisError::LoadFailure(_))
    ));
}

#[test]
fn missing_file_is_not_found_for_every_type() {
    let workspace = TestWorkspace::new();
    let path = workspace.path().join("absent");
    for kind in ["csv", "xlsx", "xls", "json", "txt", "parquet"] {
        let err = loader::load(&path, kind).unwrap_err();
        assert!(matches!(err, AnalysisError::NotFound(_)), "{kind}: {err}");
        assert_eq!(err.status_code(), 404);
    }
}

#[test]
fn unknown_type_is_unsupported() {
    let workspace = TestWorkspace::new();
    let path = workspace.write("data.parquet", "PAR1");
    let err = loader::load(&path, "parquet").unwrap_err();
    assert!(matches!(err, AnalysisError::UnsupportedType(ref kind) if kind == "parquet"));
    assert_eq!(err.status_code(), 400);
}

#[test]
fn corrupt_workbook_fails_to_load() {
    let workspace = TestWorkspace::new();
    let path = workspace.write("broken.xlsx", "this is not a zip archive");
    let err = loader::load_as(&path, FileType::Xlsx).unwrap_err();
    assert!(matches!(err, AnalysisError::LoadFailure(_)));
    assert_eq!(err.status_code(), 500);
}

#[test]
fn xlsx_loads_first_sheet_with_narrowed_integers() {
    let workspace = TestWorkspace::new();
    let path = workspace.path().join("orders.xlsx");
    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    let sheet = workbook.add_worksheet();
    for (col, header) in ["id", "price", "ordered_on", "label"].iter().enumerate() {
        sheet.write_string(0, col as u16, *header).unwrap();
    }
    let rows = [(1.0, 9.5, 15, "tea"), (2.0, 12.25, 16, "cake"), (3.0, 4.75, 17, "jam")];
    for (idx, (id, price, day, label)) in rows.iter().enumerate() {
        let row = idx as u32 + 1;
        sheet.write_number(row, 0, *id).unwrap();
        sheet.write_number(row, 1, *price).unwrap();
        let date = ExcelDateTime::from_ymd(2024, 1, *day).unwrap();
        sheet.write_datetime_with_format(row, 2, &date, &date_format).unwrap();
        sheet.write_string(row, 3, *label).unwrap();
    }
    let second = workbook.add_worksheet();
    second.write_string(0, 0, "ignored").unwrap();
    workbook.save(&path).unwrap();

    let dataset = loader::load(&path, "xlsx").expect("load xlsx");
    assert_eq!(dataset.shape(), [3, 4]);
    assert_eq!(dataset.column_names(), vec!["id", "price", "ordered_on", "label"]);

    let id = dataset.column("id").unwrap();
    assert_eq!(id.kind, ColumnKind::Integer);
    assert_eq!(id.values[0], Value::Integer(1));
    assert_eq!(dataset.column("price").unwrap().kind, ColumnKind::Float);

    let ordered_on = dataset.column("ordered_on").unwrap();
    assert_eq!(ordered_on.kind, ColumnKind::Timestamp);
    let expected = NaiveDate::from_ymd_opt(2024, 1, 15)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    assert_eq!(ordered_on.values[0], Value::Timestamp(expected));
    assert_eq!(dataset.column("label").unwrap().kind, ColumnKind::Text);
}
