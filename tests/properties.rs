use datashare::{
    chart::{self, ChartKind, ChartRequest},
    coerce::coerce,
    data::Value,
    dataset::{Column, Dataset},
    stats,
};
use proptest::prelude::*;
use serde_json::Value as JsonValue;

fn cell_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        1 => Just(Value::Missing),
        1 => Just(Value::Float(f64::NAN)),
        6 => (-1.0e6f64..1.0e6).prop_map(Value::Float),
    ]
}

fn numeric_dataset() -> impl Strategy<Value = Dataset> {
    (2usize..5, 0usize..40).prop_flat_map(|(columns, rows)| {
        proptest::collection::vec(proptest::collection::vec(cell_strategy(), rows), columns)
            .prop_map(|cells| {
                let columns = cells
                    .into_iter()
                    .enumerate()
                    .map(|(idx, values)| Column::new(format!("n{idx}"), values))
                    .collect();
                Dataset::new(columns).expect("equal length columns")
            })
    })
}

proptest! {
    #[test]
    fn correlation_is_symmetric_with_unit_diagonal(dataset in numeric_dataset()) {
        let numeric = dataset.numeric_columns();
        let matrix = stats::correlation_matrix(&numeric);
        let nested = matrix.to_nested_map();
        for a in &matrix.columns {
            prop_assert_eq!(&nested[a][a], &serde_json::json!(1.0));
            for b in &matrix.columns {
                prop_assert_eq!(&nested[a][b], &nested[b][a]);
                if let Some(r) = nested[a][b].as_f64() {
                    prop_assert!((-1.0..=1.0).contains(&r));
                }
            }
        }
    }

    #[test]
    fn missing_total_is_sum_of_columns(dataset in numeric_dataset()) {
        let summary = stats::missing_values(&dataset);
        let per_column: usize = dataset.columns().iter().map(Column::missing_count).sum();
        prop_assert_eq!(summary.total_missing, per_column);
    }

    #[test]
    fn bar_counts_never_exceed_twenty_bars(labels in proptest::collection::vec(0u8..60, 1..300)) {
        let dataset = Dataset::new(vec![Column::new(
            "label",
            labels.iter().map(|l| Value::Text(format!("v{l}"))).collect(),
        )])
        .expect("single column");
        let request = ChartRequest { chart_type: "bar".into(), ..ChartRequest::default() };
        let payload = chart::build(&dataset, ChartKind::Bar, &request).expect("bar chart");
        let bars = payload.chart.as_json()["data"]["values"].as_array().cloned().unwrap_or_default();
        prop_assert!(bars.len() <= 20);
        let counts = bars.iter().filter_map(|bar| bar["count"].as_u64()).collect::<Vec<_>>();
        prop_assert!(counts.windows(2).all(|pair| pair[0] >= pair[1]));
    }

    #[test]
    fn missing_cells_always_coerce_to_null(value in cell_strategy()) {
        let coerced = coerce(&value);
        if value.is_missing() {
            prop_assert_eq!(coerced, JsonValue::Null);
        } else {
            prop_assert!(coerced.is_number());
        }
    }
}
