use std::collections::HashMap;

use crate::{data::Value, dataset::Column};

/// One distinct value and how often it occurs.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyRow {
    pub value: Value,
    pub count: usize,
}

/// Counts distinct values keeping the order in which each was first seen.
#[derive(Debug, Default)]
pub struct FrequencyAccumulator {
    positions: HashMap<String, usize>,
    rows: Vec<FrequencyRow>,
}

impl FrequencyAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Missing cells are not counted.
    pub fn ingest(&mut self, value: &Value) {
        if value.is_missing() {
            return;
        }
        let key = value.as_display();
        match self.positions.get(&key) {
            Some(&idx) => self.rows[idx].count += 1,
            None => {
                self.positions.insert(key, self.rows.len());
                self.rows.push(FrequencyRow {
                    value: value.clone(),
                    count: 1,
                });
            }
        }
    }

    pub fn distinct(&self) -> usize {
        self.rows.len()
    }

    /// Most frequent first; equal counts keep first-seen order. `top = 0`
    /// keeps every value.
    pub fn into_top(self, top: usize) -> Vec<FrequencyRow> {
        let mut rows = self.rows;
        // stable sort preserves first-seen order among ties
        rows.sort_by(|a, b| b.count.cmp(&a.count));
        if top > 0 && rows.len() > top {
            rows.truncate(top);
        }
        rows
    }
}

pub fn value_counts(column: &Column, top: usize) -> Vec<FrequencyRow> {
    let mut accumulator = FrequencyAccumulator::new();
    for value in &column.values {
        accumulator.ingest(value);
    }
    accumulator.into_top(top)
}
