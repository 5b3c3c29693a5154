use std::{borrow::Cow, fmt::Write as _};

use serde_json::Value as JsonValue;

use crate::preview::PreviewPayload;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

/// Renders a preview as an aligned text table. Numeric columns are
/// right-aligned; a footer reports how many rows were shown.
pub fn render_preview(payload: &PreviewPayload) -> String {
    let aligns = payload
        .columns
        .iter()
        .map(|name| match payload.dtypes.get(name) {
            Some(JsonValue::String(kind)) if kind == "integer" || kind == "float" => Align::Right,
            _ => Align::Left,
        })
        .collect::<Vec<_>>();
    let mut output = render_table(&payload.columns, &payload.table_rows(), &aligns);
    let _ = writeln!(
        output,
        "({} of {} row(s), {} column(s))",
        payload.preview_rows,
        payload.total_rows,
        payload.columns.len()
    );
    output
}

pub fn render_table(headers: &[String], rows: &[Vec<String>], aligns: &[Align]) -> String {
    let mut widths = headers.iter().map(|h| display_width(h)).collect::<Vec<_>>();
    for row in rows {
        for (idx, cell) in row.iter().enumerate().take(headers.len()) {
            widths[idx] = widths[idx].max(display_width(cell));
        }
    }
    for width in &mut widths {
        *width = (*width).max(3);
    }

    let mut output = String::new();
    let _ = writeln!(output, "{}", format_row(headers, &widths, &[]));
    let separator = widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_row(&separator, &widths, &[]));
    for row in rows {
        let _ = writeln!(output, "{}", format_row(row, &widths, aligns));
    }
    output
}

fn format_row(values: &[String], widths: &[usize], aligns: &[Align]) -> String {
    let cells = values
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(idx, (value, width))| {
            let sanitized = sanitize_cell(value);
            let padding = " ".repeat(width.saturating_sub(display_width(&sanitized)));
            match aligns.get(idx).copied().unwrap_or(Align::Left) {
                Align::Left => format!("{sanitized}{padding}"),
                Align::Right => format!("{padding}{sanitized}"),
            }
        })
        .collect::<Vec<_>>();
    cells.join("  ").trim_end().to_string()
}

fn display_width(value: &str) -> usize {
    value.chars().count()
}

/// Control whitespace would break the grid.
fn sanitize_cell(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    }
}
