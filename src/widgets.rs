//! Table widget capability.

use crate::projection::{Column, Row};

/// Renders rows under a column schema.
pub trait TableWidget: Send + Sync {
    fn render(&self, rows: &[Row], columns: &[Column]) -> String;
}

/// Fixed-width plain text grid.
///
/// Header row, a dashed rule, then one line per row. Missing cells are blank.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextTable;

const COLUMN_GAP: &str = "  ";

impl TableWidget for PlainTextTable {
    fn render(&self, rows: &[Row], columns: &[Column]) -> String {
        let cells: Vec<Vec<String>> = rows
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|c| row.get(&c.key).map(|v| v.to_string()).unwrap_or_default())
                    .collect()
            })
            .collect();

        let widths: Vec<usize> = columns
            .iter()
            .enumerate()
            .map(|(i, c)| {
                cells
                    .iter()
                    .map(|line| line[i].chars().count())
                    .chain(std::iter::once(c.label.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut lines = Vec::with_capacity(rows.len() + 2);
        lines.push(format_line(columns.iter().map(|c| c.label.as_str()), &widths));
        lines.push(
            widths
                .iter()
                .map(|w| "-".repeat(*w))
                .collect::<Vec<_>>()
                .join(COLUMN_GAP),
        );
        for line in &cells {
            lines.push(format_line(line.iter().map(String::as_str), &widths));
        }
        lines.join("\n")
    }
}

fn format_line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect();
    padded.join(COLUMN_GAP).trim_end().to_string()
}
