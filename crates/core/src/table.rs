//! Fixed-width text rendering of a [`Grid`] for terminals.

use crate::constants::GRID_CORNER_LABEL;
use crate::{CardConfig, Cell, Grid};

/// Rendering switches.
#[derive(Clone, Copy, Debug, Default)]
pub struct TableOptions {
    /// Append `[#id]` to populated cells so the operator can delete a record.
    pub show_record_ids: bool,
}

fn cell_display(cell: &Cell, config: &CardConfig, options: TableOptions) -> String {
    let text = cell.text(config);
    match cell.record_id() {
        Some(id) if options.show_record_ids => format!("{text} [#{id}]"),
        _ => text,
    }
}

/// Render the grid as a `|`-separated table with a header rule.
pub fn render_table(grid: &Grid, config: &CardConfig, options: TableOptions) -> String {
    let header: Vec<String> = std::iter::once(GRID_CORNER_LABEL.to_string())
        .chain(grid.columns.iter().cloned())
        .collect();

    let body: Vec<Vec<String>> = grid
        .rows
        .iter()
        .map(|row| {
            std::iter::once(row.display_label())
                .chain(row.cells.iter().map(|cell| cell_display(cell, config, options)))
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for line in &body {
        for (width, field) in widths.iter_mut().zip(line) {
            *width = (*width).max(field.chars().count());
        }
    }

    let format_line = |fields: &[String]| -> String {
        let padded: Vec<String> = fields
            .iter()
            .zip(&widths)
            .map(|(field, width)| format!("{field:<width$}"))
            .collect();
        format!("| {} |", padded.join(" | "))
    };

    let mut out = String::new();
    out.push_str(&format_line(&header));
    out.push('\n');
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&format!("|-{}-|", rule.join("-|-")));
    out.push('\n');
    for line in &body {
        out.push_str(&format_line(line));
        out.push('\n');
    }
    out
}
