use crate::domain::entities::metric::MetricKind;
use crate::domain::entities::selection::SelectionMode;
use crate::domain::entities::source::Source;
use crate::domain::entities::table::{DisplayTable, RowOrigin};
use crate::domain::parse::{format_magnitude, format_percentage};
use crate::ui::state::app_state::AppState;

const MIN_WIDTH: usize = 8;

fn cell_text(kind: MetricKind, value: f64) -> String {
    match kind {
        MetricKind::Magnitude => format_magnitude(value),
        MetricKind::Percentage => format_percentage(value),
    }
}

/// Plain-text grid of the table, one line per row, numbers right aligned.
pub fn render_table(table: &DisplayTable) -> String {
    let headers = DisplayTable::columns();
    let mut lines: Vec<Vec<String>> = Vec::with_capacity(table.len() + 1);
    lines.push(headers.iter().map(|h| h.to_string()).collect());
    for row in &table.rows {
        let mut line = Vec::with_capacity(headers.len());
        let marker = if row.record.has_missing_data() && row.origin != RowOrigin::Others {
            "*"
        } else {
            ""
        };
        line.push(format!("{}{marker}", row.record.product_key));
        line.extend(
            row.record
                .values()
                .map(|(metric, value)| cell_text(metric.kind(), value)),
        );
        lines.push(line);
    }

    let mut widths = vec![MIN_WIDTH; headers.len()];
    for line in &lines {
        for (idx, text) in line.iter().enumerate() {
            widths[idx] = widths[idx].max(text.chars().count());
        }
    }

    let mut out = String::new();
    for (line_idx, line) in lines.iter().enumerate() {
        let cells: Vec<String> = line
            .iter()
            .enumerate()
            .map(|(idx, text)| {
                if idx == 0 {
                    format!("{text:<width$}", width = widths[idx])
                } else {
                    format!("{text:>width$}", width = widths[idx])
                }
            })
            .collect();
        out.push_str(cells.join("  ").trim_end());
        out.push('\n');
        if line_idx == 0 {
            let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
            out.push_str(&rule.join("  "));
            out.push('\n');
        }
    }
    out
}

fn mode_text(mode: SelectionMode) -> &'static str {
    match mode {
        SelectionMode::Unset => "unset",
        SelectionMode::AllSelected => "all",
        SelectionMode::PartialSelection => "partial",
        SelectionMode::Empty => "none",
    }
}

/// One line per source: selected count, mode and lock.
pub fn render_selection(state: &AppState) -> String {
    let mut out = String::new();
    for source in Source::ALL {
        let selection = state.selection(source);
        out.push_str(&format!(
            "{source}: {} selected ({})",
            selection.selected().len(),
            mode_text(selection.mode())
        ));
        if selection.is_locked() {
            out.push_str(", locked");
        }
        out.push('\n');
    }
    out
}
