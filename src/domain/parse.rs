use serde::{Deserialize, Serialize};

use crate::domain::entities::metric::round_to;
use crate::domain::entities::sheet::Cell;

/// How a raw extract cell turns into a metric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueParser {
    Percentage,
    Number,
}

impl ValueParser {
    /// `None` means the cell was empty or could not be read as a number.
    pub fn parse(self, cell: &Cell) -> Option<f64> {
        match self {
            ValueParser::Percentage => parse_percentage(cell),
            ValueParser::Number => parse_number(cell),
        }
    }
}

/// Spreadsheet-native percentages arrive as fractions (`0.1234`), while
/// pre-formatted extracts carry text such as `12,34%`.
pub fn parse_percentage(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Empty => None,
        Cell::Number(v) | Cell::NumberText { value: v, .. } if v.is_finite() => {
            Some(round_to(v * 100.0, 1))
        }
        Cell::Number(_) | Cell::NumberText { .. } => None,
        Cell::Text(raw) => {
            let trimmed = raw.trim();
            let trimmed = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed
                .replace(',', ".")
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(|v| round_to(v, 1))
        }
    }
}

pub fn parse_number(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Empty => None,
        Cell::Number(v) | Cell::NumberText { value: v, .. } if v.is_finite() => {
            Some(round_to(*v, 0))
        }
        Cell::Number(_) | Cell::NumberText { .. } => None,
        Cell::Text(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed
                .replace(',', "")
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(|v| round_to(v, 0))
        }
    }
}

pub fn format_percentage(value: f64) -> String {
    format!("{value:.1}%")
}

pub fn format_magnitude(value: f64) -> String {
    let whole = round_to(value, 0) as i64;
    let digits = whole.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if whole < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}
