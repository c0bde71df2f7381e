use std::collections::HashSet;
use std::path::Path;

use rust_xlsxwriter::{
    Color, ConditionalFormatCell, ConditionalFormatCellRule, Format, FormatAlign, FormatBorder,
    FormatPattern, Workbook, Worksheet, XlsxError,
};
use tracing::info;

use crate::domain::entities::metric::{Metric, MetricKind};
use crate::domain::entities::table::{DisplayTable, RowOrigin};
use crate::error::ReportError;
use crate::usecase::ports::export::{ReportSheet, ReportWriter};

const MAX_SHEET_NAME: usize = 31;
const KEY_COLUMN_WIDTH: f64 = 28.0;
const METRIC_COLUMN_WIDTH: f64 = 16.0;

fn export_error(err: XlsxError) -> ReportError {
    ReportError::Export(err.to_string())
}

/// Excel sheet names are limited to 31 characters and a few forbidden symbols.
pub fn sheet_name(label: &str) -> String {
    let cleaned: String = label
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
            other => other,
        })
        .take(MAX_SHEET_NAME)
        .collect();
    let cleaned = cleaned.trim_matches('\'').trim().to_string();
    if cleaned.is_empty() {
        "Report".to_string()
    } else {
        cleaned
    }
}

/// Sheet names compare case-insensitively, so colliding labels get a
/// ` (n)` suffix that still fits the length limit.
fn unique_sheet_name(label: &str, used: &mut HashSet<String>) -> String {
    let base = sheet_name(label);
    let mut name = base.clone();
    let mut n = 2;
    while used.contains(&name.to_lowercase()) {
        let suffix = format!(" ({n})");
        let keep = MAX_SHEET_NAME.saturating_sub(suffix.chars().count());
        let stem: String = base.chars().take(keep).collect();
        name = format!("{}{suffix}", stem.trim_end());
        n += 1;
    }
    used.insert(name.to_lowercase());
    name
}

struct Styles {
    header: Format,
    key: Format,
    others_key: Format,
    magnitude: Format,
    percentage: Format,
    others_magnitude: Format,
    others_percentage: Format,
    positive: Format,
    negative: Format,
}

impl Styles {
    fn new() -> Self {
        let header = Format::new()
            .set_bold()
            .set_font_color(Color::White)
            .set_background_color(Color::RGB(0x1F4E78))
            .set_pattern(FormatPattern::Solid)
            .set_align(FormatAlign::Center)
            .set_border(FormatBorder::Thin);
        let key = Format::new()
            .set_bold()
            .set_font_color(Color::RGB(0x1F4E78))
            .set_background_color(Color::RGB(0xDDEBF7))
            .set_pattern(FormatPattern::Solid)
            .set_border(FormatBorder::Thin);
        let magnitude = Format::new()
            .set_num_format("#,##0")
            .set_border(FormatBorder::Thin);
        let percentage = Format::new()
            .set_num_format("0.0\"%\"")
            .set_border(FormatBorder::Thin);

        Self {
            others_key: key.clone().set_italic(),
            others_magnitude: magnitude.clone().set_bold(),
            others_percentage: percentage.clone().set_bold(),
            header,
            key,
            magnitude,
            percentage,
            positive: Format::new().set_font_color(Color::RGB(0x006100)),
            negative: Format::new().set_font_color(Color::RGB(0x9C0006)),
        }
    }
}

fn write_table(
    worksheet: &mut Worksheet,
    table: &DisplayTable,
    styles: &Styles,
) -> Result<(), XlsxError> {
    for (col, name) in DisplayTable::columns().into_iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, name, &styles.header)?;
    }

    for (idx, row) in table.rows.iter().enumerate() {
        let row_num = idx as u32 + 1;
        let is_others = row.origin == RowOrigin::Others;
        let key_format = if is_others {
            &styles.others_key
        } else {
            &styles.key
        };
        worksheet.write_string_with_format(row_num, 0, &row.record.product_key, key_format)?;

        for (metric, value) in row.record.values() {
            let format = match (metric.kind(), is_others) {
                (MetricKind::Magnitude, false) => &styles.magnitude,
                (MetricKind::Magnitude, true) => &styles.others_magnitude,
                (MetricKind::Percentage, false) => &styles.percentage,
                (MetricKind::Percentage, true) => &styles.others_percentage,
            };
            worksheet.write_number_with_format(row_num, metric_column(metric), value, format)?;
        }
    }

    let last_row = table.rows.len() as u32;
    if last_row > 0 {
        for metric in Metric::ALL {
            if metric.kind() != MetricKind::Percentage {
                continue;
            }
            let col = metric_column(metric);
            let non_negative = ConditionalFormatCell::new()
                .set_rule(ConditionalFormatCellRule::GreaterThanOrEqualTo(0))
                .set_format(styles.positive.clone());
            let negative = ConditionalFormatCell::new()
                .set_rule(ConditionalFormatCellRule::LessThan(0))
                .set_format(styles.negative.clone());
            worksheet.add_conditional_format(1, col, last_row, col, &non_negative)?;
            worksheet.add_conditional_format(1, col, last_row, col, &negative)?;
        }
    }

    worksheet.set_column_width(0, KEY_COLUMN_WIDTH)?;
    for metric in Metric::ALL {
        worksheet.set_column_width(metric_column(metric), METRIC_COLUMN_WIDTH)?;
    }
    worksheet.set_freeze_panes(1, 1)?;
    Ok(())
}

fn metric_column(metric: Metric) -> u16 {
    metric.position() as u16 + 1
}

pub fn build_workbook(sheets: &[ReportSheet]) -> Result<Workbook, ReportError> {
    let styles = Styles::new();
    let mut workbook = Workbook::new();
    let mut used = HashSet::new();

    for sheet in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(unique_sheet_name(&sheet.name, &mut used))
            .map_err(export_error)?;
        write_table(worksheet, &sheet.table, &styles).map_err(export_error)?;
    }
    Ok(workbook)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct XlsxReportWriter;

impl ReportWriter for XlsxReportWriter {
    fn write(&self, sheets: &[ReportSheet], path: &Path) -> Result<(), ReportError> {
        let mut workbook = build_workbook(sheets)?;
        workbook.save(path).map_err(export_error)?;
        info!(path = %path.display(), sheets = sheets.len(), "report exported");
        Ok(())
    }
}
