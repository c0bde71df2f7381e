use std::path::PathBuf;

/// A cell value as read from an extract, independent of the file format.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    /// A text field that also reads as a plain number. Keys keep `raw`.
    NumberText { value: f64, raw: String },
    Text(String),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    /// Text used for keys and header names.
    pub fn as_key(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(v) | Cell::NumberText { raw: v, .. } => {
                let trimmed = v.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            Cell::Number(v) => Some(format_f64(*v)),
        }
    }
}

pub fn format_f64(value: f64) -> String {
    if !value.is_finite() {
        return String::new();
    }
    if (value.fract()).abs() < f64::EPSILON {
        format!("{}", value as i64)
    } else {
        let mut text = format!("{value:.6}");
        while text.ends_with('0') {
            text.pop();
        }
        if text.ends_with('.') {
            text.pop();
        }
        text
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetTable {
    pub name: String,
    pub rows: Vec<Vec<Cell>>,
}

impl SheetTable {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    /// Header names of the row that follows `row_skip` leading rows.
    pub fn header(&self, row_skip: usize) -> Vec<String> {
        self.rows
            .get(row_skip)
            .map(|row| {
                row.iter()
                    .map(|cell| cell.as_key().unwrap_or_default())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn column_index(&self, row_skip: usize, column: &str) -> Option<usize> {
        let wanted = column.trim();
        self.header(row_skip).iter().position(|name| name == wanted)
    }
}

/// Every sheet of one extract file, fully buffered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractBook {
    pub source_path: PathBuf,
    pub sheets: Vec<SheetTable>,
}

impl ExtractBook {
    pub fn new(source_path: impl Into<PathBuf>, sheets: Vec<SheetTable>) -> Self {
        Self {
            source_path: source_path.into(),
            sheets,
        }
    }

    pub fn sheet(&self, name: &str) -> Option<&SheetTable> {
        self.sheets.iter().find(|sheet| sheet.name == name)
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|sheet| sheet.name.as_str()).collect()
    }
}
