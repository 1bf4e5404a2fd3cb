//! Table and cell value types.

use serde::{Deserialize, Serialize};

/// A typed cell value as it will appear in the output workbook.
///
/// Excel stores numbers and booleans natively; everything else is
/// written as an inline string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CellValue {
    /// An empty cell (padding for ragged rows)
    Empty,
    /// Text content
    Text(String),
    /// Numeric content
    Number(f64),
    /// Boolean content
    Bool(bool),
}

impl CellValue {
    /// Create a text cell. Empty or whitespace-only input becomes `Empty`.
    pub fn text(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.trim().is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(text)
        }
    }

    /// Create a cell from raw text, detecting numeric and boolean content.
    pub fn detect(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return CellValue::Empty;
        }
        match trimmed {
            "TRUE" | "true" => return CellValue::Bool(true),
            "FALSE" | "false" => return CellValue::Bool(false),
            _ => {}
        }
        if let Ok(n) = trimmed.parse::<f64>() {
            if n.is_finite() {
                return CellValue::Number(n);
            }
        }
        CellValue::Text(text.to_string())
    }

    /// Check if the cell is empty.
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Get a plain-text rendering of the value.
    pub fn plain_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => format_number(*n),
            CellValue::Bool(b) => b.to_string(),
        }
    }
}

/// Format a number the way it will be written into the worksheet XML.
///
/// Integers are written without a trailing ".0" so the output matches
/// what the source document displayed.
pub(crate) fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// A table row: an ordered sequence of cell values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    /// Cells in the row
    pub cells: Vec<CellValue>,
}

impl TableRow {
    /// Create a new row with cells.
    pub fn new(cells: Vec<CellValue>) -> Self {
        Self { cells }
    }

    /// Create a row from text values.
    pub fn from_strings<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        Self::new(values.into_iter().map(CellValue::text).collect())
    }

    /// Number of cells in the row.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Check if the row has no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Pad the row with empty cells up to `width` columns.
    pub fn pad_to(&mut self, width: usize) {
        while self.cells.len() < width {
            self.cells.push(CellValue::Empty);
        }
    }

    /// Get plain text representation (tab-separated).
    pub fn plain_text(&self) -> String {
        self.cells
            .iter()
            .map(|c| c.plain_text())
            .collect::<Vec<_>>()
            .join("\t")
    }
}

/// A table extracted from a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Rows in page order
    pub rows: Vec<TableRow>,
}

impl Table {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    /// Add a row to the table.
    pub fn add_row(&mut self, row: TableRow) {
        self.rows.push(row);
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns (widest row).
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(|r| r.len()).max().unwrap_or(0)
    }

    /// Check if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Pad every row with empty cells to the table's column count.
    ///
    /// Ragged source rows are padded, never truncated.
    pub fn normalize(&mut self) {
        let width = self.column_count();
        for row in &mut self.rows {
            row.pad_to(width);
        }
    }

    /// Get plain text representation of the table.
    pub fn plain_text(&self) -> String {
        self.rows
            .iter()
            .map(|row| row.plain_text())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for Table {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_value_detect() {
        assert_eq!(CellValue::detect("42"), CellValue::Number(42.0));
        assert_eq!(CellValue::detect(" 3.25 "), CellValue::Number(3.25));
        assert_eq!(CellValue::detect("-17"), CellValue::Number(-17.0));
        assert_eq!(CellValue::detect("true"), CellValue::Bool(true));
        assert_eq!(CellValue::detect(""), CellValue::Empty);
        assert_eq!(
            CellValue::detect("Alice"),
            CellValue::Text("Alice".to_string())
        );
        // NaN/inf must not become numeric cells
        assert!(matches!(CellValue::detect("NaN"), CellValue::Text(_)));
        assert!(matches!(CellValue::detect("inf"), CellValue::Text(_)));
    }

    #[test]
    fn test_cell_plain_text() {
        assert_eq!(CellValue::Number(30.0).plain_text(), "30");
        assert_eq!(CellValue::Number(2.5).plain_text(), "2.5");
        assert_eq!(CellValue::text("Bob").plain_text(), "Bob");
        assert_eq!(CellValue::Empty.plain_text(), "");
    }

    #[test]
    fn test_table_with_data() {
        let mut table = Table::new();
        table.add_row(TableRow::from_strings(["Name", "Age"]));
        table.add_row(TableRow::from_strings(["Alice", "30"]));
        table.add_row(TableRow::from_strings(["Bob", "25"]));

        assert_eq!(table.row_count(), 3);
        assert_eq!(table.column_count(), 2);
        assert!(!table.is_empty());
    }

    #[test]
    fn test_table_normalize_pads_ragged_rows() {
        let mut table = Table::new();
        table.add_row(TableRow::from_strings(["a", "b", "c"]));
        table.add_row(TableRow::from_strings(["d"]));
        table.normalize();

        assert_eq!(table.column_count(), 3);
        assert_eq!(table.rows[1].len(), 3);
        assert!(table.rows[1].cells[1].is_empty());
        assert!(table.rows[1].cells[2].is_empty());
    }

    #[test]
    fn test_row_plain_text() {
        let row = TableRow::from_strings(["x", "y"]);
        assert_eq!(row.plain_text(), "x\ty");
    }
}
