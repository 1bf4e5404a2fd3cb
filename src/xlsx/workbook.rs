//! In-memory workbook model.
//!
//! A [`Workbook`] is built incrementally during conversion and serialized
//! exactly once by [`super::writer`]. Sheet names are sanitized to Excel's
//! rules on insertion and kept unique within the workbook.

use crate::model::{CellValue, TableRow};

/// Maximum sheet name length allowed by Excel.
const MAX_SHEET_NAME_LEN: usize = 31;

/// Characters Excel forbids in sheet names.
const FORBIDDEN_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

/// An in-memory workbook: ordered, uniquely named sheets.
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    /// Create a new empty workbook.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sheet with the given (raw) name and return a mutable
    /// reference to it.
    ///
    /// The name is sanitized and made unique with a numeric suffix if a
    /// sheet with the same name already exists.
    pub fn add_sheet(&mut self, name: &str) -> &mut Sheet {
        let name = self.unique_name(&sanitize_sheet_name(name));
        self.sheets.push(Sheet::new(name));
        self.sheets.last_mut().expect("sheet just pushed")
    }

    /// Sheets in insertion order.
    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    /// Number of sheets.
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Check if the workbook has no sheets.
    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    /// Look up a sheet by name.
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    fn unique_name(&self, base: &str) -> String {
        let exists = |candidate: &str| self.sheets.iter().any(|s| s.name == candidate);

        if !exists(base) {
            return base.to_string();
        }

        for i in 2.. {
            let suffix = format!("_{}", i);
            let mut candidate = base.to_string();
            candidate.truncate(MAX_SHEET_NAME_LEN.saturating_sub(suffix.len()));
            candidate.push_str(&suffix);
            if !exists(&candidate) {
                return candidate;
            }
        }
        unreachable!()
    }
}

/// A single worksheet: an ordered sequence of rows.
#[derive(Debug, Clone)]
pub struct Sheet {
    /// Sanitized, workbook-unique sheet name
    pub name: String,
    /// Rows in output order
    pub rows: Vec<TableRow>,
}

impl Sheet {
    fn new(name: String) -> Self {
        Self {
            name,
            rows: Vec::new(),
        }
    }

    /// Append a row of cells.
    pub fn push_row(&mut self, cells: Vec<CellValue>) {
        self.rows.push(TableRow::new(cells));
    }

    /// Append a row containing a single text cell in column A.
    pub fn push_text_row(&mut self, text: impl Into<String>) {
        self.rows.push(TableRow::new(vec![CellValue::text(text)]));
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Check if the sheet has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Sanitize a raw name into a valid Excel sheet name.
///
/// Forbidden characters become underscores, the result is truncated to 31
/// characters, and an empty result falls back to "Sheet".
pub fn sanitize_sheet_name(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| {
            if FORBIDDEN_CHARS.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    // Excel rejects names that start or end with an apostrophe
    while out.starts_with('\'') {
        out.remove(0);
    }
    while out.ends_with('\'') {
        out.pop();
    }

    if out.trim().is_empty() {
        return "Sheet".to_string();
    }

    if out.chars().count() > MAX_SHEET_NAME_LEN {
        out = out.chars().take(MAX_SHEET_NAME_LEN).collect();
    }
    out
}
