//! Document-to-workbook conversion.
//!
//! Maps the parsed intermediate model onto an XLSX workbook: body text
//! goes into a single text sheet (one row per line) and each detected
//! table gets its own sheet named after the page and table index.
//!
//! # Example
//!
//! ```no_run
//! use pdf2xls::convert::{Converter, ConvertOptions};
//!
//! fn main() -> pdf2xls::Result<()> {
//!     let summary = Converter::new().convert_file("report.pdf", "report.xlsx")?;
//!     println!("{} sheet(s), {} table(s)", summary.sheets, summary.tables);
//!     Ok(())
//! }
//! ```

use std::path::Path;

use crate::error::Result;
use crate::model::{CellValue, Document, Table};
use crate::parser::{ParseOptions, PdfParser};
use crate::xlsx::{self, Workbook};

/// Default name for the body-text sheet.
pub const DEFAULT_TEXT_SHEET: &str = "Text_Body";

/// Options for converting a document into a workbook.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Parsing options (page selection, crop bands, table detection)
    pub parse: ParseOptions,

    /// Name of the sheet holding body text
    pub text_sheet: String,

    /// Insert a "Page N" marker row before each page's text
    pub page_labels: bool,

    /// Convert numeric- and boolean-looking table cells to typed cells
    pub detect_numbers: bool,
}

impl ConvertOptions {
    /// Create new conversion options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set parsing options.
    pub fn with_parse_options(mut self, parse: ParseOptions) -> Self {
        self.parse = parse;
        self
    }

    /// Set the name of the body-text sheet.
    pub fn with_text_sheet(mut self, name: impl Into<String>) -> Self {
        self.text_sheet = name.into();
        self
    }

    /// Enable or disable per-page marker rows in the text sheet.
    pub fn with_page_labels(mut self, enabled: bool) -> Self {
        self.page_labels = enabled;
        self
    }

    /// Enable or disable numeric cell detection in tables.
    pub fn with_number_detection(mut self, enabled: bool) -> Self {
        self.detect_numbers = enabled;
        self
    }
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            parse: ParseOptions::default(),
            text_sheet: DEFAULT_TEXT_SHEET.to_string(),
            page_labels: false,
            detect_numbers: true,
        }
    }
}

/// Summary of a completed conversion.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConvertSummary {
    /// Pages parsed from the source document
    pub pages: u32,

    /// Tables written to their own sheets
    pub tables: usize,

    /// Sheets in the output workbook
    pub sheets: usize,

    /// Total rows written across all sheets
    pub rows: usize,
}

/// Converts PDF documents into XLSX workbooks.
pub struct Converter {
    options: ConvertOptions,
}

impl Converter {
    /// Create a converter with default options.
    pub fn new() -> Self {
        Self {
            options: ConvertOptions::default(),
        }
    }

    /// Create a converter with custom options.
    pub fn with_options(options: ConvertOptions) -> Self {
        Self { options }
    }

    /// Convert a PDF file into an XLSX file.
    ///
    /// The output is written atomically: on error the destination is left
    /// untouched.
    pub fn convert_file<P, Q>(&self, input: P, output: Q) -> Result<ConvertSummary>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let parser = PdfParser::open_with_options(input.as_ref(), self.options.parse.clone())?;
        let document = parser.parse()?;
        self.write_document(&document, output.as_ref())
    }

    /// Convert an in-memory PDF into an XLSX file.
    pub fn convert_bytes<Q: AsRef<Path>>(&self, data: &[u8], output: Q) -> Result<ConvertSummary> {
        let parser = PdfParser::from_bytes_with_options(data, self.options.parse.clone())?;
        let document = parser.parse()?;
        self.write_document(&document, output.as_ref())
    }

    /// Map a parsed document onto an in-memory workbook.
    ///
    /// The body-text sheet comes first and is omitted entirely when the
    /// document has no body text, so a table-only document puts its first
    /// table in the first sheet. A document with no content at all still
    /// yields one (empty) text sheet, since a workbook must have at least
    /// one sheet.
    pub fn build_workbook(&self, document: &Document) -> Workbook {
        let mut workbook = Workbook::new();

        let mut text_rows: Vec<String> = Vec::new();
        for page in &document.pages {
            let lines: Vec<&str> = page.text_lines().collect();
            if lines.is_empty() {
                continue;
            }
            if self.options.page_labels {
                text_rows.push(format!("Page {}", page.number));
            }
            text_rows.extend(lines.iter().map(|l| l.to_string()));
        }

        if !text_rows.is_empty() {
            let sheet = workbook.add_sheet(&self.options.text_sheet);
            for line in text_rows {
                sheet.push_text_row(line);
            }
        }

        for page in &document.pages {
            for (idx, table) in page.tables().enumerate() {
                let name = format!("Table_Page_{}_{}", page.number, idx + 1);
                let sheet = workbook.add_sheet(&name);
                self.write_table(sheet, table);
            }
        }

        if workbook.is_empty() {
            workbook.add_sheet(&self.options.text_sheet);
        }

        workbook
    }

    fn write_table(&self, sheet: &mut xlsx::Sheet, table: &Table) {
        for row in &table.rows {
            let cells = row
                .cells
                .iter()
                .map(|cell| match cell {
                    CellValue::Text(s) if self.options.detect_numbers => CellValue::detect(s),
                    other => other.clone(),
                })
                .collect();
            sheet.push_row(cells);
        }
    }

    fn write_document(&self, document: &Document, output: &Path) -> Result<ConvertSummary> {
        let workbook = self.build_workbook(document);
        xlsx::save(&workbook, Some(&document.metadata), output)?;

        let summary = ConvertSummary {
            pages: document.page_count(),
            tables: document.table_count(),
            sheets: workbook.sheet_count(),
            rows: workbook.sheets().iter().map(|s| s.row_count()).sum(),
        };
        log::info!(
            "converted {} page(s) into {} sheet(s) ({} table(s), {} row(s))",
            summary.pages,
            summary.sheets,
            summary.tables,
            summary.rows
        );
        Ok(summary)
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new()
    }
}
