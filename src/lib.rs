//! # pdf2xls
//!
//! PDF-to-spreadsheet conversion library for Rust.
//!
//! This library extracts text and tables from PDF documents and writes
//! them into XLSX workbooks: body text goes into a text sheet, and each
//! detected table gets a sheet of its own.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdf2xls::convert_file;
//!
//! fn main() -> pdf2xls::Result<()> {
//!     let summary = convert_file("report.pdf", "report.xlsx")?;
//!     println!("wrote {} sheet(s)", summary.sheets);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Table detection**: stream-mode detection from text alignment,
//!   no ruling lines required
//! - **Typed cells**: numeric and boolean table cells are written as
//!   native spreadsheet values
//! - **Layout cropping**: header and footer bands can be excluded by
//!   height in millimeters
//! - **Page selection**: convert all pages, a range, or a list
//! - **Atomic output**: a failed conversion never corrupts an existing
//!   destination file

pub mod config;
pub mod convert;
pub mod detect;
pub mod error;
pub mod model;
pub mod parser;
pub mod xlsx;

// Re-export commonly used types
pub use config::Config;
pub use convert::{ConvertOptions, ConvertSummary, Converter, DEFAULT_TEXT_SHEET};
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_pdf, PdfFormat};
pub use error::{Error, Result};
pub use model::{Block, CellValue, Document, Metadata, Page, Table, TableRow, TextBlock};
pub use parser::{ErrorMode, PageSelection, ParseOptions, PdfParser, TableDetectorConfig};
pub use xlsx::Workbook;

use std::io::Read;
use std::path::Path;

/// Convert a PDF file into an XLSX file with default options.
///
/// # Example
///
/// ```no_run
/// use pdf2xls::convert_file;
///
/// let summary = convert_file("report.pdf", "report.xlsx").unwrap();
/// println!("{} table(s)", summary.tables);
/// ```
pub fn convert_file<P, Q>(input: P, output: Q) -> Result<ConvertSummary>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    Converter::new().convert_file(input, output)
}

/// Convert a PDF file into an XLSX file with custom options.
///
/// # Example
///
/// ```no_run
/// use pdf2xls::{convert_file_with_options, ConvertOptions, ParseOptions};
///
/// let options = ConvertOptions::new()
///     .with_parse_options(ParseOptions::new().with_header_mm(15.0))
///     .with_page_labels(true);
/// convert_file_with_options("report.pdf", "report.xlsx", options).unwrap();
/// ```
pub fn convert_file_with_options<P, Q>(
    input: P,
    output: Q,
    options: ConvertOptions,
) -> Result<ConvertSummary>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    Converter::with_options(options).convert_file(input, output)
}

/// Parse a PDF file into the intermediate document model.
///
/// # Example
///
/// ```no_run
/// use pdf2xls::parse_file;
///
/// let doc = parse_file("report.pdf").unwrap();
/// println!("Pages: {}", doc.page_count());
/// ```
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    let parser = PdfParser::open(path)?;
    parser.parse()
}

/// Parse a PDF file with custom options.
pub fn parse_file_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Document> {
    let parser = PdfParser::open_with_options(path, options)?;
    parser.parse()
}

/// Parse a PDF from bytes.
pub fn parse_bytes(data: &[u8]) -> Result<Document> {
    let parser = PdfParser::from_bytes(data)?;
    parser.parse()
}

/// Parse a PDF from bytes with custom options.
pub fn parse_bytes_with_options(data: &[u8], options: ParseOptions) -> Result<Document> {
    let parser = PdfParser::from_bytes_with_options(data, options)?;
    parser.parse()
}

/// Parse a PDF from a reader.
pub fn parse_reader<R: Read>(reader: R) -> Result<Document> {
    let parser = PdfParser::from_reader(reader)?;
    parser.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_missing_file() {
        assert!(parse_file("/nonexistent/input.pdf").is_err());
    }

    #[test]
    fn test_convert_missing_file_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.xlsx");
        assert!(convert_file("/nonexistent/input.pdf", &output).is_err());
        assert!(!output.exists());
    }

    #[test]
    fn test_parse_bytes_rejects_non_pdf() {
        assert!(matches!(
            parse_bytes(b"definitely not a pdf"),
            Err(Error::UnknownFormat)
        ));
    }
}
