//! Document model types for extracted PDF content.
//!
//! This module defines the intermediate representation that bridges
//! PDF parsing and workbook building. A [`Document`] is read-only and
//! transient: parsed, mapped into a workbook, then discarded.

mod document;
mod page;
mod table;

pub use document::{Document, Metadata};
pub use page::{Block, Page, TextBlock};
pub use table::{CellValue, Table, TableRow};

pub(crate) use table::format_number;
