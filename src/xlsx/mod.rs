//! Workbook model and XLSX serialization.

mod workbook;
mod writer;

pub use workbook::{sanitize_sheet_name, Sheet, Workbook};
pub use writer::{column_name, save, write_to};
