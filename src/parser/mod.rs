//! PDF parsing module.

mod backend;
mod layout;
mod options;
mod pdf_parser;
mod table_detector;

pub use backend::{decode_text_simple, ContentOp, LopdfBackend, PageId, PdfBackend, PdfValue};
pub use layout::{group_into_lines, spans_from_ops, TextLine, TextSpan};
pub use options::{mm_to_points, ErrorMode, PageSelection, ParseOptions, POINTS_PER_MM};
pub use pdf_parser::PdfParser;
pub use table_detector::{DetectedTable, TableDetector, TableDetectorConfig};
