//! PDF document parser built on the lopdf backend.

use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use lopdf::Object;

use crate::detect::detect_format_from_path;
use crate::error::{Error, Result};
use crate::model::{Document, Metadata, Page, TextBlock};

use super::backend::{decode_text_simple, LopdfBackend, PageId, PdfBackend};
use super::layout::{self, TextLine};
use super::options::{mm_to_points, ErrorMode, PageSelection, ParseOptions};
use super::table_detector::TableDetector;

/// PDF document parser.
pub struct PdfParser {
    backend: LopdfBackend,
    options: ParseOptions,
}

impl PdfParser {
    /// Open a PDF file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, ParseOptions::default())
    }

    /// Open a PDF file with custom options.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Self> {
        let path = path.as_ref();

        // Cheap header check before handing the file to lopdf
        detect_format_from_path(path)?;

        let backend = LopdfBackend::load_file(path)?;
        Ok(Self { backend, options })
    }

    /// Parse a PDF from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_bytes_with_options(data, ParseOptions::default())
    }

    /// Parse a PDF from bytes with custom options.
    pub fn from_bytes_with_options(data: &[u8], options: ParseOptions) -> Result<Self> {
        crate::detect::detect_format_from_bytes(data)?;
        let backend = LopdfBackend::load_bytes(data)?;
        Ok(Self { backend, options })
    }

    /// Parse a PDF from a reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::from_reader_with_options(reader, ParseOptions::default())
    }

    /// Parse a PDF from a reader with custom options.
    pub fn from_reader_with_options<R: Read>(mut reader: R, options: ParseOptions) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes_with_options(&data, options)
    }

    /// Parse the document into the intermediate model.
    pub fn parse(&self) -> Result<Document> {
        let mut document = Document::new();
        document.metadata = self.extract_metadata();

        let page_ids = self.backend.pages();
        let total_pages = page_ids.len() as u32;
        document.metadata.page_count = total_pages;

        self.validate_selection(total_pages)?;

        for (&page_num, &page_id) in page_ids.iter() {
            if !self.options.pages.includes(page_num) {
                continue;
            }

            match self.parse_page(page_num, page_id) {
                Ok(page) => document.add_page(page),
                Err(e) if self.options.error_mode == ErrorMode::Lenient => {
                    log::warn!("skipping page {}: {}", page_num, e);
                }
                Err(e) => return Err(e),
            }
        }

        Ok(document)
    }

    /// Fail early when the selection names pages the document does not have.
    fn validate_selection(&self, total_pages: u32) -> Result<()> {
        let out_of_range = match &self.options.pages {
            PageSelection::All => None,
            PageSelection::Range(start, end) => {
                if *start > total_pages {
                    Some(*start)
                } else if *end > total_pages {
                    Some(*end)
                } else {
                    None
                }
            }
            PageSelection::Pages(pages) => pages.iter().copied().find(|p| *p > total_pages),
        };

        match out_of_range {
            Some(page) if self.options.error_mode == ErrorMode::Strict => {
                Err(Error::PageOutOfRange(page, total_pages))
            }
            Some(page) => {
                log::warn!(
                    "page {} is out of range (document has {} pages), ignoring",
                    page,
                    total_pages
                );
                Ok(())
            }
            None => Ok(()),
        }
    }

    /// Parse a single page into the model.
    fn parse_page(&self, page_num: u32, page_id: PageId) -> Result<Page> {
        let (width, height) = self.backend.page_size(page_id)?;
        let mut page = Page::new(page_num, width, height);

        let spans = layout::extract_page_spans(&self.backend, page_id)?;
        let spans = self.crop_spans(spans, height);
        let lines = layout::group_into_lines(spans);
        if lines.is_empty() {
            return Ok(page);
        }

        let tables = if self.options.detect_tables {
            TableDetector::with_config(self.options.table_config.clone()).detect(&lines)
        } else {
            Vec::new()
        };

        // Interleave text runs and tables in reading order
        let mut cursor = 0;
        for detected in tables {
            if detected.start > cursor {
                page.add_text(text_block(&lines[cursor..detected.start]));
            }
            page.add_table(detected.table);
            cursor = detected.end;
        }
        if cursor < lines.len() {
            page.add_text(text_block(&lines[cursor..]));
        }

        Ok(page)
    }

    /// Drop spans whose baseline falls in the header or footer band.
    fn crop_spans(
        &self,
        spans: Vec<layout::TextSpan>,
        page_height: f32,
    ) -> Vec<layout::TextSpan> {
        let header = mm_to_points(self.options.header_mm);
        let footer = mm_to_points(self.options.footer_mm);
        if header <= 0.0 && footer <= 0.0 {
            return spans;
        }

        let top = page_height - header;
        spans
            .into_iter()
            .filter(|s| s.y <= top && s.y >= footer)
            .collect()
    }

    /// Extract document metadata from the trailer Info dictionary.
    fn extract_metadata(&self) -> Metadata {
        let mut meta = Metadata::with_version(self.backend.version());

        let doc = self.backend.raw_doc();
        let info = doc
            .trailer
            .get(b"Info")
            .ok()
            .and_then(|obj| match obj {
                Object::Reference(r) => doc.get_dictionary(*r).ok(),
                Object::Dictionary(d) => Some(d),
                _ => None,
            });

        if let Some(info) = info {
            meta.title = info_string(info, b"Title");
            meta.author = info_string(info, b"Author");
            meta.subject = info_string(info, b"Subject");
            meta.creator = info_string(info, b"Creator");
            meta.producer = info_string(info, b"Producer");
            meta.created = info_string(info, b"CreationDate")
                .as_deref()
                .and_then(parse_pdf_date);
            meta.modified = info_string(info, b"ModDate")
                .as_deref()
                .and_then(parse_pdf_date);
        }

        meta
    }
}

fn text_block(lines: &[TextLine]) -> TextBlock {
    TextBlock::new(
        lines
            .iter()
            .map(|l| l.text())
            .filter(|t| !t.trim().is_empty())
            .collect(),
    )
}

fn info_string(dict: &lopdf::Dictionary, key: &[u8]) -> Option<String> {
    match dict.get(key).ok()? {
        Object::String(bytes, _) => {
            let s = decode_text_simple(bytes);
            let s = s.trim();
            if s.is_empty() {
                None
            } else {
                Some(s.to_string())
            }
        }
        _ => None,
    }
}

/// Parse a PDF date string like `D:20240115093000+01'00'`.
///
/// Components after the year are optional; missing parts default to the
/// start of their period. Timezone offsets are ignored (treated as UTC).
fn parse_pdf_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.strip_prefix("D:").unwrap_or(s);
    let digits: String = s.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.len() < 4 {
        return None;
    }

    let field = |start: usize, len: usize, default: u32| -> u32 {
        digits
            .get(start..start + len)
            .and_then(|p| p.parse().ok())
            .unwrap_or(default)
    };

    let year: i32 = digits.get(0..4)?.parse().ok()?;
    let month = field(4, 2, 1).clamp(1, 12);
    let day = field(6, 2, 1).clamp(1, 31);
    let hour = field(8, 2, 0);
    let minute = field(10, 2, 0);
    let second = field(12, 2, 0);

    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let datetime: NaiveDateTime = date.and_hms_opt(hour, minute, second)?;
    Some(Utc.from_utc_datetime(&datetime))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pdf_date_full() {
        let dt = parse_pdf_date("D:20240115093000+01'00'").unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-01-15T09:30:00+00:00");
    }

    #[test]
    fn test_parse_pdf_date_partial() {
        let dt = parse_pdf_date("D:2024").unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-01-01T00:00:00+00:00");

        let dt = parse_pdf_date("20230615").unwrap();
        assert_eq!(dt.to_rfc3339(), "2023-06-15T00:00:00+00:00");
    }

    #[test]
    fn test_parse_pdf_date_invalid() {
        assert!(parse_pdf_date("").is_none());
        assert!(parse_pdf_date("D:").is_none());
        assert!(parse_pdf_date("not a date").is_none());
    }
}
