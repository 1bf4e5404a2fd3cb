//! Parsing options and configuration.

use crate::error::{Error, Result};

use super::table_detector::TableDetectorConfig;

/// Points per millimeter (1 mm = 2.83465 pt).
pub const POINTS_PER_MM: f32 = 2.83465;

/// Convert millimeters to points.
pub fn mm_to_points(mm: f32) -> f32 {
    mm * POINTS_PER_MM
}

/// Options for parsing PDF documents.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Error handling mode
    pub error_mode: ErrorMode,

    /// Page selection (which pages to parse, 1-based)
    pub pages: PageSelection,

    /// Height of the page header band to ignore, in millimeters
    pub header_mm: f32,

    /// Height of the page footer band to ignore, in millimeters
    pub footer_mm: f32,

    /// Whether to run table detection on each page
    pub detect_tables: bool,

    /// Table detection tuning
    pub table_config: TableDetectorConfig,
}

impl ParseOptions {
    /// Create new parse options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Enable lenient mode (skip pages that fail to parse).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.pages = pages;
        self
    }

    /// Set header height to ignore, in millimeters.
    pub fn with_header_mm(mut self, mm: f32) -> Self {
        self.header_mm = mm;
        self
    }

    /// Set footer height to ignore, in millimeters.
    pub fn with_footer_mm(mut self, mm: f32) -> Self {
        self.footer_mm = mm;
        self
    }

    /// Enable or disable table detection.
    pub fn with_tables(mut self, detect: bool) -> Self {
        self.detect_tables = detect;
        self
    }

    /// Set table detection tuning.
    pub fn with_table_config(mut self, config: TableDetectorConfig) -> Self {
        self.table_config = config;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Strict,
            pages: PageSelection::All,
            header_mm: 0.0,
            footer_mm: 0.0,
            detect_tables: true,
            table_config: TableDetectorConfig::default(),
        }
    }
}

/// Error handling mode during parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail on any error
    #[default]
    Strict,
    /// Skip pages with invalid content and continue
    Lenient,
}

/// Page selection (1-indexed).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PageSelection {
    /// All pages
    #[default]
    All,
    /// A range of pages (inclusive)
    Range(u32, u32),
    /// Specific pages, sorted ascending
    Pages(Vec<u32>),
}

impl PageSelection {
    /// Check if a page number should be included.
    pub fn includes(&self, page: u32) -> bool {
        match self {
            PageSelection::All => true,
            PageSelection::Range(start, end) => (*start..=*end).contains(&page),
            PageSelection::Pages(pages) => pages.contains(&page),
        }
    }

    /// Parse a page selection string (e.g., "all", "1-10", "1,3,5-7").
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();

        if s.is_empty() || s == "all" {
            return Ok(PageSelection::All);
        }

        // Simple range without commas, e.g. "1-10"
        if !s.contains(',') {
            if let Some((start, end)) = s.split_once('-') {
                let start = parse_page_num(start)?;
                let end = parse_page_num(end)?;
                if start == 0 || end < start {
                    return Err(Error::InvalidPageRange(s.to_string()));
                }
                return Ok(PageSelection::Range(start, end));
            }
            let page = parse_page_num(s)?;
            if page == 0 {
                return Err(Error::InvalidPageRange(s.to_string()));
            }
            return Ok(PageSelection::Pages(vec![page]));
        }

        // Comma-separated list with possible ranges
        let mut pages = Vec::new();
        for part in s.split(',') {
            let part = part.trim();
            if let Some((start, end)) = part.split_once('-') {
                let start = parse_page_num(start)?;
                let end = parse_page_num(end)?;
                if start == 0 || end < start {
                    return Err(Error::InvalidPageRange(s.to_string()));
                }
                for p in start..=end {
                    if !pages.contains(&p) {
                        pages.push(p);
                    }
                }
            } else {
                let p = parse_page_num(part)?;
                if p == 0 {
                    return Err(Error::InvalidPageRange(s.to_string()));
                }
                if !pages.contains(&p) {
                    pages.push(p);
                }
            }
        }

        pages.sort_unstable();
        Ok(PageSelection::Pages(pages))
    }
}

fn parse_page_num(s: &str) -> Result<u32> {
    s.trim()
        .parse()
        .map_err(|_| Error::InvalidPageRange(s.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mm_to_points() {
        assert!((mm_to_points(10.0) - 28.3465).abs() < 1e-4);
        assert_eq!(mm_to_points(0.0), 0.0);
    }

    #[test]
    fn test_parse_options_builder() {
        let options = ParseOptions::new()
            .lenient()
            .with_header_mm(15.0)
            .with_footer_mm(10.0)
            .with_tables(false);

        assert_eq!(options.error_mode, ErrorMode::Lenient);
        assert_eq!(options.header_mm, 15.0);
        assert_eq!(options.footer_mm, 10.0);
        assert!(!options.detect_tables);
    }

    #[test]
    fn test_page_selection_includes() {
        let all = PageSelection::All;
        assert!(all.includes(1));
        assert!(all.includes(100));

        let range = PageSelection::Range(5, 10);
        assert!(!range.includes(4));
        assert!(range.includes(5));
        assert!(range.includes(10));
        assert!(!range.includes(11));

        let pages = PageSelection::Pages(vec![1, 3, 5]);
        assert!(pages.includes(1));
        assert!(!pages.includes(2));
    }

    #[test]
    fn test_page_selection_parse() {
        assert_eq!(PageSelection::parse("all").unwrap(), PageSelection::All);
        assert_eq!(PageSelection::parse("").unwrap(), PageSelection::All);
        assert_eq!(
            PageSelection::parse("2-6").unwrap(),
            PageSelection::Range(2, 6)
        );
        assert_eq!(
            PageSelection::parse("1,3,5-7").unwrap(),
            PageSelection::Pages(vec![1, 3, 5, 6, 7])
        );
    }

    #[test]
    fn test_page_selection_parse_invalid() {
        assert!(PageSelection::parse("abc").is_err());
        assert!(PageSelection::parse("5-2").is_err());
        assert!(PageSelection::parse("0").is_err());
    }
}
