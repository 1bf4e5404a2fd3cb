//! TOML configuration file support.
//!
//! A configuration file can set the same knobs as the conversion options;
//! values given on the command line take precedence over the file.
//!
//! ```toml
//! [pages]
//! range = "2-10"
//!
//! [layout]
//! header_mm = 15.0
//! footer_mm = 10.0
//!
//! [workbook]
//! text_sheet = "Body"
//! page_labels = true
//! detect_numbers = false
//! detect_tables = true
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::convert::ConvertOptions;
use crate::error::Result;
use crate::parser::PageSelection;

/// Configuration loaded from a TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Page selection
    #[serde(default)]
    pub pages: PagesConfig,

    /// Header and footer crop bands
    #[serde(default)]
    pub layout: LayoutConfig,

    /// Workbook output shape
    #[serde(default)]
    pub workbook: WorkbookConfig,
}

/// `[pages]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PagesConfig {
    /// Page selection string, e.g. "all", "1-10", "1,3,5-7"
    pub range: Option<String>,
}

/// `[layout]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayoutConfig {
    /// Header band to ignore, in millimeters
    pub header_mm: Option<f32>,

    /// Footer band to ignore, in millimeters
    pub footer_mm: Option<f32>,
}

/// `[workbook]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkbookConfig {
    /// Name of the body-text sheet
    pub text_sheet: Option<String>,

    /// Insert "Page N" marker rows in the text sheet
    pub page_labels: Option<bool>,

    /// Convert numeric-looking table cells to typed cells
    pub detect_numbers: Option<bool>,

    /// Run table detection
    pub detect_tables: Option<bool>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply this configuration on top of the given options.
    ///
    /// Only fields present in the file are changed, so callers can apply
    /// command-line overrides afterwards.
    pub fn apply(&self, mut options: ConvertOptions) -> Result<ConvertOptions> {
        if let Some(ref range) = self.pages.range {
            options.parse.pages = PageSelection::parse(range)?;
        }
        if let Some(mm) = self.layout.header_mm {
            options.parse.header_mm = mm;
        }
        if let Some(mm) = self.layout.footer_mm {
            options.parse.footer_mm = mm;
        }
        if let Some(detect) = self.workbook.detect_tables {
            options.parse.detect_tables = detect;
        }
        if let Some(ref name) = self.workbook.text_sheet {
            options.text_sheet = name.clone();
        }
        if let Some(labels) = self.workbook.page_labels {
            options.page_labels = labels;
        }
        if let Some(numbers) = self.workbook.detect_numbers {
            options.detect_numbers = numbers;
        }
        Ok(options)
    }
}
