//! Page-level types.

use super::Table;
use serde::{Deserialize, Serialize};

/// A single page in the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// Page number (1-indexed)
    pub number: u32,

    /// Page width in points (1 point = 1/72 inch)
    pub width: f32,

    /// Page height in points
    pub height: f32,

    /// Content blocks on the page, in reading order
    pub blocks: Vec<Block>,
}

impl Page {
    /// Create a new page with the given dimensions.
    pub fn new(number: u32, width: f32, height: f32) -> Self {
        Self {
            number,
            width,
            height,
            blocks: Vec::new(),
        }
    }

    /// Add a text block to the page.
    pub fn add_text(&mut self, text: TextBlock) {
        if !text.is_empty() {
            self.blocks.push(Block::Text(text));
        }
    }

    /// Add a table to the page.
    pub fn add_table(&mut self, table: Table) {
        if !table.is_empty() {
            self.blocks.push(Block::Table(table));
        }
    }

    /// Body text lines on this page (excluding table content), in order.
    pub fn text_lines(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().flat_map(|block| match block {
            Block::Text(t) => t.lines.iter().map(|s| s.as_str()).collect::<Vec<_>>(),
            Block::Table(_) => Vec::new(),
        })
    }

    /// Tables on this page, in order.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.blocks.iter().filter_map(|block| match block {
            Block::Table(t) => Some(t),
            Block::Text(_) => None,
        })
    }

    /// Get plain text content of the page.
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(|block| match block {
                Block::Text(t) => t.lines.join("\n"),
                Block::Table(t) => t.plain_text(),
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Check if the page has no content blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Check if the page is in landscape orientation.
    pub fn is_landscape(&self) -> bool {
        self.width > self.height
    }
}

/// A content block on a page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// A run of body text lines
    Text(TextBlock),

    /// A detected table
    Table(Table),
}

impl Block {
    /// Check if this block is a table.
    pub fn is_table(&self) -> bool {
        matches!(self, Block::Table(_))
    }
}

/// A run of consecutive body text lines.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextBlock {
    /// Lines in top-to-bottom order
    pub lines: Vec<String>,
}

impl TextBlock {
    /// Create a text block from lines.
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    /// Check if the block has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TableRow;

    #[test]
    fn test_page_new() {
        let page = Page::new(1, 612.0, 792.0);
        assert_eq!(page.number, 1);
        assert!(page.is_empty());
        assert!(!page.is_landscape());
    }

    #[test]
    fn test_page_text_and_tables() {
        let mut page = Page::new(1, 612.0, 792.0);
        page.add_text(TextBlock::new(vec!["intro".into(), "more".into()]));

        let mut table = Table::new();
        table.add_row(TableRow::from_strings(["a", "b"]));
        page.add_table(table);

        let lines: Vec<&str> = page.text_lines().collect();
        assert_eq!(lines, vec!["intro", "more"]);
        assert_eq!(page.tables().count(), 1);
    }

    #[test]
    fn test_empty_blocks_are_dropped() {
        let mut page = Page::new(1, 612.0, 792.0);
        page.add_text(TextBlock::default());
        page.add_table(Table::new());
        assert!(page.is_empty());
    }
}
