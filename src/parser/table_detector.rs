//! Table detection from text alignment (stream-mode).
//!
//! Detects tables without relying on ruling lines: lines that split into
//! multiple cells at horizontal gaps, stacked consecutively, are treated
//! as table rows. Cell start positions across the run are clustered into
//! column boundaries and each cell is assigned to its nearest column.

use crate::model::{CellValue, Table, TableRow};

use super::layout::TextLine;

/// Table detector configuration.
#[derive(Debug, Clone)]
pub struct TableDetectorConfig {
    /// Minimum number of consecutive multi-cell lines to form a table
    pub min_rows: usize,
    /// Minimum number of cells per line to count as a table row
    pub min_columns: usize,
    /// Maximum number of columns (above this, likely word-level splitting)
    pub max_columns: usize,
    /// Minimum horizontal gap between cells (points)
    pub min_column_gap: f32,
    /// Tolerance when clustering cell start positions into columns (points)
    pub column_tolerance: f32,
}

impl Default for TableDetectorConfig {
    fn default() -> Self {
        Self {
            min_rows: 2,
            min_columns: 2,
            max_columns: 24,
            min_column_gap: 12.0,
            column_tolerance: 8.0,
        }
    }
}

/// A detected table with the range of lines it consumed.
#[derive(Debug, Clone)]
pub struct DetectedTable {
    /// Index of the first consumed line
    pub start: usize,
    /// Index one past the last consumed line
    pub end: usize,
    /// The extracted table, rows in top-to-bottom order
    pub table: Table,
}

/// Detects tables in a page's text lines.
pub struct TableDetector {
    config: TableDetectorConfig,
}

impl TableDetector {
    /// Create a new table detector with default configuration.
    pub fn new() -> Self {
        Self {
            config: TableDetectorConfig::default(),
        }
    }

    /// Create a new table detector with custom configuration.
    pub fn with_config(config: TableDetectorConfig) -> Self {
        Self { config }
    }

    /// Detect tables in the given lines (top-to-bottom order).
    ///
    /// Returns detected tables sorted by their starting line index; lines
    /// inside the returned ranges belong to tables, all others are body text.
    pub fn detect(&self, lines: &[TextLine]) -> Vec<DetectedTable> {
        // Pre-split every line into cells once
        let cells_per_line: Vec<Vec<(f32, String)>> = lines
            .iter()
            .map(|line| line.cells(self.config.min_column_gap))
            .collect();

        let is_candidate = |idx: usize| {
            let n = cells_per_line[idx].len();
            n >= self.config.min_columns && n <= self.config.max_columns
        };

        let mut tables = Vec::new();
        let mut i = 0;
        while i < lines.len() {
            if !is_candidate(i) {
                i += 1;
                continue;
            }

            // Extend the run of consecutive candidate lines
            let start = i;
            while i < lines.len() && is_candidate(i) {
                i += 1;
            }
            let end = i;

            if end - start < self.config.min_rows {
                log::debug!(
                    "table candidate at lines {}..{} too short, keeping as text",
                    start,
                    end
                );
                continue;
            }

            let region = &cells_per_line[start..end];
            let columns = self.cluster_columns(region);
            if columns.len() < self.config.min_columns {
                continue;
            }

            let table = self.build_table(region, &columns);
            log::debug!(
                "detected table at lines {}..{}: {} rows x {} columns",
                start,
                end,
                table.row_count(),
                columns.len()
            );
            tables.push(DetectedTable { start, end, table });
        }

        tables
    }

    /// Cluster cell start positions across the region into column x positions.
    fn cluster_columns(&self, region: &[Vec<(f32, String)>]) -> Vec<f32> {
        let mut starts: Vec<f32> = region
            .iter()
            .flat_map(|cells| cells.iter().map(|(x, _)| *x))
            .collect();
        starts.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let mut columns: Vec<f32> = Vec::new();
        for x in starts {
            match columns.last() {
                Some(&last) if x - last <= self.config.column_tolerance => {}
                _ => columns.push(x),
            }
        }
        columns
    }

    /// Assign each cell to its nearest column and build the table.
    fn build_table(&self, region: &[Vec<(f32, String)>], columns: &[f32]) -> Table {
        let mut table = Table::new();

        for cells in region {
            let mut row = vec![CellValue::Empty; columns.len()];
            for (x, text) in cells {
                let col = nearest_column(columns, *x);
                if row[col].is_empty() {
                    row[col] = CellValue::text(text.clone());
                } else {
                    // Two cells collapsed onto one column: merge their text
                    let merged = format!("{} {}", row[col].plain_text(), text);
                    row[col] = CellValue::text(merged);
                }
            }
            table.add_row(TableRow::new(row));
        }

        table.normalize();
        table
    }
}

impl Default for TableDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// Index of the column whose x position is closest to `x`.
fn nearest_column(columns: &[f32], x: f32) -> usize {
    let mut best = 0;
    let mut best_dist = f32::MAX;
    for (i, &cx) in columns.iter().enumerate() {
        let dist = (cx - x).abs();
        if dist < best_dist {
            best = i;
            best_dist = dist;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::layout::TextSpan;

    fn span(text: &str, x: f32, y: f32) -> TextSpan {
        TextSpan {
            text: text.to_string(),
            x,
            y,
            width: text.chars().count() as f32 * 5.0,
            font_size: 10.0,
        }
    }

    fn line(cells: &[(&str, f32)], y: f32) -> TextLine {
        TextLine::from_spans(cells.iter().map(|(t, x)| span(t, *x, y)).collect())
    }

    #[test]
    fn test_detect_simple_table() {
        let lines = vec![
            line(&[("Name", 72.0), ("Age", 200.0)], 700.0),
            line(&[("Alice", 72.0), ("30", 200.0)], 686.0),
            line(&[("Bob", 72.0), ("25", 200.0)], 672.0),
        ];

        let tables = TableDetector::new().detect(&lines);
        assert_eq!(tables.len(), 1);

        let detected = &tables[0];
        assert_eq!(detected.start, 0);
        assert_eq!(detected.end, 3);
        assert_eq!(detected.table.row_count(), 3);
        assert_eq!(detected.table.column_count(), 2);
        assert_eq!(detected.table.rows[0].plain_text(), "Name\tAge");
        assert_eq!(detected.table.rows[1].plain_text(), "Alice\t30");
        assert_eq!(detected.table.rows[2].plain_text(), "Bob\t25");
    }

    #[test]
    fn test_single_multi_cell_line_is_not_a_table() {
        let lines = vec![
            line(&[("left", 72.0), ("right", 300.0)], 700.0),
            line(&[("just prose", 72.0)], 686.0),
        ];

        let tables = TableDetector::new().detect(&lines);
        assert!(tables.is_empty());
    }

    #[test]
    fn test_prose_between_tables() {
        let lines = vec![
            line(&[("a", 72.0), ("b", 200.0)], 700.0),
            line(&[("c", 72.0), ("d", 200.0)], 686.0),
            line(&[("Some paragraph text here", 72.0)], 672.0),
            line(&[("e", 72.0), ("f", 200.0)], 658.0),
            line(&[("g", 72.0), ("h", 200.0)], 644.0),
        ];

        let tables = TableDetector::new().detect(&lines);
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].end, 2);
        assert_eq!(tables[1].start, 3);
    }

    #[test]
    fn test_ragged_rows_are_padded() {
        let lines = vec![
            line(&[("h1", 72.0), ("h2", 200.0), ("h3", 320.0)], 700.0),
            line(&[("v1", 72.0), ("v3", 320.0)], 686.0),
        ];

        let tables = TableDetector::new().detect(&lines);
        assert_eq!(tables.len(), 1);
        let table = &tables[0].table;
        assert_eq!(table.column_count(), 3);
        // Missing middle cell becomes Empty, not a shifted value
        assert_eq!(table.rows[1].cells[0], CellValue::text("v1"));
        assert!(table.rows[1].cells[1].is_empty());
        assert_eq!(table.rows[1].cells[2], CellValue::text("v3"));
    }

    #[test]
    fn test_jittered_columns_cluster_together() {
        let lines = vec![
            line(&[("a", 72.0), ("b", 200.0)], 700.0),
            line(&[("c", 75.0), ("d", 203.0)], 686.0),
        ];

        let tables = TableDetector::new().detect(&lines);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].table.column_count(), 2);
    }

    #[test]
    fn test_min_rows_respected() {
        let config = TableDetectorConfig {
            min_rows: 3,
            ..Default::default()
        };
        let lines = vec![
            line(&[("a", 72.0), ("b", 200.0)], 700.0),
            line(&[("c", 72.0), ("d", 200.0)], 686.0),
        ];

        let tables = TableDetector::with_config(config).detect(&lines);
        assert!(tables.is_empty());
    }
}
