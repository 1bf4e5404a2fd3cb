//! Layout analysis: positioned text extraction from content streams.
//!
//! Interprets the PDF text operators into [`TextSpan`]s with page
//! coordinates, then groups spans into baseline-aligned [`TextLine`]s.
//! Positions are in PDF points with the origin at the bottom-left corner.

use crate::error::Result;

use super::backend::{value_as_number, ContentOp, PdfBackend, PdfValue};

/// A text span with position information.
#[derive(Debug, Clone)]
pub struct TextSpan {
    /// The text content
    pub text: String,
    /// X position (left edge)
    pub x: f32,
    /// Y position (baseline)
    pub y: f32,
    /// Estimated width of the text
    pub width: f32,
    /// Effective font size in points
    pub font_size: f32,
}

impl TextSpan {
    /// Right edge of the span.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }
}

/// A text line composed of spans on the same baseline.
#[derive(Debug, Clone)]
pub struct TextLine {
    /// The spans in this line, sorted by X position
    pub spans: Vec<TextSpan>,
    /// Y position (baseline)
    pub y: f32,
    /// Leftmost X position
    pub x: f32,
    /// Dominant font size in this line
    pub font_size: f32,
}

impl TextLine {
    /// Create a new text line from spans.
    pub fn from_spans(mut spans: Vec<TextSpan>) -> Self {
        spans.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));

        let y = spans.first().map(|s| s.y).unwrap_or(0.0);
        let x = spans.first().map(|s| s.x).unwrap_or(0.0);
        let font_size = spans
            .iter()
            .map(|s| s.font_size)
            .fold(0.0f32, f32::max)
            .max(1.0);

        Self {
            spans,
            y,
            x,
            font_size,
        }
    }

    /// Combined text of all spans, inserting spaces at horizontal gaps.
    pub fn text(&self) -> String {
        let mut result = String::new();
        for (i, span) in self.spans.iter().enumerate() {
            if i > 0 {
                let prev = &self.spans[i - 1];
                let gap = span.x - prev.right();
                // Small positive gaps are inter-word spacing
                if gap > 0.25 * span.font_size.max(1.0)
                    && !result.ends_with(' ')
                    && !span.text.starts_with(' ')
                {
                    result.push(' ');
                }
            }
            result.push_str(&span.text);
        }
        result
    }

    /// Split the line into cells at horizontal gaps of at least `min_gap` points.
    ///
    /// Returns (start x, cell text) pairs in left-to-right order.
    pub fn cells(&self, min_gap: f32) -> Vec<(f32, String)> {
        let mut cells: Vec<(f32, String)> = Vec::new();
        let mut current: Vec<&TextSpan> = Vec::new();

        for span in &self.spans {
            if let Some(last) = current.last() {
                if span.x - last.right() >= min_gap {
                    cells.push(join_cell(&current));
                    current.clear();
                }
            }
            current.push(span);
        }
        if !current.is_empty() {
            cells.push(join_cell(&current));
        }
        cells
    }
}

fn join_cell(spans: &[&TextSpan]) -> (f32, String) {
    let x = spans.first().map(|s| s.x).unwrap_or(0.0);
    let mut text = String::new();
    for (i, span) in spans.iter().enumerate() {
        if i > 0 {
            let prev = spans[i - 1];
            let gap = span.x - prev.right();
            if gap > 0.25 * span.font_size.max(1.0) && !text.ends_with(' ') {
                text.push(' ');
            }
        }
        text.push_str(&span.text);
    }
    (x, text.trim().to_string())
}

/// Extract positioned text spans from a page.
pub fn extract_page_spans(
    backend: &dyn PdfBackend,
    page: super::backend::PageId,
) -> Result<Vec<TextSpan>> {
    let content = backend.page_content(page)?;
    if content.is_empty() {
        return Ok(Vec::new());
    }
    let ops = backend.decode_content(&content)?;
    Ok(spans_from_ops(&ops, &|font, bytes| {
        backend.decode_text(page, font, bytes)
    }))
}

/// Interpret content-stream operations into text spans.
///
/// Covers the text operators `BT ET Tf Td TD Tm TL T* Tj TJ ' "`. The
/// text matrix handling is simplified to translation plus the vertical
/// scale component, which is all that positional extraction needs.
pub fn spans_from_ops(ops: &[ContentOp], decode: &dyn Fn(&[u8], &[u8]) -> String) -> Vec<TextSpan> {
    let mut spans = Vec::new();
    let mut state = TextState::default();

    for op in ops {
        match op.operator.as_str() {
            "BT" => state.begin_text(),
            "ET" => {}
            "Tf" => {
                if op.operands.len() >= 2 {
                    if let PdfValue::Name(name) = &op.operands[0] {
                        state.font_name = name.clone();
                    }
                    if let Some(size) = value_as_number(&op.operands[1]) {
                        state.font_size = size;
                    }
                }
            }
            "TL" => {
                if let Some(l) = op.operands.first().and_then(value_as_number) {
                    state.leading = l;
                }
            }
            "Td" => {
                if op.operands.len() >= 2 {
                    let tx = value_as_number(&op.operands[0]).unwrap_or(0.0);
                    let ty = value_as_number(&op.operands[1]).unwrap_or(0.0);
                    state.translate(tx, ty);
                }
            }
            "TD" => {
                if op.operands.len() >= 2 {
                    let tx = value_as_number(&op.operands[0]).unwrap_or(0.0);
                    let ty = value_as_number(&op.operands[1]).unwrap_or(0.0);
                    state.leading = -ty;
                    state.translate(tx, ty);
                }
            }
            "Tm" => {
                if op.operands.len() >= 6 {
                    let d = value_as_number(&op.operands[3]).unwrap_or(1.0);
                    let e = value_as_number(&op.operands[4]).unwrap_or(0.0);
                    let f = value_as_number(&op.operands[5]).unwrap_or(0.0);
                    state.set_matrix(d, e, f);
                }
            }
            "T*" => state.next_line(),
            "Tj" => {
                if let Some(PdfValue::Str(bytes)) = op.operands.first() {
                    state.show_text(bytes, decode, &mut spans);
                }
            }
            "'" => {
                state.next_line();
                if let Some(PdfValue::Str(bytes)) = op.operands.first() {
                    state.show_text(bytes, decode, &mut spans);
                }
            }
            "\"" => {
                // operands: word spacing, char spacing, string
                state.next_line();
                if let Some(PdfValue::Str(bytes)) = op.operands.get(2) {
                    state.show_text(bytes, decode, &mut spans);
                }
            }
            "TJ" => {
                if let Some(PdfValue::Array(items)) = op.operands.first() {
                    for item in items {
                        match item {
                            PdfValue::Str(bytes) => state.show_text(bytes, decode, &mut spans),
                            PdfValue::Integer(_) | PdfValue::Real(_) => {
                                // Negative values move right (thousandths of em)
                                if let Some(adj) = value_as_number(item) {
                                    state.cursor_x -= adj / 1000.0 * state.effective_size();
                                }
                            }
                            _ => {}
                        }
                    }
                }
            }
            _ => {}
        }
    }

    spans
}

/// Group spans into baseline-aligned lines, sorted top to bottom.
pub fn group_into_lines(mut spans: Vec<TextSpan>) -> Vec<TextLine> {
    if spans.is_empty() {
        return Vec::new();
    }

    // Top to bottom, then left to right
    spans.sort_by(|a, b| {
        b.y.partial_cmp(&a.y)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal))
    });

    let mut lines: Vec<Vec<TextSpan>> = Vec::new();
    for span in spans {
        let tolerance = (span.font_size * 0.5).max(2.0);
        match lines.last_mut() {
            Some(current) if (current[0].y - span.y).abs() <= tolerance => {
                current.push(span);
            }
            _ => lines.push(vec![span]),
        }
    }

    lines.into_iter().map(TextLine::from_spans).collect()
}

/// Text object state for the content-stream interpreter.
struct TextState {
    font_name: Vec<u8>,
    font_size: f32,
    leading: f32,
    /// Vertical scale from the text matrix
    scale: f32,
    /// Start of the current line
    line_x: f32,
    line_y: f32,
    /// Horizontal pen position within the current line
    cursor_x: f32,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            font_name: Vec::new(),
            font_size: 12.0,
            leading: 0.0,
            scale: 1.0,
            line_x: 0.0,
            line_y: 0.0,
            cursor_x: 0.0,
        }
    }
}

impl TextState {
    fn begin_text(&mut self) {
        self.scale = 1.0;
        self.line_x = 0.0;
        self.line_y = 0.0;
        self.cursor_x = 0.0;
    }

    fn effective_size(&self) -> f32 {
        (self.font_size * self.scale.abs()).max(1.0)
    }

    fn translate(&mut self, tx: f32, ty: f32) {
        self.line_x += tx;
        self.line_y += ty;
        self.cursor_x = self.line_x;
    }

    fn set_matrix(&mut self, d: f32, e: f32, f: f32) {
        self.scale = if d == 0.0 { 1.0 } else { d };
        self.line_x = e;
        self.line_y = f;
        self.cursor_x = e;
    }

    fn next_line(&mut self) {
        self.line_y -= self.leading;
        self.cursor_x = self.line_x;
    }

    fn show_text(
        &mut self,
        bytes: &[u8],
        decode: &dyn Fn(&[u8], &[u8]) -> String,
        spans: &mut Vec<TextSpan>,
    ) {
        let text = decode(&self.font_name, bytes);
        if text.is_empty() {
            return;
        }

        let size = self.effective_size();
        // No glyph metrics here: approximate advance as half an em per char
        let width = text.chars().count() as f32 * size * 0.5;

        if !text.trim().is_empty() {
            spans.push(TextSpan {
                text,
                x: self.cursor_x,
                y: self.line_y,
                width,
                font_size: size,
            });
        }
        self.cursor_x += width;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(operator: &str, operands: Vec<PdfValue>) -> ContentOp {
        ContentOp {
            operator: operator.to_string(),
            operands,
        }
    }

    fn str_op(operator: &str, text: &str) -> ContentOp {
        op(operator, vec![PdfValue::Str(text.as_bytes().to_vec())])
    }

    fn simple_decode(_font: &[u8], bytes: &[u8]) -> String {
        String::from_utf8_lossy(bytes).to_string()
    }

    #[test]
    fn test_spans_from_basic_ops() {
        let ops = vec![
            op("BT", vec![]),
            op(
                "Tf",
                vec![PdfValue::Name(b"F1".to_vec()), PdfValue::Integer(12)],
            ),
            op("Td", vec![PdfValue::Integer(72), PdfValue::Integer(700)]),
            str_op("Tj", "Hello"),
            op("ET", vec![]),
        ];

        let spans = spans_from_ops(&ops, &simple_decode);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "Hello");
        assert_eq!(spans[0].x, 72.0);
        assert_eq!(spans[0].y, 700.0);
        assert_eq!(spans[0].font_size, 12.0);
    }

    #[test]
    fn test_td_advances_lines() {
        let ops = vec![
            op("BT", vec![]),
            op(
                "Tf",
                vec![PdfValue::Name(b"F1".to_vec()), PdfValue::Integer(10)],
            ),
            op("Td", vec![PdfValue::Integer(72), PdfValue::Integer(700)]),
            str_op("Tj", "first"),
            op("Td", vec![PdfValue::Integer(0), PdfValue::Integer(-14)]),
            str_op("Tj", "second"),
            op("ET", vec![]),
        ];

        let spans = spans_from_ops(&ops, &simple_decode);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[1].y, 686.0);
        assert_eq!(spans[1].x, 72.0);
    }

    #[test]
    fn test_tl_and_tstar() {
        let ops = vec![
            op("BT", vec![]),
            op("TL", vec![PdfValue::Integer(14)]),
            op("Td", vec![PdfValue::Integer(50), PdfValue::Integer(500)]),
            str_op("Tj", "a"),
            op("T*", vec![]),
            str_op("Tj", "b"),
            op("ET", vec![]),
        ];

        let spans = spans_from_ops(&ops, &simple_decode);
        assert_eq!(spans[0].y, 500.0);
        assert_eq!(spans[1].y, 486.0);
    }

    #[test]
    fn test_tm_sets_position_and_scale() {
        let ops = vec![
            op("BT", vec![]),
            op(
                "Tf",
                vec![PdfValue::Name(b"F1".to_vec()), PdfValue::Integer(10)],
            ),
            op(
                "Tm",
                vec![
                    PdfValue::Integer(2),
                    PdfValue::Integer(0),
                    PdfValue::Integer(0),
                    PdfValue::Integer(2),
                    PdfValue::Integer(100),
                    PdfValue::Integer(200),
                ],
            ),
            str_op("Tj", "big"),
            op("ET", vec![]),
        ];

        let spans = spans_from_ops(&ops, &simple_decode);
        assert_eq!(spans[0].x, 100.0);
        assert_eq!(spans[0].y, 200.0);
        assert_eq!(spans[0].font_size, 20.0);
    }

    #[test]
    fn test_tj_array_adjustments() {
        let ops = vec![
            op("BT", vec![]),
            op(
                "Tf",
                vec![PdfValue::Name(b"F1".to_vec()), PdfValue::Integer(10)],
            ),
            op("Td", vec![PdfValue::Integer(0), PdfValue::Integer(100)]),
            op(
                "TJ",
                vec![PdfValue::Array(vec![
                    PdfValue::Str(b"A".to_vec()),
                    PdfValue::Integer(-2000), // move right by 20pt
                    PdfValue::Str(b"B".to_vec()),
                ])],
            ),
            op("ET", vec![]),
        ];

        let spans = spans_from_ops(&ops, &simple_decode);
        assert_eq!(spans.len(), 2);
        // A is 1 char wide (5pt), then +20pt adjustment
        assert!((spans[1].x - 25.0).abs() < 1e-3);
    }

    #[test]
    fn test_group_into_lines() {
        let spans = vec![
            TextSpan {
                text: "b".into(),
                x: 100.0,
                y: 700.0,
                width: 10.0,
                font_size: 10.0,
            },
            TextSpan {
                text: "a".into(),
                x: 50.0,
                y: 700.5,
                width: 10.0,
                font_size: 10.0,
            },
            TextSpan {
                text: "c".into(),
                x: 50.0,
                y: 680.0,
                width: 10.0,
                font_size: 10.0,
            },
        ];

        let lines = group_into_lines(spans);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text(), "a b");
        assert_eq!(lines[1].text(), "c");
    }

    #[test]
    fn test_line_cells_split_on_gap() {
        let line = TextLine::from_spans(vec![
            TextSpan {
                text: "Name".into(),
                x: 50.0,
                y: 700.0,
                width: 20.0,
                font_size: 10.0,
            },
            TextSpan {
                text: "Age".into(),
                x: 200.0,
                y: 700.0,
                width: 15.0,
                font_size: 10.0,
            },
        ]);

        let cells = line.cells(15.0);
        assert_eq!(cells.len(), 2);
        assert_eq!(cells[0].1, "Name");
        assert_eq!(cells[1].1, "Age");

        // A huge threshold keeps the line as one cell
        let cells = line.cells(500.0);
        assert_eq!(cells.len(), 1);
    }
}
