use crate::model::{Point, TextRange};
use std::ops::Range;

/// Byte offset to line/column conversion for one source text.
/// Columns are counted in UTF-16 code units, the unit editors report.
pub struct LineMap<'a> {
    text: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> LineMap<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut line_starts = vec![0];
        for (i, c) in text.char_indices() {
            if c == '\n' {
                line_starts.push(i + 1);
            }
        }
        Self { text, line_starts }
    }

    pub fn offset_to_point(&self, offset: usize) -> Point {
        let offset = self.clamp(offset);
        match self.line_starts.binary_search(&offset) {
            Ok(line) => Point {
                line: line as u32,
                col: 0,
            },
            Err(next_line_idx) => {
                let line = next_line_idx - 1;
                let line_start = self.line_starts[line];
                let col = self.text[line_start..offset].encode_utf16().count();
                Point {
                    line: line as u32,
                    col: col as u32,
                }
            }
        }
    }

    pub fn range(&self, range: Range<usize>) -> TextRange {
        TextRange {
            start: self.offset_to_point(range.start),
            end: self.offset_to_point(range.end),
        }
    }

    pub fn point_to_offset(&self, point: Point) -> Option<usize> {
        let line_start = *self.line_starts.get(point.line as usize)?;
        let mut current_col = 0u32;

        for (i, c) in self.text[line_start..].char_indices() {
            if current_col == point.col {
                return Some(line_start + i);
            }
            if c == '\n' {
                return None;
            }
            current_col += c.len_utf16() as u32;
        }

        (current_col == point.col).then_some(self.text.len())
    }

    // Offsets that fall inside a multi-byte char snap back to its start.
    fn clamp(&self, offset: usize) -> usize {
        let mut offset = offset.min(self.text.len());
        while !self.text.is_char_boundary(offset) {
            offset -= 1;
        }
        offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_to_point() {
        let text = "# Heading\n\nBody";
        let map = LineMap::new(text);
        assert_eq!(map.offset_to_point(0), Point { line: 0, col: 0 });
        assert_eq!(map.offset_to_point(11), Point { line: 2, col: 0 });
        assert_eq!(map.offset_to_point(13), Point { line: 2, col: 2 });
    }

    #[test]
    fn test_utf16_columns() {
        let text = "和[[a]]";
        let map = LineMap::new(text);
        // '和' is 3 bytes but one UTF-16 unit
        assert_eq!(map.offset_to_point(3), Point { line: 0, col: 1 });
        assert_eq!(map.point_to_offset(Point { line: 0, col: 1 }), Some(3));
    }

    #[test]
    fn test_point_past_line_end() {
        let map = LineMap::new("ab\ncd");
        assert_eq!(map.point_to_offset(Point { line: 0, col: 5 }), None);
        assert_eq!(map.point_to_offset(Point { line: 1, col: 2 }), Some(5));
    }
}
