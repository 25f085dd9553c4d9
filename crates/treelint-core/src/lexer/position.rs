//! Line and tab-expanded column tracking.

/// Returns the 1-indexed column reached after `column` when a tab is read.
#[must_use]
pub fn next_tab_stop(column: usize, tab_width: usize) -> usize {
    if tab_width == 0 {
        return column + 1;
    }
    ((column - 1) / tab_width + 1) * tab_width + 1
}

/// Computes the tab-expanded 1-indexed column of `byte_offset` within `line`.
#[must_use]
pub fn expanded_column(line: &str, byte_offset: usize, tab_width: usize) -> usize {
    let mut column = 1;
    for (offset, ch) in line.char_indices() {
        if offset >= byte_offset {
            break;
        }
        column = if ch == '\t' {
            next_tab_stop(column, tab_width)
        } else {
            column + 1
        };
    }
    column
}

/// Finds the byte offset within `line` whose tab-expanded column is
/// `column`, clamped to the line length.
#[must_use]
pub fn byte_offset_for_column(line: &str, column: usize, tab_width: usize) -> usize {
    let mut current = 1;
    for (offset, ch) in line.char_indices() {
        if current >= column {
            return offset;
        }
        current = if ch == '\t' {
            next_tab_stop(current, tab_width)
        } else {
            current + 1
        };
    }
    line.len()
}

/// Incremental position tracker over raw source text.
///
/// Positions only move forward; each call scans the bytes between the
/// previous and the requested offset.
#[derive(Debug, Clone)]
pub(crate) struct PositionTracker<'a> {
    raw: &'a str,
    offset: usize,
    line: usize,
    column: usize,
    tab_width: usize,
}

impl<'a> PositionTracker<'a> {
    pub(crate) fn new(raw: &'a str, tab_width: usize) -> Self {
        Self {
            raw,
            offset: 0,
            line: 1,
            column: 1,
            tab_width,
        }
    }

    /// Advances to `target` and returns its `(line, column)`.
    pub(crate) fn advance_to(&mut self, target: usize) -> (usize, usize) {
        let target = target.min(self.raw.len());
        if target > self.offset {
            let bytes = self.raw.as_bytes();
            for (i, ch) in self.raw[self.offset..target].char_indices() {
                match ch {
                    '\n' => {
                        self.line += 1;
                        self.column = 1;
                    }
                    // CR LF counts once, on the LF.
                    '\r' if bytes.get(self.offset + i + 1) == Some(&b'\n') => {}
                    '\r' => {
                        self.line += 1;
                        self.column = 1;
                    }
                    '\t' => self.column = next_tab_stop(self.column, self.tab_width),
                    _ => self.column += 1,
                }
            }
            self.offset = target;
        }
        (self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_stops() {
        assert_eq!(next_tab_stop(1, 8), 9);
        assert_eq!(next_tab_stop(5, 8), 9);
        assert_eq!(next_tab_stop(9, 8), 17);
        assert_eq!(next_tab_stop(3, 4), 5);
    }

    #[test]
    fn test_tracker_handles_line_terminators_and_tabs() {
        let src = "a\r\n\tb\rc\nd";
        let mut tracker = PositionTracker::new(src, 8);
        assert_eq!(tracker.advance_to(0), (1, 1));
        assert_eq!(tracker.advance_to(4), (2, 9));
        assert_eq!(tracker.advance_to(6), (3, 1));
        assert_eq!(tracker.advance_to(8), (4, 1));
    }

    #[test]
    fn test_expanded_column_round_trips() {
        let line = "\tint\tx;";
        let column = expanded_column(line, 5, 4);
        assert_eq!(column, 9);
        assert_eq!(byte_offset_for_column(line, column, 4), 5);
    }
}
