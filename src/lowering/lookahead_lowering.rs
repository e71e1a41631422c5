//! Look-ahead Lowering Utilities
//!
//! Scans that look forward (or back) from a line to decide how far a block
//! reaches. Blocks are found by indentation only: a block is every following
//! line indented deeper than its opener.

use std::ops::Range;

use crate::detection::{is_else_line, is_if_any_line};
use crate::helpers::{extract_indent, is_blank_or_comment, split_inline_comment};

fn indent_width(line: &str) -> usize {
    extract_indent(line).len()
}

fn code_of(line: &str) -> &str {
    split_inline_comment(line.trim()).0
}

/// Line ranges absorbed by one `if any` construct
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfAnyExtent {
    pub body: Range<usize>,
    pub else_line: Option<usize>,
    /// Empty when there is no `else`
    pub else_body: Range<usize>,
    /// Exclusive index of the first line not absorbed
    pub end: usize,
}

impl IfAnyExtent {
    pub fn consumed_from(&self, index: usize) -> usize {
        self.end - index
    }
}

/// Exclusive end of the lines after `start` that are indented deeper than
/// `base_indent`
///
/// Blank lines and shallow comments are skipped over but never end the block
/// by themselves; trailing ones are left for the caller.
pub fn find_block_end(lines: &[&str], start: usize, base_indent: usize) -> usize {
    let mut end = start;
    for (j, line) in lines.iter().enumerate().skip(start) {
        let deeper = indent_width(line) > base_indent;
        if line.trim().is_empty() {
            continue;
        }
        if is_blank_or_comment(line) {
            if deeper {
                end = j + 1;
            }
            continue;
        }
        if !deeper {
            break;
        }
        end = j + 1;
    }
    end
}

/// Find the `else` at exactly the indent of `lines[index]`
///
/// Blank lines, comments and deeper lines are skipped. The first other line
/// at the same or a shallower indent ends the search.
pub fn find_matching_else(lines: &[&str], index: usize) -> Option<usize> {
    let base = indent_width(lines.get(index)?);
    for (j, line) in lines.iter().enumerate().skip(index + 1) {
        if is_blank_or_comment(line) {
            continue;
        }
        let width = indent_width(line);
        if width > base {
            continue;
        }
        if width == base && is_else_line(code_of(line)) {
            return Some(j);
        }
        return None;
    }
    None
}

/// Body, optional `else`, and else body of the `if any` at `index`
pub fn scan_if_any_block(lines: &[&str], index: usize) -> IfAnyExtent {
    let base = lines.get(index).map_or(0, |line| indent_width(line));

    match find_matching_else(lines, index) {
        Some(else_line) => {
            let else_end = find_block_end(lines, else_line + 1, base);
            IfAnyExtent {
                body: index + 1..else_line,
                else_line: Some(else_line),
                else_body: else_line + 1..else_end,
                end: else_end,
            }
        }
        None => {
            let body_end = find_block_end(lines, index + 1, base);
            IfAnyExtent {
                body: index + 1..body_end,
                else_line: None,
                else_body: body_end..body_end,
                end: body_end,
            }
        }
    }
}

/// Whether the `else` at `index` belongs to an `if any` at the same indent
pub fn pairs_with_if_any(lines: &[&str], index: usize) -> bool {
    let Some(current) = lines.get(index) else {
        return false;
    };
    let base = indent_width(current);
    for line in lines[..index].iter().rev() {
        if is_blank_or_comment(line) {
            continue;
        }
        let width = indent_width(line);
        if width > base {
            continue;
        }
        return width == base && is_if_any_line(code_of(line));
    }
    false
}

/// Indent of the first non-blank line in `range`
pub fn first_content_indent(lines: &[&str], range: Range<usize>) -> Option<usize> {
    lines
        .get(range)?
        .iter()
        .find(|line| !line.trim().is_empty())
        .map(|line| indent_width(line))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_matching_else() {
        let lines = vec!["if any c in cs has 4", "  a = 1", "", "// note", "else", "  a = 2"];
        assert_eq!(find_matching_else(&lines, 0), Some(4));

        let lines = vec!["if any c in cs has 4", "  a = 1", "b = 2", "else"];
        assert_eq!(find_matching_else(&lines, 0), None);

        // an else belonging to a nested if is deeper and skipped
        let lines = vec!["if any c in cs has 4", "  if a = 1", "  else", "x = 1"];
        assert_eq!(find_matching_else(&lines, 0), None);
    }

    #[test]
    fn test_find_matching_else_brace_style() {
        let lines = vec!["if any c in cs has 4 {", "  a = 1", "} else {", "  a = 2", "}"];
        assert_eq!(find_matching_else(&lines, 0), Some(2));
    }

    #[test]
    fn test_find_block_end() {
        let lines = vec!["if any c in cs has 4", "  a = 1", "    // deep", "", "  b = 2", "", "c = 3"];
        assert_eq!(find_block_end(&lines, 1, 0), 5);

        let lines = vec!["x", "y"];
        assert_eq!(find_block_end(&lines, 1, 0), 1);
    }

    #[test]
    fn test_scan_with_else() {
        let lines = vec!["if any c in cs has 4", "  a = 1", "else", "  a = 2", "", "b = 3"];
        let extent = scan_if_any_block(&lines, 0);
        assert_eq!(extent.body, 1..2);
        assert_eq!(extent.else_line, Some(2));
        assert_eq!(extent.else_body, 3..4);
        assert_eq!(extent.consumed_from(0), 4);
    }

    #[test]
    fn test_scan_without_else() {
        let lines = vec!["x = 0", "if any c in cs has 4", "  a = 1", "  b = 1", "", "c = 2"];
        let extent = scan_if_any_block(&lines, 1);
        assert_eq!(extent.body, 2..4);
        assert_eq!(extent.else_line, None);
        assert!(extent.else_body.is_empty());
        assert_eq!(extent.consumed_from(1), 3);
    }

    #[test]
    fn test_pairs_with_if_any() {
        let lines = vec!["if any c in cs has 4", "  a = 1", "", "else"];
        assert!(pairs_with_if_any(&lines, 3));

        let lines = vec!["if a = 1", "  b = 1", "else"];
        assert!(!pairs_with_if_any(&lines, 2));

        let lines = vec!["else"];
        assert!(!pairs_with_if_any(&lines, 0));
    }

    #[test]
    fn test_first_content_indent() {
        let lines = vec!["if any c in cs has 4", "", "   a = 1"];
        assert_eq!(first_content_indent(&lines, 1..3), Some(3));
        assert_eq!(first_content_indent(&lines, 1..2), None);
        assert_eq!(first_content_indent(&lines, 3..3), None);
    }
}
