//! Detection functions for business-rule lines
//!
//! Classifies one trimmed, comment-free line into the construct it starts.
//! Order matters: `if any` is checked before `if`, `elseif` before `else`,
//! and every control keyword before the generic assignment shape, so
//! `iffy = 3` is an assignment but `if x = 3` is a condition.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::helpers::{is_brace_only, is_comment};

static IF_ANY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^if\s+any\s+.*\bhas\b").unwrap());
static ELSE_IF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\}\s*)?(?:elseif|elif|else\s+if)\b\s*(.+?)\s*[:{]?$").unwrap());
static ELSE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:\}\s*)?else\s*[:{]?$").unwrap());
static IF_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^if\b\s*(.+?)\s*[:{]?$").unwrap());
static WHILE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^while\b\s*(.+?)\s*[:{]?$").unwrap());
static FOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^for\s+([A-Za-z_]\w*)\s+in\s+(.+?)\s*[:{]?$").unwrap());
static CLASS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^class\s+([A-Za-z_]\w*)\s*(?:extends\s+([A-Za-z_][\w.]*)|\(\s*([A-Za-z_][\w.]*)?\s*\))?\s*[:{]?$")
        .unwrap()
});
static ASSIGN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z_][\w.]*(?:\[[^\]]*\])?)\s*=\s*([^=\s].*)$").unwrap());

/// The construct a single line starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    Blank,
    Comment,
    IfAny,
    Else,
    ElseIf { condition: &'a str },
    If { condition: &'a str },
    While { condition: &'a str },
    For { variable: &'a str, collection: &'a str },
    Class { name: &'a str, base: Option<&'a str> },
    CloseBrace,
    Assignment { target: &'a str, value: &'a str },
    Other,
}

pub fn classify_line(code: &str) -> LineKind<'_> {
    if code.is_empty() {
        return LineKind::Blank;
    }
    if is_comment(code) {
        return LineKind::Comment;
    }
    if is_brace_only(code) {
        return LineKind::CloseBrace;
    }
    if is_if_any_line(code) {
        return LineKind::IfAny;
    }
    if let Some(caps) = ELSE_IF_RE.captures(code) {
        let condition = caps.get(1).map_or("", |m| m.as_str());
        return LineKind::ElseIf { condition };
    }
    if is_else_line(code) {
        return LineKind::Else;
    }
    if let Some(caps) = IF_RE.captures(code) {
        let condition = caps.get(1).map_or("", |m| m.as_str());
        return LineKind::If { condition };
    }
    if let Some(caps) = WHILE_RE.captures(code) {
        let condition = caps.get(1).map_or("", |m| m.as_str());
        return LineKind::While { condition };
    }
    if let Some(caps) = FOR_RE.captures(code) {
        return LineKind::For {
            variable: caps.get(1).map_or("", |m| m.as_str()),
            collection: caps.get(2).map_or("", |m| m.as_str()),
        };
    }
    if let Some(caps) = CLASS_RE.captures(code) {
        let base = caps.get(2).or_else(|| caps.get(3)).map(|m| m.as_str());
        return LineKind::Class {
            name: caps.get(1).map_or("", |m| m.as_str()),
            base,
        };
    }
    if let Some(caps) = ASSIGN_RE.captures(code) {
        return LineKind::Assignment {
            target: caps.get(1).map_or("", |m| m.as_str()),
            value: caps.get(2).map_or("", |m| m.as_str()),
        };
    }
    LineKind::Other
}

/// Loose `if any ... has ...` check; the pattern itself validates the full shape
pub fn is_if_any_line(code: &str) -> bool {
    IF_ANY_RE.is_match(code)
}

/// `else`, `else:`, `else {` or `} else {`
pub fn is_else_line(code: &str) -> bool {
    ELSE_RE.is_match(code)
}
