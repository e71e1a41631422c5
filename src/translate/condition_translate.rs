//! Condition Translation
//!
//! Rewrites a rules-language boolean expression into Python syntax with an
//! ordered list of regex substitutions. There is no expression parsing and
//! no quote awareness: a `=` inside a string literal is rewritten too.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

// Leftmost-first alternation: two-character operators win over `=`, `<`, `>`.
static COMPARISON_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*(==|!=|<>|<=|>=|=|<|>)\s*").unwrap());
static LOGICAL_SYMBOL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*(&&|\|\|)\s*").unwrap());
static BANG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"!\s*([^=\s])").unwrap());
static AND_OR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\s*\b(and|or)\b\s*").unwrap());
static NOT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bnot\b\s*").unwrap());
static LITERAL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(true|false|null)\b").unwrap());

/// Normalize one condition expression for use after `if`/`elif`/`while`
pub fn translate_condition(expr: &str) -> String {
    let expr = expr.trim();

    let expr = COMPARISON_RE.replace_all(expr, |caps: &Captures| {
        let op = match &caps[1] {
            "=" => "==",
            "<>" => "!=",
            other => other,
        };
        format!(" {} ", op)
    });

    let expr = LOGICAL_SYMBOL_RE.replace_all(&expr, |caps: &Captures| {
        let keyword = if &caps[1] == "&&" { "and" } else { "or" };
        format!(" {} ", keyword)
    });
    let expr = BANG_RE.replace_all(&expr, "not $1");

    let expr = AND_OR_RE.replace_all(&expr, |caps: &Captures| format!(" {} ", caps[1].to_lowercase()));
    let expr = NOT_RE.replace_all(&expr, "not ");

    let expr = LITERAL_RE.replace_all(&expr, |caps: &Captures| {
        match &caps[1] {
            "true" => "True",
            "false" => "False",
            _ => "None",
        }
        .to_string()
    });

    expr.trim().to_string()
}

/// Whether `expr` starts with a comparison operator, as in `has > 4`
pub fn starts_with_comparison(expr: &str) -> bool {
    let expr = expr.trim_start();
    ["==", "!=", "<>", "<=", ">=", "=", "<", ">"]
        .iter()
        .any(|op| expr.starts_with(op))
}
