//! Nested Block Lowering
//!
//! A small generator over a range of source lines inside a pattern body. It
//! runs the same single-line translation as the top-level generator, with
//! indentation rebased onto the generated block. Nested `if any` lines are
//! lowered recursively through that translation step.
//!
//! Unlike the top level, errors are not caught here: the first failing line
//! fails the whole enclosing construct.

use std::ops::Range;

use crate::error_msg::TranspileError;
use crate::helpers::IndentRebase;
use crate::transpiler_state::{EmittedLine, LoweringContext};
use crate::translate::line_translate::translate_line;

/// Lower `lines[range]`, indenting each line through `rebase`
///
/// Look-ahead inside the block never reaches past `range.end`. Lines a
/// nested construct consumes are indented by that construct, not `rebase`.
pub fn lower_nested_block(
    lines: &[&str],
    range: Range<usize>,
    mut rebase: IndentRebase,
    ctx: &mut LoweringContext<'_>,
) -> Result<Vec<EmittedLine>, TranspileError> {
    let window = &lines[..range.end.min(lines.len())];
    let mut out = Vec::with_capacity(range.len());

    let mut i = range.start;
    while i < window.len() {
        let line = window[i];
        if line.trim().is_empty() {
            out.push(EmittedLine::blank());
            i += 1;
            continue;
        }

        let indent = rebase.indent_for(line);
        let translation = translate_line(window, i, &indent, ctx)?;
        out.extend(translation.lines);
        i += translation.consumed.max(1);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TranslatorOptions;
    use crate::lowering::pattern_registry::PatternRegistry;
    use crate::method_schema::MethodRegistry;
    use crate::source_map::MappingType;

    fn texts(lines: &[EmittedLine]) -> Vec<&str> {
        lines.iter().map(|line| line.text.as_str()).collect()
    }

    #[test]
    fn test_rebases_relative_indent() {
        let lines = vec!["if any c in cs has 1", "  a = 1", "  if a = 1", "    b = 2", "", "  c = 3", "d = 4"];
        let registry = PatternRegistry::with_defaults();
        let methods = MethodRegistry::new();
        let options = TranslatorOptions::default();
        let mut ctx = LoweringContext::new(&registry, &methods, &options);

        let out = lower_nested_block(&lines, 1..6, IndentRebase::new(2, "        "), &mut ctx).unwrap();
        assert_eq!(
            texts(&out),
            vec!["        a = 1", "        if a == 1:", "            b = 2", "", "        c = 3"]
        );
        assert_eq!(out[2].business_line, Some(4));
        assert_eq!(out[3].business_line, None);
    }

    #[test]
    fn test_window_stops_at_range_end() {
        // the else belongs to the outer construct and is outside the range
        let lines = vec!["  if any d in ds has 2", "    x = d", "else", "  y = 1"];
        let registry = PatternRegistry::with_defaults();
        let methods = MethodRegistry::new();
        let options = TranslatorOptions::default();
        let mut ctx = LoweringContext::new(&registry, &methods, &options);

        let out = lower_nested_block(&lines, 0..2, IndentRebase::new(2, ""), &mut ctx).unwrap();
        assert_eq!(texts(&out), vec!["for d in ds:", "    if d == 2:", "        x = d", "        break"]);
        assert_eq!(out[3].kind, MappingType::BreakStatement);
    }

    #[test]
    fn test_two_space_nesting_keeps_each_level() {
        let lines = vec!["  if c.y = 2", "    if c.z = 3", "      a = 1", "    b = 2", "  d = 3"];
        let registry = PatternRegistry::with_defaults();
        let methods = MethodRegistry::new();
        let options = TranslatorOptions::default();
        let mut ctx = LoweringContext::new(&registry, &methods, &options);

        let out = lower_nested_block(&lines, 0..5, IndentRebase::new(2, "    "), &mut ctx).unwrap();
        assert_eq!(
            texts(&out),
            vec!["    if c.y == 2:", "        if c.z == 3:", "            a = 1", "        b = 2", "    d = 3"]
        );
    }

    #[test]
    fn test_error_propagates() {
        let registry = PatternRegistry::with_defaults();
        let methods = MethodRegistry::new();
        let options = TranslatorOptions::default();
        let mut ctx = LoweringContext::new(&registry, &methods, &options);

        // no `has`, so this is an ordinary `if`
        let lines = vec!["  if any broken"];
        let out = lower_nested_block(&lines, 0..1, IndentRebase::new(2, ""), &mut ctx).unwrap();
        assert_eq!(texts(&out), vec!["if any broken:"]);

        let lines = vec!["  if any x has 4"];
        let err = lower_nested_block(&lines, 0..1, IndentRebase::new(2, ""), &mut ctx).unwrap_err();
        assert!(matches!(err, TranspileError::MalformedIfAny(_)));
    }
}
