//! Single-Line Translation
//!
//! The per-line step shared by the top-level generator and nested block
//! lowering. Each call looks at one source line and emits its python
//! rendering. Only a legacy `if any` reaching this step emits more than one line.

use crate::detection::{classify_line, LineKind};
use crate::error_msg::TranspileError;
use crate::helpers::{append_inline_comment, convert_comment, indent_by, is_comment, split_inline_comment};
use crate::lowering::if_any_lowering::lower_if_any;
use crate::lowering::lookahead_lowering::pairs_with_if_any;
use crate::lowering::pattern_registry::mappings_from_lines;
use crate::source_map::{MappingType, TransformationMetadata};
use crate::transpiler_state::{EmittedLine, LoweringContext};
use crate::translate::condition_translate::translate_condition;
use crate::translate::method_call_translate::translate_method_invocation;

/// Lines emitted for one translated source line
#[derive(Debug, Clone, PartialEq)]
pub struct LineTranslation {
    pub lines: Vec<EmittedLine>,
    /// Source lines absorbed, at least 1
    pub consumed: usize,
    /// Set for multi-line output; python lines are relative to `lines` (1-based)
    pub metadata: Option<TransformationMetadata>,
}

impl LineTranslation {
    fn single(line: EmittedLine) -> Self {
        LineTranslation {
            lines: vec![line],
            consumed: 1,
            metadata: None,
        }
    }
}

/// `// text` at `indent`, or a blank line when comments are disabled
pub fn lower_comment(trimmed: &str, indent: &str, business_line: usize, generate_comments: bool) -> EmittedLine {
    if generate_comments {
        EmittedLine::direct(format!("{}{}", indent, convert_comment(trimmed)), business_line)
    } else {
        EmittedLine::blank()
    }
}

/// Translate `lines[index]` with its output placed at `indent`
pub fn translate_line(
    lines: &[&str],
    index: usize,
    indent: &str,
    ctx: &mut LoweringContext<'_>,
) -> Result<LineTranslation, TranspileError> {
    let source = lines.get(index).copied().unwrap_or_default();
    let business_line = index + 1;
    let trimmed = source.trim();
    let generate_comments = ctx.options.generate_comments;

    if trimmed.is_empty() {
        return Ok(LineTranslation::single(EmittedLine::blank()));
    }
    if is_comment(trimmed) {
        return Ok(LineTranslation::single(lower_comment(
            trimmed,
            indent,
            business_line,
            generate_comments,
        )));
    }

    let (code, comment) = split_inline_comment(trimmed);
    let finish = |text: String| append_inline_comment(format!("{}{}", indent, text), comment, generate_comments);

    let text = match classify_line(code) {
        LineKind::Blank | LineKind::Comment | LineKind::CloseBrace => {
            return Ok(LineTranslation::single(EmittedLine::blank()));
        }
        LineKind::IfAny => {
            let mut result = lower_if_any(lines, index, indent, ctx)?;
            result.metadata.special_mappings = mappings_from_lines(&result.lines);
            result.place_at(0);
            return Ok(LineTranslation {
                lines: result.lines,
                consumed: result.consumed_lines,
                metadata: Some(result.metadata),
            });
        }
        LineKind::Else if pairs_with_if_any(lines, index) => {
            return Ok(else_after_if_any(indent, business_line, comment, generate_comments));
        }
        LineKind::Else => "else:".to_string(),
        LineKind::ElseIf { condition } => format!("elif {}:", translate_condition(condition)),
        LineKind::If { condition } => format!("if {}:", translate_condition(condition)),
        LineKind::While { condition } => format!("while {}:", translate_condition(condition)),
        LineKind::For { variable, collection } => format!("for {} in {}:", variable, collection),
        LineKind::Class { name, base: Some(base) } => format!("class {}({}):", name, base),
        LineKind::Class { name, base: None } => format!("class {}:", name),
        LineKind::Assignment { target, value } => {
            translate_method_invocation(target, value, business_line, ctx).unwrap_or_else(|| code.to_string())
        }
        LineKind::Other => code.to_string(),
    };

    Ok(LineTranslation::single(EmittedLine::direct(finish(text), business_line)))
}

/// An `else` whose `if any` was not absorbed by a pattern: close the scan
/// with `break` at body depth, then open the `else`
fn else_after_if_any(
    indent: &str,
    business_line: usize,
    comment: Option<&str>,
    generate_comments: bool,
) -> LineTranslation {
    let lines = vec![
        EmittedLine::new(
            format!("{}break", indent_by(indent, 2)),
            business_line,
            MappingType::BreakStatement,
        ),
        EmittedLine::new(
            append_inline_comment(format!("{}else:", indent), comment, generate_comments),
            business_line,
            MappingType::ElseClause,
        ),
    ];

    let mut metadata = TransformationMetadata::new("else-break", (business_line, business_line));
    metadata.special_mappings = mappings_from_lines(&lines);
    metadata.python_line_range = (1, lines.len());

    LineTranslation {
        lines,
        consumed: 1,
        metadata: Some(metadata),
    }
}
