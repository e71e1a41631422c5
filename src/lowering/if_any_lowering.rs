//! If-Any Lowering
//!
//! `if any <item> in <collection> has <condition>` asks whether some element
//! satisfies the condition. It is lowered to a linear scan with early exit,
//! relying on Python's `for`/`else`:
//! ```text
//! for item in collection:
//!     if <condition>:
//!         <body>
//!         break
//! else:
//!     <else body>
//! ```
//! The condition either names the item (`item.age = 4`) or is a bare value
//! compared against the item itself (`has 4` → `item == 4`).

use once_cell::sync::Lazy;
use regex::Regex;

use crate::detection::is_if_any_line;
use crate::error_msg::TranspileError;
use crate::helpers::{
    append_inline_comment, extract_indent, split_inline_comment, IfAnyIndents, IndentRebase, INDENT_WIDTH,
};
use crate::lowering::lookahead_lowering::{first_content_indent, scan_if_any_block};
use crate::lowering::nested_block_lowering::lower_nested_block;
use crate::lowering::pattern_registry::{TransformationPattern, TransformationResult};
use crate::source_map::{MappingType, TransformationMetadata};
use crate::transpiler_state::{EmittedLine, LoweringContext};
use crate::translate::condition_translate::{starts_with_comparison, translate_condition};

static IF_ANY_SHAPE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^if\s+any\s+([A-Za-z_]\w*)\s+in\s+([A-Za-z_][\w.]*)\s+has\s+(.+?)\s*[:{]?$").unwrap()
});

/// Parsed `if any` header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IfAnyClause<'a> {
    pub item: &'a str,
    pub collection: &'a str,
    pub condition: &'a str,
}

impl IfAnyClause<'_> {
    /// Condition does not name the item, so it is compared against the item
    pub fn is_implicit(&self) -> bool {
        !mentions_identifier(self.condition, self.item)
    }

    pub fn python_condition(&self) -> String {
        if !self.is_implicit() {
            translate_condition(self.condition)
        } else if starts_with_comparison(self.condition) {
            translate_condition(&format!("{} {}", self.item, self.condition))
        } else {
            format!("{} == {}", self.item, translate_condition(self.condition))
        }
    }
}

/// Parse a comment-free `if any` line
pub fn parse_if_any(code: &str) -> Result<IfAnyClause<'_>, TranspileError> {
    let caps = IF_ANY_SHAPE_RE
        .captures(code)
        .ok_or_else(|| TranspileError::MalformedIfAny(code.to_string()))?;
    match (caps.get(1), caps.get(2), caps.get(3)) {
        (Some(item), Some(collection), Some(condition)) => Ok(IfAnyClause {
            item: item.as_str(),
            collection: collection.as_str(),
            condition: condition.as_str(),
        }),
        _ => Err(TranspileError::MalformedIfAny(code.to_string())),
    }
}

/// `ident` appears in `text` as a whole word
fn mentions_identifier(text: &str, ident: &str) -> bool {
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    text.match_indices(ident).any(|(at, _)| {
        let before = text[..at].chars().next_back();
        let after = text[at + ident.len()..].chars().next();
        !before.is_some_and(is_word) && !after.is_some_and(is_word)
    })
}

//=============================================================================
// PATTERN
//=============================================================================

pub struct IfAnyPattern;

impl TransformationPattern for IfAnyPattern {
    fn id(&self) -> &'static str {
        "if-any"
    }

    fn name(&self) -> &'static str {
        "If Any"
    }

    fn description(&self) -> &'static str {
        "existential `if any <item> in <collection> has <condition>` lowered to for/if/break/else"
    }

    fn detect(&self, line: &str, _lines: &[&str], _index: usize) -> bool {
        is_if_any_line(split_inline_comment(line.trim()).0)
    }

    fn transform(
        &self,
        _line: &str,
        lines: &[&str],
        index: usize,
        base_indent: &str,
        ctx: &mut LoweringContext<'_>,
    ) -> Result<TransformationResult, TranspileError> {
        lower_if_any(lines, index, base_indent, ctx)
    }
}

/// Lower the `if any` at `lines[index]` together with its body and `else`
///
/// Emitted python lines start at `base_indent`. Nested blocks are lowered
/// recursively; `ctx.depth` tracks how many `if any` blocks enclose them.
pub fn lower_if_any(
    lines: &[&str],
    index: usize,
    base_indent: &str,
    ctx: &mut LoweringContext<'_>,
) -> Result<TransformationResult, TranspileError> {
    let source = lines.get(index).copied().unwrap_or_default();
    let (code, comment) = split_inline_comment(source.trim());
    let clause = parse_if_any(code)?;

    let depth = ctx.depth + 1;
    let limit = ctx.options.max_nesting_depth;
    if depth > limit {
        return Err(TranspileError::NestingTooDeep { depth, limit });
    }

    let business_line = index + 1;
    let extent = scan_if_any_block(lines, index);
    let indents = IfAnyIndents::from_base(base_indent);
    let source_base = extract_indent(source).len();
    let generate_comments = ctx.options.generate_comments;

    let mut out = Vec::new();
    let header = format!("{}for {} in {}:", indents.loop_header, clause.item, clause.collection);
    out.push(EmittedLine::new(
        append_inline_comment(header, comment, generate_comments),
        business_line,
        MappingType::LoopHeader,
    ));
    out.push(EmittedLine::new(
        format!("{}if {}:", indents.condition, clause.python_condition()),
        business_line,
        MappingType::Condition,
    ));

    ctx.depth = depth;
    let body = lower_suite(lines, extent.body.clone(), source_base, &indents.body, ctx);
    ctx.depth = depth - 1;
    out.extend(body?);

    while out.last().is_some_and(EmittedLine::is_blank) {
        out.pop();
    }
    out.push(EmittedLine::new(
        format!("{}break", indents.break_stmt),
        business_line,
        MappingType::BreakStatement,
    ));

    if let Some(else_line) = extent.else_line {
        let else_source = lines.get(else_line).copied().unwrap_or_default();
        let else_comment = split_inline_comment(else_source.trim()).1;
        out.push(EmittedLine::new(
            append_inline_comment(format!("{}else:", indents.else_clause), else_comment, generate_comments),
            else_line + 1,
            MappingType::ElseClause,
        ));

        ctx.depth = depth;
        let else_body = lower_suite(lines, extent.else_body.clone(), source_base, &indents.else_body, ctx);
        ctx.depth = depth - 1;
        let else_body = else_body?;

        if else_body.iter().all(EmittedLine::is_blank) {
            out.push(EmittedLine::new(
                format!("{}pass", indents.else_body),
                else_line + 1,
                MappingType::Generated,
            ));
        } else {
            out.extend(else_body);
        }
    }

    let consumed = extent.consumed_from(index);
    let metadata = TransformationMetadata::new("if-any", (business_line, index + consumed))
        .with_context("item", clause.item)
        .with_context("collection", clause.collection)
        .with_context("condition", clause.python_condition())
        .with_context("implicitCondition", clause.is_implicit())
        .with_context("hasElse", extent.else_line.is_some())
        .with_context("nestedDepth", depth);

    Ok(TransformationResult {
        lines: out,
        consumed_lines: consumed,
        metadata,
    })
}

/// Lower a body range so its first line sits at `target_indent`
fn lower_suite(
    lines: &[&str],
    range: std::ops::Range<usize>,
    source_base: usize,
    target_indent: &str,
    ctx: &mut LoweringContext<'_>,
) -> Result<Vec<EmittedLine>, TranspileError> {
    let first = first_content_indent(lines, range.clone()).unwrap_or(source_base + INDENT_WIDTH);
    lower_nested_block(lines, range, IndentRebase::new(first, target_indent), ctx)
}
