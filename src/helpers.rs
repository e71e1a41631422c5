//! Helper utility functions for the rules transpiler
//!
//! Contains the indentation reconstructor and small line utilities:
//! - Indent extraction and block-opening detection
//! - If-any indentation levels
//! - Relative re-indentation of nested lines
//! - Comment conversion and inline comment splitting
//! - Brace stripping for brace-style blocks

/// One indentation level in generated code
pub const INDENT_UNIT: &str = "    ";
pub const INDENT_WIDTH: usize = 4;

//===========================================================================
// INDENTATION
//===========================================================================

/// Leading run of spaces and tabs, kept as written
///
/// Tabs are not expanded: each one counts as a single character wherever
/// indentation widths are compared.
pub fn extract_indent(line: &str) -> &str {
    let width = line.len() - line.trim_start_matches([' ', '\t']).len();
    &line[..width]
}

/// Indent for the line following `line`
///
/// Any line whose trimmed text ends with `:` is treated as block-opening,
/// including a `:` that closes a string literal.
pub fn next_line_indent(line: &str) -> String {
    let indent = extract_indent(line);
    if line.trim().ends_with(':') {
        format!("{}{}", indent, INDENT_UNIT)
    } else {
        indent.to_string()
    }
}

/// `base` followed by `levels` indentation units
pub fn indent_by(base: &str, levels: usize) -> String {
    let mut indent = String::with_capacity(base.len() + levels * INDENT_WIDTH);
    indent.push_str(base);
    for _ in 0..levels {
        indent.push_str(INDENT_UNIT);
    }
    indent
}

/// Indentation of every line an `if any` lowering emits, derived from the
/// indent of the triggering line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfAnyIndents {
    pub loop_header: String,
    pub condition: String,
    pub body: String,
    /// Same level as the body: the break leaves the loop from inside the `if`
    pub break_stmt: String,
    /// Pairs with the `for`, not with the inner `if`
    pub else_clause: String,
    pub else_body: String,
}

impl IfAnyIndents {
    pub fn from_base(base: &str) -> Self {
        IfAnyIndents {
            loop_header: base.to_string(),
            condition: indent_by(base, 1),
            body: indent_by(base, 2),
            break_stmt: indent_by(base, 2),
            else_clause: base.to_string(),
            else_body: indent_by(base, 1),
        }
    }
}

/// Maps source indentation below a block opener onto generated indentation
///
/// Each distinct source indent opened since `source_base` is one generated
/// level, whatever its width, so two-space and tab sources nest the same
/// way as four-space ones. Lines must be fed in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndentRebase {
    /// Open source indent widths, outermost first; never empty
    levels: Vec<usize>,
    generated_base: String,
}

impl IndentRebase {
    pub fn new(source_base: usize, generated_base: impl Into<String>) -> Self {
        IndentRebase {
            levels: vec![source_base],
            generated_base: generated_base.into(),
        }
    }

    /// Depth of a line at `source_indent`, closing and opening levels as needed
    ///
    /// A dedent to a width that was never opened lands on the next level out
    /// and reopens there.
    pub fn relative_depth(&mut self, source_indent: usize) -> usize {
        while self.levels.len() > 1 && self.levels[self.levels.len() - 1] > source_indent {
            self.levels.pop();
        }
        if self.levels[self.levels.len() - 1] < source_indent {
            self.levels.push(source_indent);
        }
        self.levels.len() - 1
    }

    pub fn indent_for(&mut self, line: &str) -> String {
        let depth = self.relative_depth(extract_indent(line).len());
        indent_by(&self.generated_base, depth)
    }
}

//===========================================================================
// COMMENTS
//===========================================================================

pub fn is_comment(trimmed: &str) -> bool {
    trimmed.starts_with("//")
}

pub fn is_blank_or_comment(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || is_comment(trimmed)
}

/// `// text` → `# text`
pub fn convert_comment(trimmed: &str) -> String {
    let text = trimmed.trim_start_matches('/').trim();
    if text.is_empty() {
        "#".to_string()
    } else {
        format!("# {}", text)
    }
}

/// Split a trimmed line into code and trailing `//` comment text
///
/// `//` inside single- or double-quoted strings is not a comment. For a
/// comment-only line the code part is empty.
pub fn split_inline_comment(trimmed: &str) -> (&str, Option<&str>) {
    let bytes = trimmed.as_bytes();
    let mut quote: Option<u8> = None;
    let mut escape_next = false;

    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];

        if escape_next {
            escape_next = false;
        } else if let Some(q) = quote {
            if c == b'\\' {
                escape_next = true;
            } else if c == q {
                quote = None;
            }
        } else if c == b'"' || c == b'\'' {
            quote = Some(c);
        } else if c == b'/' && bytes.get(i + 1) == Some(&b'/') {
            let comment = trimmed[i..].trim_start_matches('/').trim();
            return (trimmed[..i].trim_end(), Some(comment));
        }
        i += 1;
    }

    (trimmed, None)
}

/// Re-attach a trailing comment as `  # note`; dropped when comments are off
pub fn append_inline_comment(code: String, comment: Option<&str>, generate_comments: bool) -> String {
    match comment {
        Some(text) if generate_comments => {
            if text.is_empty() {
                format!("{}  #", code)
            } else {
                format!("{}  # {}", code, text)
            }
        }
        _ => code,
    }
}

//===========================================================================
// BRACES
//===========================================================================

/// Remove block braces: a leading `}` (as in `} else {`) and a trailing `{`
pub fn strip_block_braces(trimmed: &str) -> &str {
    let mut code = trimmed;
    if let Some(rest) = code.strip_prefix('}') {
        code = rest.trim_start();
    }
    if let Some(rest) = code.strip_suffix('{') {
        code = rest.trim_end();
    }
    code
}

/// Line made only of closing braces, optionally followed by `;`
pub fn is_brace_only(trimmed: &str) -> bool {
    let body = trimmed.strip_suffix(';').unwrap_or(trimmed);
    !body.is_empty() && body.chars().all(|c| c == '}' || c.is_whitespace())
}
