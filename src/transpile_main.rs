//! Main Generation Loop
//!
//! Walks the business-rule source once, top to bottom. Each line is tried
//! against the pattern registry first; lines no pattern claims go through
//! single-line translation. A line that fails is replaced by an
//! `# ERROR:` placeholder and the loop moves on.
//!
//! Imports collected along the way are prepended once at the end, and all
//! transformation metadata is shifted past them.

use tracing::{debug, warn};

use crate::error_msg::format_line_error;
use crate::helpers::{extract_indent, is_comment};
use crate::source_map::{MappingType, SourceMapping, TransformationMetadata};
use crate::transpiler_state::LoweringContext;
use crate::translate::line_translate::{lower_comment, translate_line};

/// Output of one generation run
#[derive(Debug, Clone, PartialEq)]
pub struct PythonGenerationResult {
    pub python_code: String,
    pub python_lines: Vec<String>,
    /// `"Line <n>: <message>"` per failed line
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    /// Python line numbers are absolute, import block included
    pub transformations: Vec<TransformationMetadata>,
    /// Lines taken by the import block and its separator
    pub import_lines: usize,
}

impl PythonGenerationResult {
    pub fn success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Generate python for `source`, consuming the per-run context
pub fn generate_python(source: &str, mut ctx: LoweringContext<'_>) -> PythonGenerationResult {
    let source = source.strip_prefix('\u{FEFF}').unwrap_or(source);
    let lines: Vec<&str> = source.lines().collect();
    let registry = ctx.registry;
    let generate_comments = ctx.options.generate_comments;

    let mut body: Vec<String> = Vec::with_capacity(lines.len());
    let mut transformations: Vec<TransformationMetadata> = Vec::new();
    let mut errors: Vec<String> = Vec::new();

    let mut index = 0;
    while index < lines.len() {
        let line = lines[index];
        let trimmed = line.trim();
        let indent = extract_indent(line);

        if trimmed.is_empty() {
            body.push(String::new());
            index += 1;
            continue;
        }
        if is_comment(trimmed) {
            body.push(lower_comment(trimmed, indent, index + 1, generate_comments).text);
            index += 1;
            continue;
        }

        if let Some(result) = registry.transform(line, &lines, index, body.len(), indent, &mut ctx) {
            index += result.consumed_lines;
            body.extend(result.lines.into_iter().map(|emitted| emitted.text));
            transformations.push(result.metadata);
            continue;
        }

        let imports_before = ctx.imports.clone();
        match translate_line(&lines, index, indent, &mut ctx) {
            Ok(translation) => {
                if let Some(mut metadata) = translation.metadata {
                    metadata.shift_python_lines(body.len());
                    transformations.push(metadata);
                }
                body.extend(translation.lines.into_iter().map(|emitted| emitted.text));
                index += translation.consumed.max(1);
            }
            Err(err) => {
                let business_line = index + 1;
                warn!(line = business_line, error = %err, "line translation failed");
                errors.push(format_line_error(business_line, &err));
                ctx.imports = imports_before;

                body.push(format!("{}# ERROR: {}", indent, trimmed));
                transformations.push(error_placeholder(business_line, body.len(), &err.to_string()));
                index += 1;
            }
        }
    }

    let mut python_lines = ctx.imports.render();
    if !python_lines.is_empty() {
        python_lines.push(String::new());
    }
    let import_lines = python_lines.len();
    for metadata in &mut transformations {
        metadata.shift_python_lines(import_lines);
    }
    python_lines.extend(body);

    debug!(
        source_lines = lines.len(),
        python_lines = python_lines.len(),
        transformations = transformations.len(),
        errors = errors.len(),
        "python generation finished"
    );

    PythonGenerationResult {
        python_code: python_lines.join("\n"),
        python_lines,
        errors,
        warnings: ctx.warnings,
        transformations,
        import_lines,
    }
}

/// One-line record tying a placeholder back to the line it replaced
fn error_placeholder(business_line: usize, python_line: usize, message: &str) -> TransformationMetadata {
    let mut metadata =
        TransformationMetadata::new("error-placeholder", (business_line, business_line)).with_context("error", message);
    metadata.python_line_range = (python_line, python_line);
    metadata.special_mappings.push(
        SourceMapping::new(
            business_line,
            python_line,
            MappingType::ExceptionHandler,
            MappingType::ExceptionHandler.default_confidence(),
        )
        .describe("untranslatable line"),
    );
    metadata
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TranslatorOptions;
    use crate::lowering::pattern_registry::PatternRegistry;
    use crate::method_schema::MethodRegistry;

    fn generate(source: &str, registry: &PatternRegistry, options: &TranslatorOptions) -> PythonGenerationResult {
        let methods = MethodRegistry::builtin();
        generate_python(source, LoweringContext::new(registry, &methods, options))
    }

    fn generate_default(source: &str) -> PythonGenerationResult {
        generate(source, &PatternRegistry::with_defaults(), &TranslatorOptions::default())
    }

    #[test]
    fn test_straight_line_is_one_to_one() {
        let result = generate_default("// totals\nx = 1\n\ny = x + 2");
        assert!(result.success());
        assert_eq!(result.python_lines, vec!["# totals", "x = 1", "", "y = x + 2"]);
        assert!(result.transformations.is_empty());
        assert_eq!(result.import_lines, 0);
    }

    #[test]
    fn test_pattern_then_following_lines() {
        let source = "a = 1\nif any n in ns has 4\n  hit = n\nb = 2";
        let result = generate_default(source);
        assert_eq!(
            result.python_lines,
            vec!["a = 1", "for n in ns:", "    if n == 4:", "        hit = n", "        break", "b = 2"]
        );
        assert_eq!(result.transformations.len(), 1);
        assert_eq!(result.transformations[0].business_line_range, (2, 3));
        assert_eq!(result.transformations[0].python_line_range, (2, 5));
    }

    #[test]
    fn test_imports_are_prepended_and_metadata_shifted() {
        let source = "if any n in ns has 4\n  seen = n.log(\"hit\")\nstart = clock.now()";
        let result = generate_default(source);
        assert_eq!(&result.python_lines[..3], ["import datetime", "import rule_helpers", ""]);
        assert_eq!(result.import_lines, 3);
        assert_eq!(result.python_lines[5], "        seen = rule_helpers.log_message(\"hit\")");
        assert_eq!(result.python_lines[7], "start = datetime.datetime.now()");

        let metadata = &result.transformations[0];
        assert_eq!(metadata.python_line_range, (4, 7));
        assert_eq!(metadata.special_mappings[0].python_line, 4);
    }

    #[test]
    fn test_line_error_becomes_placeholder() {
        // the registry skips the malformed line, the legacy path reports it
        let result = generate_default("a = 1\n  if any x has 4\nb = 2");
        assert!(!result.success());
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].starts_with("Line 2: malformed `if any` statement"));
        assert_eq!(result.python_lines, vec!["a = 1", "  # ERROR: if any x has 4", "b = 2"]);
        assert_eq!(result.warnings.len(), 1);

        let placeholder = &result.transformations[0];
        assert_eq!(placeholder.kind, "error-placeholder");
        assert_eq!(placeholder.python_line_range, (2, 2));
        assert_eq!(placeholder.special_mappings[0].mapping_type, MappingType::ExceptionHandler);
    }

    #[test]
    fn test_disabled_registry_uses_legacy_path() {
        let mut registry = PatternRegistry::with_defaults();
        registry.set_enabled("if-any", false);
        let source = "if any n in ns has 4\n  hit = n\nelse\n  hit = 0";
        let result = generate(source, &registry, &TranslatorOptions::default());
        assert!(result.success());
        assert_eq!(
            result.python_lines,
            vec!["for n in ns:", "    if n == 4:", "        hit = n", "        break", "else:", "    hit = 0"]
        );
        assert_eq!(result.transformations[0].python_line_range, (1, 6));
    }

    #[test]
    fn test_orphan_else_after_failed_if_any() {
        let source = "if any n has 4\n  hit = n\nelse\n  hit = 0";
        let result = generate_default(source);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(
            result.python_lines,
            vec!["# ERROR: if any n has 4", "  hit = n", "        break", "else:", "  hit = 0"]
        );
        let kinds: Vec<&str> = result.transformations.iter().map(|t| t.kind.as_str()).collect();
        assert_eq!(kinds, vec!["error-placeholder", "else-break"]);
        assert_eq!(result.transformations[1].python_line_range, (3, 4));
    }

    #[test]
    fn test_bom_and_brace_blocks() {
        let result = generate_default("\u{FEFF}if ok = true {\n    x = 1\n}");
        assert_eq!(result.python_lines, vec!["if ok == True:", "    x = 1", ""]);
    }

    #[test]
    fn test_comments_disabled_keep_line_count() {
        let options = TranslatorOptions {
            generate_comments: false,
            ..TranslatorOptions::default()
        };
        let result = generate("// note\nx = 1 // inline", &PatternRegistry::with_defaults(), &options);
        assert_eq!(result.python_lines, vec!["", "x = 1"]);
    }

    #[test]
    fn test_depth_limit_reported_as_line_error() {
        let options = TranslatorOptions {
            max_nesting_depth: 1,
            ..TranslatorOptions::default()
        };
        let source = "if any a in xs has 1\n  if any b in ys has 2\n    z = 1";
        let result = generate(source, &PatternRegistry::with_defaults(), &options);
        assert_eq!(result.errors, vec!["Line 1: nesting depth 2 exceeds the limit of 1"]);
        assert_eq!(result.python_lines[0], "# ERROR: if any a in xs has 1");
    }
}
