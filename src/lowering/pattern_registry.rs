//! Transformation Pattern Registry
//!
//! Multi-line constructs are handled by pluggable patterns. Each pattern
//! decides from a line (plus look-ahead) whether it applies, and if so
//! absorbs one or more source lines and emits a block of python lines.
//!
//! The registry tries enabled patterns in registration order. A pattern that
//! fails is logged and skipped, so a broken pattern degrades to "no
//! transformation" instead of failing the line.

use std::fmt;

use tracing::{debug, warn};

use crate::error_msg::TranspileError;
use crate::lowering::if_any_lowering::IfAnyPattern;
use crate::source_map::{MappingType, SourceMapping, SpecialMapping, TransformationMetadata};
use crate::transpiler_state::{EmittedLine, LoweringContext};

/// Output of one pattern application
#[derive(Debug, Clone, PartialEq)]
pub struct TransformationResult {
    pub lines: Vec<EmittedLine>,
    /// Source lines absorbed, starting with the triggering line
    pub consumed_lines: usize,
    pub metadata: TransformationMetadata,
}

impl TransformationResult {
    pub fn python_lines(&self) -> Vec<String> {
        self.lines.iter().map(|line| line.text.clone()).collect()
    }

    /// Record the block as starting after `output_offset` generated lines
    pub fn place_at(&mut self, output_offset: usize) {
        self.metadata.python_line_range = (1, self.lines.len().max(1));
        self.metadata.shift_python_lines(output_offset);
    }
}

pub trait TransformationPattern: Send + Sync {
    fn id(&self) -> &'static str;
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;

    fn detect(&self, line: &str, lines: &[&str], index: usize) -> bool;

    /// Lower the construct at `lines[index]`, emitting it at `base_indent`
    fn transform(
        &self,
        line: &str,
        lines: &[&str],
        index: usize,
        base_indent: &str,
        ctx: &mut LoweringContext<'_>,
    ) -> Result<TransformationResult, TranspileError>;

    /// Mappings for the emitted block, with python lines relative to it (1-based)
    fn generate_mappings(&self, result: &TransformationResult) -> Vec<SpecialMapping> {
        mappings_from_lines(&result.lines)
    }
}

/// One mapping per non-blank emitted line that knows its business line
pub fn mappings_from_lines(lines: &[EmittedLine]) -> Vec<SpecialMapping> {
    lines
        .iter()
        .enumerate()
        .filter(|(_, line)| !line.is_blank())
        .filter_map(|(i, line)| {
            let business_line = line.business_line?;
            let mapping = SourceMapping::new(business_line, i + 1, line.kind, line.kind.default_confidence());
            Some(match describe_kind(line.kind) {
                Some(text) => mapping.describe(text),
                None => mapping,
            })
        })
        .collect()
}

fn describe_kind(kind: MappingType) -> Option<&'static str> {
    match kind {
        MappingType::Direct => None,
        MappingType::LoopHeader => Some("loop over the collection"),
        MappingType::Condition => Some("match condition"),
        MappingType::BreakStatement => Some("stop at the first match"),
        MappingType::ElseClause => Some("no element matched"),
        MappingType::ExceptionHandler => Some("untranslatable line"),
        MappingType::Generated => Some("synthetic statement"),
    }
}

struct RegisteredPattern {
    pattern: Box<dyn TransformationPattern>,
    enabled: bool,
}

pub struct PatternRegistry {
    patterns: Vec<RegisteredPattern>,
}

impl fmt::Debug for PatternRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternRegistry").field("patterns", &self.ids()).finish()
    }
}

impl Default for PatternRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl PatternRegistry {
    /// Registry with no patterns
    pub fn new() -> Self {
        PatternRegistry { patterns: Vec::new() }
    }

    /// Registry with the shipped patterns (`if-any`)
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(IfAnyPattern);
        registry
    }

    pub fn register<P: TransformationPattern + 'static>(&mut self, pattern: P) {
        self.patterns.push(RegisteredPattern {
            pattern: Box::new(pattern),
            enabled: true,
        });
    }

    /// Returns false when no pattern has this id
    pub fn set_enabled(&mut self, id: &str, enabled: bool) -> bool {
        match self.patterns.iter_mut().find(|entry| entry.pattern.id() == id) {
            Some(entry) => {
                entry.enabled = enabled;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: &str) -> Option<&dyn TransformationPattern> {
        self.patterns
            .iter()
            .find(|entry| entry.pattern.id() == id)
            .map(|entry| entry.pattern.as_ref())
    }

    pub fn ids(&self) -> Vec<&'static str> {
        self.patterns.iter().map(|entry| entry.pattern.id()).collect()
    }

    /// Apply the first enabled pattern that detects `line`
    ///
    /// `output_offset` is the number of lines already generated; the returned
    /// metadata carries absolute python line numbers.
    pub fn transform(
        &self,
        line: &str,
        lines: &[&str],
        index: usize,
        output_offset: usize,
        base_indent: &str,
        ctx: &mut LoweringContext<'_>,
    ) -> Option<TransformationResult> {
        for entry in self.patterns.iter().filter(|entry| entry.enabled) {
            let pattern = entry.pattern.as_ref();
            if !pattern.detect(line, lines, index) {
                continue;
            }

            match pattern.transform(line, lines, index, base_indent, ctx) {
                Ok(mut result) => {
                    result.consumed_lines = result.consumed_lines.max(1);
                    result.metadata.special_mappings = pattern.generate_mappings(&result);
                    result.place_at(output_offset);
                    debug!(
                        pattern = pattern.id(),
                        line = index + 1,
                        consumed = result.consumed_lines,
                        emitted = result.lines.len(),
                        "transformation applied"
                    );
                    return Some(result);
                }
                Err(err) => {
                    warn!(pattern = pattern.id(), line = index + 1, error = %err, "transformation failed, skipping pattern");
                    ctx.warn(format!("Line {}: pattern `{}` skipped: {}", index + 1, pattern.id(), err));
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TranslatorOptions;
    use crate::method_schema::MethodRegistry;

    /// Absorbs `shout` plus the following line, upper-casing both
    struct ShoutPattern;

    impl TransformationPattern for ShoutPattern {
        fn id(&self) -> &'static str {
            "shout"
        }
        fn name(&self) -> &'static str {
            "Shout"
        }
        fn description(&self) -> &'static str {
            "upper-cases two lines"
        }
        fn detect(&self, line: &str, _lines: &[&str], _index: usize) -> bool {
            line.trim() == "shout"
        }
        fn transform(
            &self,
            _line: &str,
            lines: &[&str],
            index: usize,
            base_indent: &str,
            _ctx: &mut LoweringContext<'_>,
        ) -> Result<TransformationResult, TranspileError> {
            let next = lines.get(index + 1).copied().unwrap_or("");
            Ok(TransformationResult {
                lines: vec![
                    EmittedLine::new(format!("{}SHOUT", base_indent), index + 1, MappingType::Generated),
                    EmittedLine::direct(format!("{}{}", base_indent, next.trim().to_uppercase()), index + 2),
                ],
                consumed_lines: 2,
                metadata: TransformationMetadata::new("shout", (index + 1, index + 2)),
            })
        }
    }

    struct BrokenPattern;

    impl TransformationPattern for BrokenPattern {
        fn id(&self) -> &'static str {
            "broken"
        }
        fn name(&self) -> &'static str {
            "Broken"
        }
        fn description(&self) -> &'static str {
            "always fails"
        }
        fn detect(&self, line: &str, _lines: &[&str], _index: usize) -> bool {
            line.trim() == "shout"
        }
        fn transform(
            &self,
            line: &str,
            _lines: &[&str],
            _index: usize,
            _base_indent: &str,
            _ctx: &mut LoweringContext<'_>,
        ) -> Result<TransformationResult, TranspileError> {
            Err(TranspileError::MalformedIfAny(line.to_string()))
        }
    }

    #[test]
    fn test_defaults() {
        let registry = PatternRegistry::default();
        assert_eq!(registry.ids(), vec!["if-any"]);
        assert!(registry.get("if-any").is_some());
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_transform_places_block() {
        let mut registry = PatternRegistry::new();
        registry.register(ShoutPattern);
        let methods = MethodRegistry::new();
        let options = TranslatorOptions::default();
        let mut ctx = LoweringContext::new(&registry, &methods, &options);

        let lines = vec!["a = 1", "shout", "hello"];
        let result = registry.transform(lines[1], &lines, 1, 5, "", &mut ctx).unwrap();

        assert_eq!(result.consumed_lines, 2);
        assert_eq!(result.python_lines(), vec!["SHOUT", "HELLO"]);
        assert_eq!(result.metadata.python_line_range, (6, 7));
        assert_eq!(result.metadata.special_mappings.len(), 2);
        assert_eq!(result.metadata.special_mappings[0].python_line, 6);
        assert_eq!(result.metadata.special_mappings[0].confidence, 0.8);
        assert_eq!(result.metadata.special_mappings[1].business_line, 3);
    }

    #[test]
    fn test_failure_falls_through_to_next_pattern() {
        let mut registry = PatternRegistry::new();
        registry.register(BrokenPattern);
        registry.register(ShoutPattern);
        let methods = MethodRegistry::new();
        let options = TranslatorOptions::default();
        let mut ctx = LoweringContext::new(&registry, &methods, &options);

        let lines = vec!["shout", "x"];
        let result = registry.transform(lines[0], &lines, 0, 0, "", &mut ctx).unwrap();
        assert_eq!(result.metadata.kind, "shout");
        assert_eq!(ctx.warnings.len(), 1);
        assert!(ctx.warnings[0].starts_with("Line 1: pattern `broken` skipped"));
    }

    #[test]
    fn test_disabled_and_unmatched() {
        let mut registry = PatternRegistry::new();
        registry.register(ShoutPattern);
        assert!(registry.set_enabled("shout", false));
        assert!(!registry.set_enabled("nope", false));
        let methods = MethodRegistry::new();
        let options = TranslatorOptions::default();
        let mut ctx = LoweringContext::new(&registry, &methods, &options);

        let lines = vec!["shout", "x"];
        assert!(registry.transform(lines[0], &lines, 0, 0, "", &mut ctx).is_none());
        assert!(registry.transform(lines[1], &lines, 1, 0, "", &mut ctx).is_none());
        assert!(ctx.warnings.is_empty());
    }

    #[test]
    fn test_mappings_skip_blank_and_unowned_lines() {
        let lines = vec![
            EmittedLine::new("for x in xs:", 1, MappingType::LoopHeader),
            EmittedLine::blank(),
            EmittedLine::new("    break", 1, MappingType::BreakStatement),
        ];
        let mappings = mappings_from_lines(&lines);
        assert_eq!(mappings.len(), 2);
        assert_eq!(mappings[1].python_line, 3);
        assert_eq!(mappings[1].description.as_deref(), Some("stop at the first match"));
    }
}
