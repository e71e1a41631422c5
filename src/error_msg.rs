//! Error Taxonomy
//!
//! Errors raised while lowering business rules to Python.
//!
//! ## Recovery levels
//!
//! - **Line errors** (`TranspileError`) are caught by the generator for the
//!   single line that raised them. The line becomes an `# ERROR:` placeholder
//!   and translation continues with the next line.
//! - **Source map errors** (`SourceMapError`) are caught by `translate`, which
//!   falls back to a trivial line map and records a warning.
//! - **Critical errors** (`TranspileError::Critical`) abort the whole run with
//!   empty output. They only come from failures outside the per-line boundary.

use thiserror::Error;

//=============================================================================
// LINE ERRORS
//=============================================================================

/// Failure while translating one business-rule line
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranspileError {
    /// A line passed the `if any` detector but not the full shape check
    #[error("malformed `if any` statement `{0}`: expected `if any <item> in <collection> has <condition>`")]
    MalformedIfAny(String),

    /// Nested `if any` reprocessing went deeper than the configured limit
    #[error("nesting depth {depth} exceeds the limit of {limit}")]
    NestingTooDeep { depth: usize, limit: usize },

    /// A method generator needed a parameter the call did not supply
    #[error("method `{method}` requires argument `{parameter}`")]
    MissingArgument { method: String, parameter: String },

    /// A method generator rejected its input
    #[error("method `{method}` could not be generated: {reason}")]
    MethodGeneration { method: String, reason: String },

    /// Anything escaping the per-line error boundary
    #[error("critical translator failure: {0}")]
    Critical(String),
}

impl TranspileError {
    /// Whether the error aborts the whole translation run
    pub fn is_critical(&self) -> bool {
        matches!(self, TranspileError::Critical(_))
    }
}

//=============================================================================
// SOURCE MAP ERRORS
//=============================================================================

/// Inconsistent transformation metadata handed to the source map generator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceMapError {
    #[error("transformation `{kind}` has an inverted {side} range {start}-{end}")]
    InvertedRange {
        kind: String,
        side: &'static str,
        start: usize,
        end: usize,
    },

    #[error("transformation `{kind}` claims business lines {start}-{end} but the source has {available} lines")]
    BusinessRangeOutOfBounds {
        kind: String,
        start: usize,
        end: usize,
        available: usize,
    },

    #[error("transformation `{kind}` claims python lines {start}-{end} but only {available} lines were generated")]
    PythonRangeOutOfBounds {
        kind: String,
        start: usize,
        end: usize,
        available: usize,
    },
}

//=============================================================================
// FORMATTING
//=============================================================================

/// Render a line error the way it appears in `TranslationResult::errors`
///
/// `line` is 1-based.
pub fn format_line_error(line: usize, err: &TranspileError) -> String {
    format!("Line {}: {}", line, err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_line_error() {
        let err = TranspileError::MalformedIfAny("if any x has 3".to_string());
        let msg = format_line_error(7, &err);
        assert!(msg.starts_with("Line 7: malformed `if any` statement `if any x has 3`"));
    }

    #[test]
    fn test_nesting_message() {
        let err = TranspileError::NestingTooDeep { depth: 17, limit: 16 };
        assert_eq!(err.to_string(), "nesting depth 17 exceeds the limit of 16");
        assert!(!err.is_critical());
        assert!(TranspileError::Critical("boom".into()).is_critical());
    }

    #[test]
    fn test_source_map_error_message() {
        let err = SourceMapError::PythonRangeOutOfBounds {
            kind: "if-any".to_string(),
            start: 4,
            end: 9,
            available: 6,
        };
        assert_eq!(
            err.to_string(),
            "transformation `if-any` claims python lines 4-9 but only 6 lines were generated"
        );
    }
}
