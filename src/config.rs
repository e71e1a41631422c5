//! Translator Options
//!
//! Options accepted by `Translator`. Hosts may hand them over as a JSON object
//! with camelCase keys; every key is optional.

use serde::{Deserialize, Serialize};

/// Default limit for nested `if any` reprocessing
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TranslatorOptions {
    /// Convert `//` comments to `#` comments. When off, comment-only lines
    /// become blank lines so line counts stay 1:1.
    pub generate_comments: bool,
    /// Passed to method generators through `DebugContext`
    pub strict_mode: bool,
    /// Build an `EnhancedSourceMap` alongside the code
    pub generate_source_map: bool,
    /// How deep `if any` blocks may nest inside each other
    pub max_nesting_depth: usize,
}

impl Default for TranslatorOptions {
    fn default() -> Self {
        Self {
            generate_comments: true,
            strict_mode: false,
            generate_source_map: true,
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }
}

impl TranslatorOptions {
    /// Parse host-supplied options; missing keys take their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = TranslatorOptions::default();
        assert!(options.generate_comments);
        assert!(!options.strict_mode);
        assert!(options.generate_source_map);
        assert_eq!(options.max_nesting_depth, DEFAULT_MAX_NESTING_DEPTH);
    }

    #[test]
    fn test_partial_json() {
        let options = TranslatorOptions::from_json(r#"{"generateComments": false}"#).unwrap();
        assert!(!options.generate_comments);
        assert!(options.generate_source_map);

        let options = TranslatorOptions::from_json(r#"{"strictMode": true, "maxNestingDepth": 2}"#).unwrap();
        assert!(options.strict_mode);
        assert_eq!(options.max_nesting_depth, 2);
    }

    #[test]
    fn test_rejects_wrong_types() {
        assert!(TranslatorOptions::from_json(r#"{"generateComments": "yes"}"#).is_err());
    }
}
