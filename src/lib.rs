//! rulepy - business rules to Python transpiler
//!
//! Translates a small line-oriented business-rules language (assignments,
//! `if`/`elseif`/`else`, `for`, `while`, `class` and the existential
//! `if any <item> in <collection> has <condition>`) into Python, together
//! with a line-level source map that lets a debugger step through the
//! generated code in terms of the original rules.
//!
//! ```
//! let result = rulepy::translate("if any n in numbers has 4\n  found = n");
//! assert!(result.success);
//! assert!(result.python_code.starts_with("for n in numbers:"));
//! ```

pub mod config;
pub mod detection;
pub mod error_msg;
pub mod helpers;
pub mod lowering;
pub mod method_schema;
pub mod source_map;
pub mod tracing_config;
pub mod translate;
pub mod transpile_main;
pub mod transpiler_state;


use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use serde::Serialize;
use tracing::{debug, error, warn};

pub use config::TranslatorOptions;
pub use error_msg::{SourceMapError, TranspileError};
pub use lowering::pattern_registry::{PatternRegistry, TransformationPattern, TransformationResult};
pub use method_schema::{DebugContext, MethodParams, MethodRegistry, MethodSchema};
pub use source_map::{
    find_business_line_for_python_line, find_python_line_for_business_line, EnhancedSourceMap, MappingType,
    SourceMapping, SpecialMapping, TransformationMetadata,
};
pub use transpile_main::{generate_python, PythonGenerationResult};
pub use transpiler_state::LoweringContext;

use source_map::{fallback_source_map, generate_enhanced_source_map};

//===========================================================================
// TRANSLATION RESULT
//===========================================================================

/// What the host editor receives from one translation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationResult {
    pub success: bool,
    /// Always present; failed lines appear as `# ERROR:` placeholders
    pub python_code: String,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_map: Option<EnhancedSourceMap>,
}

impl TranslationResult {
    fn critical(err: &TranspileError) -> Self {
        TranslationResult {
            success: false,
            python_code: String::new(),
            errors: vec![err.to_string()],
            warnings: Vec::new(),
            source_map: None,
        }
    }
}

//===========================================================================
// TRANSLATOR
//===========================================================================

/// Reusable translator: options plus the pattern and method registries
///
/// The registries are only read while translating, so one translator can
/// serve any number of `translate` calls.
#[derive(Debug)]
pub struct Translator {
    options: TranslatorOptions,
    patterns: PatternRegistry,
    methods: MethodRegistry,
}

impl Default for Translator {
    fn default() -> Self {
        Self::new(TranslatorOptions::default())
    }
}

impl Translator {
    /// Translator with the default patterns and the built-in method table
    pub fn new(options: TranslatorOptions) -> Self {
        Self::with_methods(options, MethodRegistry::builtin())
    }

    pub fn with_methods(options: TranslatorOptions, methods: MethodRegistry) -> Self {
        Translator {
            options,
            patterns: PatternRegistry::with_defaults(),
            methods,
        }
    }

    pub fn options(&self) -> &TranslatorOptions {
        &self.options
    }

    pub fn patterns_mut(&mut self) -> &mut PatternRegistry {
        &mut self.patterns
    }

    pub fn methods_mut(&mut self) -> &mut MethodRegistry {
        &mut self.methods
    }

    /// Translate business rules to Python. Never panics.
    pub fn translate(&self, business_rules: &str) -> TranslationResult {
        let source = business_rules.strip_prefix('\u{FEFF}').unwrap_or(business_rules);

        let generated = panic::catch_unwind(AssertUnwindSafe(|| {
            let ctx = LoweringContext::new(&self.patterns, &self.methods, &self.options);
            generate_python(source, ctx)
        }));
        let generated = match generated {
            Ok(generated) => generated,
            Err(payload) => {
                let err = TranspileError::Critical(panic_message(payload.as_ref()));
                error!(error = %err, "translation aborted");
                return TranslationResult::critical(&err);
            }
        };

        let mut warnings = generated.warnings;
        let source_map = if self.options.generate_source_map {
            Some(build_source_map(
                source,
                &generated.python_code,
                &generated.transformations,
                generated.import_lines,
                &mut warnings,
            ))
        } else {
            None
        };

        debug!(errors = generated.errors.len(), warnings = warnings.len(), "translation finished");
        TranslationResult {
            success: generated.errors.is_empty(),
            python_code: generated.python_code,
            errors: generated.errors,
            warnings,
            source_map,
        }
    }
}

/// Enhanced map, or the line-by-line fallback plus a warning
fn build_source_map(
    source: &str,
    python_code: &str,
    transformations: &[TransformationMetadata],
    import_lines: usize,
    warnings: &mut Vec<String>,
) -> EnhancedSourceMap {
    let built = panic::catch_unwind(AssertUnwindSafe(|| {
        generate_enhanced_source_map(source, python_code, transformations, import_lines)
    }));
    match built {
        Ok(Ok(map)) => map,
        Ok(Err(err)) => {
            warn!(error = %err, "enhanced source map failed, using fallback");
            warnings.push(format!("Source map fallback: {}", err));
            fallback_source_map(source, python_code, import_lines)
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            warn!(error = %message, "enhanced source map panicked, using fallback");
            warnings.push(format!("Source map fallback: {}", message));
            fallback_source_map(source, python_code, import_lines)
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Translate with default options and the built-in method table
pub fn translate(business_rules: &str) -> TranslationResult {
    Translator::default().translate(business_rules)
}
