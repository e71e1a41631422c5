//! Transpiler State Management
//!
//! Per-run state shared by the orchestrator, the single-line translator and
//! the transformation patterns. Everything here is created fresh for each
//! translation; the registries it points at are read-only.

use std::collections::BTreeSet;

use crate::config::TranslatorOptions;
use crate::lowering::pattern_registry::PatternRegistry;
use crate::method_schema::MethodRegistry;
use crate::source_map::MappingType;

/// Imports discovered while lowering method invocations
///
/// Both sets are ordered so the import block is identical across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequiredImports {
    pub std_imports: BTreeSet<String>,
    pub helper_modules: BTreeSet<String>,
}

impl RequiredImports {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.std_imports.is_empty() && self.helper_modules.is_empty()
    }

    /// Import statements, standard library first, then helper modules
    pub fn render(&self) -> Vec<String> {
        self.std_imports
            .iter()
            .chain(self.helper_modules.iter())
            .map(|module| format!("import {}", module))
            .collect()
    }
}

/// One generated line together with the business line it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedLine {
    pub text: String,
    /// 1-based; `None` for lines with no business counterpart
    pub business_line: Option<usize>,
    pub kind: MappingType,
}

impl EmittedLine {
    pub fn new(text: impl Into<String>, business_line: usize, kind: MappingType) -> Self {
        EmittedLine {
            text: text.into(),
            business_line: Some(business_line),
            kind,
        }
    }

    pub fn direct(text: impl Into<String>, business_line: usize) -> Self {
        Self::new(text, business_line, MappingType::Direct)
    }

    pub fn blank() -> Self {
        EmittedLine {
            text: String::new(),
            business_line: None,
            kind: MappingType::Direct,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Context threaded through one translation run
pub struct LoweringContext<'a> {
    pub registry: &'a PatternRegistry,
    pub methods: &'a MethodRegistry,
    pub options: &'a TranslatorOptions,
    pub imports: RequiredImports,
    pub warnings: Vec<String>,
    /// Current `if any` nesting depth
    pub depth: usize,
}

impl<'a> LoweringContext<'a> {
    pub fn new(registry: &'a PatternRegistry, methods: &'a MethodRegistry, options: &'a TranslatorOptions) -> Self {
        LoweringContext {
            registry,
            methods,
            options,
            imports: RequiredImports::new(),
            warnings: Vec::new(),
            depth: 0,
        }
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }
}
