//! Translation Module
//!
//! Single-line rewrites from the rules language to Python.

// Expression translations
pub mod condition_translate;
pub mod method_call_translate;

// Line dispatch
pub mod line_translate;

pub use condition_translate::translate_condition;
pub use line_translate::{translate_line, LineTranslation};
pub use method_call_translate::{parse_method_invocation, split_arguments, translate_method_invocation};
