//! Lowering Module
//!
//! Multi-line constructs: the pattern registry, the patterns it dispatches
//! to, and the look-ahead scans they rely on.

// Look-ahead utilities
pub mod lookahead_lowering;

// Pattern dispatch
pub mod pattern_registry;

// Patterns
pub mod if_any_lowering;
pub mod nested_block_lowering;

// Re-exports for convenience
pub use if_any_lowering::{lower_if_any, parse_if_any, IfAnyClause, IfAnyPattern};
pub use lookahead_lowering::{find_block_end, find_matching_else, pairs_with_if_any, scan_if_any_block, IfAnyExtent};
pub use nested_block_lowering::lower_nested_block;
pub use pattern_registry::{PatternRegistry, TransformationPattern, TransformationResult};
