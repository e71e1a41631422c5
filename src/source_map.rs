//! Source Map - Maps generated Python lines back to business-rule lines
//!
//! The map is built after generation from three inputs: the business source,
//! the generated code, and the `TransformationMetadata` recorded whenever a
//! multi-line pattern fired.
//!
//! ## Building steps
//!
//! 1. Lines inside any transformation's ranges are claimed.
//! 2. Special mappings from transformations are copied verbatim.
//! 3. Unclaimed lines get direct 1:1 mappings at confidence 1.0. A business
//!    line `b` is aligned with python line `b + offset`, where the offset is
//!    the import block plus the line-count growth of every transformation
//!    that ends before `b`. Lines after a multi-line transformation therefore
//!    keep confidence 1.0; pairing by equal line numbers alone would leave
//!    them to step 4 at 0.7.
//! 4. Lines still unmapped are paired positionally at confidence 0.7.
//! 5. Mappings are sorted by python line and deduplicated per
//!    (business, python) pair, keeping the highest confidence.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error_msg::SourceMapError;
use crate::helpers::{is_brace_only, is_comment};

pub const SOURCE_MAP_VERSION: &str = "enhanced-1";
pub const DIRECT_CONFIDENCE: f64 = 1.0;
pub const FALLBACK_CONFIDENCE: f64 = 0.7;

/// 1-based inclusive `[start, end]`
pub type LineRange = (usize, usize);

//=============================================================================
// DATA MODEL
//=============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MappingType {
    Direct,
    BreakStatement,
    ElseClause,
    LoopHeader,
    Condition,
    ExceptionHandler,
    Generated,
}

impl MappingType {
    /// Confidence used when a pattern emits a line of this kind
    pub fn default_confidence(self) -> f64 {
        match self {
            MappingType::BreakStatement => 0.9,
            MappingType::Generated => 0.8,
            _ => DIRECT_CONFIDENCE,
        }
    }
}

/// One business line ↔ python line correspondence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMapping {
    pub business_line: usize,
    pub python_line: usize,
    #[serde(rename = "type")]
    pub mapping_type: MappingType,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Mapping supplied by a transformation pattern for synthetic lines
pub type SpecialMapping = SourceMapping;

impl SourceMapping {
    pub fn new(business_line: usize, python_line: usize, mapping_type: MappingType, confidence: f64) -> Self {
        SourceMapping {
            business_line,
            python_line,
            mapping_type,
            confidence,
            description: None,
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Record of one multi-line transformation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformationMetadata {
    #[serde(rename = "type")]
    pub kind: String,
    pub business_line_range: LineRange,
    /// Relative to the producing block until `shift_python_lines` rebases it
    pub python_line_range: LineRange,
    pub special_mappings: Vec<SpecialMapping>,
    pub context: Map<String, Value>,
}

impl TransformationMetadata {
    pub fn new(kind: impl Into<String>, business_line_range: LineRange) -> Self {
        TransformationMetadata {
            kind: kind.into(),
            business_line_range,
            python_line_range: (0, 0),
            special_mappings: Vec::new(),
            context: Map::new(),
        }
    }

    pub fn with_context(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.context.insert(key.to_string(), value.into());
        self
    }

    /// Move the python range and every special mapping down by `offset` lines
    pub fn shift_python_lines(&mut self, offset: usize) {
        self.python_line_range.0 += offset;
        self.python_line_range.1 += offset;
        for mapping in &mut self.special_mappings {
            mapping.python_line += offset;
        }
    }

    fn business_len(&self) -> usize {
        self.business_line_range.1 + 1 - self.business_line_range.0
    }

    fn python_len(&self) -> usize {
        self.python_line_range.1 + 1 - self.python_line_range.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancedSourceMap {
    pub version: String,
    pub mappings: Vec<SourceMapping>,
    pub transformations: Vec<TransformationMetadata>,
    pub business_lines: Vec<String>,
    pub python_lines: Vec<String>,
}

//=============================================================================
// GENERATION
//=============================================================================

/// Build the enhanced source map for one translation
///
/// `import_lines` is the number of lines prepended before the first
/// translated line (imports plus separator); they never map to business code.
pub fn generate_enhanced_source_map(
    business_code: &str,
    python_code: &str,
    transformations: &[TransformationMetadata],
    import_lines: usize,
) -> Result<EnhancedSourceMap, SourceMapError> {
    let business_lines: Vec<&str> = business_code.lines().collect();
    let python_lines: Vec<&str> = python_code.lines().collect();
    validate_ranges(transformations, business_lines.len(), python_lines.len())?;

    // Indexed by 1-based line number; slot 0 unused
    let mut business_claimed = vec![false; business_lines.len() + 1];
    let mut python_claimed = vec![false; python_lines.len() + 1];
    for transformation in transformations {
        let (start, end) = transformation.business_line_range;
        business_claimed[start..=end].iter_mut().for_each(|c| *c = true);
        let (start, end) = transformation.python_line_range;
        python_claimed[start..=end].iter_mut().for_each(|c| *c = true);
    }
    let import_end = import_lines.min(python_lines.len());
    python_claimed[1..=import_end].iter_mut().for_each(|c| *c = true);

    let mut mappings: Vec<SourceMapping> = transformations
        .iter()
        .flat_map(|t| t.special_mappings.iter().cloned())
        .collect();

    let mut business_mapped = vec![false; business_lines.len() + 1];
    let mut python_mapped = vec![false; python_lines.len() + 1];

    for business_line in 1..=business_lines.len() {
        if business_claimed[business_line] {
            continue;
        }
        let Some(python_line) = aligned_python_line(business_line, transformations, import_lines) else {
            continue;
        };
        if python_line > python_lines.len() || python_claimed[python_line] || python_mapped[python_line] {
            continue;
        }

        let source = business_lines[business_line - 1].trim();
        let generated = python_lines[python_line - 1].trim();
        if source.is_empty() || generated.is_empty() {
            continue;
        }

        let mut mapping = SourceMapping::new(business_line, python_line, MappingType::Direct, DIRECT_CONFIDENCE);
        if is_comment(source) || generated.starts_with('#') {
            mapping = mapping.describe("comment line");
        }
        mappings.push(mapping);
        business_mapped[business_line] = true;
        python_mapped[python_line] = true;
    }

    let leftover_business = (1..=business_lines.len()).filter(|&line| {
        let text = business_lines[line - 1].trim();
        !business_claimed[line] && !business_mapped[line] && !text.is_empty() && !is_brace_only(text)
    });
    let leftover_python = (1..=python_lines.len()).filter(|&line| {
        !python_claimed[line] && !python_mapped[line] && !python_lines[line - 1].trim().is_empty()
    });
    for (business_line, python_line) in leftover_business.zip(leftover_python) {
        mappings.push(
            SourceMapping::new(business_line, python_line, MappingType::Direct, FALLBACK_CONFIDENCE)
                .describe("fallback mapping"),
        );
    }

    Ok(EnhancedSourceMap {
        version: SOURCE_MAP_VERSION.to_string(),
        mappings: dedupe_mappings(mappings),
        transformations: transformations.to_vec(),
        business_lines: business_lines.iter().map(|l| l.to_string()).collect(),
        python_lines: python_lines.iter().map(|l| l.to_string()).collect(),
    })
}

/// Line-by-line map used when the enhanced map cannot be built
pub fn fallback_source_map(business_code: &str, python_code: &str, import_lines: usize) -> EnhancedSourceMap {
    let business_lines: Vec<&str> = business_code.lines().collect();
    let python_lines: Vec<&str> = python_code.lines().collect();

    let mappings = business_lines
        .iter()
        .enumerate()
        .filter_map(|(i, source)| {
            let python_line = i + 1 + import_lines;
            let generated = python_lines.get(python_line - 1)?;
            if source.trim().is_empty() || generated.trim().is_empty() {
                return None;
            }
            Some(
                SourceMapping::new(i + 1, python_line, MappingType::Direct, FALLBACK_CONFIDENCE)
                    .describe("line-by-line fallback"),
            )
        })
        .collect();

    EnhancedSourceMap {
        version: SOURCE_MAP_VERSION.to_string(),
        mappings,
        transformations: Vec::new(),
        business_lines: business_lines.iter().map(|l| l.to_string()).collect(),
        python_lines: python_lines.iter().map(|l| l.to_string()).collect(),
    }
}

fn validate_ranges(
    transformations: &[TransformationMetadata],
    business_len: usize,
    python_len: usize,
) -> Result<(), SourceMapError> {
    for t in transformations {
        for (side, (start, end)) in [("business", t.business_line_range), ("python", t.python_line_range)] {
            if start == 0 || start > end {
                return Err(SourceMapError::InvertedRange {
                    kind: t.kind.clone(),
                    side,
                    start,
                    end,
                });
            }
        }
        let (start, end) = t.business_line_range;
        if end > business_len {
            return Err(SourceMapError::BusinessRangeOutOfBounds {
                kind: t.kind.clone(),
                start,
                end,
                available: business_len,
            });
        }
        let (start, end) = t.python_line_range;
        if end > python_len {
            return Err(SourceMapError::PythonRangeOutOfBounds {
                kind: t.kind.clone(),
                start,
                end,
                available: python_len,
            });
        }
    }
    Ok(())
}

/// Python line for an unclaimed business line, shifted past imports and growth
fn aligned_python_line(business_line: usize, transformations: &[TransformationMetadata], import_lines: usize) -> Option<usize> {
    let mut line = (business_line + import_lines) as isize;
    for t in transformations.iter().filter(|t| t.business_line_range.1 < business_line) {
        line += t.python_len() as isize - t.business_len() as isize;
    }
    usize::try_from(line).ok().filter(|&l| l > 0)
}

fn dedupe_mappings(mut mappings: Vec<SourceMapping>) -> Vec<SourceMapping> {
    mappings.sort_by(|a, b| {
        a.python_line
            .cmp(&b.python_line)
            .then(a.business_line.cmp(&b.business_line))
            .then(b.confidence.total_cmp(&a.confidence))
    });
    mappings.dedup_by(|later, kept| later.python_line == kept.python_line && later.business_line == kept.business_line);
    mappings
}

//=============================================================================
// LOOKUPS
//=============================================================================

/// Highest-confidence mapping for a python line
pub fn find_business_line_for_python_line(python_line: usize, map: &EnhancedSourceMap) -> Option<&SourceMapping> {
    map.mappings
        .iter()
        .filter(|m| m.python_line == python_line)
        .fold(None, |best: Option<&SourceMapping>, m| match best {
            Some(b) if b.confidence >= m.confidence => Some(b),
            _ => Some(m),
        })
}

/// Every mapping for a business line, most confident first
pub fn find_python_line_for_business_line(business_line: usize, map: &EnhancedSourceMap) -> Vec<&SourceMapping> {
    let mut found: Vec<&SourceMapping> = map.mappings.iter().filter(|m| m.business_line == business_line).collect();
    found.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    found
}

impl EnhancedSourceMap {
    pub fn business_line_for(&self, python_line: usize) -> Option<&SourceMapping> {
        find_business_line_for_python_line(python_line, self)
    }

    pub fn python_lines_for(&self, business_line: usize) -> Vec<&SourceMapping> {
        find_python_line_for_business_line(business_line, self)
    }

    pub fn get_business_line(&self, line_num: usize) -> Option<&str> {
        self.business_lines.get(line_num.checked_sub(1)?).map(String::as_str)
    }

    /// Format a message raised at a python line with business-rule context
    pub fn format_context(&self, python_line: usize, message: &str) -> String {
        let mut output = format!("error: {}\n", message);

        let Some(mapping) = self.business_line_for(python_line) else {
            output.push_str(&format!("  --> python line {} (no business rule mapping)\n", python_line));
            return output;
        };
        let line = mapping.business_line;
        output.push_str(&format!("  --> business rule line {} (python line {})\n", line, python_line));

        // two lines either side
        let start = line.saturating_sub(2).max(1);
        let end = (line + 2).min(self.business_lines.len());
        for line_num in start..=end {
            let marker = if line_num == line { ">" } else { " " };
            let text = self.get_business_line(line_num).unwrap_or("");
            output.push_str(&format!("{} {:4} | {}\n", marker, line_num, text));
        }
        output
    }
}
