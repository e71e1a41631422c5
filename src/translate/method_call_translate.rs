//! Method Invocation Translation
//!
//! Lowers the right-hand side of `result = owner.method(args)` (or the
//! property form `result = owner.method`) through the method schema registry.
//! Anything not recognized is left for the caller to pass through unchanged.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::method_schema::{DebugContext, MethodParams, MethodSchema};
use crate::transpiler_state::LoweringContext;

static CALL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z_]\w*(?:\.[A-Za-z_]\w*)*)\.([A-Za-z_]\w*)\s*\((.*)\)$").unwrap());
static PROPERTY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z_]\w*(?:\.[A-Za-z_]\w*)*)\.([A-Za-z_]\w*)$").unwrap());

/// `owner.method(arguments)` split into its parts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodInvocation<'a> {
    /// Dotted identifier path before the method name
    pub owner: &'a str,
    pub method: &'a str,
    pub arguments: Vec<String>,
}

pub fn parse_method_invocation(rhs: &str) -> Option<MethodInvocation<'_>> {
    let rhs = rhs.trim();

    if let Some(caps) = CALL_RE.captures(rhs) {
        let owner = caps.get(1)?.as_str();
        let method = caps.get(2)?.as_str();
        // `a.f(x).g(y)` matches the regex with `x).g(y` as arguments
        let arguments = split_arguments(caps.get(3)?.as_str())?;
        return Some(MethodInvocation { owner, method, arguments });
    }

    let caps = PROPERTY_RE.captures(rhs)?;
    Some(MethodInvocation {
        owner: caps.get(1)?.as_str(),
        method: caps.get(2)?.as_str(),
        arguments: Vec::new(),
    })
}

/// Split an argument list on top-level commas
///
/// Commas inside quotes or nested brackets do not split. Returns `None` when
/// the brackets do not balance.
pub fn split_arguments(args: &str) -> Option<Vec<String>> {
    if args.trim().is_empty() {
        return Some(Vec::new());
    }

    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth: usize = 0;
    let mut quote: Option<char> = None;
    let mut escape_next = false;

    for c in args.chars() {
        if escape_next {
            escape_next = false;
            current.push(c);
            continue;
        }
        if let Some(q) = quote {
            if c == '\\' {
                escape_next = true;
            } else if c == q {
                quote = None;
            }
            current.push(c);
            continue;
        }

        match c {
            '"' | '\'' => {
                quote = Some(c);
                current.push(c);
            }
            '(' | '[' | '{' => {
                depth += 1;
                current.push(c);
            }
            ')' | ']' | '}' => {
                depth = depth.checked_sub(1)?;
                current.push(c);
            }
            ',' if depth == 0 => {
                parts.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }

    if depth != 0 || quote.is_some() {
        return None;
    }
    parts.push(current.trim().to_string());
    Some(parts)
}

/// Bind positional arguments to declared parameter names, `argN` past the end
pub fn bind_parameters(schema: &MethodSchema, arguments: Vec<String>) -> MethodParams {
    arguments
        .into_iter()
        .enumerate()
        .map(|(i, value)| {
            let name = schema
                .parameters
                .get(i)
                .cloned()
                .unwrap_or_else(|| format!("arg{}", i + 1));
            (name, value)
        })
        .collect()
}

/// Lower `lhs = rhs` through the method registry
///
/// Returns the generated statement without indentation, or `None` when the
/// right-hand side is not a known method or its generator fails. Imports the
/// method needs are added to `ctx.imports` only on success.
pub fn translate_method_invocation(
    lhs: &str,
    rhs: &str,
    business_line: usize,
    ctx: &mut LoweringContext<'_>,
) -> Option<String> {
    let invocation = parse_method_invocation(rhs)?;
    let methods = ctx.methods;
    let schema = methods.get(invocation.method)?;
    let generator = schema.generator.as_ref()?;

    let debug_ctx = DebugContext {
        business_line,
        method: invocation.method.to_string(),
        strict_mode: ctx.options.strict_mode,
    };
    let params = bind_parameters(schema, invocation.arguments);

    match generator(invocation.owner, lhs, &params, &debug_ctx) {
        Ok(code) => {
            ctx.imports.std_imports.extend(schema.imports.iter().cloned());
            if let Some(module) = schema.helper_module() {
                ctx.imports.helper_modules.insert(module.to_string());
            }
            debug!(method = invocation.method, line = business_line, "method lowered");
            Some(code)
        }
        Err(err) => {
            warn!(method = invocation.method, line = business_line, error = %err, "method generator failed");
            ctx.warn(format!("Line {}: `{}` left untranslated: {}", business_line, rhs.trim(), err));
            None
        }
    }
}
