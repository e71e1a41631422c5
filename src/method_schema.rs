//! Method Schema Registry
//!
//! Maps a method name to the descriptor used to lower `owner.method(args)`
//! assignments: declared parameters, a code generator, required standard
//! library imports and an optional helper function.
//!
//! The registry is built once and only read during translation, so one
//! instance can be shared by every `Translator`.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error_msg::TranspileError;

/// Positional arguments bound to parameter names, in call order
pub type MethodParams = IndexMap<String, String>;

/// `(owner, result_var, params, debug) -> generated statement`
pub type CodeGenerator =
    Arc<dyn Fn(&str, &str, &MethodParams, &DebugContext) -> Result<String, TranspileError> + Send + Sync>;

/// Call-site information handed to generators
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugContext {
    /// 1-based business line of the assignment
    pub business_line: usize,
    pub method: String,
    pub strict_mode: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DebugInfo {
    /// Dotted path of the runtime helper, e.g. `rule_helpers.log_message`.
    /// The first segment is imported as a module.
    pub helper_function: Option<String>,
    pub description: Option<String>,
}

impl DebugInfo {
    pub fn helper_module(&self) -> Option<&str> {
        self.helper_function
            .as_deref()
            .and_then(|path| path.split('.').next())
            .filter(|module| !module.is_empty())
    }
}

#[derive(Clone)]
pub struct MethodSchema {
    pub name: String,
    pub parameters: Vec<String>,
    pub generator: Option<CodeGenerator>,
    pub imports: Vec<String>,
    pub debug_info: Option<DebugInfo>,
}

impl fmt::Debug for MethodSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodSchema")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .field("generator", &self.generator.as_ref().map(|_| "<fn>"))
            .field("imports", &self.imports)
            .field("debug_info", &self.debug_info)
            .finish()
    }
}

impl MethodSchema {
    pub fn new(name: impl Into<String>) -> Self {
        MethodSchema {
            name: name.into(),
            parameters: Vec::new(),
            generator: None,
            imports: Vec::new(),
            debug_info: None,
        }
    }

    pub fn params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parameters = params.into_iter().map(Into::into).collect();
        self
    }

    pub fn imports<I, S>(mut self, imports: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.imports = imports.into_iter().map(Into::into).collect();
        self
    }

    pub fn helper(mut self, helper_function: impl Into<String>) -> Self {
        let info = self.debug_info.get_or_insert_with(DebugInfo::default);
        info.helper_function = Some(helper_function.into());
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        let info = self.debug_info.get_or_insert_with(DebugInfo::default);
        info.description = Some(description.into());
        self
    }

    pub fn generator<F>(mut self, generator: F) -> Self
    where
        F: Fn(&str, &str, &MethodParams, &DebugContext) -> Result<String, TranspileError> + Send + Sync + 'static,
    {
        self.generator = Some(Arc::new(generator));
        self
    }

    pub fn helper_module(&self) -> Option<&str> {
        self.debug_info.as_ref().and_then(DebugInfo::helper_module)
    }
}

/// Registry of method schemas, keyed by method name
#[derive(Debug, Clone, Default)]
pub struct MethodRegistry {
    schemas: HashMap<String, MethodSchema>,
}

impl MethodRegistry {
    pub fn new() -> Self {
        MethodRegistry {
            schemas: HashMap::new(),
        }
    }

    /// Registry populated from the built-in method table
    pub fn builtin() -> Self {
        let mut registry = MethodRegistry::new();
        for schema in builtin_schemas() {
            registry.register(schema);
        }
        registry
    }

    /// Register a schema, replacing any previous one with the same name
    pub fn register(&mut self, schema: MethodSchema) {
        self.schemas.insert(schema.name.clone(), schema);
    }

    pub fn get(&self, method: &str) -> Option<&MethodSchema> {
        self.schemas.get(method)
    }

    pub fn contains(&self, method: &str) -> bool {
        self.schemas.contains_key(method)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

//=============================================================================
// BUILT-IN METHOD TABLE
//=============================================================================

fn required<'a>(params: &'a MethodParams, debug: &DebugContext, name: &str) -> Result<&'a str, TranspileError> {
    params
        .get(name)
        .map(String::as_str)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| TranspileError::MissingArgument {
            method: debug.method.clone(),
            parameter: name.to_string(),
        })
}

/// `2`, `-1` or a variable such as `precision`
fn is_whole_number_or_name(value: &str) -> bool {
    if value.parse::<i64>().is_ok() {
        return true;
    }
    let mut chars = value.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

fn builtin_schemas() -> Vec<MethodSchema> {
    vec![
        MethodSchema::new("count")
            .describe("number of elements in a collection")
            .generator(|owner, result, _, _| Ok(format!("{} = len({})", result, owner))),
        MethodSchema::new("sum")
            .describe("sum of a numeric collection")
            .generator(|owner, result, _, _| Ok(format!("{} = sum({})", result, owner))),
        MethodSchema::new("contains")
            .params(["item"])
            .describe("membership test")
            .generator(|owner, result, params, debug| {
                let item = required(params, debug, "item")?;
                Ok(format!("{} = {} in {}", result, item, owner))
            }),
        MethodSchema::new("round")
            .params(["digits"])
            .describe("round to a number of decimal places")
            .generator(|owner, result, params, debug| {
                match params.get("digits").map(|d| d.trim()).filter(|d| !d.is_empty()) {
                    Some(digits) if is_whole_number_or_name(digits) => {
                        Ok(format!("{} = round({}, {})", result, owner, digits))
                    }
                    Some(digits) => Err(TranspileError::MethodGeneration {
                        method: debug.method.clone(),
                        reason: format!("digits must be a whole number or a name, got `{}`", digits),
                    }),
                    None => Ok(format!("{} = round({})", result, owner)),
                }
            }),
        MethodSchema::new("upper")
            .generator(|owner, result, _, _| Ok(format!("{} = {}.upper()", result, owner))),
        MethodSchema::new("lower")
            .generator(|owner, result, _, _| Ok(format!("{} = {}.lower()", result, owner))),
        MethodSchema::new("now")
            .imports(["datetime"])
            .describe("current timestamp")
            .generator(|_, result, _, _| Ok(format!("{} = datetime.datetime.now()", result))),
        MethodSchema::new("addDays")
            .params(["days"])
            .imports(["datetime"])
            .describe("shift a date by a number of days")
            .generator(|owner, result, params, debug| {
                let days = required(params, debug, "days")?;
                Ok(format!("{} = {} + datetime.timedelta(days={})", result, owner, days))
            }),
        MethodSchema::new("log")
            .params(["message"])
            .helper("rule_helpers.log_message")
            .describe("record a message in the rule trace")
            .generator(|_, result, params, debug| {
                let message = required(params, debug, "message")?;
                Ok(format!("{} = rule_helpers.log_message({})", result, message))
            }),
        MethodSchema::new("lookup")
            .params(["table", "key"])
            .helper("rule_helpers.lookup")
            .describe("read a value from a reference table")
            .generator(|owner, result, params, debug| {
                let table = required(params, debug, "table")?;
                let key = required(params, debug, "key")?;
                Ok(format!("{} = rule_helpers.lookup({}, {}, {})", result, owner, table, key))
            }),
    ]
}
