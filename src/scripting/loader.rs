/// `scripting/loader.rs` — compile script text and pull out named functions
///
/// The chunk is compiled and its top-level body run once in the host VM's
/// global table. Every requested name is then looked up independently:
///   function → resolved, left in place as a global
///   nil      → skipped
///   other    → the global is cleared to nil so it cannot be called by mistake
use mlua::{Function, Lua, Value};

use super::error::{Diagnostic, ScriptError};

/// Chunk name used for user scripts; shows up in error messages as
/// `[string "lua-script"]:<line>:`.
pub const SCRIPT_CHUNK_NAME: &str = "lua-script";

/// Result of `parse_multiple_functions`.
///
/// `functions` is aligned with the requested names. On error every slot is
/// `None` and `resolved` is 0.
#[derive(Debug)]
pub struct ParsedFunctions {
    pub resolved: usize,
    pub functions: Vec<Option<Function>>,
    pub error: Option<ScriptError>,
}

impl ParsedFunctions {
    fn failed(requested: usize, error: ScriptError) -> Self {
        Self {
            resolved: 0,
            functions: vec![None; requested],
            error: Some(error),
        }
    }

    pub fn diagnostic(&self) -> Option<Diagnostic> {
        self.error.as_ref().map(ScriptError::diagnostic)
    }

    /// Error message for hosts that only display text; empty on success.
    pub fn error_message(&self) -> String {
        self.error
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default()
    }
}

pub fn parse_multiple_functions(lua: &Lua, source: &str, names: &[&str]) -> ParsedFunctions {
    let chunk = match lua
        .load(source)
        .set_name(SCRIPT_CHUNK_NAME)
        .into_function()
    {
        Ok(f) => f,
        Err(e) => {
            let err = ScriptError::from_compile(e);
            log::warn!("[script] {err}");
            return ParsedFunctions::failed(names.len(), err);
        }
    };

    if let Err(e) = chunk.call::<()>(()) {
        let err = ScriptError::from_evaluation(e);
        log::warn!("[script] {err}");
        return ParsedFunctions::failed(names.len(), err);
    }

    let globals = lua.globals();
    let mut resolved = 0;
    let mut functions = Vec::with_capacity(names.len());
    for name in names {
        let slot = match globals.get::<Value>(*name) {
            Ok(Value::Function(f)) => {
                resolved += 1;
                Some(f)
            }
            Ok(Value::Nil) => None,
            Ok(other) => {
                log::debug!(
                    "[script] global `{name}` is a {}, not a function; clearing it",
                    other.type_name()
                );
                if let Err(e) = globals.set(*name, Value::Nil) {
                    log::warn!("[script] failed to clear global `{name}`: {e}");
                }
                None
            }
            // A raising __index on the globals table; treat as undefined.
            Err(e) => {
                log::warn!("[script] lookup of `{name}` failed: {e}");
                None
            }
        };
        functions.push(slot);
    }

    ParsedFunctions {
        resolved,
        functions,
        error: None,
    }
}

/// Single-function form: succeeds only if `name` resolved to a function.
pub fn parse_function(lua: &Lua, source: &str, name: &str) -> Result<Function, ScriptError> {
    let parsed = parse_multiple_functions(lua, source, &[name]);
    if let Some(err) = parsed.error {
        return Err(err);
    }
    parsed
        .functions
        .into_iter()
        .next()
        .flatten()
        .ok_or_else(|| ScriptError::MissingFunction {
            name: name.to_string(),
        })
}
