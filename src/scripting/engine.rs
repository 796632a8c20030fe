/// `scripting/engine.rs` — Lua VM handle used by the host
///
/// `ScriptEngine` owns one restricted VM plus the operand stack that host
/// code exchanges values through. Low-level adapters document their net
/// stack effect; the high-level entries (`load_prelude`, `load_functions`,
/// `call`) run under a `StackGuard` and must leave the stack as they found
/// it. Keep one engine per audio thread; it is not meant to be shared.
use mlua::{FromLuaMulti, Function, IntoLuaMulti, Lua, Result as LuaResult, Value};

use super::{
    config::SandboxConfig,
    error::ScriptError,
    loader::{self, ParsedFunctions},
    prelude,
    sandbox::{self, create_host_vm},
    stack::{StackDepth, StackGuard, StackImbalance},
};

pub struct ScriptEngine {
    lua: Lua,
    config: SandboxConfig,
    stack: Vec<Value>,
    imbalances: Vec<StackImbalance>,
}

impl ScriptEngine {
    pub fn new(config: SandboxConfig) -> LuaResult<Self> {
        Ok(Self {
            lua: create_host_vm()?,
            config,
            stack: Vec::new(),
            imbalances: Vec::new(),
        })
    }

    pub fn with_defaults() -> LuaResult<Self> {
        Self::new(SandboxConfig::default())
    }

    pub fn lua(&self) -> &Lua {
        &self.lua
    }

    pub fn config(&self) -> &SandboxConfig {
        &self.config
    }

    /// Imbalances caught by guards so far, oldest first.
    pub fn stack_imbalances(&self) -> &[StackImbalance] {
        &self.imbalances
    }

    // ── Operand stack ─────────────────────────────────────────────────────

    pub fn push(&mut self, value: Value) {
        self.stack.push(value);
    }

    pub fn pop(&mut self) -> Option<Value> {
        self.stack.pop()
    }

    pub fn top(&self) -> Option<&Value> {
        self.stack.last()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    // ── Boundary adapters ─────────────────────────────────────────────────

    /// Compile `source` and push one value per requested name, in request
    /// order: the function, or nil when the name did not resolve or the
    /// script failed. Net stack effect: `+names.len()`.
    pub fn push_functions(&mut self, source: &str, names: &[&str]) -> ParsedFunctions {
        let parsed = loader::parse_multiple_functions(&self.lua, source, names);
        for slot in &parsed.functions {
            self.stack
                .push(slot.clone().map(Value::Function).unwrap_or(Value::Nil));
        }
        parsed
    }

    /// Bind a sandbox environment to the function on top of the stack.
    ///
    /// The wrapped function stays in place (net stack effect 0). Returns
    /// `Ok(false)` without changes when the top is not a function.
    pub fn wrap_top(&mut self) -> LuaResult<bool> {
        match self.stack.last() {
            Some(value) => sandbox::set_function_environment(&self.lua, value, &self.config),
            None => Ok(false),
        }
    }

    // ── Host entries ──────────────────────────────────────────────────────

    /// Load the bundled prelude under `config.prelude_global`.
    pub fn load_prelude(&mut self) -> Result<(), ScriptError> {
        let engine = StackGuard::new("load_prelude", self);
        prelude::load_prelude(&engine.lua, &engine.config.prelude_global)
    }

    /// Compile `source` and return every requested name that resolved to a
    /// function, already wrapped in its own sandbox environment.
    ///
    /// Names that are absent (or bound to non-functions) are left out of the
    /// result; compile and top-level evaluation failures are returned as
    /// errors.
    pub fn load_functions(
        &mut self,
        source: &str,
        names: &[&str],
    ) -> Result<Vec<(String, Function)>, ScriptError> {
        let mut engine = StackGuard::new("load_functions", self);
        let parsed = engine.push_functions(source, names);

        let mut loaded = Vec::with_capacity(parsed.resolved);
        let mut failure = parsed.error;
        for name in names.iter().rev() {
            if failure.is_none() {
                if let Err(e) = engine.wrap_top() {
                    failure = Some(e.into());
                }
            }
            if let Some(Value::Function(f)) = engine.pop() {
                loaded.push((name.to_string(), f));
            }
        }

        if let Some(err) = failure {
            return Err(err);
        }
        loaded.reverse();
        log::debug!(
            "[script] loaded {} of {} requested functions",
            loaded.len(),
            names.len()
        );
        Ok(loaded)
    }

    /// Single-function form of `load_functions`.
    pub fn load_function(&mut self, source: &str, name: &str) -> Result<Function, ScriptError> {
        self.load_functions(source, &[name])?
            .pop()
            .map(|(_, f)| f)
            .ok_or_else(|| ScriptError::MissingFunction {
                name: name.to_string(),
            })
    }

    /// Invoke a previously loaded function.
    pub fn call<R: FromLuaMulti>(
        &mut self,
        function: &Function,
        args: impl IntoLuaMulti,
    ) -> Result<R, ScriptError> {
        let _engine = StackGuard::new("call", self);
        function.call(args).map_err(ScriptError::from)
    }
}

impl StackDepth for ScriptEngine {
    fn stack_depth(&self) -> usize {
        self.depth()
    }

    fn report_imbalance(&mut self, imbalance: StackImbalance) {
        log::warn!("{imbalance}");
        self.imbalances.push(imbalance);
    }
}
