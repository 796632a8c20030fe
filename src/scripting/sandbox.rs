/// `scripting/sandbox.rs` — per-function restricted environments
///
/// The host VM is created with a restricted set of standard libraries
/// (no io, os, package, debug). On top of that, every function handed to the
/// host gets its own environment table holding only the configured library
/// tables, whitelisted globals, host primitives and the flattened math
/// library. Anything else living in the VM's globals is unreachable from it.
use mlua::{Function, Lua, LuaOptions, Result as LuaResult, StdLib, Table, Value};

use super::{api, config::SandboxConfig};

/// Creates the VM that scripts are compiled in.
pub fn create_host_vm() -> LuaResult<Lua> {
    Lua::new_with(
        StdLib::TABLE | StdLib::STRING | StdLib::MATH | StdLib::COROUTINE,
        LuaOptions::default(),
    )
}

/// Build a fresh environment table from the VM's current globals.
pub fn build_environment(lua: &Lua, config: &SandboxConfig) -> LuaResult<Table> {
    let globals = lua.globals();
    let env = lua.create_table_with_capacity(0, 10)?;

    for name in config
        .shared_tables
        .iter()
        .chain(config.global_whitelist.iter())
    {
        env.set(name.as_str(), globals.get::<Value>(name.as_str())?)?;
    }

    api::register_all(lua, &env)?;

    if let Some(flat) = &config.flattened_table {
        if let Value::Table(lib) = globals.get::<Value>(flat.as_str())? {
            for pair in lib.pairs::<Value, Value>() {
                let (k, v) = pair?;
                env.set(k, v)?;
            }
        }
    }

    Ok(env)
}

/// Bind a fresh environment to `value` if it is a function.
///
/// Returns `Ok(false)` without touching anything when `value` is not a
/// function. Only this function's `_ENV` is rebound; other closures from the
/// same chunk keep theirs.
pub fn set_function_environment(
    lua: &Lua,
    value: &Value,
    config: &SandboxConfig,
) -> LuaResult<bool> {
    let Value::Function(func) = value else {
        return Ok(false);
    };
    wrap_function(lua, func, config)?;
    Ok(true)
}

pub fn wrap_function(lua: &Lua, func: &Function, config: &SandboxConfig) -> LuaResult<()> {
    let env = build_environment(lua, config)?;
    // `false` means the function never reads a global, so there is no
    // `_ENV` to rebind and nothing to restrict.
    if !func.set_environment(env)? {
        log::debug!("[sandbox] function has no _ENV upvalue; left as is");
    }
    Ok(())
}
