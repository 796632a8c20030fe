/// `scripting/prelude.rs` — bundled Lua library shared by sandboxed scripts
///
/// The prelude chunk returns a single table which is published as a global
/// (`dsp` by default), so the sandbox can copy it into every environment.
use mlua::{Lua, Value};

use super::error::ScriptError;

const PRELUDE_SOURCE: &str = include_str!("prelude.lua");
const PRELUDE_CHUNK_NAME: &str = "prelude";

/// Raw text of the bundled prelude.
pub fn prelude_source() -> &'static str {
    PRELUDE_SOURCE
}

/// Run the bundled prelude and publish its result as `global_name`.
pub fn load_prelude(lua: &Lua, global_name: &str) -> Result<(), ScriptError> {
    load_library(lua, global_name, PRELUDE_SOURCE)
}

/// Run `source` once and publish its single return value as `global_name`.
///
/// Nothing is published when compilation or evaluation fails.
pub fn load_library(lua: &Lua, global_name: &str, source: &str) -> Result<(), ScriptError> {
    let chunk = lua
        .load(source)
        .set_name(PRELUDE_CHUNK_NAME)
        .into_function()
        .map_err(ScriptError::from_compile)?;

    let library: Value = chunk.call(()).map_err(ScriptError::from_evaluation)?;
    lua.globals().set(global_name, library)?;
    log::debug!("[prelude] published `{global_name}`");
    Ok(())
}
