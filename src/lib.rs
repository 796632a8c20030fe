pub mod dsp;
pub mod scripting;

pub use scripting::{
    config::SandboxConfig,
    engine::ScriptEngine,
    error::{Diagnostic, ErrorKind, PrimitiveError, ScriptError},
    loader::{parse_function, parse_multiple_functions, ParsedFunctions},
    prelude::prelude_source,
    sandbox::set_function_environment,
    stack::{StackDepth, StackGuard, StackImbalance},
};
