/// `scripting/` — sandboxed Lua function loading
///
/// Script text is compiled in one restricted VM per `ScriptEngine`.
/// Each extracted function gets a private environment exposing only math,
/// the prelude library, a few whitelisted globals and the host primitives.
/// Script errors are returned as diagnostics; they never unwind into the host.
pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod loader;
pub mod prelude;
pub mod sandbox;
pub mod stack;
