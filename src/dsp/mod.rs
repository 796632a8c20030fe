/// `dsp/` — host-native numeric code exposed to scripts
///
/// Nothing here knows about Lua; `scripting::api` adapts these helpers into
/// script callables.
pub mod basic;
pub mod fft_cache;
