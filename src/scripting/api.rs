/// `scripting/api.rs` — host primitives callable from sandboxed scripts
///
///   limit_range(x, low, high) / clamp(x, low, high)
///   fft_forward(samples)      — real forward FFT, power-of-two lengths only
///   fft_inverse(...)          — declared, always raises NotImplemented
use std::sync::PoisonError;

use mlua::{Lua, Result as LuaResult, Table};

use crate::dsp::{
    basic::{is_power_of_two, limit_range},
    fft_cache,
};

use super::error::PrimitiveError;

pub const LIMIT_RANGE: &str = "limit_range";
pub const CLAMP: &str = "clamp";
pub const FFT_FORWARD: &str = "fft_forward";
pub const FFT_INVERSE: &str = "fft_inverse";

/// Every name `register_all` defines.
pub const PRIMITIVE_NAMES: [&str; 4] = [LIMIT_RANGE, CLAMP, FFT_FORWARD, FFT_INVERSE];

/// Register all host primitives into `target` (a sandbox environment or the
/// global table).
pub fn register_all(lua: &Lua, target: &Table) -> LuaResult<()> {
    register_limit_range(lua, target)?;
    register_fft(lua, target)?;
    Ok(())
}

// ── limit_range ──────────────────────────────────────────────────────────────

fn register_limit_range(lua: &Lua, target: &Table) -> LuaResult<()> {
    let f = lua.create_function(|_, (x, low, high): (f64, f64, f64)| {
        Ok(limit_range(x, low, high))
    })?;
    // Both names share one function value.
    target.set(LIMIT_RANGE, f.clone())?;
    target.set(CLAMP, f)?;
    Ok(())
}

// ── fft ──────────────────────────────────────────────────────────────────────

fn register_fft(lua: &Lua, target: &Table) -> LuaResult<()> {
    target.set(FFT_FORWARD, lua.create_function(fft_forward)?)?;
    target.set(
        FFT_INVERSE,
        lua.create_function(|_, _args: mlua::MultiValue| -> LuaResult<()> {
            Err(PrimitiveError::NotImplemented(FFT_INVERSE).into())
        })?,
    )?;
    Ok(())
}

fn fft_forward(lua: &Lua, input: Table) -> LuaResult<Table> {
    let n = input.raw_len();
    if !is_power_of_two(n) {
        return Err(PrimitiveError::InvalidArgument {
            function: FFT_FORWARD,
            reason: format!("FFT size must be a power of two, got {n}"),
        }
        .into());
    }

    let samples = (1..=n)
        .map(|i| input.raw_get::<f32>(i))
        .collect::<LuaResult<Vec<f32>>>()?;

    // The cache lock serialises access to the shared scratch buffers.
    let output = {
        let mut cache = fft_cache::global()
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        cache
            .get(n)
            .forward(&samples)
            .map_err(mlua::Error::external)?
    };

    lua.create_sequence_from(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lua_with_primitives() -> Lua {
        let lua = Lua::new();
        register_all(&lua, &lua.globals()).unwrap();
        lua
    }

    #[test]
    fn clamp_aliases_limit_range() {
        let lua = lua_with_primitives();
        let same: bool = lua.load("return clamp == limit_range").eval().unwrap();
        assert!(same);

        let (a, b, c): (f64, f64, f64) = lua
            .load("return limit_range(5, 0, 1), clamp(-5, 0, 1), clamp(0.5, 0, 1)")
            .eval()
            .unwrap();
        assert_eq!((a, b, c), (1.0, 0.0, 0.5));
    }

    #[test]
    fn fft_forward_of_zeros_is_zeros() {
        let lua = lua_with_primitives();
        let out: Vec<f64> = lua
            .load("return fft_forward({0, 0, 0, 0, 0, 0, 0, 0})")
            .eval()
            .unwrap();
        assert_eq!(out, vec![0.0; 8]);
    }

    #[test]
    fn fft_forward_returns_fresh_tables() {
        let lua = lua_with_primitives();
        let distinct: bool = lua
            .load(
                r#"
                local input = {1, 0, 0, 0}
                local a = fft_forward(input)
                local b = fft_forward(input)
                a[1] = 99
                return a ~= b and b[1] == 1 and input[1] == 1 and #a == 4
                "#,
            )
            .eval()
            .unwrap();
        assert!(distinct);
    }

    #[test]
    fn fft_forward_rejects_non_power_of_two() {
        let lua = lua_with_primitives();
        let (ok, msg): (bool, String) = lua
            .load(
                r#"
                local ok, err = pcall(fft_forward, {1, 2, 3, 4, 5, 6, 7})
                return ok, tostring(err)
                "#,
            )
            .eval()
            .unwrap();
        assert!(!ok);
        assert!(msg.contains("power of two"), "{msg}");
    }

    #[test]
    fn fft_forward_rejects_empty_table() {
        let lua = lua_with_primitives();
        let ok: bool = lua
            .load("return (pcall(fft_forward, {}))")
            .eval()
            .unwrap();
        assert!(!ok);
    }

    #[test]
    fn fft_forward_survives_many_sizes() {
        let lua = lua_with_primitives();
        let lens: Vec<i64> = lua
            .load(
                r#"
                local lens = {}
                for shift = 1, 8 do
                    local n = 1 << shift
                    local t = {}
                    for i = 1, n do t[i] = i end
                    lens[#lens + 1] = #fft_forward(t)
                end
                lens[#lens + 1] = #fft_forward({1, 2})
                return lens
                "#,
            )
            .eval()
            .unwrap();
        assert_eq!(lens, vec![2, 4, 8, 16, 32, 64, 128, 256, 2]);
    }

    #[test]
    fn fft_inverse_fails_explicitly() {
        let lua = lua_with_primitives();
        let (ok, msg): (bool, String) = lua
            .load("local ok, err = pcall(fft_inverse, {1, 2}); return ok, tostring(err)")
            .eval()
            .unwrap();
        assert!(!ok);
        assert!(msg.contains("not implemented"), "{msg}");
    }
}
