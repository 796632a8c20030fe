/// `scripting/config.rs` — what a sandboxed function is allowed to see
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    /// Global the prelude's return value is published under.
    pub prelude_global: String,
    /// Library tables copied by reference into every environment.
    pub shared_tables: Vec<String>,
    /// Individual globals copied by reference into every environment.
    pub global_whitelist: Vec<String>,
    /// Table whose keys are also copied into the environment top level,
    /// so scripts can write `sin(x)` instead of `math.sin(x)`.
    pub flattened_table: Option<String>,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            prelude_global: "dsp".to_string(),
            shared_tables: vec!["math".to_string(), "dsp".to_string()],
            global_whitelist: vec!["ipairs".to_string(), "error".to_string()],
            flattened_table: Some("math".to_string()),
        }
    }
}

impl SandboxConfig {
    /// Add extra whitelisted globals on top of the current set.
    pub fn with_globals<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            let name = name.into();
            if !self.global_whitelist.contains(&name) {
                self.global_whitelist.push(name);
            }
        }
        self
    }
}
