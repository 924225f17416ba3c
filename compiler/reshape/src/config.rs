//! Engine configuration.

use crate::error::{Error, Result};

/// Default limit on how deeply nested types are inlined into one artifact.
pub const DEFAULT_MAX_DEPTH: usize = 32;

const MAX_DEPTH_VAR: &str = "RESHAPE_MAX_DEPTH";
const DUMP_IR_VAR: &str = "RESHAPE_DUMP_IR";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Nesting limit for generation; deeper types fail with
    /// `GenError::DepthExceeded`.
    pub max_depth: usize,
    /// Log the IR of every artifact before lowering.
    pub dump_ir: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            max_depth: DEFAULT_MAX_DEPTH,
            dump_ir: false,
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by `RESHAPE_MAX_DEPTH` and `RESHAPE_DUMP_IR`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary variable
    /// source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = EngineConfig::default();
        if let Some(raw) = lookup(MAX_DEPTH_VAR) {
            config.max_depth = match raw.trim().parse::<usize>() {
                Ok(depth) if depth > 0 => depth,
                _ => return Err(invalid(MAX_DEPTH_VAR, raw)),
            };
        }
        if let Some(raw) = lookup(DUMP_IR_VAR) {
            config.dump_ir = match raw.trim().to_ascii_lowercase().as_str() {
                "" | "0" | "false" | "off" => false,
                "1" | "true" | "on" => true,
                _ => return Err(invalid(DUMP_IR_VAR, raw)),
            };
        }
        Ok(config)
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn with_dump_ir(mut self, dump_ir: bool) -> Self {
        self.dump_ir = dump_ir;
        self
    }
}

fn invalid(variable: &'static str, value: String) -> Error {
    Error::Config { variable, value }
}
