//! Ambient compiler configuration: arithmetic mode and function-name suffix.
//!
//! This is deliberately small — the DSL has no pretty-printing knobs, no
//! macro table, nothing analogous to the teacher's `MathCoreConfig`. But it
//! is the same *kind* of thing: a `Debug + Clone + Default` struct that
//! threads ambient choices through the pipeline, optionally `serde`-able so
//! a CLI could in principle load one from a TOML file.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use b3dc_ast::codegen::Mode;

/// Configuration for one compilation run.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "kebab-case"))]
pub struct CompilerConfig {
    /// Float or fixed-point arithmetic lowering. Defaults to [`Mode::Float`].
    pub mode: Mode,
    /// Appended to every generated function name (and every runtime helper
    /// call it makes), after `b3d_<name>`. Defaults to empty.
    pub suffix: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_float_with_empty_suffix() {
        let config = CompilerConfig::default();
        assert_eq!(config.mode, Mode::Float);
        assert_eq!(config.suffix, "");
    }
}
