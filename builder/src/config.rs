// Licensed under the Apache-2.0 license

//! Packaging configuration.
//!
//! Everything the pipeline needs from its surroundings is carried by
//! [`PackConfig`]; the library never reads the process environment. A config
//! is built in code or loaded from a TOML file:
//!
//! ```toml
//! scripts_root = "/opt/svpp"
//! clock = "ap_clk"
//! strict_patch = true
//! ```

use crate::error::{PackError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use xo_regmap_generator::RegisterMapConfig;

/// Master template location, relative to the scripts root.
pub const MASTER_TEMPLATE: &str = "scripts/pack_xo.tcl";

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct PackConfig {
    /// Root of the companion script repository holding [`MASTER_TEMPLATE`].
    pub scripts_root: Option<PathBuf>,
    pub clock: String,
    pub control_interface: String,
    pub address_block: String,
    /// Fail with [`PackError::IncompletePatch`] when a template setting is
    /// not found. When false the pipeline only logs a warning.
    pub strict_patch: bool,
}

impl Default for PackConfig {
    fn default() -> Self {
        let regmap = RegisterMapConfig::default();
        Self {
            scripts_root: None,
            clock: regmap.clock,
            control_interface: regmap.control_interface,
            address_block: regmap.address_block,
            strict_patch: true,
        }
    }
}

impl PackConfig {
    pub fn new(scripts_root: impl Into<PathBuf>) -> Self {
        Self::default().scripts_root(scripts_root)
    }

    pub fn scripts_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.scripts_root = Some(root.into());
        self
    }

    pub fn strict_patch(mut self, strict: bool) -> Self {
        self.strict_patch = strict;
        self
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|err| PackError::Configuration(err.to_string()))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(PackError::io("read", path))?;
        Self::from_toml_str(&text).map_err(|err| match err {
            PackError::Configuration(msg) => {
                PackError::Configuration(format!("{}: {msg}", path.display()))
            }
            other => other,
        })
    }

    /// The scripts root, checked to be an existing directory.
    pub fn resolved_scripts_root(&self) -> Result<&Path> {
        let root = self.scripts_root.as_deref().ok_or_else(|| {
            PackError::Configuration(
                "the scripts root is not set (point SVPP_ROOT at the svpp repository)".to_string(),
            )
        })?;
        if !root.is_dir() {
            return Err(PackError::Configuration(format!(
                "scripts root {} is not a directory",
                root.display()
            )));
        }
        Ok(root)
    }

    pub fn register_map_config(&self) -> RegisterMapConfig {
        RegisterMapConfig::default()
            .clock(&self.clock)
            .control_interface(&self.control_interface)
            .address_block(&self.address_block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PackConfig::default();
        assert!(config.strict_patch);
        assert_eq!(config.register_map_config(), RegisterMapConfig::default());
    }

    #[test]
    fn test_from_toml() {
        let config = PackConfig::from_toml_str(
            r#"
scripts_root = "/opt/svpp"
clock = "ap_clk_2"
strict_patch = false
"#,
        )
        .unwrap();
        assert_eq!(config.scripts_root, Some(PathBuf::from("/opt/svpp")));
        assert_eq!(config.register_map_config().clock, "ap_clk_2");
        assert_eq!(config.address_block, "reg0");
        assert!(!config.strict_patch);
    }

    #[test]
    fn test_unknown_key_is_configuration_error() {
        let err = PackConfig::from_toml_str("clk = \"ap_clk\"").unwrap_err();
        assert!(matches!(err, PackError::Configuration(_)));
    }

    #[test]
    fn test_missing_root_is_configuration_error() {
        let err = PackConfig::default().resolved_scripts_root().unwrap_err();
        assert!(matches!(err, PackError::Configuration(_)));
    }

    #[test]
    fn test_root_must_be_directory() {
        let config = PackConfig::new("/nonexistent/svpp");
        assert!(matches!(
            config.resolved_scripts_root(),
            Err(PackError::Configuration(_))
        ));
    }
}
