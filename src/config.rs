//! Scan configuration
//!
//! A [`ScanConfig`] is read from a TOML file such as:
//!
//! ```toml
//! noise_tokens = ["GLFWAPI", "APIENTRY"]
//! best_effort_macros = true
//! extensions = ["GL_ARB_*"]
//!
//! [aliases]
//! GLenum = "u32"
//! GLsizei = "i32"
//! ```
//!
//! Every field has a default, so an empty file (or no file) is valid.

use crate::errors::ScanError;
use crate::symbols::{AliasMap, Scalar};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Calling-convention and export macros stripped from every line
    pub noise_tokens: Vec<String>,
    /// Domain-specific typedef spellings and the scalar each stands for
    pub aliases: BTreeMap<String, Scalar>,
    /// Resolve callback typedef names in struct fields to `isize`
    pub decay_callback_fields: bool,
    /// Keep `(A | B)` macro values as `i32` constants
    pub best_effort_macros: bool,
    /// Registry features to build; all when absent
    pub features: Option<Vec<String>>,
    /// Registry extension names or glob patterns; all when absent
    pub extensions: Option<Vec<String>>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        ScanConfig {
            noise_tokens: Vec::new(),
            aliases: BTreeMap::new(),
            decay_callback_fields: true,
            best_effort_macros: false,
            features: None,
            extensions: None,
        }
    }
}

impl ScanConfig {
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn load(path: &Path) -> Result<Self, ScanError> {
        let text = fs::read_to_string(path).map_err(|source| ScanError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text).map_err(|source| ScanError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn alias_map(&self) -> AliasMap {
        self.aliases
            .iter()
            .map(|(raw, scalar)| (raw.clone(), *scalar))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let config = ScanConfig::from_toml("").unwrap();
        assert!(config.noise_tokens.is_empty());
        assert!(config.decay_callback_fields);
        assert!(!config.best_effort_macros);
        assert!(config.features.is_none());
    }

    #[test]
    fn test_parse_full_config() {
        let config = ScanConfig::from_toml(
            r#"
noise_tokens = ["GLFWAPI"]
decay_callback_fields = false
extensions = ["GL_ARB_*"]

[aliases]
GLenum = "u32"
GLboolean = "bool"
"#,
        )
        .unwrap();

        assert_eq!(config.noise_tokens, vec!["GLFWAPI"]);
        assert!(!config.decay_callback_fields);
        assert_eq!(config.extensions, Some(vec!["GL_ARB_*".to_string()]));
        let aliases = config.alias_map();
        assert_eq!(aliases.get("GLenum"), Some(&Scalar::U32));
        assert_eq!(aliases.get("GLboolean"), Some(&Scalar::Bool));
    }

    #[test]
    fn test_rejects_unknown_scalar() {
        assert!(ScanConfig::from_toml("[aliases]\nGLenum = \"uint\"").is_err());
    }
}
