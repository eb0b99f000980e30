//! Feature and extension selection

use crate::config::ScanConfig;
use crate::registry::document::{FeatureKind, RawFeature};

/// Which features and extensions to build. `None` selects everything.
#[derive(Debug, Clone, Default)]
pub struct FeatureFilter {
    /// Exact feature names
    pub features: Option<Vec<String>>,
    /// Exact extension names or glob patterns such as `GL_ARB_*`
    pub extensions: Option<Vec<String>>,
}

impl FeatureFilter {
    pub fn from_config(config: &ScanConfig) -> Self {
        FeatureFilter {
            features: config.features.clone(),
            extensions: config.extensions.clone(),
        }
    }

    pub fn allows(&self, feature: &RawFeature) -> bool {
        match feature.kind {
            FeatureKind::Feature => self
                .features
                .as_ref()
                .map_or(true, |names| names.iter().any(|n| *n == feature.name)),
            FeatureKind::Extension => self.extensions.as_ref().map_or(true, |patterns| {
                patterns.iter().any(|p| glob_match(p, &feature.name))
            }),
        }
    }
}

/// Match `name` against a pattern where `*` is any run and `?` any one char.
pub fn glob_match(pattern: &str, name: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let name: Vec<char> = name.chars().collect();

    let (mut p, mut n) = (0, 0);
    // Last `*` seen and the name position it was tried against
    let mut backtrack: Option<(usize, usize)> = None;

    while n < name.len() {
        match pattern.get(p) {
            Some(&'*') => {
                backtrack = Some((p, n));
                p += 1;
            }
            Some(&c) if c == '?' || c == name[n] => {
                p += 1;
                n += 1;
            }
            _ => match backtrack {
                Some((star, matched)) => {
                    p = star + 1;
                    n = matched + 1;
                    backtrack = Some((star, matched + 1));
                }
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|&c| c == '*')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(name: &str, kind: FeatureKind) -> RawFeature {
        RawFeature {
            name: name.to_string(),
            kind,
            embedded: false,
            enums: Vec::new(),
            commands: Vec::new(),
        }
    }

    #[test]
    fn test_glob_match() {
        assert!(glob_match("GL_ARB_*", "GL_ARB_debug_output"));
        assert!(glob_match("GL_ARB_*", "GL_ARB_"));
        assert!(!glob_match("GL_ARB_*", "GL_EXT_texture"));
        assert!(glob_match("GL_?XT_*_s3tc", "GL_EXT_texture_compression_s3tc"));
        assert!(glob_match("*", ""));
        assert!(glob_match("GL_KHR_debug", "GL_KHR_debug"));
        assert!(!glob_match("GL_KHR_debug", "GL_KHR_debug2"));
        assert!(glob_match("*_debug*", "GL_KHR_debug_output"));
    }

    #[test]
    fn test_absent_lists_allow_everything() {
        let filter = FeatureFilter::default();
        assert!(filter.allows(&raw("GL_VERSION_1_0", FeatureKind::Feature)));
        assert!(filter.allows(&raw("GL_ARB_anything", FeatureKind::Extension)));
    }

    #[test]
    fn test_features_exact_extensions_glob() {
        let filter = FeatureFilter {
            features: Some(vec!["GL_VERSION_3_3".to_string()]),
            extensions: Some(vec!["GL_ARB_*".to_string(), "GL_KHR_debug".to_string()]),
        };
        assert!(filter.allows(&raw("GL_VERSION_3_3", FeatureKind::Feature)));
        assert!(!filter.allows(&raw("GL_VERSION_3_*", FeatureKind::Feature)));
        assert!(!filter.allows(&raw("GL_VERSION_4_0", FeatureKind::Feature)));
        assert!(filter.allows(&raw("GL_ARB_sync", FeatureKind::Extension)));
        assert!(filter.allows(&raw("GL_KHR_debug", FeatureKind::Extension)));
        assert!(!filter.allows(&raw("GL_EXT_sync", FeatureKind::Extension)));
    }
}
