//! Runtime options of a [`Space`](crate::model::space::Space).

use std::fs;
use std::path::Path;

use crate::model::error::ProtoError;
use crate::sheet::api::{parse_sheet, Literal};

/// How the resolver orders the ancestors it searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Walk the C3-compatible linearization of the object.
    C3,
    /// Go fully into parent 0 before trying parent 1. Shared ancestors are
    /// visited once, at their first position.
    DepthFirst,
}

/// What to do when unrelated ancestors disagree about a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmbiguityPolicy {
    /// The first owner in search order wins.
    FirstMatch,
    /// Fail with [`ProtoError::AmbiguousAttribute`].
    Reject,
}

#[derive(Debug, Clone)]
pub struct SpaceConfig {
    pub resolution: Resolution,
    pub ambiguity: AmbiguityPolicy,
    /// Attribute names starting with this are hidden from iteration and display.
    pub private_prefix: String,
    /// Maximum number of prototypes. None means unlimited.
    pub max_objects: Option<usize>,
}

impl SpaceConfig {
    pub fn new() -> Self {
        SpaceConfig {
            resolution: Resolution::C3,
            ambiguity: AmbiguityPolicy::FirstMatch,
            private_prefix: "_".to_string(),
            max_objects: None,
        }
    }

    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_ambiguity(mut self, ambiguity: AmbiguityPolicy) -> Self {
        self.ambiguity = ambiguity;
        self
    }

    pub fn with_private_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.private_prefix = prefix.into();
        self
    }

    pub fn with_limit(mut self, max_objects: usize) -> Self {
        self.max_objects = Some(max_objects);
        self
    }

    pub fn is_private(&self, name: &str) -> bool {
        !self.private_prefix.is_empty() && name.starts_with(&self.private_prefix)
    }

    /// Load the `[options]` section of a sheet file.
    ///
    /// Expected format:
    /// ```text
    /// [options]
    /// resolution = "c3"            # or "depth-first"
    /// ambiguity = "first-match"    # or "reject"
    /// private_prefix = "_"
    /// max_objects = 10000
    /// ```
    pub fn load(path: &Path) -> Result<Self, ProtoError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ProtoError::Sheet(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    /// Parse the `[options]` section out of sheet text. Prototype
    /// declarations in the same text are ignored.
    pub fn parse(content: &str) -> Result<Self, ProtoError> {
        let source = parse_sheet(content)?;
        Self::from_options(&source.options)
    }

    pub fn from_options(options: &[(String, Literal)]) -> Result<Self, ProtoError> {
        let mut config = SpaceConfig::new();
        for (key, value) in options {
            match key.as_str() {
                "resolution" => {
                    config.resolution = match option_str(key, value)? {
                        "c3" => Resolution::C3,
                        "depth-first" => Resolution::DepthFirst,
                        other => return Err(bad_option(key, other)),
                    }
                }
                "ambiguity" => {
                    config.ambiguity = match option_str(key, value)? {
                        "first-match" => AmbiguityPolicy::FirstMatch,
                        "reject" => AmbiguityPolicy::Reject,
                        other => return Err(bad_option(key, other)),
                    }
                }
                "private_prefix" => {
                    config.private_prefix = option_str(key, value)?.to_string();
                }
                "max_objects" => match value {
                    Literal::Int(n) if *n > 0 => config.max_objects = Some(*n as usize),
                    Literal::None => config.max_objects = None,
                    other => return Err(bad_option(key, &format!("{:?}", other))),
                },
                _ => {
                    return Err(ProtoError::Sheet(format!("unknown option `{}`", key)));
                }
            }
        }
        Ok(config)
    }
}

impl Default for SpaceConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn option_str<'a>(key: &str, value: &'a Literal) -> Result<&'a str, ProtoError> {
    match value {
        Literal::Str(s) => Ok(s.as_str()),
        other => Err(bad_option(key, &format!("{:?}", other))),
    }
}

fn bad_option(key: &str, value: &str) -> ProtoError {
    ProtoError::Sheet(format!("invalid value for option `{}`: {}", key, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_config() {
        let config = SpaceConfig::parse("").unwrap();
        assert_eq!(config.resolution, Resolution::C3);
        assert_eq!(config.ambiguity, AmbiguityPolicy::FirstMatch);
        assert_eq!(config.private_prefix, "_");
        assert!(config.max_objects.is_none());
    }

    #[test]
    fn test_parse_all_options() {
        let config = SpaceConfig::parse(
            r#"
            [options]
            resolution = "depth-first"
            ambiguity = "reject"
            private_prefix = "__"
            max_objects = 64
            "#,
        )
        .unwrap();
        assert_eq!(config.resolution, Resolution::DepthFirst);
        assert_eq!(config.ambiguity, AmbiguityPolicy::Reject);
        assert_eq!(config.private_prefix, "__");
        assert_eq!(config.max_objects, Some(64));
    }

    #[test]
    fn test_unknown_option_is_rejected() {
        let err = SpaceConfig::parse("[options]\nspeed = \"fast\"").unwrap_err();
        assert_eq!(err, ProtoError::Sheet("unknown option `speed`".to_string()));
    }

    #[test]
    fn test_bad_resolution_value() {
        assert!(SpaceConfig::parse("[options]\nresolution = \"bfs\"").is_err());
        assert!(SpaceConfig::parse("[options]\nresolution = 3").is_err());
    }

    #[test]
    fn test_is_private() {
        let config = SpaceConfig::new();
        assert!(config.is_private("_name"));
        assert!(!config.is_private("name"));
        assert!(!SpaceConfig::new().with_private_prefix("").is_private("_x"));
    }
}
