use crate::rules::compiled::{PatternError, RuleSet};
use crate::rules::schema::{Metadata, RuleConfig, ValidationError};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Toml {
        path: Option<PathBuf>,
        source: toml_edit::de::Error,
    },
    Validation {
        path: Option<PathBuf>,
        source: ValidationError,
    },
    Pattern {
        path: Option<PathBuf>,
        source: PatternError,
    },
}

impl ConfigError {
    fn with_path(self, path: &Path) -> Self {
        let path = Some(path.to_path_buf());
        match self {
            ConfigError::Io { .. } => self,
            ConfigError::Toml { path: None, source } => ConfigError::Toml { path, source },
            ConfigError::Validation { path: None, source } => {
                ConfigError::Validation { path, source }
            }
            ConfigError::Pattern { path: None, source } => ConfigError::Pattern { path, source },
            other => other,
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "failed to read rule file {}: {}", path.display(), source)
            }
            ConfigError::Toml { path, source } => match path {
                Some(path) => write!(
                    f,
                    "failed to parse rule file TOML ({}): {}",
                    path.display(),
                    source
                ),
                None => write!(f, "failed to parse rule file TOML: {}", source),
            },
            ConfigError::Validation { path, source } => match path {
                Some(path) => write!(f, "invalid rule file ({}): {}", path.display(), source),
                None => write!(f, "invalid rule file: {}", source),
            },
            ConfigError::Pattern { path, source } => match path {
                Some(path) => write!(f, "{} ({})", source, path.display()),
                None => write!(f, "{}", source),
            },
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Toml { source, .. } => Some(source),
            ConfigError::Validation { source, .. } => Some(source),
            ConfigError::Pattern { source, .. } => Some(source),
        }
    }
}

/// Parse and validate a rule file without compiling its patterns.
pub fn parse_str(input: &str) -> Result<RuleConfig, ConfigError> {
    let config: RuleConfig = toml_edit::de::from_str(input)
        .map_err(|source| ConfigError::Toml { path: None, source })?;
    config
        .validate()
        .map_err(|source| ConfigError::Validation { path: None, source })?;
    Ok(config)
}

/// A compiled rule file.
#[derive(Debug, Clone)]
pub struct RuleFile {
    pub meta: Metadata,
    pub rules: RuleSet,
}

/// Parse, validate and compile a rule file.
pub fn load_from_str(input: &str) -> Result<RuleFile, ConfigError> {
    let config = parse_str(input)?;
    let rules = RuleSet::compile(config.rules)
        .map_err(|source| ConfigError::Pattern { path: None, source })?;
    Ok(RuleFile {
        meta: config.meta,
        rules,
    })
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<RuleFile, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_from_str(&contents).map_err(|error| error.with_path(path))
}
