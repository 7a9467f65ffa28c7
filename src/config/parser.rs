//! Context loader for raw configuration and default tables.
//!
//! A context document holds one or more named blocks of options; the block
//! to compose is selected by a context id. Documents may be JSON or YAML.

use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{ComposerError, ConfigError, Result};

use super::value::{DefaultTable, OptionTable, RawConfig};

/// Built-in default option values.
const BUILTIN_DEFAULTS: &str = include_str!("../../defaults/default-values.json");

/// Loader for context documents and default tables.
#[derive(Debug, Default)]
pub struct ContextLoader {
    /// Base path for resolving relative paths.
    base_path: Option<PathBuf>,
}

impl ContextLoader {
    /// Creates a new context loader.
    #[must_use]
    pub const fn new() -> Self {
        Self { base_path: None }
    }

    /// Sets the base path for resolving relative paths.
    #[must_use]
    pub fn with_base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        match &self.base_path {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Loads the block named `context_id` from a context file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if it has
    /// no block for the context id.
    pub fn load_context(&self, path: impl AsRef<Path>, context_id: &str) -> Result<RawConfig> {
        let document = self.read_document(path.as_ref())?;
        Self::select_block(&document, context_id)
    }

    /// Selects a named block from an already-parsed context document.
    ///
    /// # Errors
    ///
    /// Returns an error if the context id is empty or has no block.
    pub fn select_block(document: &Value, context_id: &str) -> Result<RawConfig> {
        if context_id.is_empty() {
            return Err(ConfigError::missing("contextId").into());
        }

        let block = document
            .get(context_id)
            .filter(|block| !block.is_null())
            .ok_or_else(|| ConfigError::ContextBlockNotFound {
                context_id: context_id.to_string(),
            })?;

        debug!("Selected context block: {context_id}");
        Ok(OptionTable::from_value(block.clone(), context_id)?)
    }

    /// Loads a default table from a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not an object.
    pub fn load_defaults(&self, path: impl AsRef<Path>) -> Result<DefaultTable> {
        let path = path.as_ref();
        let document = self.read_document(path)?;
        Ok(OptionTable::from_value(document, &path.display().to_string())?)
    }

    /// Returns the built-in default table.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded defaults are not a JSON object.
    pub fn builtin_defaults() -> Result<DefaultTable> {
        let document: Value = serde_json::from_str(BUILTIN_DEFAULTS).map_err(|e| {
            ComposerError::Config(ConfigError::ParseError {
                message: format!("Invalid built-in defaults: {e}"),
                location: None,
            })
        })?;
        Ok(OptionTable::from_value(document, "built-in defaults")?)
    }

    /// Reads a JSON or YAML document, chosen by file extension.
    fn read_document(&self, path: &Path) -> Result<Value> {
        let path = self.resolve_path(path);
        info!("Loading configuration from: {}", path.display());

        if !path.exists() {
            return Err(ComposerError::Config(ConfigError::FileNotFound { path }));
        }

        let content = std::fs::read_to_string(&path).map_err(|e| {
            ComposerError::Config(ConfigError::ParseError {
                message: format!("Failed to read file: {e}"),
                location: Some(path.display().to_string()),
            })
        })?;

        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

        if is_yaml {
            Self::parse_yaml(&content, Some(&path))
        } else {
            Self::parse_json(&content, Some(&path))
        }
    }

    /// Parses a context document from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is invalid.
    pub fn parse_json(content: &str, source: Option<&Path>) -> Result<Value> {
        debug!("Parsing JSON context document");
        serde_json::from_str(content).map_err(|e| {
            ComposerError::Config(ConfigError::ParseError {
                message: format!("JSON parse error: {e}"),
                location: source.map(|p| p.display().to_string()),
            })
        })
    }

    /// Parses a context document from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid.
    pub fn parse_yaml(content: &str, source: Option<&Path>) -> Result<Value> {
        debug!("Parsing YAML context document");
        serde_yaml::from_str(content).map_err(|e| {
            ComposerError::Config(ConfigError::ParseError {
                message: format!("YAML parse error: {e}"),
                location: source.map(|p| p.display().to_string()),
            })
        })
    }

    /// Loads the .env file if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the .env file exists but cannot be loaded.
    pub fn load_dotenv(&self) -> Result<()> {
        let env_path = self
            .base_path
            .as_ref()
            .map_or_else(|| PathBuf::from(".env"), |p| p.join(".env"));

        if env_path.exists() {
            info!("Loading environment from: {}", env_path.display());
            dotenvy::from_path(&env_path).map_err(|e| {
                ComposerError::Config(ConfigError::ParseError {
                    message: format!("Failed to load .env file: {e}"),
                    location: Some(env_path.display().to_string()),
                })
            })?;
        } else {
            debug!(".env file not found at: {}", env_path.display());
        }

        Ok(())
    }
}

/// Default context file names to search for.
pub const DEFAULT_CONTEXT_FILES: &[&str] = &[
    "cdk.context.json",
    "composer.context.json",
    "composer.context.yaml",
    "composer.context.yml",
];

/// Finds the context file in the given directory or its parents.
///
/// # Errors
///
/// Returns an error if no context file is found.
pub fn find_context_file(start_dir: impl AsRef<Path>) -> Result<PathBuf> {
    let start = start_dir.as_ref();
    let mut current = start.to_path_buf();

    loop {
        for filename in DEFAULT_CONTEXT_FILES {
            let candidate = current.join(filename);
            if candidate.exists() {
                info!("Found context file: {}", candidate.display());
                return Ok(candidate);
            }
        }

        if !current.pop() {
            break;
        }
    }

    Err(ComposerError::Config(ConfigError::FileNotFound {
        path: start.join(DEFAULT_CONTEXT_FILES[0]),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_select_block() {
        let document = serde_json::json!({
            "dev": {"stage": "dev", "domainName": "target"},
            "prod": {"stage": "prod"}
        });
        let raw = ContextLoader::select_block(&document, "dev").unwrap();
        assert_eq!(raw.len(), 2);
        assert_eq!(raw.get("stage"), Some(&serde_json::json!("dev")));
    }

    #[test]
    fn test_missing_block_and_id() {
        let document = serde_json::json!({"dev": {"stage": "dev"}});
        assert!(matches!(
            ContextLoader::select_block(&document, "qa"),
            Err(ComposerError::Config(ConfigError::ContextBlockNotFound { .. }))
        ));
        assert!(matches!(
            ContextLoader::select_block(&document, ""),
            Err(ComposerError::Config(ConfigError::MissingRequiredField { .. }))
        ));
    }

    #[test]
    fn test_load_yaml_context_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("composer.context.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "dev:\n  stage: dev\n  domainName: target\n  vpcEnabled: true\n  dataNodeCount: 2"
        )
        .unwrap();

        let raw = ContextLoader::new()
            .with_base_path(dir.path())
            .load_context("composer.context.yaml", "dev")
            .unwrap();
        assert_eq!(raw.get("vpcEnabled"), Some(&serde_json::json!(true)));
        assert_eq!(raw.get("dataNodeCount"), Some(&serde_json::json!(2)));

        assert_eq!(find_context_file(dir.path()).unwrap(), path);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ContextLoader::new()
            .load_context(dir.path().join("absent.json"), "dev")
            .unwrap_err();
        assert!(matches!(err, ComposerError::Config(ConfigError::FileNotFound { .. })));
    }

    #[test]
    fn test_builtin_defaults_load() {
        let defaults = ContextLoader::builtin_defaults().unwrap();
        assert!(defaults.get("engineVersion").is_some());
    }
}
