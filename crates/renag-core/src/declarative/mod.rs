//! Declarative complainers driven by TOML configuration.
//!
//! Lets users add regex rules without writing Rust code.
//!
//! # Architecture
//!
//! ```text
//! TOML text
//!   ↓ serde (DTO layer)
//! config_dto types
//!   ↓ convert (loader)
//! Vec<ComplainerDef>
//!   ↓ RuleSet::load (validation)
//! Complainers
//! ```

use std::path::Path;

use crate::config::ConfigError;
use crate::registry::{ComplainerDef, ComplainerSource, LoadError};

pub mod config_dto;
pub mod loader;

/// Parses TOML content and converts every `[[complainer]]` table.
///
/// Returns `Ok(vec![])` if no complainer tables are present.
///
/// # Errors
///
/// Returns an error if TOML parsing or conversion fails.
pub fn load_complainers_from_toml(
    source_name: &str,
    content: &str,
) -> Result<Vec<ComplainerDef>, LoadError> {
    let dto: config_dto::DeclarativeConfigDto =
        toml::from_str(content).map_err(|source| LoadError::Toml {
            source_name: source_name.to_string(),
            source,
        })?;
    loader::load(dto)
}

/// A rule source backed by TOML text, usually the project's `renag.toml`.
#[derive(Debug, Clone)]
pub struct TomlSource {
    name: String,
    content: String,
}

impl TomlSource {
    /// Creates a source from TOML text.
    #[must_use]
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Reads a source from a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn from_file(path: &Path) -> Result<Self, LoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(Self::new(path.display().to_string(), content))
    }
}

impl ComplainerSource for TomlSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn complainers(&self) -> Result<Vec<ComplainerDef>, LoadError> {
        load_complainers_from_toml(&self.name, &self.content)
    }
}
