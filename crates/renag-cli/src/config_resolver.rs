//! Locating and loading `renag.toml`.
//!
//! Priority order:
//!
//! 1. `--config` flag (explicit path)
//! 2. `{root}/renag.toml` or `{root}/.renag.toml`
//! 3. `$RENAG_CONFIG_DIR/config.toml`, else `~/.renag/config.toml`
//! 4. No file found → built-in defaults, built-in rules only

use renag_core::declarative::TomlSource;
use renag_core::{Config, LoadError};
use std::path::{Path, PathBuf};

/// Where the configuration was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Given with `--config`.
    Explicit(PathBuf),
    /// Found in the scan root.
    Project(PathBuf),
    /// Found in the global config directory.
    Global(PathBuf),
    /// No file; defaults apply.
    Default,
}

impl ConfigSource {
    /// Returns the resolved path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Global(p) => Some(p),
            Self::Default => None,
        }
    }

    /// Returns `true` if the config was loaded from the global directory.
    #[must_use]
    pub fn is_global(&self) -> bool {
        matches!(self, Self::Global(_))
    }

    /// Reads the file into a [`Config`] plus the `[[complainer]]` rule source
    /// declared in it.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Config`] when the file cannot be read or parsed.
    pub fn load(&self) -> Result<LoadedConfig, LoadError> {
        let Some(path) = self.path() else {
            return Ok(LoadedConfig::default());
        };
        if self.is_global() {
            tracing::info!("Using global config: {}", path.display());
        } else {
            tracing::debug!("Using config: {}", path.display());
        }

        let config = Config::from_file(path)?;
        let rules = TomlSource::from_file(path)?;
        Ok(LoadedConfig {
            config,
            rules: Some(rules),
        })
    }
}

/// A parsed configuration file.
#[derive(Debug, Default)]
pub struct LoadedConfig {
    /// `[scan]` and `[rules.*]` settings.
    pub config: Config,
    /// Declarative complainers from the same file, if a file was found.
    pub rules: Option<TomlSource>,
}

const PROJECT_CONFIG_NAMES: &[&str] = &["renag.toml", ".renag.toml"];

const GLOBAL_CONFIG_NAME: &str = "config.toml";

/// Resolves the configuration file for a scan rooted at `project_dir`.
#[must_use]
pub fn resolve(project_dir: &Path, explicit: Option<&Path>) -> ConfigSource {
    resolve_inner(project_dir, explicit, global_config_dir())
}

fn resolve_inner(
    project_dir: &Path,
    explicit: Option<&Path>,
    global_dir: Option<PathBuf>,
) -> ConfigSource {
    if let Some(p) = explicit {
        return ConfigSource::Explicit(p.to_path_buf());
    }

    for name in PROJECT_CONFIG_NAMES {
        let candidate = project_dir.join(name);
        if candidate.is_file() {
            tracing::debug!("Found project config: {}", candidate.display());
            return ConfigSource::Project(candidate);
        }
    }

    if let Some(dir) = global_dir {
        let candidate = dir.join(GLOBAL_CONFIG_NAME);
        if candidate.is_file() {
            tracing::debug!("Found global config: {}", candidate.display());
            return ConfigSource::Global(candidate);
        }
    }

    ConfigSource::Default
}

/// Returns the global config directory: `$RENAG_CONFIG_DIR`, else `~/.renag/`.
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("RENAG_CONFIG_DIR") {
        return Some(PathBuf::from(dir));
    }
    home::home_dir().map(|h| h.join(".renag"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use renag_core::ComplainerSource;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn explicit_wins_and_is_not_checked_for_existence() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("renag.toml"), "").unwrap();

        let result = resolve_inner(tmp.path(), Some(Path::new("/nonexistent.toml")), None);
        assert_eq!(
            result,
            ConfigSource::Explicit(PathBuf::from("/nonexistent.toml"))
        );
    }

    #[test]
    fn renag_toml_preferred_over_dot_prefix() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".renag.toml"), "").unwrap();
        assert_eq!(
            resolve_inner(tmp.path(), None, None),
            ConfigSource::Project(tmp.path().join(".renag.toml"))
        );

        fs::write(tmp.path().join("renag.toml"), "").unwrap();
        assert_eq!(
            resolve_inner(tmp.path(), None, None),
            ConfigSource::Project(tmp.path().join("renag.toml"))
        );
    }

    #[test]
    fn directory_named_like_config_is_ignored() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("renag.toml")).unwrap();
        assert_eq!(resolve_inner(tmp.path(), None, None), ConfigSource::Default);
    }

    #[test]
    fn global_used_only_without_project_config() {
        let project = TempDir::new().unwrap();
        let global = TempDir::new().unwrap();
        let global_dir = Some(global.path().to_path_buf());

        assert_eq!(
            resolve_inner(project.path(), None, global_dir.clone()),
            ConfigSource::Default
        );

        fs::write(global.path().join("config.toml"), "").unwrap();
        assert_eq!(
            resolve_inner(project.path(), None, global_dir.clone()),
            ConfigSource::Global(global.path().join("config.toml"))
        );

        fs::write(project.path().join("renag.toml"), "").unwrap();
        assert!(matches!(
            resolve_inner(project.path(), None, global_dir),
            ConfigSource::Project(_)
        ));
    }

    #[test]
    fn default_source_loads_defaults_without_rules() {
        let loaded = ConfigSource::Default.load().unwrap();
        assert!(loaded.rules.is_none());
        assert!(loaded.config.scan.respect_gitignore);
    }

    #[test]
    fn load_reads_settings_and_complainers() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("renag.toml");
        fs::write(
            &path,
            r#"
[scan]
parallelism = 2

[[complainer]]
name = "no-todo"
description = "TODO left in code."
capture = "TODO"
glob = ["*"]
"#,
        )
        .unwrap();

        let loaded = ConfigSource::Project(path).load().unwrap();
        assert_eq!(loaded.config.scan.parallelism, Some(2));
        let defs = loaded.rules.unwrap().complainers().unwrap();
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].name, "no-todo");
    }

    #[test]
    fn missing_explicit_file_is_a_load_error() {
        let err = ConfigSource::Explicit(PathBuf::from("/nonexistent/renag.toml"))
            .load()
            .unwrap_err();
        assert!(matches!(err, LoadError::Config(_)), "{err}");
    }

    #[test]
    fn is_global_only_true_for_global() {
        assert!(!ConfigSource::Explicit(PathBuf::new()).is_global());
        assert!(!ConfigSource::Project(PathBuf::new()).is_global());
        assert!(ConfigSource::Global(PathBuf::new()).is_global());
        assert!(!ConfigSource::Default.is_global());
    }
}
