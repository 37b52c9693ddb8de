//! TOML deserialization types (DTO layer).
//!
//! These types exist solely for serde deserialization.
//! They are converted to [`ComplainerDef`](crate::ComplainerDef)s via the loader.

use serde::Deserialize;

/// Raw TOML representation of declarative rules: the `[[complainer]]` array.
///
/// Other tables of the same file (`[scan]`, `[rules.*]`) are ignored here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeclarativeConfigDto {
    /// Complainer tables.
    #[serde(rename = "complainer", default)]
    pub complainers: Vec<ComplainerDto>,
}

/// TOML representation of one complainer.
///
/// Required fields default to empty so that the registry, not serde,
/// reports which field is missing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComplainerDto {
    /// Rule name (e.g., "no-breakpoint").
    #[serde(default)]
    pub name: String,
    /// Default complaint message.
    #[serde(default)]
    pub description: String,
    /// Regex source.
    #[serde(default)]
    pub capture: Option<String>,
    /// Severity (default: "critical").
    #[serde(default = "default_severity_str")]
    pub severity: String,
    /// Include globs.
    #[serde(default)]
    pub glob: Vec<String>,
    /// Exclude globs.
    #[serde(default)]
    pub exclude_glob: Vec<String>,
    /// Fix hint.
    #[serde(default)]
    pub help: Option<String>,
    /// Regex flag `i`.
    #[serde(default)]
    pub case_insensitive: bool,
    /// Regex flag `m`.
    #[serde(default)]
    pub multi_line: bool,
    /// Regex flag `s`.
    #[serde(default)]
    pub dot_matches_new_line: bool,
    /// Regex flag `x`.
    #[serde(default)]
    pub ignore_whitespace: bool,
    /// Line-comment marker; selects the comment-suppression hook.
    #[serde(default)]
    pub skip_commented: Option<String>,
}

fn default_severity_str() -> String {
    "critical".to_string()
}
