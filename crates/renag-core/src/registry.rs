//! Complainer definitions and the validated rule set.
//!
//! ```text
//! ComplainerSource (built-ins, [[complainer]] tables, ...)
//!   ↓ complainers()
//! Vec<ComplainerDef>            unvalidated, as written by the author
//!   ↓ Complainer::from_def      capture compiled, globs compiled, fields checked
//! RuleSet                       read-only for the rest of the run
//! ```

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::builder::{Check, CheckHook, HookError};
use crate::config::{Config, ConfigError};
use crate::pattern::{Capture, Matches, MatcherBox, PatternError};
use crate::select::{self, FileFilter, GlobError, GlobPattern};
use crate::types::{Complaint, Severity, Span};

/// Errors raised while loading rules. Any of them aborts the run before a
/// single file is scanned.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum LoadError {
    /// A required field is missing or empty.
    #[error("complainer `{rule}`: missing required field `{field}`")]
    #[diagnostic(
        code(renag::load::missing_field),
        help("every complainer needs a name, description, capture, severity and glob")
    )]
    MissingField {
        /// The rule (or its position when unnamed).
        rule: String,
        /// The missing field.
        field: &'static str,
    },

    /// The capture pattern does not compile.
    #[error("complainer `{rule}`: invalid capture pattern")]
    #[diagnostic(code(renag::load::invalid_pattern))]
    InvalidPattern {
        /// The rule.
        rule: String,
        /// The compile error.
        #[source]
        source: PatternError,
    },

    /// The include glob list is empty.
    #[error("complainer `{rule}`: `glob` must list at least one pattern")]
    #[diagnostic(code(renag::load::empty_globs), help("use [\"*\"] to scan every file"))]
    EmptyGlobs {
        /// The rule.
        rule: String,
    },

    /// A glob pattern is invalid.
    #[error("complainer `{rule}`: {source}")]
    #[diagnostic(code(renag::load::invalid_glob))]
    InvalidGlob {
        /// The rule.
        rule: String,
        /// The glob error.
        #[source]
        source: GlobError,
    },

    /// A global exclude glob is invalid.
    #[error("invalid exclude pattern: {source}")]
    #[diagnostic(code(renag::load::invalid_exclude))]
    InvalidExclude {
        /// The glob error.
        #[source]
        source: GlobError,
    },

    /// A severity string is not recognized.
    #[error("{context}: unknown severity `{value}`")]
    #[diagnostic(code(renag::load::unknown_severity), help("expected `warning` or `critical`"))]
    UnknownSeverity {
        /// Where the value was found.
        context: String,
        /// The invalid value.
        value: String,
    },

    /// Two rules share a name.
    #[error("duplicate complainer name `{rule}` (from {first} and {second})")]
    #[diagnostic(code(renag::load::duplicate_name))]
    DuplicateName {
        /// The shared name.
        rule: String,
        /// Source of the first definition.
        first: String,
        /// Source of the second definition.
        second: String,
    },

    /// A rule was requested by name but is not registered.
    #[error("unknown complainer `{rule}`")]
    #[diagnostic(code(renag::load::unknown_rule), help("run `renag list-rules` to see what is registered"))]
    UnknownRule {
        /// The requested name.
        rule: String,
    },

    /// No rule is left to run.
    #[error("no complainers are enabled")]
    #[diagnostic(code(renag::load::empty_rule_set))]
    EmptyRuleSet,

    /// A TOML rule source failed to parse.
    #[error("{source_name}: invalid TOML")]
    #[diagnostic(code(renag::load::toml))]
    Toml {
        /// Name of the source.
        source_name: String,
        /// Parse error.
        #[source]
        source: toml::de::Error,
    },

    /// The configuration could not be loaded.
    #[error(transparent)]
    #[diagnostic(code(renag::load::config))]
    Config(#[from] ConfigError),
}

/// An unvalidated complainer definition, as supplied by a rule source.
#[derive(Clone, Default)]
pub struct ComplainerDef {
    /// Unique rule name.
    pub name: String,
    /// Default complaint message.
    pub description: String,
    /// Pattern to look for.
    pub capture: Option<Capture>,
    /// Severity of emitted complaints.
    pub severity: Option<Severity>,
    /// Include globs.
    pub include: Vec<String>,
    /// Exclude globs.
    pub exclude: Vec<String>,
    /// Optional fix hint.
    pub help: Option<String>,
    /// Optional validation hook.
    pub hook: Option<CheckHook>,
}

impl ComplainerDef {
    /// Starts a definition with a name and description.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            ..Self::default()
        }
    }

    /// Sets the capture pattern.
    #[must_use]
    pub fn capture(mut self, capture: impl Into<Capture>) -> Self {
        self.capture = Some(capture.into());
        self
    }

    /// Sets the severity.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    /// Adds an include glob.
    #[must_use]
    pub fn include(mut self, pattern: impl Into<String>) -> Self {
        self.include.push(pattern.into());
        self
    }

    /// Adds an exclude glob.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude.push(pattern.into());
        self
    }

    /// Sets the help text.
    #[must_use]
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Sets the validation hook.
    #[must_use]
    pub fn hook(mut self, hook: CheckHook) -> Self {
        self.hook = Some(hook);
        self
    }

    /// Sets the validation hook from a closure.
    #[must_use]
    pub fn check<F>(self, hook: F) -> Self
    where
        F: Fn(&Check<'_>) -> Result<Vec<Complaint>, HookError> + Send + Sync + 'static,
    {
        self.hook(Arc::new(hook))
    }
}

impl std::fmt::Debug for ComplainerDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComplainerDef")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("capture", &self.capture)
            .field("severity", &self.severity)
            .field("include", &self.include)
            .field("exclude", &self.exclude)
            .field("help", &self.help)
            .field("hook", &self.hook.is_some())
            .finish()
    }
}

/// A validated complainer with its capture compiled.
pub struct Complainer {
    name: String,
    description: String,
    severity: Severity,
    severity_override: Option<Severity>,
    kind: &'static str,
    filter: FileFilter,
    help: Option<String>,
    matcher: MatcherBox,
    hook: Option<CheckHook>,
}

impl Complainer {
    /// Validates a definition and compiles its capture and globs.
    ///
    /// # Errors
    ///
    /// Returns the first missing or invalid field.
    pub fn from_def(def: ComplainerDef) -> Result<Self, LoadError> {
        if def.name.trim().is_empty() {
            return Err(LoadError::MissingField {
                rule: "<unnamed>".to_string(),
                field: "name",
            });
        }
        let rule = def.name;
        let missing = |field| LoadError::MissingField {
            rule: rule.clone(),
            field,
        };

        if def.description.trim().is_empty() {
            return Err(missing("description"));
        }
        let capture = def.capture.ok_or_else(|| missing("capture"))?;
        let severity = def.severity.ok_or_else(|| missing("severity"))?;
        if def.include.is_empty() {
            return Err(LoadError::EmptyGlobs { rule });
        }

        let glob_err = |source| LoadError::InvalidGlob {
            rule: rule.clone(),
            source,
        };
        let include = select::compile_globs(&def.include).map_err(glob_err)?;
        let exclude = select::compile_globs(&def.exclude).map_err(glob_err)?;

        let matcher = capture.compile().map_err(|source| LoadError::InvalidPattern {
            rule: rule.clone(),
            source,
        })?;
        debug!(rule = %rule, kind = capture.kind(), "compiled complainer");

        Ok(Self {
            name: rule,
            description: def.description,
            severity,
            severity_override: None,
            kind: capture.kind(),
            filter: FileFilter::new(include, exclude),
            help: def.help,
            matcher,
            hook: def.hook,
        })
    }

    /// Rule name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Default complaint message.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Effective severity, after any configured override.
    #[must_use]
    pub fn severity(&self) -> Severity {
        self.severity_override.unwrap_or(self.severity)
    }

    /// Severity forced by configuration, if any.
    #[must_use]
    pub fn severity_override(&self) -> Option<Severity> {
        self.severity_override
    }

    /// `"regex"` or `"grammar"`.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Help text.
    #[must_use]
    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Include/exclude filter.
    #[must_use]
    pub fn filter(&self) -> &FileFilter {
        &self.filter
    }

    /// Validation hook.
    #[must_use]
    pub fn hook(&self) -> Option<&CheckHook> {
        self.hook.as_ref()
    }

    /// The candidates this rule scans, sorted.
    #[must_use]
    pub fn select(&self, candidates: &[PathBuf]) -> Vec<PathBuf> {
        select::select(&self.filter, candidates)
    }

    /// All matches of the capture in `text`.
    #[must_use]
    pub fn find_spans(&self, text: &str) -> Vec<Span> {
        self.matcher.find_spans(text)
    }

    /// All matches of the capture in `text`, with abandoned grammar attempts.
    #[must_use]
    pub fn find_matches(&self, text: &str) -> Matches {
        self.matcher.find_matches(text)
    }

    fn globs(&self) -> impl Iterator<Item = &GlobPattern> {
        self.filter.include().iter()
    }
}

impl std::fmt::Debug for Complainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Complainer")
            .field("name", &self.name)
            .field("severity", &self.severity())
            .field("kind", &self.kind)
            .field("globs", &self.globs().map(GlobPattern::as_str).collect::<Vec<_>>())
            .field("hook", &self.hook.is_some())
            .finish_non_exhaustive()
    }
}

/// A provider of complainer definitions.
pub trait ComplainerSource {
    /// Name of the source, used in error messages.
    fn name(&self) -> &str;

    /// Returns the definitions this source contributes.
    ///
    /// # Errors
    ///
    /// Returns an error if the source itself cannot be read or parsed.
    fn complainers(&self) -> Result<Vec<ComplainerDef>, LoadError>;
}

impl ComplainerSource for Vec<ComplainerDef> {
    fn name(&self) -> &str {
        "inline definitions"
    }

    fn complainers(&self) -> Result<Vec<ComplainerDef>, LoadError> {
        Ok(self.clone())
    }
}

/// The validated set of rules for one run.
#[derive(Debug, Default)]
pub struct RuleSet {
    complainers: Vec<Complainer>,
}

impl RuleSet {
    /// Loads and validates every definition from `sources`, then applies the
    /// `[rules.<name>]` settings of `config`.
    ///
    /// Every rule is validated, including ones the configuration disables.
    ///
    /// # Errors
    ///
    /// Returns the first configuration error: an invalid or incomplete rule,
    /// a duplicate name, or an empty resulting set.
    pub fn load(sources: &[&dyn ComplainerSource], config: &Config) -> Result<Self, LoadError> {
        let mut origin: HashMap<String, String> = HashMap::new();
        let mut complainers = Vec::new();

        for source in sources {
            let defs = source.complainers()?;
            debug!(source = source.name(), count = defs.len(), "loading complainers");
            for (index, def) in defs.into_iter().enumerate() {
                if def.name.trim().is_empty() {
                    return Err(LoadError::MissingField {
                        rule: format!("[{index}] in {}", source.name()),
                        field: "name",
                    });
                }
                let mut complainer = Complainer::from_def(def)?;
                if let Some(first) = origin.get(complainer.name()) {
                    return Err(LoadError::DuplicateName {
                        rule: complainer.name().to_string(),
                        first: first.clone(),
                        second: source.name().to_string(),
                    });
                }
                origin.insert(complainer.name().to_string(), source.name().to_string());

                if !config.is_rule_enabled(complainer.name()) {
                    debug!(rule = complainer.name(), "rule disabled by configuration");
                    continue;
                }
                complainer.severity_override = config.rule_severity(complainer.name());
                complainers.push(complainer);
            }
        }

        for name in config.rules.keys() {
            if !origin.contains_key(name) {
                warn!(rule = %name, "configuration refers to an unknown complainer");
            }
        }

        if complainers.is_empty() {
            return Err(LoadError::EmptyRuleSet);
        }
        info!(count = complainers.len(), "complainers loaded");
        Ok(Self { complainers })
    }

    /// Keeps only the named rules.
    ///
    /// # Errors
    ///
    /// Returns an error if a name is not in the set, or if `names` is empty.
    pub fn only<S: AsRef<str>>(self, names: &[S]) -> Result<Self, LoadError> {
        let wanted: Vec<&str> = names.iter().map(AsRef::as_ref).collect();
        if let Some(unknown) = wanted.iter().find(|n| self.get(n).is_none()) {
            return Err(LoadError::UnknownRule {
                rule: (*unknown).to_string(),
            });
        }
        let complainers: Vec<Complainer> = self
            .complainers
            .into_iter()
            .filter(|c| wanted.contains(&c.name()))
            .collect();
        if complainers.is_empty() {
            return Err(LoadError::EmptyRuleSet);
        }
        Ok(Self { complainers })
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.complainers.len()
    }

    /// Returns true if there are no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.complainers.is_empty()
    }

    /// Looks a rule up by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Complainer> {
        self.complainers.iter().find(|c| c.name() == name)
    }

    /// Iterates over the rules in load order.
    pub fn iter(&self) -> std::slice::Iter<'_, Complainer> {
        self.complainers.iter()
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Complainer;
    type IntoIter = std::slice::Iter<'a, Complainer>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::{Expr, Grammar};

    fn valid(name: &str) -> ComplainerDef {
        ComplainerDef::new(name, "found a todo")
            .capture(Capture::regex("TODO"))
            .severity(Severity::Warning)
            .include("*")
    }

    fn load(defs: Vec<ComplainerDef>) -> Result<RuleSet, LoadError> {
        RuleSet::load(&[&defs], &Config::default())
    }

    #[test]
    fn loads_valid_rules_in_order() {
        let set = load(vec![valid("b"), valid("a")]).unwrap();
        let names: Vec<&str> = set.iter().map(Complainer::name).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(set.get("a").unwrap().kind(), "regex");
    }

    #[test]
    fn missing_capture_names_rule_and_field() {
        let mut def = valid("todo");
        def.capture = None;
        let err = load(vec![def]).unwrap_err();
        assert!(matches!(
            err,
            LoadError::MissingField { ref rule, field: "capture" } if rule == "todo"
        ));
    }

    #[test]
    fn unnamed_rule_is_reported_by_position() {
        let mut unnamed = valid("ignored");
        unnamed.name = String::new();
        let err = load(vec![valid("todo"), unnamed]).unwrap_err();
        assert!(matches!(
            err,
            LoadError::MissingField { ref rule, field: "name" } if rule == "[1] in inline definitions"
        ));
    }

    #[test]
    fn missing_severity_is_rejected() {
        let mut def = valid("todo");
        def.severity = None;
        assert!(matches!(
            load(vec![def]),
            Err(LoadError::MissingField { field: "severity", .. })
        ));
    }

    #[test]
    fn missing_description_is_rejected() {
        let mut def = valid("todo");
        def.description = "  ".to_string();
        assert!(matches!(
            load(vec![def]),
            Err(LoadError::MissingField { field: "description", .. })
        ));
    }

    #[test]
    fn empty_globs_are_rejected() {
        let mut def = valid("todo");
        def.include.clear();
        assert!(matches!(load(vec![def]), Err(LoadError::EmptyGlobs { .. })));
    }

    #[test]
    fn bad_regex_fails_at_load() {
        let def = valid("todo").capture(Capture::regex("TODO("));
        let err = load(vec![def]).unwrap_err();
        assert!(matches!(err, LoadError::InvalidPattern { ref rule, .. } if rule == "todo"));
    }

    #[test]
    fn bad_grammar_fails_at_load() {
        let def = valid("nested").capture(Grammar::new(Expr::rule("missing")));
        assert!(matches!(
            load(vec![def]),
            Err(LoadError::InvalidPattern {
                source: PatternError::UndefinedRule { .. },
                ..
            })
        ));
    }

    #[test]
    fn duplicates_across_sources_are_rejected() {
        let first = vec![valid("todo")];
        let second = vec![valid("todo")];
        let err = RuleSet::load(&[&first, &second], &Config::default()).unwrap_err();
        assert!(matches!(err, LoadError::DuplicateName { .. }));
    }

    #[test]
    fn config_disables_and_overrides() {
        let config = Config::parse(
            r#"
[rules.a]
enabled = false

[rules.b]
severity = "critical"
"#,
        )
        .unwrap();
        let defs = vec![valid("a"), valid("b")];
        let set = RuleSet::load(&[&defs], &config).unwrap();
        assert_eq!(set.len(), 1);
        let b = set.get("b").unwrap();
        assert_eq!(b.severity(), Severity::Critical);
        assert_eq!(b.severity_override(), Some(Severity::Critical));
    }

    #[test]
    fn disabled_rules_are_still_validated() {
        let config = Config::parse("[rules.bad]\nenabled = false\n").unwrap();
        let defs = vec![valid("ok"), valid("bad").capture(Capture::regex("("))];
        assert!(RuleSet::load(&[&defs], &config).is_err());
    }

    #[test]
    fn empty_set_is_an_error() {
        assert!(matches!(load(Vec::new()), Err(LoadError::EmptyRuleSet)));
    }

    #[test]
    fn only_restricts_and_checks_names() {
        let set = load(vec![valid("a"), valid("b")]).unwrap();
        let set = set.only(&["b"]).unwrap();
        assert_eq!(set.len(), 1);

        let set = load(vec![valid("a")]).unwrap();
        assert!(matches!(set.only(&["zzz"]), Err(LoadError::UnknownRule { .. })));
    }
}
