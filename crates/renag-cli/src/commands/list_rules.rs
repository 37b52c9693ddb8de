//! List rules command implementation.

use anyhow::Result;
use renag_core::{ComplainerSource, RuleSet};
use renag_rules::BuiltinRules;
use std::io::Write;
use std::path::Path;

use crate::config_resolver;

/// Runs the list-rules command for the project in `project_dir`.
///
/// # Errors
///
/// Returns a [`renag_core::LoadError`] if the configuration or any rule is
/// invalid.
pub fn run(project_dir: &Path, config_path: Option<&Path>) -> Result<()> {
    let loaded = config_resolver::resolve(project_dir, config_path).load()?;

    let mut sources: Vec<&dyn ComplainerSource> = vec![&BuiltinRules];
    if let Some(toml) = &loaded.rules {
        sources.push(toml);
    }
    let rules = RuleSet::load(&sources, &loaded.config)?;

    let mut stdout = std::io::stdout().lock();
    write_table(&mut stdout, &rules)?;
    Ok(())
}

fn write_table(out: &mut impl Write, rules: &RuleSet) -> std::io::Result<()> {
    writeln!(out, "Registered complainers:\n")?;
    writeln!(
        out,
        "{:<25} {:<9} {:<8} Description",
        "Name", "Severity", "Kind"
    )?;
    writeln!(out, "{}", "-".repeat(80))?;

    for rule in rules {
        writeln!(
            out,
            "{:<25} {:<9} {:<8} {}",
            rule.name(),
            rule.severity().to_string(),
            rule.kind(),
            rule.description()
        )?;
    }

    writeln!(out, "\nUse --rules to run only some of them, e.g.:")?;
    writeln!(out, "  renag check --rules debug-print,merge-conflict-marker")?;
    Ok(())
}
