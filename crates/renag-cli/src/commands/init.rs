//! Init command implementation.

use anyhow::{bail, Context, Result};
use std::path::Path;

const DEFAULT_CONFIG: &str = r##"# renag configuration

[scan]
# Directory to scan, relative to the path given to `renag check`
# root = "."

# Glob patterns removed before any rule runs
exclude = [
    ".git/**",
    "build/**",
    "node_modules/**",
]

# Respect .gitignore files
respect_gitignore = true

# Worker threads (1 = sequential; default: one per core)
# parallelism = 4

# Force coloured output on or off (default: when stdout is a terminal)
# color = false

# Built-in rules can be disabled or have their severity overridden

# [rules.debug-print]
# enabled = false

# [rules.pprint-usage]
# severity = "critical"

# Declarative complainers: one [[complainer]] table per rule

# [[complainer]]
# name = "no-breakpoint"
# description = "Leftover debugger breakpoint."
# capture = 'breakpoint\(\)'
# severity = "critical"
# glob = ["*.py"]
# exclude_glob = ["test_*.py"]
# help = "Remove the call before committing."
# skip_commented = "#"
"##;

/// Writes a starter `renag.toml` into `dir`.
///
/// # Errors
///
/// Returns an error if the file exists and `force` is not set, or if the
/// write fails.
pub fn run(dir: &Path, force: bool) -> Result<()> {
    let config_path = dir.join("renag.toml");

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    println!("Created {}", config_path.display());
    println!("\nNext steps:");
    println!("  1. Edit renag.toml to add complainers");
    println!("  2. Run: renag check");

    Ok(())
}
