//! Candidate file listing: a full walk of the scan root, or the git index.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Lists every file under `root`, relative to it.
///
/// Hidden files are included; `.git/` is never entered. `.gitignore` rules
/// apply when `respect_gitignore` is set.
///
/// # Errors
///
/// Returns an error if a directory cannot be read.
pub fn walk(root: &Path, respect_gitignore: bool) -> Result<Vec<PathBuf>> {
    let mut builder = ignore::WalkBuilder::new(root);
    builder
        .hidden(false)
        .parents(respect_gitignore)
        .ignore(respect_gitignore)
        .git_ignore(respect_gitignore)
        .git_global(respect_gitignore)
        .git_exclude(respect_gitignore)
        .require_git(false)
        .filter_entry(|entry| entry.file_name() != ".git");

    let mut files = Vec::new();
    for entry in builder.build() {
        let entry = entry.with_context(|| format!("Failed to walk {}", root.display()))?;
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        files.push(relative(root, entry.path()));
    }

    files.sort();
    tracing::debug!("Walked {} files under {}", files.len(), root.display());
    Ok(files)
}

/// Lists files staged in the git index that differ from `HEAD` (added,
/// copied, modified or renamed), relative to `root`.
///
/// Untracked and deleted files are not included.
///
/// # Errors
///
/// Returns an error if git cannot be run or `root` is not inside a repository.
pub fn staged(root: &Path) -> Result<Vec<PathBuf>> {
    let output = Command::new("git")
        .args([
            "diff",
            "--cached",
            "--name-only",
            "--diff-filter=ACMR",
            "--relative",
            "-z",
        ])
        .current_dir(root)
        .output()
        .context("Failed to run git")?;

    if !output.status.success() {
        bail!(
            "git diff --cached failed in {}: {}",
            root.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    let mut files = parse_name_list(&output.stdout);
    files.sort();
    tracing::debug!("Found {} staged files", files.len());
    Ok(files)
}

/// Splits NUL-separated `git --name-only -z` output.
fn parse_name_list(stdout: &[u8]) -> Vec<PathBuf> {
    stdout
        .split(|b| *b == 0)
        .filter(|name| !name.is_empty())
        .map(|name| PathBuf::from(String::from_utf8_lossy(name).as_ref()))
        .collect()
}

/// `path` relative to `root`, joined with `/` on every platform.
fn relative(root: &Path, path: &Path) -> PathBuf {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let joined = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    PathBuf::from(joined)
}
