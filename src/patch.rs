//! Patch discovery and application.
//!
//! Patches are applied in the order the filesystem lists them. That order is
//! platform dependent and is intentionally left unsorted.

use crate::feedback::FeedbackAnalyzer;
use crate::layout::Layout;
use crate::process::{CommandError, CommandRunner, CommandSpec, relative_to};
use anyhow::{Context, Result};
use colored::*;
use std::fs;
use std::path::{Path, PathBuf};

/// Lists every entry of `dir` in directory-listing order.
pub fn list_patches(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to read patches directory {}", dir.display()))?;
    let mut patches = Vec::new();
    for entry in entries {
        let entry = entry
            .with_context(|| format!("Failed to read patches directory {}", dir.display()))?;
        patches.push(entry.path());
    }
    Ok(patches)
}

/// The `patch -p1 < file` invocation for one patch file.
pub fn patch_command(layout: &Layout, patch: &Path) -> CommandSpec {
    let tree = layout.tree_dir();
    CommandSpec::new("patch", &tree)
        .arg("-p1")
        .stdin_file(patch)
}

/// Applies every patch to the extracted tree. Stops at the first failure;
/// patches applied before it stay applied.
pub fn apply_patches(layout: &Layout, runner: &dyn CommandRunner, verbose: bool) -> Result<usize> {
    let patches = list_patches(&layout.patches_dir())?;
    let tree = layout.tree_dir();

    if patches.is_empty() {
        println!("   {} No patches found", "!".yellow());
        return Ok(0);
    }

    for patch in &patches {
        let name = patch
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        println!("   {} Applying {}", "+".green(), name);

        let spec = patch_command(layout, patch);
        if verbose {
            println!(
                "     {} patch -p1 < {}",
                "$".dimmed(),
                relative_to(patch, &tree).display()
            );
        }

        let output = runner.run_captured(&spec)?;
        for line in output.combined().lines() {
            println!("     {}", line.dimmed());
        }

        if !output.success {
            if let Some(hint) = FeedbackAnalyzer::analyze(&output.combined()) {
                println!("\n{} {}\n", "💡".yellow(), hint);
            }
            return Err(CommandError::failed(&spec, output.code))
                .with_context(|| format!("Failed to apply patch {}", name));
        }
    }

    println!("   {} {} patches applied", "✓".green(), patches.len());
    Ok(patches.len())
}
