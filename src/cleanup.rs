//! Removal of the extracted tree and the downloaded archive.
//!
//! Only reached after every earlier step succeeded, so a failed run leaves
//! both on disk for inspection.

use crate::layout::Layout;
use anyhow::{Context, Result};
use colored::*;
use std::fs;

pub fn cleanup(layout: &Layout) -> Result<()> {
    let tree = layout.tree_dir();
    fs::remove_dir_all(&tree)
        .with_context(|| format!("Failed to remove {} directory", tree.display()))?;
    println!("{} Removed {}/", "🗑️".red(), layout.tree_name());

    let archive = layout.archive_path();
    fs::remove_file(&archive)
        .with_context(|| format!("Failed to remove {}", archive.display()))?;
    println!("{} Removed {}", "🗑️".red(), layout.archive_name());

    Ok(())
}
