//! Maven wrapper invocation.
//!
//! Output of the build is inherited so the operator sees Maven's progress
//! directly. This step is long-running and network heavy on a cold local
//! repository.

use crate::layout::Layout;
use crate::process::{CommandRunner, CommandSpec};
use anyhow::{Context, Result};
use colored::*;

/// The wrapper command, e.g. `mvnw package -P extras`, run inside the tree.
pub fn build_command(layout: &Layout) -> CommandSpec {
    let tree = layout.tree_dir();
    let build = &layout.config().build;
    let mut spec = CommandSpec::new(tree.join(layout.wrapper_name()), &tree).arg(&build.goal);
    if !build.profile.is_empty() {
        spec = spec.arg("-P").arg(&build.profile);
    }
    spec
}

pub fn build(layout: &Layout, runner: &dyn CommandRunner, verbose: bool) -> Result<()> {
    let spec = build_command(layout);
    println!("{} Building {} ({})", "🔨".cyan(), layout.tree_name(), spec.display());
    if verbose {
        println!("     {} cd {}", "$".dimmed(), spec.cwd.display());
    }

    runner
        .run(&spec)
        .with_context(|| format!("Build of {} failed", layout.tree_name()))?;

    println!("   {} Build finished", "✓".green());
    Ok(())
}
