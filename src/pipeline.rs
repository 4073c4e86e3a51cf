//! Upgrade pipeline orchestration.
//!
//! Fetch, patch, build, collect and cleanup run strictly in that order. The
//! first failure stops the run and nothing is rolled back.

use crate::build;
use crate::cleanup;
use crate::collect;
use crate::fetch::{self, Downloader};
use crate::layout::{Artifact, Layout};
use crate::patch;
use crate::process::{CommandRunner, relative_to};
use crate::ui::{Table, human_size};
use anyhow::{Context, Result};
use colored::*;
use std::fmt;
use std::fs;
use std::time::Instant;

/// One stage of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Fetch,
    Patch,
    Build,
    Collect,
    Cleanup,
}

impl Step {
    pub const ALL: [Step; 5] = [
        Step::Fetch,
        Step::Patch,
        Step::Build,
        Step::Collect,
        Step::Cleanup,
    ];
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Fetch => "fetch",
            Step::Patch => "patch",
            Step::Build => "build",
            Step::Collect => "collect",
            Step::Cleanup => "cleanup",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Expected SHA-256 of the release archive
    pub sha256: Option<String>,
    /// Leave the extracted tree and archive in place
    pub keep_sources: bool,
    pub verbose: bool,
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub patches_applied: usize,
    pub artifacts: Vec<Artifact>,
    pub cleaned: bool,
}

pub struct Pipeline<'a> {
    layout: Layout,
    downloader: &'a dyn Downloader,
    runner: &'a dyn CommandRunner,
    options: RunOptions,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        layout: Layout,
        downloader: &'a dyn Downloader,
        runner: &'a dyn CommandRunner,
        options: RunOptions,
    ) -> Self {
        Self {
            layout,
            downloader,
            runner,
            options,
        }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn run(&self) -> Result<RunReport> {
        let start = Instant::now();
        println!(
            "{} Upgrading Byte Buddy to {}",
            "🚀".green(),
            self.layout.version().bold()
        );

        fetch::fetch(
            &self.layout,
            self.downloader,
            self.options.sha256.as_deref(),
        )
        .context(step_failed(Step::Fetch))?;

        println!("{} Applying patches", "🩹".cyan());
        let patches_applied = patch::apply_patches(&self.layout, self.runner, self.options.verbose)
            .context(step_failed(Step::Patch))?;

        build::build(&self.layout, self.runner, self.options.verbose)
            .context(step_failed(Step::Build))?;

        let artifacts = collect::collect(&self.layout).context(step_failed(Step::Collect))?;

        let cleaned = if self.options.keep_sources {
            println!(
                "{} Keeping {} and {}",
                "!".yellow(),
                self.layout.tree_name(),
                self.layout.archive_name()
            );
            false
        } else {
            cleanup::cleanup(&self.layout).context(step_failed(Step::Cleanup))?;
            true
        };

        print_summary(&artifacts);
        println!(
            "{} Byte Buddy {} ready in {:.1}s",
            "✓".green(),
            self.layout.version(),
            start.elapsed().as_secs_f64()
        );

        Ok(RunReport {
            patches_applied,
            artifacts,
            cleaned,
        })
    }

    /// Describes every step without touching the network or the filesystem.
    pub fn plan(&self) -> Vec<(Step, Vec<String>)> {
        let layout = &self.layout;
        let tree = layout.tree_dir();
        let mut plan = Vec::new();

        let mut fetch = vec![format!("download {}", layout.download_url())];
        if let Some(sha) = &self.options.sha256 {
            fetch.push(format!("verify sha256 {}", sha));
        }
        fetch.push(format!("extract {} -> {}/", layout.archive_name(), layout.tree_name()));
        plan.push((Step::Fetch, fetch));

        let patches = match patch::list_patches(&layout.patches_dir()) {
            Ok(patches) if patches.is_empty() => vec!["no patches".to_string()],
            Ok(patches) => patches
                .iter()
                .map(|p| patch::patch_command(layout, p))
                .map(|spec| match &spec.stdin {
                    Some(file) => format!("patch -p1 < {}", relative_to(file, &tree).display()),
                    None => spec.display(),
                })
                .collect(),
            Err(e) => vec![format!("{:#}, the patch step would fail", e)],
        };
        plan.push((Step::Patch, patches));

        plan.push((
            Step::Build,
            vec![format!("{} (in {}/)", build::build_command(layout).display(), layout.tree_name())],
        ));

        plan.push((
            Step::Collect,
            layout
                .artifacts()
                .iter()
                .map(|a| format!("move {}", a.file_name))
                .collect(),
        ));

        let cleanup = if self.options.keep_sources {
            vec!["skipped (--keep-sources)".to_string()]
        } else {
            vec![
                format!("remove {}/", layout.tree_name()),
                format!("remove {}", layout.archive_name()),
            ]
        };
        plan.push((Step::Cleanup, cleanup));

        plan
    }

    /// Archive and tree left on disk, e.g. after a failed run.
    pub fn leftovers(&self) -> Vec<String> {
        let mut found = Vec::new();
        if self.layout.tree_dir().exists() {
            found.push(format!("{}/", self.layout.tree_name()));
        }
        if self.layout.archive_path().exists() {
            found.push(self.layout.archive_name());
        }
        found
    }

    pub fn print_plan(&self) {
        println!(
            "{} Dry run for Byte Buddy {}",
            "🔍".blue(),
            self.layout.version().bold()
        );
        for (i, (step, actions)) in self.plan().iter().enumerate() {
            println!("{} {}", format!("[{}/{}]", i + 1, Step::ALL.len()).dimmed(), step.to_string().bold());
            for action in actions {
                println!("      {}", action);
            }
        }
    }
}

fn step_failed(step: Step) -> String {
    format!("{} step failed", step)
}

fn print_summary(artifacts: &[Artifact]) {
    let mut table = Table::new(&["Artifact", "Size"]);
    for artifact in artifacts {
        let size = fs::metadata(&artifact.destination)
            .map(|m| human_size(m.len()))
            .unwrap_or_else(|_| "?".to_string());
        table.add_row(vec![artifact.file_name.green().to_string(), size]);
    }
    table.print();
}
