//! # bb-upgrade CLI Entry Point
//!
//! Parses the version argument and options with clap, loads the optional
//! configuration file and runs the upgrade pipeline in the working directory.

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use std::path::PathBuf;

use bytebuddy_upgrade::config::UpgradeConfig;
use bytebuddy_upgrade::fetch::HttpDownloader;
use bytebuddy_upgrade::layout::Layout;
use bytebuddy_upgrade::pipeline::{Pipeline, RunOptions};
use bytebuddy_upgrade::process::SystemRunner;

#[cfg(windows)]
#[link(name = "kernel32")]
unsafe extern "system" {
    fn SetConsoleOutputCP(wCodePageID: u32) -> i32;
}

#[cfg(windows)]
fn enable_windows_utf8_console() {
    unsafe {
        SetConsoleOutputCP(65001);
    }
}

#[cfg(not(windows))]
fn enable_windows_utf8_console() {}

#[derive(Parser)]
#[command(name = "bb-upgrade")]
#[command(about = "Fetch, patch, build and repackage a Byte Buddy release", version = env!("CARGO_PKG_VERSION"))]
#[command(after_help = "BB-VERSION example: 1.12.6")]
struct Cli {
    /// Byte Buddy release to build
    #[arg(value_name = "BB-VERSION")]
    bb_version: String,

    /// Working directory (default: current directory)
    #[arg(short = 'C', long = "directory", value_name = "DIR")]
    directory: Option<PathBuf>,

    /// Directory holding the patch files [default: patches]
    #[arg(long, value_name = "DIR")]
    patches: Option<String>,

    /// Configuration file (default: bb-upgrade.toml in the working directory, if present)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Expected SHA-256 of the release archive
    #[arg(long, value_name = "HEX")]
    sha256: Option<String>,

    /// Keep the extracted sources and the archive after the run
    #[arg(long)]
    keep_sources: bool,

    /// Show what would be executed without running
    #[arg(long)]
    dry_run: bool,

    /// Print every external command before it runs
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    enable_windows_utf8_console();

    let cli = Cli::parse();

    let root = match cli.directory {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };

    let mut config = match &cli.config {
        Some(path) => UpgradeConfig::load(path)?,
        None => UpgradeConfig::load_default(&root)?,
    };
    if let Some(patches) = cli.patches {
        config.patches.dir = patches;
    }

    let layout = Layout::new(cli.bb_version, root, config);
    let options = RunOptions {
        sha256: cli.sha256,
        keep_sources: cli.keep_sources,
        verbose: cli.verbose,
    };
    let pipeline = Pipeline::new(layout, &HttpDownloader, &SystemRunner, options);

    if cli.dry_run {
        pipeline.print_plan();
        return Ok(());
    }

    if let Err(e) = pipeline.run() {
        let leftovers = pipeline.leftovers();
        if !leftovers.is_empty() {
            eprintln!(
                "{} Left in place for inspection: {}",
                "!".yellow(),
                leftovers.join(", ")
            );
        }
        return Err(e);
    }
    Ok(())
}
