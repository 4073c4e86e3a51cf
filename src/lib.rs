//! # bytebuddy-upgrade
//!
//! Rebuilds a Byte Buddy release with local patches for the agent build.
//!
//! ## Pipeline
//!
//! ```text
//! fetch -> patch -> build -> collect -> cleanup
//! ```
//!
//! 1. Download the tagged release archive from GitHub and extract it
//! 2. Apply every file in `patches/` with `patch -p1`
//! 3. Run `mvnw package -P extras` inside the extracted tree
//! 4. Move the `byte-buddy-dep` and `byte-buddy-agent` jars (plain, javadoc, sources)
//!    into the working directory
//! 5. Remove the extracted tree and the archive
//!
//! ## Module Organization
//!
//! - [`pipeline`] - Step ordering, dry-run plan and summary
//! - [`layout`] - Paths and URLs derived from the version
//! - [`config`] - Configuration parsing (`bb-upgrade.toml`)
//! - [`process`] - External command execution

/// Maven wrapper invocation.
pub mod build;

/// Removal of the extracted tree and archive.
pub mod cleanup;

/// Moving built jars into the working directory.
pub mod collect;

/// Configuration file parsing (`bb-upgrade.toml`).
pub mod config;

/// Hints for failed patch applications.
pub mod feedback;

/// Release archive download, verification and extraction.
pub mod fetch;

/// Paths and URLs derived from the version string.
pub mod layout;

/// Patch discovery and application.
pub mod patch;

/// Step ordering and dry-run planning.
pub mod pipeline;

/// External command execution.
pub mod process;

/// Terminal UI utilities (tables).
pub mod ui;
