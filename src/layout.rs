//! Path and URL derivation.
//!
//! The version string is never parsed. It is substituted into the
//! `{version}` placeholders of the configured templates, so the archive, the
//! extracted tree and every artifact name are always derived from the same
//! value.

use crate::config::UpgradeConfig;
use std::path::{Path, PathBuf};

const VERSION_PLACEHOLDER: &str = "{version}";

fn render(template: &str, version: &str) -> String {
    template.replace(VERSION_PLACEHOLDER, version)
}

/// A produced artifact: where the build leaves it and where it is moved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub file_name: String,
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// Every location touched by one upgrade run.
#[derive(Debug, Clone)]
pub struct Layout {
    version: String,
    root: PathBuf,
    config: UpgradeConfig,
}

impl Layout {
    pub fn new(version: impl Into<String>, root: impl Into<PathBuf>, config: UpgradeConfig) -> Self {
        Self {
            version: version.into(),
            root: root.into(),
            config,
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &UpgradeConfig {
        &self.config
    }

    pub fn download_url(&self) -> String {
        render(&self.config.source.url, &self.version)
    }

    pub fn archive_name(&self) -> String {
        render(&self.config.source.archive, &self.version)
    }

    pub fn archive_path(&self) -> PathBuf {
        self.root.join(self.archive_name())
    }

    pub fn tree_name(&self) -> String {
        render(&self.config.source.tree, &self.version)
    }

    /// The extracted source tree.
    pub fn tree_dir(&self) -> PathBuf {
        self.root.join(self.tree_name())
    }

    /// Patches directory. Relative paths resolve against the working root.
    pub fn patches_dir(&self) -> PathBuf {
        self.root.join(&self.config.patches.dir)
    }

    /// Platform-specific name of the build wrapper script.
    pub fn wrapper_name(&self) -> String {
        let wrapper = &self.config.build.wrapper;
        if cfg!(windows) && !wrapper.ends_with(".cmd") {
            format!("{}.cmd", wrapper)
        } else {
            wrapper.clone()
        }
    }

    /// Artifacts in suffix-major order: every module for the first suffix,
    /// then every module for the next.
    pub fn artifacts(&self) -> Vec<Artifact> {
        let tree = self.tree_dir();
        let mut artifacts = Vec::new();
        for suffix in &self.config.artifacts.suffixes {
            for module in &self.config.artifacts.modules {
                let file_name = format!("{}-{}{}", module, self.version, suffix);
                artifacts.push(Artifact {
                    source: tree.join(module).join("target").join(&file_name),
                    destination: self.root.join(&file_name),
                    file_name,
                });
            }
        }
        artifacts
    }
}
