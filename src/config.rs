//! Configuration file parsing (`bb-upgrade.toml`).
//!
//! Every field is optional; anything left out falls back to the values used
//! for upstream Byte Buddy releases. Templates may contain `{version}`, which
//! is substituted verbatim with the version given on the command line.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = "bb-upgrade.toml";

#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct UpgradeConfig {
    pub source: SourceConfig,
    pub patches: PatchesConfig,
    pub build: BuildConfig,
    pub artifacts: ArtifactsConfig,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct SourceConfig {
    /// Release archive URL template
    pub url: String,
    /// Local file name of the downloaded archive
    pub archive: String,
    /// Top-level directory inside the archive
    pub tree: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: "https://github.com/raphw/byte-buddy/archive/refs/tags/byte-buddy-{version}.zip"
                .to_string(),
            archive: "byte-buddy-{version}.zip".to_string(),
            tree: "byte-buddy-byte-buddy-{version}".to_string(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct PatchesConfig {
    pub dir: String,
}

impl Default for PatchesConfig {
    fn default() -> Self {
        Self {
            dir: "patches".to_string(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct BuildConfig {
    /// Wrapper script at the root of the source tree
    pub wrapper: String,
    pub goal: String,
    pub profile: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            wrapper: "mvnw".to_string(),
            goal: "package".to_string(),
            profile: "extras".to_string(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ArtifactsConfig {
    pub modules: Vec<String>,
    pub suffixes: Vec<String>,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            modules: vec!["byte-buddy-dep".to_string(), "byte-buddy-agent".to_string()],
            suffixes: vec![
                ".jar".to_string(),
                "-javadoc.jar".to_string(),
                "-sources.jar".to_string(),
            ],
        }
    }
}

impl UpgradeConfig {
    /// Parses a configuration document.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context(
            "Failed to parse configuration - check for syntax errors (missing quotes, brackets)",
        )
    }

    /// Loads an explicitly requested configuration file. The file must exist.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid configuration in {}", path.display()))
    }

    /// Loads `bb-upgrade.toml` from `dir` if present, defaults otherwise.
    pub fn load_default(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }
}
