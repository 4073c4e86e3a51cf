//! Artifact collection.
//!
//! Moves the jars produced by the build out of the module `target`
//! directories into the working directory. A missing jar aborts the run, for
//! example when the build ran without the `extras` profile and produced no
//! javadoc or sources jars.

use crate::layout::{Artifact, Layout};
use anyhow::{Context, Result};
use colored::*;
use std::fs;

pub fn collect(layout: &Layout) -> Result<Vec<Artifact>> {
    println!("{} Collecting artifacts", "📦".blue());
    let artifacts = layout.artifacts();
    for artifact in &artifacts {
        fs::rename(&artifact.source, &artifact.destination).with_context(|| {
            format!(
                "Failed to move artifact {} to {}",
                artifact.source.display(),
                artifact.destination.display()
            )
        })?;
        println!("   {} {}", "+".green(), artifact.file_name);
    }
    Ok(artifacts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UpgradeConfig;

    fn produce(layout: &Layout, skip: Option<&str>) {
        for artifact in layout.artifacts() {
            if Some(artifact.file_name.as_str()) == skip {
                continue;
            }
            fs::create_dir_all(artifact.source.parent().unwrap()).unwrap();
            fs::write(&artifact.source, artifact.file_name.as_bytes()).unwrap();
        }
    }

    #[test]
    fn test_collect_moves_all_six() {
        let dir = tempfile::tempdir().unwrap();
        let layout = Layout::new("1.12.6", dir.path(), UpgradeConfig::default());
        produce(&layout, None);

        let moved = collect(&layout).unwrap();
        assert_eq!(moved.len(), 6);
        for artifact in moved {
            assert!(!artifact.source.exists());
            let content = fs::read_to_string(&artifact.destination).unwrap();
            assert_eq!(content, artifact.file_name);
        }
        assert!(dir.path().join("byte-buddy-agent-1.12.6-sources.jar").is_file());
    }

    #[test]
    fn test_missing_artifact_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let layout = Layout::new("1.12.6", dir.path(), UpgradeConfig::default());
        produce(&layout, Some("byte-buddy-dep-1.12.6-javadoc.jar"));

        let err = collect(&layout).unwrap_err();
        assert!(err.to_string().contains("byte-buddy-dep-1.12.6-javadoc.jar"));
        let io = err.downcast_ref::<std::io::Error>().unwrap();
        assert_eq!(io.kind(), std::io::ErrorKind::NotFound);
        // Jars for the first suffix were already moved.
        assert!(dir.path().join("byte-buddy-dep-1.12.6.jar").exists());
    }

    #[test]
    fn test_existing_destination_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let layout = Layout::new("1.0", dir.path(), UpgradeConfig::default());
        produce(&layout, None);
        fs::write(dir.path().join("byte-buddy-dep-1.0.jar"), "stale").unwrap();

        collect(&layout).unwrap();
        let content = fs::read_to_string(dir.path().join("byte-buddy-dep-1.0.jar")).unwrap();
        assert_eq!(content, "byte-buddy-dep-1.0.jar");
    }
}
