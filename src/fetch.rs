//! Release archive download and extraction.
//!
//! The archive is always downloaded fresh; an archive left over from an
//! earlier run is overwritten. Extraction goes into the working directory
//! and must produce the expected source tree.

use crate::layout::Layout;
use anyhow::{Context, Result};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

/// Fetches a URL into a local file.
pub trait Downloader {
    fn download(&self, url: &str, dest: &Path) -> Result<()>;
}

/// Downloads over HTTPS with a progress bar.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpDownloader;

impl Downloader for HttpDownloader {
    fn download(&self, url: &str, dest: &Path) -> Result<()> {
        let response = ureq::get(url)
            .header("User-Agent", "bb-upgrade")
            .call()
            .context("Download failed")?;

        let total_size = response
            .headers()
            .get("content-length")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok());

        let mut file =
            File::create(dest).with_context(|| format!("Failed to create {}", dest.display()))?;

        let pb = match total_size {
            Some(size) => {
                let pb = ProgressBar::new(size);
                pb.set_style(ProgressStyle::default_bar()
                    .template("{spinner:.blue} [{elapsed_precise}] [{bar:40.green/black}] {bytes}/{total_bytes} ({eta})")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .tick_chars("◐◓◑◒")
                    .progress_chars("━━╸"));
                pb
            }
            // GitHub streams tag archives without a length.
            None => {
                let pb = ProgressBar::new_spinner();
                pb.set_style(
                    ProgressStyle::default_spinner()
                        .template("{spinner:.blue} [{elapsed_precise}] {bytes} ({bytes_per_sec})")
                        .unwrap_or_else(|_| ProgressStyle::default_spinner()),
                );
                pb
            }
        };

        let mut reader = response.into_body().into_reader();
        stream_with_progress(&mut reader, &mut file, &pb)
            .with_context(|| format!("Download failed while writing {}", dest.display()))?;
        Ok(())
    }
}

/// Copies `reader` into `writer`, advancing `pb`. The bar is finished on
/// success and abandoned on error.
pub fn stream_with_progress(
    reader: &mut dyn Read,
    writer: &mut dyn Write,
    pb: &ProgressBar,
) -> std::io::Result<u64> {
    let mut buffer = [0; 8192];
    let mut total = 0u64;
    let result = loop {
        let n = match reader.read(&mut buffer) {
            Ok(0) => break Ok(total),
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => break Err(e),
        };
        if let Err(e) = writer.write_all(&buffer[..n]) {
            break Err(e);
        }
        total += n as u64;
        pb.inc(n as u64);
    };

    match &result {
        Ok(_) => pb.finish_with_message("Download complete"),
        Err(_) => pb.abandon_with_message("Download failed"),
    }
    result
}

/// Verify a file's SHA256 hash against an expected value.
/// Returns Ok(true) if hash matches, Ok(false) if no expected hash,
/// or Err if file can't be read or hash doesn't match.
pub fn verify_sha256(path: &Path, expected_hash: Option<&str>) -> Result<bool> {
    let expected = match expected_hash {
        Some(h) => h.trim(),
        None => return Ok(false),
    };

    let mut file = File::open(path).with_context(|| {
        format!(
            "Failed to open file for hash verification: {}",
            path.display()
        )
    })?;

    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];

    loop {
        let n = file.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    let actual_hash = format!("{:x}", hasher.finalize());

    if actual_hash.eq_ignore_ascii_case(expected) {
        Ok(true)
    } else {
        Err(anyhow::anyhow!(
            "SHA256 hash mismatch for {}:\n  Expected: {}\n  Actual:   {}",
            path.display(),
            expected,
            actual_hash
        ))
    }
}

/// Extracts a zip archive into `target_dir`, returning the number of files written.
///
/// Entries whose names would escape `target_dir` are skipped. On Unix the
/// permission bits recorded in the archive are restored.
pub fn extract_zip(archive_path: &Path, target_dir: &Path) -> Result<usize> {
    let file = File::open(archive_path)
        .with_context(|| format!("Failed to open archive {}", archive_path.display()))?;
    let mut archive = zip::ZipArchive::new(file)
        .with_context(|| format!("{} is not a valid zip archive", archive_path.display()))?;

    let mut written = 0;
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let outpath = match entry.enclosed_name() {
            Some(path) => target_dir.join(path),
            None => continue,
        };

        if entry.is_dir() {
            fs::create_dir_all(&outpath)?;
            continue;
        }

        if let Some(p) = outpath.parent()
            && !p.exists()
        {
            fs::create_dir_all(p)?;
        }
        let mut outfile = File::create(&outpath)
            .with_context(|| format!("Failed to write {}", outpath.display()))?;
        std::io::copy(&mut entry, &mut outfile)?;

        #[cfg(unix)]
        if let Some(mode) = entry.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&outpath, fs::Permissions::from_mode(mode & 0o777))?;
        }
        written += 1;
    }
    Ok(written)
}

/// Downloads and extracts the release archive for `layout`.
pub fn fetch(layout: &Layout, downloader: &dyn Downloader, sha256: Option<&str>) -> Result<()> {
    let url = layout.download_url();
    let archive = layout.archive_path();

    println!("{} Downloading {}", "⬇".blue(), url);
    downloader
        .download(&url, &archive)
        .with_context(|| format!("Failed to download {}", url))?;

    if verify_sha256(&archive, sha256)? {
        println!("   {} Checksum verified", "✓".green());
    }

    println!("{} Extracting {}", "📦".blue(), layout.archive_name());
    let count = extract_zip(&archive, layout.root())?;

    let tree = layout.tree_dir();
    if !tree.is_dir() {
        anyhow::bail!(
            "Archive {} did not contain the expected directory {}",
            layout.archive_name(),
            layout.tree_name()
        );
    }
    println!("   {} {} files extracted to {}", "✓".green(), count, layout.tree_name());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UpgradeConfig;
    use std::io::Write;
    use zip::write::FileOptions;

    fn write_zip(path: &Path, entries: &[(&str, &str, u32)]) {
        let file = File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        for (name, content, mode) in entries {
            let options = FileOptions::<()>::default().unix_permissions(*mode);
            zip.start_file(*name, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }

    struct CopyDownloader<'a>(&'a Path);

    impl Downloader for CopyDownloader<'_> {
        fn download(&self, _url: &str, dest: &Path) -> Result<()> {
            fs::copy(self.0, dest)?;
            Ok(())
        }
    }

    struct BrokenReader {
        sent: bool,
    }

    impl Read for BrokenReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.sent {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::ConnectionReset,
                    "connection reset",
                ));
            }
            self.sent = true;
            buf[..4].copy_from_slice(b"PK\x03\x04");
            Ok(4)
        }
    }

    #[test]
    fn test_stream_with_progress_finishes_bar() {
        let pb = ProgressBar::hidden();
        let mut reader = std::io::Cursor::new(vec![7u8; 20_000]);
        let mut out = Vec::new();

        let copied = stream_with_progress(&mut reader, &mut out, &pb).unwrap();
        assert_eq!(copied, 20_000);
        assert_eq!(out.len(), 20_000);
        assert_eq!(pb.position(), 20_000);
        assert!(pb.is_finished());
    }

    #[test]
    fn test_stream_with_progress_abandons_bar_on_error() {
        let pb = ProgressBar::hidden();
        let mut reader = BrokenReader { sent: false };
        let mut out = Vec::new();

        let err = stream_with_progress(&mut reader, &mut out, &pb).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::ConnectionReset);
        assert_eq!(out, b"PK\x03\x04");
        assert!(pb.is_finished());
    }

    #[test]
    fn test_http_error_keeps_cause_chain() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("a.zip");
        // Nothing listens on port 9 of the loopback interface.
        let err = HttpDownloader
            .download("http://127.0.0.1:9/byte-buddy.zip", &dest)
            .unwrap_err();
        assert_eq!(err.to_string(), "Download failed");
        assert!(err.chain().count() > 1);
        assert!(err.downcast_ref::<ureq::Error>().is_some());
        assert!(!dest.exists());
    }

    #[test]
    fn test_verify_sha256_without_expectation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.zip");
        fs::write(&path, b"abc").unwrap();
        assert!(!verify_sha256(&path, None).unwrap());
    }

    #[test]
    fn test_verify_sha256_match_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.zip");
        fs::write(&path, b"abc").unwrap();
        let digest = "BA7816BF8F01CFEA414140DE5DAE2223B00361A396177A9CB410FF61F20015AD";
        assert!(verify_sha256(&path, Some(digest)).unwrap());
    }

    #[test]
    fn test_verify_sha256_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.zip");
        fs::write(&path, b"abc").unwrap();
        let err = verify_sha256(&path, Some("00")).unwrap_err();
        assert!(err.to_string().contains("SHA256 hash mismatch"));
    }

    #[test]
    fn test_extract_creates_nested_files() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("src.zip");
        write_zip(
            &archive,
            &[
                ("tree/pom.xml", "<project/>", 0o644),
                ("tree/byte-buddy-dep/pom.xml", "<project/>", 0o644),
            ],
        );
        let count = extract_zip(&archive, dir.path()).unwrap();
        assert_eq!(count, 2);
        assert!(dir.path().join("tree/byte-buddy-dep/pom.xml").is_file());
    }

    #[test]
    fn test_extract_skips_escaping_entries() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out");
        fs::create_dir(&target).unwrap();
        let archive = dir.path().join("evil.zip");
        write_zip(
            &archive,
            &[("../escaped.txt", "x", 0o644), ("ok.txt", "y", 0o644)],
        );
        extract_zip(&archive, &target).unwrap();
        assert!(!dir.path().join("escaped.txt").exists());
        assert!(target.join("ok.txt").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_extract_restores_executable_bit() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("src.zip");
        write_zip(&archive, &[("tree/mvnw", "#!/bin/sh\n", 0o755)]);
        extract_zip(&archive, dir.path()).unwrap();
        let mode = fs::metadata(dir.path().join("tree/mvnw"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o111, 0o111);
    }

    #[test]
    fn test_extract_rejects_non_zip() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("bad.zip");
        fs::write(&archive, b"<html>not found</html>").unwrap();
        assert!(extract_zip(&archive, dir.path()).is_err());
    }

    #[test]
    fn test_fetch_requires_expected_tree() {
        let dir = tempfile::tempdir().unwrap();
        let staged = dir.path().join("staged.zip");
        write_zip(&staged, &[("unexpected/pom.xml", "", 0o644)]);
        let root = dir.path().join("work");
        fs::create_dir(&root).unwrap();
        let layout = Layout::new("1.12.6", &root, UpgradeConfig::default());

        let err = fetch(&layout, &CopyDownloader(&staged), None).unwrap_err();
        assert!(err.to_string().contains("byte-buddy-byte-buddy-1.12.6"));
        assert!(layout.archive_path().exists());
    }

    #[test]
    fn test_fetch_checksum_mismatch_stops_before_extraction() {
        let dir = tempfile::tempdir().unwrap();
        let staged = dir.path().join("staged.zip");
        write_zip(&staged, &[("byte-buddy-byte-buddy-1.0/pom.xml", "", 0o644)]);
        let root = dir.path().join("work");
        fs::create_dir(&root).unwrap();
        let layout = Layout::new("1.0", &root, UpgradeConfig::default());

        assert!(fetch(&layout, &CopyDownloader(&staged), Some("deadbeef")).is_err());
        assert!(!layout.tree_dir().exists());
    }
}
