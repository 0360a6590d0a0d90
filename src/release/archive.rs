//! Archiving and hashing of built binaries
//!
//! Each binary becomes `<name><suffix>.tar.gz` next to the binary itself,
//! hashed with `shasum -a 256`. Originals are never touched.

use crate::core::error::{PipelineError, ShipError, ShipResult};
use crate::core::exec::{CommandRunner, Invocation};
use crate::core::fs::FileSystem;
use crate::release::arch::ArchitectureTarget;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

const ARCHIVE_EXTENSION: &str = ".tar.gz";

/// A binary and its compressed, hashed archive
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchivedBinary {
  pub original_path: PathBuf,
  pub archive_path: PathBuf,
  /// Lowercase hex SHA-256 of the archive
  pub content_hash: String,
}

impl ArchivedBinary {
  /// File name of the archive, as it appears in the release
  pub fn file_name(&self) -> String {
    self
      .archive_path
      .file_name()
      .map(|n| n.to_string_lossy().into_owned())
      .unwrap_or_default()
  }

  /// Architecture implied by the original binary's location
  pub fn architecture(&self) -> Option<ArchitectureTarget> {
    ArchitectureTarget::from_build_path(&self.original_path)
  }
}

/// Suffix for a binary path based on its build-directory marker
pub fn archive_suffix(path: &Path) -> &'static str {
  ArchitectureTarget::from_build_path(path)
    .map(ArchitectureTarget::archive_suffix)
    .unwrap_or("")
}

/// `<fileName><suffix>.tar.gz`
pub fn archive_name(path: &Path) -> ShipResult<String> {
  let file_name = path
    .file_name()
    .ok_or_else(|| ShipError::message(format!("Binary path has no file name: {}", path.display())))?;
  Ok(format!(
    "{}{}{}",
    file_name.to_string_lossy(),
    archive_suffix(path),
    ARCHIVE_EXTENSION
  ))
}

/// First whitespace-delimited token of `shasum` output, if it is hex
pub fn parse_hash(output: &str) -> Option<String> {
  let token = output.split_whitespace().next()?;
  token
    .chars()
    .all(|c| c.is_ascii_hexdigit())
    .then(|| token.to_ascii_lowercase())
}

/// Creates and removes release archives
pub struct Archiver<'a> {
  runner: &'a dyn CommandRunner,
  fs: &'a dyn FileSystem,
  timeout: Duration,
}

impl<'a> Archiver<'a> {
  pub fn new(runner: &'a dyn CommandRunner, fs: &'a dyn FileSystem, timeout: Duration) -> Self {
    Self { runner, fs, timeout }
  }

  /// Archive and hash each binary, in order
  pub fn create_archives(&self, binary_paths: &[PathBuf]) -> ShipResult<Vec<ArchivedBinary>> {
    binary_paths.iter().map(|path| self.create_archive(path)).collect()
  }

  fn create_archive(&self, binary: &Path) -> ShipResult<ArchivedBinary> {
    let directory = binary
      .parent()
      .ok_or_else(|| ShipError::message(format!("Binary path has no parent: {}", binary.display())))?;
    let file_name = binary
      .file_name()
      .map(|n| n.to_string_lossy().into_owned())
      .ok_or_else(|| ShipError::message(format!("Binary path has no file name: {}", binary.display())))?;
    let name = archive_name(binary)?;
    let archive_path = directory.join(&name);

    let tar = Invocation::new("tar")
      .args(["-czf", name.as_str(), file_name.as_str()])
      .current_dir(directory)
      .timeout(self.timeout);
    let output = self.runner.run(&tar)?;
    if !output.success() {
      return Err(ShipError::message(format!(
        "Failed to archive {}:\n{}",
        binary.display(),
        output.stderr.trim_end()
      )));
    }

    if !self.fs.exists(&archive_path) {
      return Err(ShipError::message(format!(
        "Archive was not created: {}",
        archive_path.display()
      )));
    }

    let shasum = Invocation::new("shasum")
      .args(["-a", "256"])
      .path_arg(&archive_path)
      .timeout(self.timeout);
    let output = self.runner.run(&shasum)?;
    let content_hash = parse_hash(&output.stdout)
      .filter(|_| output.success())
      .ok_or_else(|| PipelineError::MissingHash {
        archive: archive_path.clone(),
        output: output.combined(),
      })?;

    debug!(archive = %archive_path.display(), sha256 = %content_hash, "archived");
    Ok(ArchivedBinary {
      original_path: binary.to_path_buf(),
      archive_path,
      content_hash,
    })
  }

  /// Delete the archive files. Only `.tar.gz` paths are removed.
  pub fn cleanup(&self, archives: &[ArchivedBinary]) -> ShipResult<()> {
    for archive in archives {
      let path = &archive.archive_path;
      if !path.to_string_lossy().ends_with(ARCHIVE_EXTENSION) {
        warn!(path = %path.display(), "refusing to delete non-archive file");
        continue;
      }
      if !self.fs.exists(path) {
        continue;
      }
      self.fs.delete_file(path)?;
      debug!(path = %path.display(), "removed archive");
    }
    Ok(())
  }
}
