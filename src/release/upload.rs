//! Release creation and asset upload
//!
//! One `gh release create` uploads every archive; a follow-up
//! `gh release view --json assets` recovers the download URLs, which are
//! matched back to the archives by file name.

use crate::core::error::{PipelineError, ShipError, ShipResult};
use crate::core::exec::{CommandRunner, Invocation};
use crate::release::archive::ArchivedBinary;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Where the release body comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteSource {
  Text(String),
  File(PathBuf),
}

impl Default for NoteSource {
  fn default() -> Self {
    NoteSource::Text(String::new())
  }
}

/// An asset attached to a published release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseAsset {
  pub name: String,
  pub url: String,
}

/// Code host that stores tagged releases
pub trait ReleaseHost {
  /// Whether the host's CLI can be used at all
  fn is_available(&self) -> bool;

  /// Create release `tag` with all `assets` attached in one call
  fn create_release(&self, tag: &str, assets: &[PathBuf], notes: &NoteSource, project: &Path) -> ShipResult<()>;

  fn list_assets(&self, tag: &str, project: &Path) -> ShipResult<Vec<ReleaseAsset>>;
}

#[derive(Deserialize)]
struct ReleaseView {
  #[serde(default)]
  assets: Vec<ReleaseAsset>,
}

/// GitHub CLI backend
pub struct GhCli<'a> {
  runner: &'a dyn CommandRunner,
  timeout: Duration,
}

impl<'a> GhCli<'a> {
  pub const PROGRAM: &'static str = "gh";

  pub fn new(runner: &'a dyn CommandRunner, timeout: Duration) -> Self {
    Self { runner, timeout }
  }
}

impl ReleaseHost for GhCli<'_> {
  fn is_available(&self) -> bool {
    which::which(Self::PROGRAM).is_ok()
  }

  fn create_release(&self, tag: &str, assets: &[PathBuf], notes: &NoteSource, project: &Path) -> ShipResult<()> {
    let mut invocation = Invocation::new(Self::PROGRAM).args(["release", "create", tag]);
    for asset in assets {
      invocation = invocation.path_arg(asset);
    }
    invocation = invocation.args(["--title", tag]);
    invocation = match notes {
      NoteSource::Text(text) => invocation.arg("--notes").arg(text.as_str()),
      NoteSource::File(path) => invocation.arg("--notes-file").path_arg(path),
    };
    let invocation = invocation.current_dir(project).timeout(self.timeout);

    let output = self.runner.run(&invocation)?;
    if !output.success() {
      return Err(
        PipelineError::ReleaseUploadFailed {
          reason: format!("gh release create {} failed: {}", tag, output.stderr.trim()),
        }
        .into(),
      );
    }
    Ok(())
  }

  fn list_assets(&self, tag: &str, project: &Path) -> ShipResult<Vec<ReleaseAsset>> {
    let invocation = Invocation::new(Self::PROGRAM)
      .args(["release", "view", tag, "--json", "assets"])
      .current_dir(project)
      .timeout(self.timeout);

    let output = self.runner.run(&invocation)?;
    if !output.success() {
      return Err(
        PipelineError::ReleaseUploadFailed {
          reason: format!("gh release view {} failed: {}", tag, output.stderr.trim()),
        }
        .into(),
      );
    }

    let view: ReleaseView = serde_json::from_str(&output.stdout).map_err(|e| PipelineError::ReleaseUploadFailed {
      reason: format!("could not parse asset list for {}: {}", tag, e),
    })?;
    Ok(view.assets)
  }
}

/// Uploads archives and resolves their download URLs
pub struct ReleaseUploader<'a> {
  host: &'a dyn ReleaseHost,
}

impl<'a> ReleaseUploader<'a> {
  pub fn new(host: &'a dyn ReleaseHost) -> Self {
    Self { host }
  }

  /// Publish `version` with every archive attached.
  ///
  /// Returns one URL per archive, in the order the archives were given.
  pub fn upload(
    &self,
    version: &str,
    archives: &[ArchivedBinary],
    notes: &NoteSource,
    project: &Path,
  ) -> ShipResult<Vec<String>> {
    let paths: Vec<PathBuf> = archives.iter().map(|a| a.archive_path.clone()).collect();
    info!(version, assets = paths.len(), "creating release");
    self.host.create_release(version, &paths, notes, project)?;

    let listed = self.host.list_assets(version, project)?;
    debug!(listed = listed.len(), "release assets");
    let urls = match_asset_urls(archives, &listed)?;

    if urls.len() != archives.len() {
      return Err(
        PipelineError::ReleaseUploadFailed {
          reason: format!("expected {} asset URLs, got {}", archives.len(), urls.len()),
        }
        .into(),
      );
    }
    Ok(urls)
  }
}

/// Pair each archive with the listed asset of the same file name
fn match_asset_urls(archives: &[ArchivedBinary], listed: &[ReleaseAsset]) -> ShipResult<Vec<String>> {
  archives
    .iter()
    .map(|archive| {
      let name = archive.file_name();
      listed
        .iter()
        .find(|asset| asset.name == name)
        .map(|asset| asset.url.clone())
        .ok_or_else(|| {
          ShipError::from(PipelineError::ReleaseUploadFailed {
            reason: format!("asset {} missing from release", name),
          })
        })
    })
    .collect()
}
