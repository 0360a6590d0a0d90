pub mod system_git;
mod system_git_ops;

pub use system_git::SystemGit;

use crate::core::error::ShipResult;
use std::path::Path;

/// Visibility for a newly created remote repository
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoVisibility {
  Public,
  Private,
}

/// Version-control operations the publish pipeline depends on
pub trait VersionControl {
  /// True when the working tree at `path` has staged, unstaged, or untracked changes
  fn has_uncommitted_changes(&self, path: &Path) -> ShipResult<bool>;

  /// Stage everything, commit with `message`, and push the current branch
  fn commit_and_push(&self, path: &Path, message: &str) -> ShipResult<()>;

  /// URL of the `origin` remote, if configured
  fn remote_url(&self, path: &Path) -> ShipResult<Option<String>>;

  /// Highest release tag in the repository, as written in the tag
  fn previous_release_version(&self, path: &Path) -> ShipResult<Option<String>>;

  /// Initialize a new repository at `path`
  fn init(&self, path: &Path) -> ShipResult<()>;

  /// Create a repository on the code host and register it as `origin` of `path`.
  ///
  /// Returns the new remote URL.
  fn create_remote_repo(&self, path: &Path, name: &str, visibility: RepoVisibility) -> ShipResult<String>;
}
