//! System git backend
//!
//! Drives the `git` binary through a [`CommandRunner`], so every call is
//! subject to the same timeout and cancellation rules as the build.

use crate::core::error::{GitError, ShipResult};
use crate::core::exec::{CommandOutput, CommandRunner, Invocation};
use std::path::Path;
use std::time::Duration;

/// Git backend using the system `git` binary
pub struct SystemGit<'a> {
  pub(crate) runner: &'a dyn CommandRunner,
  pub(crate) timeout: Duration,
}

impl<'a> SystemGit<'a> {
  pub fn new(runner: &'a dyn CommandRunner, timeout: Duration) -> Self {
    Self { runner, timeout }
  }

  /// Build a git invocation rooted at `path`
  ///
  /// Safe configuration overrides are forced regardless of user config.
  /// Messages are pinned to the C locale (stderr is matched on) and git never
  /// prompts for credentials, since stdin is closed.
  pub(crate) fn git_cmd(&self, path: &Path) -> Invocation {
    Invocation::new("git")
      .arg("-C")
      .path_arg(path)
      .args(["-c", "advice.detachedHead=false"])
      .args(["-c", "core.quotePath=false"])
      .env("LC_ALL", "C")
      .env("GIT_TERMINAL_PROMPT", "0")
      .timeout(self.timeout)
  }

  /// Run a git invocation and fail on non-zero exit
  pub(crate) fn run_checked(&self, invocation: Invocation, label: &str) -> ShipResult<CommandOutput> {
    let output = self.runner.run(&invocation)?;
    if !output.success() {
      if output.stderr.contains("not a git repository") {
        let path = invocation
          .get_args()
          .get(1)
          .map(std::path::PathBuf::from)
          .unwrap_or_default();
        return Err(GitError::RepoNotFound { path }.into());
      }
      return Err(
        GitError::CommandFailed {
          command: label.to_string(),
          stderr: output.stderr,
        }
        .into(),
      );
    }
    Ok(output)
  }

  /// Get current branch name
  pub fn current_branch(&self, path: &Path) -> ShipResult<String> {
    let output = self.runner.run(&self.git_cmd(path).args(["rev-parse", "--abbrev-ref", "HEAD"]))?;
    if !output.success() {
      return Ok("HEAD".to_string()); // Detached HEAD
    }
    Ok(output.stdout.trim().to_string())
  }

  /// Porcelain status lines for the working tree
  pub fn status_porcelain(&self, path: &Path) -> ShipResult<Vec<String>> {
    let output = self.run_checked(self.git_cmd(path).args(["status", "--porcelain"]), "git status --porcelain")?;
    Ok(
      output
        .stdout
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(String::from)
        .collect(),
    )
  }
}
