//! VersionControl implementation for SystemGit (status, tags, commit/push, remotes)

use super::system_git::SystemGit;
use super::{RepoVisibility, VersionControl};
use crate::core::error::{GitError, ShipError, ShipResult};
use crate::core::exec::Invocation;
use crate::release::version::{is_valid_version, parse_components};
use std::path::Path;
use tracing::{debug, info, warn};

impl VersionControl for SystemGit<'_> {
  fn has_uncommitted_changes(&self, path: &Path) -> ShipResult<bool> {
    let lines = self.status_porcelain(path)?;
    if !lines.is_empty() {
      debug!(path = %path.display(), changes = lines.len(), "working tree is dirty");
    }
    Ok(!lines.is_empty())
  }

  fn commit_and_push(&self, path: &Path, message: &str) -> ShipResult<()> {
    self.run_checked(self.git_cmd(path).args(["add", "-A"]), "git add -A")?;

    // exit 0: index matches HEAD, 1: staged changes
    let staged = self.runner.run(&self.git_cmd(path).args(["diff", "--cached", "--quiet"]))?;
    match staged.code {
      Some(0) => {
        info!(path = %path.display(), "tap already up to date, nothing to commit");
        return Ok(());
      }
      Some(1) => {}
      _ => {
        return Err(
          GitError::CommandFailed {
            command: "git diff --cached --quiet".to_string(),
            stderr: staged.stderr,
          }
          .into(),
        );
      }
    }

    self.run_checked(self.git_cmd(path).args(["commit", "-m", message]), "git commit")?;

    let branch = self.current_branch(path)?;
    let push = self.runner.run(&self.git_cmd(path).args(["push", "origin", branch.as_str()]))?;
    if !push.success() {
      return Err(
        GitError::PushFailed {
          remote: format!("origin/{}", branch),
          reason: push.stderr,
        }
        .into(),
      );
    }

    info!(path = %path.display(), branch = %branch, "committed and pushed");
    Ok(())
  }

  fn remote_url(&self, path: &Path) -> ShipResult<Option<String>> {
    let output = self.runner.run(&self.git_cmd(path).args(["remote", "get-url", "origin"]))?;
    if !output.success() {
      return Ok(None);
    }
    let url = output.stdout.trim();
    Ok((!url.is_empty()).then(|| url.to_string()))
  }

  fn previous_release_version(&self, path: &Path) -> ShipResult<Option<String>> {
    // Releases tag the remote, so a checkout only sees its own releases after a fetch
    if self.remote_url(path)?.is_some() {
      let fetch = self
        .runner
        .run(&self.git_cmd(path).args(["fetch", "--tags", "--quiet", "origin"]))?;
      if !fetch.success() {
        warn!(
          path = %path.display(),
          stderr = %fetch.stderr.trim(),
          "could not fetch tags from origin, using local tags"
        );
      }
    }

    let output = self.run_checked(self.git_cmd(path).args(["tag", "--list"]), "git tag --list")?;
    Ok(latest_version_tag(output.stdout.lines()))
  }

  fn init(&self, path: &Path) -> ShipResult<()> {
    self.run_checked(self.git_cmd(path).arg("init"), "git init")?;
    Ok(())
  }

  fn create_remote_repo(&self, path: &Path, name: &str, visibility: RepoVisibility) -> ShipResult<String> {
    let flag = match visibility {
      RepoVisibility::Public => "--public",
      RepoVisibility::Private => "--private",
    };
    let invocation = Invocation::new("gh")
      .args(["repo", "create", name, flag, "--source"])
      .path_arg(path)
      .args(["--remote", "origin"])
      .current_dir(path)
      .timeout(self.timeout);

    let output = self.runner.run(&invocation)?;
    if !output.success() {
      return Err(ShipError::message(format!(
        "gh repo create failed for {}:\n{}",
        name,
        output.stderr.trim_end()
      )));
    }

    self
      .remote_url(path)?
      .ok_or_else(|| ShipError::message(format!("Repository {} was created but has no origin remote", name)))
  }
}

/// Pick the numerically highest `v?X.Y.Z` tag, returned as written
fn latest_version_tag<'a>(tags: impl Iterator<Item = &'a str>) -> Option<String> {
  tags
    .map(str::trim)
    .filter(|t| is_valid_version(t))
    .filter_map(|t| parse_components(t).map(|c| (c, t)))
    .max_by_key(|(components, _)| *components)
    .map(|(_, tag)| tag.to_string())
}
