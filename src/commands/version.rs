//! `tapship version`: resolve a release version without publishing

use crate::commands::resolve_project;
use crate::core::cancel::CancellationToken;
use crate::core::config::ShipConfig;
use crate::core::error::{ShipError, ShipResult};
use crate::core::exec::SystemRunner;
use crate::core::vcs::{SystemGit, VersionControl};
use crate::release::version::{self, ReleaseVersionRequest, VersionComponent};
use std::path::Path;

/// Print the resolved version on stdout
///
/// With `--bump` and no `--from`, the previous version is the highest
/// release tag in the project repository.
pub fn run_version(
  exact: Option<String>,
  bump: Option<VersionComponent>,
  from: Option<String>,
  path: Option<&Path>,
) -> ShipResult<()> {
  let request = match (exact, bump) {
    (Some(v), _) => ReleaseVersionRequest::Exact(v),
    (None, Some(component)) => ReleaseVersionRequest::Increment(component),
    (None, None) => {
      return Err(ShipError::with_help(
        "No version requested",
        "Pass --exact <VERSION> or --bump major|minor|patch",
      ));
    }
  };

  let previous = match (&request, from) {
    (ReleaseVersionRequest::Increment(_), Some(prev)) => Some(prev),
    (ReleaseVersionRequest::Increment(_), None) => {
      let project = resolve_project(path)?;
      let limits = ShipConfig::load(&project)
        .map(|c| c.limits)
        .unwrap_or_default();
      let runner = SystemRunner::new(CancellationToken::new());
      let git = SystemGit::new(&runner, limits.command_timeout());
      git.previous_release_version(&project)?
    }
    (ReleaseVersionRequest::Exact(_), _) => None,
  };

  let resolved = version::resolve(&request, previous.as_deref())?;
  println!("{}", resolved);
  Ok(())
}
