//! Tap checkout presence

use super::check::{Check, CheckContext, CheckResult};
use crate::core::cancel::CancellationToken;
use crate::core::error::ShipResult;
use crate::core::exec::SystemRunner;
use crate::core::vcs::{SystemGit, VersionControl};

pub struct TapDirectoryCheck;

impl Check for TapDirectoryCheck {
  fn name(&self) -> &'static str {
    "tap-directory"
  }

  fn description(&self) -> &'static str {
    "Checks that the configured tap is a git checkout with an origin"
  }

  fn run(&self, ctx: &CheckContext) -> ShipResult<CheckResult> {
    let Ok(config) = &ctx.config else {
      return Ok(CheckResult::ok(self.name(), "No valid tapship.toml, skipping tap check"));
    };

    let tap = config.tap_path(&ctx.project_root);
    if !tap.is_dir() {
      return Ok(
        CheckResult::error(self.name(), format!("Tap directory not found: {}", tap.display()))
          .fix("Clone your homebrew-<name> tap there, fix formula.tap, or run `tapship init --create-tap`"),
      );
    }
    if !tap.join(".git").exists() {
      return Ok(
        CheckResult::warning(self.name(), format!("{} is not a git repository", tap.display()))
          .fix("The formula can be written but not committed and pushed"),
      );
    }

    let runner = SystemRunner::new(CancellationToken::new());
    let git = SystemGit::new(&runner, config.limits.command_timeout());
    Ok(match git.remote_url(&tap) {
      Ok(Some(url)) => CheckResult::ok(
        self.name(),
        format!("Tap found at {} (origin: {})", tap.display(), url),
      ),
      Ok(None) => CheckResult::warning(self.name(), format!("{} has no origin remote", tap.display()))
        .fix("Add one with `git remote add origin <url>` so the formula can be pushed"),
      Err(e) => CheckResult::warning(self.name(), format!("Could not read the tap's remote: {}", e)),
    })
  }
}
