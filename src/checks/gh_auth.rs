//! GitHub CLI authentication (thorough mode only)

use super::check::{Check, CheckContext, CheckResult};
use crate::core::cancel::CancellationToken;
use crate::core::error::ShipResult;
use crate::core::exec::{CommandRunner, Invocation, SystemRunner};
use std::time::Duration;

const AUTH_TIMEOUT: Duration = Duration::from_secs(30);

pub struct GhAuthCheck;

impl Check for GhAuthCheck {
  fn name(&self) -> &'static str {
    "gh-auth"
  }

  fn description(&self) -> &'static str {
    "Checks that `gh` is logged in to GitHub"
  }

  fn run(&self, ctx: &CheckContext) -> ShipResult<CheckResult> {
    if which::which("gh").is_err() {
      return Ok(
        CheckResult::error(self.name(), "gh is not installed").fix("Install the GitHub CLI (https://cli.github.com)"),
      );
    }

    let runner = SystemRunner::new(CancellationToken::new());
    let output = runner.run(
      &Invocation::new("gh")
        .args(["auth", "status"])
        .current_dir(&ctx.project_root)
        .timeout(AUTH_TIMEOUT),
    )?;

    if output.success() {
      Ok(CheckResult::ok(self.name(), "gh is authenticated"))
    } else {
      Ok(
        CheckResult::error(
          self.name(),
          format!("gh is not authenticated: {}", output.combined().trim()),
        )
        .fix("Run `gh auth login`"),
      )
    }
  }

  fn needs_network(&self) -> bool {
    true
  }
}
