//! External tool availability

use super::check::{Check, CheckContext, CheckResult};
use crate::core::error::ShipResult;

/// Every program the publish pipeline shells out to
pub const REQUIRED_TOOLS: &[&str] = &["gh", "git", "swift", "tar", "shasum", "strip"];

/// Checks that each required tool resolves on PATH
pub struct RequiredToolsCheck {
  tools: Vec<String>,
}

impl Default for RequiredToolsCheck {
  fn default() -> Self {
    Self::new(REQUIRED_TOOLS.iter().copied())
  }
}

impl RequiredToolsCheck {
  pub fn new<'a>(tools: impl IntoIterator<Item = &'a str>) -> Self {
    Self {
      tools: tools.into_iter().map(String::from).collect(),
    }
  }
}

impl Check for RequiredToolsCheck {
  fn name(&self) -> &'static str {
    "required-tools"
  }

  fn description(&self) -> &'static str {
    "Checks that swift, strip, tar, shasum, git, and gh are installed"
  }

  fn run(&self, _ctx: &CheckContext) -> ShipResult<CheckResult> {
    let missing: Vec<&str> = self
      .tools
      .iter()
      .map(String::as_str)
      .filter(|tool| which::which(tool).is_err())
      .collect();

    if missing.is_empty() {
      return Ok(CheckResult::ok(
        self.name(),
        format!("All {} tools found on PATH", self.tools.len()),
      ));
    }

    let fix = if missing.contains(&"gh") {
      "Install the GitHub CLI (https://cli.github.com); swift and strip ship with Xcode"
    } else {
      "Install Xcode or the Command Line Tools (xcode-select --install)"
    };
    Ok(CheckResult::error(self.name(), format!("Missing tools: {}", missing.join(", "))).fix(fix))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::checks::Status;
  use std::path::PathBuf;

  fn ctx() -> CheckContext {
    CheckContext::load(PathBuf::from("/nonexistent/tapship-project"), false)
  }

  #[test]
  fn test_reports_missing_tool() {
    let check = RequiredToolsCheck::new(["sh", "tapship-no-such-tool-7731"]);
    let result = check.run(&ctx()).unwrap();
    assert_eq!(result.status, Status::Error);
    assert_eq!(result.message, "Missing tools: tapship-no-such-tool-7731");
    assert!(result.fix.unwrap().contains("xcode-select"));
  }

  #[cfg(unix)]
  #[test]
  fn test_present_tool_passes() {
    let check = RequiredToolsCheck::new(["sh"]);
    assert_eq!(check.run(&ctx()).unwrap().status, Status::Ok);
  }
}
