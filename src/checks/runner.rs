//! Runs the registered checks in order

use super::check::{Check, CheckContext, CheckResult, Status};

pub struct CheckRunner {
  checks: Vec<Box<dyn Check>>,
}

impl CheckRunner {
  pub fn new() -> Self {
    Self { checks: Vec::new() }
  }

  pub fn add_check(&mut self, check: impl Check + 'static) {
    self.checks.push(Box::new(check));
  }

  /// Run every applicable check; network checks are skipped unless `ctx.thorough`
  pub fn run_all(&self, ctx: &CheckContext) -> Vec<CheckResult> {
    self
      .checks
      .iter()
      .filter(|check| ctx.thorough || !check.needs_network())
      .map(|check| {
        check.run(ctx).unwrap_or_else(|err| {
          CheckResult::error(check.name(), format!("Check could not run: {}", err))
            .fix("Re-run with --verbose for details")
        })
      })
      .collect()
  }

  pub fn checks(&self) -> impl Iterator<Item = &dyn Check> {
    self.checks.iter().map(|c| c.as_ref())
  }
}

impl Default for CheckRunner {
  fn default() -> Self {
    Self::new()
  }
}

/// Worst status across `results`, `Ok` when empty
pub fn overall(results: &[CheckResult]) -> Status {
  results.iter().map(|r| r.status).max().unwrap_or(Status::Ok)
}

/// Runner with every built-in check, in report order
pub fn create_default_runner() -> CheckRunner {
  let mut runner = CheckRunner::new();

  runner.add_check(super::tools::RequiredToolsCheck::default());
  runner.add_check(super::config::ConfigValidityCheck);
  runner.add_check(super::tap::TapDirectoryCheck);
  runner.add_check(super::gh_auth::GhAuthCheck);

  runner
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::core::error::{ShipError, ShipResult};
  use std::path::PathBuf;

  struct Fixed(Status);
  struct Broken;
  struct Online;

  impl Check for Fixed {
    fn name(&self) -> &'static str {
      "fixed"
    }
    fn description(&self) -> &'static str {
      "always the same"
    }
    fn run(&self, _ctx: &CheckContext) -> ShipResult<CheckResult> {
      Ok(match self.0 {
        Status::Ok => CheckResult::ok(self.name(), "ok"),
        Status::Warning => CheckResult::warning(self.name(), "meh"),
        Status::Error => CheckResult::error(self.name(), "bad"),
      })
    }
  }

  impl Check for Broken {
    fn name(&self) -> &'static str {
      "broken"
    }
    fn description(&self) -> &'static str {
      "errors out"
    }
    fn run(&self, _ctx: &CheckContext) -> ShipResult<CheckResult> {
      Err(ShipError::message("kaboom"))
    }
  }

  impl Check for Online {
    fn name(&self) -> &'static str {
      "online"
    }
    fn description(&self) -> &'static str {
      "needs the network"
    }
    fn run(&self, _ctx: &CheckContext) -> ShipResult<CheckResult> {
      Ok(CheckResult::ok(self.name(), "reachable"))
    }
    fn needs_network(&self) -> bool {
      true
    }
  }

  fn ctx(thorough: bool) -> CheckContext {
    CheckContext::load(PathBuf::from("/nonexistent/tapship-project"), thorough)
  }

  #[test]
  fn test_runner_collects_and_converts_errors() {
    let mut runner = CheckRunner::new();
    runner.add_check(Fixed(Status::Ok));
    runner.add_check(Fixed(Status::Warning));
    runner.add_check(Broken);

    let results = runner.run_all(&ctx(false));
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].status, Status::Ok);
    assert_eq!(results[1].status, Status::Warning);
    assert_eq!(results[2].status, Status::Error);
    assert!(results[2].message.contains("kaboom"));
    assert_eq!(overall(&results), Status::Error);
  }

  #[test]
  fn test_overall_status() {
    assert_eq!(overall(&[]), Status::Ok);
    let results = [CheckResult::ok("a", "x"), CheckResult::warning("b", "y")];
    assert_eq!(overall(&results), Status::Warning);
  }

  #[test]
  fn test_network_checks_need_thorough() {
    let mut runner = CheckRunner::new();
    runner.add_check(Online);
    assert!(runner.run_all(&ctx(false)).is_empty());
    assert_eq!(runner.run_all(&ctx(true)).len(), 1);
  }

  #[test]
  fn test_default_runner_registers_builtins() {
    let runner = create_default_runner();
    let names: Vec<&str> = runner.checks().map(|c| c.name()).collect();
    assert_eq!(names, vec!["required-tools", "config", "tap-directory", "gh-auth"]);
  }
}
