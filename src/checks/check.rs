//! What a doctor check sees and what it reports

use crate::core::config::ShipConfig;
use crate::core::error::ShipResult;
use serde::Serialize;
use std::path::PathBuf;

/// Outcome of one check, ordered from best to worst
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
  Ok,
  /// Publishing works, but something will bite later (e.g. the tap can't be pushed)
  Warning,
  /// `tapship publish` would fail
  Error,
}

impl Status {
  pub fn icon(self) -> &'static str {
    match self {
      Status::Ok => "✅",
      Status::Warning => "⚠️ ",
      Status::Error => "❌",
    }
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
  pub check: String,
  pub status: Status,
  pub message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub fix: Option<String>,
}

impl CheckResult {
  fn new(check: &str, status: Status, message: impl Into<String>) -> Self {
    Self {
      check: check.to_string(),
      status,
      message: message.into(),
      fix: None,
    }
  }

  pub fn ok(check: &str, message: impl Into<String>) -> Self {
    Self::new(check, Status::Ok, message)
  }

  pub fn warning(check: &str, message: impl Into<String>) -> Self {
    Self::new(check, Status::Warning, message)
  }

  pub fn error(check: &str, message: impl Into<String>) -> Self {
    Self::new(check, Status::Error, message)
  }

  /// Attach the command or edit that resolves the problem
  pub fn fix(mut self, fix: impl Into<String>) -> Self {
    self.fix = Some(fix.into());
    self
  }
}

/// The project under inspection; tapship.toml is loaded once and shared
pub struct CheckContext {
  pub project_root: PathBuf,
  pub thorough: bool,
  pub config: ShipResult<ShipConfig>,
}

impl CheckContext {
  pub fn load(project_root: PathBuf, thorough: bool) -> Self {
    let config = ShipConfig::load(&project_root);
    Self {
      project_root,
      thorough,
      config,
    }
  }
}

/// One `tapship doctor` diagnostic
pub trait Check {
  /// Kebab-case id, also the `check` field in JSON output
  fn name(&self) -> &'static str;

  fn description(&self) -> &'static str;

  /// `Err` means the check itself broke; the runner reports it as an error result
  fn run(&self, ctx: &CheckContext) -> ShipResult<CheckResult>;

  /// Talks to GitHub, so only runs with `--thorough`
  fn needs_network(&self) -> bool {
    false
  }
}
