//! tapship.toml presence and validity

use super::check::{Check, CheckContext, CheckResult};
use crate::core::config::ShipConfig;
use crate::core::error::ShipResult;

pub struct ConfigValidityCheck;

impl Check for ConfigValidityCheck {
  fn name(&self) -> &'static str {
    "config"
  }

  fn description(&self) -> &'static str {
    "Validates tapship.toml"
  }

  fn run(&self, ctx: &CheckContext) -> ShipResult<CheckResult> {
    let Some(path) = ShipConfig::find_config_path(&ctx.project_root) else {
      return Ok(
        CheckResult::error(self.name(), format!("No tapship.toml in {}", ctx.project_root.display()))
          .fix("Run `tapship init` to create one"),
      );
    };

    Ok(match &ctx.config {
      Ok(config) => CheckResult::ok(
        self.name(),
        format!(
          "{} is valid (formula '{}', {} build)",
          path.display(),
          config.formula.name,
          config.project.build_type
        ),
      ),
      Err(err) => CheckResult::error(self.name(), err.to_string())
        .fix(err.help_message().unwrap_or_else(|| format!("Fix {}", path.display()))),
    })
  }
}
