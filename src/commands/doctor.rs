//! Health check command for diagnosing issues
//!
//! The doctor command runs all health checks and reports any issues found.

use std::path::Path;

use crate::checks::{CheckContext, Status, create_default_runner, overall};
use crate::commands::resolve_project;
use crate::core::error::{ExitCode, ShipResult};

/// Run the doctor command to diagnose issues
///
/// Returns Ok(()) unless a check reports an error, in which case the process
/// exits with the validation code after printing the report
pub fn run_doctor(path: Option<&Path>, thorough: bool, json: bool) -> ShipResult<()> {
  let ctx = CheckContext::load(resolve_project(path)?, thorough);

  let runner = create_default_runner();
  let results = runner.run_all(&ctx);
  let status = overall(&results);

  if json {
    // JSON output for CI/automation
    println!("{}", serde_json::to_string_pretty(&results)?);
  } else {
    println!("🏥 Checking {}...\n", ctx.project_root.display());

    for check in runner.checks().filter(|c| c.needs_network() && !thorough) {
      println!("   • {} skipped (use --thorough): {}", check.name(), check.description());
    }

    for result in &results {
      println!("{} {}: {}", result.status.icon(), result.check, result.message);
      if let Some(fix) = &result.fix {
        println!("   💡 Fix: {}", fix);
      }
    }

    let ok_count = results.iter().filter(|r| r.status == Status::Ok).count();
    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Summary: {}/{} checks passed", ok_count, results.len());

    match status {
      Status::Error => println!("\n⚠️  Critical issues found. Please fix errors before publishing."),
      Status::Warning => println!("\n⚠️  Some warnings found. Consider addressing them."),
      Status::Ok => println!("\n✨ All checks passed! Ready to publish."),
    }
  }

  if status == Status::Error {
    std::process::exit(ExitCode::Validation.as_i32());
  }
  Ok(())
}
