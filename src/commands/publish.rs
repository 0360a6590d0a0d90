//! `tapship publish`: build, upload, and write the formula

use std::path::{Path, PathBuf};

use crate::commands::{confirm, prompt_line, resolve_project};
use crate::core::cancel::CancellationToken;
use crate::core::config::ShipConfig;
use crate::core::error::{ShipError, ShipResult};
use crate::core::exec::SystemRunner;
use crate::core::fs::LocalFs;
use crate::core::vcs::SystemGit;
use crate::release::arch::BuildType;
use crate::release::build::{BuildSpecification, TestCommand};
use crate::release::pipeline::VERSION_PLACEHOLDER;
use crate::release::toolchain::SwiftToolchain;
use crate::release::upload::{GhCli, NoteSource};
use crate::release::version::{ReleaseVersionRequest, VersionComponent};
use crate::release::{FormulaMetadata, PublishPipeline, PublishReport, PublishRequest};

/// Flags for `tapship publish`; anything unset falls back to tapship.toml
#[derive(Debug, Clone, Default)]
pub struct PublishArgs {
  pub path: Option<PathBuf>,
  pub version: Option<String>,
  pub bump: Option<VersionComponent>,
  pub product: Option<String>,
  pub build_type: Option<BuildType>,
  pub skip_clean: bool,
  /// `Some(None)` is `--test` with no command: run `swift test`
  pub test: Option<Option<String>>,
  pub notes: Option<String>,
  pub notes_file: Option<PathBuf>,
  pub commit_message: Option<String>,
  pub yes: bool,
  pub dry_run: bool,
  pub json: bool,
}

pub fn run_publish(args: PublishArgs, cancel: CancellationToken) -> ShipResult<()> {
  let project = resolve_project(args.path.as_deref())?;
  let config = ShipConfig::load(&project)?;

  let version = version_request(&args)?;
  let request = build_request(&args, &config, &project, version)?;

  if !args.json {
    println!("📦 Publishing {} from {}", config.formula.name, project.display());
    println!(
      "   Architectures: {}",
      request
        .build
        .targets()
        .iter()
        .map(|a| a.to_string())
        .collect::<Vec<_>>()
        .join(", ")
    );
    if !args.dry_run {
      println!("🔨 Building, archiving, and uploading (this can take a while)...");
    }
  }

  let limits = config.limits;
  let runner = SystemRunner::new(cancel.clone());
  let git = SystemGit::new(&runner, limits.command_timeout());
  let fs = LocalFs;
  let gh = GhCli::new(&runner, limits.command_timeout());
  let toolchain = SwiftToolchain::new(&runner, limits.build_timeout(), limits.command_timeout());

  let pipeline = PublishPipeline::new(&git, &fs, &gh, &toolchain, &runner, cancel, limits.command_timeout());
  let report = pipeline.run(&request)?;

  if args.json {
    println!("{}", serde_json::to_string_pretty(&report)?);
  } else {
    print_report(&report);
  }
  Ok(())
}

fn version_request(args: &PublishArgs) -> ShipResult<ReleaseVersionRequest> {
  if let Some(version) = &args.version {
    return Ok(ReleaseVersionRequest::Exact(version.clone()));
  }
  if let Some(component) = args.bump {
    return Ok(ReleaseVersionRequest::Increment(component));
  }
  if args.json || args.yes {
    return Err(ShipError::with_help(
      "No release version given",
      "Pass --version <X.Y.Z> or --bump major|minor|patch",
    ));
  }

  let answer = prompt_line("🏷️  Release version (X.Y.Z, or major/minor/patch): ")?;
  if answer.is_empty() {
    return Err(ShipError::with_help(
      "No release version given",
      "Pass --version <X.Y.Z> or --bump major|minor|patch",
    ));
  }
  Ok(ReleaseVersionRequest::parse_input(&answer))
}

/// Merge flags over config into a pipeline request
fn build_request(
  args: &PublishArgs,
  config: &ShipConfig,
  project: &Path,
  version: ReleaseVersionRequest,
) -> ShipResult<PublishRequest> {
  let build_type = match args.build_type {
    Some(bt) => bt,
    None => config.build_type()?,
  };
  let product = args
    .product
    .clone()
    .unwrap_or_else(|| config.product_name(project));
  let test_command = match &args.test {
    Some(None) => Some(TestCommand::Default),
    Some(Some(command)) => Some(TestCommand::parse(command)),
    None => config.test_command(),
  };
  let notes = match (&args.notes, &args.notes_file) {
    (Some(_), Some(_)) => {
      return Err(ShipError::message("--notes and --notes-file are mutually exclusive"));
    }
    (Some(text), None) => NoteSource::Text(text.clone()),
    (None, Some(file)) => NoteSource::File(project.join(file)),
    (None, None) => config.release.note_source(project),
  };

  let commit_message = match &args.commit_message {
    Some(message) => Some(message.clone()),
    None if args.dry_run => None,
    None if args.yes => Some(default_commit_message(config)),
    None if args.json => None,
    None => {
      if confirm("📝 Commit and push the formula to the tap after publishing?")? {
        Some(default_commit_message(config))
      } else {
        None
      }
    }
  };

  Ok(PublishRequest {
    build: BuildSpecification::new(
      product,
      project,
      build_type.targets(),
      config.project.extra_build_args.clone(),
      args.skip_clean || config.project.skip_clean,
      test_command,
    ),
    version,
    formula: FormulaMetadata {
      name: config.formula.name.clone(),
      description: config.formula.description.clone(),
      homepage: config.formula.homepage.clone(),
      license: config.formula.license.clone(),
    },
    tap_path: config.tap_path(project),
    notes,
    commit_message,
    dry_run: args.dry_run,
  })
}

fn default_commit_message(config: &ShipConfig) -> String {
  format!("{} {}", config.formula.name, VERSION_PLACEHOLDER)
}

fn print_report(report: &PublishReport) {
  if report.dry_run {
    println!("\n🔍 Dry run: would release {}", report.version);
    for asset in &report.assets {
      println!("   • {}", asset.name);
    }
    println!("\n💡 Run without --dry-run to publish");
    return;
  }

  println!("\n📤 Released {}", report.version);
  for asset in &report.assets {
    println!("   • {} ({})", asset.name, asset.sha256);
    println!("     {}", asset.url);
  }
  if let Some(path) = &report.formula_path {
    println!("✅ Formula written to {}", path.display());
  }
  if report.committed {
    println!("✅ Tap committed and pushed");
  } else {
    println!("💡 Tap not committed; review the formula and push it yourself");
  }
}
