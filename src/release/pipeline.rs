//! End-to-end publish pipeline
//!
//! Sequence: host precheck → clean-tree precheck → version → build →
//! archive → upload → cleanup → formula → write → commit. Each stage runs
//! only after the previous one succeeded; the first failure is returned as is.

use crate::core::cancel::CancellationToken;
use crate::core::error::{PipelineError, ShipResult};
use crate::core::exec::CommandRunner;
use crate::core::fs::FileSystem;
use crate::core::vcs::VersionControl;
use crate::release::arch::ArchitectureTarget;
use crate::release::archive::{ArchivedBinary, Archiver, archive_name};
use crate::release::build::{BinaryOutput, BuildOrchestrator, BuildSpecification};
use crate::release::formula::{self, Asset, AssetSlots, FormulaShape, FormulaSpec};
use crate::release::toolchain::{Toolchain, release_binary_path};
use crate::release::upload::{GhCli, NoteSource, ReleaseHost, ReleaseUploader};
use crate::release::version::{self, ReleaseVersionRequest};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Placeholder replaced with the resolved version in commit messages
pub const VERSION_PLACEHOLDER: &str = "{version}";

/// Formula metadata that doesn't come from the build
#[derive(Debug, Clone, Default)]
pub struct FormulaMetadata {
  pub name: String,
  pub description: String,
  pub homepage: String,
  pub license: String,
}

/// One publish run
#[derive(Debug, Clone)]
pub struct PublishRequest {
  pub build: BuildSpecification,
  pub version: ReleaseVersionRequest,
  pub formula: FormulaMetadata,
  /// Tap checkout the formula is written into
  pub tap_path: PathBuf,
  pub notes: NoteSource,
  /// Commit and push the tap with this message; `{version}` is substituted
  pub commit_message: Option<String>,
  /// Resolve the version and plan archive names, touch nothing
  pub dry_run: bool,
}

/// One uploaded (or planned) asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportAsset {
  pub name: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub architecture: Option<ArchitectureTarget>,
  #[serde(skip_serializing_if = "String::is_empty")]
  pub url: String,
  #[serde(skip_serializing_if = "String::is_empty")]
  pub sha256: String,
}

/// Summary of a run, printed by `publish --json`
#[derive(Debug, Clone, Serialize)]
pub struct PublishReport {
  pub version: String,
  pub dry_run: bool,
  pub assets: Vec<ReportAsset>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub formula_path: Option<PathBuf>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub formula_shape: Option<FormulaShape>,
  pub committed: bool,
}

/// Injected collaborators, borrowed for the lifetime of the pipeline
pub struct PublishPipeline<'a> {
  vcs: &'a dyn VersionControl,
  fs: &'a dyn FileSystem,
  host: &'a dyn ReleaseHost,
  toolchain: &'a dyn Toolchain,
  runner: &'a dyn CommandRunner,
  cancel: CancellationToken,
  command_timeout: Duration,
}

impl<'a> PublishPipeline<'a> {
  pub fn new(
    vcs: &'a dyn VersionControl,
    fs: &'a dyn FileSystem,
    host: &'a dyn ReleaseHost,
    toolchain: &'a dyn Toolchain,
    runner: &'a dyn CommandRunner,
    cancel: CancellationToken,
    command_timeout: Duration,
  ) -> Self {
    Self {
      vcs,
      fs,
      host,
      toolchain,
      runner,
      cancel,
      command_timeout,
    }
  }

  fn checkpoint(&self) -> ShipResult<()> {
    if self.cancel.is_cancelled() {
      return Err(PipelineError::Cancelled.into());
    }
    Ok(())
  }

  pub fn run(&self, request: &PublishRequest) -> ShipResult<PublishReport> {
    let project = request.build.project_path();

    if !self.host.is_available() {
      return Err(
        PipelineError::MissingReleaseCli {
          program: GhCli::PROGRAM.to_string(),
        }
        .into(),
      );
    }

    if self.vcs.has_uncommitted_changes(project)? {
      return Err(
        PipelineError::UncommittedChanges {
          path: project.to_path_buf(),
        }
        .into(),
      );
    }

    // gh reads the file only after every archive is built
    if let NoteSource::File(notes) = &request.notes {
      self.fs.read_file(notes)?;
    }

    let previous = match &request.version {
      ReleaseVersionRequest::Increment(_) => self.vcs.previous_release_version(project)?,
      ReleaseVersionRequest::Exact(_) => None,
    };
    let version = version::resolve(&request.version, previous.as_deref())?;
    info!(version = %version, previous = ?previous, "resolved release version");

    if request.dry_run {
      return Ok(self.plan(request, version));
    }

    self.checkpoint()?;
    let mut orchestrator = BuildOrchestrator::new(self.toolchain);
    let output = match orchestrator.build(&request.build) {
      Ok(output) => output,
      Err(err) => {
        warn!(phase = %orchestrator.phase(), "build stopped; .build/ left in place");
        return Err(err);
      }
    };

    self.checkpoint()?;
    let archiver = Archiver::new(self.runner, self.fs, self.command_timeout);
    let archives = archiver.create_archives(&output.paths())?;

    self.checkpoint()?;
    let urls = ReleaseUploader::new(self.host).upload(&version, &archives, &request.notes, project)?;
    archiver.cleanup(&archives)?;

    let slots = asset_slots(&output, &archives, &urls);
    let shape = formula::shape(&slots);
    if shape == FormulaShape::Empty {
      warn!(version = %version, "no asset has both a URL and a hash; formula will be empty");
    }
    let spec = FormulaSpec {
      name: request.formula.name.clone(),
      binary: request.build.product().to_string(),
      description: request.formula.description.clone(),
      homepage: request.formula.homepage.clone(),
      license: request.formula.license.clone(),
      version: version.clone(),
      assets: slots,
    };
    let formula_path = self.write_formula(&request.tap_path, &spec)?;

    let committed = match &request.commit_message {
      Some(message) => {
        self.checkpoint()?;
        let message = message.replace(VERSION_PLACEHOLDER, &version);
        self.vcs.commit_and_push(&request.tap_path, &message)?;
        true
      }
      None => false,
    };

    let assets = archives
      .iter()
      .zip(&urls)
      .map(|(archive, url)| ReportAsset {
        name: archive.file_name(),
        architecture: archive.architecture(),
        url: url.clone(),
        sha256: archive.content_hash.clone(),
      })
      .collect();

    Ok(PublishReport {
      version,
      dry_run: false,
      assets,
      formula_path: Some(formula_path),
      formula_shape: Some(shape),
      committed,
    })
  }

  /// Archive names a real run would upload
  fn plan(&self, request: &PublishRequest, version: String) -> PublishReport {
    let build = &request.build;
    let assets = build
      .targets()
      .iter()
      .filter_map(|&arch| {
        let binary = release_binary_path(build.project_path(), build.product(), arch);
        archive_name(&binary).ok().map(|name| ReportAsset {
          name,
          architecture: Some(arch),
          url: String::new(),
          sha256: String::new(),
        })
      })
      .collect();

    PublishReport {
      version,
      dry_run: true,
      assets,
      formula_path: None,
      formula_shape: None,
      committed: false,
    }
  }

  fn write_formula(&self, tap: &Path, spec: &FormulaSpec) -> ShipResult<PathBuf> {
    let directory = self.fs.subdirectory(tap, "Formula", true)?;
    let path = directory.join(format!("{}.rb", formula::formula_file_stem(&spec.name)));
    if self.fs.exists(&path) {
      self.fs.delete_file(&path)?;
    }
    self.fs.write_file(&path, &formula::render(spec))?;
    info!(path = %path.display(), "wrote formula");
    Ok(path)
  }
}

/// Map archives and their URLs onto formula slots
fn asset_slots(output: &BinaryOutput, archives: &[ArchivedBinary], urls: &[String]) -> AssetSlots {
  let pairs = archives
    .iter()
    .zip(urls)
    .map(|(archive, url)| (archive.architecture(), Asset::new(url.clone(), archive.content_hash.clone())));

  match output {
    BinaryOutput::Single(_) => {
      let asset = pairs.map(|(_, asset)| asset).next().unwrap_or_default();
      AssetSlots::Single(asset)
    }
    BinaryOutput::Multiple(_) => {
      let mut arm = None;
      let mut intel = None;
      for (arch, asset) in pairs {
        match arch {
          Some(ArchitectureTarget::Arm64) => arm = Some(asset),
          Some(ArchitectureTarget::X86_64) => intel = Some(asset),
          None => warn!(url = %asset.url, "archive has no architecture marker; left out of formula"),
        }
      }
      AssetSlots::PerArch { arm, intel }
    }
  }
}
