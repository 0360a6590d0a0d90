//! Multi-architecture build orchestration
//!
//! Drives a [`Toolchain`] through clean → build (per architecture) → test.
//! Architectures are built strictly one after another, ARM64 first, and the
//! test command runs once after every architecture has been built.

use crate::core::error::{BuildStage, PipelineError, ShipResult};
use crate::release::arch::ArchitectureTarget;
use crate::release::toolchain::{StepOutcome, Toolchain};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Which test command to run after building
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestCommand {
  /// `swift test`
  Default,
  /// Arbitrary shell command line
  Custom(String),
}

impl TestCommand {
  /// `"default"` (any case) selects the toolchain default
  pub fn parse(value: &str) -> Self {
    if value.trim().eq_ignore_ascii_case("default") {
      TestCommand::Default
    } else {
      TestCommand::Custom(value.trim().to_string())
    }
  }
}

/// Everything needed to build one product
///
/// The architecture set is fixed at construction and sorted ARM first.
#[derive(Debug, Clone)]
pub struct BuildSpecification {
  product: String,
  project_path: PathBuf,
  targets: Vec<ArchitectureTarget>,
  extra_build_args: Vec<String>,
  skip_clean: bool,
  test_command: Option<TestCommand>,
}

impl BuildSpecification {
  pub fn new(
    product: impl Into<String>,
    project_path: impl Into<PathBuf>,
    targets: impl IntoIterator<Item = ArchitectureTarget>,
    extra_build_args: Vec<String>,
    skip_clean: bool,
    test_command: Option<TestCommand>,
  ) -> Self {
    let mut targets: Vec<ArchitectureTarget> = targets.into_iter().collect();
    targets.sort();
    targets.dedup();
    Self {
      product: product.into(),
      project_path: project_path.into(),
      targets,
      extra_build_args,
      skip_clean,
      test_command,
    }
  }

  pub fn product(&self) -> &str {
    &self.product
  }

  pub fn project_path(&self) -> &Path {
    &self.project_path
  }

  pub fn targets(&self) -> &[ArchitectureTarget] {
    &self.targets
  }

  pub fn extra_build_args(&self) -> &[String] {
    &self.extra_build_args
  }

  pub fn skip_clean(&self) -> bool {
    self.skip_clean
  }

  pub fn test_command(&self) -> Option<&TestCommand> {
    self.test_command.as_ref()
  }
}

/// Built binaries
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BinaryOutput {
  Single(PathBuf),
  Multiple(BTreeMap<ArchitectureTarget, PathBuf>),
}

impl BinaryOutput {
  /// Binary paths, ARM64 before x86_64
  pub fn paths(&self) -> Vec<PathBuf> {
    match self {
      BinaryOutput::Single(path) => vec![path.clone()],
      // BTreeMap iterates in key order, which is Arm64 < X86_64
      BinaryOutput::Multiple(map) => map.values().cloned().collect(),
    }
  }
}

/// Where the orchestrator is in the build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildPhase {
  NotStarted,
  Cleaning,
  Building(ArchitectureTarget),
  Testing,
  Complete,
}

impl fmt::Display for BuildPhase {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      BuildPhase::NotStarted => write!(f, "not started"),
      BuildPhase::Cleaning => write!(f, "cleaning"),
      BuildPhase::Building(arch) => write!(f, "building {}", arch),
      BuildPhase::Testing => write!(f, "testing"),
      BuildPhase::Complete => write!(f, "complete"),
    }
  }
}

/// Runs a [`BuildSpecification`] against a toolchain
pub struct BuildOrchestrator<'a> {
  toolchain: &'a dyn Toolchain,
  phase: BuildPhase,
}

impl<'a> BuildOrchestrator<'a> {
  pub fn new(toolchain: &'a dyn Toolchain) -> Self {
    Self {
      toolchain,
      phase: BuildPhase::NotStarted,
    }
  }

  pub fn phase(&self) -> BuildPhase {
    self.phase
  }

  fn enter(&mut self, phase: BuildPhase) {
    info!(from = %self.phase, to = %phase, "build phase");
    self.phase = phase;
  }

  pub fn build(&mut self, spec: &BuildSpecification) -> ShipResult<BinaryOutput> {
    let project = spec.project_path();

    if !spec.skip_clean() {
      self.enter(BuildPhase::Cleaning);
      let outcome = self.toolchain.clean(project)?;
      ensure_success(BuildStage::Clean, outcome)?;
    }

    let mut built = BTreeMap::new();
    for &arch in spec.targets() {
      self.enter(BuildPhase::Building(arch));
      let (outcome, binary) =
        self
          .toolchain
          .build_release(project, spec.product(), arch, spec.extra_build_args())?;
      ensure_success(BuildStage::Build, outcome)?;

      let outcome = self.toolchain.strip(&binary)?;
      ensure_success(BuildStage::Strip, outcome)?;

      debug!(arch = %arch, binary = %binary.display(), "built");
      built.insert(arch, binary);
    }

    if let Some(test_command) = spec.test_command() {
      self.enter(BuildPhase::Testing);
      let outcome = self.toolchain.test(project, test_command)?;
      if !outcome.success() {
        return Err(
          PipelineError::TestFailed {
            command: outcome.command,
            output: outcome.output.combined(),
          }
          .into(),
        );
      }
    }

    self.enter(BuildPhase::Complete);

    if built.len() == 1 {
      if let Some((_, path)) = built.pop_first() {
        return Ok(BinaryOutput::Single(path));
      }
    }
    Ok(BinaryOutput::Multiple(built))
  }
}

fn ensure_success(stage: BuildStage, outcome: StepOutcome) -> ShipResult<()> {
  if outcome.success() {
    return Ok(());
  }
  Err(
    PipelineError::BuildFailed {
      stage,
      command: outcome.command,
      stderr: outcome.output.stderr,
    }
    .into(),
  )
}

/// Toolchain double recording every step, shared with pipeline tests
#[cfg(test)]
pub mod testing {
  use super::*;
  use crate::core::exec::CommandOutput;
  use crate::release::toolchain::release_binary_path;
  use std::cell::RefCell;

  #[derive(Default)]
  pub struct FakeToolchain {
    pub steps: RefCell<Vec<String>>,
    /// Step name ("clean", "build:<arch>", "strip", "test") that should exit non-zero
    pub fail_on: Option<String>,
    /// Create the binary file on build so archives can be made from it
    pub materialize: bool,
  }

  impl FakeToolchain {
    pub fn failing(step: &str) -> Self {
      Self {
        fail_on: Some(step.to_string()),
        ..Self::default()
      }
    }

    pub fn steps(&self) -> Vec<String> {
      self.steps.borrow().clone()
    }

    fn record(&self, step: String) -> StepOutcome {
      let output = if self.fail_on.as_deref() == Some(step.as_str()) {
        CommandOutput::failed(1, &format!("{} exploded", step))
      } else {
        CommandOutput::ok("")
      };
      self.steps.borrow_mut().push(step.clone());
      StepOutcome { command: step, output }
    }
  }

  impl Toolchain for FakeToolchain {
    fn clean(&self, _project: &Path) -> ShipResult<StepOutcome> {
      Ok(self.record("clean".to_string()))
    }

    fn build_release(
      &self,
      project: &Path,
      product: &str,
      arch: ArchitectureTarget,
      _extra_args: &[String],
    ) -> ShipResult<(StepOutcome, PathBuf)> {
      let path = release_binary_path(project, product, arch);
      if self.materialize {
        if let Some(dir) = path.parent() {
          std::fs::create_dir_all(dir)?;
        }
        std::fs::write(&path, b"\xCF\xFA\xED\xFE")?;
      }
      Ok((self.record(format!("build:{}", arch)), path))
    }

    fn strip(&self, _binary: &Path) -> ShipResult<StepOutcome> {
      Ok(self.record("strip".to_string()))
    }

    fn test(&self, _project: &Path, _command: &TestCommand) -> ShipResult<StepOutcome> {
      Ok(self.record("test".to_string()))
    }
  }
}
