//! Swift toolchain driver
//!
//! The orchestrator only sees the [`Toolchain`] trait; [`SwiftToolchain`]
//! turns each step into a `swift`/`strip` invocation on a [`CommandRunner`].

use crate::core::error::ShipResult;
use crate::core::exec::{CommandOutput, CommandRunner, Invocation};
use crate::release::arch::ArchitectureTarget;
use crate::release::build::TestCommand;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Fixed size/speed flags passed to every release build
pub const RELEASE_FLAGS: &[&str] = &[
  "-Xswiftc",
  "-Osize",
  "-Xswiftc",
  "-wmo",
  "-Xswiftc",
  "-gnone",
  "-Xswiftc",
  "-cross-module-optimization",
  "-Xlinker",
  "-dead_strip_dylibs",
];

/// Flags appended to custom test commands when missing
pub const TEST_SAFETY_FLAGS: &[&str] = &["-quiet", "-skipPackagePluginValidation"];

/// Result of one toolchain step
#[derive(Debug, Clone)]
pub struct StepOutcome {
  /// Rendered command line, for error messages
  pub command: String,
  pub output: CommandOutput,
}

impl StepOutcome {
  pub fn success(&self) -> bool {
    self.output.success()
  }
}

/// Build toolchain operations
///
/// Implementations report non-zero exits through [`StepOutcome`] rather than
/// as errors; the orchestrator decides which stage failed.
pub trait Toolchain {
  fn clean(&self, project: &Path) -> ShipResult<StepOutcome>;

  /// Build `product` for `arch`, returning the step and the expected binary path
  fn build_release(
    &self,
    project: &Path,
    product: &str,
    arch: ArchitectureTarget,
    extra_args: &[String],
  ) -> ShipResult<(StepOutcome, PathBuf)>;

  fn strip(&self, binary: &Path) -> ShipResult<StepOutcome>;

  fn test(&self, project: &Path, command: &TestCommand) -> ShipResult<StepOutcome>;
}

/// `swift` + `strip` on the host
pub struct SwiftToolchain<'a> {
  runner: &'a dyn CommandRunner,
  build_timeout: Duration,
  command_timeout: Duration,
}

impl<'a> SwiftToolchain<'a> {
  /// `build_timeout` covers clean/build/test, `command_timeout` covers strip
  pub fn new(runner: &'a dyn CommandRunner, build_timeout: Duration, command_timeout: Duration) -> Self {
    Self {
      runner,
      build_timeout,
      command_timeout,
    }
  }

  fn step(&self, invocation: Invocation) -> ShipResult<StepOutcome> {
    let output = self.runner.run(&invocation)?;
    Ok(StepOutcome {
      command: invocation.display(),
      output,
    })
  }
}

/// Where SwiftPM leaves a release product for `arch`
pub fn release_binary_path(project: &Path, product: &str, arch: ArchitectureTarget) -> PathBuf {
  project
    .join(".build")
    .join(arch.build_marker())
    .join("release")
    .join(product)
}

/// Append any missing safety flags to a custom test command line
pub fn with_safety_flags(command: &str) -> String {
  let mut line = command.trim().to_string();
  for flag in TEST_SAFETY_FLAGS {
    if !line.split_whitespace().any(|token| token == *flag) {
      line.push(' ');
      line.push_str(flag);
    }
  }
  line
}

impl Toolchain for SwiftToolchain<'_> {
  fn clean(&self, project: &Path) -> ShipResult<StepOutcome> {
    self.step(
      Invocation::new("swift")
        .args(["package", "clean"])
        .current_dir(project)
        .timeout(self.build_timeout),
    )
  }

  fn build_release(
    &self,
    project: &Path,
    product: &str,
    arch: ArchitectureTarget,
    extra_args: &[String],
  ) -> ShipResult<(StepOutcome, PathBuf)> {
    let invocation = Invocation::new("swift")
      .args(["build", "-c", "release", "--arch", arch.swift_arch()])
      .args(RELEASE_FLAGS.iter().copied())
      .args(extra_args.iter().cloned())
      .current_dir(project)
      .timeout(self.build_timeout);
    let outcome = self.step(invocation)?;
    Ok((outcome, release_binary_path(project, product, arch)))
  }

  fn strip(&self, binary: &Path) -> ShipResult<StepOutcome> {
    self.step(
      Invocation::new("strip")
        .arg("-x")
        .path_arg(binary)
        .timeout(self.command_timeout),
    )
  }

  fn test(&self, project: &Path, command: &TestCommand) -> ShipResult<StepOutcome> {
    let invocation = match command {
      TestCommand::Default => Invocation::new("swift").arg("test"),
      TestCommand::Custom(line) => Invocation::new("/bin/sh").arg("-c").arg(with_safety_flags(line)),
    };
    self.step(invocation.current_dir(project).timeout(self.build_timeout))
  }
}
