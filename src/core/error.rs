//! Error types for tapship with contextual messages and exit codes
//!
//! Every error that can stop a publish run lives here. Errors are never
//! retried: the pipeline surfaces the first failure, `main` prints it with
//! [`print_error`] and exits with [`ShipError::exit_code`].

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for tapship
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, invalid args, bad version input)
  User = 1,
  /// System error (toolchain, git, gh, I/O)
  System = 2,
  /// Validation failure (prechecks, failing tests)
  Validation = 3,
  /// Interrupted by SIGINT/SIGTERM
  Cancelled = 130,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for tapship
#[derive(Debug)]
pub enum ShipError {
  /// Configuration errors
  Config(ConfigError),

  /// Git operation errors
  Git(GitError),

  /// Release pipeline failures
  Pipeline(PipelineError),

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl ShipError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    ShipError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    ShipError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      ShipError::Message { message, context, help } => ShipError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      ShipError::Io(err) => ShipError::Message {
        message: format!("I/O error: {}", err),
        context: Some(ctx_str),
        help: None,
      },
      _ => self,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      ShipError::Config(_) => ExitCode::User,
      ShipError::Git(_) => ExitCode::System,
      ShipError::Pipeline(e) => e.exit_code(),
      ShipError::Io(_) => ExitCode::System,
      ShipError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      ShipError::Config(e) => e.help_message(),
      ShipError::Git(e) => e.help_message(),
      ShipError::Pipeline(e) => e.help_message(),
      ShipError::Message { help, .. } => help.clone(),
      ShipError::Io(_) => None,
    }
  }

  /// Borrow the pipeline error, if this is one
  #[cfg(test)]
  pub fn as_pipeline(&self) -> Option<&PipelineError> {
    match self {
      ShipError::Pipeline(e) => Some(e),
      _ => None,
    }
  }
}

impl fmt::Display for ShipError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ShipError::Config(e) => write!(f, "{}", e),
      ShipError::Git(e) => write!(f, "{}", e),
      ShipError::Pipeline(e) => write!(f, "{}", e),
      ShipError::Io(e) => write!(f, "I/O error: {}", e),
      ShipError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for ShipError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      ShipError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for ShipError {
  fn from(err: io::Error) -> Self {
    ShipError::Io(err)
  }
}

impl From<String> for ShipError {
  fn from(msg: String) -> Self {
    ShipError::message(msg)
  }
}

impl From<&str> for ShipError {
  fn from(msg: &str) -> Self {
    ShipError::message(msg)
  }
}

impl From<PipelineError> for ShipError {
  fn from(err: PipelineError) -> Self {
    ShipError::Pipeline(err)
  }
}

impl From<ConfigError> for ShipError {
  fn from(err: ConfigError) -> Self {
    ShipError::Config(err)
  }
}

impl From<GitError> for ShipError {
  fn from(err: GitError) -> Self {
    ShipError::Git(err)
  }
}

impl From<toml_edit::de::Error> for ShipError {
  fn from(err: toml_edit::de::Error) -> Self {
    ShipError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<toml_edit::ser::Error> for ShipError {
  fn from(err: toml_edit::ser::Error) -> Self {
    ShipError::message(format!("TOML serialization error: {}", err))
  }
}

impl From<serde_json::Error> for ShipError {
  fn from(err: serde_json::Error) -> Self {
    ShipError::message(format!("JSON error: {}", err))
  }
}

impl From<std::string::FromUtf8Error> for ShipError {
  fn from(err: std::string::FromUtf8Error) -> Self {
    ShipError::message(format!("UTF-8 conversion error: {}", err))
  }
}

impl From<ctrlc::Error> for ShipError {
  fn from(err: ctrlc::Error) -> Self {
    ShipError::message(format!("Failed to install signal handler: {}", err))
  }
}

impl From<which::Error> for ShipError {
  fn from(err: which::Error) -> Self {
    ShipError::message(format!("Executable lookup failed: {}", err))
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// tapship.toml not found
  NotFound { project_root: PathBuf },

  /// Missing required field
  MissingField { field: String },

  /// Field present but unusable
  InvalidValue { field: String, value: String, reason: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::NotFound { .. } => Some("Run `tapship init` to create a configuration file.".to_string()),
      ConfigError::MissingField { field } => Some(format!("Add `{}` to tapship.toml or pass it as a flag.", field)),
      ConfigError::InvalidValue { .. } => None,
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::NotFound { project_root } => {
        write!(
          f,
          "No tapship configuration found.\nExpected file: {}/tapship.toml",
          project_root.display()
        )
      }
      ConfigError::MissingField { field } => {
        write!(f, "Missing required field in config: {}", field)
      }
      ConfigError::InvalidValue { field, value, reason } => {
        write!(f, "Invalid value '{}' for {}: {}", value, field, reason)
      }
    }
  }
}

/// Git operation errors
#[derive(Debug)]
pub enum GitError {
  /// Git command failed
  CommandFailed { command: String, stderr: String },

  /// Repository not found
  RepoNotFound { path: PathBuf },

  /// Push failed
  PushFailed { remote: String, reason: String },
}

impl GitError {
  fn help_message(&self) -> Option<String> {
    match self {
      GitError::PushFailed { reason, .. } => {
        if reason.contains("non-fast-forward") || reason.contains("rejected") {
          Some("The tap has commits you don't have. Pull in the tap repository and re-run.".to_string())
        } else if reason.contains("permission denied") || reason.contains("403") {
          Some("Check your SSH key or `gh auth status`. Run `tapship doctor --thorough` to diagnose.".to_string())
        } else {
          None
        }
      }
      GitError::RepoNotFound { path } => Some(format!(
        "Initialize the repository first or check the path: {}",
        path.display()
      )),
      GitError::CommandFailed { .. } => None,
    }
  }
}

impl fmt::Display for GitError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GitError::CommandFailed { command, stderr } => {
        write!(f, "Git command failed: {}\n{}", command, stderr)
      }
      GitError::RepoNotFound { path } => {
        write!(f, "Git repository not found at: {}", path.display())
      }
      GitError::PushFailed { remote, reason } => {
        write!(f, "Push to {} failed: {}", remote, reason)
      }
    }
  }
}

/// Build stage that produced a [`PipelineError::BuildFailed`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStage {
  Clean,
  Build,
  Strip,
}

impl fmt::Display for BuildStage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      BuildStage::Clean => write!(f, "clean"),
      BuildStage::Build => write!(f, "build"),
      BuildStage::Strip => write!(f, "strip"),
    }
  }
}

/// Failures of the publish pipeline proper
#[derive(Debug)]
pub enum PipelineError {
  /// Explicit (or previous) version does not look like `v?X.Y.Z`
  InvalidVersion { version: String },

  /// Increment requested but there is no earlier release to bump
  NoPreviousVersion,

  /// Hash utility output did not start with a hex digest
  MissingHash { archive: PathBuf, output: String },

  /// clean/build/strip exited non-zero; artifacts are left in place
  BuildFailed {
    stage: BuildStage,
    command: String,
    stderr: String,
  },

  /// Test command exited non-zero
  TestFailed { command: String, output: String },

  /// Release creation or asset listing failed; archives are kept on disk
  ReleaseUploadFailed { reason: String },

  /// Project has uncommitted local changes
  UncommittedChanges { path: PathBuf },

  /// Release-host CLI not installed
  MissingReleaseCli { program: String },

  /// External command ran past its deadline and was killed
  Timeout { command: String, seconds: u64 },

  /// Interrupted by signal
  Cancelled,
}

impl PipelineError {
  fn exit_code(&self) -> ExitCode {
    match self {
      PipelineError::InvalidVersion { .. } | PipelineError::NoPreviousVersion => ExitCode::User,
      PipelineError::TestFailed { .. }
      | PipelineError::UncommittedChanges { .. }
      | PipelineError::MissingReleaseCli { .. } => ExitCode::Validation,
      PipelineError::Cancelled => ExitCode::Cancelled,
      PipelineError::MissingHash { .. }
      | PipelineError::BuildFailed { .. }
      | PipelineError::ReleaseUploadFailed { .. }
      | PipelineError::Timeout { .. } => ExitCode::System,
    }
  }

  fn help_message(&self) -> Option<String> {
    match self {
      PipelineError::InvalidVersion { .. } => {
        Some("Versions must look like 1.2.3 or v1.2.3, or use --bump major|minor|patch.".to_string())
      }
      PipelineError::NoPreviousVersion => {
        Some("No earlier release tag was found. Pass an explicit version with --version.".to_string())
      }
      PipelineError::BuildFailed { .. } => Some("Build products were left in .build/ for inspection.".to_string()),
      PipelineError::ReleaseUploadFailed { .. } => Some(
        "Archives were kept next to the binaries. Inspect the release with `gh release view` and retry manually."
          .to_string(),
      ),
      PipelineError::UncommittedChanges { .. } => {
        Some("Commit or stash your changes before publishing.".to_string())
      }
      PipelineError::MissingReleaseCli { .. } => {
        Some("Install the GitHub CLI (https://cli.github.com) and run `gh auth login`.".to_string())
      }
      PipelineError::Timeout { .. } => {
        Some("Raise the limit under [limits] in tapship.toml if the command legitimately needs longer.".to_string())
      }
      PipelineError::MissingHash { .. } | PipelineError::TestFailed { .. } | PipelineError::Cancelled => None,
    }
  }
}

impl fmt::Display for PipelineError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PipelineError::InvalidVersion { version } => write!(f, "Invalid version: '{}'", version),
      PipelineError::NoPreviousVersion => write!(f, "Cannot increment: no previous release version"),
      PipelineError::MissingHash { archive, output } => write!(
        f,
        "Could not read a SHA-256 hash for {} (hash utility printed: '{}')",
        archive.display(),
        output.trim()
      ),
      PipelineError::BuildFailed { stage, command, stderr } => {
        write!(f, "Toolchain {} failed: {}\n{}", stage, command, stderr.trim_end())
      }
      PipelineError::TestFailed { command, output } => {
        write!(f, "Tests failed: {}\n{}", command, output.trim_end())
      }
      PipelineError::ReleaseUploadFailed { reason } => write!(f, "Release upload failed: {}", reason),
      PipelineError::UncommittedChanges { path } => {
        write!(f, "Uncommitted changes in {}", path.display())
      }
      PipelineError::MissingReleaseCli { program } => {
        write!(f, "Release CLI '{}' was not found on PATH", program)
      }
      PipelineError::Timeout { command, seconds } => {
        write!(f, "Command timed out after {}s: {}", seconds, command)
      }
      PipelineError::Cancelled => write!(f, "Publish cancelled"),
    }
  }
}

/// Result type alias for tapship
pub type ShipResult<T> = Result<T, ShipError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> ShipResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> ShipResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<ShipError>,
{
  fn context(self, ctx: impl Into<String>) -> ShipResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> ShipResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &ShipError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}
