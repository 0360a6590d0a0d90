use crate::core::error::{ConfigError, ResultExt, ShipError, ShipResult};
use crate::release::arch::BuildType;
use crate::release::build::TestCommand;
use crate::release::upload::NoteSource;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default file name written by `tapship init`
pub const CONFIG_FILE: &str = "tapship.toml";

/// Configuration for tapship
/// Searched in order: tapship.toml, .tapship.toml, .config/tapship.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipConfig {
  #[serde(default)]
  pub project: ProjectConfig,
  pub formula: FormulaConfig,
  #[serde(default)]
  pub release: ReleaseConfig,
  #[serde(default)]
  pub limits: LimitsConfig,
}

/// How the Swift package is built
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
  /// Executable product name (default: project directory name)
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub product: Option<String>,

  /// universal | arm64 | x86_64
  #[serde(default = "default_build_type")]
  pub build_type: String,

  /// Appended verbatim to every `swift build`
  #[serde(default)]
  pub extra_build_args: Vec<String>,

  #[serde(default)]
  pub skip_clean: bool,

  /// "default" for `swift test`, anything else is run through the shell
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub test_command: Option<String>,
}

fn default_build_type() -> String {
  "universal".to_string()
}

impl Default for ProjectConfig {
  fn default() -> Self {
    Self {
      product: None,
      build_type: default_build_type(),
      extra_build_args: Vec::new(),
      skip_clean: false,
      test_command: None,
    }
  }
}

/// Formula metadata and destination tap
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormulaConfig {
  pub name: String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub homepage: String,
  #[serde(default)]
  pub license: String,
  /// Tap checkout, relative to the project directory or absolute
  pub tap: PathBuf,
}

/// Release body source; at most one of the two may be set
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReleaseConfig {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub notes: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub notes_file: Option<PathBuf>,
}

impl ReleaseConfig {
  /// Resolve the configured note source; relative files are anchored at `project_root`
  pub fn note_source(&self, project_root: &Path) -> NoteSource {
    match (&self.notes, &self.notes_file) {
      (_, Some(file)) => NoteSource::File(project_root.join(file)),
      (Some(text), None) => NoteSource::Text(text.clone()),
      (None, None) => NoteSource::default(),
    }
  }
}

/// External command deadlines, in seconds
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LimitsConfig {
  /// clean, build, and test
  #[serde(default = "default_build_seconds")]
  pub build_seconds: u64,
  /// everything else (strip, tar, shasum, git, gh)
  #[serde(default = "default_command_seconds")]
  pub command_seconds: u64,
}

fn default_build_seconds() -> u64 {
  3600
}

fn default_command_seconds() -> u64 {
  600
}

impl Default for LimitsConfig {
  fn default() -> Self {
    Self {
      build_seconds: default_build_seconds(),
      command_seconds: default_command_seconds(),
    }
  }
}

impl LimitsConfig {
  pub fn build_timeout(&self) -> Duration {
    Duration::from_secs(self.build_seconds)
  }

  pub fn command_timeout(&self) -> Duration {
    Duration::from_secs(self.command_seconds)
  }

  pub fn validate(&self) -> ShipResult<()> {
    for (field, value) in [
      ("limits.build_seconds", self.build_seconds),
      ("limits.command_seconds", self.command_seconds),
    ] {
      if value == 0 {
        return Err(
          ConfigError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: "timeouts must be at least one second".to_string(),
          }
          .into(),
        );
      }
    }
    Ok(())
  }
}

impl ShipConfig {
  /// Find config file in search order: tapship.toml, .tapship.toml, .config/tapship.toml
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = vec![
      path.join(CONFIG_FILE),
      path.join(".tapship.toml"),
      path.join(".config").join(CONFIG_FILE),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load and validate config (searches multiple locations)
  pub fn load(path: &Path) -> ShipResult<Self> {
    let config_path = Self::find_config_path(path).ok_or_else(|| {
      ShipError::Config(ConfigError::NotFound {
        project_root: path.to_path_buf(),
      })
    })?;

    let content = fs::read_to_string(&config_path)
      .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
    let config: ShipConfig = toml_edit::de::from_str(&content)
      .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

    config.validate()?;
    Ok(config)
  }

  /// Save config to tapship.toml (default location)
  pub fn save(&self, path: &Path) -> ShipResult<()> {
    let config_path = path.join(CONFIG_FILE);
    let content = toml_edit::ser::to_string_pretty(self).context("Failed to serialize config to TOML")?;
    fs::write(&config_path, content).with_context(|| format!("Failed to write config to {}", config_path.display()))?;
    Ok(())
  }

  /// Check if config exists at the given path
  pub fn exists(path: &Path) -> bool {
    Self::find_config_path(path).is_some()
  }

  /// Starter config for a formula named `name` published into `tap`
  pub fn new(name: impl Into<String>, tap: PathBuf) -> Self {
    Self {
      project: ProjectConfig::default(),
      formula: FormulaConfig {
        name: name.into(),
        description: String::new(),
        homepage: String::new(),
        license: "MIT".to_string(),
        tap,
      },
      release: ReleaseConfig::default(),
      limits: LimitsConfig::default(),
    }
  }

  pub fn validate(&self) -> ShipResult<()> {
    self.build_type()?;

    if self.formula.name.trim().is_empty() {
      return Err(
        ConfigError::MissingField {
          field: "formula.name".to_string(),
        }
        .into(),
      );
    }
    if crate::release::formula::formula_class_name(&self.formula.name).is_empty() {
      return Err(
        ConfigError::InvalidValue {
          field: "formula.name".to_string(),
          value: self.formula.name.clone(),
          reason: "must contain at least one letter or digit".to_string(),
        }
        .into(),
      );
    }
    if self.formula.tap.as_os_str().is_empty() {
      return Err(
        ConfigError::MissingField {
          field: "formula.tap".to_string(),
        }
        .into(),
      );
    }

    if self.release.notes.is_some() && self.release.notes_file.is_some() {
      return Err(ShipError::with_help(
        "Both release.notes and release.notes_file are set",
        "Keep only one of them under [release] in tapship.toml",
      ));
    }

    self.limits.validate()
  }

  pub fn build_type(&self) -> ShipResult<BuildType> {
    self.project.build_type.parse::<BuildType>().map_err(|reason| {
      ConfigError::InvalidValue {
        field: "project.build_type".to_string(),
        value: self.project.build_type.clone(),
        reason,
      }
      .into()
    })
  }

  /// Product name, falling back to the project directory name
  pub fn product_name(&self, project_root: &Path) -> String {
    self
      .project
      .product
      .clone()
      .filter(|p| !p.trim().is_empty())
      .or_else(|| {
        project_root
          .file_name()
          .map(|n| n.to_string_lossy().into_owned())
      })
      .unwrap_or_else(|| self.formula.name.clone())
  }

  /// Absolute tap path
  pub fn tap_path(&self, project_root: &Path) -> PathBuf {
    if self.formula.tap.is_absolute() {
      self.formula.tap.clone()
    } else {
      project_root.join(&self.formula.tap)
    }
  }

  pub fn test_command(&self) -> Option<TestCommand> {
    self.project.test_command.as_deref().map(TestCommand::parse)
  }
}
