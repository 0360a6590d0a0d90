//! Release version resolution
//!
//! Turns a [`ReleaseVersionRequest`] plus the previous release into the
//! version string used for the tag, the release title, and the formula.
//! Pure and deterministic; prompting for a missing request is the caller's job.

use crate::core::error::{PipelineError, ShipResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static VERSION_PATTERN: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^v?[0-9]+\.[0-9]+\.[0-9]+$").expect("version pattern is a valid regex"));

/// Version component to bump
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionComponent {
  Major,
  Minor,
  Patch,
}

impl FromStr for VersionComponent {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "major" => Ok(VersionComponent::Major),
      "minor" => Ok(VersionComponent::Minor),
      "patch" => Ok(VersionComponent::Patch),
      other => Err(format!("unknown version component '{}' (expected major, minor, or patch)", other)),
    }
  }
}

impl fmt::Display for VersionComponent {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      VersionComponent::Major => write!(f, "major"),
      VersionComponent::Minor => write!(f, "minor"),
      VersionComponent::Patch => write!(f, "patch"),
    }
  }
}

/// What the caller asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseVersionRequest {
  /// Use this version verbatim (after validation)
  Exact(String),
  /// Bump the previous release
  Increment(VersionComponent),
}

impl ReleaseVersionRequest {
  /// Interpret free-form input: a component name means increment, anything else is exact
  pub fn parse_input(input: &str) -> Self {
    match input.parse::<VersionComponent>() {
      Ok(component) => ReleaseVersionRequest::Increment(component),
      Err(_) => ReleaseVersionRequest::Exact(input.trim().to_string()),
    }
  }
}

/// Check `^v?\d+\.\d+\.\d+$`
pub fn is_valid_version(version: &str) -> bool {
  VERSION_PATTERN.is_match(version)
}

/// Split `v?X.Y.Z` into its numeric components
pub fn parse_components(version: &str) -> Option<(u64, u64, u64)> {
  let bare = version.strip_prefix('v').unwrap_or(version);
  let mut parts = bare.split('.').map(|p| p.parse::<u64>().ok());
  let major = parts.next()??;
  let minor = parts.next()??;
  let patch = parts.next()??;
  if parts.next().is_some() {
    return None;
  }
  Some((major, minor, patch))
}

/// Resolve the release version.
///
/// `Exact` versions are returned unchanged, keeping any `v` prefix.
/// `Increment` drops the prefix of the previous version: `v1.2.3` + patch is `1.2.4`.
pub fn resolve(requested: &ReleaseVersionRequest, previous_version: Option<&str>) -> ShipResult<String> {
  match requested {
    ReleaseVersionRequest::Exact(version) => {
      if !is_valid_version(version) {
        return Err(
          PipelineError::InvalidVersion {
            version: version.clone(),
          }
          .into(),
        );
      }
      Ok(version.clone())
    }
    ReleaseVersionRequest::Increment(component) => {
      let previous = previous_version.ok_or(PipelineError::NoPreviousVersion)?;
      increment(*component, previous)
    }
  }
}

/// Bump one component of `previous`, resetting the lower ones
pub fn increment(component: VersionComponent, previous: &str) -> ShipResult<String> {
  let (major, minor, patch) = parse_components(previous.trim()).ok_or_else(|| PipelineError::InvalidVersion {
    version: previous.to_string(),
  })?;

  let mut version = semver::Version::new(major, minor, patch);
  match component {
    VersionComponent::Major => {
      version.major += 1;
      version.minor = 0;
      version.patch = 0;
    }
    VersionComponent::Minor => {
      version.minor += 1;
      version.patch = 0;
    }
    VersionComponent::Patch => {
      version.patch += 1;
    }
  }

  Ok(version.to_string())
}
