//! CPU architecture targets and build types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Marker SwiftPM puts in the build directory of arm64 products
pub const ARM_BUILD_MARKER: &str = "arm64-apple-macosx";

/// Marker SwiftPM puts in the build directory of x86_64 products
pub const INTEL_BUILD_MARKER: &str = "x86_64-apple-macosx";

/// A supported CPU architecture
///
/// Ordering matters: `Arm64 < X86_64`, so sorted sets build ARM first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ArchitectureTarget {
  #[serde(rename = "arm64")]
  Arm64,
  #[serde(rename = "x86_64")]
  X86_64,
}

impl ArchitectureTarget {
  /// Name passed to `swift build --arch`
  pub fn swift_arch(self) -> &'static str {
    match self {
      ArchitectureTarget::Arm64 => "arm64",
      ArchitectureTarget::X86_64 => "x86_64",
    }
  }

  /// Build-directory marker for products of this architecture
  pub fn build_marker(self) -> &'static str {
    match self {
      ArchitectureTarget::Arm64 => ARM_BUILD_MARKER,
      ArchitectureTarget::X86_64 => INTEL_BUILD_MARKER,
    }
  }

  /// Suffix inserted before `.tar.gz`
  pub fn archive_suffix(self) -> &'static str {
    match self {
      ArchitectureTarget::Arm64 => "-arm64",
      ArchitectureTarget::X86_64 => "-x86_64",
    }
  }

  /// Infer the architecture from a build-output path, if it carries a marker
  pub fn from_build_path(path: &Path) -> Option<Self> {
    let text = path.to_string_lossy();
    if text.contains(ARM_BUILD_MARKER) {
      Some(ArchitectureTarget::Arm64)
    } else if text.contains(INTEL_BUILD_MARKER) {
      Some(ArchitectureTarget::X86_64)
    } else {
      None
    }
  }
}

impl fmt::Display for ArchitectureTarget {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.swift_arch())
  }
}

/// What the user asked to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BuildType {
  /// Both architectures, ARM64 first
  #[default]
  Universal,
  #[serde(rename = "arm64")]
  Arm64,
  #[serde(rename = "x86_64")]
  X86_64,
}

impl BuildType {
  /// Expand to the ordered architecture set
  pub fn targets(self) -> Vec<ArchitectureTarget> {
    match self {
      BuildType::Universal => vec![ArchitectureTarget::Arm64, ArchitectureTarget::X86_64],
      BuildType::Arm64 => vec![ArchitectureTarget::Arm64],
      BuildType::X86_64 => vec![ArchitectureTarget::X86_64],
    }
  }
}

impl FromStr for BuildType {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "universal" => Ok(BuildType::Universal),
      "arm64" | "aarch64" => Ok(BuildType::Arm64),
      "x86_64" | "x86-64" | "intel" => Ok(BuildType::X86_64),
      other => Err(format!(
        "unknown build type '{}' (expected universal, arm64, or x86_64)",
        other
      )),
    }
  }
}

impl fmt::Display for BuildType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      BuildType::Universal => write!(f, "universal"),
      BuildType::Arm64 => write!(f, "arm64"),
      BuildType::X86_64 => write!(f, "x86_64"),
    }
  }
}
