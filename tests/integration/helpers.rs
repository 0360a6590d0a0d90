//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// A Swift-style project directory under git, next to an empty tap directory
pub struct TestProject {
  _root: TempDir,
  pub path: PathBuf,
  pub tap: PathBuf,
}

impl TestProject {
  /// Create `<tmp>/tool` (a git repo with one commit) and `<tmp>/homebrew-tap`
  pub fn new() -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().join("tool");
    let tap = root.path().join("homebrew-tap");
    std::fs::create_dir_all(path.join("Sources/tool"))?;
    std::fs::create_dir_all(&tap)?;

    git(&path, &["init", "--initial-branch=main"])?;
    git(&path, &["config", "user.name", "Test User"])?;
    git(&path, &["config", "user.email", "test@example.com"])?;

    std::fs::write(
      path.join("Package.swift"),
      r#"// swift-tools-version:5.9
import PackageDescription

let package = Package(
  name: "tool",
  targets: [.executableTarget(name: "tool")]
)
"#,
    )?;
    std::fs::write(path.join("Sources/tool/main.swift"), "print(\"hello\")\n")?;

    git(&path, &["add", "."])?;
    git(&path, &["commit", "-m", "Initial package"])?;

    Ok(Self { _root: root, path, tap })
  }

  /// Tag HEAD
  pub fn tag(&self, name: &str) -> Result<()> {
    git(&self.path, &["tag", name])?;
    Ok(())
  }

  /// Write a minimal tapship.toml pointing at the sibling tap
  pub fn write_config(&self) -> Result<()> {
    self.write_file(
      "tapship.toml",
      r#"[formula]
name = "tool"
description = "A tiny tool"
homepage = "https://example.test/tool"
license = "MIT"
tap = "../homebrew-tap"
"#,
    )
  }

  pub fn write_file(&self, path: &str, content: &str) -> Result<()> {
    std::fs::write(self.path.join(path), content)?;
    Ok(())
  }

  pub fn file_exists(&self, path: &str) -> bool {
    self.path.join(path).exists()
  }

  pub fn read_file(&self, path: &str) -> Result<String> {
    Ok(std::fs::read_to_string(self.path.join(path))?)
  }
}

/// Run git command in a directory
pub fn git(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = Command::new("git")
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run git command")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    anyhow::bail!("Git command failed: git {}\n{}", args.join(" "), stderr);
  }

  Ok(output)
}

/// Run tapship and return its output whatever the exit status
pub fn tapship(cwd: &Path, args: &[&str]) -> Result<Output> {
  Command::new(env!("CARGO_BIN_EXE_tapship"))
    .current_dir(cwd)
    .args(args)
    .env("RUST_LOG", "tapship=warn")
    .output()
    .context("Failed to run tapship")
}

/// Run tapship and fail unless it exits successfully
pub fn run_tapship(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = tapship(cwd, args)?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    anyhow::bail!(
      "tapship command failed: tapship {}\nstdout: {}\nstderr: {}",
      args.join(" "),
      stdout,
      stderr
    );
  }

  Ok(output)
}

pub fn stdout(output: &Output) -> String {
  String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
  String::from_utf8_lossy(&output.stderr).into_owned()
}
