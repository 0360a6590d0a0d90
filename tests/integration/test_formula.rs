//! Tests for the `formula` command

use crate::helpers::*;
use anyhow::Result;

#[test]
fn test_single_asset_formula() -> Result<()> {
  let project = TestProject::new()?;

  let output = run_tapship(
    &project.path,
    &[
      "formula",
      "--name",
      "my-tool",
      "--version",
      "1.0.0",
      "--description",
      "Does things",
      "--url",
      "https://dl.test/my-tool.tar.gz",
      "--sha256",
      "abc123",
    ],
  )?;
  let text = stdout(&output);

  assert!(text.starts_with("class MyTool < Formula\n"));
  assert!(text.contains("  desc \"Does things\"\n"));
  assert!(text.contains("  url \"https://dl.test/my-tool.tar.gz\"\n"));
  assert!(text.contains("  sha256 \"abc123\"\n"));
  assert!(text.contains("bin.install \"my-tool\""));
  assert!(!text.contains("on_macos"));

  Ok(())
}

#[test]
fn test_per_arch_formula_branches_on_cpu() -> Result<()> {
  let project = TestProject::new()?;

  let output = run_tapship(
    &project.path,
    &[
      "formula",
      "--name",
      "tool",
      "--version",
      "2.1.0",
      "--arm-url",
      "https://dl.test/tool-arm64.tar.gz",
      "--arm-sha256",
      "aaa",
      "--intel-url",
      "https://dl.test/tool-x86_64.tar.gz",
      "--intel-sha256",
      "bbb",
    ],
  )?;
  let text = stdout(&output);

  assert!(text.contains("on_macos do"));
  assert!(text.contains("if Hardware::CPU.arm?"));
  assert!(text.find("tool-arm64.tar.gz") < text.find("tool-x86_64.tar.gz"));

  Ok(())
}

#[test]
fn test_formula_without_assets_warns() -> Result<()> {
  let project = TestProject::new()?;

  let output = run_tapship(&project.path, &["formula", "--name", "tool", "--version", "1.0.0"])?;
  assert!(stdout(&output).contains("  url \"\"\n"));
  assert!(stderr(&output).contains("No asset"));

  Ok(())
}
