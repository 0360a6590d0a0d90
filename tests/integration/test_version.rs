//! Tests for the `version` command

use crate::helpers::*;
use anyhow::Result;

#[test]
fn test_exact_version_is_echoed() -> Result<()> {
  let project = TestProject::new()?;

  let output = run_tapship(&project.path, &["version", "--exact", "v1.4.0"])?;
  assert_eq!(stdout(&output).trim(), "v1.4.0");

  Ok(())
}

#[test]
fn test_bump_from_explicit_previous() -> Result<()> {
  let project = TestProject::new()?;

  let output = run_tapship(&project.path, &["version", "--bump", "minor", "--from", "v1.4.7"])?;
  assert_eq!(stdout(&output).trim(), "1.5.0");

  let output = run_tapship(&project.path, &["version", "--bump", "major", "--from", "1.4.7"])?;
  assert_eq!(stdout(&output).trim(), "2.0.0");

  Ok(())
}

#[test]
fn test_bump_reads_latest_tag() -> Result<()> {
  let project = TestProject::new()?;
  project.tag("v1.9.0")?;
  project.tag("v1.10.0")?;
  project.tag("nightly")?;

  let output = run_tapship(&project.path, &["version", "--bump", "patch"])?;
  assert_eq!(stdout(&output).trim(), "1.10.1");

  Ok(())
}

#[test]
fn test_bump_without_tags_fails() -> Result<()> {
  let project = TestProject::new()?;

  let output = tapship(&project.path, &["version", "--bump", "patch"])?;
  assert_eq!(output.status.code(), Some(1));
  assert!(stderr(&output).contains("--version"));

  Ok(())
}

#[test]
fn test_invalid_version_is_user_error() -> Result<()> {
  let project = TestProject::new()?;

  let output = tapship(&project.path, &["version", "--exact", "1.2"])?;
  assert_eq!(output.status.code(), Some(1));
  assert!(stderr(&output).contains("1.2"));

  Ok(())
}
