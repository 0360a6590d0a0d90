//! Tests for the `publish` command up to the point where external tools are needed

use crate::helpers::*;
use anyhow::Result;

#[test]
fn test_publish_without_config() -> Result<()> {
  let project = TestProject::new()?;

  let output = tapship(&project.path, &["publish", "--version", "1.0.0", "--yes"])?;
  assert_eq!(output.status.code(), Some(1));
  assert!(stderr(&output).contains("tapship init"));

  Ok(())
}

#[test]
fn test_publish_non_interactive_needs_version() -> Result<()> {
  let project = TestProject::new()?;
  project.write_config()?;

  let output = tapship(&project.path, &["publish", "--json"])?;
  assert_eq!(output.status.code(), Some(1));
  assert!(stderr(&output).contains("No release version given"));
  assert!(stdout(&output).is_empty());

  Ok(())
}

#[test]
fn test_publish_rejects_conflicting_flags() -> Result<()> {
  let project = TestProject::new()?;
  project.write_config()?;

  let output = tapship(
    &project.path,
    &["publish", "--version", "1.0.0", "--notes", "hi", "--notes-file", "NOTES.md"],
  )?;
  assert!(!output.status.success());
  assert!(stderr(&output).contains("cannot be used with"));

  let output = tapship(&project.path, &["publish", "--version", "1.0.0", "--bump", "patch"])?;
  assert!(!output.status.success());

  Ok(())
}

#[test]
fn test_publish_rejects_unknown_build_type() -> Result<()> {
  let project = TestProject::new()?;
  project.write_config()?;

  let output = tapship(&project.path, &["publish", "--version", "1.0.0", "--build-type", "sparc"])?;
  assert!(!output.status.success());
  assert!(stderr(&output).contains("sparc"));

  Ok(())
}
