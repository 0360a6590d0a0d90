//! Tests for the `init` command

use crate::helpers::*;
use anyhow::Result;

#[test]
fn test_init_creates_config() -> Result<()> {
  let project = TestProject::new()?;

  run_tapship(&project.path, &["init"])?;

  assert!(project.file_exists("tapship.toml"));
  let config = project.read_file("tapship.toml")?;
  assert!(config.contains("[formula]"));
  assert!(config.contains("name = \"tool\""));
  assert!(config.contains("../homebrew-tap"));

  Ok(())
}

#[test]
fn test_init_with_explicit_values() -> Result<()> {
  let project = TestProject::new()?;

  run_tapship(&project.path, &["init", "--name", "widget", "--tap", "/srv/taps/homebrew-widgets"])?;

  let config = project.read_file("tapship.toml")?;
  assert!(config.contains("name = \"widget\""));
  assert!(config.contains("/srv/taps/homebrew-widgets"));

  Ok(())
}

#[test]
fn test_init_force_overwrites_existing_config() -> Result<()> {
  let project = TestProject::new()?;
  project.write_file("tapship.toml", "[formula]\nname = \"old\"\ntap = \"../t\"\n")?;

  run_tapship(&project.path, &["init", "--force", "--name", "new"])?;

  let config = project.read_file("tapship.toml")?;
  assert!(config.contains("name = \"new\""));
  assert!(!config.contains("\"old\""));

  Ok(())
}

#[test]
fn test_private_requires_create_tap() -> Result<()> {
  let project = TestProject::new()?;

  let output = tapship(&project.path, &["init", "--private"])?;
  assert!(!output.status.success());
  assert!(!project.file_exists("tapship.toml"));

  Ok(())
}
