//! Tests for the `doctor` command

use crate::helpers::*;
use anyhow::Result;

#[test]
fn test_doctor_json_reports_missing_config() -> Result<()> {
  let project = TestProject::new()?;

  let output = tapship(&project.path, &["doctor", "--json"])?;
  assert_eq!(output.status.code(), Some(3));

  let results: serde_json::Value = serde_json::from_slice(&output.stdout)?;
  let config = results
    .as_array()
    .and_then(|checks| checks.iter().find(|c| c["check"] == "config"))
    .expect("config check present");
  assert_eq!(config["status"], "error");
  assert!(config["fix"].as_str().unwrap_or_default().contains("tapship init"));

  Ok(())
}

#[test]
fn test_doctor_skips_gh_auth_unless_thorough() -> Result<()> {
  let project = TestProject::new()?;
  project.write_config()?;

  let output = tapship(&project.path, &["doctor", "--json"])?;
  let results: serde_json::Value = serde_json::from_slice(&output.stdout)?;
  let names: Vec<&str> = results
    .as_array()
    .map(|checks| checks.iter().filter_map(|c| c["check"].as_str()).collect())
    .unwrap_or_default();

  assert!(names.contains(&"config"));
  assert!(names.contains(&"tap-directory"));
  assert!(!names.contains(&"gh-auth"));

  Ok(())
}
