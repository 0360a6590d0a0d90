use std::path::{Path, PathBuf};

use crate::commands::{confirm, resolve_project};
use crate::core::cancel::CancellationToken;
use crate::core::config::{CONFIG_FILE, ShipConfig};
use crate::core::error::ShipResult;
use crate::core::exec::SystemRunner;
use crate::core::fs::{FileSystem, LocalFs};
use crate::core::vcs::{RepoVisibility, SystemGit, VersionControl};

/// Default tap location, next to the project checkout
const DEFAULT_TAP: &str = "../homebrew-tap";

/// Run the init command to write a starter tapship.toml
///
/// With `create_tap`, a missing tap checkout is also initialized locally and
/// created on GitHub with the given visibility.
pub fn run_init(
  path: Option<&Path>,
  name: Option<String>,
  tap: Option<PathBuf>,
  force: bool,
  create_tap: Option<RepoVisibility>,
) -> ShipResult<()> {
  let project = resolve_project(path)?;
  println!("📦 Project at: {}", project.display());

  // Check if config already exists
  if ShipConfig::exists(&project) && !force && !confirm("⚠️  Configuration already exists. Overwrite?")? {
    println!("Aborted.");
    return Ok(());
  }

  let name = name.unwrap_or_else(|| default_name(&project));
  let tap = tap.unwrap_or_else(|| PathBuf::from(DEFAULT_TAP));

  let mut config = ShipConfig::new(name, tap);
  config.project.test_command = Some("default".to_string());
  config.validate()?;

  println!("\n💾 Saving configuration...");
  config.save(&project)?;

  if let Some(visibility) = create_tap {
    let tap_path = config.tap_path(&project);
    let runner = SystemRunner::new(CancellationToken::new());
    let git = SystemGit::new(&runner, config.limits.command_timeout());
    match bootstrap_tap(&git, &LocalFs, &tap_path, visibility)? {
      Some(url) => println!("🍺 Created tap {} ({})", tap_path.display(), url),
      None => println!("🍺 Tap already exists at {}, leaving it alone", tap_path.display()),
    }
  }

  println!("\n✅ Successfully initialized tapship!");
  println!("   Configuration saved to: {}", project.join(CONFIG_FILE).display());
  println!("\n🚀 Next steps:");
  println!("   1. Fill in description, homepage, and license under [formula]");
  println!("   2. Point formula.tap at your homebrew-<name> checkout");
  println!("   3. Run: tapship doctor");
  println!("   4. Run: tapship publish --bump patch");

  Ok(())
}

/// Create `tap/Formula`, `git init` the tap, and create its GitHub repository.
///
/// Returns `None` without touching anything when `tap` is already a git checkout.
fn bootstrap_tap(
  vcs: &dyn VersionControl,
  fs: &dyn FileSystem,
  tap: &Path,
  visibility: RepoVisibility,
) -> ShipResult<Option<String>> {
  if fs.exists(&tap.join(".git")) {
    return Ok(None);
  }

  fs.subdirectory(tap, "Formula", true)?;
  vcs.init(tap)?;

  let repo_name = default_name(tap);
  let url = vcs.create_remote_repo(tap, &repo_name, visibility)?;
  Ok(Some(url))
}

fn default_name(project: &Path) -> String {
  project
    .file_name()
    .map(|n| n.to_string_lossy().into_owned())
    .unwrap_or_else(|| "tool".to_string())
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::cell::RefCell;
  use tempfile::TempDir;

  #[derive(Default)]
  struct RecordingVcs {
    calls: RefCell<Vec<String>>,
  }

  impl VersionControl for RecordingVcs {
    fn has_uncommitted_changes(&self, _path: &Path) -> ShipResult<bool> {
      Ok(false)
    }

    fn commit_and_push(&self, _path: &Path, _message: &str) -> ShipResult<()> {
      Ok(())
    }

    fn remote_url(&self, _path: &Path) -> ShipResult<Option<String>> {
      Ok(None)
    }

    fn previous_release_version(&self, _path: &Path) -> ShipResult<Option<String>> {
      Ok(None)
    }

    fn init(&self, path: &Path) -> ShipResult<()> {
      self.calls.borrow_mut().push(format!("init {}", default_name(path)));
      Ok(())
    }

    fn create_remote_repo(&self, _path: &Path, name: &str, visibility: RepoVisibility) -> ShipResult<String> {
      self.calls.borrow_mut().push(format!("create {} {:?}", name, visibility));
      Ok(format!("https://github.com/me/{}", name))
    }
  }

  #[test]
  fn test_init_writes_loadable_config() {
    let tmp = TempDir::new().unwrap();
    let project = tmp.path().join("my-tool");
    std::fs::create_dir(&project).unwrap();

    run_init(Some(&project), None, None, false, None).unwrap();

    let config = ShipConfig::load(&project).unwrap();
    assert_eq!(config.formula.name, "my-tool");
    assert_eq!(config.formula.tap, PathBuf::from(DEFAULT_TAP));
  }

  #[test]
  fn test_force_overwrites() {
    let tmp = TempDir::new().unwrap();
    run_init(Some(tmp.path()), Some("first".to_string()), None, false, None).unwrap();
    run_init(
      Some(tmp.path()),
      Some("second".to_string()),
      Some(PathBuf::from("/taps/x")),
      true,
      None,
    )
    .unwrap();

    let config = ShipConfig::load(tmp.path()).unwrap();
    assert_eq!(config.formula.name, "second");
    assert_eq!(config.formula.tap, PathBuf::from("/taps/x"));
  }

  #[test]
  fn test_bootstrap_new_tap() {
    let tmp = TempDir::new().unwrap();
    let tap = tmp.path().join("homebrew-tools");
    let vcs = RecordingVcs::default();

    let url = bootstrap_tap(&vcs, &LocalFs, &tap, RepoVisibility::Public).unwrap();

    assert_eq!(url.as_deref(), Some("https://github.com/me/homebrew-tools"));
    assert!(tap.join("Formula").is_dir());
    assert_eq!(
      *vcs.calls.borrow(),
      vec!["init homebrew-tools".to_string(), "create homebrew-tools Public".to_string()]
    );
  }

  #[test]
  fn test_bootstrap_skips_existing_checkout() {
    let tmp = TempDir::new().unwrap();
    std::fs::create_dir(tmp.path().join(".git")).unwrap();
    let vcs = RecordingVcs::default();

    let url = bootstrap_tap(&vcs, &LocalFs, tmp.path(), RepoVisibility::Private).unwrap();

    assert_eq!(url, None);
    assert!(vcs.calls.borrow().is_empty());
  }
}
