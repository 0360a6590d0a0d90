//! File-system collaborator used for formula persistence

use crate::core::error::{ResultExt, ShipResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Minimal file operations the pipeline needs
pub trait FileSystem {
  fn read_file(&self, path: &Path) -> ShipResult<String>;

  /// Create (or truncate) a file with the given contents
  fn write_file(&self, path: &Path, contents: &str) -> ShipResult<()>;

  fn delete_file(&self, path: &Path) -> ShipResult<()>;

  fn exists(&self, path: &Path) -> bool;

  /// Locate `parent/name` as a directory, creating it when `create` is set
  fn subdirectory(&self, parent: &Path, name: &str, create: bool) -> ShipResult<PathBuf>;
}

/// The real local file system
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFs;

impl FileSystem for LocalFs {
  fn read_file(&self, path: &Path) -> ShipResult<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
  }

  fn write_file(&self, path: &Path, contents: &str) -> ShipResult<()> {
    fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
  }

  fn delete_file(&self, path: &Path) -> ShipResult<()> {
    fs::remove_file(path).with_context(|| format!("Failed to delete {}", path.display()))
  }

  fn exists(&self, path: &Path) -> bool {
    path.exists()
  }

  fn subdirectory(&self, parent: &Path, name: &str, create: bool) -> ShipResult<PathBuf> {
    let dir = parent.join(name);
    if dir.is_dir() {
      return Ok(dir);
    }
    if create {
      fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;
      return Ok(dir);
    }
    Err(crate::core::error::ShipError::message(format!(
      "Directory not found: {}",
      dir.display()
    )))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  #[test]
  fn test_write_read_delete() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("tool.rb");
    let fs = LocalFs;

    fs.write_file(&path, "class Tool < Formula\nend\n").unwrap();
    assert!(fs.exists(&path));
    assert!(fs.read_file(&path).unwrap().starts_with("class Tool"));

    fs.delete_file(&path).unwrap();
    assert!(!fs.exists(&path));
  }

  #[test]
  fn test_subdirectory_create_and_locate() {
    let tmp = TempDir::new().unwrap();
    let fs = LocalFs;

    assert!(fs.subdirectory(tmp.path(), "Formula", false).is_err());
    let created = fs.subdirectory(tmp.path(), "Formula", true).unwrap();
    assert!(created.is_dir());
    assert_eq!(fs.subdirectory(tmp.path(), "Formula", false).unwrap(), created);
  }
}
