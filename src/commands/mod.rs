pub mod doctor;
pub mod formula;
pub mod init;
pub mod publish;
pub mod version;

pub use doctor::run_doctor;
pub use formula::{FormulaArgs, run_formula};
pub use init::run_init;
pub use publish::{PublishArgs, run_publish};
pub use version::run_version;

use crate::core::error::ShipResult;
use std::env;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Absolute project directory: `path` if given (relative to cwd), else cwd
pub(crate) fn resolve_project(path: Option<&Path>) -> ShipResult<PathBuf> {
  let current_dir = env::current_dir()?;
  Ok(match path {
    Some(p) if p.is_absolute() => p.to_path_buf(),
    Some(p) => current_dir.join(p),
    None => current_dir,
  })
}

/// Print `question` and read one trimmed line from stdin
pub(crate) fn prompt_line(question: &str) -> ShipResult<String> {
  print!("{}", question);
  io::stdout().flush()?;
  let mut response = String::new();
  io::stdin().read_line(&mut response)?;
  Ok(response.trim().to_string())
}

/// `[y/N]` prompt; anything but y/yes is a no
pub(crate) fn confirm(question: &str) -> ShipResult<bool> {
  let answer = prompt_line(&format!("{} [y/N]: ", question))?.to_lowercase();
  Ok(answer == "y" || answer == "yes")
}
