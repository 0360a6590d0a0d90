//! Health checks for `tapship doctor`
//!
//! # Built-in Checks
//!
//! - **required-tools**: gh, git, swift, tar, shasum, and strip are on PATH
//! - **config**: tapship.toml exists and validates
//! - **tap-directory**: the configured tap is a git checkout with an origin
//! - **gh-auth**: `gh auth status` succeeds (thorough only)

mod check;
mod config;
mod gh_auth;
mod runner;
mod tap;
mod tools;

pub use check::{CheckContext, Status};
pub use runner::{create_default_runner, overall};
