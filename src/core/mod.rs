//! Core building blocks shared by every command
//!
//! - **cancel**: SIGINT/SIGTERM cancellation token
//! - **config**: tapship.toml parsing and validation
//! - **error**: error types with contextual help messages and exit codes
//! - **exec**: external command execution with timeouts
//! - **fs**: file-system collaborator
//! - **vcs**: git operations abstraction (SystemGit)

pub mod cancel;
pub mod config;
pub mod error;
pub mod exec;
pub mod fs;
pub mod vcs;
