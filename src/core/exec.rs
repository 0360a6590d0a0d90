//! External process execution
//!
//! Every tool tapship drives (swift, strip, tar, shasum, git, gh) goes through
//! a [`CommandRunner`]. The system implementation blocks on the child, but
//! enforces the invocation's timeout and honours the cancellation token by
//! killing the child. On unix the child leads its own process group and the
//! whole group is killed, so `sh -c` lines and compiler drivers don't leave
//! grandchildren holding the output pipes.

use crate::core::cancel::CancellationToken;
use crate::core::error::{PipelineError, ShipError, ShipResult};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::debug;
use wait_timeout::ChildExt;

/// How often a running child is checked for cancellation/deadline
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A single external command, fully described
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
  program: String,
  args: Vec<String>,
  cwd: Option<PathBuf>,
  env: Vec<(String, String)>,
  timeout: Option<Duration>,
}

impl Invocation {
  pub fn new(program: impl Into<String>) -> Self {
    Self {
      program: program.into(),
      args: Vec::new(),
      cwd: None,
      env: Vec::new(),
      timeout: None,
    }
  }

  pub fn arg(mut self, arg: impl Into<String>) -> Self {
    self.args.push(arg.into());
    self
  }

  pub fn args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.args.extend(args.into_iter().map(Into::into));
    self
  }

  /// Append a path argument (lossy on non-UTF-8 paths)
  pub fn path_arg(self, path: &Path) -> Self {
    self.arg(path.to_string_lossy().into_owned())
  }

  pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.cwd = Some(dir.into());
    self
  }

  /// Set an environment variable for the child (the rest is inherited)
  pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
    self.env.push((key.into(), value.into()));
    self
  }

  pub fn timeout(mut self, timeout: Duration) -> Self {
    self.timeout = Some(timeout);
    self
  }

  pub fn get_args(&self) -> &[String] {
    &self.args
  }

  #[cfg(test)]
  pub fn program(&self) -> &str {
    &self.program
  }

  #[cfg(test)]
  pub fn get_current_dir(&self) -> Option<&Path> {
    self.cwd.as_deref()
  }

  #[cfg(test)]
  pub fn get_env(&self, key: &str) -> Option<&str> {
    self.env.iter().rev().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
  }

  #[cfg(test)]
  pub fn get_timeout(&self) -> Option<Duration> {
    self.timeout
  }

  /// Shell-like rendering for logs and error messages
  pub fn display(&self) -> String {
    let mut parts = Vec::with_capacity(self.args.len() + 1);
    parts.push(self.program.clone());
    for arg in &self.args {
      if arg.is_empty() || arg.contains(char::is_whitespace) {
        parts.push(format!("'{}'", arg));
      } else {
        parts.push(arg.clone());
      }
    }
    parts.join(" ")
  }
}

/// Captured result of a finished command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
  /// Exit code, `None` when killed by a signal
  pub code: Option<i32>,
  pub stdout: String,
  pub stderr: String,
}

impl CommandOutput {
  pub fn success(&self) -> bool {
    self.code == Some(0)
  }

  /// stdout followed by stderr, for surfacing test failures
  pub fn combined(&self) -> String {
    match (self.stdout.trim().is_empty(), self.stderr.trim().is_empty()) {
      (true, _) => self.stderr.clone(),
      (false, true) => self.stdout.clone(),
      (false, false) => format!("{}\n{}", self.stdout.trim_end(), self.stderr),
    }
  }
}

/// Runs external commands to completion
pub trait CommandRunner {
  /// Run the invocation and capture its output.
  ///
  /// A non-zero exit is NOT an error here; callers decide what failure means.
  /// Errors are reserved for spawn failures, timeouts, and cancellation.
  fn run(&self, invocation: &Invocation) -> ShipResult<CommandOutput>;
}

/// Runner backed by `std::process::Command`
pub struct SystemRunner {
  cancel: CancellationToken,
}

impl SystemRunner {
  pub fn new(cancel: CancellationToken) -> Self {
    Self { cancel }
  }
}

impl CommandRunner for SystemRunner {
  fn run(&self, invocation: &Invocation) -> ShipResult<CommandOutput> {
    if self.cancel.is_cancelled() {
      return Err(PipelineError::Cancelled.into());
    }

    let mut cmd = Command::new(&invocation.program);
    cmd
      .args(&invocation.args)
      .stdin(Stdio::null())
      .stdout(Stdio::piped())
      .stderr(Stdio::piped());
    if let Some(dir) = &invocation.cwd {
      cmd.current_dir(dir);
    }
    for (key, value) in &invocation.env {
      cmd.env(key, value);
    }
    #[cfg(unix)]
    {
      use std::os::unix::process::CommandExt;
      cmd.process_group(0);
    }

    debug!(command = %invocation.display(), cwd = ?invocation.cwd, "running");

    let mut child = cmd.spawn().map_err(|e| {
      ShipError::message(format!("Failed to execute {}: {}", invocation.program, e))
    })?;

    // Drain both pipes on their own threads so a chatty child can't block on a full pipe
    let stdout = child.stdout.take().map(spawn_reader);
    let stderr = child.stderr.take().map(spawn_reader);

    let started = Instant::now();
    let status = loop {
      if let Some(status) = child.wait_timeout(POLL_INTERVAL)? {
        break status;
      }

      let abort = if self.cancel.is_cancelled() {
        Some(PipelineError::Cancelled)
      } else {
        invocation
          .timeout
          .filter(|limit| started.elapsed() >= *limit)
          .map(|limit| PipelineError::Timeout {
            command: invocation.display(),
            seconds: whole_seconds(limit),
          })
      };

      if let Some(err) = abort {
        debug!(command = %invocation.display(), "killing process group");
        kill_group(&mut child);
        // Not joined: a descendant that left the group may still hold the pipes
        drop(stdout);
        drop(stderr);
        return Err(err.into());
      }
    };

    let output = CommandOutput {
      code: status.code(),
      stdout: join_reader(stdout),
      stderr: join_reader(stderr),
    };
    debug!(
      command = %invocation.display(),
      code = ?output.code,
      elapsed_ms = started.elapsed().as_millis() as u64,
      "finished"
    );
    Ok(output)
  }
}

/// SIGKILL the child's process group, then reap the child
fn kill_group(child: &mut Child) {
  #[cfg(unix)]
  {
    if let Ok(pid) = libc::pid_t::try_from(child.id()) {
      // SAFETY: kill(2) has no memory-safety preconditions; a negative pid targets the group
      unsafe {
        libc::kill(-pid, libc::SIGKILL);
      }
    }
  }
  let _ = child.kill();
  let _ = child.wait();
}

/// Seconds for error messages, rounded up so sub-second limits never read as 0
fn whole_seconds(limit: Duration) -> u64 {
  limit.as_secs() + u64::from(limit.subsec_nanos() > 0)
}

fn spawn_reader<R: Read + Send + 'static>(mut source: R) -> JoinHandle<Vec<u8>> {
  thread::spawn(move || {
    let mut buf = Vec::new();
    let _ = source.read_to_end(&mut buf);
    buf
  })
}

fn join_reader(handle: Option<JoinHandle<Vec<u8>>>) -> String {
  handle
    .and_then(|h| h.join().ok())
    .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
    .unwrap_or_default()
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_display_quotes_whitespace() {
    let inv = Invocation::new("gh")
      .args(["release", "create", "1.0.0"])
      .arg("--notes")
      .arg("First release");
    assert_eq!(inv.display(), "gh release create 1.0.0 --notes 'First release'");
  }

  #[test]
  fn test_combined_output() {
    let out = CommandOutput {
      code: Some(1),
      stdout: "compiling\n".to_string(),
      stderr: "error: boom\n".to_string(),
    };
    assert_eq!(out.combined(), "compiling\nerror: boom\n");
    assert!(!out.success());
  }

  #[cfg(unix)]
  #[test]
  fn test_system_runner_captures_output_and_code() {
    let runner = SystemRunner::new(CancellationToken::new());
    let out = runner
      .run(&Invocation::new("sh").args(["-c", "echo hello; echo oops >&2; exit 3"]))
      .unwrap();
    assert_eq!(out.code, Some(3));
    assert_eq!(out.stdout, "hello\n");
    assert_eq!(out.stderr, "oops\n");
  }

  #[cfg(unix)]
  #[test]
  fn test_system_runner_respects_cwd() {
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::write(dir.path().join("marker.txt"), "x").unwrap();
    let runner = SystemRunner::new(CancellationToken::new());
    let out = runner
      .run(&Invocation::new("ls").current_dir(dir.path()))
      .unwrap();
    assert!(out.stdout.contains("marker.txt"));
  }

  #[cfg(unix)]
  #[test]
  fn test_system_runner_kills_on_timeout() {
    let runner = SystemRunner::new(CancellationToken::new());
    let started = Instant::now();
    let err = runner
      .run(&Invocation::new("sleep").arg("5").timeout(Duration::from_millis(200)))
      .unwrap_err();
    assert!(matches!(err.as_pipeline(), Some(PipelineError::Timeout { .. })));
    assert!(started.elapsed() < Duration::from_secs(4));
  }

  #[cfg(unix)]
  #[test]
  fn test_timeout_kills_grandchildren_holding_pipes() {
    let runner = SystemRunner::new(CancellationToken::new());
    let started = Instant::now();
    // the shell forks `sleep`, which inherits stdout/stderr
    let err = runner
      .run(&Invocation::new("sh").args(["-c", "sleep 6; true"]).timeout(Duration::from_millis(300)))
      .unwrap_err();
    assert!(matches!(err.as_pipeline(), Some(PipelineError::Timeout { seconds: 1, .. })));
    assert!(started.elapsed() < Duration::from_secs(3), "took {:?}", started.elapsed());
  }

  #[cfg(unix)]
  #[test]
  fn test_cancel_kills_grandchildren_holding_pipes() {
    let token = CancellationToken::new();
    let runner = SystemRunner::new(token.clone());
    let canceller = thread::spawn(move || {
      thread::sleep(Duration::from_millis(300));
      token.cancel();
    });
    let started = Instant::now();
    let err = runner
      .run(&Invocation::new("sh").args(["-c", "sleep 6; true"]))
      .unwrap_err();
    canceller.join().unwrap();
    assert!(matches!(err.as_pipeline(), Some(PipelineError::Cancelled)));
    assert!(started.elapsed() < Duration::from_secs(3), "took {:?}", started.elapsed());
  }

  #[cfg(unix)]
  #[test]
  fn test_env_reaches_child() {
    let runner = SystemRunner::new(CancellationToken::new());
    let out = runner
      .run(&Invocation::new("sh").args(["-c", "echo $TAPSHIP_MARK"]).env("TAPSHIP_MARK", "set"))
      .unwrap();
    assert_eq!(out.stdout, "set\n");
  }

  #[test]
  fn test_whole_seconds_rounds_up() {
    assert_eq!(whole_seconds(Duration::from_millis(300)), 1);
    assert_eq!(whole_seconds(Duration::from_secs(600)), 600);
    assert_eq!(whole_seconds(Duration::from_millis(1500)), 2);
  }

  #[test]
  fn test_system_runner_refuses_when_cancelled() {
    let token = CancellationToken::new();
    token.cancel();
    let runner = SystemRunner::new(token);
    let err = runner.run(&Invocation::new("true")).unwrap_err();
    assert!(matches!(err.as_pipeline(), Some(PipelineError::Cancelled)));
  }

  #[test]
  fn test_spawn_failure_is_error() {
    let runner = SystemRunner::new(CancellationToken::new());
    let err = runner
      .run(&Invocation::new("definitely-not-a-real-tool-4821"))
      .unwrap_err();
    assert!(err.to_string().contains("Failed to execute"));
  }
}
