mod checks;
mod commands;
mod core;
mod release;

use clap::{Args, Parser, Subcommand};
use crate::core::cancel::CancellationToken;
use crate::core::error::{ShipError, print_error};
use crate::core::vcs::RepoVisibility;
use crate::release::arch::BuildType;
use crate::release::version::VersionComponent;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Build a Swift package, publish it as a GitHub release, and update a Homebrew tap
#[derive(Parser)]
#[command(name = "tapship")]
#[command(version, about, long_about = None)]
#[command(styles = get_styles())]
struct Cli {
  /// Log every external command (same as RUST_LOG=tapship=debug)
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Build, archive, upload, and write the formula
  Publish(PublishCli),

  /// Resolve the next release version and print it
  Version {
    /// Use this exact version (X.Y.Z or vX.Y.Z)
    #[arg(long, conflicts_with = "bump", required_unless_present = "bump")]
    exact: Option<String>,
    /// Bump the previous version: major, minor, or patch
    #[arg(long)]
    bump: Option<VersionComponent>,
    /// Previous version (default: highest release tag in PATH)
    #[arg(long, requires = "bump")]
    from: Option<String>,
    /// Project directory (default: current directory)
    path: Option<PathBuf>,
  },

  /// Render a formula to stdout from explicit asset URLs and hashes
  Formula(FormulaCli),

  /// Write a starter tapship.toml
  Init {
    /// Project directory (default: current directory)
    path: Option<PathBuf>,
    /// Formula name (default: directory name)
    #[arg(long)]
    name: Option<String>,
    /// Tap checkout, relative to the project or absolute
    #[arg(long)]
    tap: Option<PathBuf>,
    /// Overwrite an existing configuration without asking
    #[arg(short, long)]
    force: bool,
    /// Also create the tap checkout and its GitHub repository if missing
    #[arg(long)]
    create_tap: bool,
    /// Create the tap repository as private
    #[arg(long, requires = "create_tap")]
    private: bool,
  },

  /// Run health checks and diagnostics
  Doctor {
    /// Project directory (default: current directory)
    path: Option<PathBuf>,
    /// Run thorough checks (includes gh authentication)
    #[arg(long)]
    thorough: bool,
    /// Output results in JSON format
    #[arg(long)]
    json: bool,
  },
}

#[derive(Args)]
struct PublishCli {
  /// Project directory (default: current directory)
  path: Option<PathBuf>,
  /// Release this exact version
  #[arg(long, conflicts_with = "bump")]
  version: Option<String>,
  /// Bump the latest release tag: major, minor, or patch
  #[arg(long)]
  bump: Option<VersionComponent>,
  /// Executable product name (default: from tapship.toml or directory name)
  #[arg(long)]
  product: Option<String>,
  /// universal, arm64, or x86_64
  #[arg(long)]
  build_type: Option<BuildType>,
  /// Skip `swift package clean`
  #[arg(long)]
  skip_clean: bool,
  /// Run tests after building; optional custom command replaces `swift test`
  #[arg(long, num_args = 0..=1, value_name = "CMD")]
  test: Option<Option<String>>,
  /// Release notes text
  #[arg(long, conflicts_with = "notes_file")]
  notes: Option<String>,
  /// Release notes file
  #[arg(long)]
  notes_file: Option<PathBuf>,
  /// Commit and push the tap with this message ({version} is substituted)
  #[arg(long)]
  commit_message: Option<String>,
  /// Don't prompt; commit the tap with the default message
  #[arg(short, long)]
  yes: bool,
  /// Resolve the version and show planned assets without building
  #[arg(long)]
  dry_run: bool,
  /// Output the publish report in JSON format
  #[arg(long)]
  json: bool,
}

#[derive(Args)]
struct FormulaCli {
  /// Formula name
  #[arg(long)]
  name: String,
  /// Release version
  #[arg(long)]
  version: String,
  /// Executable inside the archive (default: formula name)
  #[arg(long)]
  binary: Option<String>,
  #[arg(long, default_value = "")]
  description: String,
  #[arg(long, default_value = "")]
  homepage: String,
  #[arg(long, default_value = "")]
  license: String,
  /// Single architecture-independent archive URL
  #[arg(long, requires = "sha256", conflicts_with_all = ["arm_url", "intel_url"])]
  url: Option<String>,
  #[arg(long)]
  sha256: Option<String>,
  #[arg(long)]
  arm_url: Option<String>,
  #[arg(long)]
  arm_sha256: Option<String>,
  #[arg(long)]
  intel_url: Option<String>,
  #[arg(long)]
  intel_sha256: Option<String>,
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

fn init_logging(verbose: bool) {
  let filter = if verbose {
    EnvFilter::new("tapship=debug")
  } else {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tapship=info"))
  };
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_target(false)
    .without_time()
    .with_writer(std::io::stderr)
    .init();
}

fn main() {
  let cli = Cli::parse();
  init_logging(cli.verbose);

  let cancel = CancellationToken::new();
  if let Err(err) = cancel.install_signal_handler() {
    handle_error(err);
  }

  let result = match cli.command {
    Commands::Publish(p) => commands::run_publish(
      commands::PublishArgs {
        path: p.path,
        version: p.version,
        bump: p.bump,
        product: p.product,
        build_type: p.build_type,
        skip_clean: p.skip_clean,
        test: p.test,
        notes: p.notes,
        notes_file: p.notes_file,
        commit_message: p.commit_message,
        yes: p.yes,
        dry_run: p.dry_run,
        json: p.json,
      },
      cancel,
    ),
    Commands::Version {
      exact,
      bump,
      from,
      path,
    } => commands::run_version(exact, bump, from, path.as_deref()),
    Commands::Formula(f) => commands::run_formula(commands::FormulaArgs {
      name: f.name,
      binary: f.binary,
      version: f.version,
      description: f.description,
      homepage: f.homepage,
      license: f.license,
      url: f.url,
      sha256: f.sha256,
      arm_url: f.arm_url,
      arm_sha256: f.arm_sha256,
      intel_url: f.intel_url,
      intel_sha256: f.intel_sha256,
    }),
    Commands::Init {
      path,
      name,
      tap,
      force,
      create_tap,
      private,
    } => {
      let visibility = match (create_tap, private) {
        (false, _) => None,
        (true, true) => Some(RepoVisibility::Private),
        (true, false) => Some(RepoVisibility::Public),
      };
      commands::run_init(path.as_deref(), name, tap, force, visibility)
    }
    Commands::Doctor { path, thorough, json } => commands::run_doctor(path.as_deref(), thorough, json),
  };

  if let Err(err) = result {
    handle_error(err);
  }
}

fn handle_error(err: ShipError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
