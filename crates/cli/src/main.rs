mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use devmatrix_lib::consts::{LOG_ENV, PROJECT_FILENAME};

use crate::output::OutputFormat;

/// devmatrix - compose development environments across a platform matrix
#[derive(Parser)]
#[command(name = "devmatrix")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Project file, or a directory containing devmatrix.json
  #[arg(long, global = true, default_value = PROJECT_FILENAME)]
  project: PathBuf,

  /// Extra fragment files or directories, applied after the project's own
  #[arg(short, long = "fragment", global = true, value_name = "PATH")]
  fragments: Vec<PathBuf>,

  /// Output format
  #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
  output: OutputFormat,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Evaluate the project for every platform and report each outcome
  Eval {
    /// Platform to evaluate (repeatable; overrides DEVMATRIX_PLATFORMS and the project file)
    #[arg(short, long = "platform", value_name = "PLATFORM")]
    platforms: Vec<String>,

    /// Write descriptor.json and config.json per successful platform
    #[arg(long)]
    out_dir: Option<PathBuf>,
  },

  /// Show the resolved configuration for one platform
  Show {
    /// Platform identifier, e.g. x86_64-linux
    platform: String,

    /// Option path to show (default: the whole configuration)
    path: Option<String>,
  },

  /// Show version and platform information
  Info,
}

fn main() -> Result<ExitCode> {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  match cli.command {
    Commands::Eval { platforms, out_dir } => cmd::cmd_eval(
      &cli.project,
      &platforms,
      &cli.fragments,
      out_dir.as_deref(),
      cli.verbose,
      cli.output,
    ),
    Commands::Show { platform, path } => {
      cmd::cmd_show(
        &cli.project,
        &platform,
        path.as_deref(),
        &cli.fragments,
        cli.verbose,
        cli.output,
      )?;
      Ok(ExitCode::SUCCESS)
    }
    Commands::Info => {
      cmd::cmd_info(cli.output)?;
      Ok(ExitCode::SUCCESS)
    }
  }
}

/// Logs go to stderr. `DEVMATRIX_LOG` takes filter directives; without it
/// only warnings are shown, or debug output with `--verbose`.
fn init_tracing(verbose: bool) {
  let default_level = if verbose { "debug" } else { "warn" };
  let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();
}
