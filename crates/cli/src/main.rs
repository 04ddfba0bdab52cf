// olrecon - headless driver for one-line allocation jobs

mod alloc;
mod exit_codes;
mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use exit_codes::{EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "olrecon")]
#[command(about = "Reconcile imported generation/load equipment against a one-line diagram")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Log engine progress to stderr (RUST_LOG overrides)
    #[arg(long, short = 'v', global = true, env = "OLRECON_VERBOSE")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the allocation field layout for a job as JSON
    #[command(after_help = "\
Examples:
  olrecon fields plant.alloc.toml
  olrecon fields plant.alloc.toml | jq '.fields[] | select(.state == \"editable\")'")]
    Fields {
        /// Path to the .alloc.toml job file
        job: PathBuf,
    },

    /// Validate a job's allocation table and report the verdict
    #[command(after_help = "\
Examples:
  olrecon validate plant.alloc.toml
  olrecon validate plant.alloc.toml --json
  olrecon validate plant.alloc.toml --output report.json")]
    Validate {
        /// Path to the .alloc.toml job file
        job: PathBuf,

        /// Output the JSON report to stdout
        #[arg(long)]
        json: bool,

        /// Write the JSON report to file
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Build the profile payload for a job that validates
    #[command(after_help = "\
Examples:
  olrecon payload plant.alloc.toml
  olrecon payload plant.alloc.toml --output profile.json
  olrecon payload plant.alloc.toml --name \"Winter base\"")]
    Payload {
        /// Path to the .alloc.toml job file
        job: PathBuf,

        /// Write the payload to file (default: [output].payload, else stdout)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Override the profile name from the job file
        #[arg(long)]
        name: Option<String>,
    },

    /// Check a job file (TOML, profile name, schedule) without reading exports
    #[command(after_help = "\
Examples:
  olrecon check-config plant.alloc.toml")]
    CheckConfig {
        /// Path to the .alloc.toml job file
        job: PathBuf,
    },
}

fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nengine:  oneline-recon ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   debug",
            "\ntarget:  ", env!("TARGET"),
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nengine:  oneline-recon ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   release",
            "\ntarget:  ", env!("TARGET"),
        )
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            // --help / --version print through the same path
            return ExitCode::from(if e.use_stderr() { EXIT_USAGE } else { EXIT_SUCCESS });
        }
    };
    logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Fields { job } => alloc::cmd_fields(job),
        Commands::Validate { job, json, output } => alloc::cmd_validate(job, json, output),
        Commands::Payload { job, output, name } => alloc::cmd_payload(job, output, name),
        Commands::CheckConfig { job } => alloc::cmd_check_config(job),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
