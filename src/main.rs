use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use vint::integrity::{IntegrityOptions, SourceKind};
use vint::runtime::RealRuntime;

/// vint - Vendor Integrity checker
///
/// Fingerprints installed Composer packages and compares them against a
/// trusted reference via a remote verification service. Reports one verdict
/// per package: match, mismatch, or unknown.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Project root directory (defaults to the current directory)
    #[arg(
        long = "root",
        short = 'r',
        env = "VINT_ROOT",
        value_name = "PATH",
        global = true
    )]
    root: Option<PathBuf>,

    /// Verification service URL (defaults to the public endpoint)
    #[arg(long = "api-url", value_name = "URL", global = true)]
    api_url: Option<String>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Check the integrity of installed packages
    Integrity(IntegrityArgs),
}

#[derive(clap::Args, Debug)]
struct IntegrityArgs {
    /// Emit machine-readable JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Omit packages whose verdict is a match
    #[arg(long = "skip-match")]
    skip_match: bool,

    /// How to resolve the installed package set
    #[arg(long, value_enum, default_value = "installed")]
    source: SourceKind,

    /// Request timeout for the verification service, in seconds
    #[arg(long, value_name = "SECS", default_value_t = 30)]
    timeout: u64,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let runtime = RealRuntime;

    match cli.command {
        Commands::Integrity(args) => {
            let options = IntegrityOptions {
                source: args.source,
                root: cli.root,
                api_url: cli.api_url,
                timeout_secs: args.timeout,
                json: args.json,
                skip_match: args.skip_match,
            };
            let outcome =
                vint::integrity::run(&runtime, &options, &mut std::io::stdout()).await?;

            if outcome.is_failure() {
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
