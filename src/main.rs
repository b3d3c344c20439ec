//! Command-line entry point for the xtract binary.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use xtract::error::{ExtractError, UserInputError};

fn main() {
    let cli = xtract::cli::Cli::parse();

    if let Err(err) = init_tracing(cli.quiet, cli.verbose) {
        eprintln!("xtract: {err:#}");
    }

    match xtract::run(cli) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            let mut exit_code = 1;
            for cause in err.chain() {
                if let Some(extract_err) = cause.downcast_ref::<ExtractError>() {
                    exit_code = extract_err.exit_code();
                    break;
                }
                if cause.is::<UserInputError>() {
                    exit_code = 2;
                    break;
                }
            }
            eprintln!("xtract: {err:#}");
            std::process::exit(exit_code);
        }
    }
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = EnvFilter::try_from_env("XTRACT_LOG").unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
