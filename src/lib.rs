//! xtract library entry points.

pub mod cli;
pub mod dispatch;
pub mod error;
pub mod format;
pub mod tool;

use anyhow::{Context, Result};

use crate::cli::{ClassifyArgs, Cli, Commands, ExtractArgs, ToolArgs};
use crate::dispatch::{classify, dispatch_table, extract, DispatchOptions};
use crate::tool::{config, parse_override, ToolOverrides};

/// Execute the command represented by the parsed CLI input and return the
/// process exit code.
pub fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Extract(args) => handle_extract(args, cli.quiet),
        Commands::Classify(args) => handle_classify(args, cli.quiet),
        Commands::Formats(args) => handle_formats(args),
    }
}

fn handle_extract(args: ExtractArgs, quiet: bool) -> Result<i32> {
    let options = DispatchOptions {
        overrides: resolve_overrides(&args.tools)?,
        verify_contents: args.verify,
        directory: args.directory,
        dry_run: args.dry_run,
    };
    let dispatched = extract(&args.path, &options)?;
    match dispatched.status {
        Some(status) => Ok(status.exit_code()),
        None => {
            if !quiet {
                match &dispatched.invocation.current_dir {
                    Some(dir) => println!("(cd {dir} && {})", dispatched.invocation),
                    None => println!("{}", dispatched.invocation),
                }
            }
            Ok(0)
        }
    }
}

fn handle_classify(args: ClassifyArgs, quiet: bool) -> Result<i32> {
    let overrides = resolve_overrides(&args.tools)?;
    let results: Vec<_> = args
        .paths
        .iter()
        .map(|path| classify(path, &overrides))
        .collect();

    if args.json && !quiet {
        serde_json::to_writer_pretty(std::io::stdout(), &results)
            .context("failed to render classification")?;
        println!();
    } else if !quiet {
        for result in &results {
            match (&result.format, &result.command) {
                (Some(format), Some(command)) => {
                    println!("{}\t{format}\t{command}", result.path)
                }
                _ => println!("{}\tunknown\t-", result.path),
            }
        }
    }

    let all_known = results.iter().all(|result| result.format.is_some());
    Ok(if all_known { 0 } else { 2 })
}

fn handle_formats(args: ToolArgs) -> Result<i32> {
    let overrides = resolve_overrides(&args)?;
    for (format, invocation) in dispatch_table(&overrides) {
        println!("{}\t{invocation}", format.suffix());
    }
    Ok(0)
}

/// Config file first, then `--tool` flags on top.
fn resolve_overrides(args: &ToolArgs) -> Result<ToolOverrides> {
    let mut overrides = match &args.config {
        Some(path) => config::load_overrides(path)?,
        None => ToolOverrides::new(),
    };
    let mut flags = ToolOverrides::new();
    for spec in &args.tool {
        let (tool, program) = parse_override(spec)?;
        flags.set(tool, program);
    }
    overrides.merge(flags);
    for (tool, program) in overrides.iter() {
        tracing::debug!(%tool, program, "tool override active");
    }
    Ok(overrides)
}
