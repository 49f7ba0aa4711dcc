use std::{io::Write, process::ExitCode};

use clap::Parser;
use dataviz_finder::cli::{Cli, Command};
use dataviz_finder::{CatalogConfig, Finder, error, format};
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if let Ok(env) = std::env::var("DATAVIZ_FINDER_LOG") {
        EnvFilter::new(env)
    } else if quiet {
        EnvFilter::new("warn")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> error::Result<()> {
    if let Command::Completions(args) = &cli.command {
        args.generate();
        return Ok(());
    }

    let config =
        CatalogConfig::resolve(cli.config.as_deref(), cli.root.as_deref())?;
    let finder = Finder::initialize(&config)?;

    let output = match cli.command {
        Command::List(args) => {
            let summaries = finder.list_all();
            if args.json {
                format::summaries_json(&summaries)?
            } else {
                format::summaries_human(&summaries)
            }
        }
        Command::Search(args) => {
            let query = args.query();
            let outcome = finder.search_by_tags(&query);
            if args.json {
                format::search_json(&query, &outcome)?
            } else {
                format::search_human(&outcome)
            }
        }
        Command::Show(args) => {
            let view = finder.get_metadata(args.index)?;
            if args.json {
                format::metadata_json(&view)?
            } else {
                format::metadata_human(&view)
            }
        }
        Command::Code(args) => finder.get_source(args.index)?.to_string(),
        Command::Completions(_) => return Ok(()),
    };

    // Written as-is: `code` output must stay byte-identical to the file.
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(output.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
