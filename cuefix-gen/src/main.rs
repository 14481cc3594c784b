//! cuefix-gen - cue-point fixture generator
//!
//! Reads a cue-point CSV, resolves each row's category through the path,
//! data and category tables, and writes a category-movement fixture
//! document ready for bulk loading.
//!
//! Exit codes: 0 on success, 1 on any fatal error (bad config, unreadable or
//! malformed tables, I/O, failed lookup).

use anyhow::Result;
use clap::Parser;
use cuefix_gen::{init_tracing, run_generate, run_lookup, Args, Command};
use tracing::info;

fn main() -> Result<()> {
    let args = Args::parse();

    // Config is resolved first because it supplies the log level
    let config = args.load_config()?;
    init_tracing(&config.log_level);

    info!(
        "Starting cuefix-gen v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    match &args.command {
        Command::Generate(generate) => {
            run_generate(&config, generate.print)?;
        }
        Command::Lookup(lookup) => {
            let rendered = run_lookup(&config.tables, &lookup.filename, lookup.secondary.as_deref())?;
            println!("{}", rendered);
        }
    }

    Ok(())
}
