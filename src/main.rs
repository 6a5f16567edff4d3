//! FHIR Search Completion Tool
//!
//! Context-aware completion for FHIR search queries, as one-shot commands
//! or an interactive console.
//!
//! # Usage
//!
//! ```bash
//! # One-shot suggestions
//! fhirsearch suggest "Patient?_c"
//!
//! # Interactive console with server metadata
//! fhirsearch --capability capability.json
//! ```

use std::sync::Arc;
use tracing::Level;

use fhirsearch::cli::CliInterface;
use fhirsearch::error::Result;
use fhirsearch::repl::Console;

/// Application entry point
fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Main application logic
///
/// 1. Parse command-line arguments
/// 2. Load configuration
/// 3. Initialize logging
/// 4. Handle subcommands or start the interactive console
fn run() -> Result<()> {
    let cli = CliInterface::new()?;

    initialize_logging(&cli);

    // One-shot subcommands (classify, suggest, apply, ...)
    if cli.handle_subcommand()? {
        return Ok(());
    }

    run_interactive_mode(&cli)
}

/// Run the interactive console
fn run_interactive_mode(cli: &CliInterface) -> Result<()> {
    let store = Arc::new(cli.build_store()?);

    if !cli.args().quiet {
        println!("fhirsearch {}", fhirsearch::version());
        if let Some(snapshot) = store.snapshot() {
            println!("Capability metadata: {} resource type(s)", snapshot.resource_count());
        } else {
            println!("No capability metadata loaded (use 'load <file>' in the console).");
        }
    }

    let mut console = Console::new(cli.config(), store)?;
    console.run()?;

    println!("Goodbye!");
    Ok(())
}

/// Initialize logging system based on verbosity level
fn initialize_logging(cli: &CliInterface) {
    let level = if cli.args().very_verbose {
        Level::TRACE
    } else if cli.args().verbose {
        Level::DEBUG
    } else {
        cli.config().logging.level.to_tracing_level()
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr);

    if cli.config().logging.timestamps {
        subscriber.init();
    } else {
        subscriber.without_time().init();
    }
}
