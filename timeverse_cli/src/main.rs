//! Timeverse CLI
//!
//! Query temporal universes from the command line.

use clap::Parser;
use timeverse_cli::{execute, Args, CliError};
use tracing::{debug, error, info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn run(args: &Args) -> Result<(), CliError> {
    let loaded = args.setup().load()?;
    debug!(
        "Registry ready: {} entries ({} from store)",
        loaded.registry.len(),
        loaded.hydrated
    );

    let output = execute(&args.command, &loaded.registry, &loaded.report)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&output.json)?);
    } else {
        for line in &output.lines {
            println!("{}", line);
        }
    }
    Ok(())
}

fn main() {
    let args = Args::parse();

    // Initialize logging; RUST_LOG overrides the flag
    let level = if args.verbose {
        Level::DEBUG
    } else if args.json {
        Level::WARN
    } else {
        Level::INFO
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    if !args.json {
        info!("Timeverse v{}", env!("CARGO_PKG_VERSION"));
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    }

    if let Err(e) = run(&args) {
        error!("✗ {}", e);
        std::process::exit(1);
    }
}
