//! intent-cascade CLI binary.

use std::process;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use intent_cascade::cli::args::CascadeArgs;
use intent_cascade::cli::commands::execute_command;

fn main() {
    let args = CascadeArgs::parse();
    init_tracing(args.verbosity());

    if let Err(e) = run(args) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(args: CascadeArgs) -> anyhow::Result<()> {
    let name = args.command.name();
    execute_command(args).with_context(|| format!("{name} failed"))
}

/// Log to stderr. `RUST_LOG` wins over `-v`/`-q`.
fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "error",
        1 => "warn",
        2 => "info",
        _ => "debug",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}
