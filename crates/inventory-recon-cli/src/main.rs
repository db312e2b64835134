//! inventory-recon CLI - flag units marketed as available despite an EOI.

mod cli;
mod commands;
mod server;
mod web;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Compare {
            reference,
            target,
            output_dir,
            reference_header_row,
            target_header_row,
            json,
        } => commands::compare::run(
            reference,
            target,
            output_dir,
            (reference_header_row, target_header_row),
            json,
        ),

        Commands::Inspect {
            file,
            header_row,
            role,
        } => commands::inspect::run(file, header_row, role, cli.verbose),

        Commands::Serve {
            port,
            dir,
            max_upload_mb,
            open,
        } => commands::serve::run(port, dir, max_upload_mb, open, cli.verbose),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// `RUST_LOG` wins; otherwise info, or debug with `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose {
        "inventory_recon=debug,tower_http=debug"
    } else {
        "inventory_recon=info"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
