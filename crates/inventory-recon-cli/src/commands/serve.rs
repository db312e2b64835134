//! Serve command - run the upload web server.

use std::path::PathBuf;

use colored::Colorize;

use crate::server::{app, state::AppState};

pub fn run(
    port: u16,
    dir: PathBuf,
    max_upload_mb: usize,
    open_browser: bool,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(&dir)?;

    let state = AppState::new(dir.clone(), max_upload_mb * 1024 * 1024);

    let url = format!("http://localhost:{}", port);
    println!();
    println!(
        "{} {}",
        "Starting upload server at".cyan().bold(),
        url.white().bold()
    );
    println!();
    println!("  Output: {}", dir.display());
    if verbose {
        println!("  Upload limit: {} MiB", max_upload_mb);
    }
    println!();
    println!("Press {} to stop the server", "Ctrl+C".yellow().bold());
    println!();

    if open_browser {
        if let Err(e) = open::that(&url) {
            eprintln!("{} Could not open browser: {}", "Warning:".yellow(), e);
        }
    }

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(app::run_server(state, port))
}
