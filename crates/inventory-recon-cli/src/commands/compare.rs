//! Compare command - reconcile two exports and write the reports.

use std::path::PathBuf;

use colored::Colorize;
use inventory_recon::{InventoryRecon, ReconConfig, ReconError, ReconResponse};

pub fn run(
    reference: PathBuf,
    target: PathBuf,
    output_dir: PathBuf,
    header_rows: (usize, usize),
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    for file in [&reference, &target] {
        if !file.exists() {
            return Err(format!("File not found: {}", file.display()).into());
        }
    }

    let config = ReconConfig::new()
        .with_output_dir(output_dir)
        .with_header_rows(header_rows.0, header_rows.1);
    let recon = InventoryRecon::with_config(config);

    if json {
        let response = recon.run_files(&reference, &target);
        println!("{}", serde_json::to_string_pretty(&response)?);
        return match response {
            ReconResponse::Success(_) => Ok(()),
            ReconResponse::Failure(failure) => Err(failure.error.into()),
        };
    }

    println!(
        "{} {} {} {}",
        "Comparing".cyan().bold(),
        reference.display().to_string().white(),
        "against".cyan(),
        target.display().to_string().white()
    );

    let report = match recon.try_run_files(&reference, &target) {
        Ok(report) => report,
        Err(e) => {
            if let ReconError::MissingColumns {
                reference_columns,
                target_columns,
                ..
            } = &e
            {
                println!();
                println!("{}", "Available columns:".yellow().bold());
                println!("  Modon:   {}", reference_columns.join(", "));
                println!("  Sakneen: {}", target_columns.join(", "));
            }
            return Err(e.into());
        }
    };

    let stats = &report.stats;
    println!();
    println!(
        "Indexed {} units from {} rows, checked {} target rows ({} matched)",
        stats.indexed_units.to_string().white().bold(),
        stats.reference_rows,
        stats.target_rows.to_string().white().bold(),
        stats.matched_rows
    );

    println!();
    if report.discrepancies.is_empty() {
        println!("{}", "No discrepancies found".green().bold());
    } else {
        println!(
            "{} {}",
            report.discrepancies.len().to_string().red().bold(),
            "discrepancies found:".red()
        );
        for discrepancy in &report.discrepancies {
            println!(
                "  {:16} {}",
                discrepancy.unit_id.white().bold(),
                discrepancy.target_status.yellow()
            );
        }
    }

    let artifacts = &report.artifacts;
    println!();
    println!("{}", "Wrote:".green().bold());
    println!("  {}", artifacts.annotated.display());
    for path in artifacts.exports.iter() {
        println!("  {}", path.display());
    }

    Ok(())
}
