//! Inspect command - show discovered columns and role matches.

use std::path::PathBuf;

use colored::Colorize;
use inventory_recon::schema::resolve_roles;
use inventory_recon::{ColumnRole, SourceConfig, TableLoader, TableSide};

use crate::cli::RoleChoice;

pub fn run(
    file: PathBuf,
    header_row: Option<usize>,
    role: RoleChoice,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    let side = TableSide::from(role);
    let source = match side {
        TableSide::Reference => SourceConfig::reference(),
        TableSide::Target => SourceConfig::target(),
    };
    let mut loader_config = source.loader(true);
    if let Some(row) = header_row {
        loader_config.header_row = row;
    }

    let (table, metadata) = TableLoader::with_config(loader_config.clone()).load_file(&file)?;

    println!(
        "{} {} as {}",
        "Inspecting".cyan().bold(),
        file.display().to_string().white(),
        source.label.white().bold()
    );
    println!(
        "  {} rows, {} columns, header row {}, format {}",
        metadata.row_count, metadata.column_count, loader_config.header_row, metadata.format
    );
    if verbose {
        println!("  {}", metadata.hash.dimmed());
    }

    println!();
    println!("{}", "Columns:".yellow().bold());
    for (idx, name) in table.columns.iter().enumerate() {
        println!("  {:>3}  {}", idx, name);
    }

    println!();
    println!("{}", "Roles:".yellow().bold());
    let mut missing = 0;
    for (column_role, resolved) in resolve_roles(&table, ColumnRole::for_side(side)) {
        match resolved {
            Some(column) => println!(
                "  {:12} {} {}",
                column_role.to_string(),
                "->".dimmed(),
                column.name.green()
            ),
            None => {
                missing += 1;
                println!("  {:12} {}", column_role.to_string(), "not found".red());
            }
        }
    }

    if missing > 0 {
        println!();
        println!(
            "{} header row may be wrong; try {}",
            "Note:".yellow(),
            "--header-row".white().bold()
        );
    }

    Ok(())
}
