//! paygate-fixtures: CLI entry point.
//!
//! Converts spreadsheet test cases into gateway request fixtures and
//! Postman collections.

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};
use colored::Colorize;

use paygate_fixtures::gateway::Gateway;
use paygate_fixtures::report;
use paygate_fixtures::runner;

#[derive(Parser)]
#[command(name = "paygate-fixtures")]
#[command(about = "Generate gateway test fixtures and Postman collections from Excel test cases")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert workbook rows into JSON fixture files.
    Convert {
        /// Input Excel workbook.
        #[arg(default_value = "TestScript-test.xlsx")]
        excel: PathBuf,

        /// Output base directory (fixtures land under `<base>/json`).
        #[arg(default_value = "output")]
        output: PathBuf,

        /// Target gateway (oneco or zgate).
        #[arg(short, long, value_parser = Gateway::parse, default_value = "zgate")]
        gateway: Gateway,
    },

    /// Assemble Postman collections from previously written fixtures.
    Postman {
        /// Base directory holding `<base>/json` fixtures.
        #[arg(default_value = "output")]
        base: PathBuf,

        /// Gateway the fixtures were generated for (oneco or zgate).
        #[arg(short, long, value_parser = Gateway::parse, default_value = "zgate")]
        request_type: Gateway,

        /// Collection name prefix.
        #[arg(short, long, default_value = "Zgate")]
        name: String,
    },

    /// Write a grouped per-currency test-case report as CSV.
    Report {
        /// Input Excel workbook.
        #[arg(default_value = "TestScript-test.xlsx")]
        excel: PathBuf,

        /// Numeric transaction currency code to report on.
        #[arg(short, long)]
        currency_code: String,

        /// Report output file.
        #[arg(short, long, default_value = "report.csv")]
        output: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let start = Instant::now();

    match cli.command {
        Command::Convert { excel, output, gateway } => {
            println!("{}", "paygate-fixtures convert".bold());
            println!("  Workbook: {}", excel.display());
            println!("  Output: {}", output.join(runner::FIXTURE_DIR).display());
            println!();

            let summary = runner::convert(&excel, &output, gateway)?;

            println!("{}", "═".repeat(60));
            println!(
                "  {} {} fixtures from {} sheets in {:.2}s",
                "✓".green(),
                summary.fixtures.to_string().green(),
                summary.sheets,
                start.elapsed().as_secs_f64()
            );
            println!("{}", "═".repeat(60));
        }
        Command::Postman { base, request_type, name } => {
            println!("{}", "paygate-fixtures postman".bold());
            println!("  Fixtures: {}", base.join(runner::FIXTURE_DIR).display());
            println!("  Collections: {}", base.join(runner::COLLECTION_DIR).display());
            println!();

            let summary = runner::generate_collections(&base, request_type, &name)?;

            println!("{}", "═".repeat(60));
            if summary.skipped == 0 {
                println!(
                    "  {} {} collections from {} fixtures in {:.2}s",
                    "✓".green(),
                    summary.collections.to_string().green(),
                    summary.fixtures,
                    start.elapsed().as_secs_f64()
                );
            } else {
                println!(
                    "  {} {} collections from {} fixtures, {} skipped in {:.2}s",
                    "✗".yellow(),
                    summary.collections,
                    summary.fixtures,
                    summary.skipped.to_string().yellow(),
                    start.elapsed().as_secs_f64()
                );
            }
            println!("{}", "═".repeat(60));
        }
        Command::Report { excel, currency_code, output } => {
            println!("{}", "paygate-fixtures report".bold());
            println!("  Workbook: {}", excel.display());
            println!("  Currency: {currency_code}");
            println!();

            let summary = report::write_report(&excel, &currency_code, &output)?;

            println!("{}", "═".repeat(60));
            println!(
                "  {} {} rows grouped into {} lines at {}",
                "✓".green(),
                summary.rows,
                summary.groups.to_string().green(),
                output.display()
            );
            println!("{}", "═".repeat(60));
        }
    }

    Ok(())
}
