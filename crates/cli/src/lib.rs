pub mod commands;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

use printshop_core::config::{AppConfig, LoadOptions, LogFormat};

#[derive(Debug, Parser)]
#[command(
    name = "printshop",
    about = "Print shop operator CLI",
    long_about = "Operate the print shop database: migrations, demo fixtures, quote repricing, and job completion.",
    after_help = "Examples:\n  printshop migrate\n  printshop seed\n  printshop quote-recalc 1\n  printshop job-complete 1 --produced 2 --time-min 60 --energy-kwh 0.2"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Load and verify the deterministic demo dataset")]
    Seed,
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Reprice a quote version from its lines and current filament costs")]
    QuoteRecalc {
        #[arg(help = "Quote version id to reprice")]
        version_id: i64,
    },
    #[command(about = "Mark a job completed, recost it, and materialize its ledger entries")]
    JobComplete {
        #[arg(help = "Job id to complete")]
        job_id: i64,
        #[arg(long, help = "Units actually produced")]
        produced: Option<u32>,
        #[arg(long, help = "Actual print time per unit, in minutes")]
        time_min: Option<i64>,
        #[arg(long, help = "Measured energy per unit, in kWh")]
        energy_kwh: Option<Decimal>,
        #[arg(long, help = "Scrapped material, in grams")]
        scrap_g: Option<i64>,
        #[arg(long, help = "Free-form completion note")]
        note: Option<String>,
    },
}

/// Logs go to stderr so command output on stdout stays machine-readable.
fn init_logging() {
    use tracing::Level;

    let (level, format) = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => (config.logging.level, config.logging.format),
        Err(_) => ("info".to_string(), LogFormat::Compact),
    };
    let log_level = level.parse::<Level>().unwrap_or(Level::INFO);

    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Json => builder.json().init(),
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::QuoteRecalc { version_id } => commands::quote::recalc(version_id),
        Command::JobComplete { job_id, produced, time_min, energy_kwh, scrap_g, note } => {
            commands::job::complete(commands::job::CompleteArgs {
                job_id,
                produced,
                time_min,
                energy_kwh,
                scrap_g,
                note,
            })
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
