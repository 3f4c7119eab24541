use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cmd;

#[derive(Parser, Debug)]
#[command(
    name = "hicbc",
    version,
    about = "Work out the Child Benefit you've received and your High Income Child Benefit tax charge"
)]
struct Cli {
    /// JSON table of tax years to use instead of the built-in rates
    #[arg(long, global = true)]
    tax_years: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Calculate Child Benefit received and the tax charge for a tax year
    Calculate(cmd::calculate::CalculateCommand),
    /// List the configured tax years
    Years(cmd::years::YearsCommand),
    /// Print expected input formats
    Schema(cmd::schema::SchemaCommand),
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let cli = Cli::parse();
    let registry = cmd::load_registry(cli.tax_years.as_deref())?;

    match cli.command {
        Command::Calculate(command) => command.exec(&registry),
        Command::Years(command) => command.exec(&registry),
        Command::Schema(command) => command.exec(),
    }
}
