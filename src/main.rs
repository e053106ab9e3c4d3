mod inspect;
mod run;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Headless stable fluids solver.
#[derive(Parser)]
#[command(name = "eddy")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "2D stable fluids simulation", long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value_t = Level::INFO)]
    log_level: Level,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulation, optionally recording every frame
    Run(run::RunArgs),
    /// Summarize a recording made by `run`
    Inspect(inspect::InspectArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing::subscriber::set_global_default(
        FmtSubscriber::builder()
            .with_max_level(cli.log_level)
            .with_writer(std::io::stderr)
            .finish(),
    )?;

    match cli.command {
        Commands::Run(args) => run::execute(args),
        Commands::Inspect(args) => inspect::execute(args),
    }
}
