use std::error::Error;

use clap::{Parser, Subcommand};
use flexi_logger::Logger;

mod commands;

use commands::{approx, exact, order, peel};

#[derive(Parser, Debug)]
#[command(name = "dhc-sim", about = "Dynamic hypergraph core maintenance CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Maintain exact core numbers with the fully dynamic XY-prune engine.
    Exact(exact::ExactArgs),
    /// Maintain (1+epsilon)-approximate core numbers via threshold indexing.
    Approx(approx::ApproxArgs),
    /// Maintain exact core numbers over an insertion-only ordinary-graph trace.
    Order(order::OrderArgs),
    /// Replay a trace and run the static peeling decomposition once.
    Peel(peel::PeelArgs),
}

fn main() -> Result<(), Box<dyn Error>> {
    let _logger = Logger::try_with_env_or_str("info")?.start()?;
    let cli = Cli::parse();
    match cli.command {
        Command::Exact(args) => exact::run(args),
        Command::Approx(args) => approx::run(args),
        Command::Order(args) => order::run(args),
        Command::Peel(args) => peel::run(args),
    }
}
