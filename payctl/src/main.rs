mod cli;

use clap::{Parser, Subcommand};
use paycore::logging::init_logging;

#[derive(Parser, Debug)]
#[command(name = "payctl", version, about = "Operate and exercise the payment routing engine")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate or dump a payments.toml file
    Config {
        #[command(subcommand)]
        cmd: cli::config::ConfigCmd,
    },

    /// Drive simulated transactions through the engine and print the outcome
    Simulate(cli::simulate::SimulateArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Config { cmd } => cli::config::run(cmd),
        Command::Simulate(args) => {
            init_logging();
            cli::simulate::run(args).await
        }
    }
}
