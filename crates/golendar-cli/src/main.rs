use clap::{Parser, Subcommand};
use golendar_core::storage::data_dir;
use golendar_core::Config;

mod commands;
mod logging;
mod shell;

#[derive(Parser)]
#[command(name = "golendar-cli", version, about = "Golendar event tracker")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive session (default)
    Run,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let dir = data_dir()?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            logging::init(&config.log, &dir);
            commands::session::run(&config, &dir).await
        }
        Commands::Config { action } => commands::config::run(action, config),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
