use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;

use commands::{AuthCommand, ConfigCommand, ExercisesCommand, SetsCommand};
use config::Config;

#[derive(Parser)]
#[command(name = "setlog")]
#[command(version)]
#[command(about = "Log and browse exercise sets", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in, log out, or check the session
    Auth(AuthCommand),

    /// List, add, delete and browse sets
    Sets(SetsCommand),

    /// Manage exercises
    Exercises(ExercisesCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.clone())?;

    match cli.command {
        Some(Commands::Auth(cmd)) => cmd.run(&config).await?,
        Some(Commands::Sets(cmd)) => cmd.run(&config).await?,
        Some(Commands::Exercises(cmd)) => cmd.run(&config).await?,
        Some(Commands::Config(cmd)) => cmd.run(&config, cli.config.as_deref())?,
        None => {
            println!("Use --help to see available commands");
        }
    }

    Ok(())
}
