use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod config;
mod locations_cmd;
mod overview;
mod render;
mod session;
mod state;
mod store;
mod tasks_cmd;

use locations_cmd::LocationCommand;
use session::Session;
use tasks_cmd::TaskCommand;

#[derive(Parser, Debug)]
#[command(
    name = "alltag",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("ALLTAG_BUILD_SHA"), ")"),
    about = "Personal task tracker that tells you what to do next, wherever you are"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the next mental and physical task for every location (default)
    Next,

    /// Manage tasks
    Task {
        #[command(subcommand)]
        command: TaskCommand,
    },

    /// Manage locations
    Location {
        #[command(subcommand)]
        command: LocationCommand,
    },

    /// Configuration file helpers
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write ~/.alltag/config.toml with defaults
    Init,

    /// Print the effective configuration
    Show,
}

fn init_tracing() {
    // ALLTAG_LOG beats RUST_LOG; ALLTAG_DEBUG=true lowers the default to debug
    let debug = std::env::var("ALLTAG_DEBUG")
        .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
        .unwrap_or(false);
    let default = if debug { "alltag=debug,alltag_core=debug" } else { "alltag=warn" };
    let filter = EnvFilter::try_from_env("ALLTAG_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    // only commands that touch tasks need a user, zone and store
    let session = || -> Result<Session> { Session::open(&config::load_config()?) };

    match cli.command.unwrap_or(Command::Next) {
        Command::Next => overview::run(&session()?)?,
        Command::Task { command } => tasks_cmd::run(command, &session()?)?,
        Command::Location { command } => locations_cmd::run(command, &session()?)?,
        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => config::show_config()?,
        },
    }

    Ok(())
}
