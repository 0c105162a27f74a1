use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tomato_tray::client::app::{Command as ClientCommand, QueryArguments};
use tracing::Level;

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Arguments {
    /// Path to a custom configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Path to the daemon's UNIX socket
    #[arg(short, long)]
    pub socket: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch and initialize a daemon process
    Init {
        /// Path to the daemon executable
        #[arg(short, long)]
        executable: Option<PathBuf>,
        /// Maximum logging level the subscriber should use
        #[arg(short, long, default_value_t = Level::INFO)]
        verbosity: Level,
    },
    /// Start a pomodoro unless a phase is already running
    Pomodoro,
    /// Start a break, replacing a running pomodoro
    Break,
    /// Stop the running phase
    Stop,
    /// Query the timer's status. Show all information if no flag is specified.
    Query {
        /// Show the timer's state
        #[arg(short, long)]
        state: bool,
        /// Show the total duration of the running phase
        #[arg(short, long)]
        total: bool,
        /// Show the remaining duration of the running phase
        #[arg(short, long)]
        remaining: bool,
    },
    /// Print the title currently shown
    Title,
    /// Stop the timer and quit the daemon
    Quit,
}

impl From<Command> for ClientCommand {
    fn from(value: Command) -> Self {
        match value {
            Command::Init { .. } => Self::Init,
            Command::Pomodoro => Self::Pomodoro,
            Command::Break => Self::Break,
            Command::Stop => Self::Stop,
            Command::Query {
                state,
                total,
                remaining,
            } => Self::Query(QueryArguments {
                state,
                total,
                remaining,
            }),
            Command::Title => Self::Title,
            Command::Quit => Self::Quit,
        }
    }
}
