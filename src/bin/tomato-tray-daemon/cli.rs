use std::path::PathBuf;

use clap::Parser;
use tracing::Level;

#[derive(Debug, Parser)]
#[command(version, about = "Pomodoro timer daemon", long_about = None)]
pub struct Arguments {
    /// Path to a custom configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Path where the daemon creates the UNIX socket
    #[arg(short, long)]
    pub socket: Option<PathBuf>,
    /// Whether to daemonize the process
    #[arg(short, long)]
    pub daemonize: bool,
    /// Maximum logging level the subscriber should use
    #[arg(short, long, default_value_t = Level::INFO)]
    pub verbosity: Level,
}

#[cfg(test)]
mod tests {
    use super::*;

    use clap::CommandFactory;

    #[test]
    fn arguments_parse() {
        Arguments::command().debug_assert();
    }

    #[test]
    fn arguments_defaults() {
        let args = Arguments::parse_from(["tomato-tray-daemon"]);
        assert_eq!(args.verbosity, Level::INFO);
        assert!(!args.daemonize);
        assert!(args.config.is_none());
    }
}
