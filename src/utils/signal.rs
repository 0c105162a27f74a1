use std::io::Error as IoError;
use std::sync::Arc;

use snafu::prelude::*;
use tokio::signal;
use tokio::signal::unix::{self as unix_signal, SignalKind};

/// Wait until the process receives SIGINT or SIGTERM.
///
/// # Errors
///
/// This function will return an error if a signal handler could not be
/// installed.
pub async fn shutdown_signal() -> Result<(), ShutdownSignalError> {
    let mut terminate =
        unix_signal::signal(SignalKind::terminate()).context(InstallSnafu { name: "SIGTERM" })?;

    tokio::select! {
        res = signal::ctrl_c() => res.context(InstallSnafu { name: "SIGINT" }),
        _ = terminate.recv() => Ok(()),
    }
}

/// An error for waiting on termination signals.
#[derive(Debug, Snafu, Clone)]
pub enum ShutdownSignalError {
    #[snafu(display("Could not install {name} handler"))]
    Install {
        name: &'static str,
        #[snafu(source(from(IoError, Arc::new)))]
        source: Arc<IoError>,
    },
}
