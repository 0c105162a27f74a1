mod cli;
mod setup;

use clap::Parser;
use snafu::{prelude::*, Whatever};
use tomato_tray::daemon::web::WebServer;
use tomato_tray::daemon::ProcessController;

use crate::cli::Arguments;

#[snafu::report]
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Whatever> {
    let arg = Arguments::parse();

    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(arg.verbosity)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .whatever_context("Could not setup logger")?;

    let daemon = setup::bootstrap(arg).await?;

    let web = daemon.web.map(WebServer::spawn);

    let res = daemon
        .server
        .serve()
        .await
        .whatever_context("Server failed to serve with fatal");

    if let Some(web) = web {
        web.abort();
    }
    if let Err(err) = ProcessController::release(&daemon.pid) {
        tracing::warn!(%err, "Could not remove PID file");
    }
    if let Err(err) = std::fs::remove_file(&daemon.socket) {
        tracing::warn!(%err, "Could not remove socket");
    }

    res
}
