use std::cell::LazyCell;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use snafu::{prelude::*, Whatever};
use tokio::net::UnixListener;
use tomato_tray::daemon::app::{bind_tcp, bind_unix};
use tomato_tray::daemon::config::{self, Configuration};
use tomato_tray::daemon::outbound::TitleDisplay;
use tomato_tray::daemon::repository::DurationConfiguration;
use tomato_tray::daemon::runtime::Environment;
use tomato_tray::daemon::web::{StaticFiles, WebServer};
use tomato_tray::daemon::{ProcessController, Server};
use tomato_tray::domain::daemon::updater::IntervalTicks;
use tomato_tray::domain::daemon::ApplicationCore;
use tomato_tray::utils::xdg::{Xdg, XdgBaseKind};

use crate::cli::Arguments;

const APP_NAME: &str = "tomato-tray";
const DAEMON_NAME: &str = "tomato-tray-daemon";

/// Everything the daemon runs, ready to serve.
pub struct Daemon {
    pub server: Server,
    pub web: Option<WebServer>,
    pub socket: PathBuf,
    pub pid: PathBuf,
}

struct EnvironmentPath {
    socket: PathBuf,
    pid: PathBuf,
}

pub async fn bootstrap(arg: Arguments) -> Result<Daemon, Whatever> {
    let configuration = configuration(&arg)?;
    let env = environment(&arg, &configuration)?;
    process(&arg, &env.pid)?;

    let listener = listener(&env.socket)?;
    let web = web(&configuration).await?;
    let core = core(configuration).await?;

    tracing::info!(socket = %env.socket.display(), "Daemon is ready");

    Ok(Daemon {
        server: Server::new(Box::new(listener), core),
        web,
        socket: env.socket,
        pid: env.pid,
    })
}

fn environment(arg: &Arguments, config: &Configuration) -> Result<EnvironmentPath, Whatever> {
    let xdg = LazyCell::new(|| Xdg::new(APP_NAME));
    let resolve = |file: &str| -> Result<PathBuf, Whatever> {
        xdg.as_ref()
            .map_err(Clone::clone)
            .and_then(|xdg| xdg.resolve(XdgBaseKind::Runtime, file))
            .whatever_context("Could not use XDG base directories")
    };

    let socket = match arg.socket.as_ref().or(config.runtime.socket.as_ref()) {
        Some(socket) => socket.clone(),
        None => resolve("daemon.socket")?,
    };

    let pid = match config.runtime.pid.as_ref() {
        Some(pid) => pid.clone(),
        None => resolve("daemon.pid")?,
    };

    let mut env = Environment::new();
    for path in [&socket, &pid] {
        let parent = path
            .parent()
            .whatever_context(format!("Invalid runtime path: {}", path.display()))?;
        env.register_directory(parent);
        env.register_permission(parent, 0o700);
    }

    env.setup()
        .whatever_context("Could not setup environment")?;

    Ok(EnvironmentPath { socket, pid })
}

fn process(arg: &Arguments, pid_path: &Path) -> Result<(), Whatever> {
    ProcessController::new(DAEMON_NAME.to_owned(), pid_path.to_path_buf(), arg.daemonize)
        .start()
        .whatever_context("Could not prepare process")?;
    Ok(())
}

fn configuration(arg: &Arguments) -> Result<Arc<Configuration>, Whatever> {
    let res = match &arg.config {
        Some(path) => config::load_with_path(path),
        None => config::load_with_xdg(APP_NAME),
    };

    let configuration = res.whatever_context("Could not load configuration")?;
    Ok(Arc::new(configuration))
}

fn listener(path: &Path) -> Result<UnixListener, Whatever> {
    // No other instance is alive at this point, so a leftover socket is stale.
    let mut env = Environment::new();
    env.register_stale_file(path);
    env.setup()
        .whatever_context("Could not clean up runtime directory")?;

    bind_unix(path).whatever_context(format!("Could not bind to {}", path.display()))
}

async fn web(config: &Configuration) -> Result<Option<WebServer>, Whatever> {
    let Some(web) = config.web.as_ref() else {
        return Ok(None);
    };

    let listener = bind_tcp(web.address)
        .await
        .whatever_context(format!("Could not bind to {}", web.address))?;
    tracing::info!(address = %web.address, root = %web.root.display(), "Serving static files");

    let server = WebServer::new(Box::new(listener), StaticFiles::new(&web.root));
    Ok(Some(server))
}

async fn core(config: Arc<Configuration>) -> Result<ApplicationCore, Whatever> {
    let display_port = Arc::new(TitleDisplay::new(config.title.file.clone()));
    let duration_repository = Arc::new(DurationConfiguration::new(config));

    let core = ApplicationCore::setup(duration_repository, display_port, Arc::new(IntervalTicks))
        .await
        .whatever_context("Could not setup application core")?;

    Ok(core)
}
