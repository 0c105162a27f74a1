use std::cell::LazyCell;
use std::path::PathBuf;
use std::sync::Arc;

use snafu::{prelude::*, Whatever};
use tomato_tray::client::app::connector::{Connector, UnixConnector};
use tomato_tray::client::outbound::{ControlService, InitService, QueryService, TitleService};
use tomato_tray::client::Client;
use tomato_tray::daemon::config;
use tomato_tray::domain::client::ApplicationCore;
use tomato_tray::utils::xdg::{Xdg, XdgBaseKind};
use tracing::Level;

use crate::cli::{Arguments, Command};

const APP_NAME: &str = "tomato-tray";
const DAEMON_NAME: &str = "tomato-tray-daemon";

struct EnvironmentPath {
    socket: PathBuf,
    pid: PathBuf,
}

pub fn bootstrap(args: &Arguments) -> Result<Client, Whatever> {
    let env_path = environment(args)?;
    let core = core(args, env_path);
    let client = Client::new(core);
    Ok(client)
}

fn environment(args: &Arguments) -> Result<EnvironmentPath, Whatever> {
    let res = match &args.config {
        Some(path) => config::load_with_path(path),
        None => config::load_with_xdg(APP_NAME),
    };

    let configuration = res.whatever_context("Could not load configuration")?;

    let xdg = LazyCell::new(|| Xdg::new(APP_NAME));

    let socket = match args.socket.as_ref().or(configuration.runtime.socket.as_ref()) {
        Some(socket) => socket.clone(),
        None => xdg
            .as_ref()
            .map_err(Clone::clone)
            .and_then(|xdg| xdg.resolve(XdgBaseKind::Runtime, "daemon.socket"))
            .whatever_context("Could not use XDG base directories")?,
    };

    let pid = match &configuration.runtime.pid {
        Some(pid) => pid.clone(),
        None => xdg
            .as_ref()
            .map_err(Clone::clone)
            .and_then(|xdg| xdg.resolve(XdgBaseKind::Runtime, "daemon.pid"))
            .whatever_context("Could not use XDG base directories")?,
    };

    let env_path = EnvironmentPath { socket, pid };
    Ok(env_path)
}

fn core(args: &Arguments, env_path: EnvironmentPath) -> Arc<ApplicationCore> {
    let executable = match &args.command {
        Command::Init { executable, .. } => executable.clone(),
        _ => None,
    };

    let verbosity = match &args.command {
        Command::Init { verbosity, .. } => *verbosity,
        _ => Level::INFO,
    };

    let connector: Arc<dyn Connector> = Arc::new(UnixConnector::new(&env_path.socket));

    let init_port = Arc::new(InitService::new(
        executable,
        env_path.pid,
        DAEMON_NAME.to_owned(),
        args.config.clone(),
        args.socket.clone(),
        verbosity,
    ));

    let control_port = Arc::new(ControlService::new(Arc::clone(&connector)));
    let query_port = Arc::new(QueryService::new(Arc::clone(&connector)));
    let title_port = Arc::new(TitleService::new(connector));

    let core = ApplicationCore::setup(init_port, control_port, query_port, title_port);
    Arc::new(core)
}
