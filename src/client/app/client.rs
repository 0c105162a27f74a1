use std::sync::Arc;

use snafu::prelude::*;

use crate::client::app::command::{Command, QueryArguments};
use crate::domain::client::outbound::{
    ControlAction, InitDaemonError, QueryResponse, RequestDaemonError,
};
use crate::domain::client::ApplicationCore;

/// Main business logic implementation in client side.
pub struct Client {
    core: Arc<ApplicationCore>,
}

impl Client {
    /// Creates a new [`Client`].
    pub fn new(core: Arc<ApplicationCore>) -> Self {
        Self { core }
    }

    /// Run specific function according to `command`.
    ///
    /// # Errors
    ///
    /// This function will return an error if any error occurs.
    pub async fn run(&self, command: Command) -> Result<(), ClientError> {
        match command {
            Command::Init => self.init().await,
            Command::Pomodoro => self.control(ControlAction::StartPomodoro).await,
            Command::Break => self.control(ControlAction::StartBreak).await,
            Command::Stop => self.control(ControlAction::Stop).await,
            Command::Query(args) => self.query(args).await,
            Command::Title => self.title().await,
            Command::Quit => self.control(ControlAction::Quit).await,
        }
    }

    /// Launch the daemon.
    ///
    /// # Errors
    ///
    /// This function will return an error if the daemon fails to be launched.
    async fn init(&self) -> Result<(), ClientError> {
        self.core.init.init().await.context(InitDaemonSnafu)
    }

    /// Send a control request to daemon.
    ///
    /// # Errors
    ///
    /// This function will return an error if the client fails to receive a
    /// valid response.
    async fn control(&self, action: ControlAction) -> Result<(), ClientError> {
        self.core
            .control
            .control(action)
            .await
            .context(RequestSnafu { action: action.to_string() })
    }

    /// Send `query` request to daemon and print the selected fields.
    ///
    /// # Errors
    ///
    /// This function will return an error if the client fails to receive a
    /// valid response.
    async fn query(&self, args: QueryArguments) -> Result<(), ClientError> {
        let response = self
            .core
            .query
            .query()
            .await
            .context(RequestSnafu { action: "query" })?;

        for line in render_query(&args, response) {
            println!("{line}");
        }
        Ok(())
    }

    /// Send `title` request to daemon and print the title, or an empty line
    /// if none is shown.
    ///
    /// # Errors
    ///
    /// This function will return an error if the client fails to receive a
    /// valid response.
    async fn title(&self) -> Result<(), ClientError> {
        let text = self
            .core
            .title
            .title()
            .await
            .context(RequestSnafu { action: "title" })?;
        println!("{}", text.unwrap_or_default());
        Ok(())
    }
}

/// Format the fields selected by `args` as aligned `key = value` lines. All
/// fields are shown if none is selected.
fn render_query(args: &QueryArguments, response: QueryResponse) -> Vec<String> {
    let enable_all = !args.state && !args.total && !args.remaining;
    let mut outputs = Vec::new();

    if enable_all || args.state {
        outputs.push(("State", response.state));
    }

    if enable_all || args.total {
        outputs.push(("Total", format!("{}s", response.total.as_secs())));
    }

    if enable_all || args.remaining {
        outputs.push(("Remaining", format!("{}s", response.remaining.as_secs())));
    }

    let key_align = outputs
        .iter()
        .map(|(key, _)| key.len())
        .max()
        .unwrap_or_default();

    outputs
        .into_iter()
        .map(|(key, value)| format!("{key:<key_align$} = {value}"))
        .collect()
}

/// An error for client's operations.
#[derive(Debug, Snafu)]
pub enum ClientError {
    #[snafu(display("Could not initialize daemon"))]
    InitDaemon { source: InitDaemonError },
    #[snafu(display("Could not request daemon to {action}"))]
    Request {
        action: String,
        source: RequestDaemonError,
    },
}
