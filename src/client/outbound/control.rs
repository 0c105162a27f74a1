use std::sync::Arc;

use crate::client::app::connector::Connector;
use crate::domain::client::outbound::{
    BadResponseSnafu, ControlAction, ControlPort, RequestDaemonError,
};
use crate::protocol::{Request, Response};

/// Sends one [`ControlAction`] per connection and checks the echo.
pub struct ControlService {
    connector: Arc<dyn Connector>,
}

impl ControlService {
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self { connector }
    }
}

#[async_trait::async_trait]
impl ControlPort for ControlService {
    async fn control(&self, action: ControlAction) -> Result<(), RequestDaemonError> {
        let request = match action {
            ControlAction::StartPomodoro => Request::StartPomodoro,
            ControlAction::StartBreak => Request::StartBreak,
            ControlAction::Stop => Request::Stop,
            ControlAction::Quit => Request::Quit,
        };

        let response = super::exchange(self.connector.as_ref(), request).await?;

        match (action, response) {
            (ControlAction::StartPomodoro, Response::StartPomodoro)
            | (ControlAction::StartBreak, Response::StartBreak)
            | (ControlAction::Stop, Response::Stop)
            | (ControlAction::Quit, Response::Quit) => Ok(()),
            _ => BadResponseSnafu.fail(),
        }
    }
}
