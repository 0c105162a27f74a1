use std::sync::Arc;

use crate::client::app::connector::Connector;
use crate::domain::client::outbound::{BadResponseSnafu, RequestDaemonError, TitlePort};
use crate::protocol::{Request, Response};

/// Fetches the title the daemon is currently showing.
pub struct TitleService {
    connector: Arc<dyn Connector>,
}

impl TitleService {
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self { connector }
    }
}

#[async_trait::async_trait]
impl TitlePort for TitleService {
    async fn title(&self) -> Result<Option<String>, RequestDaemonError> {
        match super::exchange(self.connector.as_ref(), Request::Title).await? {
            Response::Title { text } => Ok(text),
            _ => BadResponseSnafu.fail(),
        }
    }
}
