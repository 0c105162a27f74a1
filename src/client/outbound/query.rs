use std::sync::Arc;

use crate::client::app::connector::Connector;
use crate::domain::client::outbound::BadResponseSnafu;
use crate::domain::client::outbound::{QueryPort, QueryResponse, RequestDaemonError};
use crate::protocol::{Request, Response};

/// Asks the daemon for the timer state over a fresh connection.
pub struct QueryService {
    connector: Arc<dyn Connector>,
}

impl QueryService {
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self { connector }
    }
}

#[async_trait::async_trait]
impl QueryPort for QueryService {
    async fn query(&self) -> Result<QueryResponse, RequestDaemonError> {
        let Response::Query {
            state,
            total,
            remaining,
        } = super::exchange(self.connector.as_ref(), Request::Query).await?
        else {
            return BadResponseSnafu.fail();
        };

        Ok(QueryResponse {
            state,
            total,
            remaining,
        })
    }
}
