mod control;
mod init;
mod query;
mod title;

pub use control::ControlService;
pub use init::InitService;
pub use query::QueryService;
pub use title::TitleService;

use snafu::prelude::*;

use crate::client::app::connector::{ConnectError, Connector};
use crate::domain::client::outbound::{BadResponseSnafu, RequestDaemonError, UnavailableSnafu};
use crate::protocol::{Connection, Protocol, Request, Response};

/// Open a connection, send one request and wait for its response.
///
/// # Errors
///
/// This function will return an error if the daemon is unreachable, the
/// exchange fails or the daemon replies with something other than a
/// response.
async fn exchange(
    connector: &dyn Connector,
    request: Request,
) -> Result<Response, RequestDaemonError> {
    let stream = match connector.connect().await {
        Ok(stream) => stream,
        Err(err) => match err {
            ConnectError::Unavailable { endpoint } => return UnavailableSnafu { endpoint }.fail(),
            err => return Err(err).whatever_context("Could not connect"),
        },
    };

    let mut connection = Connection::from(stream);

    connection
        .send(Protocol::Request(request).into())
        .await
        .whatever_context("Could not send request")?;

    let response: Protocol = connection
        .receive()
        .await
        .whatever_context("Could not receive response")?
        .into();

    match response {
        Protocol::Response(response) => Ok(response),
        Protocol::Request(_) => BadResponseSnafu.fail(),
    }
}

#[cfg(test)]
mod testing {
    use std::sync::Arc;

    use tokio::task::JoinHandle;

    use crate::client::app::connector::{Connector, DuplexConnector};
    use crate::protocol::{Connection, Protocol};

    /// A fake daemon that answers one connection with `reply`. The handle
    /// yields the message it received.
    pub(super) fn scripted_daemon(reply: Protocol) -> (Arc<dyn Connector>, JoinHandle<Protocol>) {
        let (connector, mut peers) = DuplexConnector::new(256);
        let daemon = tokio::spawn(async move {
            let mut connection = Connection::from(peers.recv().await.unwrap());
            let received: Protocol = connection.receive().await.unwrap().into();
            connection.send(reply.into()).await.unwrap();
            received
        });
        let connector: Arc<dyn Connector> = Arc::new(connector);
        (connector, daemon)
    }

    /// A connector whose daemon is gone.
    pub(super) fn absent_daemon() -> Arc<dyn Connector> {
        let (connector, peers) = DuplexConnector::new(256);
        drop(peers);
        Arc::new(connector)
    }
}
