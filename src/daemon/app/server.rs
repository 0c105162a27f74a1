use std::sync::Arc;

use snafu::prelude::*;
use tokio::sync::Notify;
use tracing::{field::Empty, Instrument, Span};

use crate::domain::daemon::inbound::QueryResponse;
use crate::domain::daemon::ApplicationCore;
use crate::protocol::connection::{ReceiveFrameError, SendFrameError};
use crate::protocol::{Connection, Protocol, Request, Response};
use crate::tracing_report;
use crate::utils::signal::{self, ShutdownSignalError};
use crate::utils::stream::Stream;

use super::listener::{ListenError, Listener};

/// The control server. Each accepted connection carries exactly one request
/// and its response.
pub struct Server {
    listener: Box<dyn Listener>,
    core: Arc<ApplicationCore>,
    quit: Arc<Notify>,
}

impl Server {
    pub fn new(listener: Box<dyn Listener>, core: ApplicationCore) -> Self {
        Self {
            listener,
            core: Arc::new(core),
            quit: Arc::new(Notify::new()),
        }
    }

    /// Accept connections and handle requests until a client asks the daemon
    /// to quit or the process receives a termination signal. The timer and
    /// the title updater are shut down before returning, whatever the reason.
    ///
    /// # Errors
    ///
    /// This function will return an error if the server fails to accept
    /// connections or to wait for termination signals.
    #[tracing::instrument(skip(self))]
    pub async fn serve(&self) -> Result<(), ServerError> {
        let res = self.accept_loop().await;
        self.core.shutdown.shutdown().await;
        tracing::info!("Shut down application");
        res
    }

    async fn accept_loop(&self) -> Result<(), ServerError> {
        let terminated = signal::shutdown_signal();
        tokio::pin!(terminated);

        loop {
            let stream = tokio::select! {
                res = self.listener.accept() => match res {
                    Ok(stream) => {
                        tracing::info!("Accepted connection");
                        stream
                    }
                    Err(err) => {
                        tracing_report!(err);
                        return Err(err).context(ListenSnafu);
                    }
                },
                () = self.quit.notified() => {
                    tracing::info!("Quit requested by client");
                    return Ok(());
                }
                res = &mut terminated => {
                    return match res {
                        Ok(()) => {
                            tracing::info!("Received termination signal");
                            Ok(())
                        }
                        Err(err) => {
                            tracing_report!(err);
                            Err(err).context(SignalSnafu)
                        }
                    };
                }
            };

            let core = Arc::clone(&self.core);
            let quit = Arc::clone(&self.quit);
            let connection = Connection::from(stream);

            let span = tracing::info_span!("handle", req = Empty).or_current();
            tokio::spawn(
                async move {
                    if let Err(err) = Self::handle(core, quit, connection).await {
                        tracing_report!(err, "Could not handle requests");
                    }
                }
                .instrument(span),
            );
        }
    }

    async fn handle<S: Stream>(
        core: Arc<ApplicationCore>,
        quit: Arc<Notify>,
        mut connection: Connection<S>,
    ) -> Result<(), ServerError> {
        let request = match connection.receive().await {
            Ok(frame) => match Protocol::from(frame) {
                Protocol::Request(request) => request,
                protocol => return BadRequestSnafu { protocol }.fail(),
            },
            Err(err) => return Err(err).context(ReceiveSnafu),
        };

        Span::current().record("req", format!("{request:?}"));
        tracing::info!("Received request");

        let response = match request {
            Request::StartPomodoro => {
                core.start_pomodoro.start_pomodoro().await;
                Response::StartPomodoro
            }
            Request::StartBreak => {
                core.start_break.start_break().await;
                Response::StartBreak
            }
            Request::Stop => {
                core.stop.stop().await;
                Response::Stop
            }
            Request::Query => core.query.query().await.into(),
            Request::Title => Response::Title {
                text: core.title.title().await,
            },
            Request::Quit => Response::Quit,
        };
        tracing::info!("Handled request");

        let is_quit = matches!(response, Response::Quit);
        connection
            .send(Protocol::Response(response).into())
            .await
            .context(SendSnafu)?;
        tracing::info!("Sent response");

        if is_quit {
            quit.notify_one();
        }
        Ok(())
    }
}

impl From<QueryResponse> for Response {
    fn from(value: QueryResponse) -> Self {
        Response::Query {
            state: value.state,
            total: value.total,
            remaining: value.remaining,
        }
    }
}

/// An error raised while serving control requests.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum ServerError {
    #[snafu(display("Control listener failed"))]
    Listen { source: ListenError },
    #[snafu(display("Could not wait for termination signals"))]
    Signal { source: ShutdownSignalError },
    #[snafu(display("Could not receive a request"))]
    Receive { source: ReceiveFrameError },
    #[snafu(display("Could not handle {protocol:?}"))]
    BadRequest { protocol: Protocol },
    #[snafu(display("Could not send a response"))]
    Send { source: SendFrameError },
}
