use std::io::Error as IoError;
use std::sync::Arc;

use bytes::{BufMut, Bytes, BytesMut};
use snafu::prelude::*;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::task::JoinHandle;
use tracing::{field::Empty, Instrument, Span};

use crate::daemon::app::listener::{ListenError, Listener};
use crate::tracing_report;
use crate::utils::stream::Stream;

use super::files::{self, StaticFiles};
use super::request::{ParseHeadError, RequestHead};

const NOT_FOUND_BODY: &str = "404 page not found\n";

/// A server which answers HTTP requests with files from a [`StaticFiles`].
/// Every connection carries a single request.
pub struct WebServer {
    listener: Box<dyn Listener>,
    files: Arc<StaticFiles>,
}

impl WebServer {
    /// Creates a new [`WebServer`].
    pub fn new(listener: Box<dyn Listener>, files: StaticFiles) -> Self {
        Self {
            listener,
            files: Arc::new(files),
        }
    }

    /// Accept connections and serve files until accepting fails.
    ///
    /// # Errors
    ///
    /// This function will return an error if the server fails to accept
    /// connections.
    #[tracing::instrument(skip(self), fields(root = %self.files.root().display()))]
    pub async fn serve(&self) -> Result<(), WebServerError> {
        loop {
            let stream = match self.listener.accept().await {
                Ok(stream) => stream,
                Err(err) => {
                    tracing_report!(err);
                    return Err(err).context(ListenSnafu);
                }
            };

            let files = Arc::clone(&self.files);
            let span = tracing::debug_span!("http", target = Empty).or_current();
            tokio::spawn(
                async move {
                    if let Err(err) = Self::handle(files, stream).await {
                        tracing_report!(err, "Could not serve HTTP request");
                    }
                }
                .instrument(span),
            );
        }
    }

    /// Run [`WebServer::serve`] on its own task. Its end is logged, since
    /// the daemon keeps running without the static server.
    pub fn spawn(self) -> JoinHandle<Result<(), WebServerError>> {
        tokio::spawn(async move {
            let res = self.serve().await;
            if res.is_err() {
                tracing::error!("Static file server stopped");
            }
            res
        })
    }

    async fn handle<S: Stream + ?Sized>(
        files: Arc<StaticFiles>,
        mut stream: Box<S>,
    ) -> Result<(), WebServerError> {
        let stream = stream.as_mut();
        let mut buffer = BytesMut::with_capacity(1024);
        let head = loop {
            match RequestHead::parse(&buffer[..]) {
                Ok((head, _)) => break head,
                Err(ParseHeadError::Incomplete) => {}
                Err(err) => {
                    tracing::info!(%err, "Rejected bad request");
                    let reply = Reply::text(Status::BadRequest, "400 bad request\n");
                    return reply.write_to(stream, false).await;
                }
            }

            if stream.read_buf(&mut buffer).await.context(ReadSnafu)? == 0 {
                tracing::debug!("Peer closed before sending a request");
                return Ok(());
            }
        };

        Span::current().record("target", head.target.as_str());

        let with_body = match head.method.as_str() {
            "GET" => true,
            "HEAD" => false,
            _ => {
                let reply = Reply::text(Status::MethodNotAllowed, "405 method not allowed\n");
                return reply.write_to(stream, true).await;
            }
        };

        let reply = match files.resolve(&head.target).await {
            Some(path) => match tokio::fs::read(&path).await {
                Ok(content) => {
                    tracing::info!(path = %path.display(), "Served file");
                    Reply {
                        status: Status::Ok,
                        content_type: files::content_type(&path),
                        body: Bytes::from(content),
                    }
                }
                Err(err) => {
                    tracing::warn!(path = %path.display(), %err, "Could not read file");
                    Reply::text(Status::NotFound, NOT_FOUND_BODY)
                }
            },
            None => Reply::text(Status::NotFound, NOT_FOUND_BODY),
        };

        reply.write_to(stream, with_body).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Ok,
    BadRequest,
    NotFound,
    MethodNotAllowed,
}

impl Status {
    fn line(self) -> &'static str {
        match self {
            Self::Ok => "200 OK",
            Self::BadRequest => "400 Bad Request",
            Self::NotFound => "404 Not Found",
            Self::MethodNotAllowed => "405 Method Not Allowed",
        }
    }
}

struct Reply {
    status: Status,
    content_type: &'static str,
    body: Bytes,
}

impl Reply {
    fn text(status: Status, body: &'static str) -> Self {
        Self {
            status,
            content_type: "text/plain; charset=utf-8",
            body: Bytes::from_static(body.as_bytes()),
        }
    }

    async fn write_to<S: Stream + ?Sized>(
        self,
        stream: &mut S,
        with_body: bool,
    ) -> Result<(), WebServerError> {
        let mut buffer = BytesMut::with_capacity(128 + self.body.len());
        buffer.put_slice(b"HTTP/1.1 ");
        buffer.put_slice(self.status.line().as_bytes());
        buffer.put_slice(b"\r\nContent-Type: ");
        buffer.put_slice(self.content_type.as_bytes());
        buffer.put_slice(format!("\r\nContent-Length: {}", self.body.len()).as_bytes());
        buffer.put_slice(b"\r\nConnection: close\r\n\r\n");
        if with_body {
            buffer.put_slice(&self.body);
        }

        stream.write_all(&buffer).await.context(WriteSnafu)?;
        stream.flush().await.context(WriteSnafu)?;
        stream.shutdown().await.context(WriteSnafu)?;
        Ok(())
    }
}

/// An error type for the static file server.
#[derive(Debug, Snafu, Clone)]
#[non_exhaustive]
pub enum WebServerError {
    #[snafu(display("Could not accept a connection"))]
    Listen { source: ListenError },
    #[snafu(display("Could not read the request"))]
    Read {
        #[snafu(source(from(IoError, Arc::new)))]
        source: Arc<IoError>,
    },
    #[snafu(display("Could not write the response"))]
    Write {
        #[snafu(source(from(IoError, Arc::new)))]
        source: Arc<IoError>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    use assert_fs::prelude::*;
    use assert_fs::TempDir;
    use tokio::io::DuplexStream;

    use crate::daemon::app::listener::DuplexListener;

    fn site() -> TempDir {
        let tmp = TempDir::new().expect("Test environment should support temporary directories");
        tmp.child("index.html").write_str("<h1>home</h1>").unwrap();
        tmp.child("style.css").write_str("body {}").unwrap();
        tmp.child("api/catalog").write_str("[]").unwrap();
        tmp
    }

    async fn exchange(tmp: &TempDir, request: &str) -> String {
        let files = Arc::new(StaticFiles::new(tmp.path()));
        let (server, mut client) = tokio::io::duplex(4096);
        let handling =
            tokio::spawn(async move { WebServer::handle(files, Box::new(server)).await });

        client.write_all(request.as_bytes()).await.unwrap();
        let mut response = String::new();
        client.read_to_string(&mut response).await.unwrap();
        handling.await.unwrap().unwrap();
        response
    }

    #[tokio::test]
    async fn web_server_get_index() {
        let tmp = site();
        let response = exchange(&tmp, "GET / HTTP/1.1\r\nHost: localhost\r\n\r\n").await;
        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(response.contains("Content-Type: text/html; charset=utf-8\r\n"));
        assert!(response.contains("Content-Length: 13\r\n"));
        assert!(response.ends_with("\r\n\r\n<h1>home</h1>"));
    }

    #[tokio::test]
    async fn web_server_split_request() {
        let tmp = site();
        let files = Arc::new(StaticFiles::new(tmp.path()));
        let (server, mut client) = tokio::io::duplex(4096);
        let handling =
            tokio::spawn(async move { WebServer::handle(files, Box::new(server)).await });

        client.write_all(b"GET /style.css HT").await.unwrap();
        tokio::task::yield_now().await;
        client.write_all(b"TP/1.1\r\n\r\n").await.unwrap();
        let mut response = String::new();
        client.read_to_string(&mut response).await.unwrap();
        handling.await.unwrap().unwrap();

        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(response.ends_with("body {}"));
    }

    #[tokio::test]
    async fn web_server_head_has_no_body() {
        let tmp = site();
        let response = exchange(&tmp, "HEAD /style.css HTTP/1.1\r\n\r\n").await;
        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(response.contains("Content-Length: 7\r\n"));
        assert!(response.ends_with("\r\n\r\n"));
    }

    #[tokio::test]
    async fn web_server_api_not_found() {
        let tmp = site();
        let response = exchange(&tmp, "GET /api/catalog HTTP/1.1\r\n\r\n").await;
        assert!(response.starts_with("HTTP/1.1 404 Not Found\r\n"));
        assert!(response.ends_with("\r\n\r\n404 page not found\n"));
    }

    #[tokio::test]
    async fn web_server_missing_not_found() {
        let tmp = site();
        let response = exchange(&tmp, "GET /nope.js HTTP/1.1\r\n\r\n").await;
        assert!(response.starts_with("HTTP/1.1 404 Not Found\r\n"));
    }

    #[tokio::test]
    async fn web_server_method_not_allowed() {
        let tmp = site();
        let response = exchange(&tmp, "POST / HTTP/1.1\r\n\r\n").await;
        assert!(response.starts_with("HTTP/1.1 405 Method Not Allowed\r\n"));
    }

    #[tokio::test]
    async fn web_server_bad_request() {
        let tmp = site();
        let response = exchange(&tmp, "nonsense\r\n\r\n").await;
        assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"));
    }

    #[tokio::test]
    async fn web_server_peer_closed() {
        let tmp = site();
        let files = Arc::new(StaticFiles::new(tmp.path()));
        let (server, client): (DuplexStream, DuplexStream) = tokio::io::duplex(64);
        drop(client);
        assert!(WebServer::handle(files, Box::new(server)).await.is_ok());
    }

    #[tokio::test]
    async fn web_server_spawn_reports_listener_failure() {
        let tmp = site();
        let (listener, peers) = DuplexListener::new(64);
        drop(peers);
        let server = WebServer::new(Box::new(listener), StaticFiles::new(tmp.path()));

        assert!(matches!(
            server.spawn().await.unwrap(),
            Err(WebServerError::Listen {
                source: ListenError::Closed
            })
        ));
    }

    #[tokio::test]
    async fn web_server_serve() {
        let tmp = site();
        let (listener, mut peers) = DuplexListener::new(4096);
        let server = WebServer::new(Box::new(listener), StaticFiles::new(tmp.path()));
        let serving = tokio::spawn(async move { server.serve().await });

        let mut client = peers.recv().await.unwrap();
        client
            .write_all(b"GET /index.html HTTP/1.1\r\n\r\n")
            .await
            .unwrap();
        let mut response = String::new();
        client.read_to_string(&mut response).await.unwrap();
        assert!(response.ends_with("<h1>home</h1>"));

        serving.abort();
    }
}
