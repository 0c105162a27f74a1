use serde::{Deserialize, Serialize};
use tokio::time::Duration;

/// A [`Protocol`] represents the underlying data type used by
/// the protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Protocol {
    Request(Request),
    Response(Response),
}

/// A [`Request`] represents requests from a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method")]
pub enum Request {
    StartPomodoro,
    StartBreak,
    Stop,
    Query,
    Title,
    Quit,
}

/// A [`Response`] represents a daemon's reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method")]
pub enum Response {
    StartPomodoro,
    StartBreak,
    Stop,
    Query {
        state: String,
        total: Duration,
        remaining: Duration,
    },
    Title {
        text: Option<String>,
    },
    Quit,
}
