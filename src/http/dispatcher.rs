use std::io;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::time::{Instant, timeout_at};
use tracing::{info, warn};

use crate::http::connection::Connection;
use crate::http::parser::{ParseError, RequestParser};
use crate::http::registry::HandlerRegistry;
use crate::http::response::Outcome;
use crate::http::writer::respond;

/// Default time a client gets to deliver its request line.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Why a request was not served successfully.
///
/// Every variant is local to one connection; the client has already been
/// answered (except for I/O failures) when the dispatcher returns it.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("bad request: {0}")]
    BadRequest(#[source] ParseError),
    #[error("no handler registered for {0:?}")]
    UnknownPath(String),
    #[error("handler for {0:?} reported failure")]
    HandlerFailure(String),
    #[error("connection error: {0}")]
    Io(#[from] io::Error),
}

impl DispatchError {
    /// Status the client was answered with, if any.
    pub fn outcome(&self) -> Option<Outcome> {
        match self {
            DispatchError::BadRequest(_) => Some(Outcome::BadRequest),
            DispatchError::UnknownPath(_) => Some(Outcome::NotFound),
            DispatchError::HandlerFailure(_) => Some(Outcome::HandlerError),
            DispatchError::Io(_) => None,
        }
    }
}

/// Drives one connection through parse, lookup, invoke and respond.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<HandlerRegistry>,
    parser: RequestParser,
    read_timeout: Duration,
}

impl Dispatcher {
    pub fn new(registry: Arc<HandlerRegistry>) -> Self {
        Self {
            registry,
            parser: RequestParser::default(),
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    pub fn with_parser(mut self, parser: RequestParser) -> Self {
        self.parser = parser;
        self
    }

    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Handles one accepted connection, closing it exactly once.
    pub async fn handle<C: Connection>(&self, conn: &mut C) -> Result<(), DispatchError> {
        self.handle_until(conn, Instant::now() + self.read_timeout).await
    }

    /// Like [`handle`](Self::handle) with an explicit deadline for the
    /// request line.
    pub async fn handle_until<C: Connection>(
        &self,
        conn: &mut C,
        deadline: Instant,
    ) -> Result<(), DispatchError> {
        let started = Instant::now();
        let has_data = match timeout_at(deadline, conn.available()).await {
            Ok(Ok(has_data)) => has_data,
            Ok(Err(e)) => {
                let _ = conn.close().await;
                return Err(DispatchError::Io(e));
            }
            Err(_) => {
                let e = ParseError::Timeout(deadline.saturating_duration_since(started));
                warn!(error = %e, status = Outcome::BadRequest.as_u16(), "rejecting request");
                respond(conn, Outcome::BadRequest, Outcome::BadRequest.default_message()).await?;
                return Err(DispatchError::BadRequest(e));
            }
        };
        if !has_data {
            tracing::debug!("empty connection");
            conn.close().await?;
            return Ok(());
        }

        let request = match self.parser.parse(conn, deadline).await {
            Ok(request) => request,
            Err(ParseError::Io(e)) => {
                let _ = conn.close().await;
                return Err(DispatchError::Io(e));
            }
            Err(e) => {
                warn!(error = %e, status = Outcome::BadRequest.as_u16(), "rejecting request");
                respond(conn, Outcome::BadRequest, Outcome::BadRequest.default_message()).await?;
                return Err(DispatchError::BadRequest(e));
            }
        };

        let path = request.path();
        let Some(handler) = self.registry.lookup(path) else {
            warn!(path, status = Outcome::NotFound.as_u16(), "no route");
            respond(conn, Outcome::NotFound, Outcome::NotFound.default_message()).await?;
            return Err(DispatchError::UnknownPath(path.to_string()));
        };

        if handler.call(request.params()) {
            info!(path, params = request.params(), status = Outcome::Ok.as_u16(), "request handled");
            respond(conn, Outcome::Ok, Outcome::Ok.default_message()).await?;
            Ok(())
        } else {
            warn!(path, params = request.params(), status = Outcome::HandlerError.as_u16(), "handler failed");
            respond(conn, Outcome::HandlerError, Outcome::HandlerError.default_message()).await?;
            Err(DispatchError::HandlerFailure(path.to_string()))
        }
    }
}
