//! Minimal HTTP-like request handling.
//!
//! Each accepted connection carries exactly one request. Only the request
//! target of the first line is read; the response is a small JSON status
//! object and the connection is always closed afterwards.
//!
//! # Architecture
//!
//! - **`connection`**: the byte-stream capability the handler reads from and writes to
//! - **`parser`**: byte-at-a-time state machine for the request line
//! - **`request`**: the parsed path and parameter string
//! - **`registry`**: bounded path to handler table
//! - **`response`**: outcomes and their status lines
//! - **`writer`**: serializes a response, then flushes and closes
//! - **`dispatcher`**: ties the above together per connection
//!
//! # Request line states
//!
//! ```text
//!   AwaitingMethod ──delim──▶ InPath ──'?'──▶ InParams ──delim──▶ Complete
//!                               │                                    ▲
//!                               └──── ' ' / '\r' / '\n' ─────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use pathwire::http::connection::StreamConnection;
//! use pathwire::http::dispatcher::Dispatcher;
//! use pathwire::http::registry::HandlerRegistry;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut registry = HandlerRegistry::default();
//!     registry.register("/ping", |_: &str| true)?;
//!     let dispatcher = Dispatcher::new(Arc::new(registry));
//!
//!     let listener = TcpListener::bind("127.0.0.1:8080").await?;
//!     loop {
//!         let (socket, _addr) = listener.accept().await?;
//!         let dispatcher = dispatcher.clone();
//!         tokio::spawn(async move {
//!             let mut conn = StreamConnection::new(socket);
//!             let _ = dispatcher.handle(&mut conn).await;
//!         });
//!     }
//! }
//! ```

pub mod connection;
pub mod dispatcher;
pub mod parser;
pub mod registry;
pub mod request;
pub mod response;
pub mod writer;
