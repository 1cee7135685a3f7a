use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use crate::http::connection::StreamConnection;
use crate::http::dispatcher::{DispatchError, Dispatcher};

/// Accepts connections on `addr` and serves each one on its own task.
pub async fn run(addr: &str, dispatcher: Arc<Dispatcher>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Listening on {}", listener.local_addr()?);

    serve(listener, dispatcher).await
}

pub async fn serve(listener: TcpListener, dispatcher: Arc<Dispatcher>) -> anyhow::Result<()> {
    loop {
        let (socket, peer) = listener.accept().await?;
        info!("Accepted connection from {}", peer);

        let dispatcher = Arc::clone(&dispatcher);
        tokio::spawn(async move {
            let mut conn = StreamConnection::new(socket);
            match dispatcher.handle(&mut conn).await {
                Ok(()) => {}
                Err(DispatchError::Io(e)) => {
                    tracing::error!("Connection error from {}: {}", peer, e);
                }
                Err(e) => {
                    tracing::debug!(%peer, error = %e, "request rejected");
                }
            }
        });
    }
}
