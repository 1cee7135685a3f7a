use bytes::{BufMut, Bytes, BytesMut};

use crate::http::connection::Connection;
use crate::http::response::{Outcome, Response};

const HTTP_VERSION: &str = "HTTP/1.1";

pub fn serialize_response(resp: &Response) -> Bytes {
    // serde_json never fails on a plain string
    let message = serde_json::to_string(&resp.message).unwrap_or_else(|_| "\"\"".to_string());

    let mut buf = BytesMut::with_capacity(96 + message.len());

    // Status line
    buf.put_slice(HTTP_VERSION.as_bytes());
    buf.put_u8(b' ');
    buf.put_slice(resp.outcome.status_line().as_bytes());
    buf.put_slice(b"\r\n");

    // Headers
    buf.put_slice(b"Content-Type: application/json\r\n");
    buf.put_slice(b"Connection: close\r\n");

    // Header/body separator
    buf.put_slice(b"\r\n");

    // Body
    buf.put_slice(b"{\"message\": ");
    buf.put_slice(message.as_bytes());
    buf.put_slice(b"}\n");

    buf.freeze()
}

pub struct ResponseWriter {
    buffer: Bytes,
}

impl ResponseWriter {
    pub fn new(response: &Response) -> Self {
        Self {
            buffer: serialize_response(response),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Writes the response, then flushes and closes the connection.
    ///
    /// The connection is closed even when the write fails; the write error
    /// wins over a close error.
    pub async fn write_and_close<C: Connection>(&self, conn: &mut C) -> std::io::Result<()> {
        let written = conn.write(&self.buffer).await;
        let closed = conn.close().await;
        written?;
        closed
    }
}

/// Sends `message` with the status of `outcome` and closes the connection.
pub async fn respond<C: Connection>(
    conn: &mut C,
    outcome: Outcome,
    message: &str,
) -> std::io::Result<()> {
    let response = Response::new(outcome).with_message(message);
    ResponseWriter::new(&response).write_and_close(conn).await
}
