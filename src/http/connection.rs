//! Client byte streams.
//!
//! The request handler never touches sockets directly. It reads and writes
//! through the [`Connection`] capability, which lets tests drive it with
//! scripted input and lets the server plug in any tokio stream.

use std::io;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

/// Byte-stream capability for one accepted client.
///
/// `close` must flush everything written so far before tearing the stream
/// down, so the client always receives the full response.
#[allow(async_fn_in_trait)]
pub trait Connection {
    /// Waits until at least one byte can be read. Returns `false` once the
    /// peer has finished sending.
    async fn available(&mut self) -> io::Result<bool>;

    /// Reads the next byte, or `None` at end of stream.
    async fn read_byte(&mut self) -> io::Result<Option<u8>>;

    async fn write(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Flushes pending output and shuts the stream down.
    async fn close(&mut self) -> io::Result<()>;
}

/// [`Connection`] over any tokio stream (usually a `TcpStream`).
pub struct StreamConnection<S> {
    stream: BufReader<S>,
    closed: bool,
}

impl<S> StreamConnection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S) -> Self {
        Self {
            stream: BufReader::with_capacity(1024, stream),
            closed: false,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl<S> Connection for StreamConnection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    async fn available(&mut self) -> io::Result<bool> {
        if self.closed {
            return Ok(false);
        }
        let buf = self.stream.fill_buf().await?;
        Ok(!buf.is_empty())
    }

    async fn read_byte(&mut self) -> io::Result<Option<u8>> {
        if self.closed {
            return Ok(None);
        }
        let byte = match self.stream.fill_buf().await?.first() {
            Some(b) => *b,
            None => return Ok(None),
        };
        self.stream.consume(1);
        Ok(Some(byte))
    }

    async fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        if self.closed {
            return Err(io::Error::new(
                io::ErrorKind::NotConnected,
                "write on closed connection",
            ));
        }
        self.stream.write_all(bytes).await
    }

    async fn close(&mut self) -> io::Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.stream.flush().await?;
        self.stream.shutdown().await
    }
}
