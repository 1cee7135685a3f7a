//! Network time sync over SNTP.
//!
//! A single 48-byte request is sent over UDP and the transmit timestamp of
//! the reply is taken as the current time. No state is cached between calls.

use std::io;
use std::net::SocketAddr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use thiserror::Error;
use tokio::net::UdpSocket;
use tokio::time::timeout;

pub const PACKET_SIZE: usize = 48;

/// Seconds from 1900-01-01 (NTP era 0) to 1970-01-01.
pub const NTP_UNIX_OFFSET: u64 = 2_208_988_800;

const TRANSMIT_SECONDS: usize = 40;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("could not resolve time server {0:?}")]
    Resolve(String),
    #[error("time server did not answer within {0:?}")]
    Timeout(Duration),
    #[error("reply is {0} bytes, expected 48")]
    ShortPacket(usize),
    #[error("reply timestamp predates the Unix epoch")]
    BeforeEpoch,
    #[error("time sync I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Builds a client-mode request packet.
pub fn build_request() -> [u8; PACKET_SIZE] {
    let mut packet = [0u8; PACKET_SIZE];
    packet[0] = 0b1110_0011; // LI unsynchronized, version 4, client mode
    packet[1] = 0; // stratum
    packet[2] = 6; // poll interval
    packet[3] = 0xEC; // precision
    // root delay and dispersion stay zero
    packet[12..16].copy_from_slice(&[49, 0x4E, 49, 52]);
    packet
}

/// Extracts the transmit time (whole seconds) from a server reply.
pub fn parse_response(packet: &[u8]) -> Result<SystemTime, SyncError> {
    if packet.len() < PACKET_SIZE {
        return Err(SyncError::ShortPacket(packet.len()));
    }

    let mut seconds = [0u8; 4];
    seconds.copy_from_slice(&packet[TRANSMIT_SECONDS..TRANSMIT_SECONDS + 4]);
    let ntp_seconds = u64::from(u32::from_be_bytes(seconds));

    let unix_seconds = ntp_seconds
        .checked_sub(NTP_UNIX_OFFSET)
        .ok_or(SyncError::BeforeEpoch)?;
    Ok(UNIX_EPOCH + Duration::from_secs(unix_seconds))
}

/// Source of the current wall-clock time.
#[allow(async_fn_in_trait)]
pub trait TimeSource {
    async fn now(&self) -> Result<SystemTime, SyncError>;
}

#[derive(Debug, Clone)]
pub struct SntpClock {
    server: String,
    timeout: Duration,
}

impl SntpClock {
    /// `server` is a `host:port` pair, e.g. `time.nist.gov:123`.
    pub fn new(server: impl Into<String>, timeout: Duration) -> Self {
        Self {
            server: server.into(),
            timeout,
        }
    }

    async fn resolve(&self) -> Result<SocketAddr, SyncError> {
        tokio::net::lookup_host(&self.server)
            .await?
            .next()
            .ok_or_else(|| SyncError::Resolve(self.server.clone()))
    }

    async fn exchange(&self, addr: SocketAddr) -> Result<SystemTime, SyncError> {
        let bind: SocketAddr = if addr.is_ipv4() {
            SocketAddr::from(([0u8; 4], 0))
        } else {
            SocketAddr::from(([0u16; 8], 0))
        };
        let socket = UdpSocket::bind(bind).await?;
        socket.connect(addr).await?;
        socket.send(&build_request()).await?;

        let mut reply = [0u8; PACKET_SIZE];
        let n = socket.recv(&mut reply).await?;
        parse_response(&reply[..n])
    }
}

impl TimeSource for SntpClock {
    /// Resolves the server and queries it, all within the configured
    /// timeout.
    async fn now(&self) -> Result<SystemTime, SyncError> {
        let query = async {
            let addr = self.resolve().await?;
            tracing::debug!(server = %self.server, %addr, "requesting time");
            self.exchange(addr).await
        };

        timeout(self.timeout, query)
            .await
            .map_err(|_| SyncError::Timeout(self.timeout))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_header_bytes() {
        let packet = build_request();
        assert_eq!(&packet[..4], &[0xE3, 0, 6, 0xEC]);
        assert_eq!(&packet[12..16], &[49, 0x4E, 49, 52]);
        assert!(packet[4..12].iter().all(|b| *b == 0));
        assert!(packet[16..].iter().all(|b| *b == 0));
    }
}
