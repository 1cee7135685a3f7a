use std::time::{Duration, UNIX_EPOCH};

use pathwire::device::clock::{
    NTP_UNIX_OFFSET, PACKET_SIZE, SntpClock, SyncError, TimeSource, build_request, parse_response,
};
use tokio::net::UdpSocket;

fn reply_with_seconds(ntp_seconds: u32) -> [u8; PACKET_SIZE] {
    let mut packet = [0u8; PACKET_SIZE];
    packet[40..44].copy_from_slice(&ntp_seconds.to_be_bytes());
    packet
}

#[test]
fn test_request_packet_layout() {
    let packet = build_request();

    assert_eq!(packet.len(), 48);
    assert_eq!(packet[0], 0b1110_0011);
    assert_eq!(packet[1], 0);
    assert_eq!(packet[2], 6);
    assert_eq!(packet[3], 0xEC);
    assert_eq!(&packet[12..16], &[49, 0x4E, 49, 52]);
}

#[test]
fn test_parse_transmit_timestamp() {
    let unix = 1_700_000_000u64;
    let packet = reply_with_seconds((unix + NTP_UNIX_OFFSET) as u32);

    let time = parse_response(&packet).unwrap();
    assert_eq!(time, UNIX_EPOCH + Duration::from_secs(unix));
}

#[test]
fn test_parse_epoch_exactly() {
    let packet = reply_with_seconds(NTP_UNIX_OFFSET as u32);
    assert_eq!(parse_response(&packet).unwrap(), UNIX_EPOCH);
}

#[test]
fn test_parse_before_epoch() {
    let packet = reply_with_seconds(1);
    assert!(matches!(parse_response(&packet), Err(SyncError::BeforeEpoch)));
}

#[test]
fn test_parse_short_packet() {
    assert!(matches!(
        parse_response(&[0u8; 44]),
        Err(SyncError::ShortPacket(44))
    ));
}

#[tokio::test]
async fn test_sntp_exchange_against_local_server() {
    let server = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = server.local_addr().unwrap();

    let unix = 1_650_000_000u64;
    tokio::spawn(async move {
        let mut buf = [0u8; 64];
        let (n, peer) = server.recv_from(&mut buf).await.unwrap();
        assert_eq!(n, PACKET_SIZE);
        assert_eq!(&buf[..4], &build_request()[..4]);

        let reply = reply_with_seconds((unix + NTP_UNIX_OFFSET) as u32);
        server.send_to(&reply, peer).await.unwrap();
    });

    let clock = SntpClock::new(addr.to_string(), Duration::from_secs(2));
    let time = clock.now().await.unwrap();
    assert_eq!(time, UNIX_EPOCH + Duration::from_secs(unix));
}

#[tokio::test]
async fn test_sntp_times_out_when_server_is_silent() {
    let server = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = server.local_addr().unwrap();

    let clock = SntpClock::new(addr.to_string(), Duration::from_millis(50));
    let err = clock.now().await.unwrap_err();
    assert!(matches!(err, SyncError::Timeout(_)));
    drop(server);
}

#[tokio::test]
async fn test_timeout_covers_name_lookup() {
    // a host name goes through the resolver, which cannot finish in zero time
    let clock = SntpClock::new("localhost:123", Duration::ZERO);
    let err = clock.now().await.unwrap_err();
    assert!(matches!(err, SyncError::Timeout(d) if d == Duration::ZERO));
}
