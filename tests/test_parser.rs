mod support;

use std::time::Duration;

use pathwire::http::parser::{ParseError, ParseState, RequestLine, RequestParser};
use support::ScriptedConnection;
use tokio::time::Instant;

fn deadline() -> Instant {
    Instant::now() + Duration::from_secs(5)
}

#[test]
fn test_parse_path_and_params() {
    let parsed = RequestParser::default().feed(b"GET /toggle?state=1 ").unwrap();

    assert_eq!(parsed.path(), "/toggle");
    assert_eq!(parsed.params(), "state=1");
}

#[test]
fn test_parse_without_params_skips_params_state() {
    let parsed = RequestParser::default().feed(b"GET /toggle ").unwrap();

    assert_eq!(parsed.path(), "/toggle");
    assert_eq!(parsed.params(), "");
}

#[test]
fn test_parse_stops_at_first_line_terminator() {
    for input in [&b"GET /status\r\n"[..], &b"GET /status\n"[..]] {
        let parsed = RequestParser::default().feed(input).unwrap();
        assert_eq!(parsed.path(), "/status");
        assert_eq!(parsed.params(), "");
    }
}

#[test]
fn test_parse_ignores_rest_of_request() {
    let req = b"POST /schedule?open_at=420 HTTP/1.1\r\nHost: blinds\r\nContent-Length: 3\r\n\r\nabc";
    let parsed = RequestParser::default().feed(req).unwrap();

    assert_eq!(parsed.path(), "/schedule");
    assert_eq!(parsed.params(), "open_at=420");
}

#[test]
fn test_parse_method_token_is_discarded() {
    let parsed = RequestParser::default().feed(b"WHATEVER /x ").unwrap();
    assert_eq!(parsed.path(), "/x");
}

#[test]
fn test_parse_truncated_request_is_malformed() {
    let result = RequestParser::default().feed(b"GET /par");
    assert!(matches!(result, Err(ParseError::Malformed)));
}

#[test]
fn test_parse_empty_input_is_malformed() {
    let result = RequestParser::default().feed(b"");
    assert!(matches!(result, Err(ParseError::Malformed)));
}

#[test]
fn test_parse_invalid_utf8_path_is_malformed() {
    let result = RequestParser::default().feed(b"GET /\xff\xfe ");
    assert!(matches!(result, Err(ParseError::Malformed)));
}

#[test]
fn test_parse_request_line_too_large() {
    let mut req = b"GET /".to_vec();
    req.extend(std::iter::repeat_n(b'a', 64));
    req.push(b' ');

    let result = RequestParser::new(32).feed(&req);
    assert!(matches!(result, Err(ParseError::TooLarge { limit: 32 })));
}

#[test]
fn test_parse_at_exact_limit_succeeds() {
    let req = b"GET /ab ";
    let parsed = RequestParser::new(req.len()).feed(req).unwrap();
    assert_eq!(parsed.path(), "/ab");
}

#[test]
fn test_request_line_state_walk() {
    let mut line = RequestLine::new(64);
    assert_eq!(line.state(), ParseState::AwaitingMethod);

    for b in b"GET " {
        line.push(*b).unwrap();
    }
    assert_eq!(line.state(), ParseState::InPath);

    for b in b"/t?" {
        line.push(*b).unwrap();
    }
    assert_eq!(line.state(), ParseState::InParams);

    line.push(b'\r').unwrap();
    assert_eq!(line.state(), ParseState::Complete);
}

#[test]
fn test_delimiters() {
    for b in [b' ', b'\r', b'\n', b'?'] {
        assert!(ParseState::is_delimiter(b));
    }
    for b in [b'/', b'=', b'&', b'a', b'\t'] {
        assert!(!ParseState::is_delimiter(b));
    }
}

#[tokio::test]
async fn test_parse_from_connection_leaves_remaining_bytes_unread() {
    let req = b"GET /toggle?state=1 HTTP/1.1\r\nHost: blinds\r\n\r\n";
    let mut conn = ScriptedConnection::new(req);

    let parsed = RequestParser::default()
        .parse(&mut conn, deadline())
        .await
        .unwrap();

    assert_eq!(parsed.path(), "/toggle");
    assert_eq!(parsed.params(), "state=1");
    assert_eq!(conn.reads(), b"GET /toggle?state=1 ".len());
    assert_eq!(conn.remaining(), req.len() - conn.reads());
}

#[tokio::test]
async fn test_parse_from_connection_end_of_stream_is_malformed() {
    let mut conn = ScriptedConnection::new(b"GET /par");

    let result = RequestParser::default().parse(&mut conn, deadline()).await;
    assert!(matches!(result, Err(ParseError::Malformed)));
}

#[tokio::test]
async fn test_parse_from_stalled_connection_times_out() {
    let mut conn = ScriptedConnection::stalling(b"GET /slo");

    let deadline = Instant::now() + Duration::from_millis(50);
    let result = RequestParser::default().parse(&mut conn, deadline).await;
    assert!(matches!(result, Err(ParseError::Timeout(_))));
}
