use pathwire::http::request::{ParsedRequest, query_param};

#[test]
fn test_request_accessors() {
    let req = ParsedRequest::new("/toggle", "state=1");

    assert_eq!(req.path(), "/toggle");
    assert_eq!(req.params(), "state=1");
}

#[test]
fn test_request_param_lookup() {
    let req = ParsedRequest::new("/schedule", "open_at=420&label=morning");

    assert_eq!(req.param("open_at").as_deref(), Some("420"));
    assert_eq!(req.param("label").as_deref(), Some("morning"));
    assert_eq!(req.param("missing"), None);
}

#[test]
fn test_request_param_percent_decoding() {
    let req = ParsedRequest::new("/name", "label=living%20room&x=a+b");

    assert_eq!(req.param("label").as_deref(), Some("living room"));
    assert_eq!(req.param("x").as_deref(), Some("a b"));
}

#[test]
fn test_request_first_value_wins() {
    assert_eq!(query_param("a=1&a=2", "a").as_deref(), Some("1"));
}

#[test]
fn test_request_empty_params() {
    let req = ParsedRequest::new("/open", "");

    assert_eq!(req.query_pairs().count(), 0);
    assert_eq!(req.param("anything"), None);
}

#[test]
fn test_request_query_pairs() {
    let req = ParsedRequest::new("/x", "a=1&b&c=");
    let pairs: Vec<(String, String)> = req
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    assert_eq!(
        pairs,
        vec![
            ("a".to_string(), "1".to_string()),
            ("b".to_string(), String::new()),
            ("c".to_string(), String::new()),
        ]
    );
}

#[test]
fn test_request_clone_and_eq() {
    let req = ParsedRequest::new("/open", "");
    assert_eq!(req.clone(), req);
}
