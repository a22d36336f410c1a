use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::mpsc::{self, Receiver};
use std::thread;

use chrono::{Duration, Utc};
use url::Url;

use strata_token_core::{RequestContext, StoreError, Token, TokenStore};
use strata_token_introspect::{IntrospectionConfig, IntrospectionTokenStore};

/// Serves exactly one canned HTTP response and hands the raw request bytes
/// back to the test.
fn serve_once(status_line: &'static str, body: String) -> (Url, Receiver<Vec<u8>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let request = read_request(&mut stream);
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\n\
                 Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = stream.write_all(response.as_bytes());
            let _ = tx.send(request);
        }
    });

    let endpoint = Url::parse(&format!("http://{addr}/introspect")).unwrap();
    (endpoint, rx)
}

/// Reads one HTTP request: headers, then Content-Length body bytes.
fn read_request(stream: &mut TcpStream) -> Vec<u8> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    let header_end = loop {
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
        match stream.read(&mut chunk) {
            Ok(0) | Err(_) => return buf,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    };

    let headers = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let content_length = headers
        .lines()
        .find(|line| line.to_ascii_lowercase().starts_with("content-length:"))
        .and_then(|line| line.split(':').nth(1))
        .and_then(|value| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        match stream.read(&mut chunk) {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
    buf
}

fn store_for(endpoint: Url) -> IntrospectionTokenStore {
    IntrospectionTokenStore::new(
        IntrospectionConfig::new(endpoint, "api-gateway".to_string(), "changeit".to_string())
            .with_timeout_secs(5),
    )
    .unwrap()
}

/// An endpoint that is guaranteed to refuse connections: the listener is
/// bound to reserve a port, then dropped.
fn dead_endpoint() -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    Url::parse(&format!("http://{addr}/introspect")).unwrap()
}

#[test]
fn test_active_response_builds_an_enriched_token() {
    let exp = (Utc::now() + Duration::minutes(10)).timestamp();
    let body = format!(
        r#"{{"active":true,"exp":{exp},"sub":"alice","scope":"read write","client_id":"web"}}"#
    );
    let (endpoint, rx) = serve_once("200 OK", body);
    let store = store_for(endpoint);
    let ctx = RequestContext::new("GET", Utc::now());

    let token = store.read(&ctx, "valid-access-token").unwrap().unwrap();
    assert_eq!(token.subject(), "alice");
    assert_eq!(token.expiry().timestamp(), exp);
    assert_eq!(token.attribute("scope"), Some("read write"));
    assert_eq!(token.attribute("client_id"), Some("web"));

    // The outbound call carried the identifier, the token-type hint, and
    // the client credentials.
    let request = String::from_utf8_lossy(&rx.recv().unwrap()).to_string();
    assert!(request.contains("token=valid-access-token"));
    assert!(request.contains("token_type_hint=access_token"));
    assert!(request
        .lines()
        .any(|line| line.to_ascii_lowercase().starts_with("authorization: basic ")));
}

#[test]
fn test_inactive_response_is_absent() {
    let (endpoint, _rx) = serve_once("200 OK", r#"{"active":false}"#.to_string());
    let store = store_for(endpoint);
    let ctx = RequestContext::new("GET", Utc::now());

    assert!(store.read(&ctx, "revoked-token").unwrap().is_none());
}

#[test]
fn test_non_success_status_is_absent() {
    let (endpoint, _rx) = serve_once("403 Forbidden", r#"{"error":"access_denied"}"#.to_string());
    let store = store_for(endpoint);
    let ctx = RequestContext::new("GET", Utc::now());

    assert!(store.read(&ctx, "some-token").unwrap().is_none());
}

#[test]
fn test_undecodable_body_is_a_hard_error() {
    let (endpoint, _rx) = serve_once("200 OK", "certainly not json".to_string());
    let store = store_for(endpoint);
    let ctx = RequestContext::new("GET", Utc::now());

    let err = store.read(&ctx, "some-token").unwrap_err();
    assert!(err.is_dependency_failure());
}

#[test]
fn test_active_response_missing_subject_is_a_hard_error() {
    let (endpoint, _rx) = serve_once("200 OK", r#"{"active":true,"exp":4102444800}"#.to_string());
    let store = store_for(endpoint);
    let ctx = RequestContext::new("GET", Utc::now());

    let err = store.read(&ctx, "some-token").unwrap_err();
    assert!(err.is_dependency_failure());
}

#[test]
fn test_stale_active_response_is_absent() {
    // The authority says active but the expiry is already behind us.
    let (endpoint, _rx) =
        serve_once("200 OK", r#"{"active":true,"exp":946684800,"sub":"alice"}"#.to_string());
    let store = store_for(endpoint);
    let ctx = RequestContext::new("GET", Utc::now());

    assert!(store.read(&ctx, "some-token").unwrap().is_none());
}

#[test]
fn test_unreachable_authority_is_a_hard_error() {
    let store = store_for(dead_endpoint());
    let ctx = RequestContext::new("GET", Utc::now());

    let err = store.read(&ctx, "some-token").unwrap_err();
    assert!(err.is_dependency_failure());
}

#[test]
fn test_implausible_identifiers_never_reach_the_network() {
    // Reading through a dead endpoint distinguishes the two paths: a
    // network attempt would error, the validation path yields absent.
    let store = store_for(dead_endpoint());
    let ctx = RequestContext::new("GET", Utc::now());

    assert!(store.read(&ctx, "").unwrap().is_none());
    assert!(store.read(&ctx, &"x".repeat(1025)).unwrap().is_none());
    assert!(store.read(&ctx, "line\nbreak").unwrap().is_none());
    assert!(store.read(&ctx, "tab\there").unwrap().is_none());
    assert!(store.read(&ctx, "ünïcödé").unwrap().is_none());
    assert!(store.read(&ctx, "\x7f").unwrap().is_none());
}

#[test]
fn test_create_and_revoke_are_unsupported() {
    let store = store_for(dead_endpoint());
    let ctx = RequestContext::new("POST", Utc::now());

    let err = store
        .create(&ctx, Token::new("alice", Utc::now() + Duration::minutes(10)))
        .unwrap_err();
    assert!(matches!(err, StoreError::Unsupported { .. }));

    // Even a perfectly well-formed identifier cannot be revoked here.
    let err = store.revoke(&ctx, "valid-looking-token").unwrap_err();
    assert!(matches!(err, StoreError::Unsupported { .. }));
}
