use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;

use assert_matches::assert_matches;

use simple_shapes_dataset::app::{ProgressEvent, ProgressSink};
use simple_shapes_dataset::domain::{Variant, VariantDescriptor};
use simple_shapes_dataset::error::ShapesError;
use simple_shapes_dataset::fetch::{Fetcher, HttpFetcher};

struct NullSink;

impl ProgressSink for NullSink {
    fn event(&self, _event: ProgressEvent) {}
}

/// One-shot loopback server: answers a single request with canned bytes and
/// closes the connection.
fn serve_once(response: Vec<u8>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let mut request = [0u8; 4096];
            let _ = stream.read(&mut request);
            let _ = stream.write_all(&response);
            let _ = stream.flush();
        }
    });
    format!("http://{addr}/simple_shapes_dataset.tar.gz")
}

fn descriptor(url: String) -> VariantDescriptor {
    VariantDescriptor {
        variant: Variant::Full,
        url,
        expected_bytes: None,
    }
}

fn http_response(status_line: &str, body: &[u8], content_length: usize) -> Vec<u8> {
    let mut response = format!(
        "HTTP/1.1 {status_line}\r\nContent-Length: {content_length}\r\nConnection: close\r\n\r\n"
    )
    .into_bytes();
    response.extend_from_slice(body);
    response
}

#[test]
fn streams_body_to_destination() {
    let body = b"gzip bytes would go here";
    let url = serve_once(http_response("200 OK", body, body.len()));

    let temp = tempfile::tempdir().unwrap();
    let destination = temp.path().join("simple_shapes_dataset.tar.gz");
    let fetcher = HttpFetcher::new().unwrap();

    let outcome = fetcher
        .fetch(&descriptor(url), &destination, &NullSink)
        .unwrap();

    assert_eq!(outcome.bytes_transferred, body.len() as u64);
    assert_eq!(outcome.total_bytes, Some(body.len() as u64));
    assert_eq!(std::fs::read(&destination).unwrap(), body);
}

#[test]
fn non_success_status_removes_destination() {
    let url = serve_once(http_response("404 Not Found", b"gone", 4));

    let temp = tempfile::tempdir().unwrap();
    let destination = temp.path().join("simple_shapes_dataset.tar.gz");
    let fetcher = HttpFetcher::new().unwrap();

    let err = fetcher
        .fetch(&descriptor(url), &destination, &NullSink)
        .unwrap_err();

    assert_matches!(err, ShapesError::HttpStatus { status: 404, .. });
    assert!(!destination.exists());
}

#[test]
fn truncated_body_fails_and_removes_destination() {
    // Declares 100 bytes, sends 10, closes.
    let url = serve_once(http_response("200 OK", b"only10byte", 100));

    let temp = tempfile::tempdir().unwrap();
    let destination = temp.path().join("simple_shapes_dataset.tar.gz");
    let fetcher = HttpFetcher::new().unwrap();

    let err = fetcher
        .fetch(&descriptor(url), &destination, &NullSink)
        .unwrap_err();

    assert_matches!(
        err,
        ShapesError::Http(_) | ShapesError::TruncatedDownload { .. }
    );
    assert!(!destination.exists());
}

#[test]
fn connection_refused_is_a_network_error() {
    // Bind then drop, so nothing listens on the port.
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let temp = tempfile::tempdir().unwrap();
    let destination = temp.path().join("simple_shapes_dataset.tar.gz");
    let fetcher = HttpFetcher::new().unwrap();

    let err = fetcher
        .fetch(
            &descriptor(format!("http://{addr}/archive.tar.gz")),
            &destination,
            &NullSink,
        )
        .unwrap_err();

    assert_matches!(err, ShapesError::Http(_));
    assert!(!destination.exists());
}
