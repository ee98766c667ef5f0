//! Helpers shared by the integration tests

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};

use checks::Endpoint;
use wiremock::{MockServer, Request, Respond, ResponseTemplate};

/// Answers 200 and 500 in turn, starting with 200.
#[derive(Default)]
pub struct Alternating {
    calls: AtomicUsize,
}

impl Respond for Alternating {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        if self.calls.fetch_add(1, Ordering::SeqCst) % 2 == 0 {
            ResponseTemplate::new(200).set_body_string("ok")
        } else {
            ResponseTemplate::new(500).set_body_string("failing")
        }
    }
}

/// Endpoint pointing at `path` on a mock server
pub fn endpoint_for(server: &MockServer, slug: &str, path: &str) -> Endpoint {
    endpoint_at(*server.address(), slug, path)
}

pub fn endpoint_at(addr: SocketAddr, slug: &str, path: &str) -> Endpoint {
    let mut endpoint = Endpoint::new(slug).unwrap();
    endpoint
        .set_scheme("http")
        .unwrap()
        .set_server(&addr.ip().to_string())
        .unwrap()
        .set_port(addr.port())
        .unwrap()
        .set_path(path)
        .set_frequency(1)
        .unwrap();
    endpoint
}

/// Address of a loopback port nothing is listening on
pub fn closed_addr() -> SocketAddr {
    std::net::TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap()
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}
