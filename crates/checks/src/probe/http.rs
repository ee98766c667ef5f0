//! HTTP probing.

use std::error::Error as StdError;
use std::time::{Duration, Instant};

use chrono::Utc;
use reqwest::header::{
    AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, COOKIE, HeaderName, LOCATION, PROXY_AUTHORIZATION,
    WWW_AUTHENTICATE,
};
use reqwest::{Method, StatusCode, redirect};
use thiserror::Error;
use tracing::debug;
use url::Url;

use super::types::ProbeResult;
use crate::endpoint::Endpoint;
use crate::error::{Result, ValidationError};

/// Performs a check against an endpoint.
///
/// Implementations never fail: anything that prevents a response from being
/// received is reported through a failed [`ProbeResult`].
#[async_trait::async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, endpoint: &Endpoint) -> ProbeResult;
}

#[derive(Debug, Error)]
enum ProbeError {
    #[error("{}", describe(.0))]
    Request(#[from] reqwest::Error),

    #[error(transparent)]
    Endpoint(#[from] ValidationError),

    #[error("Exceeded {0} redirects")]
    TooManyRedirects(usize),

    #[error("Invalid redirect location {0:?}")]
    Redirect(String),
}

/// Flatten an error and its sources into one line.
fn describe(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

struct Received {
    status: u16,
    ttfb: Duration,
    body: String,
}

/// HTTP/HTTPS prober
///
/// Redirects are followed here rather than by the client so that the time
/// spent on every hop can be added to the time to first byte.
pub struct HttpProber {
    client: reqwest::Client,
    max_redirects: usize,
}

impl HttpProber {
    pub fn new(timeout: Duration, user_agent: &str, max_redirects: usize) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .redirect(redirect::Policy::none())
            .build()?;

        Ok(Self { client, max_redirects })
    }

    async fn send(&self, endpoint: &Endpoint) -> std::result::Result<Received, ProbeError> {
        let mut url = endpoint.request_url()?;
        let mut method = Method::from(endpoint.verb());
        let mut payload = endpoint.payload().map(str::to_owned);
        let mut headers = endpoint.headers().to_vec();
        let mut ttfb = Duration::ZERO;
        let mut redirects = 0;

        loop {
            let mut request = self.client.request(method.clone(), url.clone());
            for (key, value) in &headers {
                request = request.header(key.as_str(), value.as_str());
            }
            if let Some(payload) = &payload {
                request = request.body(payload.clone());
            }

            let hop_start = Instant::now();
            let response = request.send().await?;
            ttfb += hop_start.elapsed();

            let status = response.status();
            if status.is_redirection() {
                if let Some(location) = response.headers().get(LOCATION) {
                    if redirects == self.max_redirects {
                        return Err(ProbeError::TooManyRedirects(self.max_redirects));
                    }
                    redirects += 1;

                    let next = next_location(&url, location)?;
                    if !same_origin(&url, &next) {
                        remove_headers(&mut headers, &CREDENTIAL_HEADERS);
                    }
                    url = next;
                    if switches_to_get(status, &method) {
                        method = Method::GET;
                        payload = None;
                        remove_headers(&mut headers, &BODY_HEADERS);
                    }
                    debug!("Following redirect {} for {} to {}", redirects, endpoint.slug(), url);
                    continue;
                }
            }

            let body = response.text().await?;
            return Ok(Received { status: status.as_u16(), ttfb, body });
        }
    }
}

fn next_location(
    current: &Url,
    location: &reqwest::header::HeaderValue,
) -> std::result::Result<Url, ProbeError> {
    let raw = location.to_str().map_err(|_| ProbeError::Redirect(format!("{location:?}")))?;
    current.join(raw).map_err(|_| ProbeError::Redirect(raw.to_string()))
}

/// Never forwarded to another origin.
const CREDENTIAL_HEADERS: [HeaderName; 4] =
    [AUTHORIZATION, COOKIE, PROXY_AUTHORIZATION, WWW_AUTHENTICATE];

/// Describe a body that is no longer sent once a redirect switches to GET.
const BODY_HEADERS: [HeaderName; 2] = [CONTENT_TYPE, CONTENT_LENGTH];

fn same_origin(current: &Url, next: &Url) -> bool {
    current.scheme() == next.scheme()
        && current.host_str() == next.host_str()
        && current.port_or_known_default() == next.port_or_known_default()
}

fn remove_headers(headers: &mut Vec<(String, String)>, names: &[HeaderName]) {
    headers.retain(|(key, _)| !names.iter().any(|name| key.eq_ignore_ascii_case(name.as_str())));
}

/// 303 always becomes a GET, 301 and 302 only for POST requests.
fn switches_to_get(status: StatusCode, method: &Method) -> bool {
    match status {
        StatusCode::SEE_OTHER => *method != Method::GET,
        StatusCode::MOVED_PERMANENTLY | StatusCode::FOUND => *method == Method::POST,
        _ => false,
    }
}

#[async_trait::async_trait]
impl Prober for HttpProber {
    async fn probe(&self, endpoint: &Endpoint) -> ProbeResult {
        let started_at = Utc::now();
        let start = Instant::now();

        let outcome = self.send(endpoint).await;
        let elapsed = start.elapsed();

        match outcome {
            Ok(received) => ProbeResult::completed(
                started_at,
                received.status,
                received.ttfb,
                elapsed,
                received.body,
            ),
            Err(e) => ProbeResult::failed(started_at, elapsed, e.to_string()),
        }
    }
}
