//! The `Endpoint` value object.

use std::time::Duration;

use reqwest::header::{HeaderName, HeaderValue};
use serde::Serialize;
use url::Url;

use super::verb::HttpVerb;
use crate::error::ValidationError;

pub const DEFAULT_SCHEME: &str = "https";
pub const DEFAULT_SERVER: &str = "localhost";
pub const DEFAULT_PORT: u16 = 443;
pub const DEFAULT_FREQUENCY_SECS: u64 = 10;

/// Values that can be coerced into a TCP port.
pub trait IntoPort {
    fn into_port(self) -> Result<u16, ValidationError>;
}

fn port_in_range(value: i64, raw: impl ToString) -> Result<u16, ValidationError> {
    u16::try_from(value)
        .ok()
        .filter(|port| *port != 0)
        .ok_or_else(|| ValidationError::Port(raw.to_string()))
}

macro_rules! impl_into_port {
    ($($ty:ty),*) => {
        $(
            impl IntoPort for $ty {
                fn into_port(self) -> Result<u16, ValidationError> {
                    let value = i64::try_from(self)
                        .map_err(|_| ValidationError::Port(self.to_string()))?;
                    port_in_range(value, self)
                }
            }
        )*
    };
}

impl_into_port!(u16, u32, u64, i32, i64, usize);

impl IntoPort for &str {
    fn into_port(self) -> Result<u16, ValidationError> {
        let value: i64 = self.trim().parse().map_err(|_| ValidationError::Port(self.to_string()))?;
        port_in_range(value, self)
    }
}

impl IntoPort for String {
    fn into_port(self) -> Result<u16, ValidationError> {
        self.as_str().into_port()
    }
}

/// A single HTTP target to be probed periodically.
///
/// An endpoint is built from its slug with sane defaults and then configured
/// through validated setters:
///
/// ```rust
/// use checks::{Endpoint, HttpVerb};
///
/// let mut endpoint = Endpoint::new("status-page")?;
/// endpoint
///     .set_server("status.example.com")?
///     .set_port("8443")?
///     .set_path("/health")
///     .set_verb(HttpVerb::Post)?
///     .header("Content-Type", "application/json")?;
/// assert_eq!(endpoint.url(), "https://status.example.com:8443/health");
/// # Ok::<(), checks::ValidationError>(())
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct Endpoint {
    slug: String,
    name: String,
    scheme: String,
    server: String,
    port: u16,
    path: String,
    verb: HttpVerb,
    headers: Vec<(String, String)>,
    payload: Option<String>,
    frequency: u64,
}

impl Endpoint {
    /// Create an endpoint identified by `slug`.
    pub fn new(slug: impl Into<String>) -> Result<Self, ValidationError> {
        let slug = slug.into();
        if slug.trim().is_empty() {
            return Err(ValidationError::Slug);
        }

        Ok(Self {
            name: slug.clone(),
            slug,
            scheme: DEFAULT_SCHEME.to_string(),
            server: DEFAULT_SERVER.to_string(),
            port: DEFAULT_PORT,
            path: String::new(),
            verb: HttpVerb::default(),
            headers: Vec::new(),
            payload: None,
            frequency: DEFAULT_FREQUENCY_SECS,
        })
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// Display name, the slug unless one was set
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = name.into();
        self
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Set the URI scheme. A trailing `://` is accepted and stripped.
    pub fn set_scheme(&mut self, scheme: &str) -> Result<&mut Self, ValidationError> {
        let normalized = scheme.trim().trim_end_matches("://").to_ascii_lowercase();
        match normalized.as_str() {
            "http" | "https" => {
                self.scheme = normalized;
                Ok(self)
            }
            _ => Err(ValidationError::Scheme(scheme.to_string())),
        }
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    /// Set the server, either a domain name or an IP address.
    pub fn set_server(&mut self, server: &str) -> Result<&mut Self, ValidationError> {
        let server = server.trim();
        if server.is_empty() || server.contains(['/', ' ']) {
            return Err(ValidationError::Server);
        }
        self.server = server.to_string();
        Ok(self)
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn set_port(&mut self, port: impl IntoPort) -> Result<&mut Self, ValidationError> {
        self.port = port.into_port()?;
        Ok(self)
    }

    /// Resource path, without its leading slash.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn set_path(&mut self, path: &str) -> &mut Self {
        self.path = path.trim_start_matches('/').to_string();
        self
    }

    pub fn verb(&self) -> HttpVerb {
        self.verb
    }

    /// Set the verb from a name (`"POST"`), a code (`2_i64`) or an `HttpVerb`.
    ///
    /// On error the current verb is kept.
    pub fn set_verb<V>(&mut self, verb: V) -> Result<&mut Self, ValidationError>
    where
        V: TryInto<HttpVerb>,
        ValidationError: From<V::Error>,
    {
        self.verb = verb.try_into()?;
        Ok(self)
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Append a header. Existing headers with the same key are kept.
    pub fn header(&mut self, key: &str, value: &str) -> Result<&mut Self, ValidationError> {
        validate_header(key, value)?;
        self.headers.push((key.to_string(), value.to_string()));
        Ok(self)
    }

    /// Append several headers in order. Nothing is appended if any pair is invalid.
    pub fn extend_headers<I, K, V>(&mut self, pairs: I) -> Result<&mut Self, ValidationError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let pairs: Vec<(String, String)> =
            pairs.into_iter().map(|(key, value)| (key.into(), value.into())).collect();
        for (key, value) in &pairs {
            validate_header(key, value)?;
        }
        self.headers.extend(pairs);
        Ok(self)
    }

    pub fn payload(&self) -> Option<&str> {
        self.payload.as_deref()
    }

    pub fn set_payload(&mut self, payload: impl Into<String>) -> &mut Self {
        self.payload = Some(payload.into());
        self
    }

    /// Minimum number of seconds between the start of two checks.
    ///
    /// A check takes `frequency` plus the response time of the endpoint: with
    /// a 10 second frequency and a 1 second response, the endpoint is checked
    /// at most once every 11 seconds.
    pub fn frequency(&self) -> u64 {
        self.frequency
    }

    pub fn frequency_duration(&self) -> Duration {
        Duration::from_secs(self.frequency)
    }

    pub fn set_frequency(&mut self, seconds: u64) -> Result<&mut Self, ValidationError> {
        if seconds == 0 {
            return Err(ValidationError::Frequency(seconds.to_string()));
        }
        self.frequency = seconds;
        Ok(self)
    }

    /// `scheme://server:port/path`
    pub fn url(&self) -> String {
        format!("{}://{}:{}/{}", self.scheme, self.server, self.port, self.path)
    }

    /// The request URL, parsed.
    pub fn request_url(&self) -> Result<Url, ValidationError> {
        Url::parse(&self.url()).map_err(|e| ValidationError::Url(e.to_string()))
    }
}

fn validate_header(key: &str, value: &str) -> Result<(), ValidationError> {
    HeaderName::from_bytes(key.as_bytes())
        .map_err(|_| ValidationError::HeaderName(key.to_string()))?;
    HeaderValue::from_str(value).map_err(|_| ValidationError::HeaderValue(key.to_string()))?;
    Ok(())
}
