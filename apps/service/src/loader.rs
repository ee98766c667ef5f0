//! Turns stored monitor definitions into endpoints and hands them to the
//! manager.

use checks::{ChecksManager, Endpoint, ValidationError};
use tracing::{info, warn};

use crate::config::{MonitorDefinition, NumberOrText};

impl MonitorDefinition {
    /// Build an endpoint, validating every field the same way the setters do.
    pub fn to_endpoint(&self) -> Result<Endpoint, ValidationError> {
        let mut endpoint = Endpoint::new(self.slug.as_str())?;
        endpoint
            .set_name(self.name.as_str())
            .set_scheme(&self.scheme)?
            .set_server(&self.server)?
            .set_path(&self.path)
            .set_frequency(self.frequency)?;

        match &self.port {
            NumberOrText::Number(port) => endpoint.set_port(*port)?,
            NumberOrText::Text(port) => endpoint.set_port(port.as_str())?,
        };
        match &self.verb {
            NumberOrText::Number(code) => endpoint.set_verb(*code)?,
            NumberOrText::Text(name) => endpoint.set_verb(name.as_str())?,
        };

        endpoint.extend_headers(self.headers.iter().map(|h| (h.key.as_str(), h.value.as_str())))?;
        if let Some(payload) = &self.payload {
            endpoint.set_payload(payload.as_str());
        }

        Ok(endpoint)
    }
}

/// Endpoints for every enabled monitor. Invalid definitions are logged and
/// skipped so one bad entry does not keep the rest from being checked.
pub fn load_endpoints(monitors: &[MonitorDefinition]) -> Vec<Endpoint> {
    monitors
        .iter()
        .filter(|monitor| monitor.enabled)
        .filter_map(|monitor| match monitor.to_endpoint() {
            Ok(endpoint) => Some(endpoint),
            Err(e) => {
                warn!("Skipping monitor {:?}: {}", monitor.slug, e);
                None
            }
        })
        .collect()
}

/// Replace whatever the manager is checking with `monitors`.
///
/// The running pool is joined before the queue is cleared so no worker can
/// put a stale endpoint back afterwards. Returns the number of endpoints
/// enqueued.
pub async fn reload(
    manager: &mut ChecksManager,
    monitors: &[MonitorDefinition],
    threads: usize,
) -> usize {
    manager.stop(true).await;
    let dropped = manager.clear();
    if dropped > 0 {
        info!("Dropped {} queued endpoints", dropped);
    }

    let endpoints = load_endpoints(monitors);
    let loaded = endpoints.len();
    manager.enqueue_all(endpoints);
    manager.start(threads);

    info!("Loaded {} of {} monitors", loaded, monitors.len());
    loaded
}
