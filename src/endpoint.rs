//! Endpoint registry: candidate service addresses and their health.
//!
//! The registry owns every known endpoint and decides which one the next
//! exchange should use. Selection is strict priority order: the
//! earliest-listed endpoint that is not marked failed wins. When an endpoint
//! fails to accept connections the dispatcher marks it failed and the
//! registry excludes it until either an optional cool-down elapses or
//! [`EndpointRegistry::reset`] re-admits it. When every endpoint is failed,
//! selection reports [`Fault::NoServerAvailable`] instead of handing out a
//! dead address.

use std::time::{Duration, Instant};

use url::Url;

use crate::fault::{Fault, Result};

/// Health state of a single endpoint.
///
/// `Untested → Active` on first selection, `Active → Error` on connection
/// failure, `Error → Untested` on re-admission. At most one endpoint is
/// `Active` at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointStatus {
    /// Known but never selected (or re-admitted after a failure).
    Untested,
    /// The current candidate for exchanges.
    Active,
    /// Failed to accept a connection; excluded from selection.
    Error,
}

impl EndpointStatus {
    /// Lowercase name, as used in logs and introspection replies.
    pub fn as_str(&self) -> &'static str {
        match self {
            EndpointStatus::Untested => "untested",
            EndpointStatus::Active => "active",
            EndpointStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for EndpointStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One network address candidate for reaching the service.
#[derive(Debug)]
pub struct Endpoint {
    uri: Url,
    status: EndpointStatus,
    last_success: Option<Instant>,
    failed_at: Option<Instant>,
}

impl Endpoint {
    fn new(uri: Url) -> Self {
        Self {
            uri,
            status: EndpointStatus::Untested,
            last_success: None,
            failed_at: None,
        }
    }

    /// The endpoint's address.
    pub fn uri(&self) -> &Url {
        &self.uri
    }

    /// Current health state.
    pub fn status(&self) -> EndpointStatus {
        self.status
    }

    /// When this endpoint last served a successful exchange.
    pub fn last_success(&self) -> Option<Instant> {
        self.last_success
    }
}

/// The registry's current pick, detached from the registry's borrow.
///
/// `slot` is the endpoint's position in declared priority order; it is the
/// handle used to report the outcome of the exchange back to the registry.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// Position of the endpoint in the registry.
    pub slot: usize,
    /// The endpoint's address.
    pub uri: Url,
}

/// Point-in-time view of one endpoint, for observability.
#[derive(Debug, Clone)]
pub struct EndpointSnapshot {
    /// The endpoint's address.
    pub uri: Url,
    /// Health state at snapshot time.
    pub status: EndpointStatus,
    /// When the endpoint last served a successful exchange.
    pub last_success: Option<Instant>,
}

/// Ordered set of endpoints with per-endpoint health.
///
/// Insertion order is failover priority: selection always returns the
/// earliest endpoint not marked [`EndpointStatus::Error`]. A failed endpoint
/// re-enters selection when the configured cool-down has elapsed since the
/// failure, or when [`EndpointRegistry::reset`] is called; with no cool-down
/// configured, `reset` is the only way back in. A re-admitted endpoint
/// regains its declared priority over later ones.
#[derive(Debug)]
pub struct EndpointRegistry {
    endpoints: Vec<Endpoint>,
    cool_down: Option<Duration>,
}

impl EndpointRegistry {
    /// Creates a registry over `uris` in declared priority order.
    pub fn new(uris: Vec<Url>, cool_down: Option<Duration>) -> Self {
        tracing::debug!(endpoints = uris.len(), "initializing endpoint registry");
        for uri in &uris {
            tracing::debug!(endpoint = %uri, "registered endpoint");
        }
        Self {
            endpoints: uris.into_iter().map(Endpoint::new).collect(),
            cool_down,
        }
    }

    /// Number of known endpoints.
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// Returns `true` if no endpoints are registered.
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Returns the current candidate: the highest-priority endpoint not
    /// marked failed.
    ///
    /// The selected endpoint transitions to [`EndpointStatus::Active`]; any
    /// other endpoint still marked active is demoted to `Untested`, so at
    /// most one endpoint is active at a time.
    ///
    /// # Errors
    ///
    /// [`Fault::NoServerAvailable`] when every endpoint is marked failed and
    /// none qualifies for cool-down re-admission.
    pub fn active(&mut self) -> Result<Candidate> {
        if let Some(slot) = self.select() {
            return Ok(Candidate {
                slot,
                uri: self.endpoints[slot].uri.clone(),
            });
        }
        if self.readmit_cooled_down() {
            if let Some(slot) = self.select() {
                return Ok(Candidate {
                    slot,
                    uri: self.endpoints[slot].uri.clone(),
                });
            }
        }
        Err(Fault::NoServerAvailable {
            tried: self.endpoints.len(),
        })
    }

    fn select(&mut self) -> Option<usize> {
        let slot = self
            .endpoints
            .iter()
            .position(|e| e.status != EndpointStatus::Error)?;
        for (i, endpoint) in self.endpoints.iter_mut().enumerate() {
            if i != slot && endpoint.status == EndpointStatus::Active {
                endpoint.status = EndpointStatus::Untested;
            }
        }
        self.endpoints[slot].status = EndpointStatus::Active;
        Some(slot)
    }

    fn readmit_cooled_down(&mut self) -> bool {
        let Some(cool_down) = self.cool_down else {
            return false;
        };
        let mut readmitted = false;
        for endpoint in &mut self.endpoints {
            let cooled = endpoint
                .failed_at
                .is_some_and(|failed_at| failed_at.elapsed() >= cool_down);
            if endpoint.status == EndpointStatus::Error && cooled {
                endpoint.status = EndpointStatus::Untested;
                endpoint.failed_at = None;
                readmitted = true;
                tracing::debug!(endpoint = %endpoint.uri, "cool-down elapsed; endpoint re-admitted");
            }
        }
        readmitted
    }

    /// Marks the endpoint in `slot` as failed, excluding it from selection.
    pub fn mark_failed(&mut self, slot: usize) {
        let Some(endpoint) = self.endpoints.get_mut(slot) else {
            return;
        };
        endpoint.status = EndpointStatus::Error;
        endpoint.failed_at = Some(Instant::now());
        tracing::warn!(endpoint = %endpoint.uri, "endpoint marked failed");
    }

    /// Records a successful exchange on the endpoint in `slot`.
    ///
    /// Observability only: the timestamp feeds snapshots and introspection,
    /// never selection.
    pub fn record_success(&mut self, slot: usize) {
        if let Some(endpoint) = self.endpoints.get_mut(slot) {
            endpoint.last_success = Some(Instant::now());
        }
    }

    /// Re-admits every failed endpoint, restoring declared priority order.
    pub fn reset(&mut self) {
        for endpoint in &mut self.endpoints {
            if endpoint.status == EndpointStatus::Error {
                endpoint.status = EndpointStatus::Untested;
                endpoint.failed_at = None;
            }
        }
    }

    /// The endpoints in declared priority order.
    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    /// A point-in-time copy of every endpoint's state.
    pub fn snapshot(&self) -> Vec<EndpointSnapshot> {
        self.endpoints
            .iter()
            .map(|e| EndpointSnapshot {
                uri: e.uri.clone(),
                status: e.status,
                last_success: e.last_success,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(uris: &[&str], cool_down: Option<Duration>) -> EndpointRegistry {
        EndpointRegistry::new(
            uris.iter().map(|u| Url::parse(u).unwrap()).collect(),
            cool_down,
        )
    }

    #[test]
    fn first_selection_activates_the_first_endpoint() {
        let mut reg = registry(&["http://a.example/", "http://b.example/"], None);
        let candidate = reg.active().unwrap();
        assert_eq!(candidate.slot, 0);
        assert_eq!(candidate.uri.as_str(), "http://a.example/");
        assert_eq!(reg.endpoints()[0].status(), EndpointStatus::Active);
        assert_eq!(reg.endpoints()[1].status(), EndpointStatus::Untested);
    }

    #[test]
    fn failure_moves_selection_to_the_next_in_priority_order() {
        let mut reg = registry(&["http://a.example/", "http://b.example/"], None);
        let first = reg.active().unwrap();
        reg.mark_failed(first.slot);

        let second = reg.active().unwrap();
        assert_eq!(second.slot, 1);
        assert_eq!(reg.endpoints()[0].status(), EndpointStatus::Error);
        assert_eq!(reg.endpoints()[1].status(), EndpointStatus::Active);
    }

    #[test]
    fn exhaustion_reports_no_server_available() {
        let mut reg = registry(&["http://a.example/", "http://b.example/"], None);
        for _ in 0..2 {
            let candidate = reg.active().unwrap();
            reg.mark_failed(candidate.slot);
        }
        match reg.active() {
            Err(Fault::NoServerAvailable { tried }) => assert_eq!(tried, 2),
            other => panic!("expected NoServerAvailable, got {other:?}"),
        }
    }

    #[test]
    fn empty_registry_reports_no_server_available() {
        let mut reg = registry(&[], None);
        assert!(matches!(
            reg.active(),
            Err(Fault::NoServerAvailable { tried: 0 })
        ));
    }

    #[test]
    fn at_most_one_endpoint_is_active() {
        let mut reg = registry(
            &["http://a.example/", "http://b.example/", "http://c.example/"],
            None,
        );
        let first = reg.active().unwrap();
        reg.mark_failed(first.slot);
        reg.active().unwrap();
        reg.reset();
        // After reset, the first endpoint regains priority and must be the
        // only active one.
        let candidate = reg.active().unwrap();
        assert_eq!(candidate.slot, 0);
        let active = reg
            .endpoints()
            .iter()
            .filter(|e| e.status() == EndpointStatus::Active)
            .count();
        assert_eq!(active, 1);
    }

    #[test]
    fn cool_down_readmits_failed_endpoints() {
        let mut reg = registry(&["http://a.example/"], Some(Duration::ZERO));
        let candidate = reg.active().unwrap();
        reg.mark_failed(candidate.slot);
        // Zero cool-down: the endpoint qualifies for re-admission on the
        // very next selection.
        let candidate = reg.active().unwrap();
        assert_eq!(candidate.slot, 0);
        assert_eq!(reg.endpoints()[0].status(), EndpointStatus::Active);
    }

    #[test]
    fn without_cool_down_failed_endpoints_stay_out() {
        let mut reg = registry(&["http://a.example/"], None);
        let candidate = reg.active().unwrap();
        reg.mark_failed(candidate.slot);
        assert!(matches!(reg.active(), Err(Fault::NoServerAvailable { .. })));
        reg.reset();
        assert!(reg.active().is_ok());
    }

    #[test]
    fn record_success_is_observability_only() {
        let mut reg = registry(&["http://a.example/", "http://b.example/"], None);
        let candidate = reg.active().unwrap();
        reg.record_success(candidate.slot);

        let snapshot = reg.snapshot();
        assert!(snapshot[0].last_success.is_some());
        assert!(snapshot[1].last_success.is_none());
        // Selection is unchanged by the success record.
        assert_eq!(reg.active().unwrap().slot, 0);
    }
}
