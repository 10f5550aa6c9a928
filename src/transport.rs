//! One HTTP exchange against one endpoint, with version-specific framing.
//!
//! The transport owns everything about a single request/response round trip:
//! which method to use (dictated by the body), which framing headers the
//! protocol version requires, and how a failed exchange is classified into
//! the fault taxonomy. It knows nothing about failover; a connect-level
//! failure is reported as [`Fault::ConnectFailure`] for the dispatcher to
//! act on.

use std::sync::Arc;
use std::time::Duration;

use http::{HeaderMap, Method, StatusCode};
use url::Url;

use crate::envelope::EnvelopeEngine;
use crate::fault::{Fault, Result};

/// The protocol version an exchange is framed for.
///
/// The two versions differ only in framing: each has a fixed `Content-Type`,
/// and only 1.1 advertises the action in a `SOAPAction` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SoapVersion {
    /// SOAP 1.1: `text/xml; charset=utf-8` plus a quoted `SOAPAction` header.
    #[default]
    Soap11,
    /// SOAP 1.2: `application/soap+xml; charset=utf-8`, no action header.
    Soap12,
}

impl SoapVersion {
    /// The fixed `Content-Type` for this version.
    pub fn content_type(&self) -> &'static str {
        match self {
            SoapVersion::Soap11 => "text/xml; charset=utf-8",
            SoapVersion::Soap12 => "application/soap+xml; charset=utf-8",
        }
    }

    /// Whether this version carries a `SOAPAction` header.
    pub fn uses_action_header(&self) -> bool {
        matches!(self, SoapVersion::Soap11)
    }

    /// The version as written on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            SoapVersion::Soap11 => "1.1",
            SoapVersion::Soap12 => "1.2",
        }
    }
}

impl std::fmt::Display for SoapVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The raw outcome of one successful HTTP exchange.
///
/// "Successful" means a response arrived and its body was readable; the
/// status may still be an error as long as the body is a recognizable
/// envelope (a service fault is payload, not a transport failure).
#[derive(Debug, Clone)]
pub(crate) struct Exchange {
    /// The HTTP status of the response.
    pub status: StatusCode,
    /// The response headers.
    pub headers: HeaderMap,
    /// The response body, returned as-is for the envelope engine.
    pub body: String,
}

/// Executes single HTTP exchanges with version-specific framing.
pub(crate) struct Transport {
    http: reqwest::Client,
    version: SoapVersion,
    timeout: Option<Duration>,
    default_headers: HeaderMap,
    engine: Arc<dyn EnvelopeEngine>,
}

impl Transport {
    pub(crate) fn new(
        http: reqwest::Client,
        version: SoapVersion,
        timeout: Option<Duration>,
        default_headers: HeaderMap,
        engine: Arc<dyn EnvelopeEngine>,
    ) -> Self {
        Self {
            http,
            version,
            timeout,
            default_headers,
            engine,
        }
    }

    pub(crate) fn version(&self) -> SoapVersion {
        self.version
    }

    pub(crate) fn engine(&self) -> &dyn EnvelopeEngine {
        self.engine.as_ref()
    }

    /// Runs one exchange: `body` to `uri`, framed for the configured version.
    ///
    /// # Errors
    ///
    /// - [`Fault::ConnectFailure`] when the endpoint could not be reached at
    ///   all; the dispatcher consumes this and fails over.
    /// - [`Fault::ClientFault`] when sending failed without a response for
    ///   any other reason (request timeout, request construction).
    /// - [`Fault::ServerFault`] when a response arrived but its body could
    ///   not be read.
    /// - [`Fault::InvalidResponse`] when the status is an error (>= 400) and
    ///   the body is not a recognizable envelope.
    pub(crate) async fn execute(&self, uri: &Url, action: &str, body: &str) -> Result<Exchange> {
        let method = method_for(body);
        tracing::debug!(
            method = %method,
            endpoint = %uri,
            action = %action,
            version = %self.version,
            "executing exchange"
        );

        let mut request = self.http.request(method.clone(), uri.clone());
        for (name, value) in &self.default_headers {
            request = request.header(name, value);
        }
        request = request.header(http::header::CONTENT_TYPE, self.version.content_type());
        if self.version.uses_action_header() {
            request = request.header("SOAPAction", format!("\"{action}\""));
        }
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }
        if method == Method::POST {
            request = request.body(body.to_string());
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) if e.is_connect() => {
                return Err(Fault::ConnectFailure {
                    endpoint: uri.clone(),
                    source: e,
                });
            }
            Err(e) => {
                return Err(Fault::ClientFault {
                    endpoint: uri.clone(),
                    source: e,
                });
            }
        };

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await.map_err(|e| Fault::ServerFault {
            endpoint: uri.clone(),
            status,
            source: e,
        })?;

        tracing::debug!(
            status = status.as_u16(),
            endpoint = %uri,
            body_len = body.len(),
            "received response"
        );

        if status.as_u16() >= 400 && !self.engine.can_decode(&body) {
            return Err(Fault::InvalidResponse {
                endpoint: uri.clone(),
                status,
                body,
            });
        }

        Ok(Exchange {
            status,
            headers,
            body,
        })
    }
}

/// GET for an empty or all-whitespace body, POST otherwise.
fn method_for(body: &str) -> Method {
    if body.trim().is_empty() {
        Method::GET
    } else {
        Method::POST
    }
}
