//! The call dispatcher: the public entry point of the pipeline.
//!
//! [`Client`] ties the pieces together: it classifies each operation name as
//! introspection or remote, checks remote operations against the catalog,
//! normalizes arguments, has the envelope engine encode the body, and drives
//! the bounded failover loop over the endpoint registry. Every fault that
//! surfaces to the caller passes through the optional
//! [`FaultConverter`](crate::FaultConverter) exactly once.
//!
//! Use [`ClientBuilder`] to configure and create clients.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use url::Url;

use crate::args::{normalize, CallArgs};
use crate::catalog::Catalog;
use crate::endpoint::{EndpointRegistry, EndpointSnapshot};
use crate::envelope::EnvelopeEngine;
use crate::fault::{Fault, FaultConverter, Result};
use crate::reply::Reply;
use crate::transport::{SoapVersion, Transport};

/// Operations answered from client state, without the catalog or the network.
///
/// The set is fixed at compile time; the `__` prefix keeps it disjoint from
/// any name a service contract can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IntrospectionOp {
    /// `__functions`: the catalog's signatures, as a JSON array.
    Functions,
    /// `__endpoints`: every endpoint's address and health, as a JSON array.
    Endpoints,
}

/// Static classification of an operation name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dispatch {
    /// Answered locally.
    Introspection(IntrospectionOp),
    /// Goes through catalog, normalizer, and transport.
    Remote,
}

impl Dispatch {
    /// The compile-time lookup table: two introspection names, everything
    /// else is remote.
    fn of(operation: &str) -> Self {
        match operation {
            "__functions" => Dispatch::Introspection(IntrospectionOp::Functions),
            "__endpoints" => Dispatch::Introspection(IntrospectionOp::Endpoints),
            _ => Dispatch::Remote,
        }
    }
}

/// A failover-aware client for one remote service.
///
/// The client is built once, holds the signature catalog and endpoint
/// registry for its lifetime, and is cheap to clone; clones share the
/// registry, so a failover observed through one clone benefits the others.
///
/// # Examples
///
/// ```no_run
/// use soapline::{CallArgs, Client, EnvelopeEngine, SoapVersion};
/// use serde_json::{json, Value};
///
/// struct XmlEngine;
///
/// impl EnvelopeEngine for XmlEngine {
///     fn encode(&self, operation: &str, args: &[Value]) -> soapline::Result<String> {
///         Ok(format!("<{operation}>{}</{operation}>", args.len()))
///     }
///
///     fn can_decode(&self, body: &str) -> bool {
///         body.trim_start().starts_with('<')
///     }
/// }
///
/// # async fn example() -> soapline::Result<()> {
/// let client = Client::builder()
///     .endpoint("https://svc.example/soap")?
///     .endpoint("https://svc-backup.example/soap")?
///     .functions(["string sayHello(string $who, int $times)"])
///     .engine(XmlEngine)
///     .version(SoapVersion::Soap11)
///     .build()?;
///
/// let reply = client
///     .call("sayHello", CallArgs::named([("who", json!("world"))]))
///     .await?;
/// println!("reply: {}", reply.body);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    transport: Transport,
    catalog: Catalog,
    registry: Mutex<EndpointRegistry>,
    converter: Option<Box<dyn FaultConverter>>,
}

impl Client {
    /// Creates a new [`ClientBuilder`].
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Invokes one operation and returns its reply.
    ///
    /// Introspection operations (`__functions`, `__endpoints`) are answered
    /// locally. Remote operations are checked against the catalog, their
    /// arguments normalized into declared order, and the encoded envelope
    /// transmitted to the active endpoint; on connection failure the call
    /// transparently fails over to the next endpoint in priority order, at
    /// most once per known endpoint.
    ///
    /// # Errors
    ///
    /// One of the [`Fault`] taxonomy (see the crate docs), after passing
    /// through the configured converter if there is one.
    pub async fn call(&self, operation: &str, args: impl Into<CallArgs>) -> Result<Reply> {
        let args = args.into();
        tracing::debug!(
            operation = %operation,
            style = match &args {
                CallArgs::Positional(_) => "positional",
                CallArgs::Named(_) => "named",
            },
            "invoking operation"
        );
        let result = match Dispatch::of(operation) {
            Dispatch::Introspection(op) => Ok(self.introspect(op)),
            Dispatch::Remote => self.call_remote(operation, args).await,
        };
        result.map_err(|fault| self.translate(fault))
    }

    /// Answers an introspection operation from client state.
    fn introspect(&self, op: IntrospectionOp) -> Reply {
        let start = Instant::now();
        let body = match op {
            IntrospectionOp::Functions => {
                let mut signatures: Vec<_> = self.inner.catalog.signatures().collect();
                signatures.sort_by_key(|s| s.name().to_string());
                serde_json::to_string(&signatures).unwrap_or_else(|_| "[]".to_string())
            }
            IntrospectionOp::Endpoints => {
                let entries: Vec<_> = self
                    .registry()
                    .snapshot()
                    .into_iter()
                    .map(|s| {
                        serde_json::json!({
                            "uri": s.uri.as_str(),
                            "status": s.status.as_str(),
                        })
                    })
                    .collect();
                serde_json::to_string(&entries).unwrap_or_else(|_| "[]".to_string())
            }
        };
        Reply {
            body,
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            endpoint: None,
            attempts: 0,
            latency: start.elapsed(),
        }
    }

    /// The full remote pipeline: catalog, normalizer, envelope, failover loop.
    async fn call_remote(&self, operation: &str, args: CallArgs) -> Result<Reply> {
        let signature = self
            .inner
            .catalog
            .lookup(operation)
            .ok_or_else(|| Fault::UnknownFunction {
                name: operation.to_string(),
            })?;

        let normalized = normalize(signature, args);
        for key in &normalized.dropped {
            tracing::warn!(
                operation = %operation,
                argument = %key,
                "dropping argument not declared by the signature"
            );
        }

        let engine = self.inner.transport.engine();
        let body = engine.encode(operation, &normalized.values)?;
        let action = engine.action(operation);

        let start = Instant::now();
        let max_attempts = self.registry().len();
        // One attempt per known endpoint: every iteration either succeeds,
        // surfaces a fault, or consumes one endpoint via mark_failed, so the
        // loop cannot revisit a candidate within a single call.
        for attempt in 1..=max_attempts {
            let candidate = self.registry().active()?;
            match self
                .inner
                .transport
                .execute(&candidate.uri, &action, &body)
                .await
            {
                Ok(exchange) => {
                    self.registry().record_success(candidate.slot);
                    let latency = start.elapsed();
                    tracing::info!(
                        operation = %operation,
                        endpoint = %candidate.uri,
                        status = exchange.status.as_u16(),
                        attempts = attempt,
                        latency_ms = latency.as_millis(),
                        "call succeeded"
                    );
                    return Ok(Reply {
                        body: exchange.body,
                        status: exchange.status,
                        headers: exchange.headers,
                        endpoint: Some(candidate.uri),
                        attempts: attempt,
                        latency,
                    });
                }
                Err(Fault::ConnectFailure { endpoint, source }) => {
                    tracing::warn!(
                        operation = %operation,
                        endpoint = %endpoint,
                        error = %source,
                        attempt = attempt,
                        "endpoint unreachable; failing over"
                    );
                    self.registry().mark_failed(candidate.slot);
                }
                Err(fault) => return Err(fault),
            }
        }
        Err(Fault::NoServerAvailable {
            tried: max_attempts,
        })
    }

    /// The single choke point where the converter sees surfaced faults.
    fn translate(&self, fault: Fault) -> Fault {
        match &self.inner.converter {
            Some(converter) => converter.convert(fault),
            None => fault,
        }
    }

    // Registry state is a plain status vector; a panic elsewhere cannot make
    // it inconsistent, so a poisoned lock is recovered rather than propagated.
    fn registry(&self) -> MutexGuard<'_, EndpointRegistry> {
        self.inner
            .registry
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// The signature catalog this client validates operations against.
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// The protocol version exchanges are framed for.
    pub fn version(&self) -> SoapVersion {
        self.inner.transport.version()
    }

    /// A point-in-time view of every endpoint's health.
    pub fn endpoints(&self) -> Vec<EndpointSnapshot> {
        self.registry().snapshot()
    }

    /// Re-admits every failed endpoint, restoring declared priority order.
    pub fn reset_endpoints(&self) {
        self.registry().reset();
    }
}

/// Builder for configuring and creating a [`Client`].
///
/// At minimum an endpoint and an envelope engine are required; everything
/// else has a default.
///
/// # Examples
///
/// ```no_run
/// use soapline::{ClientBuilder, SoapVersion};
/// use std::time::Duration;
/// # use serde_json::Value;
/// # struct Engine;
/// # impl soapline::EnvelopeEngine for Engine {
/// #     fn encode(&self, _: &str, _: &[Value]) -> soapline::Result<String> { Ok(String::new()) }
/// #     fn can_decode(&self, _: &str) -> bool { true }
/// # }
///
/// # fn example() -> soapline::Result<()> {
/// let client = ClientBuilder::new()
///     .endpoints(["https://svc.example/soap", "https://svc-backup.example/soap"])?
///     .functions(["string sayHello(string $who)"])
///     .engine(Engine)
///     .version(SoapVersion::Soap12)
///     .timeout(Duration::from_secs(30))
///     .cool_down(Duration::from_secs(60))
///     .default_header("Authorization", "Bearer t0ken")?
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    endpoints: Vec<Url>,
    functions: Vec<String>,
    engine: Option<Arc<dyn EnvelopeEngine>>,
    version: SoapVersion,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    cool_down: Option<Duration>,
    default_headers: HeaderMap,
    converter: Option<Box<dyn FaultConverter>>,
}

impl ClientBuilder {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        Self {
            endpoints: Vec::new(),
            functions: Vec::new(),
            engine: None,
            version: SoapVersion::default(),
            timeout: None,
            connect_timeout: None,
            cool_down: None,
            default_headers: HeaderMap::new(),
            converter: None,
        }
    }

    /// Appends one candidate endpoint. Call order is failover priority.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn endpoint(mut self, url: impl AsRef<str>) -> Result<Self> {
        self.endpoints.push(Url::parse(url.as_ref())?);
        Ok(self)
    }

    /// Appends several candidate endpoints, in priority order.
    ///
    /// # Errors
    ///
    /// Returns an error if any URL is invalid.
    pub fn endpoints<I, S>(mut self, urls: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for url in urls {
            self.endpoints.push(Url::parse(url.as_ref())?);
        }
        Ok(self)
    }

    /// Supplies the raw signature strings of the service's interface
    /// contract; the catalog is built from them at [`build`](Self::build).
    pub fn functions<I, S>(mut self, raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.functions.extend(raw.into_iter().map(Into::into));
        self
    }

    /// Sets the envelope engine. Required.
    pub fn engine(mut self, engine: impl EnvelopeEngine + 'static) -> Self {
        self.engine = Some(Arc::new(engine));
        self
    }

    /// Sets the protocol version exchanges are framed for. Defaults to 1.1.
    pub fn version(mut self, version: SoapVersion) -> Self {
        self.version = version;
        self
    }

    /// Sets the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connect timeout on the underlying HTTP client.
    ///
    /// A connect timeout counts as a connection failure and triggers
    /// failover, so this bounds how long each dead endpoint can stall a call.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Re-admits failed endpoints after this duration.
    ///
    /// Without a cool-down, a failed endpoint stays excluded until
    /// [`Client::reset_endpoints`] is called.
    pub fn cool_down(mut self, cool_down: Duration) -> Self {
        self.cool_down = Some(cool_down);
        self
    }

    /// Adds a header included in every request, e.g. for authentication.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn default_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| Fault::Config(format!("invalid header name: {e}")))?;
        let value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| Fault::Config(format!("invalid header value: {e}")))?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// Sets the optional fault converter.
    ///
    /// When absent, faults propagate unchanged.
    pub fn fault_converter(mut self, converter: impl FaultConverter + 'static) -> Self {
        self.converter = Some(Box::new(converter));
        self
    }

    /// Builds the configured [`Client`].
    ///
    /// # Errors
    ///
    /// [`Fault::Config`] when no endpoint or no engine was provided, or when
    /// the underlying HTTP client cannot be constructed.
    pub fn build(self) -> Result<Client> {
        if self.endpoints.is_empty() {
            return Err(Fault::Config(
                "at least one endpoint is required".to_string(),
            ));
        }
        let engine = self
            .engine
            .ok_or_else(|| Fault::Config("an envelope engine is required".to_string()))?;

        let mut http = reqwest::Client::builder();
        if let Some(connect_timeout) = self.connect_timeout {
            http = http.connect_timeout(connect_timeout);
        }
        let http = http
            .build()
            .map_err(|e| Fault::Config(format!("failed to build HTTP client: {e}")))?;

        let catalog = Catalog::build(self.functions);
        let registry = EndpointRegistry::new(self.endpoints, self.cool_down);

        Ok(Client {
            inner: Arc::new(ClientInner {
                transport: Transport::new(
                    http,
                    self.version,
                    self.timeout,
                    self.default_headers,
                    engine,
                ),
                catalog,
                registry: Mutex::new(registry),
                converter: self.converter,
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    struct NullEngine;

    impl EnvelopeEngine for NullEngine {
        fn encode(&self, _operation: &str, _args: &[Value]) -> Result<String> {
            Ok(String::new())
        }

        fn can_decode(&self, _body: &str) -> bool {
            true
        }
    }

    #[test]
    fn dispatch_classification_is_static() {
        assert_eq!(
            Dispatch::of("__functions"),
            Dispatch::Introspection(IntrospectionOp::Functions)
        );
        assert_eq!(
            Dispatch::of("__endpoints"),
            Dispatch::Introspection(IntrospectionOp::Endpoints)
        );
        assert_eq!(Dispatch::of("sayHello"), Dispatch::Remote);
        // Near-misses stay remote.
        assert_eq!(Dispatch::of("__other"), Dispatch::Remote);
        assert_eq!(Dispatch::of("functions"), Dispatch::Remote);
    }

    #[test]
    fn build_requires_an_endpoint() {
        let result = ClientBuilder::new().engine(NullEngine).build();
        assert!(matches!(result, Err(Fault::Config(_))));
    }

    #[test]
    fn build_requires_an_engine() {
        let result = ClientBuilder::new()
            .endpoint("http://svc.example/soap")
            .unwrap()
            .build();
        assert!(matches!(result, Err(Fault::Config(_))));
    }

    #[test]
    fn invalid_endpoint_url_is_rejected_at_configuration() {
        let result = ClientBuilder::new().endpoint("not a url");
        assert!(matches!(result, Err(Fault::InvalidUrl(_))));
    }

    #[test]
    fn invalid_default_header_is_rejected_at_configuration() {
        let result = ClientBuilder::new().default_header("bad header\n", "x");
        assert!(matches!(result, Err(Fault::Config(_))));
    }
}
