//! The fault taxonomy for service calls.
//!
//! Everything that can go wrong in the call pipeline surfaces as a [`Fault`]:
//! a classified failure, distinct from the raw transport errors it wraps.
//! Protocol-level faults additionally carry a [`FaultCode`] mirroring the
//! wire convention (`Server` vs `Client.Input`), and faults produced during
//! an exchange identify the endpoint that caused them.

use http::StatusCode;
use url::Url;

/// Taxonomy code attached to protocol-level faults.
///
/// `Server` marks failures where the remote service replied but the reply was
/// unusable; `ClientInput` marks failures where no response was ever received
/// or the request could not be produced in the first place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultCode {
    /// The service was reached and responded, but the exchange still failed.
    Server,
    /// The exchange failed on this side, before any response existed.
    ClientInput,
}

impl FaultCode {
    /// The wire-convention spelling of the code.
    pub fn as_str(&self) -> &'static str {
        match self {
            FaultCode::Server => "Server",
            FaultCode::ClientInput => "Client.Input",
        }
    }
}

impl std::fmt::Display for FaultCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The main error type for service calls.
///
/// Faults preserve the context needed to debug a failed call: which endpoint
/// was involved, the HTTP status when one exists, and the underlying
/// transport error when there is one.
///
/// # Examples
///
/// ```no_run
/// use soapline::{CallArgs, Fault};
///
/// # async fn example(client: soapline::Client) {
/// match client.call("renameUser", CallArgs::positional([])).await {
///     Ok(reply) => println!("reply: {}", reply.body),
///     Err(Fault::UnknownFunction { name }) => {
///         eprintln!("{name} is not part of the service contract");
///     }
///     Err(Fault::NoServerAvailable { tried }) => {
///         eprintln!("all {tried} endpoints are down");
///     }
///     Err(e) => eprintln!("call failed ({:?}): {e}", e.code()),
/// }
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Fault {
    /// The operation name is not in the signature catalog.
    ///
    /// Surfaced immediately; no network exchange is attempted.
    #[error("unknown function: {name} is not in the service catalog")]
    UnknownFunction {
        /// The operation name the caller asked for.
        name: String,
    },

    /// The transport could not reach the endpoint at all.
    ///
    /// This is the failover signal: the dispatcher consumes it, marks the
    /// endpoint failed, and moves to the next candidate. It only escapes to
    /// callers that drive the transport directly.
    #[error("connection to {endpoint} failed: {source}")]
    ConnectFailure {
        /// The endpoint that could not be reached.
        endpoint: Url,
        /// The underlying connection error.
        #[source]
        source: reqwest::Error,
    },

    /// Every known endpoint is marked failed.
    #[error("no server available: all {tried} known endpoints failed")]
    NoServerAvailable {
        /// How many endpoints were considered.
        tried: usize,
    },

    /// The service answered with an error status and a body that is not a
    /// recognizable envelope (an HTML error page, a proxy banner, ...).
    ///
    /// Classified [`FaultCode::Server`].
    #[error("invalid response from {endpoint} (status {status}): body is not an envelope")]
    InvalidResponse {
        /// The endpoint that produced the response.
        endpoint: Url,
        /// The HTTP status of the response.
        status: StatusCode,
        /// The raw, unrecognizable body.
        body: String,
    },

    /// A response was received but the exchange still failed, e.g. the body
    /// stream broke mid-read.
    ///
    /// Classified [`FaultCode::Server`]: the service was reached, so the
    /// breakage is on its side of the wire.
    #[error("exchange with {endpoint} failed after a response arrived (status {status}): {source}")]
    ServerFault {
        /// The endpoint that produced the partial response.
        endpoint: Url,
        /// The HTTP status of the response that was received.
        status: StatusCode,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// The exchange failed before any response was received, e.g. a request
    /// timeout.
    ///
    /// Classified [`FaultCode::ClientInput`]. Unlike [`Fault::ConnectFailure`]
    /// the request may already have left this machine, so the dispatcher does
    /// not fail over to another endpoint.
    #[error("request to {endpoint} failed before any response arrived: {source}")]
    ClientFault {
        /// The endpoint the request was sent to.
        endpoint: Url,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// The envelope engine could not serialize the call.
    ///
    /// Classified [`FaultCode::ClientInput`].
    #[error("failed to encode envelope for {operation}: {detail}")]
    Envelope {
        /// The operation being encoded.
        operation: String,
        /// What the engine reported.
        detail: String,
    },

    /// A configured [`FaultConverter`] replaced another fault.
    ///
    /// The original fault is preserved as the source; the code is delegated
    /// to it.
    #[error("{message}")]
    Converted {
        /// The converter's description of the failure.
        message: String,
        /// The fault that was converted.
        #[source]
        source: Box<Fault>,
    },

    /// Invalid client configuration (missing endpoint, missing engine, bad
    /// header, ...).
    #[error("configuration error: {0}")]
    Config(String),

    /// An invalid URL was provided for an endpoint.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl Fault {
    /// Returns the taxonomy code for protocol-level faults.
    ///
    /// Faults raised before a transport exchange (unknown function,
    /// configuration problems, endpoint exhaustion) have no code.
    ///
    /// # Examples
    ///
    /// ```
    /// use soapline::{Fault, FaultCode};
    ///
    /// let fault = Fault::UnknownFunction { name: "frob".into() };
    /// assert_eq!(fault.code(), None);
    ///
    /// let fault = Fault::Envelope {
    ///     operation: "frob".into(),
    ///     detail: "unserializable argument".into(),
    /// };
    /// assert_eq!(fault.code(), Some(FaultCode::ClientInput));
    /// assert_eq!(fault.code().unwrap().as_str(), "Client.Input");
    /// ```
    pub fn code(&self) -> Option<FaultCode> {
        match self {
            Fault::InvalidResponse { .. } | Fault::ServerFault { .. } => Some(FaultCode::Server),
            Fault::ClientFault { .. } | Fault::Envelope { .. } => Some(FaultCode::ClientInput),
            Fault::Converted { source, .. } => source.code(),
            _ => None,
        }
    }

    /// Returns the HTTP status code if this fault carries one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Fault::InvalidResponse { status, .. } | Fault::ServerFault { status, .. } => {
                Some(*status)
            }
            Fault::Converted { source, .. } => source.status(),
            _ => None,
        }
    }

    /// Returns the endpoint involved in this fault, when one is known.
    pub fn endpoint(&self) -> Option<&Url> {
        match self {
            Fault::ConnectFailure { endpoint, .. }
            | Fault::InvalidResponse { endpoint, .. }
            | Fault::ServerFault { endpoint, .. }
            | Fault::ClientFault { endpoint, .. } => Some(endpoint),
            Fault::Converted { source, .. } => source.endpoint(),
            _ => None,
        }
    }

    /// Returns `true` for the internal failover signal.
    pub fn is_connect_failure(&self) -> bool {
        matches!(self, Fault::ConnectFailure { .. })
    }
}

/// Maps pipeline faults to domain-specific ones.
///
/// A converter configured on the client sees every fault surfaced to the
/// caller, exactly once, and its output replaces the original. Returning the
/// input unchanged is always valid; so is not configuring a converter at all.
///
/// # Examples
///
/// ```
/// use soapline::{Fault, FaultConverter};
///
/// struct BillingFaults;
///
/// impl FaultConverter for BillingFaults {
///     fn convert(&self, fault: Fault) -> Fault {
///         match fault {
///             Fault::UnknownFunction { name } => Fault::Converted {
///                 message: format!("billing API has no operation {name}"),
///                 source: Box::new(Fault::UnknownFunction { name }),
///             },
///             other => other,
///         }
///     }
/// }
/// ```
pub trait FaultConverter: Send + Sync {
    /// Converts one fault. Called at the dispatch boundary for every fault
    /// that is about to be surfaced.
    fn convert(&self, fault: Fault) -> Fault;
}

/// A specialized `Result` type for service calls.
pub type Result<T> = std::result::Result<T, Fault>;
