//! The envelope seam: serialization is someone else's job.
//!
//! This crate transports envelopes; it never builds or parses them. An
//! [`EnvelopeEngine`] implementation supplied at client construction encodes
//! each call into the request body, names the action the framing headers
//! advertise, and recognizes whether a response body is an envelope at all
//! (which is what separates a service fault from an
//! [`InvalidResponse`](crate::Fault::InvalidResponse)).

use serde_json::Value;

use crate::fault::Result;

/// Builds request envelopes and recognizes response envelopes.
///
/// Implementations are configured on the
/// [`ClientBuilder`](crate::ClientBuilder) and consulted once per call.
///
/// # Examples
///
/// ```
/// use soapline::EnvelopeEngine;
/// use serde_json::Value;
///
/// /// A toy engine that sends arguments as a JSON array.
/// struct JsonEngine;
///
/// impl EnvelopeEngine for JsonEngine {
///     fn encode(&self, operation: &str, args: &[Value]) -> soapline::Result<String> {
///         Ok(serde_json::json!({ "op": operation, "args": args }).to_string())
///     }
///
///     fn can_decode(&self, body: &str) -> bool {
///         serde_json::from_str::<Value>(body).is_ok()
///     }
/// }
/// ```
pub trait EnvelopeEngine: Send + Sync {
    /// Serializes one call into the request body.
    ///
    /// An empty (or all-whitespace) body is legal and makes the transport
    /// send a bodyless GET instead of a POST.
    ///
    /// # Errors
    ///
    /// [`Fault::Envelope`](crate::Fault::Envelope) when the arguments cannot
    /// be serialized; the call is abandoned before any network exchange.
    fn encode(&self, operation: &str, args: &[Value]) -> Result<String>;

    /// The action string advertised in version-specific framing headers.
    ///
    /// Defaults to the operation name unchanged.
    fn action(&self, operation: &str) -> String {
        operation.to_string()
    }

    /// Whether `body` is an envelope this engine understands.
    ///
    /// Consulted for error-status responses only: a recognizable body is
    /// handed back to the caller as payload (a service fault envelope), an
    /// unrecognizable one becomes
    /// [`Fault::InvalidResponse`](crate::Fault::InvalidResponse).
    fn can_decode(&self, body: &str) -> bool;
}
