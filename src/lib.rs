//! # Soapline - a failover-aware SOAP-style service client
//!
//! Soapline invokes operations on a remote service described by a
//! machine-readable interface contract, over HTTP via `reqwest`. It validates
//! each operation against a signature catalog, normalizes named arguments
//! into declared order, transmits the envelope to one of several candidate
//! endpoints (failing over transparently on connection failure), and
//! translates everything that can go wrong into one stable [`Fault`]
//! taxonomy.
//!
//! Envelope serialization is deliberately not part of this crate: a pluggable
//! [`EnvelopeEngine`] builds request bodies and recognizes response
//! envelopes, and the client only transports them.
//!
//! ## Quick Start
//!
//! ```no_run
//! use soapline::{CallArgs, Client, EnvelopeEngine, SoapVersion};
//! use serde_json::{json, Value};
//!
//! /// A minimal engine; real ones build proper SOAP envelopes.
//! struct XmlEngine;
//!
//! impl EnvelopeEngine for XmlEngine {
//!     fn encode(&self, operation: &str, args: &[Value]) -> soapline::Result<String> {
//!         let args = args
//!             .iter()
//!             .map(|a| format!("<arg>{a}</arg>"))
//!             .collect::<String>();
//!         Ok(format!("<{operation}>{args}</{operation}>"))
//!     }
//!
//!     fn can_decode(&self, body: &str) -> bool {
//!         body.trim_start().starts_with('<')
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> soapline::Result<()> {
//!     // Endpoints in failover priority order; the contract's raw signature
//!     // strings come from an external WSDL-fetching collaborator.
//!     let client = Client::builder()
//!         .endpoint("https://svc.example/soap")?
//!         .endpoint("https://svc-backup.example/soap")?
//!         .functions(["string sayHello(string $who, int $times)"])
//!         .engine(XmlEngine)
//!         .version(SoapVersion::Soap11)
//!         .build()?;
//!
//!     // Named arguments are reordered into the declared parameter order.
//!     let reply = client
//!         .call("sayHello", CallArgs::named([
//!             ("times", json!(2)),
//!             ("who", json!("world")),
//!         ]))
//!         .await?;
//!
//!     println!("reply: {}", reply.body);
//!     println!("served by {:?} in {:?}", reply.endpoint, reply.latency);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Catalog-checked calls** - Operation names are validated against the
//!   contract's signatures before anything touches the network
//! - **Argument normalization** - Named arguments are reordered into declared
//!   parameter order; undeclared keys are dropped with a warning, never an error
//! - **Transparent failover** - Connection failures mark the endpoint dead and
//!   move to the next candidate in priority order, bounded by the endpoint count
//! - **Version-specific framing** - SOAP 1.1 and 1.2 content types, with the
//!   `SOAPAction` header on 1.1 only
//! - **Stable fault taxonomy** - One [`Fault`] enum distinguishes unknown
//!   operations, unreachable endpoints, broken replies, and exhausted registries
//! - **Pluggable fault conversion** - An optional [`FaultConverter`] maps
//!   pipeline faults to domain-specific ones at a single choke point
//! - **Introspection operations** - `__functions` and `__endpoints` answer from
//!   client state without a network exchange
//! - **Automatic logging** - Structured logging with `tracing` for observability
//!
//! ## Error Handling
//!
//! Every failure surfaces as a [`Fault`], with accessors for the taxonomy
//! code, HTTP status, and the endpoint involved:
//!
//! ```no_run
//! use soapline::{CallArgs, Fault};
//!
//! # async fn example(client: soapline::Client) {
//! match client.call("renameUser", CallArgs::positional([])).await {
//!     Ok(reply) => println!("ok: {}", reply.body),
//!     Err(Fault::UnknownFunction { name }) => {
//!         eprintln!("{name} is not in the service contract");
//!     }
//!     Err(Fault::NoServerAvailable { tried }) => {
//!         eprintln!("all {tried} endpoints are down");
//!     }
//!     Err(Fault::InvalidResponse { endpoint, status, body }) => {
//!         eprintln!("{endpoint} answered {status} with a non-envelope body:");
//!         eprintln!("  {body}");
//!     }
//!     Err(e) => eprintln!("call failed ({:?}): {e}", e.code()),
//! }
//! # }
//! ```
//!
//! ## Failover
//!
//! Endpoints are tried in the order they were configured. A connection
//! failure excludes the endpoint from selection; it re-enters either when an
//! optional cool-down elapses or when [`Client::reset_endpoints`] is called.
//! When every endpoint is excluded, calls fail fast with
//! [`Fault::NoServerAvailable`]:
//!
//! ```no_run
//! use soapline::{Client, SoapVersion};
//! use std::time::Duration;
//! # use serde_json::Value;
//! # struct Engine;
//! # impl soapline::EnvelopeEngine for Engine {
//! #     fn encode(&self, _: &str, _: &[Value]) -> soapline::Result<String> { Ok(String::new()) }
//! #     fn can_decode(&self, _: &str) -> bool { true }
//! # }
//!
//! # fn example() -> soapline::Result<()> {
//! let client = Client::builder()
//!     .endpoints([
//!         "https://svc-eu.example/soap",
//!         "https://svc-us.example/soap",
//!     ])?
//!     .functions(["int getServerTime()"])
//!     .engine(Engine)
//!     // Dead endpoints come back into rotation after a minute.
//!     .cool_down(Duration::from_secs(60))
//!     // Bound how long each dead endpoint can stall a call.
//!     .connect_timeout(Duration::from_secs(2))
//!     .build()?;
//! # Ok(())
//! # }
//! ```

mod args;
mod catalog;
mod client;
mod endpoint;
mod envelope;
mod fault;
mod reply;
mod transport;

pub use args::{normalize, CallArgs, Normalized};
pub use catalog::{Catalog, Signature};
pub use client::{Client, ClientBuilder};
pub use endpoint::{Candidate, Endpoint, EndpointRegistry, EndpointSnapshot, EndpointStatus};
pub use envelope::EnvelopeEngine;
pub use fault::{Fault, FaultCode, FaultConverter, Result};
pub use reply::Reply;
pub use transport::SoapVersion;
