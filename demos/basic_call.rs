//! Basic example demonstrating a catalog-checked service call.
//!
//! This example shows how to:
//! - Implement a minimal envelope engine
//! - Build a client from endpoints and raw signature strings
//! - Inspect the catalog through the `__functions` introspection operation
//! - Make a call with named arguments
//!
//! Run with: `cargo run --example basic_call`

use serde_json::{json, Value};
use soapline::{CallArgs, Client, EnvelopeEngine, SoapVersion};

/// A toy XML engine; a real one would build proper SOAP envelopes.
struct XmlEngine;

impl EnvelopeEngine for XmlEngine {
    fn encode(&self, operation: &str, args: &[Value]) -> soapline::Result<String> {
        let args: String = args.iter().map(|a| format!("<arg>{a}</arg>")).collect();
        Ok(format!("<{operation}>{args}</{operation}>"))
    }

    fn can_decode(&self, body: &str) -> bool {
        body.trim_start().starts_with('<')
    }
}

#[tokio::main]
async fn main() -> soapline::Result<()> {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter("soapline=debug,basic_call=info")
        .init();

    // The raw signature strings would normally come from an external
    // WSDL-fetching collaborator.
    let client = Client::builder()
        .endpoint("http://localhost:8080/soap")?
        .functions([
            "string sayHello(string $who, int $times)",
            "int getServerTime()",
        ])
        .engine(XmlEngine)
        .version(SoapVersion::Soap11)
        .build()?;

    println!("=== Introspection Example ===");
    // `__functions` answers from the catalog without touching the network.
    let reply = client.call("__functions", CallArgs::positional([])).await?;
    println!("Known operations: {}", reply.body);
    println!();

    println!("=== Remote Call Example ===");
    // Named arguments are reordered into the declared parameter order; the
    // undeclared `color` is dropped with a warning.
    let result = client
        .call(
            "sayHello",
            CallArgs::named([
                ("times", json!(2)),
                ("who", json!("world")),
                ("color", json!("blue")),
            ]),
        )
        .await;

    match result {
        Ok(reply) => {
            println!("Reply body: {}", reply.body);
            println!("Status: {}", reply.status);
            println!("Served by: {:?}", reply.endpoint);
            println!("Latency: {:?}", reply.latency);
        }
        Err(fault) => {
            println!("Call failed: {fault}");
            println!("Taxonomy code: {:?}", fault.code());
        }
    }

    Ok(())
}
