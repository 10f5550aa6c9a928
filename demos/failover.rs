//! Example demonstrating transparent endpoint failover.
//!
//! This example shows how to:
//! - Configure several endpoints in failover priority order
//! - Observe endpoint health through `__endpoints` and `Client::endpoints`
//! - Handle registry exhaustion (`NoServerAvailable`)
//! - Re-admit failed endpoints with `reset_endpoints`
//!
//! Run with: `cargo run --example failover`

use serde_json::{json, Value};
use soapline::{CallArgs, Client, EnvelopeEngine, Fault};
use std::time::Duration;

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
    tracing_subscriber::fmt()
        .with_env_filter("soapline=debug,failover=info")
        .init();

    // None of these endpoints is reachable, so every call walks the whole
    // priority list. A short connect timeout bounds each dead attempt.
    let client = Client::builder()
        .endpoints([
            "http://localhost:18081/soap",
            "http://localhost:18082/soap",
            "http://localhost:18083/soap",
        ])?
        .functions(["string sayHello(string $who, int $times)"])
        .engine(XmlEngine)
        .connect_timeout(Duration::from_secs(1))
        .build()?;

    println!("=== Endpoint Health Before ===");
    let reply = client.call("__endpoints", CallArgs::positional([])).await?;
    println!("{}", reply.body);
    println!();

    println!("=== Calling Through the Failover Loop ===");
    let result = client
        .call(
            "sayHello",
            CallArgs::positional([json!("world"), json!(1)]),
        )
        .await;

    match result {
        Ok(reply) => {
            println!("Succeeded on attempt {}", reply.attempts);
            if reply.failed_over() {
                println!("(earlier endpoints were marked failed)");
            }
        }
        Err(Fault::NoServerAvailable { tried }) => {
            println!("All {tried} endpoints are down");
        }
        Err(fault) => println!("Call failed: {fault}"),
    }
    println!();

    println!("=== Endpoint Health After ===");
    for endpoint in client.endpoints() {
        println!("  {} -> {}", endpoint.uri, endpoint.status);
    }
    println!();

    println!("=== Re-admission ===");
    // Failed endpoints stay excluded until a configured cool-down elapses or
    // they are reset explicitly.
    client.reset_endpoints();
    for endpoint in client.endpoints() {
        println!("  {} -> {}", endpoint.uri, endpoint.status);
    }

    Ok(())
}
