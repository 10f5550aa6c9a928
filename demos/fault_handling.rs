//! Example demonstrating the fault taxonomy and pluggable fault conversion.
//!
//! This example shows how to:
//! - Match on the fault taxonomy (`UnknownFunction`, `NoServerAvailable`, ...)
//! - Read the taxonomy code (`Server` vs `Client.Input`) off a fault
//! - Plug in a `FaultConverter` that maps pipeline faults to domain ones
//!
//! Run with: `cargo run --example fault_handling`

use serde_json::Value;
use soapline::{CallArgs, Client, EnvelopeEngine, Fault, FaultConverter};

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

/// Maps pipeline faults into the vocabulary of a billing domain.
struct BillingFaults;

impl FaultConverter for BillingFaults {
    fn convert(&self, fault: Fault) -> Fault {
        match fault {
            Fault::UnknownFunction { name } => Fault::Converted {
                message: format!("the billing API has no operation named {name}"),
                source: Box::new(Fault::UnknownFunction { name }),
            },
            Fault::NoServerAvailable { tried } => Fault::Converted {
                message: format!("billing is unreachable ({tried} endpoints down)"),
                source: Box::new(Fault::NoServerAvailable { tried }),
            },
            other => other,
        }
    }
}

#[tokio::main]
async fn main() -> soapline::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("soapline=debug,fault_handling=info")
        .init();

    let client = Client::builder()
        .endpoint("http://localhost:8080/soap")?
        .functions(["string chargeAccount(string $account, int $cents)"])
        .engine(XmlEngine)
        .fault_converter(BillingFaults)
        .build()?;

    println!("=== Unknown Operation ===");
    // The converter sees the fault before the caller does.
    match client.call("refundAccount", CallArgs::positional([])).await {
        Ok(_) => unreachable!("refundAccount is not in the catalog"),
        Err(Fault::Converted { message, source }) => {
            println!("Domain message: {message}");
            println!("Original fault: {source}");
        }
        Err(fault) => println!("Unconverted fault: {fault}"),
    }
    println!();

    println!("=== Taxonomy Codes ===");
    let invalid = Fault::InvalidResponse {
        endpoint: "http://svc.example/soap".parse().unwrap(),
        status: http::StatusCode::BAD_GATEWAY,
        body: "<html>proxy error</html>".into(),
    };
    println!("InvalidResponse carries code {:?}", invalid.code().unwrap());

    let envelope = Fault::Envelope {
        operation: "chargeAccount".into(),
        detail: "unserializable argument".into(),
    };
    println!("Envelope carries code {:?}", envelope.code().unwrap());

    Ok(())
}
