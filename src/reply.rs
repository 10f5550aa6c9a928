//! The success value of a call, with exchange metadata attached.
//!
//! A [`Reply`] carries the raw response body (envelope decoding belongs to
//! the external engine) along with what a caller needs for observability:
//! status, headers, which endpoint actually served the call, how many
//! failover attempts it took, and the total latency.

use std::time::Duration;

use http::{HeaderMap, StatusCode};
use url::Url;

/// A successful call outcome.
///
/// # Examples
///
/// ```no_run
/// use soapline::CallArgs;
/// use serde_json::json;
///
/// # async fn example(client: soapline::Client) -> soapline::Result<()> {
/// let reply = client
///     .call("sayHello", CallArgs::positional([json!("world")]))
///     .await?;
///
/// println!("body: {}", reply.body);
/// println!("served by: {:?}", reply.endpoint);
/// if reply.failed_over() {
///     println!("took {} attempts", reply.attempts);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Reply {
    /// The raw response body, returned as-is for the envelope engine.
    pub body: String,

    /// The HTTP status of the response.
    pub status: StatusCode,

    /// The response headers.
    pub headers: HeaderMap,

    /// The endpoint that served the call. `None` for introspection
    /// operations answered locally.
    pub endpoint: Option<Url>,

    /// How many endpoints were tried before this reply, including the one
    /// that served it. `0` for introspection operations.
    pub attempts: usize,

    /// Total call latency, including failed failover attempts.
    pub latency: Duration,
}

impl Reply {
    /// Returns `true` if the call only succeeded after failing over from at
    /// least one dead endpoint.
    pub fn failed_over(&self) -> bool {
        self.attempts > 1
    }

    /// Returns a response header value by name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn reply(attempts: usize) -> Reply {
        Reply {
            body: String::new(),
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            endpoint: None,
            attempts,
            latency: Duration::from_millis(5),
        }
    }

    #[test]
    fn failed_over_requires_more_than_one_attempt() {
        assert!(!reply(0).failed_over());
        assert!(!reply(1).failed_over());
        assert!(reply(3).failed_over());
    }

    #[test]
    fn header_lookup_is_by_name() {
        let mut r = reply(1);
        r.headers
            .insert("content-type", HeaderValue::from_static("text/xml"));
        assert_eq!(r.header("content-type"), Some("text/xml"));
        assert_eq!(r.header("x-missing"), None);
    }
}
