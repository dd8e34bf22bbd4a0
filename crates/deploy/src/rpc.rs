//! Shared RPC utilities for interacting with Ethereum JSON-RPC endpoints.

use std::time::Duration;

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

/// Default timeout for RPC requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Create an HTTP client configured for JSON-RPC requests.
pub fn create_client(timeout: Duration) -> Result<reqwest::Client, anyhow::Error> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .context("Failed to create HTTP client")
}

/// Make a JSON-RPC call and deserialize the result.
///
/// # Arguments
/// * `client` - The HTTP client to use
/// * `url` - The RPC endpoint URL
/// * `method` - The RPC method name
/// * `params` - The method parameters
///
/// # Returns
/// The deserialized result, or an error if the request failed or returned an error response.
pub async fn json_rpc_call<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &Url,
    method: &str,
    params: Vec<Value>,
) -> Result<T, anyhow::Error> {
    let response = client
        .post(url.clone())
        .json(&serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        }))
        .send()
        .await
        .with_context(|| format!("Failed to send {} request to {}", method, url))?;

    let result: Value = response
        .json()
        .await
        .with_context(|| format!("Failed to parse {} response", method))?;

    parse_response(method, result)
}

/// Extract the `result` of a JSON-RPC response, turning `error` objects into errors.
fn parse_response<T: DeserializeOwned>(method: &str, response: Value) -> Result<T, anyhow::Error> {
    if let Some(error) = response.get("error") {
        anyhow::bail!(
            "RPC error from {}: {}",
            method,
            error
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown")
        );
    }

    let result_value = response
        .get("result")
        .context("No result in response")?
        .clone();

    serde_json::from_value(result_value)
        .with_context(|| format!("Failed to deserialize {} result", method))
}

/// Poll `check_fn` until it yields a value.
///
/// `Ok(None)` means "not yet" and triggers another attempt after `interval`.
/// Errors are returned immediately.
///
/// # Returns
/// The first value produced, or an error after `timeout`.
pub async fn poll_until<T, F, Fut>(
    name: &str,
    timeout: Duration,
    interval: Duration,
    check_fn: F,
) -> Result<T, anyhow::Error>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<Option<T>, anyhow::Error>>,
{
    let start = std::time::Instant::now();

    loop {
        if let Some(value) = check_fn().await? {
            return Ok(value);
        }

        if start.elapsed() > timeout {
            anyhow::bail!("Timeout waiting for {} after {:?}", name, timeout);
        }

        tracing::trace!(target_name = %name, "Not ready yet, polling again...");

        tokio::time::sleep(interval).await;
    }
}

/// Parse a hex quantity (`0x`-prefixed) as returned by Ethereum JSON-RPC.
pub fn parse_quantity(value: &str) -> Result<u64, anyhow::Error> {
    u64::from_str_radix(value.trim_start_matches("0x"), 16)
        .with_context(|| format!("Invalid hex quantity: {}", value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_parse_response_result() {
        let accounts: Vec<String> = parse_response(
            "eth_accounts",
            json!({ "jsonrpc": "2.0", "id": 1, "result": ["0x01", "0x02"] }),
        )
        .unwrap();
        assert_eq!(accounts, vec!["0x01", "0x02"]);
    }

    #[test]
    fn test_parse_response_null_result() {
        let receipt: Option<Value> = parse_response(
            "eth_getTransactionReceipt",
            json!({ "jsonrpc": "2.0", "id": 1, "result": null }),
        )
        .unwrap();
        assert!(receipt.is_none());
    }

    #[test]
    fn test_parse_response_error() {
        let err = parse_response::<Value>(
            "eth_sendTransaction",
            json!({ "jsonrpc": "2.0", "id": 1, "error": { "code": -32000, "message": "insufficient funds" } }),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "RPC error from eth_sendTransaction: insufficient funds");
    }

    #[test]
    fn test_parse_response_missing_result() {
        assert!(parse_response::<Value>("eth_accounts", json!({ "jsonrpc": "2.0", "id": 1 })).is_err());
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("0x0").unwrap(), 0);
        assert_eq!(parse_quantity("0x7a1200").unwrap(), 8_000_000);
        assert!(parse_quantity("0xzz").is_err());
    }

    #[tokio::test]
    async fn test_poll_until_returns_first_value() {
        let attempts = AtomicUsize::new(0);

        let value = poll_until("value", Duration::from_secs(5), Duration::from_millis(1), || {
            let attempt = attempts.fetch_add(1, Ordering::SeqCst);
            async move { Ok((attempt >= 2).then_some(attempt)) }
        })
        .await
        .unwrap();

        assert_eq!(value, 2);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_poll_until_propagates_errors() {
        let attempts = AtomicUsize::new(0);

        let result: Result<(), _> =
            poll_until("value", Duration::from_secs(5), Duration::from_millis(1), || {
                attempts.fetch_add(1, Ordering::SeqCst);
                async { anyhow::bail!("connection refused") }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_poll_until_times_out() {
        let result: Result<(), _> =
            poll_until("receipt", Duration::from_millis(10), Duration::from_millis(2), || async {
                Ok(None)
            })
            .await;

        assert!(result.unwrap_err().to_string().contains("Timeout waiting for receipt"));
    }
}
