use crate::core::config::RateEndpointConfig;
use crate::core::currency::{CurrencyRateProvider, RateAttempt, is_usable_rate};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

/// One public USD→NPR endpoint and the JSON pointer to its rate.
pub struct HttpRateProvider {
    url: String,
    pointer: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl HttpRateProvider {
    pub fn new(endpoint: &RateEndpointConfig, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("nprtrack/1.0")
            .build()?;
        Ok(HttpRateProvider {
            url: endpoint.url.clone(),
            pointer: endpoint.pointer.clone(),
            timeout,
            client,
        })
    }

    async fn fetch(&self) -> Result<f64> {
        debug!("Requesting currency rate from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {}", e))?;

        if !response.status().is_success() {
            return Err(anyhow!("HTTP error: {}", response.status()));
        }

        let text = response.text().await?;
        let body: Value = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse JSON response: {}", e))?;

        extract_rate(&body, &self.pointer)
    }
}

/// Reads a positive finite number at `pointer`. Numeric strings are accepted.
pub fn extract_rate(body: &Value, pointer: &str) -> Result<f64> {
    let node = body
        .pointer(pointer)
        .ok_or_else(|| anyhow!("No rate found at {}", pointer))?;

    let value = match node {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .ok_or_else(|| anyhow!("Non-numeric rate at {}: {}", pointer, node))?;

    if !is_usable_rate(value) {
        return Err(anyhow!("Unusable rate at {}: {}", pointer, value));
    }
    Ok(value)
}

#[async_trait]
impl CurrencyRateProvider for HttpRateProvider {
    fn name(&self) -> &str {
        &self.url
    }

    #[instrument(name = "RateFetch", skip(self), fields(url = %self.url))]
    async fn attempt(&self) -> RateAttempt {
        match self.fetch().await {
            Ok(rate) => RateAttempt::Rate(rate),
            Err(e) => RateAttempt::Fail(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer, route: &str, pointer: &str) -> HttpRateProvider {
        let endpoint = RateEndpointConfig {
            url: format!("{}{}", server.uri(), route),
            pointer: pointer.to_string(),
        };
        HttpRateProvider::new(&endpoint, Duration::from_millis(300)).unwrap()
    }

    #[tokio::test]
    async fn test_successful_rate_fetch() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/convert"))
            .and(query_param("from", "USD"))
            .and(query_param("to", "NPR"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"{"info":{"rate":132.5}}"#),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = provider(&mock_server, "/convert?from=USD&to=NPR", "/info/rate");
        assert_eq!(provider.attempt().await, RateAttempt::Rate(132.5));
    }

    #[tokio::test]
    async fn test_server_error_fails_attempt() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/latest"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = provider(&mock_server, "/latest", "/rates/NPR");
        match provider.attempt().await {
            RateAttempt::Fail(reason) => {
                assert_eq!(reason, "HTTP error: 500 Internal Server Error")
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_fails_attempt() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>rate limited</html>"))
            .mount(&mock_server)
            .await;

        let provider = provider(&mock_server, "/latest", "/rates/NPR");
        match provider.attempt().await {
            RateAttempt::Fail(reason) => assert!(reason.contains("Failed to parse JSON response")),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_timeout_fails_attempt() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"rates":{"NPR":131.0}}"#)
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&mock_server)
            .await;

        let provider = provider(&mock_server, "/latest", "/rates/NPR");
        match provider.attempt().await {
            RateAttempt::Fail(reason) => assert!(reason.starts_with("Request error")),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn test_extract_rate_accepts_numbers_and_numeric_strings() {
        assert_eq!(
            extract_rate(&json!({"rates": {"NPR": 131.0}}), "/rates/NPR").unwrap(),
            131.0
        );
        assert_eq!(
            extract_rate(&json!({"info": {"rate": "132.25"}}), "/info/rate").unwrap(),
            132.25
        );
    }

    #[test]
    fn test_extract_rate_rejects_missing_and_unusable_values() {
        let cases = [
            (json!({"info": {}}), "No rate found at /info/rate"),
            (json!({"info": {"rate": null}}), "Non-numeric rate at /info/rate"),
            (json!({"info": {"rate": "abc"}}), "Non-numeric rate at /info/rate"),
            (json!({"info": {"rate": 0}}), "Unusable rate at /info/rate"),
            (json!({"info": {"rate": -131.0}}), "Unusable rate at /info/rate"),
        ];
        for (body, expected) in cases {
            let err = extract_rate(&body, "/info/rate").unwrap_err().to_string();
            assert!(err.starts_with(expected), "{err} should start with {expected}");
        }
    }
}
