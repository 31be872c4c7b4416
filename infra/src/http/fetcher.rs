use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use pv_core::errors::GatewayError;

use crate::InfrastructureError;

/// JSON request helper
///
/// A non-2xx status is a [`GatewayError::Rejected`] carrying the parsed
/// body, or the raw text as a JSON string when the body is not JSON. A 2xx
/// response whose body is not JSON (including an empty one) is a
/// [`GatewayError::Decode`]. Anything that prevents a response from arriving
/// is a [`GatewayError::Transport`].
#[derive(Debug, Clone)]
pub struct JsonFetcher {
    client: Client,
}

impl JsonFetcher {
    /// Create a fetcher
    ///
    /// # Arguments
    ///
    /// * `timeout` - Optional overall request timeout. `None` leaves requests
    ///   unbounded on the client side.
    pub fn new(timeout: Option<Duration>) -> Result<Self, InfrastructureError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    /// POST `body` as JSON and parse the JSON response
    pub async fn post_json<B>(&self, url: &str, body: &B) -> Result<Value, GatewayError>
    where
        B: Serialize + ?Sized,
    {
        self.execute(url, self.client.post(url).json(body)).await
    }

    /// GET and parse the JSON response
    pub async fn get_json(&self, url: &str) -> Result<Value, GatewayError> {
        self.execute(url, self.client.get(url)).await
    }

    async fn execute(&self, url: &str, request: RequestBuilder) -> Result<Value, GatewayError> {
        let response = request.send().await.map_err(|e| transport_error(url, &e))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| transport_error(url, &e))?;

        debug!(
            url = %url,
            status = status.as_u16(),
            body_len = text.len(),
            "Verification API responded"
        );

        let parsed = serde_json::from_str::<Value>(&text);
        if !status.is_success() {
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                body: parsed.unwrap_or(Value::String(text)),
            });
        }

        parsed.map_err(|e| GatewayError::decode(format!("{url} returned a non-JSON body: {e}")))
    }
}

fn transport_error(url: &str, error: &reqwest::Error) -> GatewayError {
    if error.is_timeout() {
        GatewayError::transport(format!("request to {url} timed out"))
    } else if error.is_connect() {
        GatewayError::transport(format!("cannot connect to {url}"))
    } else {
        GatewayError::transport(error.to_string())
    }
}
