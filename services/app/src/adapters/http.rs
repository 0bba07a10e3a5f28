//! services/app/src/adapters/http.rs
//!
//! The shared HTTP transport every backend adapter is built on. One
//! `reqwest::Client` with a cookie store carries the session cookie across
//! all requests, which is the browser's `credentials: "include"`.

use std::time::Duration;

use learnx_core::ports::{PortError, PortResult};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// A handle on the backend: base URL plus the cookie-carrying client.
/// Cloning is cheap and shares the cookie store.
#[derive(Clone)]
pub struct Backend {
    base_url: String,
    client: Client,
}

impl Backend {
    /// Creates the transport. `timeout` bounds every request, including the
    /// initial identity resolution.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().cookie_store(true).timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends a request and maps the response status onto the port error
    /// taxonomy: 401 is `Unauthorized`, 404 is `NotFound`, any other non-2xx
    /// is an `Api` rejection carrying the backend's message.
    async fn execute(&self, request: RequestBuilder) -> PortResult<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| PortError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::UNAUTHORIZED {
            return Err(PortError::Unauthorized);
        }

        let message = read_error_message(response).await;
        if status == StatusCode::NOT_FOUND {
            return Err(PortError::NotFound(message));
        }
        Err(PortError::Api {
            status: status.as_u16(),
            message,
        })
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> PortResult<T> {
        let response = self.execute(self.client.get(self.url(path))).await?;
        decode(response).await
    }

    /// Fetches a collection. The backend sometimes wraps lists in an object
    /// (`{"modules": [...]}`), and an outright unexpected shape degrades to
    /// an empty list with a warning rather than an error.
    pub async fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        nested_key: Option<&str>,
    ) -> PortResult<Vec<T>> {
        let response = self.execute(self.client.get(self.url(path))).await?;
        let body = response
            .text()
            .await
            .map_err(|e| PortError::Transport(e.to_string()))?;

        if let Ok(items) = serde_json::from_str::<Vec<T>>(&body) {
            return Ok(items);
        }
        if let Some(key) = nested_key {
            if let Ok(serde_json::Value::Object(mut map)) = serde_json::from_str(&body) {
                if let Some(value) = map.remove(key) {
                    if let Ok(items) = serde_json::from_value::<Vec<T>>(value) {
                        return Ok(items);
                    }
                }
            }
        }
        warn!(path, "unexpected collection shape; falling back to empty list");
        Ok(Vec::new())
    }

    pub async fn get_text(&self, path: &str) -> PortResult<String> {
        let response = self.execute(self.client.get(self.url(path))).await?;
        response
            .text()
            .await
            .map_err(|e| PortError::Transport(e.to_string()))
    }

    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> PortResult<T> {
        let response = self
            .execute(self.client.post(self.url(path)).json(body))
            .await?;
        decode(response).await
    }

    pub async fn post_unit<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> PortResult<()> {
        self.execute(self.client.post(self.url(path)).json(body))
            .await?;
        Ok(())
    }

    pub async fn post_empty(&self, path: &str) -> PortResult<()> {
        self.execute(self.client.post(self.url(path))).await?;
        Ok(())
    }

    pub async fn post_multipart(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> PortResult<()> {
        self.execute(self.client.post(self.url(path)).multipart(form))
            .await?;
        Ok(())
    }

    pub async fn patch_unit<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> PortResult<()> {
        self.execute(self.client.patch(self.url(path)).json(body))
            .await?;
        Ok(())
    }

    pub async fn delete_unit(&self, path: &str) -> PortResult<()> {
        self.execute(self.client.delete(self.url(path))).await?;
        Ok(())
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> PortResult<T> {
    response
        .json::<T>()
        .await
        .map_err(|e| PortError::Unexpected(format!("failed to decode response: {}", e)))
}

/// The backend reports failures as `{"error": "..."}`; fall back to the raw
/// body when it does not.
async fn read_error_message(response: Response) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: String,
    }

    match response.text().await {
        Ok(text) => match serde_json::from_str::<ErrorBody>(&text) {
            Ok(body) => body.error,
            Err(_) => text,
        },
        Err(_) => String::new(),
    }
}
