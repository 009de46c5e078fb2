//! Shared HTTP plumbing for the Supabase REST APIs.

use std::time::Duration;

use biglabs_core::config::SupabaseConfig;
use biglabs_core::{BiglabsError, Result};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

/// HTTP client bound to one Supabase project.
#[derive(Clone)]
pub struct SupabaseHttp {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseHttp {
    /// Creates a client for the project described by `config`.
    ///
    /// # Errors
    ///
    /// Returns a config error if the HTTP client cannot be built.
    pub fn new(config: &SupabaseConfig, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BiglabsError::config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
        })
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Starts a request carrying the project key.
    ///
    /// Without a user token the anon key doubles as the bearer token.
    pub(crate) fn request(&self, method: Method, path: &str, bearer: Option<&str>) -> RequestBuilder {
        let token = bearer.unwrap_or(&self.anon_key);
        self.client
            .request(method, self.url(path))
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
    }

    /// Sends the request and decodes a JSON body.
    pub(crate) async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = Self::send(request).await?;
        response
            .json()
            .await
            .map_err(|e| BiglabsError::remote(None, format!("Invalid Supabase response: {e}")))
    }

    /// Sends the request and discards the body.
    pub(crate) async fn send_empty(&self, request: RequestBuilder) -> Result<()> {
        Self::send(request).await.map(|_| ())
    }

    async fn send(request: RequestBuilder) -> Result<reqwest::Response> {
        let response = request
            .send()
            .await
            .map_err(|e| BiglabsError::remote(None, format!("Supabase request failed: {e}")))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to read Supabase error body".to_string());
        Err(map_http_error(status, &body))
    }
}

/// Maps a failed Supabase response to a domain error.
///
/// Client errors become `Auth` errors carrying the service's message, which
/// is meant to be shown to the user ("Invalid login credentials").
pub(crate) fn map_http_error(status: StatusCode, body: &str) -> BiglabsError {
    let message = extract_error_message(body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string()
    });

    match status {
        StatusCode::BAD_REQUEST
        | StatusCode::UNAUTHORIZED
        | StatusCode::FORBIDDEN
        | StatusCode::UNPROCESSABLE_ENTITY => BiglabsError::auth(message),
        _ => BiglabsError::remote(Some(status.as_u16()), message),
    }
}

/// GoTrue and PostgREST use different error shapes; take the most specific field.
fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["error_description", "msg", "message", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
        .map(str::to_string)
}
