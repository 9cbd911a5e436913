//! HTTP session for control plane communication.

use std::time::Duration;

use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::config::{Config, Credentials};
use crate::error::{ApplicationError, CliError, DecodeError};
use crate::ucp_error::parse_ucp_error;

/// Status and body of a completed request.
#[derive(Debug)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

/// Authenticated session against one API endpoint.
#[derive(Debug, Clone)]
pub struct Session {
    client: reqwest::Client,
    base_url: String,
    identity: Option<String>,
}

impl Session {
    /// Create a session for `base_url`, attaching `token` to every request.
    pub fn connect(config: &Config, base_url: &str, token: Option<&str>) -> Result<Self, CliError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(token) = token {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", token))
                    .context("Invalid token format")?,
            );
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(config.insecure)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            identity: None,
        })
    }

    /// Create a UCP session from stored credentials.
    ///
    /// There is no anonymous fallback: missing credentials are an error.
    pub fn from_credentials(
        config: &Config,
        credentials: Option<&Credentials>,
    ) -> Result<Self, CliError> {
        let creds = credentials.ok_or(CliError::NotAuthenticated)?;
        let mut session = Self::connect(config, &config.ucp_url, Some(creds.token.as_str()))?;
        session.identity = creds.username.clone();
        Ok(session)
    }

    /// Attach the account name this session acts as.
    pub fn with_identity(mut self, identity: impl Into<String>) -> Self {
        self.identity = Some(identity.into());
        self
    }

    /// Account name this session acts as, if known.
    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    /// Build a URL for an endpoint.
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Issue a request and return the raw status and body.
    ///
    /// Only transport failures are errors here; the body is not inspected.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&serde_json::Value>,
    ) -> Result<RawResponse, CliError> {
        let url = self.url(path);
        debug!(method = method.as_str(), %url, "Sending request");

        let mut request = self.client.request(method, &url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?.to_vec();
        debug!(status = status.as_u16(), bytes = body.len(), "Received response");

        Ok(RawResponse { status, body })
    }

    /// Make a GET request.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, CliError> {
        self.get_with_query(path, &[]).await
    }

    /// Make a GET request with query parameters.
    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, CliError> {
        let response = self.send(Method::GET, path, query, None).await?;
        handle_response(path, response)
    }

    /// Make a POST request with a JSON body.
    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, CliError> {
        let body = serde_json::to_value(body).context("Failed to encode request body")?;
        let response = self.send(Method::POST, path, &[], Some(&body)).await?;
        handle_response(path, response)
    }
}

/// Turn a raw response into a typed value or a classified failure.
fn handle_response<T: DeserializeOwned>(path: &str, response: RawResponse) -> Result<T, CliError> {
    let status = response.status;

    match parse_ucp_error(&response.body) {
        Ok(Some(error)) => return Err(classify(status, Some(error), path)),
        Ok(None) | Err(_) if !status.is_success() => return Err(classify(status, None, path)),
        Ok(None) => {}
        Err(err) => return Err(err.into()),
    }

    serde_json::from_slice(&response.body)
        .map_err(|source| DecodeError::new(format!("response from {}", path), source).into())
}

fn classify(status: StatusCode, error: Option<ApplicationError>, path: &str) -> CliError {
    match status {
        StatusCode::UNAUTHORIZED => CliError::NotAuthenticated,
        StatusCode::NOT_FOUND => {
            CliError::NotFound(error.map_or_else(|| path.to_string(), |e| e.message))
        }
        _ => {
            let error = error.unwrap_or_else(|| {
                ApplicationError::new(format!(
                    "unexpected status {} from {}",
                    status.as_u16(),
                    path
                ))
            });
            CliError::application(status.as_u16(), error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(status: u16, body: &str) -> RawResponse {
        RawResponse {
            status: StatusCode::from_u16(status).unwrap(),
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn test_url_building() {
        let config = Config::default();
        let session = Session::connect(&config, "https://ucp.example.com/", None).unwrap();
        assert_eq!(session.url("/services"), "https://ucp.example.com/services");
    }

    #[test]
    fn missing_credentials_are_not_authenticated() {
        let err = Session::from_credentials(&Config::default(), None).unwrap_err();
        assert!(matches!(err, CliError::NotAuthenticated));
    }

    #[test]
    fn envelope_on_success_status_is_application_error() {
        let err = handle_response::<serde_json::Value>(
            "/services/web",
            raw(200, r#"{"message":"access denied"}"#),
        )
        .unwrap_err();
        match err {
            CliError::Application { status, error } => {
                assert_eq!(status, 200);
                assert_eq!(error.message, "access denied");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn not_found_wins_over_undecodable_body() {
        let err = handle_response::<serde_json::Value>("/services/x", raw(404, "page not found"))
            .unwrap_err();
        assert!(matches!(err, CliError::NotFound(ref path) if path == "/services/x"));
    }

    #[test]
    fn server_error_without_envelope_is_application_error() {
        let err = handle_response::<serde_json::Value>("/nodes", raw(500, "")).unwrap_err();
        assert!(matches!(err, CliError::Application { status: 500, .. }));
    }

    #[test]
    fn unauthorized_maps_to_not_authenticated() {
        let err = handle_response::<serde_json::Value>(
            "/services",
            raw(401, r#"{"errors":[{"code":"UNAUTHORIZED","message":"bad token"}]}"#),
        )
        .unwrap_err();
        assert!(matches!(err, CliError::NotAuthenticated));
    }

    #[test]
    fn schema_mismatch_is_decode_error() {
        let err = handle_response::<Vec<String>>("/services", raw(200, r#"{"ID":"abc"}"#))
            .unwrap_err();
        assert!(matches!(err, CliError::Decode(_)));
    }
}
