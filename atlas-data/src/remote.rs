//! Optional pass-through to an external flag-evaluation service.
//!
//! Configured by `FLAG_SERVICE_URL` and (optionally) `FLAG_SERVICE_TOKEN`.
//! Default deployments run in demo mode and never construct this client;
//! when present, boolean evaluation posts to the service and falls back
//! to the local store value on any error.

use serde::{Deserialize, Serialize};

use crate::error::FlagError;

pub struct RemoteFlagClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

#[derive(Debug, Serialize)]
struct EvalRequest<'a> {
    flag_key: &'a str,
    user_key: &'a str,
    default: bool,
}

#[derive(Debug, Deserialize)]
struct EvalResponse {
    value: bool,
}

impl RemoteFlagClient {
    /// Build a client from the environment. `None` when no service URL
    /// is configured.
    pub fn from_env() -> Option<Self> {
        let base_url = std::env::var("FLAG_SERVICE_URL")
            .ok()
            .filter(|v| !v.is_empty())?;
        let token = std::env::var("FLAG_SERVICE_TOKEN")
            .ok()
            .filter(|v| !v.is_empty());
        Some(RemoteFlagClient {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Evaluate a boolean flag for a user against the remote service.
    pub async fn evaluate(
        &self,
        flag_key: &str,
        user_key: &str,
        default: bool,
    ) -> Result<bool, FlagError> {
        let mut request = self
            .http
            .post(format!("{}/evaluate", self.base_url))
            .json(&EvalRequest {
                flag_key,
                user_key,
                default,
            });
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?.error_for_status()?;
        let body: EvalResponse = response
            .json()
            .await
            .map_err(|e| FlagError::InvalidResponse(e.to_string()))?;
        Ok(body.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_env_without_url_returns_none() {
        // FLAG_SERVICE_URL is not set in the test environment
        assert!(RemoteFlagClient::from_env().is_none());
    }

    #[test]
    fn test_eval_request_wire_format() {
        let request = EvalRequest {
            flag_key: "region-us-east-enabled",
            user_key: "anonymous",
            default: true,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"flag_key\":\"region-us-east-enabled\""));
        assert!(json.contains("\"user_key\":\"anonymous\""));
        assert!(json.contains("\"default\":true"));
    }

    #[test]
    fn test_eval_response_parses() {
        let response: EvalResponse = serde_json::from_str(r#"{"value": false}"#).unwrap();
        assert!(!response.value);
    }
}
