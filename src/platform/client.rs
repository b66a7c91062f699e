use super::VideoPlatform;
use crate::config::PlatformConfig;
use crate::error::{CoreError, CoreResult};
use crate::role::Role;
use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

/// HTTP client for the video platform's REST API.
///
/// Each request carries a short-lived service JWT signed with the
/// project's API secret.
pub struct HttpVideoPlatform {
    client: Client,
    base_url: String,
    api_key: String,
    api_secret: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    iss: String,
    exp: usize,
}

#[derive(Deserialize)]
struct SessionResponse {
    session_id: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    token: String,
}

#[derive(Deserialize)]
struct RecordingResponse {
    recording_id: String,
}

#[derive(Deserialize)]
struct RecordingListResponse {
    recordings: Vec<String>,
}

#[derive(Deserialize)]
struct CaptionsResponse {
    captions_id: String,
}

#[derive(Deserialize)]
struct CaptionsStatusResponse {
    status: String,
}

impl HttpVideoPlatform {
    pub fn new(config: &PlatformConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build platform HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
        })
    }

    fn service_token(&self) -> CoreResult<String> {
        let expiration = Utc::now() + Duration::seconds(60);

        let claims = Claims {
            iss: self.api_key.clone(),
            exp: expiration.timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.api_secret.as_bytes()),
        )
        .map_err(|e| CoreError::Transient(format!("failed to sign platform token: {}", e)))
    }

    async fn post(&self, path: &str, body: Option<serde_json::Value>) -> CoreResult<Response> {
        let token = self.service_token()?;
        let url = format!("{}{}", self.base_url, path);
        debug!("POST {}", url);

        let mut request = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", token));
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| CoreError::Transient(format!("platform request failed: {}", e)))?;
        check_status(response).await
    }

    async fn get(&self, path: &str) -> CoreResult<Response> {
        let token = self.service_token()?;
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await
            .map_err(|e| CoreError::Transient(format!("platform request failed: {}", e)))?;
        check_status(response).await
    }
}

/// Translate the platform's HTTP status into the error taxonomy:
/// 4xx is permanent (bad id, bad request, missing resource), anything
/// else non-success is transient and safe to retry.
async fn check_status(response: Response) -> CoreResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let detail = format!("platform returned {}: {}", status, body);

    Err(match status {
        StatusCode::NOT_FOUND => CoreError::NotFound(detail),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => CoreError::PermissionDenied(detail),
        s if s.is_client_error() => CoreError::InvalidArgument(detail),
        _ => CoreError::Transient(detail),
    })
}

async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> CoreResult<T> {
    response
        .json::<T>()
        .await
        .map_err(|e| CoreError::Transient(format!("malformed platform response: {}", e)))
}

#[async_trait::async_trait]
impl VideoPlatform for HttpVideoPlatform {
    async fn create_session(&self) -> CoreResult<String> {
        let response = self.post("/v1/sessions", None).await?;
        Ok(decode::<SessionResponse>(response).await?.session_id)
    }

    async fn issue_token(&self, session_id: &str, role: Role) -> CoreResult<String> {
        let response = self
            .post(
                &format!("/v1/sessions/{}/tokens", session_id),
                Some(json!({ "role": role })),
            )
            .await?;
        Ok(decode::<TokenResponse>(response).await?.token)
    }

    async fn start_recording(&self, session_id: &str, room_name: &str) -> CoreResult<String> {
        let response = self
            .post(
                &format!("/v1/sessions/{}/recordings", session_id),
                Some(json!({ "name": room_name })),
            )
            .await?;
        Ok(decode::<RecordingResponse>(response).await?.recording_id)
    }

    async fn stop_recording(&self, recording_id: &str) -> CoreResult<String> {
        let response = self
            .post(&format!("/v1/recordings/{}/stop", recording_id), None)
            .await?;
        Ok(decode::<RecordingResponse>(response).await?.recording_id)
    }

    async fn list_recordings(&self, session_id: &str) -> CoreResult<Vec<String>> {
        let response = self
            .get(&format!("/v1/sessions/{}/recordings", session_id))
            .await?;
        Ok(decode::<RecordingListResponse>(response).await?.recordings)
    }

    async fn enable_captions(&self, session_id: &str) -> CoreResult<String> {
        let response = self
            .post(&format!("/v1/sessions/{}/captions", session_id), None)
            .await?;
        Ok(decode::<CaptionsResponse>(response).await?.captions_id)
    }

    async fn disable_captions(&self, captions_id: &str) -> CoreResult<String> {
        let response = self
            .post(&format!("/v1/captions/{}/stop", captions_id), None)
            .await?;
        Ok(decode::<CaptionsStatusResponse>(response).await?.status)
    }
}
