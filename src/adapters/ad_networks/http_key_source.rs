//! HTTP adapter for the AdMob verifier key set.
//!
//! AdMob publishes its keys as JSON:
//!
//! ```json
//! { "keys": [ { "keyId": 3335741209, "pem": "-----BEGIN PUBLIC KEY-----..." } ] }
//! ```
//!
//! `keyId` is numeric in the live feed; string ids are accepted as well.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{PublicKeyEntry, PublicKeySource};

/// Public AdMob key server.
pub const ADMOB_KEY_SERVER_URL: &str = "https://www.gstatic.com/admob/reward/verifier-keys.json";

#[derive(Debug, Deserialize)]
struct KeySetResponse {
    keys: Vec<KeyResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeyResponse {
    key_id: KeyId,
    pem: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum KeyId {
    Number(u64),
    Text(String),
}

impl KeyId {
    fn into_string(self) -> String {
        match self {
            KeyId::Number(n) => n.to_string(),
            KeyId::Text(s) => s,
        }
    }
}

impl KeySetResponse {
    fn into_entries(self) -> Vec<PublicKeyEntry> {
        self.keys
            .into_iter()
            .map(|k| PublicKeyEntry {
                key_id: k.key_id.into_string(),
                pem: k.pem,
            })
            .collect()
    }
}

/// Fetches the AdMob key set over HTTPS.
pub struct HttpPublicKeySource {
    url: String,
    http_client: reqwest::Client,
}

impl HttpPublicKeySource {
    /// Creates a key source; every fetch is bounded by `timeout`.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, DomainError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::InternalError,
                    format!("Failed to create HTTP client: {}", e),
                )
            })?;

        Ok(Self {
            url: url.into(),
            http_client,
        })
    }
}

#[async_trait]
impl PublicKeySource for HttpPublicKeySource {
    async fn fetch_key_set(&self) -> Result<Vec<PublicKeyEntry>, DomainError> {
        tracing::debug!("Fetching AdMob key set from {}", self.url);

        let response = self.http_client.get(&self.url).send().await.map_err(|e| {
            DomainError::new(
                ErrorCode::ExternalServiceError,
                format!("Key server request failed: {}", e),
            )
        })?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(DomainError::new(
                ErrorCode::ExternalServiceError,
                format!("Key server returned {}", status),
            ));
        }

        let body: KeySetResponse = response.json().await.map_err(|e| {
            DomainError::new(
                ErrorCode::ExternalServiceError,
                format!("Failed to parse key set: {}", e),
            )
        })?;

        let entries = body.into_entries();
        tracing::debug!("Fetched {} AdMob keys", entries.len());
        Ok(entries)
    }
}
