//! Session state derived from the stored bearer token.
//!
//! Validity here is purely structural: exactly three non-empty dot-separated
//! segments. The signature is never checked client-side, so a token can
//! report as authenticated locally and still be rejected by the server (for
//! example after expiry). Callers observe that as an auth failure on a later
//! request and transition back to anonymous themselves.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::errors::ClientError;
use crate::storage::TokenStorage;

/// Identity fields carried in the token's payload segment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedIdentity {
    pub user_id: i64,
    pub employee_id: String,
    pub name: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Structural shape check, independent of cryptographic validity.
pub fn is_structurally_valid(token: &str) -> bool {
    let parts: Vec<&str> = token.split('.').collect();
    parts.len() == 3 && parts.iter().all(|part| !part.is_empty())
}

/// Decode the payload segment without verifying the signature.
///
/// Returns `None` on any decode failure, never an error.
pub fn decode_identity(token: &str) -> Option<DecodedIdentity> {
    if !is_structurally_valid(token) {
        return None;
    }

    let payload = token.split('.').nth(1)?;
    let raw = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;

    serde_json::from_slice(&raw).ok()
}

/// Bearer-token session shared by the application-side clients.
///
/// Reads happen per request (headers are captured once at request
/// construction); mutation only happens on login and logout.
#[derive(Clone, Debug)]
pub struct SessionStore<S> {
    storage: S,
}

impl<S: TokenStorage> SessionStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// The raw stored token, if any. Storage read failures degrade to an
    /// anonymous session rather than erroring.
    pub async fn token(&self) -> Option<String> {
        self.storage.load_token().await.ok().flatten()
    }

    /// The stored token when it is structurally valid, ready for an
    /// `Authorization: Bearer` header. `None` otherwise.
    pub async fn bearer_token(&self) -> Option<String> {
        self.token()
            .await
            .filter(|token| is_structurally_valid(token))
    }

    /// Local check only; no server contact.
    pub async fn is_authenticated(&self) -> bool {
        self.bearer_token().await.is_some()
    }

    /// Identity decoded from the token payload, or `None` when absent or
    /// malformed.
    pub async fn current_user(&self) -> Option<DecodedIdentity> {
        self.token().await.as_deref().and_then(decode_identity)
    }

    pub async fn store_token(&self, token: &str) -> Result<(), ClientError> {
        self.storage
            .save_token(token)
            .await
            .map_err(|err| ClientError::Storage(err.to_string()))
    }

    /// Clear the session. Idempotent.
    pub async fn clear(&self) -> Result<(), ClientError> {
        self.storage
            .remove_token()
            .await
            .map_err(|err| ClientError::Storage(err.to_string()))
    }
}
