//! Login and registration against the application service.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::backend::application as routes;
use crate::connection::Connection;
use crate::errors::ClientError;
use crate::session::SessionStore;
use crate::storage::TokenStorage;

/// Credentials for the primary login path. Only the employee badge id is
/// transmitted; no password travels on this path.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub employee_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub employee_id: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_id: Option<i64>,
}

/// Login response: the signed token plus the identity it was minted for.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JwtResponse {
    pub token: String,
    pub user_id: i64,
    pub employee_id: String,
    pub name: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Authentication client. Owns the transition between the anonymous and
/// authenticated session states.
#[derive(Clone, Debug)]
pub struct AuthClient<S> {
    connection: Connection,
    session: SessionStore<S>,
}

impl<S: TokenStorage> AuthClient<S> {
    pub fn new(connection: Connection, session: SessionStore<S>) -> Self {
        Self {
            connection,
            session,
        }
    }

    pub fn session(&self) -> &SessionStore<S> {
        &self.session
    }

    /// Log in with an employee id and persist the returned token.
    pub async fn login(&self, employee_id: &str) -> Result<JwtResponse, ClientError> {
        let request = LoginRequest {
            employee_id: employee_id.to_owned(),
        };

        let response: JwtResponse = self.connection.post(routes::LOGIN, &request, None).await?;

        self.session.store_token(&response.token).await?;

        Ok(response)
    }

    /// Register a new operator account. Does not touch the session.
    pub async fn register(&self, request: &RegisterRequest) -> Result<Value, ClientError> {
        self.connection.post(routes::REGISTER, request, None).await
    }

    /// Drop the stored token. Safe to call when already logged out.
    pub async fn logout(&self) -> Result<(), ClientError> {
        self.session.clear().await
    }
}
