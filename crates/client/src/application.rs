//! Client for the application service: experiment-data upload and the
//! statistics query surface.
//!
//! Every method performs exactly one HTTP call through the executor and
//! either returns the parsed body or propagates the executor's failure
//! unchanged. The bearer header is attached only when the stored token is
//! structurally valid; otherwise the request goes out unauthenticated and
//! the server answers with an auth error.

use serde::Deserialize;
use serde_json::Value;

use crate::backend::{application as routes, BackendDescriptor};
use crate::connection::Connection;
use crate::errors::ClientError;
use crate::session::SessionStore;
use crate::storage::TokenStorage;

/// One statistics row, as served by the experiment statistics routes.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperimentStatistics {
    pub experiment_id: Option<i64>,
    pub experiment_type: Option<String>,
    pub user_name: Option<String>,
    /// Server-side timestamp, passed through as formatted.
    pub experiment_time: Option<String>,
    #[serde(default)]
    pub total_data_points: i64,
    #[serde(default)]
    pub average_concentration: f64,
    #[serde(default)]
    pub confidence_level: f64,
    pub analysis_summary: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: i64,
    pub name: String,
    pub employee_id: String,
}

#[derive(Clone, Debug)]
pub struct ApplicationClient<S> {
    connection: Connection,
    session: SessionStore<S>,
}

impl<S: TokenStorage> ApplicationClient<S> {
    pub fn new(connection: Connection, session: SessionStore<S>) -> Self {
        Self {
            connection,
            session,
        }
    }

    /// Client over a fresh connection to the given backend.
    pub fn from_backend(backend: BackendDescriptor, session: SessionStore<S>) -> Self {
        Self::new(Connection::new(backend), session)
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    pub fn session(&self) -> &SessionStore<S> {
        &self.session
    }

    /// Header snapshot for one request. Captured once when the request is
    /// built; a racing login does not change an in-flight request.
    async fn bearer(&self) -> Option<String> {
        self.session.bearer_token().await
    }

    pub async fn upload_experiment_data(&self, data: &Value) -> Result<Value, ClientError> {
        let bearer = self.bearer().await;
        self.connection
            .post(routes::UPLOAD, data, bearer.as_deref())
            .await
    }

    pub async fn batch_upload_experiment_data(&self, data: &[Value]) -> Result<Value, ClientError> {
        let bearer = self.bearer().await;
        self.connection
            .post(routes::UPLOAD_BATCH, data, bearer.as_deref())
            .await
    }

    pub async fn overall_experiment_statistics(
        &self,
    ) -> Result<ExperimentStatistics, ClientError> {
        let bearer = self.bearer().await;
        self.connection
            .get(routes::EXPERIMENTS_OVERALL, bearer.as_deref())
            .await
    }

    pub async fn user_experiment_statistics(
        &self,
        user_id: i64,
    ) -> Result<Vec<ExperimentStatistics>, ClientError> {
        let bearer = self.bearer().await;
        self.connection
            .get(&routes::experiments_by_user(user_id), bearer.as_deref())
            .await
    }

    pub async fn experiment_type_statistics(
        &self,
        experiment_type_id: i64,
    ) -> Result<Vec<ExperimentStatistics>, ClientError> {
        let bearer = self.bearer().await;
        self.connection
            .get(
                &routes::experiments_by_type(experiment_type_id),
                bearer.as_deref(),
            )
            .await
    }

    /// Statistics over `[start_time, end_time]`, both formatted as the
    /// server expects (ISO-8601 local date-times).
    pub async fn time_range_statistics(
        &self,
        start_time: &str,
        end_time: &str,
    ) -> Result<Vec<ExperimentStatistics>, ClientError> {
        let bearer = self.bearer().await;
        self.connection
            .get_with_query(
                routes::EXPERIMENTS_TIME_RANGE,
                &[("startTime", start_time), ("endTime", end_time)],
                bearer.as_deref(),
            )
            .await
    }

    pub async fn experiment_detail(
        &self,
        experiment_id: i64,
    ) -> Result<ExperimentStatistics, ClientError> {
        let bearer = self.bearer().await;
        self.connection
            .get(&routes::experiment_detailed(experiment_id), bearer.as_deref())
            .await
    }

    /// Total registered users. The server returns a bare integer body.
    pub async fn user_count(&self) -> Result<u64, ClientError> {
        let bearer = self.bearer().await;
        self.connection
            .get(routes::USERS_COUNT, bearer.as_deref())
            .await
    }

    pub async fn list_users(&self) -> Result<Vec<UserRecord>, ClientError> {
        let bearer = self.bearer().await;
        self.connection
            .get(routes::USERS_ALL, bearer.as_deref())
            .await
    }

    pub async fn users_by_role(&self, role_id: i64) -> Result<Vec<UserRecord>, ClientError> {
        let bearer = self.bearer().await;
        self.connection
            .get(&routes::users_by_role(role_id), bearer.as_deref())
            .await
    }

    pub async fn user_experiments(
        &self,
        user_id: i64,
    ) -> Result<Vec<ExperimentStatistics>, ClientError> {
        let bearer = self.bearer().await;
        self.connection
            .get(&routes::user_experiments(user_id), bearer.as_deref())
            .await
    }

    pub async fn comprehensive_summary(&self) -> Result<Value, ClientError> {
        let bearer = self.bearer().await;
        self.connection
            .get(routes::COMPREHENSIVE_SUMMARY, bearer.as_deref())
            .await
    }

    pub async fn user_activity_statistics(&self) -> Result<Value, ClientError> {
        let bearer = self.bearer().await;
        self.connection
            .get(routes::COMPREHENSIVE_USER_ACTIVITY, bearer.as_deref())
            .await
    }

    pub async fn user_comprehensive_statistics(
        &self,
        user_id: i64,
    ) -> Result<Value, ClientError> {
        let bearer = self.bearer().await;
        self.connection
            .get(&routes::comprehensive_user(user_id), bearer.as_deref())
            .await
    }
}
