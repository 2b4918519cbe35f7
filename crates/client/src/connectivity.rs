//! Reachability probes for both backends. These never return an error;
//! an unreachable backend is reported as `false` so the shell can degrade
//! to an offline state.

use reqwest::StatusCode;
use tracing::warn;

use crate::backend::{application, prediction};
use crate::connection::Connection;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendKind {
    Prediction,
    Application,
}

/// Probe one backend by kind.
pub async fn check_connection(kind: BackendKind, connection: &Connection) -> bool {
    match kind {
        BackendKind::Prediction => check_prediction(connection).await,
        BackendKind::Application => check_application(connection).await,
    }
}

/// GET the prediction service's health route; reachable iff it answers
/// with a success status within the backend timeout.
pub async fn check_prediction(connection: &Connection) -> bool {
    match connection.probe_get(prediction::HEALTH).await {
        Ok(status) => status.is_success(),
        Err(err) => {
            warn!(error = %err, "prediction backend unreachable");
            false
        }
    }
}

/// OPTIONS against the login route, since the application service has no
/// dedicated health endpoint. Any answered status except 404 proves the
/// service is reachable; a 405 method mismatch still counts.
pub async fn check_application(connection: &Connection) -> bool {
    match connection.probe_options(application::LOGIN).await {
        Ok(status) => status != StatusCode::NOT_FOUND,
        Err(err) => {
            warn!(error = %err, "application backend unreachable");
            false
        }
    }
}

/// Overall reachability: true when either backend answers. Callers that
/// need per-backend status use the individual probes.
pub async fn check_any(prediction: &Connection, application: &Connection) -> bool {
    check_prediction(prediction).await || check_application(application).await
}
