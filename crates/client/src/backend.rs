//! Backend descriptors and the route catalogue for both services.

use std::time::Duration;

use url::Url;

use crate::errors::ClientError;

/// Default per-attempt timeout applied when a descriptor is built without
/// explicit configuration.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default retry budget per logical call.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Static description of one remote backend: where it lives, how long a
/// single attempt may take, and how many retries a call gets.
///
/// Immutable after construction. One instance exists per backend; overrides
/// come from configuration input at construction time, never at runtime.
#[derive(Debug, Clone)]
pub struct BackendDescriptor {
    base_url: Url,
    timeout: Duration,
    max_retries: u32,
}

impl BackendDescriptor {
    pub fn new(base_url: Url, timeout: Duration, max_retries: u32) -> Self {
        Self {
            base_url,
            timeout,
            max_retries,
        }
    }

    /// Descriptor with the default timeout and retry budget.
    pub fn with_defaults(base_url: Url) -> Self {
        Self::new(base_url, DEFAULT_TIMEOUT, DEFAULT_MAX_RETRIES)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Resolve an endpoint path against the base address.
    pub fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|err| ClientError::Decode(format!("invalid endpoint {path}: {err}")))
    }
}

/// Routes exposed by the prediction service.
pub mod prediction {
    pub const HEALTH: &str = "/health";
    pub const INFO: &str = "/info";
    pub const MODELS: &str = "/models";
    pub const SWITCH_MODEL: &str = "/models/switch";
    pub const PREDICT: &str = "/predict";
    pub const TITRATION: &str = "/predict/titration";
    pub const CONCENTRATION: &str = "/predict/concentration";
    pub const CHARACTERIZATION: &str = "/predict/characterization";
}

/// Routes exposed by the application service.
pub mod application {
    pub const LOGIN: &str = "/api/auth/login";
    pub const REGISTER: &str = "/api/auth/register";

    pub const UPLOAD: &str = "/api/data/upload";
    pub const UPLOAD_BATCH: &str = "/api/data/upload/batch";

    pub const EXPERIMENTS_OVERALL: &str = "/api/statistics/experiments/overall";
    pub const EXPERIMENTS_TIME_RANGE: &str = "/api/statistics/experiments/time-range";

    pub fn experiments_by_user(user_id: i64) -> String {
        format!("/api/statistics/experiments/user/{user_id}")
    }

    pub fn experiments_by_type(experiment_type_id: i64) -> String {
        format!("/api/statistics/experiments/type/{experiment_type_id}")
    }

    pub fn experiment_detailed(experiment_id: i64) -> String {
        format!("/api/statistics/experiments/{experiment_id}/detailed")
    }

    pub const USERS_COUNT: &str = "/api/statistics/users/count";
    pub const USERS_ALL: &str = "/api/statistics/users/all";

    pub fn users_by_role(role_id: i64) -> String {
        format!("/api/statistics/users/by-role/{role_id}")
    }

    pub fn user_experiments(user_id: i64) -> String {
        format!("/api/statistics/users/{user_id}/experiments")
    }

    pub const COMPREHENSIVE_SUMMARY: &str = "/api/statistics/comprehensive/summary";
    pub const COMPREHENSIVE_USER_ACTIVITY: &str = "/api/statistics/comprehensive/user-activity";

    pub fn comprehensive_user(user_id: i64) -> String {
        format!("/api/statistics/comprehensive/user/{user_id}")
    }
}
