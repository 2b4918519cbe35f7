//! Client for the prediction service: per-task analysis endpoints plus
//! model management.

use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio_util::sync::CancellationToken;

use crate::backend::{prediction as routes, BackendDescriptor};
use crate::connection::Connection;
use crate::errors::ClientError;

/// Response envelope shared by the prediction endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct PredictionResponse {
    pub success: bool,
    /// Task-specific result payload; shape varies per task and model.
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelsResponse {
    pub success: bool,
    #[serde(default)]
    pub models: Vec<Value>,
}

#[derive(Clone, Debug)]
pub struct PredictionClient {
    connection: Connection,
}

impl PredictionClient {
    pub fn new(connection: Connection) -> Self {
        Self { connection }
    }

    /// Client over a fresh connection to the given backend.
    pub fn from_backend(backend: BackendDescriptor) -> Self {
        Self::new(Connection::new(backend))
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    pub async fn titration(
        &self,
        image_data: &str,
        options: Map<String, Value>,
        cancel: Option<&CancellationToken>,
    ) -> Result<PredictionResponse, ClientError> {
        self.predict_task(routes::TITRATION, image_data, options, cancel)
            .await
    }

    pub async fn concentration(
        &self,
        image_data: &str,
        options: Map<String, Value>,
        cancel: Option<&CancellationToken>,
    ) -> Result<PredictionResponse, ClientError> {
        self.predict_task(routes::CONCENTRATION, image_data, options, cancel)
            .await
    }

    pub async fn characterization(
        &self,
        image_data: &str,
        options: Map<String, Value>,
        cancel: Option<&CancellationToken>,
    ) -> Result<PredictionResponse, ClientError> {
        self.predict_task(routes::CHARACTERIZATION, image_data, options, cancel)
            .await
    }

    /// Dispatch by task name, for call sites that only know the task as a
    /// string. Unknown names fail before any network activity.
    pub async fn predict(
        &self,
        task: &str,
        image_data: &str,
        options: Map<String, Value>,
        cancel: Option<&CancellationToken>,
    ) -> Result<PredictionResponse, ClientError> {
        let route = match task {
            "titration" => routes::TITRATION,
            "concentration" => routes::CONCENTRATION,
            "characterization" => routes::CHARACTERIZATION,
            other => return Err(ClientError::UnsupportedTask(other.to_owned())),
        };

        self.predict_task(route, image_data, options, cancel).await
    }

    /// Legacy generic entry point, kept for shells that predate the
    /// per-task routes.
    pub async fn predict_image(
        &self,
        image_data: &str,
        return_image: bool,
    ) -> Result<PredictionResponse, ClientError> {
        let body = json!({
            "image_base64": image_data,
            "return_image": return_image,
        });

        self.connection.post(routes::PREDICT, &body, None).await
    }

    pub async fn model_info(&self) -> Result<Value, ClientError> {
        self.connection.get(routes::INFO, None).await
    }

    pub async fn available_models(&self) -> Result<ModelsResponse, ClientError> {
        self.connection.get(routes::MODELS, None).await
    }

    pub async fn switch_model(&self, model_name: &str) -> Result<PredictionResponse, ClientError> {
        let body = json!({ "model_name": model_name });

        self.connection.post(routes::SWITCH_MODEL, &body, None).await
    }

    async fn predict_task(
        &self,
        route: &str,
        image_data: &str,
        mut options: Map<String, Value>,
        cancel: Option<&CancellationToken>,
    ) -> Result<PredictionResponse, ClientError> {
        // the service only returns the annotated image when asked
        drop(options.insert("return_image".to_owned(), Value::Bool(true)));

        let body = json!({
            "image_data": image_data,
            "options": options,
        });

        match cancel {
            Some(cancel) => {
                self.connection
                    .post_cancellable(route, &body, None, cancel)
                    .await
            }
            None => self.connection.post(route, &body, None).await,
        }
    }
}
