//! Retrying request executor.
//!
//! One explicit loop per logical call: apply the backend's timeout to each
//! attempt, retry transient failures (network errors and 5xx) with linear
//! backoff, fail fast on everything else. Each call owns its attempt counter
//! and timers, so independent calls can run concurrently.

use std::time::Duration;

use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

use crate::backend::BackendDescriptor;
use crate::errors::ClientError;

/// Base delay of the linear backoff; the wait before retry `k` (1-indexed)
/// is `BASE_RETRY_DELAY * k`.
const BASE_RETRY_DELAY: Duration = Duration::from_millis(1000);

/// One backend's HTTP connection: a shared `reqwest` client plus the
/// descriptor carrying address, timeout and retry budget.
#[derive(Clone, Debug)]
pub struct Connection {
    http: Client,
    backend: BackendDescriptor,
}

impl Connection {
    pub fn new(backend: BackendDescriptor) -> Self {
        Self {
            http: Client::new(),
            backend,
        }
    }

    pub fn backend(&self) -> &BackendDescriptor {
        &self.backend
    }

    pub async fn get<O>(&self, path: &str, bearer: Option<&str>) -> Result<O, ClientError>
    where
        O: DeserializeOwned,
    {
        self.request(Method::GET, path, &[], None::<&()>, bearer, None)
            .await
    }

    /// GET that a caller can abandon via the cancellation token.
    pub async fn get_cancellable<O>(
        &self,
        path: &str,
        bearer: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<O, ClientError>
    where
        O: DeserializeOwned,
    {
        self.request(Method::GET, path, &[], None::<&()>, bearer, Some(cancel))
            .await
    }

    /// GET with query parameters, percent-encoded by the URL builder.
    pub async fn get_with_query<O>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        bearer: Option<&str>,
    ) -> Result<O, ClientError>
    where
        O: DeserializeOwned,
    {
        self.request(Method::GET, path, query, None::<&()>, bearer, None)
            .await
    }

    pub async fn post<I, O>(&self, path: &str, body: &I, bearer: Option<&str>) -> Result<O, ClientError>
    where
        I: Serialize + ?Sized,
        O: DeserializeOwned,
    {
        self.request(Method::POST, path, &[], Some(body), bearer, None)
            .await
    }

    /// POST that a caller can abandon; cancelling the token aborts the
    /// in-flight attempt and every pending retry.
    pub async fn post_cancellable<I, O>(
        &self,
        path: &str,
        body: &I,
        bearer: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<O, ClientError>
    where
        I: Serialize + ?Sized,
        O: DeserializeOwned,
    {
        self.request(Method::POST, path, &[], Some(body), bearer, Some(cancel))
            .await
    }

    /// Single GET attempt returning only the status, for reachability
    /// probes. Bounded by the backend timeout, never retried.
    pub async fn probe_get(&self, path: &str) -> Result<StatusCode, ClientError> {
        self.probe(Method::GET, path).await
    }

    /// Single OPTIONS attempt returning only the status.
    pub async fn probe_options(&self, path: &str) -> Result<StatusCode, ClientError> {
        self.probe(Method::OPTIONS, path).await
    }

    async fn probe(&self, method: Method, path: &str) -> Result<StatusCode, ClientError> {
        let url = self.backend.endpoint(path)?;
        let response = self
            .http
            .request(method, url)
            .timeout(self.backend.timeout())
            .send()
            .await
            .map_err(|err| ClientError::Network(err.to_string()))?;
        Ok(response.status())
    }

    async fn request<I, O>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&I>,
        bearer: Option<&str>,
        cancel: Option<&CancellationToken>,
    ) -> Result<O, ClientError>
    where
        I: Serialize + ?Sized,
        O: DeserializeOwned,
    {
        let mut url = self.backend.endpoint(path)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }

        let mut attempt: u32 = 0;
        loop {
            let failure = match self
                .attempt(method.clone(), url.clone(), body, bearer, cancel)
                .await
            {
                Ok(response) => return self.parse(response).await,
                Err(err) if err.is_transient() => err,
                Err(err) => return Err(err),
            };

            if attempt >= self.backend.max_retries() {
                warn!(
                    %url,
                    attempts = attempt + 1,
                    error = %failure,
                    "retry budget exhausted"
                );
                return Err(failure);
            }

            let delay = BASE_RETRY_DELAY * (attempt + 1);
            debug!(
                %url,
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = %failure,
                "transient failure, scheduling retry"
            );

            match cancel {
                Some(cancel) => tokio::select! {
                    _ = cancel.cancelled() => return Err(ClientError::Cancelled),
                    _ = sleep(delay) => {}
                },
                None => sleep(delay).await,
            }

            attempt += 1;
        }
    }

    /// One attempt: send, classify the status, return the successful
    /// response or the classified failure.
    async fn attempt<I>(
        &self,
        method: Method,
        url: Url,
        body: Option<&I>,
        bearer: Option<&str>,
        cancel: Option<&CancellationToken>,
    ) -> Result<reqwest::Response, ClientError>
    where
        I: Serialize + ?Sized,
    {
        let mut builder = self
            .http
            .request(method, url)
            .timeout(self.backend.timeout());

        if let Some(body) = body {
            builder = builder.json(body);
        }
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }

        let sent = match cancel {
            Some(cancel) => tokio::select! {
                _ = cancel.cancelled() => return Err(ClientError::Cancelled),
                sent = builder.send() => sent,
            },
            None => builder.send().await,
        };

        let response = sent.map_err(|err| ClientError::Network(err.to_string()))?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ClientError::Auth {
                status: Some(status.as_u16()),
                body,
            }),
            status if status.is_server_error() => Err(ClientError::Server {
                status: status.as_u16(),
                body,
            }),
            status => Err(ClientError::Client {
                status: status.as_u16(),
                body,
            }),
        }
    }

    async fn parse<O>(&self, response: reqwest::Response) -> Result<O, ClientError>
    where
        O: DeserializeOwned,
    {
        response
            .json::<O>()
            .await
            .map_err(|err| ClientError::Decode(err.to_string()))
    }
}
