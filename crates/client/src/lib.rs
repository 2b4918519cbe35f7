//! Labdesk client library
//!
//! The API client layer of the labdesk bench shell. It talks to two
//! independently-owned HTTP services: the prediction service (image-based
//! titration, concentration and characterization analysis) and the
//! application service (experiment records, statistics, accounts).
//!
//! The library owns everything with non-trivial failure handling:
//!
//! - **Retry policy**: every call goes through [`Connection`], which applies
//!   the backend's timeout, retries transient failures with linear backoff,
//!   and supports cancellation of the whole call including pending retries.
//! - **Session**: a single bearer token behind the swappable
//!   [`TokenStorage`] trait. Validity is checked structurally only; the
//!   application service is the authority on authenticity.
//! - **Degradation**: [`connectivity`] probes either backend without ever
//!   failing, so the shell can render an offline state instead of an error.
//!
//! Window/menu lifecycle, dialogs and view state live in the shell, which
//! calls into this crate and renders the resolved or rejected outcomes.

pub mod application;
pub mod auth;
pub mod backend;
pub mod connection;
pub mod connectivity;
pub mod errors;
pub mod prediction;
pub mod session;
pub mod storage;

pub use application::{ApplicationClient, ExperimentStatistics, UserRecord};
pub use auth::{AuthClient, JwtResponse, LoginRequest, RegisterRequest};
pub use backend::BackendDescriptor;
pub use connection::Connection;
pub use connectivity::BackendKind;
pub use errors::ClientError;
pub use prediction::{ModelsResponse, PredictionClient, PredictionResponse};
pub use session::{DecodedIdentity, SessionStore};
pub use storage::{FileTokenStorage, MemoryTokenStorage, TokenStorage};
