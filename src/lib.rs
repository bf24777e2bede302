//! Client for the PTCMSS transport-company backend.
//!
//! [`ApiClient::fetch`] sends one request, attaches the stored bearer token and
//! normalizes whatever the backend answers: plain payloads, `{ data }`
//! wrappers, `{ success, message }` and `{ code|status, message, data }`
//! envelopes. The domain modules under [`api`] are thin wrappers over it.

pub mod api;
pub mod config;
pub mod observability;
pub mod token_store;

#[cfg(test)]
pub(crate) mod test_utils;

pub use api::{ApiClient, ApiError, ApiResult, RequestOptions};
pub use config::ApiConfig;
pub use token_store::{TokenStore, Tokens};
