//! HTTPS transport for the IBM Q Experience account client.
//!
//! Implements [`ibmq_account::SessionAuthenticator`] and
//! [`ibmq_account::ProviderApi`] with `reqwest`:
//!
//! | Operation | Request |
//! |-----------|---------|
//! | Login | `POST {auth}/users/loginWithToken` |
//! | Service URLs | `GET {auth}/users/me` |
//! | Hub catalog | `GET {api}/Network` |
//! | Backends | `GET {project}/devices/v/1` |
//! | Backend status | `GET {project}/Backends/{name}/queue/status` |
//! | Properties | `GET {project}/Backends/{name}/properties` |
//! | Pulse defaults | `GET {project}/Backends/{name}/defaults` |
//! | Submit | `POST {project}/Jobs` |
//! | Job status | `GET {project}/Jobs/{id}/status` |
//! | Job result | `GET {project}/Jobs/{id}` |
//! | Cancel | `PUT {project}/Jobs/{id}/cancel` |
//!
//! Proxies configured in the credential are applied per URL scheme, and
//! `verify = false` disables TLS certificate verification.

pub mod api;
pub mod auth;
pub mod client;
pub mod error;

pub use api::HttpProviderApi;
pub use auth::HttpAuthenticator;
pub use client::ApiClient;
pub use error::{HttpError, HttpResult};
