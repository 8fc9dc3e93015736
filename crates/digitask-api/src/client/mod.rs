//! `reqwest` implementation of [`BackendApi`](crate::BackendApi).
//!
//! Every request carries `Authorization: Bearer <token>` taken from the
//! shared `AuthSession` at call time, so a logout is honoured by the next
//! request without rebuilding the client.

mod api;
mod http;

pub use http::HttpBackend;
