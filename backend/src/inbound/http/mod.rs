//! HTTP inbound adapter exposing the REST endpoints.

pub mod auth;
pub mod body;
pub mod docs;
pub mod error;
pub mod estimate;
pub mod health;
pub mod multipart;
pub mod schemas;
pub mod state;
pub mod validation;

pub use error::ApiResult;
