//! Types shared between the transcription pipeline and the HTTP server

#![allow(clippy::must_use_candidate)]

mod auth;
mod error;

pub use auth::{ApiKey, AuthError};
pub use error::{ErrorBody, HttpError};
