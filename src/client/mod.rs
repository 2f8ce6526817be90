//! Typed client for the users API plus the signed-in session it carries.

mod api;
mod session;

pub use api::ApiClient;
pub use session::Session;

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    /// The server answered with an error body.
    #[error("{message} ({status})")]
    Api { status: StatusCode, message: String },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("not logged in")]
    NotLoggedIn,

    #[error("session expired")]
    SessionExpired,

    #[error("malformed access token: {0}")]
    BadToken(String),
}
