use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::error;

/// An error nothing upstream of the router handles.
///
/// Logged in full, answered with a generic 500.
#[derive(Debug)]
pub struct ServerError(anyhow::Error);

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        error!("Unhandled error: {:#}", self.0);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    }
}

impl<E> From<E> for ServerError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
