use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::IntoResponse,
};
use registry::RegistryError;

use serde::Serialize;
pub use server::{router, run_with_listener};

mod clients;
mod server;

pub enum ServerError {
    Registry(RegistryError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_registry_error(err: &RegistryError) -> StatusCode {
    match err {
        RegistryError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        RegistryError::ExistingKey(_) => StatusCode::CONFLICT,
        RegistryError::InvalidClient(_) => StatusCode::BAD_REQUEST,
        RegistryError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn message_for_registry_error(err: RegistryError) -> String {
    match err {
        RegistryError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Registry(err) => (
                status_for_registry_error(&err),
                message_for_registry_error(err),
            ),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<RegistryError> for ServerError {
    fn from(value: RegistryError) -> Self {
        Self::Registry(value)
    }
}

impl From<JsonRejection> for ServerError {
    fn from(value: JsonRejection) -> Self {
        Self::Generic(value.body_text())
    }
}

impl From<PathRejection> for ServerError {
    fn from(value: PathRejection) -> Self {
        Self::Generic(value.body_text())
    }
}
