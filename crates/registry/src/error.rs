//! The module contains the errors the registry can return.
//!
//! - [`KeyNotFound`] when no client has the requested id.
//! - [`ExistingKey`] when a client with the same id is already stored.
//! - [`InvalidClient`] when a record fails validation.
//!
//!  [`KeyNotFound`]: RegistryError::KeyNotFound
//!  [`ExistingKey`]: RegistryError::ExistingKey
//!  [`InvalidClient`]: RegistryError::InvalidClient
use sea_orm::DbErr;
use thiserror::Error;

/// Registry custom errors.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("client \"{0}\" not found")]
    KeyNotFound(String),
    #[error("client \"{0}\" already exists")]
    ExistingKey(String),
    #[error("invalid client: {0}")]
    InvalidClient(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for RegistryError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::InvalidClient(a), Self::InvalidClient(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
