//! The module contains `Client` struct and its persistence model.

use sea_orm::entity::{ActiveValue, prelude::*};
use uuid::Uuid;

use crate::{RegistryError, ResultRegistry};

/// Maximum length of a username, counted in characters.
pub const USERNAME_MAX_CHARS: usize = 100;

/// A registered client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Client {
    /// Business identifier chosen by the caller.
    pub client_id: i64,
    pub username: String,
    /// Identifier generated once on insert, persisted as text.
    pub system_id: Uuid,
}

impl Client {
    /// Build a client from a validated command, generating its `system_id`.
    pub(crate) fn register(cmd: NewClientCmd) -> Self {
        Self {
            client_id: cmd.client_id,
            username: cmd.username,
            system_id: Uuid::new_v4(),
        }
    }
}

/// Input for creating a client, or a record the batch insert skipped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewClientCmd {
    pub client_id: i64,
    pub username: String,
}

impl NewClientCmd {
    pub fn new(client_id: i64, username: impl Into<String>) -> Self {
        Self {
            client_id,
            username: username.into(),
        }
    }

    /// Check the record and return it with a normalized username.
    pub(crate) fn validated(self) -> ResultRegistry<Self> {
        validate_client_id(self.client_id)?;
        let username = normalize_username(&self.username)?;
        Ok(Self {
            client_id: self.client_id,
            username,
        })
    }
}

pub(crate) fn validate_client_id(client_id: i64) -> ResultRegistry<()> {
    if client_id < 1 {
        return Err(RegistryError::InvalidClient(format!(
            "client id must be positive, got {client_id}"
        )));
    }
    Ok(())
}

pub(crate) fn normalize_username(value: &str) -> ResultRegistry<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RegistryError::InvalidClient(
            "username must not be empty".to_string(),
        ));
    }
    if trimmed.chars().count() > USERNAME_MAX_CHARS {
        return Err(RegistryError::InvalidClient(format!(
            "username must be at most {USERNAME_MAX_CHARS} characters"
        )));
    }
    Ok(trimmed.to_string())
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "clients")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub client_id: i64,
    pub username: String,
    #[sea_orm(unique)]
    pub system_id: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Client> for ActiveModel {
    fn from(value: &Client) -> Self {
        Self {
            client_id: ActiveValue::Set(value.client_id),
            username: ActiveValue::Set(value.username.clone()),
            system_id: ActiveValue::Set(value.system_id.to_string()),
        }
    }
}

impl TryFrom<Model> for Client {
    type Error = RegistryError;

    fn try_from(model: Model) -> ResultRegistry<Self> {
        let system_id = Uuid::parse_str(&model.system_id).map_err(|err| {
            DbErr::Custom(format!(
                "invalid system_id for client {}: {err}",
                model.client_id
            ))
        })?;
        Ok(Self {
            client_id: model.client_id,
            username: model.username,
            system_id,
        })
    }
}
