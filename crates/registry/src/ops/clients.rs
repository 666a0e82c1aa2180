use std::collections::HashSet;

use sea_orm::{ActiveValue, QueryOrder, SqlErr, TransactionTrait, prelude::*};
use tokio::task::JoinSet;

use crate::{
    Client, NewClientCmd, RegistryError, ResultRegistry,
    clients::{self, normalize_username, validate_client_id},
};

use super::{Registry, with_tx};

impl Registry {
    /// Return a client by its id.
    pub async fn client(&self, client_id: i64) -> ResultRegistry<Client> {
        let model = clients::Entity::find_by_id(client_id)
            .one(&self.database)
            .await?
            .ok_or_else(|| RegistryError::KeyNotFound(client_id.to_string()))?;

        Client::try_from(model)
    }

    /// Return every client, ordered by id.
    pub async fn clients(&self) -> ResultRegistry<Vec<Client>> {
        clients::Entity::find()
            .order_by_asc(clients::Column::ClientId)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Client::try_from)
            .collect()
    }

    /// Store a new client and return it with its generated `system_id`.
    ///
    /// Fails with [`RegistryError::ExistingKey`] when the id is taken, both
    /// when the pre-insert check finds it and when a concurrent insert wins
    /// the race and the store rejects ours on its unique key.
    pub async fn new_client(&self, cmd: NewClientCmd) -> ResultRegistry<Client> {
        let cmd = cmd.validated()?;
        let client_id = cmd.client_id;

        with_tx!(self, |db_tx| {
            let exists = clients::Entity::find_by_id(client_id)
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                tracing::warn!("duplicate client id: {client_id}");
                return Err(RegistryError::ExistingKey(client_id.to_string()));
            }

            let client = Client::register(cmd);
            clients::ActiveModel::from(&client)
                .insert(&db_tx)
                .await
                .map_err(|err| conflict_or_database(err, client_id))?;

            tracing::info!("created client {client_id} ({})", client.system_id);
            Ok(client)
        })
    }

    /// Rename an existing client. `system_id` is left untouched.
    pub async fn update_client(&self, client_id: i64, username: &str) -> ResultRegistry<Client> {
        validate_client_id(client_id)?;
        let username = normalize_username(username)?;

        let active = clients::ActiveModel {
            client_id: ActiveValue::Set(client_id),
            username: ActiveValue::Set(username),
            ..Default::default()
        };
        let model = active
            .update(&self.database)
            .await
            .map_err(|err| match err {
                DbErr::RecordNotUpdated => RegistryError::KeyNotFound(client_id.to_string()),
                other => RegistryError::Database(other),
            })?;

        Client::try_from(model)
    }

    pub async fn delete_client(&self, client_id: i64) -> ResultRegistry<()> {
        let result = clients::Entity::delete_by_id(client_id)
            .exec(&self.database)
            .await?;
        if result.rows_affected == 0 {
            return Err(RegistryError::KeyNotFound(client_id.to_string()));
        }

        tracing::info!("deleted client {client_id}");
        Ok(())
    }

    /// Best-effort batch insert.
    ///
    /// Every record is validated up front; one invalid record rejects the
    /// whole batch. Existence checks then run concurrently, and the records
    /// that are free (first occurrence of each id) are saved with one bulk
    /// insert. There is no transaction around the batch: a concurrent writer
    /// can still take an id between the check and the save, in which case the
    /// save fails as a whole.
    ///
    /// Returns the skipped records, in input order.
    pub async fn new_clients(&self, cmds: Vec<NewClientCmd>) -> ResultRegistry<Vec<NewClientCmd>> {
        let cmds = cmds
            .into_iter()
            .map(NewClientCmd::validated)
            .collect::<ResultRegistry<Vec<_>>>()?;

        let mut checks = JoinSet::new();
        for (index, cmd) in cmds.iter().enumerate() {
            let db = self.database.clone();
            let client_id = cmd.client_id;
            checks.spawn(async move {
                let found = clients::Entity::find_by_id(client_id).one(&db).await;
                (index, client_id, found.map(|model| model.is_some()))
            });
        }

        // A check that never reports back leaves its record marked as taken.
        let mut free = vec![false; cmds.len()];
        while let Some(joined) = checks.join_next().await {
            match joined {
                Ok((index, _, Ok(false))) => free[index] = true,
                Ok((_, client_id, Ok(true))) => {
                    tracing::warn!("duplicate client id: {client_id}");
                }
                Ok((_, client_id, Err(err))) => {
                    tracing::error!("failed to check client {client_id}: {err}");
                }
                Err(err) => tracing::error!("client check task failed: {err}"),
            }
        }

        let mut seen = HashSet::new();
        let mut accepted = Vec::new();
        let mut failed = Vec::new();
        for (cmd, is_free) in cmds.into_iter().zip(free) {
            if !is_free {
                failed.push(cmd);
            } else if !seen.insert(cmd.client_id) {
                tracing::warn!("client id {} repeated in batch", cmd.client_id);
                failed.push(cmd);
            } else {
                accepted.push(Client::register(cmd));
            }
        }

        if !accepted.is_empty() {
            clients::Entity::insert_many(accepted.iter().map(clients::ActiveModel::from))
                .exec_without_returning(&self.database)
                .await?;
        }

        tracing::info!(
            "batch stored {} clients, skipped {}",
            accepted.len(),
            failed.len()
        );
        Ok(failed)
    }
}

fn conflict_or_database(err: DbErr, client_id: i64) -> RegistryError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            tracing::warn!("duplicate client id on insert: {client_id}");
            RegistryError::ExistingKey(client_id.to_string())
        }
        _ => RegistryError::Database(err),
    }
}
