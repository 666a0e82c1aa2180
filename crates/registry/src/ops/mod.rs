use sea_orm::DatabaseConnection;

use crate::ResultRegistry;

mod clients;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Data-access layer for clients.
#[derive(Debug)]
pub struct Registry {
    database: DatabaseConnection,
}

impl Registry {
    /// Return a builder for `Registry`. Help to build the struct.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }
}

/// The builder for `Registry`
#[derive(Default)]
pub struct RegistryBuilder {
    database: DatabaseConnection,
}

impl RegistryBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> RegistryBuilder {
        self.database = db;
        self
    }

    /// Construct `Registry`
    pub async fn build(self) -> ResultRegistry<Registry> {
        Ok(Registry {
            database: self.database,
        })
    }
}
