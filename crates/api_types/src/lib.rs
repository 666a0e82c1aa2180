use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod client {
    use super::*;

    /// Request body for creating or updating a client.
    ///
    /// The batch endpoint accepts an array of these and answers with the
    /// subset that was not stored.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ClientNew {
        /// Business identifier chosen by the caller (must be >= 1).
        pub client_id: i64,
        pub username: String,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Client {
        pub client_id: i64,
        pub username: String,
        /// Identifier generated by the server on insert.
        ///
        /// This is serialized as a string in JSON.
        pub system_id: Uuid,
    }
}
