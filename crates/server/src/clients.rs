//! Clients API endpoints.

use api_types::client::{Client, ClientNew};
use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
};
use axum_extra::extract::WithRejection;
use registry::NewClientCmd;

use crate::{ServerError, server::ServerState};

/// Smallest accepted batch for `POST /api/clients/batch`.
const MIN_BATCH_CLIENTS: usize = 10;

type ClientPath = WithRejection<Path<i64>, ServerError>;
type JsonBody<T> = WithRejection<Json<T>, ServerError>;

fn map_client(client: registry::Client) -> Client {
    Client {
        client_id: client.client_id,
        username: client.username,
        system_id: client.system_id,
    }
}

fn to_cmd(payload: ClientNew) -> NewClientCmd {
    NewClientCmd::new(payload.client_id, payload.username)
}

fn from_cmd(cmd: NewClientCmd) -> ClientNew {
    ClientNew {
        client_id: cmd.client_id,
        username: cmd.username,
    }
}

pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<Client>>, ServerError> {
    let clients = state
        .registry
        .clients()
        .await?
        .into_iter()
        .map(map_client)
        .collect();

    Ok(Json(clients))
}

pub async fn get(
    State(state): State<ServerState>,
    WithRejection(Path(client_id), _): ClientPath,
) -> Result<Json<Client>, ServerError> {
    let client = state.registry.client(client_id).await?;
    Ok(Json(map_client(client)))
}

pub async fn create(
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): JsonBody<ClientNew>,
) -> Result<(StatusCode, [(header::HeaderName, String); 1], Json<Client>), ServerError> {
    let client = state.registry.new_client(to_cmd(payload)).await?;
    let location = format!("/api/clients/{}", client.client_id);

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(map_client(client)),
    ))
}

pub async fn update(
    State(state): State<ServerState>,
    WithRejection(Path(client_id), _): ClientPath,
    WithRejection(Json(payload), _): JsonBody<ClientNew>,
) -> Result<StatusCode, ServerError> {
    if client_id != payload.client_id {
        return Err(ServerError::Generic(
            "route id doesn't match request clientId".to_string(),
        ));
    }

    state
        .registry
        .update_client(client_id, &payload.username)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete(
    State(state): State<ServerState>,
    WithRejection(Path(client_id), _): ClientPath,
) -> Result<StatusCode, ServerError> {
    state.registry.delete_client(client_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Create many clients at once and answer with the ones that were skipped.
pub async fn create_batch(
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): JsonBody<Vec<ClientNew>>,
) -> Result<Json<Vec<ClientNew>>, ServerError> {
    if payload.len() < MIN_BATCH_CLIENTS {
        return Err(ServerError::Generic(format!(
            "at least {MIN_BATCH_CLIENTS} clients required"
        )));
    }

    let failed = state
        .registry
        .new_clients(payload.into_iter().map(to_cmd).collect())
        .await?
        .into_iter()
        .map(from_cmd)
        .collect();

    Ok(Json(failed))
}
