use axum::{
    Router,
    routing::{get, post},
};

use std::sync::Arc;

use crate::clients;
use registry::Registry;

#[derive(Clone)]
pub struct ServerState {
    pub registry: Arc<Registry>,
}

/// Build the HTTP routes around `registry`.
pub fn router(registry: Registry) -> Router {
    let state = ServerState {
        registry: Arc::new(registry),
    };

    Router::new()
        .route("/api/clients", get(clients::list).post(clients::create))
        .route("/api/clients/batch", post(clients::create_batch))
        .route(
            "/api/clients/{id}",
            get(clients::get)
                .put(clients::update)
                .delete(clients::delete),
        )
        .with_state(state)
}

pub async fn run_with_listener(
    registry: Registry,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(registry)).await
}
