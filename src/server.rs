use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use http::header::CONTENT_TYPE;
use http::StatusCode;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::ledger::client::LedgerClient;

pub const RPC_PATH: &str = "/rpc/v1";

const TEXT_PLAIN_UTF8: &str = "text/plain; charset=utf-8";

/// Build the HTTP router serving the JSON-RPC endpoint.
pub fn router(dispatcher: Dispatcher) -> Router {
    Router::new()
        .route(RPC_PATH, post(rpc_handler))
        .with_state(dispatcher)
        .layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
}

/// Every JSON-RPC outcome is a 200. Only requests rejected before dispatch
/// get a 400 with the error text.
async fn rpc_handler(State(dispatcher): State<Dispatcher>, body: Bytes) -> Response {
    let reply = match dispatcher.handle_body(&body).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!("Rejected RPC request: {}", e);
            return (StatusCode::BAD_REQUEST, [(CONTENT_TYPE, TEXT_PLAIN_UTF8)], e.to_string())
                .into_response();
        }
    };

    match serde_json::to_string(&reply) {
        Ok(text) => (StatusCode::OK, [(CONTENT_TYPE, TEXT_PLAIN_UTF8)], text).into_response(),
        Err(e) => {
            error!("Failed to serialize RPC reply: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// Start the JSON-RPC server and serve until Ctrl-C.
pub async fn start_server(config: Config, client: Arc<dyn LedgerClient>) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    info!("Starting EVM adapter on {}", addr);
    info!("Ledger gateway: {}", config.ledger_rpc_url);
    info!("Logger canister: {}", config.logger_canister_id);
    info!("Dex canister: {}", config.dex_canister_id);

    let dispatcher = Dispatcher::new(client, config.dispatch_options());
    let app = router(dispatcher);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind server to {}", addr))?;

    info!("EVM adapter listening on http://{}{}", addr, RPC_PATH);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = signal::ctrl_c().await {
                error!("Failed to install Ctrl-C handler: {}", e);
            }
            info!("Shutting down gracefully");
        })
        .await
        .context("RPC server error")?;

    info!("EVM adapter stopped");
    Ok(())
}
