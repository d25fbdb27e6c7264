//! Entry point for the `stackd-gateway` HTTP server.

use std::sync::Arc;

use stackd_core::StackStore;
use stackd_gateway::routes::create_router;
use tracing::info;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let addr = std::env::var("STACKD_LISTEN_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:2000".to_owned());

    let store = Arc::new(StackStore::new());
    let app = create_router(store);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(addr = %addr, error = %e, "failed to bind");
            std::process::exit(1);
        }
    };

    info!(addr = %addr, "stackd-gateway listening");

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server error");
        std::process::exit(1);
    }
}
