use std::{future::Future, sync::Arc, time::Duration};

use axum::Router;
use common::env::ensure_parent_dir;
use configs::{AppConfig, DatabaseConfig};
use service::kv::{repo::seaorm::SeaOrmKvRepository, KvRepository};
use tokio::{net::TcpListener, sync::oneshot};
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

use crate::errors::StartupError;
use crate::routes;
use crate::state::ServerState;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Open the database, bring the schema up and wire storage → service.
pub async fn build_state(cfg: &DatabaseConfig) -> Result<ServerState, StartupError> {
    ensure_parent_dir(&cfg.path).await.map_err(StartupError::Database)?;
    let db = models::db::init(cfg).await.map_err(StartupError::Database)?;
    let repo: Arc<dyn KvRepository> = Arc::new(SeaOrmKvRepository::new(db));
    Ok(ServerState::new(repo))
}

pub fn build_app(state: ServerState) -> Router {
    routes::build_router(state, build_cors())
}

pub async fn bind(addr: &str) -> Result<TcpListener, StartupError> {
    TcpListener::bind(addr)
        .await
        .map_err(|source| StartupError::Bind { addr: addr.to_string(), source })
}

/// Serve `app` until `shutdown` resolves, then drain in-flight requests for
/// at most `grace`.
///
/// Errors after the shutdown signal are logged, not returned; only a server
/// that dies on its own is a failure.
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F, grace: Duration) -> Result<(), StartupError>
where
    F: Future<Output = ()> + Send,
{
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = stop_rx.await;
            })
            .await
    });

    tokio::select! {
        res = &mut server => {
            res??;
            return Ok(());
        }
        _ = shutdown => {}
    }

    info!(service = "server", event = "draining", grace_secs = grace.as_secs(), "shutting down server");
    let _ = stop_tx.send(());
    match tokio::time::timeout(grace, &mut server).await {
        Ok(Ok(Ok(()))) => info!(service = "server", event = "stop", "server stopped"),
        Ok(Ok(Err(e))) => error!(service = "server", event = "shutdown_error", error = %e, "error shutting down server"),
        Ok(Err(e)) => error!(service = "server", event = "task_join_error", error = %e, "server task join error"),
        Err(_) => {
            warn!(service = "server", event = "shutdown_timeout", grace_secs = grace.as_secs(), "in-flight requests did not finish in time");
            server.abort();
        }
    }
    Ok(())
}

/// Public entry: build the app from `cfg` and run the HTTP server until
/// `shutdown` resolves.
pub async fn run<F>(cfg: AppConfig, shutdown: F) -> Result<(), StartupError>
where
    F: Future<Output = ()> + Send,
{
    let state = build_state(&cfg.database).await?;
    let app = build_app(state);

    let addr = cfg.server.bind_addr();
    let listener = bind(&addr).await?;
    info!(%addr, db = %cfg.database.path, "listening");

    serve(listener, app, shutdown, Duration::from_secs(cfg.server.shutdown_grace_secs)).await
}
