// Web module
// HTTP surface: dashboard page, track streaming, cover art and static assets

pub mod assets;
pub mod dashboard;
pub mod error;
pub mod range;
pub mod routes;

use anyhow::Context;
use axum::routing::get;
use axum::Router;
use tracing::{info, warn};

use crate::state::AppState;

pub use error::WebError;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::dashboard))
        .route("/stream/:track_id", get(routes::stream_track))
        .route("/pic/:track_id", get(routes::track_cover))
        .route("/api/tracks", get(routes::list_tracks))
        .route(assets::NOCOVER_PATH, get(routes::placeholder_cover))
        .route(assets::DASHBOARD_JS_PATH, get(routes::dashboard_script))
        .route("/health", get(|| async { "OK" }))
        .with_state(state)
}

/// Serve the dashboard on `addr` (`host:port`) until ctrl-c or SIGTERM
pub async fn serve(state: AppState, addr: &str) -> Result<(), anyhow::Error> {
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("trackdeck listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.ok();
    };

    #[cfg(unix)]
    let term = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "cannot install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let term = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = term => {},
    }

    warn!("Shutdown signal received.");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;
    use crate::db::connection::DatabaseConnection;
    use crate::metadata::ProviderRegistry;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    async fn spawn_server() -> SocketAddr {
        let state = AppState::new(
            DatabaseConnection::in_memory().unwrap(),
            ProviderRegistry::new(),
            std::env::temp_dir(),
            assets::render_placeholder_cover().unwrap(),
        );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, build_router(state)).await.unwrap();
        });
        addr
    }

    /// Status code of a bare HTTP/1.1 GET
    async fn get_status(addr: SocketAddr, uri: &str) -> u16 {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        let request = format!(
            "GET {} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
            uri
        );
        stream.write_all(request.as_bytes()).await.unwrap();

        let mut response = Vec::new();
        stream.read_to_end(&mut response).await.unwrap();
        String::from_utf8_lossy(&response)
            .split_whitespace()
            .nth(1)
            .and_then(|code| code.parse().ok())
            .unwrap()
    }

    #[tokio::test]
    async fn routes_are_wired() {
        let addr = spawn_server().await;
        assert_eq!(get_status(addr, "/").await, 200);
        assert_eq!(get_status(addr, "/health").await, 200);
        assert_eq!(get_status(addr, "/api/tracks").await, 200);
        assert_eq!(get_status(addr, "/static/img/nocover.png").await, 200);
        assert_eq!(get_status(addr, "/static/js/dashboard.js").await, 200);
        assert_eq!(get_status(addr, "/stream/1").await, 404);
        assert_eq!(get_status(addr, "/pic/1").await, 303);
    }

    #[tokio::test]
    async fn non_numeric_track_id_is_rejected() {
        let addr = spawn_server().await;
        assert_eq!(get_status(addr, "/stream/abc").await, 400);
    }
}
