//! Server execution logic.

use std::sync::Arc;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::get,
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::ServerConfig;

use super::{
    handler::{health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// WebSocket relay server
///
/// This struct encapsulates the server configuration and provides methods to run the server.
///
/// # Example
///
/// ```ignore
/// let state = Arc::new(AppState::new(verifier, registry, message_pusher, clock));
/// let server = Server::new(state, &config);
/// server.run().await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
    bind_addr: String,
    /// 許可するブラウザのオリジン（`*` は全て許可）
    client_url: String,
}

impl Server {
    pub fn new(state: Arc<AppState>, config: &ServerConfig) -> Self {
        Self {
            state,
            bind_addr: config.bind_addr(),
            client_url: config.client_url.clone(),
        }
    }

    /// Build the HTTP router
    ///
    /// - `GET /ws`: WebSocket エンドポイント（認証必須）
    /// - `GET /api/health`: ヘルスチェック
    pub fn router(&self) -> Router {
        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .with_state(self.state.clone())
            .layer(cors_layer(&self.client_url))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the WebSocket relay server
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the configured address or
    /// if there's an error during server execution.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let listener = TcpListener::bind(&self.bind_addr).await?;

        tracing::info!("SkillSync relay listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/ws?token=<jwt>", self.bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener).await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }

    /// Serve on an already bound listener until a shutdown signal arrives
    pub async fn serve(self, listener: TcpListener) -> std::io::Result<()> {
        let app = self.router();
        let state = self.state.clone();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown_signal().await;
                // 開いているソケットを閉じ、切断処理を走らせる
                state.begin_shutdown();
            })
            .await
    }
}

fn cors_layer(client_url: &str) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if client_url == crate::config::ANY_ORIGIN {
        return base.allow_origin(AllowOrigin::any());
    }

    match HeaderValue::from_str(client_url) {
        Ok(origin) => base
            .allow_origin(AllowOrigin::exact(origin))
            .allow_credentials(true),
        Err(e) => {
            tracing::warn!("Ignoring invalid client URL '{}': {}", client_url, e);
            base.allow_origin(AllowOrigin::list(Vec::<HeaderValue>::new()))
        }
    }
}
