//! Dashboard server
//!
//! Serves the table pages, the chart files written by the chart stage and a
//! small JSON API over the cleaned workbooks.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use super::handlers;
use crate::config::OutlookConfig;

/// Shared application state
#[derive(Debug, Clone)]
pub struct AppState {
    pub version: String,
    pub config: OutlookConfig,
}

impl AppState {
    pub fn new(config: OutlookConfig) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            config,
        }
    }
}

/// Build the router; split out from `run_dashboard` so tests can drive it
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Pages
        .route("/", get(handlers::index))
        .route("/tables/:id", get(handlers::table_page))
        .route("/figures/*path", get(handlers::figure))
        // JSON API
        .route("/api/v1/insights/:id", get(handlers::insights))
        .route("/health", get(handlers::health))
        .route("/version", get(handlers::version))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Run the dashboard until Ctrl+C or SIGTERM. The caller installs the
/// tracing subscriber.
pub async fn run_dashboard(config: OutlookConfig) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let figures_dir = config.figures_dir.clone();
    let app = router(Arc::new(AppState::new(config)));

    info!("Mineral Outlook dashboard starting on http://{}", addr);
    info!("   Figures: {}", figures_dir.display());
    info!("   API: /api/v1/insights/:id, Health: /health, Version: /version");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Dashboard shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, stopping server...");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn app(dir: &TempDir) -> Router {
        let config = OutlookConfig {
            output_dir: dir.path().join("output"),
            figures_dir: dir.path().join("figures"),
            ..Default::default()
        };
        router(Arc::new(AppState::new(config)))
    }

    async fn get_body(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8_lossy(&bytes).to_string())
    }

    #[tokio::test]
    async fn test_health_and_version() {
        let dir = TempDir::new().unwrap();
        let (status, body) = get_body(app(&dir), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("healthy"));

        let (_, body) = get_body(app(&dir), "/version").await;
        assert!(body.contains(env!("CARGO_PKG_VERSION")));
        assert!(body.contains("\"4.6\""));
    }

    #[tokio::test]
    async fn test_table_page_lists_figures() {
        let dir = TempDir::new().unwrap();
        let chart = dir.path().join("figures/table_3_2/statistics_net_zero.html");
        std::fs::create_dir_all(chart.parent().unwrap()).unwrap();
        std::fs::write(&chart, "<html></html>").unwrap();

        let (status, body) = get_body(app(&dir), "/tables/3.2?select=Net%20Zero").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("src=\"/figures/table_3_2/statistics_net_zero.html\""));
        assert!(body.contains("Chart not available: top_growing_metals_net_zero.html"));

        let (status, _) = get_body(app(&dir), "/tables/9").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_figure_download_and_traversal() {
        let dir = TempDir::new().unwrap();
        let chart = dir.path().join("figures/table_1/copper_trends.html");
        std::fs::create_dir_all(chart.parent().unwrap()).unwrap();
        std::fs::write(&chart, "<html>copper</html>").unwrap();

        let response = app(&dir)
            .oneshot(
                Request::builder()
                    .uri("/figures/table_1/copper_trends.html?download=1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"copper_trends.html\""
        );
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/html; charset=utf-8");

        let (status, _) = get_body(app(&dir), "/figures/table_1/missing.html").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = get_body(app(&dir), "/figures/table_1/%2E%2E/%2E%2E/secret.txt").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_insights_not_found() {
        let dir = TempDir::new().unwrap();
        let (status, body) = get_body(app(&dir), "/api/v1/insights/3.2?select=Net%20Zero").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("\"success\":false"));

        let (status, _) = get_body(app(&dir), "/api/v1/insights/7").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
