//! Dashboard request handlers

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use axum::{
    extract::{Path as UrlPath, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use super::insights::{insights as compute_insights, Insights};
use super::pages::{self, PageFigure, TablePage};
use super::server::AppState;
use crate::charts::page_figures;
use crate::error::OutlookError;
use crate::tables::TableId;

/// Standard API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            request_id: Uuid::new_v4().to_string(),
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            request_id: Uuid::new_v4().to_string(),
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Query string of the table pages and insight endpoint
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub select: Option<String>,
    pub material: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FigureQuery {
    pub download: Option<String>,
}

/// GET / - Introduction page
pub async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(pages::index_page(&state.version))
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_message: String,
}

/// GET /health - Health check
pub async fn health() -> impl IntoResponse {
    Json(ApiResponse::ok(HealthResponse {
        status: "healthy".to_string(),
        uptime_message: "Server is running".to_string(),
    }))
}

/// Version response
#[derive(Serialize)]
pub struct VersionResponse {
    pub version: String,
    pub tables: Vec<String>,
}

/// GET /version - Server version and served tables
pub async fn version(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ApiResponse::ok(VersionResponse {
        version: state.version.clone(),
        tables: TableId::ALL.iter().map(|t| t.id().to_string()).collect(),
    }))
}

fn not_found_page(id: &str) -> Response {
    let body = format!(
        "<h1>Not found</h1>\n<p>There is no table '{}'.</p>\n",
        crate::charts::escape_html(id)
    );
    (StatusCode::NOT_FOUND, Html(pages::layout("Not found", None, &body))).into_response()
}

fn internal_error(e: impl std::fmt::Display) -> Response {
    warn!(error = %e, "request failed");
    (StatusCode::INTERNAL_SERVER_ERROR, format!("Internal error: {}", e)).into_response()
}

/// GET /tables/:id?select=&material= - One table's figures
pub async fn table_page(
    State(state): State<Arc<AppState>>,
    UrlPath(id): UrlPath<String>,
    Query(query): Query<PageQuery>,
) -> Response {
    let Some(table) = TableId::from_id(&id) else {
        return not_found_page(&id);
    };

    // Listing options opens the cleaned workbook
    let config = state.config.clone();
    let options =
        match tokio::task::spawn_blocking(move || pages::entity_options(table, &config)).await {
            Ok(options) => options,
            Err(e) => return internal_error(e),
        };

    let select = query
        .select
        .filter(|s| !s.trim().is_empty())
        .or_else(|| options.first().cloned())
        .unwrap_or_default();
    let materials = pages::material_options(table);
    let material = query.material.filter(|m| materials.contains(m));

    let dir = state.config.figures_dir.join(table.figures_subdir());
    let mut figures = Vec::new();
    for figure in page_figures(table, &select, material.as_deref(), state.config.target_year) {
        let available = tokio::fs::try_exists(dir.join(&figure.file))
            .await
            .unwrap_or(false);
        figures.push(PageFigure { figure, available });
    }
    debug!(table = table.id(), select = %select, figures = figures.len(), "table page");

    // Growth is shown only once the table has been cleaned
    let config = state.config.clone();
    let (growth_select, growth_material) = (select.clone(), material.clone());
    let insights = match tokio::task::spawn_blocking(move || {
        compute_insights(table, &growth_select, growth_material.as_deref(), &config)
    })
    .await
    {
        Ok(Ok(insights)) => Some(insights),
        Ok(Err(e)) => {
            debug!(table = table.id(), error = %e, "no growth figures for page");
            None
        }
        Err(e) => return internal_error(e),
    };

    Html(pages::table_page(&TablePage {
        table,
        select,
        options,
        material,
        materials,
        figures,
        insights,
    }))
    .into_response()
}

/// Relative path made only of normal components
fn safe_relative(path: &str) -> Option<PathBuf> {
    let path = Path::new(path);
    if path.as_os_str().is_empty() {
        return None;
    }
    path.components()
        .all(|c| matches!(c, Component::Normal(_)))
        .then(|| path.to_path_buf())
}

fn content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") | Some("htm") => "text/html; charset=utf-8",
        Some("png") => "image/png",
        Some("svg") => "image/svg+xml",
        Some("json") => "application/json",
        _ => "application/octet-stream",
    }
}

/// GET /figures/*path - A chart file; `?download=1` as an attachment
pub async fn figure(
    State(state): State<Arc<AppState>>,
    UrlPath(path): UrlPath<String>,
    Query(query): Query<FigureQuery>,
) -> Response {
    let Some(relative) = safe_relative(&path) else {
        return (StatusCode::BAD_REQUEST, "Invalid figure path").into_response();
    };
    let full = state.config.figures_dir.join(&relative);
    let bytes = match tokio::fs::read(&full).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return (StatusCode::NOT_FOUND, format!("Figure not found: {}", path)).into_response();
        }
        Err(e) => return internal_error(e),
    };

    let mut response = ([(header::CONTENT_TYPE, content_type(&relative))], bytes).into_response();
    if query.download.as_deref().is_some_and(|d| d == "1" || d == "true") {
        let name = relative
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("figure");
        let disposition = format!("attachment; filename=\"{}\"", name.replace('"', ""));
        match disposition.parse::<HeaderValue>() {
            Ok(value) => {
                response.headers_mut().insert(header::CONTENT_DISPOSITION, value);
            }
            Err(e) => return internal_error(e),
        }
    }
    response
}

/// GET /api/v1/insights/:id?select=&material= - Growth from the cleaned workbook
pub async fn insights(
    State(state): State<Arc<AppState>>,
    UrlPath(id): UrlPath<String>,
    Query(query): Query<PageQuery>,
) -> (StatusCode, Json<ApiResponse<Insights>>) {
    let Some(table) = TableId::from_id(&id) else {
        return (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::err(format!("Unknown table '{}'", id))),
        );
    };

    let config = state.config.clone();
    let result = tokio::task::spawn_blocking(move || {
        let select = match query.select.filter(|s| !s.trim().is_empty()) {
            Some(select) => select,
            None => pages::entity_options(table, &config)
                .into_iter()
                .next()
                .unwrap_or_default(),
        };
        compute_insights(table, &select, query.material.as_deref(), &config)
    })
    .await;

    match result {
        Ok(Ok(insights)) => (StatusCode::OK, Json(ApiResponse::ok(insights))),
        Ok(Err(e @ OutlookError::NotFound(_))) => {
            (StatusCode::NOT_FOUND, Json(ApiResponse::err(e.to_string())))
        }
        Ok(Err(e)) => {
            warn!(table = table.id(), error = %e, "insights failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(ApiResponse::err(e.to_string())))
        }
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, Json(ApiResponse::err(e.to_string()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_response_ok_creates_success_response() {
        let response: ApiResponse<String> = ApiResponse::ok("test data".to_string());
        assert!(response.success);
        assert_eq!(response.data, Some("test data".to_string()));
        assert!(response.error.is_none());
        // UUID format (8-4-4-4-12)
        assert_eq!(response.request_id.len(), 36);
    }

    #[test]
    fn test_api_response_err_skips_data() {
        let response: ApiResponse<String> = ApiResponse::err("Something went wrong");
        assert!(!response.success);
        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("\"data\""));
        assert!(json.contains("Something went wrong"));
    }

    #[test]
    fn test_safe_relative() {
        assert!(safe_relative("table_1/copper_trends.html").is_some());
        assert!(safe_relative("../secret.txt").is_none());
        assert!(safe_relative("table_1/../../etc/passwd").is_none());
        assert!(safe_relative("/etc/passwd").is_none());
        assert!(safe_relative("").is_none());
    }

    #[test]
    fn test_content_type() {
        assert_eq!(content_type(Path::new("a/b.html")), "text/html; charset=utf-8");
        assert_eq!(content_type(Path::new("a/b.png")), "image/png");
        assert_eq!(content_type(Path::new("a/b")), "application/octet-stream");
    }
}
