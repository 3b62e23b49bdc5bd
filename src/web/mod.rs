//! HTTP layer: one page per request, collected fresh from the OS.

pub mod render;

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::State,
    http::{header, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use rust_embed::RustEmbed;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::collectors::disks;

/// Embedded static assets (stylesheet, table-sort script).
#[derive(RustEmbed)]
#[folder = "static/"]
struct StaticAssets;

/// Per-process settings shared by all request handlers. Collection itself
/// is stateless; nothing here mutates after startup.
pub struct AppState {
    pub ignore_types: HashSet<String>,
    pub host_root:    PathBuf,
}

/// Bind and serve until SIGINT or SIGTERM.
pub async fn serve(listen: &str, state: AppState) -> Result<()> {
    let app = router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(listen).await?;
    info!("listening on http://{listen}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server exited");
    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/disks", get(api_disks))
        .fallback(static_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// The disk table page. Every request re-queries the OS; staleness is zero
/// and no state is shared between requests.
async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    let records = disks::collect_system(&state.host_root, &state.ignore_types);
    Html(render::index_page(&records))
}

/// The same records, machine-readable.
async fn api_disks(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(disks::collect_system(&state.host_root, &state.ignore_types))
}

/// Serve embedded files under /static/; everything else is a 404.
async fn static_handler(uri: Uri) -> Response {
    let path = uri.path().trim_start_matches('/');

    if let Some(rest) = path.strip_prefix("static/") {
        if let Some(content) = StaticAssets::get(rest) {
            let mime = mime_guess::from_path(rest).first_or_octet_stream();
            return (
                StatusCode::OK,
                [(header::CONTENT_TYPE, mime.as_ref().to_string())],
                content.data.to_vec(),
            )
                .into_response();
        }
    }

    (StatusCode::NOT_FOUND, "Not Found").into_response()
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("shutting down gracefully…");
}
