pub mod config;
pub mod processing;
pub mod templates;

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use axum::{
    Router,
    extract::{Multipart, Path, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use config::{RaceCategory, ReportConfig};
use processing::{ReportError, ReportRequest, process_training_log};
use templates::{render_landing_page, render_report_page, render_upload_result};
use tokio::sync::RwLock;
use uuid::Uuid;

/// How many rendered reports stay available for download.
pub const REPORT_STORE_CAPACITY: usize = 64;

/// Rendered reports keyed by download id, oldest evicted first.
#[derive(Clone, Default)]
pub struct ReportStore {
    inner: Arc<RwLock<StoredReports>>,
}

#[derive(Default)]
struct StoredReports {
    pages: HashMap<Uuid, String>,
    order: VecDeque<Uuid>,
}

impl ReportStore {
    pub async fn insert(&self, page: String) -> Uuid {
        let id = Uuid::new_v4();
        let mut stored = self.inner.write().await;
        stored.pages.insert(id, page);
        stored.order.push_back(id);

        while stored.order.len() > REPORT_STORE_CAPACITY {
            if let Some(evicted) = stored.order.pop_front() {
                stored.pages.remove(&evicted);
                tracing::debug!(%evicted, "evicted stored report");
            }
        }
        id
    }

    pub async fn get(&self, id: &Uuid) -> Option<String> {
        self.inner.read().await.pages.get(id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.pages.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ReportConfig>,
    pub reports: ReportStore,
}

impl AppState {
    pub fn new(config: ReportConfig) -> Self {
        Self {
            config: Arc::new(config),
            reports: ReportStore::default(),
        }
    }
}

pub fn build_app() -> Router {
    build_app_with_config(ReportConfig::default())
}

pub fn build_app_with_config(config: ReportConfig) -> Router {
    build_app_with_state(AppState::new(config))
}

pub fn build_app_with_state(state: AppState) -> Router {
    Router::new()
        .route("/", get(landing_page))
        .route("/upload", post(handle_upload))
        .route("/download/:id", get(download_report))
        .with_state(state)
}

async fn landing_page() -> Html<String> {
    Html(render_landing_page())
}

async fn handle_upload(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let mut uploaded: Option<Vec<u8>> = None;
    let mut request = ReportRequest::default();

    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => match field.bytes().await {
                Ok(bytes) => {
                    uploaded = Some(bytes.to_vec());
                }
                Err(err) => {
                    return (
                        StatusCode::BAD_REQUEST,
                        format!("Failed to read uploaded file: {err}"),
                    )
                        .into_response();
                }
            },
            Some("race_type") => {
                if let Ok(value) = field.text().await {
                    if value.trim().is_empty() {
                        continue;
                    }
                    match value.parse::<RaceCategory>() {
                        Ok(category) => request.category = category,
                        Err(err) => {
                            return (StatusCode::BAD_REQUEST, err.to_string()).into_response();
                        }
                    }
                }
            }
            Some(key @ ("athlete_name" | "event_name" | "event_date" | "event_location")) => {
                if let Ok(value) = field.text().await {
                    let slot = match key {
                        "athlete_name" => &mut request.athlete_name,
                        "event_name" => &mut request.event_name,
                        "event_date" => &mut request.event_date,
                        _ => &mut request.event_location,
                    };
                    *slot = Some(value);
                }
            }
            _ => {}
        }
    }

    let file_bytes = match uploaded {
        Some(bytes) => bytes,
        None => return (StatusCode::BAD_REQUEST, "No file provided").into_response(),
    };
    tracing::info!(bytes = file_bytes.len(), category = %request.category, "received training log");

    match process_training_log(&file_bytes, &request, &state.config) {
        Ok(report) => {
            let id = state.reports.insert(render_report_page(&report)).await;
            let download_url = format!("/download/{id}");
            Html(render_upload_result(&report, &download_url)).into_response()
        }
        Err(err) => render_processing_error(err),
    }
}

async fn download_report(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let Ok(id) = Uuid::parse_str(&id) else {
        return (StatusCode::NOT_FOUND, "Report not found").into_response();
    };

    match state.reports.get(&id).await {
        Some(page) => (
            [
                (header::CONTENT_TYPE, "text/html; charset=utf-8"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"race-report.html\"",
                ),
            ],
            page,
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "Report not found").into_response(),
    }
}

fn render_processing_error(error: ReportError) -> Response {
    tracing::warn!(%error, "training log rejected");
    (StatusCode::BAD_REQUEST, error.to_string()).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn store_evicts_the_oldest_report() {
        let store = ReportStore::default();
        let first = store.insert("first".into()).await;
        for n in 0..REPORT_STORE_CAPACITY {
            store.insert(format!("report {n}")).await;
        }

        assert_eq!(store.len().await, REPORT_STORE_CAPACITY);
        assert!(store.get(&first).await.is_none());
    }
}
