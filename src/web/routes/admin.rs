use askama::Template;
use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderValue},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use chrono::Utc;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::Deserialize;
use tracing::warn;

use crate::error::AppError;
use crate::models::RegistrationSummary;
use crate::services::admin_service::{self, AdminFilter, AdminStats, StatusFilter};
use crate::web::state::AppState;

#[derive(Template)]
#[template(path = "admin.html")]
pub struct AdminTemplate {
    pub stats: AdminStats,
    pub rows: Vec<RegistrationSummary>,
    pub search: String,
    pub status: &'static str,
    pub notice: Option<String>,
    pub build_id: &'static str,
}

#[derive(Debug, Deserialize, Default)]
pub struct AdminQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub status: StatusFilter,
    pub notice: Option<String>,
}

impl AdminQuery {
    fn filter(&self) -> AdminFilter {
        AdminFilter {
            search: self.q.clone(),
            status: self.status,
        }
    }
}

async fn refresh_board(state: &AppState) {
    let board = admin_service::load_board(state.records.as_ref()).await;
    *state.admin_board.write().await = board;
}

async fn render_board(
    state: &AppState,
    filter: &AdminFilter,
    notice: Option<String>,
) -> Result<Response, AppError> {
    let board = state.admin_board.read().await;
    let template = AdminTemplate {
        stats: board.stats(),
        rows: board.filtered(filter).into_iter().cloned().collect(),
        search: filter.search.clone(),
        status: filter.status.as_str(),
        notice: notice.as_deref().and_then(notice_text).map(str::to_string),
        build_id: crate::BUILD_ID,
    };
    Ok(Html(template.render()?).into_response())
}

fn notice_text(code: &str) -> Option<&'static str> {
    match code {
        "verified" => Some("Payment marked as verified."),
        "verify_failed" => Some("Failed to verify payment"),
        _ => None,
    }
}

fn filter_query(filter: &AdminFilter) -> String {
    format!(
        "q={}&status={}",
        utf8_percent_encode(&filter.search, NON_ALPHANUMERIC),
        filter.status.as_str()
    )
}

/// Page load: always fetches a fresh board.
pub async fn admin_page(State(state): State<AppState>) -> Result<Response, AppError> {
    refresh_board(&state).await;
    render_board(&state, &AdminFilter::default(), None).await
}

pub async fn refresh_handler(
    State(state): State<AppState>,
    Form(filter): Form<AdminFilter>,
) -> Response {
    refresh_board(&state).await;
    Redirect::to(&format!("/admin/registrations?{}", filter_query(&filter))).into_response()
}

/// Search and status filtering over the last fetch.
pub async fn registrations_handler(
    State(state): State<AppState>,
    Query(query): Query<AdminQuery>,
) -> Result<Response, AppError> {
    if !state.admin_board.read().await.is_loaded() {
        refresh_board(&state).await;
    }
    render_board(&state, &query.filter(), query.notice).await
}

pub async fn verify_handler(
    State(state): State<AppState>,
    Path(ticket_id): Path<String>,
    Form(filter): Form<AdminFilter>,
) -> Response {
    let notice = match admin_service::verify_payment(
        &state.admin_board,
        state.records.as_ref(),
        &ticket_id,
    )
    .await
    {
        Ok(()) => "verified",
        Err(e) => {
            warn!("Verify failed for {}: {}", ticket_id, e);
            "verify_failed"
        }
    };
    Redirect::to(&format!(
        "/admin/registrations?{}&notice={}",
        filter_query(&filter),
        notice
    ))
    .into_response()
}

pub async fn export_handler(
    State(state): State<AppState>,
    Query(filter): Query<AdminFilter>,
) -> Response {
    let csv = state.admin_board.read().await.export_csv(&filter);
    let file_name = admin_service::export_file_name(Utc::now().date_naive());

    let mut response = csv.into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/csv; charset=utf-8"),
    );
    if let Ok(value) = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", file_name)) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    response
}
