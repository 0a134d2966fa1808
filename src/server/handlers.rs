use anyhow::Result;
use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use log::warn;

use super::{AppState, ServerError};
use crate::installer::{INSTALL_OPENTOFU, Installer, OPENTOFU_INSTALL};
use crate::render;

pub const HTML: &str = "text/html; charset=utf-8";

/// One hour: the release list changes whenever a release is published.
pub const LIST_CACHE_CONTROL: &str = "max-age=3600";

/// About a year: a tag's assets never change.
pub const DETAIL_CACHE_CONTROL: &str = "max-age=31556926";

/// GET /install-opentofu(.sh|.ps1)
pub(super) async fn install_opentofu(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    dispatch(&INSTALL_OPENTOFU, &state, &headers).await
}

/// GET /
pub(super) async fn opentofu_install(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    dispatch(&OPENTOFU_INSTALL, &state, &headers).await
}

async fn dispatch(
    installer: &Installer,
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Response, ServerError> {
    let user_agent = headers
        .get(header::USER_AGENT)
        .map(|value| String::from_utf8_lossy(value.as_bytes()));
    Ok(installer
        .dispatch(state.assets.as_ref(), user_agent.as_deref())
        .await?)
}

/// GET /releases
pub(super) async fn release_list(State(state): State<AppState>) -> Response {
    let page = state
        .releases
        .list_releases()
        .await
        .map(|releases| render::release_list_page(&releases));
    html_page(page, LIST_CACHE_CONTROL)
}

/// GET /releases/{release}
pub(super) async fn release_detail(
    State(state): State<AppState>,
    release: Result<Path<String>, PathRejection>,
) -> Response {
    let page = match release {
        Ok(Path(release)) => state
            .releases
            .get_release(&release)
            .await
            .map(|release| render::release_detail_page(&release)),
        Err(rejection) => Err(rejection.into()),
    };
    html_page(page, DETAIL_CACHE_CONTROL)
}

/// Failures become a 500 carrying the error text, still labeled as HTML.
fn html_page(page: Result<String>, cache_control: &'static str) -> Response {
    match page {
        Ok(html) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, HTML),
                (header::CACHE_CONTROL, cache_control),
            ],
            html,
        )
            .into_response(),
        Err(e) => {
            warn!("Failed to render releases page: {:#}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, HTML)],
                format!("{:#}", e),
            )
                .into_response()
        }
    }
}
