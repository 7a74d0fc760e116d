use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, Redirect},
    routing::{get, post},
    Form, Json, Router,
};
use serde::Deserialize;
use server_api::{add_to_list, new_list, view_list, ApiContext};
use shared::{
    domain::ListId,
    error::{ApiError, ErrorCode},
};
use storage::Storage;
use tracing::{error, info};

mod config;
mod pages;

use config::{load_settings, prepare_database_url};

#[derive(Clone)]
struct AppState {
    api: ApiContext,
}

#[derive(Debug, Deserialize)]
struct NewItemForm {
    item_text: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let settings = load_settings();
    let database_url = prepare_database_url(&settings.database_url)?;
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify parent directory exists and permissions are correct"
        );
        error
    })?;

    let state = AppState {
        api: ApiContext { storage },
    };
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(home_page))
        .route("/healthz", get(healthz))
        .route("/lists/new", post(http_new_list))
        .route("/lists/:list_id/", get(http_view_list))
        .route("/lists/:list_id/add_item", post(http_add_item))
        .with_state(state)
}

async fn healthz(
    State(state): State<Arc<AppState>>,
) -> Result<&'static str, (StatusCode, Json<ApiError>)> {
    state.api.storage.health_check().await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError::new(ErrorCode::Internal, e.to_string())),
        )
    })?;
    Ok("ok")
}

async fn home_page() -> Html<String> {
    Html(pages::home_page())
}

async fn http_new_list(
    State(state): State<Arc<AppState>>,
    Form(form): Form<NewItemForm>,
) -> Result<Redirect, (StatusCode, Json<ApiError>)> {
    let list_id = new_list(&state.api, &form.item_text)
        .await
        .map_err(error_response)?;
    Ok(Redirect::to(&format!("/lists/{}/", list_id.0)))
}

async fn http_view_list(
    State(state): State<Arc<AppState>>,
    Path(list_id): Path<i64>,
) -> Result<Html<String>, (StatusCode, Json<ApiError>)> {
    let page = view_list(&state.api, ListId(list_id))
        .await
        .map_err(error_response)?;
    Ok(Html(pages::list_page(&page)))
}

async fn http_add_item(
    State(state): State<Arc<AppState>>,
    Path(list_id): Path<i64>,
    Form(form): Form<NewItemForm>,
) -> Result<Redirect, (StatusCode, Json<ApiError>)> {
    let list_id = ListId(list_id);
    add_to_list(&state.api, list_id, &form.item_text)
        .await
        .map_err(error_response)?;
    Ok(Redirect::to(&format!("/lists/{}/", list_id.0)))
}

fn error_response(error: ApiError) -> (StatusCode, Json<ApiError>) {
    let status = match error.code {
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(error))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;

#[cfg(test)]
#[path = "tests/functional_tests.rs"]
mod functional_tests;
