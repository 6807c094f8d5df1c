use std::sync::Arc;

use anyhow::Error;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use log::error;
use serde::Deserialize;

use crate::{
    domain::{list_available, reconcile, register_selected, Event, RocketService},
    error::RocketError,
    infra::selector::NameSelector,
};

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub version: Option<String>,
}

pub fn router(service: RocketService) -> Router {
    Router::new()
        .route("/registry", get(list_registry))
        .route("/apps", get(list_applications).post(register_application))
        .route(
            "/apps/:container_name",
            get(application_config).delete(unregister_application),
        )
        .route("/apps/:container_name/start", post(start_application))
        .route("/apps/:container_name/stop", post(stop_application))
        .route("/routes", get(list_routes))
        .route("/routes/sync", post(sync_routes))
        .with_state(Arc::new(service))
}

fn failure(operation: &str, e: Error) -> (StatusCode, String) {
    let status = match e.downcast_ref::<RocketError>() {
        Some(RocketError::AppNotRegistered(_)) | Some(RocketError::NoAppSelected) => {
            StatusCode::NOT_FOUND
        }
        Some(RocketError::AppAlreadyRegistered(_)) => StatusCode::CONFLICT,
        _ => {
            error!("Error during {} {:?}", operation, e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, format!("{e:#}"))
}

async fn list_registry(State(service): State<Arc<RocketService>>) -> impl IntoResponse {
    list_available(&service)
        .await
        .map(Json)
        .map_err(|e| failure("list_registry", e))
}

async fn list_applications(State(service): State<Arc<RocketService>>) -> impl IntoResponse {
    service
        .workspace
        .get_apps()
        .map(Json)
        .map_err(|e| failure("list_applications", e.into()))
}

async fn register_application(
    State(service): State<Arc<RocketService>>,
    Json(payload): Json<RegisterRequest>,
) -> impl IntoResponse {
    let selector = NameSelector {
        name: payload.name,
        version: payload.version,
    };
    register_selected(&service, &selector)
        .await
        .map(|application| (StatusCode::CREATED, Json(application)))
        .map_err(|e| failure("register_application", e))
}

async fn application_config(
    State(service): State<Arc<RocketService>>,
    Path(container_name): Path<String>,
) -> impl IntoResponse {
    service
        .workspace
        .get_app_cfg(&container_name)
        .map(Json)
        .map_err(|e| failure("application_config", e.into()))
}

async fn unregister_application(
    State(service): State<Arc<RocketService>>,
    Path(container_name): Path<String>,
) -> impl IntoResponse {
    reconcile(Event::Unregister(container_name), service.as_ref())
        .await
        .map(|_| (StatusCode::OK, "Application unregistered"))
        .map_err(|e| failure("unregister_application", e))
}

async fn start_application(
    State(service): State<Arc<RocketService>>,
    Path(container_name): Path<String>,
) -> impl IntoResponse {
    reconcile(Event::Start(container_name), service.as_ref())
        .await
        .map(|_| (StatusCode::OK, "Application started"))
        .map_err(|e| failure("start_application", e))
}

async fn stop_application(
    State(service): State<Arc<RocketService>>,
    Path(container_name): Path<String>,
) -> impl IntoResponse {
    reconcile(Event::Stop(container_name), service.as_ref())
        .await
        .map(|_| (StatusCode::OK, "Application stopped"))
        .map_err(|e| failure("stop_application", e))
}

async fn list_routes(State(service): State<Arc<RocketService>>) -> impl IntoResponse {
    service
        .workspace
        .router()
        .read()
        .map(Json)
        .map_err(|e| failure("list_routes", e.into()))
}

async fn sync_routes(State(service): State<Arc<RocketService>>) -> impl IntoResponse {
    reconcile(Event::Sync, service.as_ref())
        .await
        .map(|_| (StatusCode::OK, "Routes synced"))
        .map_err(|e| failure("sync_routes", e))
}
