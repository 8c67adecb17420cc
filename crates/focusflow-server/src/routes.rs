//! HTTP handlers for the profile API.
//!
//! The contract the core's `ApiClient` speaks: user payloads are
//! `{profile, settings}` envelopes, error bodies are `{error: "..."}`,
//! and updates merge shallowly per field group.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use focusflow_core::{ProfileUpdate, SettingsUpdate, UserEnvelope};

use crate::store::UserDb;

pub fn router(db: Arc<UserDb>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/users", post(create_user))
        .route("/api/users/:id", get(get_user).patch(patch_user))
        .with_state(db)
}

fn error_body(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

async fn health(State(db): State<Arc<UserDb>>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "OK",
        "usersCount": db.count(),
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

async fn get_user(State(db): State<Arc<UserDb>>, Path(id): Path<String>) -> Response {
    match db.get(&id) {
        Some(user) => Json(user).into_response(),
        None => error_body(StatusCode::NOT_FOUND, "Usuário não encontrado"),
    }
}

#[derive(Debug, Deserialize)]
struct CreateUserBody {
    id: Option<String>,
    #[serde(default)]
    profile: Option<ProfileUpdate>,
    #[serde(default)]
    settings: Option<SettingsUpdate>,
}

/// Registers a user. Whatever the client sends is merged over the
/// server defaults, so a bare `{id}` yields a fully populated envelope.
async fn create_user(
    State(db): State<Arc<UserDb>>,
    Json(body): Json<CreateUserBody>,
) -> Response {
    let Some(id) = body.id.as_deref().map(str::trim).filter(|s| !s.is_empty()) else {
        return error_body(StatusCode::BAD_REQUEST, "ID do usuário é obrigatório");
    };

    let mut user = UserEnvelope::default();
    if let Some(profile) = &body.profile {
        profile.apply(&mut user.profile);
    }
    if let Some(settings) = &body.settings {
        settings.apply(&mut user.settings);
    }
    db.insert(id, user.clone());
    tracing::info!(user = id, "user registered");

    (StatusCode::CREATED, Json(user)).into_response()
}

#[derive(Debug, Deserialize)]
struct PatchUserBody {
    #[serde(default)]
    profile: Option<ProfileUpdate>,
    #[serde(default)]
    settings: Option<SettingsUpdate>,
}

async fn patch_user(
    State(db): State<Arc<UserDb>>,
    Path(id): Path<String>,
    Json(body): Json<PatchUserBody>,
) -> Response {
    // An empty field group carries no update; `{"profile": {}}` is as
    // void as `{}`.
    let profile = body.profile.filter(|group| !group.is_empty());
    let settings = body.settings.filter(|group| !group.is_empty());
    if profile.is_none() && settings.is_none() {
        return error_body(StatusCode::BAD_REQUEST, "Dados para atualização são obrigatórios");
    }

    let updated = db.update(&id, |user| {
        if let Some(profile) = &profile {
            profile.apply(&mut user.profile);
        }
        if let Some(settings) = &settings {
            settings.apply(&mut user.settings);
        }
    });

    match updated {
        Some(user) => Json(user).into_response(),
        None => error_body(StatusCode::NOT_FOUND, "Usuário não encontrado"),
    }
}
