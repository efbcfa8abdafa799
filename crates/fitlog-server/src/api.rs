//! Router assembly and shared request plumbing.
//!
//! Authentication is an upstream concern: the gateway in front of this
//! service verifies credentials and forwards the caller's user id in the
//! `x-user-id` header.  Handlers that mutate state require it; read
//! handlers work with or without it.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, Method},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Serialize;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

use fitlog_store::Database;

use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::{accounts, posts, profiles, social, stats, workouts};

/// Header carrying the upstream-authenticated user id.
pub const USER_ID_HEADER: &str = "x-user-id";

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Mutex<Database>>,
    pub config: Arc<ServerConfig>,
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/api/users", post(accounts::register))
        .route("/api/users/{id}", delete(accounts::delete_account))
        .route("/api/workouts", get(workouts::list).post(workouts::create))
        .route("/api/workouts/statistics", get(stats::my_statistics))
        .route(
            "/api/workouts/{id}",
            get(workouts::detail)
                .put(workouts::update)
                .delete(workouts::remove),
        )
        .route("/api/posts", get(posts::list).post(posts::create))
        .route(
            "/api/posts/{id}",
            get(posts::detail).put(posts::update).delete(posts::remove),
        )
        .route("/api/posts/{id}/comments", get(social::list_comments))
        .route("/api/comments", post(social::create_comment))
        .route("/api/comments/{id}", delete(social::delete_comment))
        .route("/api/profiles", get(profiles::list))
        .route("/api/profiles/current", get(profiles::current))
        .route(
            "/api/profiles/{owner_id}",
            get(profiles::detail).put(profiles::update),
        )
        .route(
            "/api/profiles/{owner_id}/statistics",
            get(stats::profile_statistics),
        )
        .route("/api/likes", post(social::create_like))
        .route("/api/likes/{id}", delete(social::delete_like))
        .route(
            "/api/followers",
            get(social::list_following).post(social::create_follow),
        )
        .route("/api/followers/{id}", delete(social::delete_follow))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// The authenticated requester, if the gateway forwarded one.
pub fn requester(headers: &HeaderMap) -> Result<Option<Uuid>, ApiError> {
    let Some(value) = headers.get(USER_ID_HEADER) else {
        return Ok(None);
    };
    let s = value
        .to_str()
        .map_err(|_| ApiError::BadRequest(format!("invalid {USER_ID_HEADER} header")))?;
    let id = Uuid::parse_str(s)
        .map_err(|_| ApiError::BadRequest(format!("invalid {USER_ID_HEADER} header")))?;
    Ok(Some(id))
}

/// Like [`requester`], but mutations need an identity.
pub fn require_requester(headers: &HeaderMap) -> Result<Uuid, ApiError> {
    requester(headers)?.ok_or(ApiError::Forbidden("authentication required"))
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    instance: String,
    version: &'static str,
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        instance: state.config.instance_name.clone(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> anyhow::Result<()> {
    let app = build_router(state);

    info!(addr = %addr, "Starting HTTP API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn requester_header_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(requester(&headers).unwrap(), None);
        assert!(matches!(
            require_requester(&headers),
            Err(ApiError::Forbidden(_))
        ));

        let id = Uuid::new_v4();
        headers.insert(USER_ID_HEADER, HeaderValue::from_str(&id.to_string()).unwrap());
        assert_eq!(requester(&headers).unwrap(), Some(id));
        assert_eq!(require_requester(&headers).unwrap(), id);

        headers.insert(USER_ID_HEADER, HeaderValue::from_static("not-a-uuid"));
        assert!(requester(&headers).is_err());
    }
}
