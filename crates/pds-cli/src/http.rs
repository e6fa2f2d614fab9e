//! JSON API over the same [`App`] the MCP server uses.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{Method, StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use pds_core::{Chart, DiamondChart, FamilyReport};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::app::{
    App, AppError, ChartRequest, DiamondRequest, FamilyRequest, ProfilesRequest, ProfilesView,
};

type SharedApp = Arc<Mutex<App>>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!("request failed: {self}");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub fn router(app: App) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/health", get(health))
        .route("/chart", post(chart))
        .route("/diamond", post(diamond))
        .route("/family", post(family))
        .route("/profiles/{user}", get(profiles))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(Mutex::new(app)))
}

/// Bind `127.0.0.1:port` and serve until Ctrl-C.
pub async fn serve(app: App, port: u16) -> anyhow::Result<()> {
    let address = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&address).await?;
    tracing::info!("HTTP API listening on {address}");

    axum::serve(listener, router(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("HTTP API shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for Ctrl-C: {e}");
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn chart(
    State(app): State<SharedApp>,
    Json(req): Json<ChartRequest>,
) -> Result<Json<Chart>, AppError> {
    Ok(Json(app.lock().await.chart(&req)?))
}

async fn diamond(
    State(app): State<SharedApp>,
    Json(req): Json<DiamondRequest>,
) -> Result<Json<DiamondChart>, AppError> {
    Ok(Json(app.lock().await.diamond(&req)?))
}

async fn family(
    State(app): State<SharedApp>,
    Json(req): Json<FamilyRequest>,
) -> Result<Json<FamilyReport>, AppError> {
    Ok(Json(app.lock().await.family(&req)?))
}

async fn profiles(
    State(app): State<SharedApp>,
    Path(user): Path<String>,
) -> Result<Json<ProfilesView>, AppError> {
    let req = ProfilesRequest { user: Some(user) };
    Ok(Json(app.lock().await.profiles(&req)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::make_app;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;

    async fn send(req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let resp = router(make_app()).oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, json) = send(req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn test_chart() {
        let (status, json) = send(post_json(
            "/chart",
            json!({ "birth_date": "1990-01-01", "name": "ABC" }),
        ))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["age"], 36);
        assert_eq!(json["maturity"], 9);
        assert_eq!(json["triangle"]["missing"], json!([4, 5, 6, 7, 8]));
    }

    #[tokio::test]
    async fn test_invalid_date_is_bad_request() {
        let (status, json) = send(post_json("/diamond", json!({ "birth_date": "1899-01-01" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().contains("1899"));
    }

    #[tokio::test]
    async fn test_family() {
        let (status, json) = send(post_json(
            "/family",
            json!({ "members": [
                { "name": "Ann", "birth_date": "1990-01-01" },
                { "name": "Bo", "birth_date": "1987-12-29" }
            ]}),
        ))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["tips"][0]["kind"], "mirror");
    }

    #[tokio::test]
    async fn test_profiles_for_user() {
        let req = Request::builder()
            .uri("/profiles/joe")
            .body(Body::empty())
            .unwrap();
        let (status, json) = send(req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["user"], "joe");
        assert_eq!(json["tabs"][1]["name"], "Self");
    }
}
