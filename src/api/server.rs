use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::location::types::coerce_number;
use crate::location::{Coordinate, LocationStore, StoredLocation};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<LocationStore>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing coordinates (lat or lng)")]
    MissingCoordinates,
    #[error("Coordinates must be numeric")]
    NonNumericCoordinates,
    #[error("Invalid JSON body: {0}")]
    InvalidBody(String),
    #[error("Method Not Allowed")]
    MethodNotAllowed,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingCoordinates
            | ApiError::NonNumericCoordinates
            | ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateRequest {
    #[serde(default)]
    pub lat: Option<Value>,
    #[serde(default)]
    pub lng: Option<Value>,
}

pub fn router(store: Arc<LocationStore>) -> Router {
    Router::new()
        .route(
            "/api/update",
            get(get_location)
                .post(update_location)
                .fallback(method_not_allowed),
        )
        .route("/api/get-loc", get(get_location))
        .route("/health", get(health_check))
        .with_state(AppState { store })
}

pub async fn run_server(store: Arc<LocationStore>, addr: SocketAddr) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    serve(listener, store).await
}

pub async fn serve(listener: TcpListener, store: Arc<LocationStore>) -> std::io::Result<()> {
    info!(addr = %listener.local_addr()?, "Starting HTTP server");
    axum::serve(listener, router(store)).await
}

pub async fn get_location(State(state): State<AppState>) -> Json<StoredLocation> {
    Json(state.store.read().await.into())
}

pub async fn update_location(
    State(state): State<AppState>,
    payload: Result<Json<UpdateRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(body) = payload.map_err(|rejection| {
        warn!(error = %rejection.body_text(), "Rejected location update with unreadable body");
        ApiError::InvalidBody(rejection.body_text())
    })?;
    let (Some(raw_lat), Some(raw_lng)) = (body.lat, body.lng) else {
        warn!("Rejected location update without coordinates");
        return Err(ApiError::MissingCoordinates);
    };
    // Non-finite values would serialise as null on every later read.
    let finite = |raw: &Value| coerce_number(raw).filter(|v| v.is_finite());
    let (Some(lat), Some(lng)) = (finite(&raw_lat), finite(&raw_lng)) else {
        warn!(%raw_lat, %raw_lng, "Rejected location update with non-numeric coordinates");
        return Err(ApiError::NonNumericCoordinates);
    };

    let stored = state.store.write(Coordinate::now(lat, lng)).await;
    info!(lat, lng, "Location updated");

    Ok(Json(json!({
        "status": "OK",
        "message": "Location updated successfully",
        "lat": stored.latitude,
        "lng": stored.longitude,
    })))
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> AppState {
        AppState {
            store: Arc::new(LocationStore::new(Coordinate::now(14.5995, 120.9842))),
        }
    }

    fn request(
        lat: Option<Value>,
        lng: Option<Value>,
    ) -> Result<Json<UpdateRequest>, JsonRejection> {
        Ok(Json(UpdateRequest { lat, lng }))
    }

    #[tokio::test]
    async fn get_returns_the_default_before_any_write() {
        let Json(body) = get_location(State(state())).await;
        assert_eq!((body.lat, body.lng), (14.5995, 120.9842));
        assert!(body.timestamp > 0);
    }

    #[tokio::test]
    async fn post_stores_and_echoes_the_coordinate() {
        let state = state();
        let Json(ack) = update_location(
            State(state.clone()),
            request(Some(json!(14.65)), Some(json!(121.08))),
        )
        .await
        .unwrap();

        assert_eq!(ack["status"], "OK");
        assert_eq!(ack["lat"], 14.65);
        assert_eq!(ack["lng"], 121.08);

        let Json(body) = get_location(State(state)).await;
        assert_eq!((body.lat, body.lng), (14.65, 121.08));
    }

    #[tokio::test]
    async fn post_coerces_numeric_strings() {
        let state = state();
        update_location(State(state.clone()), request(Some(json!("14.7")), Some(json!("121.05"))))
            .await
            .unwrap();
        assert_eq!(state.store.read().await.latitude, 14.7);
    }

    #[tokio::test]
    async fn post_without_lng_is_rejected_without_side_effects() {
        let state = state();
        update_location(State(state.clone()), request(Some(json!(14.65)), Some(json!(121.08))))
            .await
            .unwrap();

        let err = update_location(State(state.clone()), request(Some(json!(15.0)), None))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::MissingCoordinates));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let stored = state.store.read().await;
        assert_eq!((stored.latitude, stored.longitude), (14.65, 121.08));
    }

    #[tokio::test]
    async fn post_with_garbage_is_rejected() {
        let err = update_location(State(state()), request(Some(json!("north")), Some(json!(1))))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NonNumericCoordinates));
    }

    #[tokio::test]
    async fn post_with_non_finite_values_is_rejected_without_side_effects() {
        let state = state();
        update_location(State(state.clone()), request(Some(json!(14.65)), Some(json!(121.08))))
            .await
            .unwrap();

        for (lat, lng) in [
            (json!("NaN"), json!(121.0)),
            (json!(14.6), json!("inf")),
            (json!("-infinity"), json!("NaN")),
        ] {
            let err = update_location(State(state.clone()), request(Some(lat), Some(lng)))
                .await
                .unwrap_err();
            assert!(matches!(err, ApiError::NonNumericCoordinates));
            assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        }

        let Json(body) = get_location(State(state)).await;
        assert_eq!((body.lat, body.lng), (14.65, 121.08));
    }

    #[tokio::test]
    async fn post_accepts_the_sentinel_as_is() {
        // Plausibility is the client's call; the store keeps what it is given.
        let state = state();
        update_location(State(state.clone()), request(Some(json!(0)), Some(json!(0))))
            .await
            .unwrap();
        assert_eq!(state.store.read().await.latitude, 0.0);
    }

    #[test]
    fn errors_map_to_statuses() {
        assert_eq!(ApiError::MethodNotAllowed.status(), StatusCode::METHOD_NOT_ALLOWED);
        let response = ApiError::MissingCoordinates.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let response = ApiError::InvalidBody("EOF".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
