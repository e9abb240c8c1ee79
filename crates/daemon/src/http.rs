use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use signal_core::{
    api::{ErrorResponse, UpdateCountsResponse, UpdateStatus},
    SchedulerStatus, SignalPlan,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::service::SignalService;

#[derive(Clone)]
pub struct AppState {
    svc: Arc<SignalService>,
}

pub fn router(svc: Arc<SignalService>) -> Router {
    let state = AppState { svc };
    Router::new()
        .route("/healthz", get(healthz))
        .route("/update_counts", post(update_counts))
        .route("/get_signal_times", get(get_signal_times))
        .route("/v1/status", get(status))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn update_counts(State(st): State<AppState>, body: Bytes) -> Result<Response, AppError> {
    let payload: Value = if body.iter().all(u8::is_ascii_whitespace) {
        Value::Null
    } else {
        serde_json::from_slice(&body).map_err(|e| AppError::bad_request(e.into()))?
    };

    let update = match payload {
        Value::Object(map) if !map.is_empty() => map,
        Value::Null | Value::Object(_) => return Ok(no_data()),
        other => {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "counts must be a JSON object, got {other}"
            )))
        }
    };

    let report = st.svc.update_counts(&update).await;
    Ok(Json(UpdateCountsResponse::from_report(report)).into_response())
}

fn no_data() -> Response {
    let body = UpdateCountsResponse {
        status: UpdateStatus::Error,
        message: "No data provided".into(),
    };
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}

async fn get_signal_times(State(st): State<AppState>) -> Json<SignalPlan> {
    Json(st.svc.compute_schedule().await)
}

async fn status(State(st): State<AppState>) -> Json<SchedulerStatus> {
    Json(st.svc.status().await)
}

#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    source: anyhow::Error,
}

impl AppError {
    fn bad_request(source: anyhow::Error) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            source,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(error = %self.source, "request failed");
        } else {
            tracing::warn!(error = %self.source, status = %self.status, "request rejected");
        }
        let body = Json(ErrorResponse {
            error: self.source.to_string(),
        });
        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use serde::de::DeserializeOwned;
    use signal_core::{Direction, SignalScheduler};

    use super::*;

    fn state() -> AppState {
        AppState {
            svc: Arc::new(SignalService::new(SignalScheduler::new())),
        }
    }

    async fn read_json<T: DeserializeOwned>(resp: Response) -> T {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn update_then_schedule() {
        let st = state();
        let resp = update_counts(
            State(st.clone()),
            Bytes::from_static(br#"{"north": 50, "south": "5", "bogus": 1}"#),
        )
        .await
        .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body: UpdateCountsResponse = read_json(resp).await;
        assert!(body.is_success());
        assert_eq!(body.message, "Counts updated successfully");

        let Json(first) = get_signal_times(State(st.clone())).await;
        assert_eq!(first.green(), Some((Direction::North, 60)));
        let Json(second) = get_signal_times(State(st.clone())).await;
        assert_eq!(second.green(), Some((Direction::South, 15)));

        let Json(snapshot) = status(State(st)).await;
        assert_eq!(snapshot.last_green, Some(Direction::South));
    }

    #[tokio::test]
    async fn empty_body_is_bad_request() {
        for body in ["", "{}", "null"] {
            let resp = update_counts(State(state()), Bytes::from(body))
                .await
                .unwrap();
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "body {body:?}");
            let body: UpdateCountsResponse = read_json(resp).await;
            assert_eq!(body.status, UpdateStatus::Error);
            assert_eq!(body.message, "No data provided");
        }
    }

    #[tokio::test]
    async fn malformed_json_is_rejected() {
        for body in ["{north:", "[1, 2]"] {
            let err = update_counts(State(state()), Bytes::from(body))
                .await
                .unwrap_err();
            let resp = err.into_response();
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
            let body: ErrorResponse = read_json(resp).await;
            assert!(!body.error.is_empty());
        }
    }

    #[tokio::test]
    async fn invalid_count_reports_error_and_keeps_counts() {
        let st = state();
        let resp = update_counts(State(st.clone()), Bytes::from_static(br#"{"north": "abc"}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body: UpdateCountsResponse = read_json(resp).await;
        assert_eq!(body.status, UpdateStatus::Error);
        assert!(body.message.contains("abc"));

        let Json(snapshot) = status(State(st)).await;
        assert_eq!(snapshot.counts.get(Direction::North), 0);
        assert_eq!(snapshot.last_green, None);
    }
}
