//! HTTP handlers for the sketchpad and the word hunt.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use carnival::core_modules::guess_scoring::sanitize;
use carnival::{CarnivalError, InferenceService, PointSet, ValidationError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

/// Shared by every request. Holds no per-player state.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<dyn InferenceService>,
    pub grid_size: u32,
}

/// A drawn cell as sent by the browser; may lie outside the grid.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RawCell {
    pub x: i64,
    pub y: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PredictRequest {
    pub points: Vec<RawCell>,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    pub prediction: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CoordinatesRequest {
    pub word: String,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct CoordinatesResponse {
    pub coordinates: [f64; 2],
    pub scalar: Option<f64>,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Error half of every handler: a status plus a message safe to show a player.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl From<CarnivalError> for ApiError {
    fn from(err: CarnivalError) -> Self {
        match err {
            CarnivalError::Validation(err) => Self {
                status: StatusCode::BAD_REQUEST,
                message: err.to_string(),
            },
            CarnivalError::ExternalService(err) => {
                error!(error = %err, "inference call failed");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: "Prediction failed.".to_string(),
                }
            }
            other => Self {
                status: StatusCode::CONFLICT,
                message: other.to_string(),
            },
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        CarnivalError::from(err).into()
    }
}

impl From<carnival::InferenceError> for ApiError {
    fn from(err: carnival::InferenceError) -> Self {
        CarnivalError::from(err).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}

/// `POST /api/predict`: classify the base digit with the drawn cells knocked out.
pub async fn predict(
    State(state): State<AppState>,
    Json(request): Json<PredictRequest>,
) -> Result<Json<PredictResponse>, ApiError> {
    let points = PointSet::from_cells(state.grid_size, request.points.iter().map(|c| (c.x, c.y)))?;
    if points.is_empty() {
        return Err(ValidationError::EmptySketch.into());
    }
    info!(cells = points.len(), service = state.service.name(), "classifying sketch");
    let prediction = state.service.classify(&points).await?;
    info!(label = ?prediction.label, "sketch classified");
    Ok(Json(PredictResponse { prediction: prediction.label }))
}

/// `POST /coordinates`: project a guessed word into the latent map.
pub async fn coordinates(
    State(state): State<AppState>,
    Json(request): Json<CoordinatesRequest>,
) -> Result<Json<CoordinatesResponse>, ApiError> {
    let word = sanitize(&request.word)?;
    info!(word = %word, service = state.service.name(), "locating word");
    let position = state.service.locate(&word).await?;
    Ok(Json(CoordinatesResponse {
        coordinates: position.coords,
        scalar: position.scalar,
    }))
}

pub async fn healthz() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use carnival::core_modules::coordinate_mapper::{AxisOrder, flatten};
    use carnival::{InferenceError, LatentPosition, Prediction, Word};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recording {
        fail: bool,
        sketches: Mutex<Vec<Vec<u32>>>,
        words: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl InferenceService for Recording {
        async fn classify(&self, points: &PointSet) -> Result<Prediction, InferenceError> {
            self.sketches.lock().unwrap().push(flatten(points, AxisOrder::Xy));
            if self.fail {
                return Err(InferenceError::Timeout { polls: 120 });
            }
            Ok(Prediction { label: Some(5) })
        }

        async fn locate(&self, word: &Word) -> Result<LatentPosition, InferenceError> {
            self.words.lock().unwrap().push(word.to_string());
            if self.fail {
                return Err(InferenceError::Status { status: 503, body: String::new() });
            }
            Ok(LatentPosition { coords: [4.0, -2.5], scalar: Some(0.8) })
        }
    }

    fn state_with(service: Arc<Recording>) -> AppState {
        AppState { service, grid_size: 28 }
    }

    fn cells(raw: &[(i64, i64)]) -> PredictRequest {
        PredictRequest {
            points: raw.iter().map(|&(x, y)| RawCell { x, y }).collect(),
        }
    }

    #[tokio::test]
    async fn predict_forwards_deduplicated_points() {
        let service = Arc::new(Recording::default());
        let response = predict(State(state_with(service.clone())), Json(cells(&[(1, 2), (1, 2), (3, 4)])))
            .await
            .unwrap();
        assert_eq!(response.0, PredictResponse { prediction: Some(5) });
        assert_eq!(*service.sketches.lock().unwrap(), vec![vec![1, 2, 3, 4]]);
    }

    #[tokio::test]
    async fn predict_rejects_out_of_grid_and_empty() {
        let service = Arc::new(Recording::default());
        let err = predict(State(state_with(service.clone())), Json(cells(&[(1, 2), (28, 0)])))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let err = predict(State(state_with(service.clone())), Json(cells(&[])))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(service.sketches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn predict_failure_is_a_500() {
        let service = Arc::new(Recording { fail: true, ..Default::default() });
        let err = predict(State(state_with(service)), Json(cells(&[(0, 0)])))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "Prediction failed.");
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn coordinates_sanitizes_before_forwarding() {
        let service = Arc::new(Recording::default());
        let response = coordinates(
            State(state_with(service.clone())),
            Json(CoordinatesRequest { word: " Ocean-Wave ".to_string() }),
        )
        .await
        .unwrap();
        assert_eq!(
            response.0,
            CoordinatesResponse { coordinates: [4.0, -2.5], scalar: Some(0.8) }
        );
        assert_eq!(*service.words.lock().unwrap(), vec!["oceanwave"]);
    }

    #[tokio::test]
    async fn coordinates_rejects_empty_word() {
        let service = Arc::new(Recording::default());
        let err = coordinates(
            State(state_with(service.clone())),
            Json(CoordinatesRequest { word: "!!".to_string() }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Please enter a word");
        assert!(service.words.lock().unwrap().is_empty());
    }

    #[test]
    fn response_bodies_match_browser_contract() {
        let body = serde_json::to_value(CoordinatesResponse { coordinates: [1.0, 2.0], scalar: None }).unwrap();
        assert_eq!(body, serde_json::json!({ "coordinates": [1.0, 2.0], "scalar": null }));
        let request: PredictRequest = serde_json::from_str(r#"{"points":[{"x":3,"y":9}]}"#).unwrap();
        assert_eq!((request.points[0].x, request.points[0].y), (3, 9));
    }
}
