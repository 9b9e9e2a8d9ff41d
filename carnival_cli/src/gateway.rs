//! `InferenceService` that talks to a running Carnival server.

use async_trait::async_trait;
use carnival::{InferenceError, InferenceService, LatentPosition, PointSet, Prediction, Word};
use carnival_server::routes::{
    CoordinatesRequest, CoordinatesResponse, ErrorBody, PredictRequest, PredictResponse, RawCell,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

pub const DEFAULT_SERVER: &str = "http://127.0.0.1:4167";

pub struct GatewayClient {
    http: reqwest::Client,
    base_url: String,
}

impl GatewayClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, InferenceError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = self.url(path);
        debug!(%url, "posting to carnival server");
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|err| InferenceError::Transport(err.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| InferenceError::Transport(err.to_string()))?;
        if !status.is_success() {
            return Err(InferenceError::Status {
                status: status.as_u16(),
                body: error_message(&text),
            });
        }
        serde_json::from_str(&text).map_err(|err| InferenceError::Malformed(err.to_string()))
    }
}

/// The server's `{"error": ...}` message if present, else the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_else(|_| body.to_string())
}

fn predict_request(points: &PointSet) -> PredictRequest {
    PredictRequest {
        points: points
            .iter()
            .map(|p| RawCell { x: p.x as i64, y: p.y as i64 })
            .collect(),
    }
}

#[async_trait]
impl InferenceService for GatewayClient {
    async fn classify(&self, points: &PointSet) -> Result<Prediction, InferenceError> {
        let response: PredictResponse = self.post("/api/predict", &predict_request(points)).await?;
        Ok(Prediction { label: response.prediction })
    }

    async fn locate(&self, word: &Word) -> Result<LatentPosition, InferenceError> {
        let request = CoordinatesRequest { word: word.to_string() };
        let response: CoordinatesResponse = self.post("/coordinates", &request).await?;
        Ok(LatentPosition {
            coords: response.coordinates,
            scalar: response.scalar,
        })
    }

    fn name(&self) -> &'static str {
        "carnival-server"
    }
}
