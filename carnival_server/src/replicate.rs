//! Replicate-backed `InferenceService`.
//!
//! A prediction is created with `POST /v1/predictions` (or the model-scoped
//! endpoint when no version is pinned) and then polled through its `urls.get`
//! link until it reaches a terminal status. Nothing is retried.

use crate::config::{ModelRef, ReplicateConfig};
use async_trait::async_trait;
use carnival::core_modules::coordinate_mapper::{flatten, format_drawn_coords};
use carnival::{InferenceError, InferenceService, LatentPosition, PointSet, Prediction, Word};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct PredictionUrls {
    get: String,
}

/// The subset of Replicate's prediction object we read.
#[derive(Debug, Deserialize)]
struct PredictionState {
    id: String,
    status: String,
    #[serde(default)]
    output: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
    urls: PredictionUrls,
}

pub struct ReplicateClient {
    http: reqwest::Client,
    config: ReplicateConfig,
}

impl ReplicateClient {
    pub fn new(config: ReplicateConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &ReplicateConfig {
        &self.config
    }

    /// Creates a prediction for `model` and waits for its output.
    async fn run(&self, model: &ModelRef, input: Value) -> Result<Value, InferenceError> {
        let token = self.config.api_token.as_deref().ok_or_else(|| {
            InferenceError::MissingCredentials("REPLICATE_API_TOKEN is not set".to_string())
        })?;

        let (url, body) = create_request(&self.config.api_base, model, input);
        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(transport)?;
        let mut state: PredictionState = read_json(response).await?;
        debug!(model = %model, id = %state.id, status = %state.status, "prediction created");

        let mut polls = 0;
        while !is_terminal(&state.status) {
            if polls >= self.config.max_polls {
                warn!(id = %state.id, polls, "prediction did not finish in time");
                return Err(InferenceError::Timeout { polls });
            }
            tokio::time::sleep(self.config.poll_interval).await;
            polls += 1;
            let response = self
                .http
                .get(&state.urls.get)
                .bearer_auth(token)
                .send()
                .await
                .map_err(transport)?;
            state = read_json(response).await?;
        }

        finish(state)
    }
}

#[async_trait]
impl InferenceService for ReplicateClient {
    async fn classify(&self, points: &PointSet) -> Result<Prediction, InferenceError> {
        let output = self
            .run(&self.config.mnist_model, mnist_input(points, &self.config))
            .await?;
        decode_prediction(output)
    }

    async fn locate(&self, word: &Word) -> Result<LatentPosition, InferenceError> {
        let output = self
            .run(&self.config.latent_model, json!({ "guess": word.as_str() }))
            .await?;
        decode_position(output)
    }

    fn name(&self) -> &'static str {
        "replicate"
    }
}

fn transport(err: reqwest::Error) -> InferenceError {
    InferenceError::Transport(err.to_string())
}

async fn read_json(response: reqwest::Response) -> Result<PredictionState, InferenceError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(InferenceError::Status { status: status.as_u16(), body });
    }
    response
        .json::<PredictionState>()
        .await
        .map_err(|err| InferenceError::Malformed(err.to_string()))
}

fn is_terminal(status: &str) -> bool {
    matches!(status, "succeeded" | "failed" | "canceled")
}

/// Endpoint and body for a new prediction.
fn create_request(api_base: &str, model: &ModelRef, input: Value) -> (String, Value) {
    match &model.version {
        Some(version) => (
            format!("{api_base}/v1/predictions"),
            json!({ "version": version, "input": input }),
        ),
        None => (
            format!("{api_base}/v1/models/{}/{}/predictions", model.owner, model.name),
            json!({ "input": input }),
        ),
    }
}

fn mnist_input(points: &PointSet, config: &ReplicateConfig) -> Value {
    let values = flatten(points, config.axis_order);
    json!({ "drawn_coords": format_drawn_coords(&values) })
}

fn finish(state: PredictionState) -> Result<Value, InferenceError> {
    match state.status.as_str() {
        "succeeded" => state
            .output
            .ok_or_else(|| InferenceError::Malformed(format!("prediction {} has no output", state.id))),
        status => Err(InferenceError::PredictionFailed {
            status: status.to_string(),
            message: state
                .error
                .map(|e| e.as_str().map(str::to_string).unwrap_or_else(|| e.to_string()))
                .unwrap_or_else(|| "no error message".to_string()),
        }),
    }
}

/// Accepts `{"prediction": n}`, `{"prediction": null}` or a bare `n`.
fn decode_prediction(output: Value) -> Result<Prediction, InferenceError> {
    let label = match &output {
        Value::Object(map) => map.get("prediction").cloned().unwrap_or(Value::Null),
        other => other.clone(),
    };
    match label {
        Value::Null => Ok(Prediction { label: None }),
        Value::Number(n) => n
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .map(|n| Prediction { label: Some(n) })
            .ok_or_else(|| InferenceError::Malformed(format!("label {n} is not a class index"))),
        other => Err(InferenceError::Malformed(format!("unexpected classifier output {other}"))),
    }
}

fn decode_position(output: Value) -> Result<LatentPosition, InferenceError> {
    serde_json::from_value(output).map_err(|err| InferenceError::Malformed(err.to_string()))
}
