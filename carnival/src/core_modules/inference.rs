//! The seam between the games and the hosted model.
//!
//! Sessions only ever see an `InferenceService`. The server plugs in a Replicate
//! client, the terminal client plugs in an HTTP client for the server, and tests
//! plug in scripted stubs.

use crate::core_modules::guess_scoring::Word;
use crate::core_modules::point_set::PointSet;
use crate::error::InferenceError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Classifier output for a perturbed digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prediction {
    /// Predicted digit class, or `None` when the model could not read the input.
    pub label: Option<u32>,
}

/// Where a word lands in the 2-D projection of the feature space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatentPosition {
    #[serde(alias = "coordinates")]
    pub coords: [f64; 2],
    #[serde(default)]
    pub scalar: Option<f64>,
}

/// An external model reachable over the network.
#[async_trait]
pub trait InferenceService: Send + Sync {
    /// Classify the base digit with `points` knocked out.
    async fn classify(&self, points: &PointSet) -> Result<Prediction, InferenceError>;

    /// Project `word` into the latent map and report its feature activation.
    async fn locate(&self, word: &Word) -> Result<LatentPosition, InferenceError>;

    /// Name for logs.
    fn name(&self) -> &'static str {
        "inference"
    }
}
