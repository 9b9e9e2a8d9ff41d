// THEORY:
// This file is the main entry point for the `carnival` library crate, the game
// core shared by the Carnival server and its clients.
//
// The public face of the crate is the `session` module: `FeatureHuntSession` for
// the latent-space word hunt and `SketchpadSession` for the adversarial digit
// sketchpad. Both are driven by discrete input events and by one injected
// `InferenceService`, so they run identically against the hosted model, against
// the Carnival server, or against a stub in tests.
//
// The building blocks under `core_modules` (coordinate mapping, the point set,
// scoring rules, the perturbation renderer and the activation map) are plain
// functions and value types and are exported for UIs that need them directly.

pub mod core_modules;
pub mod error;
pub mod session;

pub use crate::core_modules::coordinate_mapper::{AxisOrder, CanvasGeometry, MapView, Point};
pub use crate::core_modules::guess_scoring::{SearchResult, Target, Word};
pub use crate::core_modules::inference::{InferenceService, LatentPosition, Prediction};
pub use crate::core_modules::point_set::{PointSet, Toggle};
pub use crate::error::{CarnivalError, InferenceError, ValidationError};
pub use crate::session::{FeatureHuntSession, GuessOutcome, HuntEvent, SketchpadSession};
