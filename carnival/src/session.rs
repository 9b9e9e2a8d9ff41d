// THEORY:
// The `session` module is the top-level API of the game core. Each session type
// owns the complete state of one player's game and exposes it as a small,
// explicit state machine. The UI layer (a browser bridge, the terminal client,
// a test) owns the session value, feeds it discrete input events and renders
// whatever it reads back. Nothing here knows about pixels on screen or HTTP.
//
// Key architectural principles:
// 1.  **One request in flight**: submitting moves a session into a pending phase;
//     a second submit while pending is rejected with `SubmissionInFlight`. The
//     phase returns to idle when the outstanding call succeeds *or* fails, so the
//     player can always retry by hand.
// 2.  **Split submit**: every network-backed action is available both as one
//     awaited call (`guess`, `submit`) and as a `begin_*` / `complete_*` pair.
//     The pair lets a container that is shared behind a lock release it while the
//     request is outstanding.
// 3.  **Rejection leaves state untouched**: empty and duplicate guesses, out-of-grid
//     clicks and empty sketches return a `ValidationError` before any field is
//     written, and never count as an attempt.
// 4.  **No clearing mid-request**: `clear` is refused with `SubmissionInFlight`
//     while a call is outstanding, so a late response can never be recorded
//     against a board or word list that no longer exists.
// 5.  **One-shot win latch**: the word hunt's `NotWon -> Won` transition happens at
//     most once per session and is the only place a `HuntEvent::Won` is emitted.

use crate::core_modules::coordinate_mapper::{
    AxisOrder, CanvasGeometry, MapView, Point, absolute_to_viewport, flatten,
};
use crate::core_modules::guess_scoring::{
    self, SearchResult, Target, Word, is_duplicate, is_win, sanitize,
};
use crate::core_modules::inference::{InferenceService, LatentPosition, Prediction};
use crate::core_modules::point_set::{PointSet, Toggle};
use crate::error::{CarnivalError, InferenceError, Result, ValidationError};
use tracing::{debug, info, warn};

/// Where a word hunt session is in its submit cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HuntPhase {
    Idle,
    /// A guess has been sent and its coordinates are outstanding.
    Submitting(Word),
}

/// One-way latch recording whether the target has been found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WinLatch {
    NotWon,
    Won,
}

/// Events the UI should react to exactly once.
#[derive(Debug, Clone, PartialEq)]
pub enum HuntEvent {
    Won { word: Word, score: u32, attempts: u32 },
}

/// Everything the UI needs after an accepted guess.
#[derive(Debug, Clone, PartialEq)]
pub struct GuessOutcome {
    pub result: SearchResult,
    pub attempts: u32,
    pub score: u32,
    pub event: Option<HuntEvent>,
}

/// A marker ready to be placed on the latent map.
#[derive(Debug, Clone, PartialEq)]
pub struct MapMarker {
    pub word: Word,
    /// Horizontal position in percent of the viewport, within `[5, 95]`.
    pub left: f64,
    /// Vertical position in percent of the viewport, within `[5, 95]`.
    pub top: f64,
    pub scalar: Option<f64>,
}

/// The word hunt: guess words until the hidden target is found.
#[derive(Debug, Clone)]
pub struct FeatureHuntSession {
    target: Target,
    results: Vec<SearchResult>,
    map_view: MapView,
    phase: HuntPhase,
    latch: WinLatch,
}

impl FeatureHuntSession {
    pub fn new(target: Target) -> Self {
        let map_view = MapView::centered_on(target.coords);
        Self {
            target,
            results: Vec::new(),
            map_view,
            phase: HuntPhase::Idle,
            latch: WinLatch::NotWon,
        }
    }

    /// Validates a raw guess and moves the session into `Submitting`.
    pub fn begin_guess(&mut self, raw: &str) -> Result<Word> {
        if let HuntPhase::Submitting(pending) = &self.phase {
            debug!(pending = %pending, "guess rejected, request in flight");
            return Err(CarnivalError::SubmissionInFlight);
        }
        let word = sanitize(raw)?;
        if is_duplicate(&self.results, &word) {
            debug!(word = %word, "duplicate guess rejected");
            return Err(ValidationError::DuplicateGuess(word.to_string()).into());
        }
        self.phase = HuntPhase::Submitting(word.clone());
        Ok(word)
    }

    /// Applies the outcome of the outstanding `locate` call and returns to `Idle`.
    pub fn complete_guess(
        &mut self,
        outcome: std::result::Result<LatentPosition, InferenceError>,
    ) -> Result<GuessOutcome> {
        let word = match std::mem::replace(&mut self.phase, HuntPhase::Idle) {
            HuntPhase::Submitting(word) => word,
            HuntPhase::Idle => return Err(CarnivalError::NothingInFlight),
        };
        let position = outcome.map_err(|err| {
            warn!(word = %word, error = %err, "failed to fetch coordinates");
            CarnivalError::from(err)
        })?;

        let result = SearchResult {
            word: word.clone(),
            coords: position.coords,
            scalar: position.scalar,
        };
        self.results.push(result.clone());
        let attempts = self.attempts();
        let score = guess_scoring::score(attempts);

        let event = if self.latch == WinLatch::NotWon && is_win(&word, &self.target) {
            self.latch = WinLatch::Won;
            info!(word = %word, attempts, score, "target found");
            Some(HuntEvent::Won { word, score, attempts })
        } else {
            debug!(word = %word, attempts, "guess accepted");
            None
        };

        Ok(GuessOutcome { result, attempts, score, event })
    }

    /// Validates, asks `service` for the word's coordinates, and records the result.
    pub async fn guess(&mut self, raw: &str, service: &dyn InferenceService) -> Result<GuessOutcome> {
        let word = self.begin_guess(raw)?;
        let outcome = service.locate(&word).await;
        self.complete_guess(outcome)
    }

    /// Number of accepted guesses.
    pub fn attempts(&self) -> u32 {
        self.results.len() as u32
    }

    pub fn score(&self) -> u32 {
        guess_scoring::score(self.attempts())
    }

    pub fn has_won(&self) -> bool {
        self.latch == WinLatch::Won
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.phase, HuntPhase::Submitting(_))
    }

    pub fn phase(&self) -> &HuntPhase {
        &self.phase
    }

    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn map_view(&self) -> &MapView {
        &self.map_view
    }

    /// Viewport placement for every accepted guess, in guess order.
    pub fn markers(&self) -> Vec<MapMarker> {
        self.results
            .iter()
            .map(|result| {
                let (left, top) = absolute_to_viewport(result.coords, &self.map_view);
                MapMarker {
                    word: result.word.clone(),
                    left,
                    top,
                    scalar: result.scalar,
                }
            })
            .collect()
    }

    pub fn zoom_in(&mut self) {
        self.map_view.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.map_view.zoom_out();
    }

    pub fn reset_view(&mut self) {
        self.map_view.reset(self.target.coords);
    }

    /// Starts over against the same target. Refused while a guess is pending.
    pub fn clear(&mut self) -> Result<()> {
        if self.is_submitting() {
            return Err(CarnivalError::SubmissionInFlight);
        }
        *self = Self::new(self.target.clone());
        Ok(())
    }
}

impl Default for FeatureHuntSession {
    fn default() -> Self {
        Self::new(Target::default())
    }
}

/// The adversarial sketchpad: knock out cells of a digit and ask the classifier.
#[derive(Debug, Clone)]
pub struct SketchpadSession {
    geometry: CanvasGeometry,
    points: PointSet,
    in_flight: bool,
    last_prediction: Option<Prediction>,
}

impl SketchpadSession {
    pub fn new(geometry: CanvasGeometry) -> Self {
        Self {
            geometry,
            points: PointSet::new(geometry.grid_size),
            in_flight: false,
            last_prediction: None,
        }
    }

    /// Toggles the cell under a canvas-relative click.
    pub fn click(&mut self, px: f64, py: f64) -> Result<(Point, Toggle)> {
        let point = self.geometry.cell_at(px, py)?;
        let toggle = self.points.toggle(point)?;
        debug!(x = point.x, y = point.y, ?toggle, "cell toggled");
        Ok((point, toggle))
    }

    pub fn toggle(&mut self, point: Point) -> Result<Toggle> {
        Ok(self.points.toggle(point)?)
    }

    /// Marks a request as outstanding and returns the points to send.
    pub fn begin_submit(&mut self) -> Result<PointSet> {
        if self.in_flight {
            return Err(CarnivalError::SubmissionInFlight);
        }
        if self.points.is_empty() {
            return Err(ValidationError::EmptySketch.into());
        }
        self.in_flight = true;
        Ok(self.points.clone())
    }

    /// Records the classifier's answer and clears the in-flight flag.
    pub fn complete_submit(
        &mut self,
        outcome: std::result::Result<Prediction, InferenceError>,
    ) -> Result<Prediction> {
        if !self.in_flight {
            return Err(CarnivalError::NothingInFlight);
        }
        self.in_flight = false;
        match outcome {
            Ok(prediction) => {
                info!(label = ?prediction.label, cells = self.points.len(), "sketch classified");
                self.last_prediction = Some(prediction);
                Ok(prediction)
            }
            Err(err) => {
                warn!(error = %err, "classification failed");
                Err(err.into())
            }
        }
    }

    pub async fn submit(&mut self, service: &dyn InferenceService) -> Result<Prediction> {
        let points = self.begin_submit()?;
        let outcome = service.classify(&points).await;
        self.complete_submit(outcome)
    }

    /// Removes every toggled cell and forgets the last answer. Refused while a
    /// sketch is being classified.
    pub fn clear(&mut self) -> Result<()> {
        if self.in_flight {
            return Err(CarnivalError::SubmissionInFlight);
        }
        self.points.clear();
        self.last_prediction = None;
        Ok(())
    }

    pub fn points(&self) -> &PointSet {
        &self.points
    }

    pub fn flattened(&self, order: AxisOrder) -> Vec<u32> {
        flatten(&self.points, order)
    }

    pub fn geometry(&self) -> CanvasGeometry {
        self.geometry
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight
    }

    pub fn last_prediction(&self) -> Option<Prediction> {
        self.last_prediction
    }
}

impl Default for SketchpadSession {
    fn default() -> Self {
        Self::new(CanvasGeometry::default())
    }
}
