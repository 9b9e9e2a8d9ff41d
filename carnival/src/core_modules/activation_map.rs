// THEORY:
// The `activation_map` backs the neuron visualizer: a large map of labelled feature
// markers that the player pans, zooms and hovers over, plus the rotary knobs used
// to dial a neuron's activation up and down.
//
// The map is bigger than the visible panel (1000x600 map units against an 800x600
// panel), so two spaces are in play. Map space is where markers live; screen
// space is map space after the current `ZoomTransform`. Hover hit-testing always
// happens in map space, so the hover radius does not shrink when zooming in.
//
// Knob math is a pure function of where a drag started and where it is now, which
// keeps a knob's value independent of how many move events were delivered.

use serde::{Deserialize, Serialize};

pub const MAP_WIDTH: f64 = 1000.0;
pub const MAP_HEIGHT: f64 = 600.0;

pub const MIN_SCALE: f64 = 0.5;
pub const MAX_SCALE: f64 = 3.0;
pub const ZOOM_STEP: f64 = 0.1;

/// Sweep of a knob from its minimum to its maximum, in degrees.
pub const KNOB_SWEEP_DEGREES: f64 = 270.0;
/// Vertical drag distance, in pixels, that moves a knob across its full range.
pub const KNOB_DRAG_RANGE: f64 = 100.0;

/// A labelled point of interest on the feature map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureMarker {
    pub id: u32,
    pub x: f64,
    pub y: f64,
    pub label: String,
    pub description: String,
}

impl FeatureMarker {
    pub fn new(id: u32, x: f64, y: f64, label: &str, description: &str) -> Self {
        Self {
            id,
            x,
            y,
            label: label.to_string(),
            description: description.to_string(),
        }
    }

    fn distance_to(&self, x: f64, y: f64) -> f64 {
        ((self.x - x).powi(2) + (self.y - y).powi(2)).sqrt()
    }
}

/// The sixteen demo markers spread across the full map.
pub fn default_markers() -> Vec<FeatureMarker> {
    [
        (100.0, 50.0, "Point A", "Critical incision point"),
        (200.0, 150.0, "Point B", "Secondary incision point"),
        (150.0, 200.0, "Point C", "Suture location"),
        (80.0, 220.0, "Point D", "Avoid this area"),
        (250.0, 80.0, "Point E", "Entry point for catheter"),
        (350.0, 120.0, "Point F", "Nerve cluster"),
        (450.0, 200.0, "Point G", "Artery location"),
        (600.0, 150.0, "Point H", "Lymph node"),
        (750.0, 180.0, "Point I", "Secondary artery"),
        (850.0, 240.0, "Point J", "Potential blockage"),
        (50.0, 50.0, "Point K", "Upper left region"),
        (850.0, 50.0, "Point L", "Upper right region"),
        (50.0, 550.0, "Point M", "Lower left region"),
        (850.0, 550.0, "Point N", "Lower right region"),
        (450.0, 550.0, "Point O", "Bottom center region"),
        (450.0, 50.0, "Point P", "Top center region"),
    ]
    .into_iter()
    .enumerate()
    .map(|(i, (x, y, label, description))| FeatureMarker::new(i as u32 + 1, x, y, label, description))
    .collect()
}

/// Pan and zoom applied to the map before it is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomTransform {
    pub scale: f64,
    /// Screen-space translation, in pixels.
    pub offset: (f64, f64),
}

impl Default for ZoomTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset: (0.0, 0.0),
        }
    }
}

impl ZoomTransform {
    pub fn zoom_in(&mut self) {
        self.set_scale(self.scale + ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.set_scale(self.scale - ZOOM_STEP);
    }

    /// Scale is always kept within `[MIN_SCALE, MAX_SCALE]`.
    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale.clamp(MIN_SCALE, MAX_SCALE);
    }

    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.offset.0 += dx;
        self.offset.1 += dy;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn to_screen(&self, x: f64, y: f64) -> (f64, f64) {
        (x * self.scale + self.offset.0, y * self.scale + self.offset.1)
    }

    pub fn to_map(&self, sx: f64, sy: f64) -> (f64, f64) {
        ((sx - self.offset.0) / self.scale, (sy - self.offset.1) / self.scale)
    }
}

/// The marker nearest to `(x, y)` in map space, if any lies within `radius`.
pub fn hit_test(markers: &[FeatureMarker], x: f64, y: f64, radius: f64) -> Option<&FeatureMarker> {
    markers
        .iter()
        .map(|marker| (marker, marker.distance_to(x, y)))
        .filter(|(_, distance)| *distance <= radius)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(marker, _)| marker)
}

/// Knob value after dragging from `start_y` to `current_y`. Dragging up raises it.
/// A knob whose range is empty or inverted stays at `min`.
pub fn knob_value(start_value: f64, start_y: f64, current_y: f64, min: f64, max: f64) -> f64 {
    if !(max > min) {
        return min;
    }
    let delta = start_y - current_y;
    (start_value + (delta / KNOB_DRAG_RANGE) * (max - min)).clamp(min, max)
}

/// Pointer angle for `value`, from -135 degrees at `min` to +135 at `max`.
/// An empty or inverted range points at the start of the sweep.
pub fn knob_rotation(value: f64, min: f64, max: f64) -> f64 {
    if !(max > min) {
        return -KNOB_SWEEP_DEGREES / 2.0;
    }
    ((value - min) / (max - min)) * KNOB_SWEEP_DEGREES - KNOB_SWEEP_DEGREES / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_markers_fit_the_map() {
        let markers = default_markers();
        assert_eq!(markers.len(), 16);
        assert_eq!(markers[0].id, 1);
        assert_eq!(markers[15].label, "Point P");
        assert!(markers.iter().all(|m| m.x <= MAP_WIDTH && m.y <= MAP_HEIGHT));
    }

    #[test]
    fn zoom_is_clamped() {
        let mut zoom = ZoomTransform::default();
        for _ in 0..50 {
            zoom.zoom_in();
        }
        assert_eq!(zoom.scale, MAX_SCALE);
        for _ in 0..50 {
            zoom.zoom_out();
        }
        assert_eq!(zoom.scale, MIN_SCALE);
        zoom.reset();
        assert_eq!(zoom, ZoomTransform::default());
    }

    #[test]
    fn screen_and_map_space_are_inverse() {
        let mut zoom = ZoomTransform::default();
        zoom.set_scale(2.0);
        zoom.pan(-300.0, 40.0);
        let (sx, sy) = zoom.to_screen(450.0, 200.0);
        assert_eq!((sx, sy), (600.0, 440.0));
        assert_eq!(zoom.to_map(sx, sy), (450.0, 200.0));
    }

    #[test]
    fn hit_test_picks_nearest_within_radius() {
        let markers = default_markers();
        assert_eq!(hit_test(&markers, 104.0, 53.0, 10.0).map(|m| m.id), Some(1));
        assert_eq!(hit_test(&markers, 70.0, 50.0, 30.0).map(|m| m.id), Some(11));
        assert!(hit_test(&markers, 500.0, 400.0, 10.0).is_none());
    }

    #[test]
    fn knob_follows_vertical_drag() {
        assert_eq!(knob_value(50.0, 200.0, 180.0, 0.0, 100.0), 70.0);
        assert_eq!(knob_value(50.0, 200.0, 230.0, 0.0, 100.0), 20.0);
        assert_eq!(knob_value(50.0, 200.0, 0.0, 0.0, 100.0), 100.0);
        assert_eq!(knob_value(50.0, 0.0, 500.0, 0.0, 100.0), 0.0);
    }

    #[test]
    fn knob_rotation_spans_270_degrees() {
        assert_eq!(knob_rotation(0.0, 0.0, 100.0), -135.0);
        assert_eq!(knob_rotation(50.0, 0.0, 100.0), 0.0);
        assert_eq!(knob_rotation(100.0, 0.0, 100.0), 135.0);
    }

    #[test]
    fn degenerate_knob_range_stays_finite() {
        assert_eq!(knob_rotation(5.0, 5.0, 5.0), -135.0);
        assert_eq!(knob_rotation(1.0, 10.0, 0.0), -135.0);
        assert_eq!(knob_value(5.0, 200.0, 100.0, 5.0, 5.0), 5.0);
        assert_eq!(knob_value(5.0, 200.0, 100.0, 10.0, 0.0), 10.0);
    }
}
