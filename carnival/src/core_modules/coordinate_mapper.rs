// THEORY:
// The `coordinate_mapper` is the translation layer between the three coordinate
// spaces the games live in:
//
// 1.  **Pointer pixels**: where the player clicked on the rendered canvas. The
//     sketchpad canvas is drawn ten times larger than the model's image so a cell
//     is comfortable to hit.
// 2.  **Grid cells**: the discrete `(x, y)` cells of the 28x28 image the hosted
//     classifier actually sees. Cell coordinates are the identity of a `Point`.
// 3.  **Viewport percentages**: where a latent-space coordinate is drawn inside
//     the word hunt's map. The map is a plain linear transform around a fixed
//     center; zoom only scales the viewport extent.
//
// Every function here is stateless. Bounds are *not* enforced by the conversion
// itself: `pixel_to_cell` happily returns negative or oversized cells and leaves
// rejection to `Point::from_cell`, which knows the grid size.
//
// Flattening is where a point set leaves the process. The hosted model reads a
// flat list of integers, so the axis order of each pair is an explicit argument
// and never inferred.

use crate::error::ValidationError;
use crate::core_modules::point_set::PointSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Side length of the logical image grid, in cells.
pub const GRID_SIZE: u32 = 28;
/// Side length of the rendered sketchpad canvas, in pixels.
pub const CANVAS_SIZE: u32 = 280;

/// Markers are kept this far (in percent) from every viewport edge.
pub const VIEWPORT_MARGIN: f64 = 5.0;
/// Viewport extent of an unzoomed map, in latent units.
pub const DEFAULT_VIEWPORT_EXTENT: f64 = 100.0;

const ZOOM_IN_FACTOR: f64 = 0.8;
/// Smallest latent extent zooming in can reach; keeps the projection finite.
pub const MIN_VIEWPORT_EXTENT: f64 = 1e-3;
const ZOOM_OUT_FACTOR: f64 = 1.25;

/// A single cell on the logical image grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

impl Point {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Accepts a raw cell only if it lies inside `[0, grid_size)` on both axes.
    pub fn from_cell(cell: (i64, i64), grid_size: u32) -> Result<Self, ValidationError> {
        let (x, y) = cell;
        let limit = grid_size as i64;
        if x < 0 || y < 0 || x >= limit || y >= limit {
            return Err(ValidationError::OutOfBounds { x, y, grid_size });
        }
        Ok(Self::new(x as u32, y as u32))
    }
}

/// Which coordinate of a point is emitted first when flattening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisOrder {
    /// `(x, y)` pairs. The MNIST predictor reads pairs this way.
    #[default]
    Xy,
    /// `(y, x)` pairs, i.e. row-major `(row, column)`.
    Yx,
}

impl AxisOrder {
    fn pair(self, point: &Point) -> [u32; 2] {
        match self {
            AxisOrder::Xy => [point.x, point.y],
            AxisOrder::Yx => [point.y, point.x],
        }
    }
}

impl fmt::Display for AxisOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AxisOrder::Xy => write!(f, "xy"),
            AxisOrder::Yx => write!(f, "yx"),
        }
    }
}

impl FromStr for AxisOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xy" => Ok(AxisOrder::Xy),
            "yx" => Ok(AxisOrder::Yx),
            other => Err(format!("unknown axis order '{other}', expected 'xy' or 'yx'")),
        }
    }
}

/// Size of the logical grid and of the canvas it is drawn on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasGeometry {
    /// Cells per side of the model's input image.
    pub grid_size: u32,
    /// Pixels per side of the rendered canvas.
    pub canvas_size: u32,
}

impl Default for CanvasGeometry {
    fn default() -> Self {
        Self {
            grid_size: GRID_SIZE,
            canvas_size: CANVAS_SIZE,
        }
    }
}

impl CanvasGeometry {
    /// Pixels per cell along one axis.
    pub fn cell_size(&self) -> f64 {
        self.canvas_size as f64 / self.grid_size as f64
    }

    /// Maps a canvas-relative click straight to a validated grid cell.
    pub fn cell_at(&self, px: f64, py: f64) -> Result<Point, ValidationError> {
        Point::from_cell(pixel_to_cell(px, py, self.cell_size()), self.grid_size)
    }
}

/// A fixed center plus the latent extent currently shown by the map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    pub center: [f64; 2],
    pub viewport_width: f64,
    pub viewport_height: f64,
}

impl MapView {
    /// The unzoomed view around `center`.
    pub fn centered_on(center: [f64; 2]) -> Self {
        Self {
            center,
            viewport_width: DEFAULT_VIEWPORT_EXTENT,
            viewport_height: DEFAULT_VIEWPORT_EXTENT,
        }
    }

    pub fn zoom_in(&mut self) {
        self.viewport_width = (self.viewport_width * ZOOM_IN_FACTOR).max(MIN_VIEWPORT_EXTENT);
        self.viewport_height = (self.viewport_height * ZOOM_IN_FACTOR).max(MIN_VIEWPORT_EXTENT);
    }

    pub fn zoom_out(&mut self) {
        self.viewport_width *= ZOOM_OUT_FACTOR;
        self.viewport_height *= ZOOM_OUT_FACTOR;
    }

    /// Restores the unzoomed extent, recentered on `center`.
    pub fn reset(&mut self, center: [f64; 2]) {
        *self = Self::centered_on(center);
    }
}

/// Converts a canvas-relative pixel position to a (possibly out-of-grid) cell.
/// The canvas origin must already be subtracted from `px`/`py`.
pub fn pixel_to_cell(px: f64, py: f64, cell_size: f64) -> (i64, i64) {
    ((px / cell_size).floor() as i64, (py / cell_size).floor() as i64)
}

/// Places an absolute latent coordinate inside the map, in percent of the
/// viewport. The result is clamped to `[5, 95]` on both axes.
pub fn absolute_to_viewport(point: [f64; 2], view: &MapView) -> (f64, f64) {
    let relative = |value: f64, center: f64, extent: f64| {
        (((value - center) / extent) * 100.0 + 50.0)
            .clamp(VIEWPORT_MARGIN, 100.0 - VIEWPORT_MARGIN)
    };
    (
        relative(point[0], view.center[0], view.viewport_width),
        relative(point[1], view.center[1], view.viewport_height),
    )
}

/// Emits `2 * set.len()` integers, in insertion order, each pair in `order`.
pub fn flatten(set: &PointSet, order: AxisOrder) -> Vec<u32> {
    set.iter().flat_map(|point| order.pair(point)).collect()
}

/// Renders flattened values as `"(a,b), (c,d)"`, the `drawn_coords` format of
/// the hosted MNIST predictor. A trailing odd value is dropped.
pub fn format_drawn_coords(values: &[u32]) -> String {
    values
        .chunks_exact(2)
        .map(|pair| format!("({},{})", pair[0], pair[1]))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_of(points: &[(u32, u32)]) -> PointSet {
        let mut set = PointSet::new(GRID_SIZE);
        for &(x, y) in points {
            set.toggle(Point::new(x, y)).unwrap();
        }
        set
    }

    #[test]
    fn pixel_to_cell_floors_both_axes() {
        assert_eq!(pixel_to_cell(15.0, 25.0, 10.0), (1, 2));
        assert_eq!(pixel_to_cell(0.0, 9.99, 10.0), (0, 0));
        assert_eq!(pixel_to_cell(279.9, 280.0, 10.0), (27, 28));
    }

    #[test]
    fn pixel_to_cell_does_not_clamp() {
        assert_eq!(pixel_to_cell(-0.5, -15.0, 10.0), (-1, -2));
        assert_eq!(pixel_to_cell(1000.0, 0.0, 10.0), (100, 0));
    }

    #[test]
    fn from_cell_rejects_out_of_grid() {
        assert_eq!(Point::from_cell((27, 0), 28), Ok(Point::new(27, 0)));
        assert_eq!(
            Point::from_cell((28, 3), 28),
            Err(ValidationError::OutOfBounds { x: 28, y: 3, grid_size: 28 })
        );
        assert!(Point::from_cell((-1, 3), 28).is_err());
    }

    #[test]
    fn default_geometry_has_ten_pixel_cells() {
        let geometry = CanvasGeometry::default();
        assert_eq!(geometry.cell_size(), 10.0);
        assert_eq!(geometry.cell_at(15.0, 25.0), Ok(Point::new(1, 2)));
        assert!(geometry.cell_at(285.0, 5.0).is_err());
    }

    #[test]
    fn center_maps_to_middle_of_viewport() {
        let view = MapView::centered_on([17.219, 7.771]);
        assert_eq!(absolute_to_viewport([17.219, 7.771], &view), (50.0, 50.0));
    }

    #[test]
    fn viewport_is_linear_inside_margin() {
        let view = MapView::centered_on([0.0, 0.0]);
        let (vx, vy) = absolute_to_viewport([10.0, -20.0], &view);
        assert!((vx - 60.0).abs() < 1e-9);
        assert!((vy - 30.0).abs() < 1e-9);
    }

    #[test]
    fn viewport_output_always_inside_margin() {
        let view = MapView::centered_on([17.219, 7.771]);
        for &value in &[-1e12, -500.0, -45.0, 0.0, 44.9, 45.1, 1e9, f64::MAX, f64::MIN] {
            let (vx, vy) = absolute_to_viewport([value, -value], &view);
            assert!((5.0..=95.0).contains(&vx), "vx {vx} for {value}");
            assert!((5.0..=95.0).contains(&vy), "vy {vy} for {value}");
        }
    }

    #[test]
    fn zoom_scales_extent_and_reset_recenters() {
        let mut view = MapView::centered_on([1.0, 2.0]);
        view.zoom_in();
        assert!((view.viewport_width - 80.0).abs() < 1e-9);
        view.zoom_out();
        assert!((view.viewport_height - 100.0).abs() < 1e-9);
        view.zoom_out();
        view.reset([1.0, 2.0]);
        assert_eq!(view, MapView::centered_on([1.0, 2.0]));
    }

    #[test]
    fn deep_zoom_stops_at_minimum_extent() {
        let center = [17.219, 7.771];
        let mut view = MapView::centered_on(center);
        for _ in 0..5000 {
            view.zoom_in();
        }
        assert_eq!(view.viewport_width, MIN_VIEWPORT_EXTENT);
        assert_eq!(view.viewport_height, MIN_VIEWPORT_EXTENT);
        assert_eq!(absolute_to_viewport(center, &view), (50.0, 50.0));
        let (vx, vy) = absolute_to_viewport([18.0, 0.0], &view);
        assert_eq!((vx, vy), (95.0, 5.0));
    }

    #[test]
    fn zooming_in_spreads_markers_apart() {
        let mut view = MapView::centered_on([0.0, 0.0]);
        let (before, _) = absolute_to_viewport([20.0, 0.0], &view);
        view.zoom_in();
        let (after, _) = absolute_to_viewport([20.0, 0.0], &view);
        assert!(after > before);
    }

    #[test]
    fn flatten_respects_axis_order() {
        let set = set_of(&[(1, 2), (3, 4)]);
        assert_eq!(flatten(&set, AxisOrder::Xy), vec![1, 2, 3, 4]);
        assert_eq!(flatten(&set, AxisOrder::Yx), vec![2, 1, 4, 3]);
    }

    #[test]
    fn flatten_of_empty_set_is_empty() {
        assert!(flatten(&PointSet::new(GRID_SIZE), AxisOrder::Xy).is_empty());
    }

    #[test]
    fn drawn_coords_format() {
        assert_eq!(format_drawn_coords(&[1, 2, 3, 4]), "(1,2), (3,4)");
        assert_eq!(format_drawn_coords(&[5, 6, 7]), "(5,6)");
        assert_eq!(format_drawn_coords(&[]), "");
    }

    #[test]
    fn axis_order_parses_case_insensitively() {
        assert_eq!("XY".parse::<AxisOrder>(), Ok(AxisOrder::Xy));
        assert_eq!(" yx ".parse::<AxisOrder>(), Ok(AxisOrder::Yx));
        assert!("zx".parse::<AxisOrder>().is_err());
        assert_eq!(AxisOrder::Yx.to_string(), "yx");
    }
}
