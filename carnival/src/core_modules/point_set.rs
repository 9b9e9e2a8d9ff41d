// THEORY:
// The `PointSet` is the sketchpad's only piece of state: the cells the player has
// toggled on the 28x28 image. It is a "dumb" container with one rule, exclusive
// toggle semantics. Touching a cell that is already in the set removes it,
// touching any other cell appends it.
//
// Insertion order is preserved because it is the order the cells are flattened
// in when a sketch is submitted. Equality, however, is *set* equality: a point
// set is unordered as far as identity goes, which is what makes toggle its own
// inverse even when the toggled cell was not the most recent one.
//
// The grid size travels with the set so an out-of-grid toggle is rejected
// before it can be stored. Deserialization goes through the same checks: a
// payload with a repeated or out-of-grid cell never becomes a `PointSet`.

use crate::core_modules::coordinate_mapper::Point;
use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

/// What a single toggle did to the set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Added,
    Removed,
}

/// An insertion-ordered set of unique grid cells.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawPointSet")]
pub struct PointSet {
    /// Cells per side of the grid the points must lie in.
    grid_size: u32,
    /// Members, oldest first. Never contains the same `(x, y)` twice.
    points: Vec<Point>,
}

impl PointSet {
    pub fn new(grid_size: u32) -> Self {
        Self {
            grid_size,
            points: Vec::new(),
        }
    }

    /// Builds a set from raw drawn cells, e.g. a stroke that passes over the same
    /// cell several times. Each cell is added once; repeats are ignored rather
    /// than toggled back out.
    pub fn from_cells<I>(grid_size: u32, cells: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = (i64, i64)>,
    {
        let mut set = Self::new(grid_size);
        for cell in cells {
            let point = Point::from_cell(cell, grid_size)?;
            if !set.contains(&point) {
                set.points.push(point);
            }
        }
        Ok(set)
    }

    /// Removes `point` if present, otherwise appends it.
    pub fn toggle(&mut self, point: Point) -> Result<Toggle, ValidationError> {
        self.check_bounds(&point)?;
        match self.points.iter().position(|p| *p == point) {
            Some(index) => {
                self.points.remove(index);
                Ok(Toggle::Removed)
            }
            None => {
                self.points.push(point);
                Ok(Toggle::Added)
            }
        }
    }

    /// Value-consuming form of [`PointSet::toggle`] for update-style callers.
    pub fn toggled(mut self, point: Point) -> Result<Self, ValidationError> {
        self.toggle(point)?;
        Ok(self)
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn contains(&self, point: &Point) -> bool {
        self.points.contains(point)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn grid_size(&self) -> u32 {
        self.grid_size
    }

    /// Members in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Point> {
        self.points.iter()
    }

    fn check_bounds(&self, point: &Point) -> Result<(), ValidationError> {
        if point.x >= self.grid_size || point.y >= self.grid_size {
            return Err(ValidationError::OutOfBounds {
                x: point.x as i64,
                y: point.y as i64,
                grid_size: self.grid_size,
            });
        }
        Ok(())
    }
}

/// Wire form of a `PointSet`, before validation.
#[derive(Deserialize)]
struct RawPointSet {
    grid_size: u32,
    points: Vec<Point>,
}

impl TryFrom<RawPointSet> for PointSet {
    type Error = ValidationError;

    fn try_from(raw: RawPointSet) -> Result<Self, Self::Error> {
        let mut set = Self::new(raw.grid_size);
        for point in raw.points {
            set.check_bounds(&point)?;
            if set.contains(&point) {
                return Err(ValidationError::DuplicateCell { x: point.x, y: point.y });
            }
            set.points.push(point);
        }
        Ok(set)
    }
}

impl PartialEq for PointSet {
    fn eq(&self, other: &Self) -> bool {
        self.grid_size == other.grid_size
            && self.points.len() == other.points.len()
            && self.points.iter().all(|p| other.contains(p))
    }
}

impl Eq for PointSet {}

impl<'a> IntoIterator for &'a PointSet {
    type Item = &'a Point;
    type IntoIter = std::slice::Iter<'a, Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
