use serde::{Deserialize, Serialize};

use crate::mapping::Mapping;

/// Number of spatial dimensions a grid cell spans.
pub const DIMENSIONS: usize = 2;

/// A 2-dimensional coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Component for a zero-based dimension index. Panics if `dim` is out of
    /// range for [`DIMENSIONS`].
    #[must_use]
    pub fn component(&self, dim: usize) -> f64 {
        match dim {
            0 => self.x,
            1 => self.y,
            _ => panic!("dimension index {dim} out of range"),
        }
    }

    pub fn component_mut(&mut self, dim: usize) -> &mut f64 {
        match dim {
            0 => &mut self.x,
            1 => &mut self.y,
            _ => panic!("dimension index {dim} out of range"),
        }
    }
}

/// A rectangular region defined by two corner coordinates plus one optional
/// coordinate mapping per spatial dimension.
///
/// A mapping slot stays `None` only when the source document omitted it; the
/// codec never synthesizes defaults.
#[derive(Debug, Default)]
pub struct GridCell {
    pub first: Position,
    pub second: Position,
    mappings: [Option<Box<dyn Mapping>>; DIMENSIONS],
}

impl GridCell {
    #[must_use]
    pub fn new(first: Position, second: Position) -> Self {
        Self {
            first,
            second,
            mappings: Default::default(),
        }
    }

    /// Install `mapping` for dimension `dim`, replacing any previous one.
    /// Panics if `dim` is out of range for [`DIMENSIONS`].
    pub fn set_mapping(&mut self, dim: usize, mapping: Box<dyn Mapping>) {
        self.mappings[dim] = Some(mapping);
    }

    #[must_use]
    pub fn mapping(&self, dim: usize) -> Option<&dyn Mapping> {
        self.mappings.get(dim).and_then(|m| m.as_deref())
    }

    /// Mapping slots in dimension order.
    pub fn mappings(&self) -> impl Iterator<Item = Option<&dyn Mapping>> {
        self.mappings.iter().map(|m| m.as_deref())
    }
}

impl PartialEq for GridCell {
    fn eq(&self, other: &Self) -> bool {
        self.first == other.first
            && self.second == other.second
            && self
                .mappings()
                .zip(other.mappings())
                .all(|(a, b)| match (a, b) {
                    (None, None) => true,
                    (Some(a), Some(b)) => a == b,
                    _ => false,
                })
    }
}

/// An ordered collection of grid cells. Cell order is semantically
/// significant and preserved by the codec on round-trip.
#[derive(Debug, Default, PartialEq)]
pub struct Grid {
    cells: Vec<GridCell>,
}

impl Grid {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, cell: GridCell) {
        self.cells.push(cell);
    }

    pub fn iter(&self) -> impl Iterator<Item = &GridCell> {
        self.cells.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<'a> IntoIterator for &'a Grid {
    type Item = &'a GridCell;
    type IntoIter = std::slice::Iter<'a, GridCell>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.iter()
    }
}
