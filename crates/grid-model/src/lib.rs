//! `grid-model` defines the in-memory data structures for spatial alignment
//! grids.
//!
//! The crate is intentionally self-contained so it can be reused by:
//! - the XML import/export layer (`grid-xml`)
//! - alignment algorithms that apply the per-dimension coordinate mappings

mod grid;
mod mapping;
mod param;

pub use grid::{Grid, GridCell, Position, DIMENSIONS};
pub use mapping::{LinearMapping, Mapping};
pub use param::{Param, ParamValue};
