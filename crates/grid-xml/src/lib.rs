//! XML import/export for alignment grids.
//!
//! The document format is a fixed small vocabulary:
//!
//! ```text
//! celllist := cell*
//! cell := first second mappinglist
//! first := fposition sposition        (corner 1: two scalar coordinates)
//! second := fposition sposition       (corner 2)
//! mappinglist := mapping*
//! mapping := param?                   (attributes: type, dim)
//! param := ITEM*                      (typed key/value items)
//! ```
//!
//! The crate exposes:
//! - [`GridReader`]: a push-driven state machine fed one tag/text event at a
//!   time, plus the pull driver [`read_grid_from_xml`] that runs a
//!   [`quick_xml::Reader`] loop over a string.
//! - [`write_grid`]/[`write_grid_to`]: the inverse serializer emitting the
//!   canonical document shape, such that read-then-write and write-then-read
//!   preserve semantic content exactly.
//! - [`MappingRegistry`]: the extensible name-to-factory table resolving a
//!   `mapping` element's `type` attribute to a concrete
//!   [`grid_model::Mapping`] implementation.

use std::num::ParseFloatError;

use thiserror::Error;

mod params;
mod read;
mod registry;
mod tags;
mod write;

pub use params::{read_param_xml, write_param};
pub use read::{read_grid_from_xml, GridReader, TagPolicy};
pub use registry::MappingRegistry;
pub use tags::Tag;
pub use write::{write_grid, write_grid_to};

#[derive(Debug, Error)]
pub enum GridXmlError {
    #[error("xml parse error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("xml attribute error: {0}")]
    Attr(#[from] quick_xml::events::attributes::AttrError),
    #[error("utf-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unrecognized tag <{name}>")]
    UnrecognizedTag { name: String },
    #[error("tag <{tag}> is not allowed inside <{scope}>")]
    IllegalNesting { tag: String, scope: &'static str },
    #[error("unknown mapping type \"{0}\"")]
    UnknownMappingType(String),
    #[error("invalid mapping dimension index \"{dim}\" (dimensionality {max})")]
    InvalidDimension { dim: String, max: usize },
    #[error("malformed coordinate text \"{text}\": {source}")]
    NumberFormat {
        text: String,
        source: ParseFloatError,
    },
    #[error("malformed param payload: {0}")]
    MalformedParam(String),
    #[error("missing required attribute `{attr}` on <{tag}>")]
    MissingAttr {
        tag: &'static str,
        attr: &'static str,
    },
    #[error("document ended with <{0}> still open")]
    UnexpectedEof(&'static str),
}
