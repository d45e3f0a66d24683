/// The fixed tag vocabulary of a grid document.
///
/// The tag set is part of the format contract and is not extensible, unlike
/// mapping types (see [`crate::MappingRegistry`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    CellList,
    Cell,
    First,
    Second,
    FPosition,
    SPosition,
    MappingList,
    Mapping,
    Param,
}

impl Tag {
    /// Classify a raw tag name, or `None` for anything outside the
    /// vocabulary.
    #[must_use]
    pub fn from_name(name: &[u8]) -> Option<Tag> {
        match name {
            b"celllist" => Some(Tag::CellList),
            b"cell" => Some(Tag::Cell),
            b"first" => Some(Tag::First),
            b"second" => Some(Tag::Second),
            b"fposition" => Some(Tag::FPosition),
            b"sposition" => Some(Tag::SPosition),
            b"mappinglist" => Some(Tag::MappingList),
            b"mapping" => Some(Tag::Mapping),
            b"param" => Some(Tag::Param),
            _ => None,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Tag::CellList => "celllist",
            Tag::Cell => "cell",
            Tag::First => "first",
            Tag::Second => "second",
            Tag::FPosition => "fposition",
            Tag::SPosition => "sposition",
            Tag::MappingList => "mappinglist",
            Tag::Mapping => "mapping",
            Tag::Param => "param",
        }
    }
}
