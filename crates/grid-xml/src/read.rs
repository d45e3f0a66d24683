use grid_model::{Grid, GridCell, Mapping, DIMENSIONS};
use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::Reader;

use crate::params::ParamDecoder;
use crate::registry::MappingRegistry;
use crate::tags::Tag;
use crate::GridXmlError;

/// How the reader treats unrecognized tags and tags in illegal positions.
///
/// Structural errors that would corrupt the reconstructed geometry
/// ([`GridXmlError::UnknownMappingType`], [`GridXmlError::InvalidDimension`],
/// [`GridXmlError::NumberFormat`], [`GridXmlError::MalformedParam`]) are
/// always fatal regardless of this policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TagPolicy {
    /// Abort the parse and surface the error to the caller.
    #[default]
    Fatal,
    /// Record a warning, skip the offending element's subtree and continue.
    Warn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Corner {
    First,
    Second,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    X,
    Y,
}

impl Axis {
    fn dim(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
        }
    }
}

/// The currently open nesting scope. Exactly one scope path is open at a
/// time; illegal concurrent-scope combinations are unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Root,
    CellList,
    Cell,
    Corner(Corner),
    Coordinate(Corner, Axis),
    MappingList,
    Mapping,
    Param,
}

impl Scope {
    /// The scope `tag` opens inside `self`, or `None` when `tag` is not a
    /// legal child here.
    fn child(self, tag: Tag) -> Option<Scope> {
        match (self, tag) {
            (Scope::Root, Tag::CellList) => Some(Scope::CellList),
            (Scope::CellList, Tag::Cell) => Some(Scope::Cell),
            (Scope::Cell, Tag::First) => Some(Scope::Corner(Corner::First)),
            (Scope::Cell, Tag::Second) => Some(Scope::Corner(Corner::Second)),
            (Scope::Cell, Tag::MappingList) => Some(Scope::MappingList),
            (Scope::Corner(c), Tag::FPosition) => Some(Scope::Coordinate(c, Axis::X)),
            (Scope::Corner(c), Tag::SPosition) => Some(Scope::Coordinate(c, Axis::Y)),
            (Scope::MappingList, Tag::Mapping) => Some(Scope::Mapping),
            (Scope::Mapping, Tag::Param) => Some(Scope::Param),
            _ => None,
        }
    }

    fn parent(self) -> Scope {
        match self {
            Scope::Root | Scope::CellList => Scope::Root,
            Scope::Cell => Scope::CellList,
            Scope::Corner(_) | Scope::MappingList => Scope::Cell,
            Scope::Coordinate(c, _) => Scope::Corner(c),
            Scope::Mapping => Scope::MappingList,
            Scope::Param => Scope::Mapping,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Scope::Root => "(root)",
            Scope::CellList => "celllist",
            Scope::Cell => "cell",
            Scope::Corner(Corner::First) => "first",
            Scope::Corner(Corner::Second) => "second",
            Scope::Coordinate(_, Axis::X) => "fposition",
            Scope::Coordinate(_, Axis::Y) => "sposition",
            Scope::MappingList => "mappinglist",
            Scope::Mapping => "mapping",
            Scope::Param => "param",
        }
    }
}

/// Push-driven grid document reader.
///
/// The reader is fed one event at a time ([`GridReader::start_element`],
/// [`GridReader::characters`], [`GridReader::end_element`], or the
/// [`GridReader::handle_event`] dispatcher for quick-xml events) and builds
/// cells incrementally. Partially built objects are owned by the reader only
/// while their scope is open; on scope close they are moved into their parent
/// container, so a committed object can never be mutated afterwards.
///
/// One reader handles one document. Call [`GridReader::finish`] after the
/// last event to obtain the populated [`Grid`].
pub struct GridReader<'reg> {
    registry: &'reg MappingRegistry,
    policy: TagPolicy,
    scope: Scope,
    grid: Grid,
    cell: Option<GridCell>,
    mapping: Option<Box<dyn Mapping>>,
    mapping_dim: usize,
    param: Option<ParamDecoder>,
    text: String,
    skip_depth: usize,
    warnings: Vec<String>,
}

impl<'reg> GridReader<'reg> {
    #[must_use]
    pub fn new(registry: &'reg MappingRegistry, policy: TagPolicy) -> Self {
        Self {
            registry,
            policy,
            scope: Scope::Root,
            grid: Grid::new(),
            cell: None,
            mapping: None,
            mapping_dim: 0,
            param: None,
            text: String::new(),
            skip_depth: 0,
            warnings: Vec::new(),
        }
    }

    /// Dispatch a quick-xml event to the matching handler. Declarations,
    /// comments and processing instructions are ignored.
    pub fn handle_event(&mut self, event: &Event<'_>) -> Result<(), GridXmlError> {
        match event {
            Event::Start(e) => self.start_element(e),
            Event::Empty(e) => {
                self.start_element(e)?;
                self.end_element(e.name().as_ref())
            }
            Event::End(e) => self.end_element(e.name().as_ref()),
            Event::Text(t) => self.characters(t),
            _ => Ok(()),
        }
    }

    pub fn start_element(&mut self, e: &BytesStart<'_>) -> Result<(), GridXmlError> {
        if self.skip_depth > 0 {
            self.skip_depth += 1;
            return Ok(());
        }
        if self.scope == Scope::Param {
            if let Some(decoder) = self.param.as_mut() {
                decoder.start_element(e)?;
            }
            return Ok(());
        }

        let raw = e.name();
        let Some(tag) = Tag::from_name(raw.as_ref()) else {
            return self.tag_violation(GridXmlError::UnrecognizedTag {
                name: String::from_utf8_lossy(raw.as_ref()).into_owned(),
            });
        };
        let Some(next) = self.scope.child(tag) else {
            return self.tag_violation(GridXmlError::IllegalNesting {
                tag: tag.name().to_owned(),
                scope: self.scope.name(),
            });
        };

        match next {
            Scope::Cell => self.cell = Some(GridCell::default()),
            Scope::Coordinate(..) => self.text.clear(),
            Scope::Mapping => {
                let (type_name, dim_text) = mapping_attrs(e)?;
                // Unknown types are always fatal: silently dropping a
                // transformation would corrupt the geometry.
                let mapping = self.registry.create(&type_name)?;
                let dim = dim_text
                    .trim()
                    .parse::<usize>()
                    .ok()
                    .filter(|dim| *dim < DIMENSIONS)
                    .ok_or_else(|| GridXmlError::InvalidDimension {
                        dim: dim_text.clone(),
                        max: DIMENSIONS,
                    })?;
                self.mapping = Some(mapping);
                self.mapping_dim = dim;
            }
            Scope::Param => self.param = Some(ParamDecoder::new()),
            _ => {}
        }
        self.scope = next;
        Ok(())
    }

    pub fn characters(&mut self, text: &BytesText<'_>) -> Result<(), GridXmlError> {
        if self.skip_depth > 0 {
            return Ok(());
        }
        // Text outside a coordinate scope is formatting whitespace.
        if let Scope::Coordinate(..) = self.scope {
            self.text.push_str(&text.unescape()?);
        }
        Ok(())
    }

    pub fn end_element(&mut self, name: &[u8]) -> Result<(), GridXmlError> {
        if self.skip_depth > 0 {
            self.skip_depth -= 1;
            return Ok(());
        }
        if self.scope == Scope::Param && name != b"param" {
            // Closing tag of a payload element; the param decoder is
            // attribute-driven and tracks no nesting of its own.
            return Ok(());
        }
        if name != self.scope.name().as_bytes() {
            return Err(GridXmlError::IllegalNesting {
                tag: String::from_utf8_lossy(name).into_owned(),
                scope: self.scope.name(),
            });
        }

        match self.scope {
            Scope::Coordinate(corner, axis) => {
                let text = self.text.trim();
                let value: f64 = text.parse().map_err(|source| GridXmlError::NumberFormat {
                    text: text.to_owned(),
                    source,
                })?;
                if let Some(cell) = self.cell.as_mut() {
                    let position = match corner {
                        Corner::First => &mut cell.first,
                        Corner::Second => &mut cell.second,
                    };
                    *position.component_mut(axis.dim()) = value;
                }
                self.text.clear();
            }
            Scope::Param => {
                if let (Some(decoder), Some(mapping)) = (self.param.take(), self.mapping.as_mut())
                {
                    mapping.set_param(decoder.finish());
                }
            }
            Scope::Mapping => {
                // Last write wins when a document declares two mappings for
                // the same dimension.
                if let (Some(mapping), Some(cell)) = (self.mapping.take(), self.cell.as_mut()) {
                    cell.set_mapping(self.mapping_dim, mapping);
                }
            }
            Scope::Cell => {
                if let Some(cell) = self.cell.take() {
                    self.grid.push(cell);
                }
            }
            _ => {}
        }
        self.scope = self.scope.parent();
        Ok(())
    }

    /// Warnings recorded while parsing under [`TagPolicy::Warn`].
    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Consume the reader and return the populated grid. Fails when the
    /// document ended with a scope still open.
    pub fn finish(self) -> Result<Grid, GridXmlError> {
        match self.scope {
            Scope::Root => Ok(self.grid),
            scope => Err(GridXmlError::UnexpectedEof(scope.name())),
        }
    }

    fn tag_violation(&mut self, err: GridXmlError) -> Result<(), GridXmlError> {
        match self.policy {
            TagPolicy::Fatal => Err(err),
            TagPolicy::Warn => {
                log::warn!("skipping element: {err}");
                self.warnings.push(err.to_string());
                self.skip_depth = 1;
                Ok(())
            }
        }
    }
}

fn mapping_attrs(e: &BytesStart<'_>) -> Result<(String, String), GridXmlError> {
    let mut type_name: Option<String> = None;
    let mut dim: Option<String> = None;
    for attr in e.attributes() {
        let attr = attr?;
        match attr.key.as_ref() {
            b"type" => type_name = Some(attr.unescape_value()?.into_owned()),
            b"dim" => dim = Some(attr.unescape_value()?.into_owned()),
            _ => {}
        }
    }
    let type_name = type_name.ok_or(GridXmlError::MissingAttr {
        tag: "mapping",
        attr: "type",
    })?;
    let dim = dim.ok_or(GridXmlError::MissingAttr {
        tag: "mapping",
        attr: "dim",
    })?;
    Ok((type_name, dim))
}

/// Parse a whole grid document, using quick-xml as the event source.
pub fn read_grid_from_xml(
    xml: &str,
    registry: &MappingRegistry,
    policy: TagPolicy,
) -> Result<Grid, GridXmlError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut handler = GridReader::new(registry, policy);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Eof => break,
            event => handler.handle_event(&event)?,
        }
        buf.clear();
    }
    handler.finish()
}
