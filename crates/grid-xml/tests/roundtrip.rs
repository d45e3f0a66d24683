use grid_model::{Grid, GridCell, LinearMapping, Mapping, Param, Position};
use grid_xml::{read_grid_from_xml, write_grid, GridReader, GridXmlError, MappingRegistry, TagPolicy};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use quick_xml::events::Event;
use quick_xml::Reader;

fn sample_grid() -> Grid {
    let mut grid = Grid::new();

    let mut a = GridCell::new(Position::new(0.0, 0.0), Position::new(100.5, 200.25));
    a.set_mapping(0, Box::new(LinearMapping::new(1.5, -3.0)));
    a.set_mapping(1, Box::new(LinearMapping::new(0.25, 10.0)));
    grid.push(a);

    // Second cell leaves dimension 1 unset.
    let mut b = GridCell::new(Position::new(-5.75, 1.0), Position::new(-1.0, 2.0));
    b.set_mapping(0, Box::new(LinearMapping::new(2.0, 0.0)));
    grid.push(b);

    grid.push(GridCell::new(Position::new(7.0, 8.0), Position::new(9.0, 10.0)));

    grid
}

/// Drive the push API directly so recorded warnings stay observable.
fn read_collecting_warnings(
    xml: &str,
    registry: &MappingRegistry,
    policy: TagPolicy,
) -> Result<(Grid, Vec<String>), GridXmlError> {
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
    let warnings = handler.warnings().to_vec();
    Ok((handler.finish()?, warnings))
}

#[test]
fn read_after_write_preserves_semantic_content() {
    let grid = sample_grid();
    let registry = MappingRegistry::with_builtins();

    let xml = write_grid(&grid).expect("write");
    let back = read_grid_from_xml(&xml, &registry, TagPolicy::Fatal).expect("read");

    assert_eq!(back, grid);
}

#[test]
fn write_after_read_yields_the_same_document() {
    let registry = MappingRegistry::with_builtins();
    let xml = write_grid(&sample_grid()).expect("write");

    let grid = read_grid_from_xml(&xml, &registry, TagPolicy::Fatal).expect("read");
    let rewritten = write_grid(&grid).expect("rewrite");

    assert_eq!(rewritten, xml);
}

#[test]
fn empty_grid_round_trips() {
    let registry = MappingRegistry::with_builtins();

    let xml = write_grid(&Grid::new()).expect("write");
    assert!(!xml.contains("<cell>"));

    let grid = read_grid_from_xml(&xml, &registry, TagPolicy::Fatal).expect("read");
    assert!(grid.is_empty());

    // An empty-element celllist is the same document.
    let grid = read_grid_from_xml("<celllist/>", &registry, TagPolicy::Fatal).expect("read");
    assert!(grid.is_empty());
}

#[test]
fn unknown_mapping_type_is_fatal_in_both_policies() {
    let registry = MappingRegistry::with_builtins();
    let xml = r#"
        <celllist>
          <cell>
            <first><fposition>0</fposition><sposition>0</sposition></first>
            <second><fposition>1</fposition><sposition>1</sposition></second>
            <mappinglist>
              <mapping type="DoesNotExist" dim="0"/>
            </mappinglist>
          </cell>
        </celllist>
    "#;

    for policy in [TagPolicy::Fatal, TagPolicy::Warn] {
        let err = read_grid_from_xml(xml, &registry, policy).unwrap_err();
        assert!(
            matches!(&err, GridXmlError::UnknownMappingType(name) if name == "DoesNotExist"),
            "unexpected error under {policy:?}: {err}"
        );
    }
}

#[test]
fn out_of_range_dimension_is_fatal() {
    let registry = MappingRegistry::with_builtins();
    let xml = r#"
        <celllist>
          <cell>
            <first><fposition>0</fposition><sposition>0</sposition></first>
            <second><fposition>1</fposition><sposition>1</sposition></second>
            <mappinglist>
              <mapping type="LinearMapping" dim="5"/>
            </mappinglist>
          </cell>
        </celllist>
    "#;

    for policy in [TagPolicy::Fatal, TagPolicy::Warn] {
        let err = read_grid_from_xml(xml, &registry, policy).unwrap_err();
        assert!(
            matches!(&err, GridXmlError::InvalidDimension { dim, max: 2 } if dim == "5"),
            "unexpected error under {policy:?}: {err}"
        );
    }
}

#[test]
fn unrecognized_tag_is_skipped_with_a_warning_in_warn_mode() {
    let registry = MappingRegistry::with_builtins();
    let with_extra = r#"
        <celllist>
          <cell>
            <metadata><experiment id="7"/>free text</metadata>
            <first><fposition>1</fposition><sposition>2</sposition></first>
            <second><fposition>3</fposition><sposition>4</sposition></second>
            <mappinglist>
              <mapping type="LinearMapping" dim="0"/>
            </mappinglist>
          </cell>
        </celllist>
    "#;
    let without_extra = with_extra.replace(
        "<metadata><experiment id=\"7\"/>free text</metadata>",
        "",
    );

    let (grid, warnings) =
        read_collecting_warnings(with_extra, &registry, TagPolicy::Warn).expect("lenient read");
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("metadata"), "warning: {}", warnings[0]);

    let clean = read_grid_from_xml(&without_extra, &registry, TagPolicy::Fatal).expect("read");
    assert_eq!(grid, clean);

    // The same document is rejected outright in fatal mode.
    let err = read_grid_from_xml(with_extra, &registry, TagPolicy::Fatal).unwrap_err();
    assert!(matches!(&err, GridXmlError::UnrecognizedTag { name } if name == "metadata"));
}

#[test]
fn duplicate_mappings_for_one_dimension_take_the_last() {
    let registry = MappingRegistry::with_builtins();
    let xml = r#"
        <celllist>
          <cell>
            <first><fposition>0</fposition><sposition>0</sposition></first>
            <second><fposition>1</fposition><sposition>1</sposition></second>
            <mappinglist>
              <mapping type="LinearMapping" dim="0">
                <param><ITEM name="slope" value="1" type="float"/></param>
              </mapping>
              <mapping type="LinearMapping" dim="0">
                <param><ITEM name="slope" value="9" type="float"/></param>
              </mapping>
            </mappinglist>
          </cell>
        </celllist>
    "#;

    let grid = read_grid_from_xml(xml, &registry, TagPolicy::Fatal).expect("read");
    let cell = grid.iter().next().expect("one cell");
    let mapping = cell.mapping(0).expect("dim 0 occupied");
    assert_eq!(mapping.param().get_float("slope"), Some(9.0));
}

#[derive(Debug, Default)]
struct ShiftMapping {
    param: Param,
}

impl Mapping for ShiftMapping {
    fn type_name(&self) -> &str {
        "ShiftMapping"
    }

    fn param(&self) -> &Param {
        &self.param
    }

    fn set_param(&mut self, param: Param) {
        self.param = param;
    }

    fn apply(&self, value: f64) -> f64 {
        value + self.param.get_float("offset").unwrap_or(0.0)
    }
}

#[test]
fn registered_types_extend_the_reader() {
    let mut registry = MappingRegistry::with_builtins();
    registry.register("ShiftMapping", || Box::new(ShiftMapping::default()));

    let xml = r#"
        <celllist>
          <cell>
            <first><fposition>0</fposition><sposition>0</sposition></first>
            <second><fposition>1</fposition><sposition>1</sposition></second>
            <mappinglist>
              <mapping type="ShiftMapping" dim="1">
                <param><ITEM name="offset" value="4.5" type="float"/></param>
              </mapping>
            </mappinglist>
          </cell>
        </celllist>
    "#;

    let grid = read_grid_from_xml(xml, &registry, TagPolicy::Fatal).expect("read");
    let mapping = grid.iter().next().unwrap().mapping(1).expect("dim 1");
    assert_eq!(mapping.type_name(), "ShiftMapping");
    assert_eq!(mapping.apply(1.0), 5.5);

    // Extension types survive a round-trip as long as the registry knows them.
    let rewritten = write_grid(&grid).expect("write");
    let back = read_grid_from_xml(&rewritten, &registry, TagPolicy::Fatal).expect("reread");
    assert_eq!(back, grid);
}

fn arb_cell() -> impl Strategy<Value = GridCell> {
    (
        (-1e6f64..1e6, -1e6f64..1e6),
        (-1e6f64..1e6, -1e6f64..1e6),
        proptest::option::of((-100.0f64..100.0, -100.0f64..100.0)),
        proptest::option::of((-100.0f64..100.0, -100.0f64..100.0)),
    )
        .prop_map(|((fx, fy), (sx, sy), m0, m1)| {
            let mut cell = GridCell::new(Position::new(fx, fy), Position::new(sx, sy));
            if let Some((slope, intercept)) = m0 {
                cell.set_mapping(0, Box::new(LinearMapping::new(slope, intercept)));
            }
            if let Some((slope, intercept)) = m1 {
                cell.set_mapping(1, Box::new(LinearMapping::new(slope, intercept)));
            }
            cell
        })
}

proptest! {
    #[test]
    fn round_trip_identity(cells in proptest::collection::vec(arb_cell(), 0..5)) {
        let mut grid = Grid::new();
        for cell in cells {
            grid.push(cell);
        }
        let registry = MappingRegistry::with_builtins();

        let xml = write_grid(&grid).expect("write");
        let back = read_grid_from_xml(&xml, &registry, TagPolicy::Fatal).expect("read");
        prop_assert_eq!(back, grid);
    }
}
