use std::io::Cursor;

use grid_model::{Grid, Position};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::params::write_param_to;
use crate::GridXmlError;

/// Serialize `grid` to the canonical document shape as a string.
pub fn write_grid(grid: &Grid) -> Result<String, GridXmlError> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    write_grid_to(&mut writer, grid)?;
    let bytes = writer.into_inner().into_inner();
    Ok(String::from_utf8_lossy(&bytes).to_string())
}

/// Serialize `grid` into an existing XML writer.
///
/// Emits exactly the event sequence a [`crate::GridReader`] consumes to
/// reconstruct an equal grid: cells in order, only the occupied mapping slots,
/// coordinates in shortest-round-trip `f64` text. The grid is assumed
/// well-formed; only sink and XML errors can occur.
pub fn write_grid_to<W: std::io::Write>(
    writer: &mut Writer<W>,
    grid: &Grid,
) -> Result<(), GridXmlError> {
    writer.write_event(Event::Start(BytesStart::new("celllist")))?;
    for cell in grid {
        writer.write_event(Event::Start(BytesStart::new("cell")))?;
        write_corner(writer, "first", &cell.first)?;
        write_corner(writer, "second", &cell.second)?;

        writer.write_event(Event::Start(BytesStart::new("mappinglist")))?;
        for (dim, mapping) in cell.mappings().enumerate() {
            let Some(mapping) = mapping else { continue };
            let mut start = BytesStart::new("mapping");
            start.push_attribute(("type", mapping.type_name()));
            start.push_attribute(("dim", dim.to_string().as_str()));
            writer.write_event(Event::Start(start))?;
            write_param_to(writer, mapping.param())?;
            writer.write_event(Event::End(BytesEnd::new("mapping")))?;
        }
        writer.write_event(Event::End(BytesEnd::new("mappinglist")))?;

        writer.write_event(Event::End(BytesEnd::new("cell")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("celllist")))?;
    Ok(())
}

fn write_corner<W: std::io::Write>(
    writer: &mut Writer<W>,
    name: &str,
    position: &Position,
) -> Result<(), GridXmlError> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    write_scalar(writer, "fposition", position.x)?;
    write_scalar(writer, "sposition", position.y)?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn write_scalar<W: std::io::Write>(
    writer: &mut Writer<W>,
    name: &str,
    value: f64,
) -> Result<(), GridXmlError> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(&value.to_string())))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_model::{GridCell, LinearMapping};
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_grid_writes_an_empty_celllist() {
        let xml = write_grid(&Grid::new()).expect("write");
        assert_eq!(xml, "<celllist></celllist>");
    }

    #[test]
    fn unset_mapping_slots_are_omitted() {
        let mut cell = GridCell::new(Position::new(0.0, 0.0), Position::new(1.0, 1.0));
        cell.set_mapping(1, Box::new(LinearMapping::new(2.0, 0.0)));
        let mut grid = Grid::new();
        grid.push(cell);

        let xml = write_grid(&grid).expect("write");
        assert_eq!(xml.matches("<mapping ").count(), 1);
        assert!(xml.contains(r#"<mapping type="LinearMapping" dim="1">"#));
    }

    #[test]
    fn coordinates_use_shortest_round_trip_text() {
        let mut grid = Grid::new();
        grid.push(GridCell::new(
            Position::new(0.1, -2.5),
            Position::new(3.0, 1_000_000.0),
        ));

        let xml = write_grid(&grid).expect("write");
        assert!(xml.contains("<fposition>0.1</fposition>"));
        assert!(xml.contains("<sposition>-2.5</sposition>"));
        assert!(xml.contains("<fposition>3</fposition>"));
        assert!(xml.contains("<sposition>1000000</sposition>"));
    }
}
