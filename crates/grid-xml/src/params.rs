use std::io::Cursor;

use grid_model::{Param, ParamValue};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};

use crate::GridXmlError;

/// Incremental decoder for the payload of an open `<param>` scope.
///
/// The payload is a flat list of `<ITEM name=".." value=".." type=".."/>`
/// elements; anything else is a malformed configuration.
#[derive(Debug, Default)]
pub(crate) struct ParamDecoder {
    param: Param,
}

impl ParamDecoder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn start_element(&mut self, e: &BytesStart) -> Result<(), GridXmlError> {
        if e.name().as_ref() != b"ITEM" {
            return Err(GridXmlError::MalformedParam(format!(
                "unexpected element <{}> in param payload",
                String::from_utf8_lossy(e.name().as_ref())
            )));
        }

        let mut name: Option<String> = None;
        let mut value: Option<String> = None;
        let mut ty: Option<String> = None;
        for attr in e.attributes() {
            let attr = attr?;
            let val = attr.unescape_value()?.into_owned();
            match attr.key.as_ref() {
                b"name" => name = Some(val),
                b"value" => value = Some(val),
                b"type" => ty = Some(val),
                _ => {}
            }
        }

        let name = name
            .ok_or_else(|| GridXmlError::MalformedParam("ITEM is missing `name`".to_owned()))?;
        let value = value
            .ok_or_else(|| GridXmlError::MalformedParam("ITEM is missing `value`".to_owned()))?;
        let ty = ty
            .ok_or_else(|| GridXmlError::MalformedParam("ITEM is missing `type`".to_owned()))?;

        let value = match ty.as_str() {
            "string" => ParamValue::Str(value),
            "int" => ParamValue::Int(value.parse().map_err(|_| {
                GridXmlError::MalformedParam(format!("ITEM \"{name}\" has non-int value \"{value}\""))
            })?),
            "float" => ParamValue::Float(value.parse().map_err(|_| {
                GridXmlError::MalformedParam(format!(
                    "ITEM \"{name}\" has non-float value \"{value}\""
                ))
            })?),
            other => {
                return Err(GridXmlError::MalformedParam(format!(
                    "ITEM \"{name}\" has unknown type \"{other}\""
                )))
            }
        };

        self.param.set(name, value);
        Ok(())
    }

    pub(crate) fn finish(self) -> Param {
        self.param
    }
}

/// Read a standalone `<param>` document.
pub fn read_param_xml(xml: &str) -> Result<Param, GridXmlError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut decoder = ParamDecoder::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) if e.name().as_ref() != b"param" => {
                decoder.start_element(&e)?;
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(decoder.finish())
}

pub(crate) fn write_param_to<W: std::io::Write>(
    writer: &mut Writer<W>,
    param: &Param,
) -> Result<(), GridXmlError> {
    if param.is_empty() {
        writer.write_event(Event::Empty(BytesStart::new("param")))?;
        return Ok(());
    }

    writer.write_event(Event::Start(BytesStart::new("param")))?;
    for (name, value) in param.iter() {
        let mut item = BytesStart::new("ITEM");
        item.push_attribute(("name", name));
        let text = match value {
            ParamValue::Str(s) => s.clone(),
            ParamValue::Int(i) => i.to_string(),
            ParamValue::Float(f) => f.to_string(),
        };
        item.push_attribute(("value", text.as_str()));
        item.push_attribute(("type", value.type_name()));
        writer.write_event(Event::Empty(item))?;
    }
    writer.write_event(Event::End(BytesEnd::new("param")))?;
    Ok(())
}

/// Serialize a [`Param`] as a standalone `<param>` document.
pub fn write_param(param: &Param) -> Result<String, GridXmlError> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    write_param_to(&mut writer, param)?;
    let bytes = writer.into_inner().into_inner();
    Ok(String::from_utf8_lossy(&bytes).to_string())
}
