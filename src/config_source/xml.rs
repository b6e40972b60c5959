//! XML connection configuration.
//!
//! ```xml
//! <Connections>
//!   <MySql>
//!     <Host>db.internal</Host>
//!     <Port>3306</Port>
//!   </MySql>
//! </Connections>
//! ```
//!
//! The root element name is free. Elements with children become mappings,
//! leaf elements become strings. Attributes are ignored.
use super::{ConfigSourceReader, RawTree};
use crate::config::ConfigFormat;
use crate::core::{ConnectorError, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, Default)]
pub struct XmlReader;

struct Element {
    name: String,
    children: Map<String, Value>,
    text: String,
}

impl Element {
    fn new(name: String) -> Self {
        Self {
            name,
            children: Map::new(),
            text: String::new(),
        }
    }

    fn into_value(self) -> Value {
        if self.children.is_empty() {
            Value::String(self.text)
        } else {
            Value::Object(self.children)
        }
    }
}

impl ConfigSourceReader for XmlReader {
    fn format(&self) -> ConfigFormat {
        ConfigFormat::Xml
    }

    fn parse(&self, content: &str) -> Result<RawTree> {
        let mut reader = Reader::from_str(content);
        reader.trim_text(true);

        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Value> = None;

        loop {
            let event = reader.read_event().map_err(|e| {
                ConnectorError::parse(format!(
                    "invalid XML at position {}: {}",
                    reader.buffer_position(),
                    e
                ))
            })?;

            match event {
                Event::Start(start) => {
                    if root.is_some() {
                        return Err(ConnectorError::parse("invalid XML: multiple root elements"));
                    }
                    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
                    stack.push(Element::new(name));
                }
                Event::Empty(empty) => {
                    if stack.is_empty() && root.is_some() {
                        return Err(ConnectorError::parse("invalid XML: multiple root elements"));
                    }
                    let name = String::from_utf8_lossy(empty.name().as_ref()).into_owned();
                    match stack.last_mut() {
                        Some(parent) => {
                            parent.children.insert(name, Value::String(String::new()));
                        }
                        None => root = Some(Value::String(String::new())),
                    }
                }
                Event::Text(text) => {
                    let text = text
                        .unescape()
                        .map_err(|e| ConnectorError::parse(format!("invalid XML text: {}", e)))?;
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&text);
                    }
                }
                Event::CData(data) => {
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&String::from_utf8_lossy(&data));
                    }
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| ConnectorError::parse("invalid XML: unexpected closing tag"))?;
                    let name = element.name.clone();
                    let value = element.into_value();
                    match stack.last_mut() {
                        Some(parent) => {
                            parent.children.insert(name, value);
                        }
                        None => root = Some(value),
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(ConnectorError::parse(format!(
                "invalid XML: element '{}' is never closed",
                open.name
            )));
        }
        root.ok_or_else(|| ConnectorError::parse("invalid XML: no root element"))
    }
}
