//! Write subtrees back to document text

use quick_xml::Writer;
use quick_xml::events::{BytesCData, BytesEnd, BytesStart, BytesText, Event};

use super::error::DocumentError;
use super::{Element, MAX_NESTING_DEPTH, Node};

impl Element {
    /// Serialize this element, including its own tag, to XML text
    ///
    /// Fails when the subtree is nested deeper than [`MAX_NESTING_DEPTH`].
    pub fn serialize(&self) -> Result<String, DocumentError> {
        let mut writer = Writer::new(Vec::new());
        write_element(&mut writer, self, 1)?;
        finish(writer)
    }

    /// Serialize only the content of this element, without its own tag
    pub fn serialize_inner(&self) -> Result<String, DocumentError> {
        let mut writer = Writer::new(Vec::new());
        for node in &self.children {
            write_node(&mut writer, node, 1)?;
        }
        finish(writer)
    }
}

fn finish(writer: Writer<Vec<u8>>) -> Result<String, DocumentError> {
    String::from_utf8(writer.into_inner()).map_err(|_| DocumentError::Encoding)
}

fn write_element(
    writer: &mut Writer<Vec<u8>>,
    element: &Element,
    depth: usize,
) -> Result<(), DocumentError> {
    if depth > MAX_NESTING_DEPTH {
        return Err(DocumentError::Write(format!(
            "<{}> is nested deeper than {} levels",
            element.name, MAX_NESTING_DEPTH
        )));
    }

    let mut start = BytesStart::new(element.name.as_str());
    for (name, uri) in &element.namespace_declarations {
        start.push_attribute((name.as_str(), uri.as_str()));
    }
    for attribute in &element.attributes {
        start.push_attribute((attribute.name.as_str(), attribute.value.as_str()));
    }

    if element.children.is_empty() {
        return writer
            .write_event(Event::Empty(start))
            .map_err(|e| DocumentError::Write(e.to_string()));
    }

    writer
        .write_event(Event::Start(start))
        .map_err(|e| DocumentError::Write(e.to_string()))?;
    for node in &element.children {
        write_node(writer, node, depth + 1)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(element.name.as_str())))
        .map_err(|e| DocumentError::Write(e.to_string()))
}

fn write_node(
    writer: &mut Writer<Vec<u8>>,
    node: &Node,
    depth: usize,
) -> Result<(), DocumentError> {
    let event = match node {
        Node::Element(element) => return write_element(writer, element, depth),
        Node::Text(text) => Event::Text(BytesText::new(text.as_str())),
        Node::CData(text) => Event::CData(BytesCData::new(text.as_str())),
    };
    writer
        .write_event(event)
        .map_err(|e| DocumentError::Write(e.to_string()))
}
