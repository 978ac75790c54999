//! Build a [`Element`] tree from XML text

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;

use super::error::DocumentError;
use super::{Attribute, Element, MAX_NESTING_DEPTH, Node};

/// Parse `text` and return its root element
///
/// Elements nested deeper than [`MAX_NESTING_DEPTH`] are rejected.
pub(super) fn parse(text: &str) -> Result<Element, DocumentError> {
    let mut reader = NsReader::from_str(text);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let position = reader.buffer_position() as u64;
        let (resolved, event) = match reader.read_resolved_event() {
            Ok(pair) => pair,
            Err(e) => {
                return Err(DocumentError::Parse {
                    position,
                    message: e.to_string(),
                });
            }
        };
        let namespace = bound_namespace(&resolved);

        if matches!(event, Event::Start(_) | Event::Empty(_))
            && stack.len() >= MAX_NESTING_DEPTH
        {
            return Err(DocumentError::NestingTooDeep {
                limit: MAX_NESTING_DEPTH,
            });
        }

        match event {
            Event::Start(start) => {
                let element = element_from(&reader, &start, namespace, position)?;
                stack.push(element);
            }
            Event::Empty(start) => {
                let element = element_from(&reader, &start, namespace, position)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack.pop().ok_or_else(|| DocumentError::Parse {
                    position,
                    message: "closing tag without matching opening tag".to_string(),
                })?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(|e| DocumentError::Parse {
                    position,
                    message: e.to_string(),
                })?;
                push_text(&mut stack, Node::Text(text.into_owned()))?;
            }
            Event::CData(data) => {
                let value = String::from_utf8(data.into_inner().into_owned())
                    .map_err(|_| DocumentError::Encoding)?;
                push_text(&mut stack, Node::CData(value))?;
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions and doctype carry no data
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(DocumentError::UnclosedElement(open.name.clone()));
    }

    root.ok_or(DocumentError::NoRoot)
}

fn bound_namespace(resolved: &ResolveResult<'_>) -> Option<String> {
    match resolved {
        ResolveResult::Bound(namespace) => {
            Some(String::from_utf8_lossy(namespace.as_ref()).into_owned())
        }
        ResolveResult::Unbound | ResolveResult::Unknown(_) => None,
    }
}

fn decode(bytes: &[u8]) -> Result<String, DocumentError> {
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|_| DocumentError::Encoding)
}

fn element_from(
    reader: &NsReader<&[u8]>,
    start: &BytesStart<'_>,
    namespace: Option<String>,
    position: u64,
) -> Result<Element, DocumentError> {
    let mut element = Element {
        name: decode(start.name().as_ref())?,
        local_name: decode(start.local_name().as_ref())?,
        namespace,
        attributes: Vec::new(),
        namespace_declarations: Vec::new(),
        children: Vec::new(),
    };

    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| DocumentError::Parse {
            position,
            message: e.to_string(),
        })?;
        let name = decode(attribute.key.as_ref())?;
        let value = attribute
            .unescape_value()
            .map_err(|e| DocumentError::Parse {
                position,
                message: e.to_string(),
            })?
            .into_owned();

        if name == "xmlns" || name.starts_with("xmlns:") {
            element.namespace_declarations.push((name, value));
            continue;
        }

        let (resolved, local_name) = reader.resolve_attribute(attribute.key);
        element.attributes.push(Attribute {
            name,
            local_name: decode(local_name.as_ref())?,
            namespace: bound_namespace(&resolved),
            value,
        });
    }

    Ok(element)
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), DocumentError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(Node::Element(element)),
        None if root.is_none() => *root = Some(element),
        None => return Err(DocumentError::MultipleRoots),
    }
    Ok(())
}

fn push_text(stack: &mut [Element], node: Node) -> Result<(), DocumentError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => {
            let blank = match &node {
                Node::Text(text) | Node::CData(text) => text.trim().is_empty(),
                Node::Element(_) => false,
            };
            if !blank {
                return Err(DocumentError::TextOutsideRoot);
            }
        }
    }
    Ok(())
}
