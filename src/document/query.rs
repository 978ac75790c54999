//! Restricted path queries over a [`Document`]
//!
//! Supports a small XPath-like subset, enough to point at record elements:
//!
//! - steps separated by `/` (child) or `//` (any depth),
//! - name tests `*`, `.`, `name` and `prefix:name`,
//! - predicates `[n]`, `[@attr]` and `[@attr='value']`.
//!
//! Unprefixed names match on the local name, whatever namespace the element is
//! in. Expressions are always evaluated from the document node, so `a/b` and
//! `/a/b` select the same elements.

use std::collections::HashSet;

use thiserror::Error;

use super::{Attribute, Document, Element};

/// Errors produced while parsing a path expression
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// Nothing to evaluate
    #[error("Empty path expression")]
    Empty,

    /// A step that is not a name test
    #[error("Invalid path step '{0}'")]
    InvalidStep(String),

    /// A predicate outside the supported subset
    #[error("Unsupported predicate '[{0}]'")]
    InvalidPredicate(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Child,
    Descendant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum NameTest {
    Any,
    SelfNode,
    Local(String),
    Qualified(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Predicate {
    Position(usize),
    HasAttribute(String),
    AttributeEquals(String, String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Step {
    axis: Axis,
    test: NameTest,
    predicates: Vec<Predicate>,
}

/// Evaluation context: the document node or an element
#[derive(Clone, Copy)]
enum Context<'a> {
    Document,
    Element(&'a Element),
}

/// A compiled path expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathQuery {
    steps: Vec<Step>,
}

impl PathQuery {
    /// Compile a path expression
    pub fn parse(expression: &str) -> Result<Self, QueryError> {
        let expression = expression.trim();
        if expression.is_empty() {
            return Err(QueryError::Empty);
        }

        let mut steps = Vec::new();
        let mut rest = expression;
        loop {
            let axis = if let Some(remainder) = rest.strip_prefix("//") {
                rest = remainder;
                Axis::Descendant
            } else if let Some(remainder) = rest.strip_prefix('/') {
                rest = remainder;
                Axis::Child
            } else {
                Axis::Child
            };

            let (step, remainder) = rest.split_at(step_end(rest));
            if step.is_empty() {
                return Err(QueryError::InvalidStep(expression.to_string()));
            }
            steps.push(parse_step(axis, step)?);

            rest = remainder;
            if rest.is_empty() {
                break;
            }
        }

        Ok(Self { steps })
    }

    /// Match elements with the given tag name anywhere in the document,
    /// ignoring namespaces
    pub fn any_depth(tag: &str) -> Result<Self, QueryError> {
        let local = match tag.split_once(':') {
            Some((_, local)) => local,
            None => tag,
        };
        if !is_name(local) {
            return Err(QueryError::InvalidStep(tag.to_string()));
        }
        Ok(Self {
            steps: vec![Step {
                axis: Axis::Descendant,
                test: NameTest::Local(local.to_string()),
                predicates: Vec::new(),
            }],
        })
    }

    /// Compile a record locator: a bare tag name matches that element at any
    /// depth by local name, anything else is parsed as a path
    pub fn locator(expression: &str) -> Result<Self, QueryError> {
        let expression = expression.trim();
        if is_name(expression) {
            Self::any_depth(expression)
        } else {
            Self::parse(expression)
        }
    }

    /// Evaluate against a document, returning matches in document order
    pub fn evaluate<'a>(&self, document: &'a Document) -> Vec<&'a Element> {
        let root = document.root();
        let mut context: Vec<Context<'a>> = vec![Context::Document];

        for step in &self.steps {
            let mut selected: Vec<Context<'a>> = Vec::new();
            for origin in &context {
                let origins = match step.axis {
                    Axis::Child => vec![*origin],
                    Axis::Descendant => descendants_or_self(*origin, root),
                };
                for origin in origins {
                    selected.extend(step.select(origin, root));
                }
            }
            context = document_order(selected, root);
            if context.is_empty() {
                break;
            }
        }

        context
            .into_iter()
            .filter_map(|context| match context {
                Context::Element(element) => Some(element),
                Context::Document => None,
            })
            .collect()
    }
}

impl Step {
    fn select<'a>(&self, origin: Context<'a>, root: &'a Element) -> Vec<Context<'a>> {
        let candidates: Vec<Context<'a>> = match (&self.test, origin) {
            (NameTest::SelfNode, origin) => vec![origin],
            (_, Context::Document) => vec![Context::Element(root)],
            (_, Context::Element(element)) => {
                element.child_elements().map(Context::Element).collect()
            }
        };

        let mut matched: Vec<Context<'a>> = candidates
            .into_iter()
            .filter(|candidate| self.matches_name(*candidate))
            .collect();

        for predicate in &self.predicates {
            matched = match predicate {
                Predicate::Position(position) => matched
                    .get(position - 1)
                    .map(|context| vec![*context])
                    .unwrap_or_default(),
                Predicate::HasAttribute(name) => matched
                    .into_iter()
                    .filter(|context| find_attribute(*context, name).is_some())
                    .collect(),
                Predicate::AttributeEquals(name, value) => matched
                    .into_iter()
                    .filter(|context| {
                        find_attribute(*context, name)
                            .is_some_and(|attribute| attribute.value == *value)
                    })
                    .collect(),
            };
        }

        matched
    }

    fn matches_name(&self, context: Context<'_>) -> bool {
        match (&self.test, context) {
            (NameTest::SelfNode, _) => true,
            (_, Context::Document) => false,
            (NameTest::Any, Context::Element(_)) => true,
            (NameTest::Local(name), Context::Element(element)) => element.local_name == *name,
            (NameTest::Qualified(name), Context::Element(element)) => element.name == *name,
        }
    }
}

fn find_attribute<'a>(context: Context<'a>, name: &str) -> Option<&'a Attribute> {
    let Context::Element(element) = context else {
        return None;
    };
    let qualified = name.contains(':');
    element.attributes.iter().find(|attribute| {
        if qualified {
            attribute.name == name
        } else {
            attribute.local_name == name
        }
    })
}

fn descendants_or_self<'a>(origin: Context<'a>, root: &'a Element) -> Vec<Context<'a>> {
    match origin {
        Context::Document => std::iter::once(Context::Document)
            .chain(root.descendants().map(Context::Element))
            .collect(),
        Context::Element(element) => element.descendants().map(Context::Element).collect(),
    }
}

/// Deduplicate contexts and sort them into document order
fn document_order<'a>(selected: Vec<Context<'a>>, root: &'a Element) -> Vec<Context<'a>> {
    let mut includes_document = false;
    let mut wanted: HashSet<*const Element> = HashSet::new();
    for context in &selected {
        match context {
            Context::Document => includes_document = true,
            Context::Element(element) => {
                wanted.insert(*element as *const Element);
            }
        }
    }

    let mut ordered = Vec::with_capacity(wanted.len() + usize::from(includes_document));
    if includes_document {
        ordered.push(Context::Document);
    }
    if !wanted.is_empty() {
        ordered.extend(
            root.descendants()
                .filter(|element| wanted.contains(&(*element as *const Element)))
                .map(Context::Element),
        );
    }
    ordered
}

/// Byte offset of the end of the first step, skipping `/` inside predicates
fn step_end(text: &str) -> usize {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for (index, c) in text.char_indices() {
        match (quote, c) {
            (Some(open), c) if c == open => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, '/') if depth == 0 => return index,
            (None, _) => {}
        }
    }
    text.len()
}

fn parse_step(axis: Axis, text: &str) -> Result<Step, QueryError> {
    let (name, mut rest) = match text.find('[') {
        Some(index) => text.split_at(index),
        None => (text, ""),
    };

    let test = match name.trim() {
        "*" => NameTest::Any,
        "." => NameTest::SelfNode,
        name if is_name(name) && name.contains(':') => NameTest::Qualified(name.to_string()),
        name if is_name(name) => NameTest::Local(name.to_string()),
        _ => return Err(QueryError::InvalidStep(text.to_string())),
    };

    let mut predicates = Vec::new();
    while !rest.is_empty() {
        let Some(body) = rest.strip_prefix('[') else {
            return Err(QueryError::InvalidStep(text.to_string()));
        };
        let close = predicate_end(body).ok_or_else(|| QueryError::InvalidStep(text.to_string()))?;
        predicates.push(parse_predicate(&body[..close])?);
        rest = &body[close + 1..];
    }

    Ok(Step {
        axis,
        test,
        predicates,
    })
}

fn predicate_end(body: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (index, c) in body.char_indices() {
        match (quote, c) {
            (Some(open), c) if c == open => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, ']') => return Some(index),
            (None, _) => {}
        }
    }
    None
}

fn parse_predicate(text: &str) -> Result<Predicate, QueryError> {
    let trimmed = text.trim();

    if let Ok(position) = trimmed.parse::<usize>() {
        if position == 0 {
            return Err(QueryError::InvalidPredicate(text.to_string()));
        }
        return Ok(Predicate::Position(position));
    }

    let Some(attribute) = trimmed.strip_prefix('@') else {
        return Err(QueryError::InvalidPredicate(text.to_string()));
    };

    match attribute.split_once('=') {
        None if is_name(attribute.trim()) => {
            Ok(Predicate::HasAttribute(attribute.trim().to_string()))
        }
        None => Err(QueryError::InvalidPredicate(text.to_string())),
        Some((name, value)) => {
            let name = name.trim();
            let value = value.trim();
            let unquoted = value
                .strip_prefix('\'')
                .and_then(|v| v.strip_suffix('\''))
                .or_else(|| value.strip_prefix('"').and_then(|v| v.strip_suffix('"')));
            match unquoted {
                Some(value) if is_name(name) => {
                    Ok(Predicate::AttributeEquals(name.to_string(), value.to_string()))
                }
                _ => Err(QueryError::InvalidPredicate(text.to_string())),
            }
        }
    }
}

fn is_name(text: &str) -> bool {
    let mut chars = text.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_alphabetic() || first == '_')
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':'))
        && !text.ends_with(':')
        && text.matches(':').count() <= 1
}
