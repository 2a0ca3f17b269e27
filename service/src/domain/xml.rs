//! Navigable, namespace-stripped XML tree used by the importers and the
//! source adapters.
//!
//! Paths are a small XPath subset evaluated relative to the context they are
//! called on: `a/b` selects children, `a//b` and a leading `//` select
//! descendants, `*` matches any element. Results come in document order.

use std::ops::Range;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} (at byte {position})")]
pub struct XmlError {
    pub position: usize,
    pub message: String,
}

impl XmlError {
    fn new(position: usize, message: impl Into<String>) -> Self {
        Self {
            position,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct XmlDocument {
    source: String,
    nodes: Vec<XmlNode>,
    root: usize,
}

#[derive(Debug, Clone)]
struct XmlNode {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<XmlChild>,
    /// byte range of the element markup in the source
    span: Range<usize>,
    /// nodes are stored in document order, descendants of a node are `index + 1..subtree_end`
    subtree_end: usize,
}

#[derive(Debug, Clone)]
enum XmlChild {
    Element(usize),
    Text(String),
}

/// Borrowed handle of one element
#[derive(Debug, Clone, Copy)]
pub struct XmlElement<'d> {
    document: &'d XmlDocument,
    index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    Document,
    Node(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Child,
    Descendant,
}

impl XmlDocument {
    pub fn parse(source: &str) -> Result<Self, XmlError> {
        let mut reader = Reader::from_str(source);
        let mut buf = Vec::new();

        let mut nodes: Vec<XmlNode> = Vec::new();
        let mut stack: Vec<usize> = Vec::new();
        let mut root: Option<usize> = None;

        loop {
            let start = reader.buffer_position();
            let event = reader
                .read_event_into(&mut buf)
                .map_err(|e| XmlError::new(reader.buffer_position(), e.to_string()))?;
            let position = reader.buffer_position();

            match event {
                Event::Start(e) => {
                    let index = open_element(&e, start..position, &mut nodes, &stack, &mut root)?;
                    stack.push(index);
                }
                Event::Empty(e) => {
                    let index = open_element(&e, start..position, &mut nodes, &stack, &mut root)?;
                    close_element(&mut nodes, index, position);
                }
                Event::End(_) => {
                    let index = stack
                        .pop()
                        .ok_or_else(|| XmlError::new(position, "unexpected closing tag"))?;
                    close_element(&mut nodes, index, position);
                }
                Event::Text(e) => {
                    let text = e
                        .unescape()
                        .map_err(|err| XmlError::new(position, err.to_string()))?;
                    push_text(&mut nodes, &stack, text.into_owned(), position)?;
                }
                Event::CData(e) => {
                    let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                    push_text(&mut nodes, &stack, text, position)?;
                }
                Event::Eof => break,
                // declarations, comments, processing instructions, doctype
                _ => {}
            }
            buf.clear();
        }

        if let Some(&open) = stack.last() {
            return Err(XmlError::new(
                source.len(),
                format!("unclosed element '{}'", nodes[open].name),
            ));
        }

        let root = root.ok_or_else(|| XmlError::new(0, "no root element"))?;

        Ok(Self {
            source: source.to_owned(),
            nodes,
            root,
        })
    }

    /// Elements matching `path`, evaluated from the document node
    pub fn select(&self, path: &str) -> Vec<XmlElement<'_>> {
        self.select_from(Context::Document, path)
    }

    pub fn first(&self, path: &str) -> Option<XmlElement<'_>> {
        self.select(path).into_iter().next()
    }

    /// Trimmed text of the first element matching `path`, `None` when absent or blank
    pub fn value(&self, path: &str) -> Option<String> {
        self.first(path).and_then(|element| element.non_blank_text())
    }

    fn select_from(&self, start: Context, path: &str) -> Vec<XmlElement<'_>> {
        let mut current = vec![start];

        for (axis, name) in parse_steps(path) {
            let mut next = Vec::new();
            for context in current {
                let candidates: Vec<usize> = match axis {
                    Axis::Child => self.children_of(context),
                    Axis::Descendant => self.descendants_of(context).collect(),
                };
                next.extend(
                    candidates
                        .into_iter()
                        .filter(|&index| name == "*" || self.nodes[index].name == name),
                );
            }
            // node indexes follow document order
            next.sort_unstable();
            next.dedup();
            current = next.into_iter().map(Context::Node).collect();
        }

        current
            .into_iter()
            .filter_map(|context| match context {
                Context::Node(index) => Some(XmlElement {
                    document: self,
                    index,
                }),
                Context::Document => None,
            })
            .collect()
    }

    fn children_of(&self, context: Context) -> Vec<usize> {
        match context {
            Context::Document => vec![self.root],
            Context::Node(index) => self.nodes[index]
                .children
                .iter()
                .filter_map(|child| match child {
                    XmlChild::Element(child) => Some(*child),
                    XmlChild::Text(_) => None,
                })
                .collect(),
        }
    }

    fn descendants_of(&self, context: Context) -> Range<usize> {
        match context {
            Context::Document => 0..self.nodes.len(),
            Context::Node(index) => index + 1..self.nodes[index].subtree_end,
        }
    }
}

impl<'d> XmlElement<'d> {
    /// Local name, without namespace prefix
    pub fn name(&self) -> &'d str {
        &self.node().name
    }

    pub fn attr(&self, name: &str) -> Option<&'d str> {
        self.node()
            .attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Concatenated text of this element and all its descendants
    pub fn text(&self) -> String {
        let mut result = String::new();
        self.collect_text(&mut result);
        result
    }

    pub fn select(&self, path: &str) -> Vec<XmlElement<'d>> {
        self.document.select_from(Context::Node(self.index), path)
    }

    pub fn first(&self, path: &str) -> Option<XmlElement<'d>> {
        self.select(path).into_iter().next()
    }

    pub fn value(&self, path: &str) -> Option<String> {
        self.first(path).and_then(|element| element.non_blank_text())
    }

    /// Original markup of the element, as it appears in the parsed source
    pub fn raw(&self) -> &'d str {
        &self.document.source[self.node().span.clone()]
    }

    fn non_blank_text(&self) -> Option<String> {
        let text = self.text();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    fn collect_text(&self, result: &mut String) {
        for child in self.node().children.iter() {
            match child {
                XmlChild::Text(text) => result.push_str(text),
                XmlChild::Element(index) => XmlElement {
                    document: self.document,
                    index: *index,
                }
                .collect_text(result),
            }
        }
    }

    fn node(&self) -> &'d XmlNode {
        &self.document.nodes[self.index]
    }
}

fn parse_steps(path: &str) -> Vec<(Axis, &str)> {
    let (mut axis, rest) = match path.strip_prefix("//") {
        Some(rest) => (Axis::Descendant, rest),
        None => (Axis::Child, path.trim_start_matches('/')),
    };

    let mut steps = Vec::new();
    for segment in rest.split('/') {
        if segment.is_empty() {
            axis = Axis::Descendant;
            continue;
        }
        steps.push((axis, segment));
        axis = Axis::Child;
    }
    steps
}

/// `tag` is the byte range of the start tag in the source
fn open_element(
    e: &BytesStart<'_>,
    tag: Range<usize>,
    nodes: &mut Vec<XmlNode>,
    stack: &[usize],
    root: &mut Option<usize>,
) -> Result<usize, XmlError> {
    let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();

    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| XmlError::new(tag.start, err.to_string()))?;
        if attr.value.contains(&b'<') {
            return Err(XmlError::new(
                tag.start,
                format!("'<' in the value of attribute '{}'", String::from_utf8_lossy(attr.key.as_ref())),
            ));
        }
        let key = attr.key.as_ref();
        if key == b"xmlns" || key.starts_with(b"xmlns:") {
            continue;
        }
        let value = attr
            .unescape_value()
            .map_err(|err| XmlError::new(tag.start, err.to_string()))?;
        attributes.push((
            String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned(),
            value.into_owned(),
        ));
    }

    let index = nodes.len();
    match stack.last() {
        Some(&parent) => nodes[parent].children.push(XmlChild::Element(index)),
        None if root.is_some() => {
            return Err(XmlError::new(tag.start, "more than one root element"));
        }
        None => *root = Some(index),
    }

    nodes.push(XmlNode {
        name,
        attributes,
        children: Vec::new(),
        span: tag,
        subtree_end: index + 1,
    });

    Ok(index)
}

fn close_element(nodes: &mut [XmlNode], index: usize, end: usize) {
    let subtree_end = nodes.len();
    let node = &mut nodes[index];
    node.span.end = end;
    node.subtree_end = subtree_end;
}

fn push_text(
    nodes: &mut [XmlNode],
    stack: &[usize],
    text: String,
    position: usize,
) -> Result<(), XmlError> {
    match stack.last() {
        Some(&parent) => {
            nodes[parent].children.push(XmlChild::Text(text));
            Ok(())
        }
        None if text
            .trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}')
            .is_empty() =>
        {
            Ok(())
        }
        None => Err(XmlError::new(position, "text outside of the root element")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECORDS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<xml>
  <records>
    <record>
      <source-app name="EndNote" version="17.0">EndNote</source-app>
      <titles><title><style face="normal">Ocean </style><style face="italic">acidification</style></title></titles>
    </record>
    <record>
      <titles><title>Second &amp; last</title></titles>
      <empty/>
    </record>
  </records>
</xml>"#;

    #[test]
    fn selects_children_and_descendants_in_document_order() {
        let doc = XmlDocument::parse(RECORDS).unwrap();

        assert_eq!(doc.select("xml/records/record").len(), 2);
        assert_eq!(doc.select("//xml/records/record").len(), 2);
        assert_eq!(doc.select("records").len(), 0);

        let titles: Vec<String> = doc.select("//title").iter().map(|t| t.text()).collect();
        assert_eq!(titles, vec!["Ocean acidification", "Second & last"]);
    }

    #[test]
    fn attribute_and_value() {
        let doc = XmlDocument::parse(RECORDS).unwrap();
        let app = doc.first("//source-app").unwrap();

        assert_eq!(app.attr("version"), Some("17.0"));
        assert_eq!(app.attr("missing"), None);
        assert_eq!(doc.value("//record/empty"), None);
        assert_eq!(
            doc.first("//record").unwrap().value("titles/title").as_deref(),
            Some("Ocean acidification")
        );
    }

    #[test]
    fn raw_returns_original_markup() {
        let doc = XmlDocument::parse(RECORDS).unwrap();
        let records = doc.select("//record");

        let raw = records[1].raw();
        assert!(raw.starts_with("<record>"));
        assert!(raw.ends_with("</record>"));
        assert!(raw.contains("<empty/>"));
        assert_eq!(doc.select("//empty")[0].raw(), "<empty/>");
    }

    #[test]
    fn namespaces_are_stripped() {
        let doc = XmlDocument::parse(
            r#"<mods:mods xmlns:mods="http://www.loc.gov/mods/v3"><mods:name type="personal"><mods:namePart>Svensson</mods:namePart></mods:name></mods:mods>"#,
        )
        .unwrap();

        assert_eq!(doc.first("mods").unwrap().name(), "mods");
        let name = doc.first("mods/name").unwrap();
        assert_eq!(name.attr("type"), Some("personal"));
        assert_eq!(name.value("namePart").as_deref(), Some("Svensson"));
    }

    #[test]
    fn wildcard_step() {
        let doc = XmlDocument::parse("<a><b><c/></b><d><c/></d></a>").unwrap();
        assert_eq!(doc.select("a/*/c").len(), 2);
        assert_eq!(doc.select("a/*").len(), 2);
    }

    #[test]
    fn raw_starts_at_the_tag_even_after_a_quoted_gt() {
        let doc = XmlDocument::parse(r#"<xml><app name="a>b" version="17.0">EndNote</app></xml>"#).unwrap();
        let app = doc.first("xml/app").unwrap();
        assert_eq!(app.attr("name"), Some("a>b"));
        assert_eq!(app.raw(), r#"<app name="a>b" version="17.0">EndNote</app>"#);
    }

    #[test]
    fn lt_in_attribute_value_is_not_well_formed() {
        let err = XmlDocument::parse(r#"<xml><source-app name="a<b" version="17.0">EndNote</source-app></xml>"#)
            .unwrap_err();
        assert!(err.message.contains("name"));
        assert_eq!(err.position, 5);
        assert!(XmlDocument::parse(r#"<a title="x &lt; y"/>"#).is_ok());
    }

    #[test]
    fn malformed_documents_are_rejected() {
        assert!(XmlDocument::parse("<a><b></a>").is_err());
        assert!(XmlDocument::parse("<a><b>").is_err());
        assert!(XmlDocument::parse("<a/><b/>").is_err());
        assert!(XmlDocument::parse("just text").is_err());
        assert!(XmlDocument::parse("").is_err());
    }
}
