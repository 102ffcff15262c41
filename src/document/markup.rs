//! Parsing of serialized editor content into an attributed element tree.
//!
//! Editor content is HTML-ish rather than well-formed XML, so the reader is
//! configured leniently: end-tag names are not enforced by the tokenizer,
//! void elements such as `<br>` never take children, open elements are closed
//! implicitly at the end of input, and entities are decoded as HTML entities.

use std::sync::LazyLock;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex::{Captures, Regex};
use thiserror::Error;

/// Elements that never have content or a closing tag.
const VOID_ELEMENTS: &[&str] = &["area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "wbr"];

/// Elements whose text is followed by a line break in the plain-text rendering.
const BLOCK_ELEMENTS: &[&str] = &[
    "p", "div", "li", "ul", "ol", "h1", "h2", "h3", "h4", "h5", "h6", "blockquote", "pre", "tr",
];

/// Errors that make serialized content unparseable.
#[derive(Debug, Error)]
pub enum MarkupError {
    #[error("malformed markup: {0}")]
    Reader(#[from] quick_xml::Error),
    #[error("malformed attribute: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),
    #[error("closing tag </{0}> has no matching open element")]
    UnmatchedEndTag(String),
    #[error("markup is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}

/// A node in the parsed content tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An element with its (lower-cased) name, decoded attributes and children.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    /// Returns the value of the attribute with the given name, ignoring ASCII case.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Returns the plain-text rendering of this element and its descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        write_element_text(self, &mut out, &|_| false);
        out
    }
}

/// Returns the plain-text rendering of the given nodes.
pub fn text_content(nodes: &[Node]) -> String {
    let mut out = String::new();
    write_text_content(nodes, &mut out, &|_| false);
    out
}

/// Writes the plain-text rendering of `nodes` into `out`.
///
/// Elements for which `is_opaque` returns `true` are rendered as a single space
/// instead of their text, keeping the words around them apart.
pub fn write_text_content(nodes: &[Node], out: &mut String, is_opaque: &dyn Fn(&Element) -> bool) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Element(element) => write_element_text(element, out, is_opaque),
        }
    }
}

fn write_element_text(element: &Element, out: &mut String, is_opaque: &dyn Fn(&Element) -> bool) {
    if element.name == "br" {
        out.push('\n');
        return;
    }
    if is_opaque(element) {
        out.push(' ');
        return;
    }
    write_text_content(&element.children, out, is_opaque);
    if BLOCK_ELEMENTS.contains(&element.name.as_str()) && !out.ends_with('\n') {
        out.push('\n');
    }
}

/// Calls `visit` on every element in document order.
///
/// If `visit` returns `false`, the element's descendants are skipped.
pub fn walk_elements<'a>(nodes: &'a [Node], visit: &mut dyn FnMut(&'a Element) -> bool) {
    for node in nodes {
        if let Node::Element(element) = node {
            if visit(element) {
                walk_elements(&element.children, visit);
            }
        }
    }
}

/// Parses serialized content into a list of top-level nodes.
pub fn parse_markup(input: &str) -> Result<Vec<Node>, MarkupError> {
    let mut reader = Reader::from_str(input);
    reader.config_mut().check_end_names = false;

    let mut roots: Vec<Node> = Vec::new();
    let mut open: Vec<Element> = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                let element = element_from_start(&start)?;
                if VOID_ELEMENTS.contains(&element.name.as_str()) {
                    append_node(&mut open, &mut roots, Node::Element(element));
                } else {
                    open.push(element);
                }
            }
            Event::Empty(start) => {
                let element = element_from_start(&start)?;
                append_node(&mut open, &mut roots, Node::Element(element));
            }
            Event::End(end) => {
                let name = std::str::from_utf8(end.name().as_ref())?.to_ascii_lowercase();
                if VOID_ELEMENTS.contains(&name.as_str()) {
                    continue;
                }
                let Some(position) = open.iter().rposition(|e| e.name == name) else {
                    return Err(MarkupError::UnmatchedEndTag(name));
                };
                close_from(&mut open, &mut roots, position);
            }
            Event::Text(text) => {
                let raw = std::str::from_utf8(&text)?;
                if !raw.is_empty() {
                    let decoded = htmlize::unescape(raw).into_owned();
                    append_node(&mut open, &mut roots, Node::Text(decoded));
                }
            }
            Event::CData(cdata) => {
                let raw = std::str::from_utf8(&cdata)?.to_string();
                append_node(&mut open, &mut roots, Node::Text(raw));
            }
            Event::Eof => break,
            // Comments, declarations, processing instructions and doctypes carry no content.
            _ => {}
        }
    }
    close_from(&mut open, &mut roots, 0);
    Ok(roots)
}

fn element_from_start(start: &BytesStart<'_>) -> Result<Element, MarkupError> {
    let name = std::str::from_utf8(start.name().as_ref())?.to_ascii_lowercase();
    let mut attributes = Vec::new();
    for attribute in start.html_attributes() {
        let attribute = attribute?;
        let key = std::str::from_utf8(attribute.key.as_ref())?.to_ascii_lowercase();
        let raw_value = std::str::from_utf8(&attribute.value)?;
        attributes.push((key, htmlize::unescape(raw_value).into_owned()));
    }
    Ok(Element { name, attributes, children: Vec::new() })
}

/// Appends `node` to the innermost open element, or to the roots if none is open.
fn append_node(open: &mut [Element], roots: &mut Vec<Node>, node: Node) {
    match open.last_mut() {
        Some(parent) => parent.children.push(node),
        None => roots.push(node),
    }
}

/// Closes every open element from `position` upward, nesting each into its parent.
fn close_from(open: &mut Vec<Element>, roots: &mut Vec<Node>, position: usize) {
    let mut closed: Option<Element> = None;
    for mut element in open.drain(position..).rev() {
        if let Some(child) = closed.take() {
            element.children.push(Node::Element(child));
        }
        closed = Some(element);
    }
    if let Some(element) = closed {
        append_node(open, roots, Node::Element(element));
    }
}

static TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<\s*/?\s*([A-Za-z][A-Za-z0-9]*)?[^>]*(?:>|$)").expect("tag regex is valid")
});

/// Strips anything that looks like a tag and decodes entities, without parsing.
///
/// This is the fallback for content that [`parse_markup`] rejects. Block-level
/// tags and `<br>` become line breaks so that words in separate paragraphs
/// never run together.
pub fn strip_tags_naive(input: &str) -> String {
    let stripped = TAG_REGEX.replace_all(input, |caps: &Captures<'_>| {
        let name = caps.get(1).map_or(String::new(), |m| m.as_str().to_ascii_lowercase());
        if name == "br" || BLOCK_ELEMENTS.contains(&name.as_str()) {
            "\n"
        } else {
            ""
        }
    });
    htmlize::unescape(&*stripped).into_owned()
}


#[cfg(test)]
mod tests {
    use super::*;

    fn only_element(nodes: &[Node]) -> &Element {
        match nodes {
            [Node::Element(element)] => element,
            other => panic!("expected a single element, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_nested_elements_and_attributes() {
        let nodes = parse_markup(
            r#"<p>Hi <span data-mention="true" data-entity-id="1" style="color: #2563eb">John Doe</span> </p>"#,
        ).unwrap();
        let p = only_element(&nodes);
        assert_eq!(p.name, "p");
        assert_eq!(p.children.len(), 3);
        let Node::Element(span) = &p.children[1] else { panic!("expected span") };
        assert_eq!(span.attr("data-mention"), Some("true"));
        assert_eq!(span.attr("DATA-ENTITY-ID"), Some("1"));
        assert_eq!(span.text_content(), "John Doe");
        assert_eq!(p.text_content(), "Hi John Doe \n");
    }

    #[test]
    fn test_void_elements_and_html_entities() {
        let nodes = parse_markup("<p>one<br>two&nbsp;&amp;&#x40;three</p><p><br></p>").unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(text_content(&nodes), "one\ntwo\u{a0}&@three\n\n");
    }

    #[test]
    fn test_unquoted_and_valueless_attributes() {
        let nodes = parse_markup("<span mention=true entity-id=7 hidden>x</span>").unwrap();
        let span = only_element(&nodes);
        assert_eq!(span.attr("mention"), Some("true"));
        assert_eq!(span.attr("entity-id"), Some("7"));
        assert_eq!(span.attr("hidden"), Some(""));
    }

    #[test]
    fn test_unclosed_elements_close_at_end() {
        let nodes = parse_markup("<p>open <em>ended").unwrap();
        let p = only_element(&nodes);
        assert_eq!(p.text_content(), "open ended\n");
    }

    #[test]
    fn test_misnested_end_closes_inner_elements() {
        let nodes = parse_markup("<p><b>bold</p>after").unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(text_content(&nodes), "bold\nafter");
    }

    #[test]
    fn test_stray_end_tag_is_an_error() {
        assert!(matches!(
            parse_markup("<p>text</p></div>"),
            Err(MarkupError::UnmatchedEndTag(_) | MarkupError::Reader(_)),
        ));
    }

    #[test]
    fn test_truncated_tag_is_an_error() {
        assert!(parse_markup(r#"<p>Hi <span data-mention="true" data-entity-id="1""#).is_err());
    }

    #[test]
    fn test_opaque_elements_render_as_space() {
        let nodes = parse_markup(r#"x@<span data-mention="true">Jane</span>y"#).unwrap();
        let mut out = String::new();
        write_text_content(&nodes, &mut out, &|e| e.attr("data-mention") == Some("true"));
        assert_eq!(out, "x@ y");
    }

    #[test]
    fn test_walk_elements_can_skip_subtrees() {
        let nodes = parse_markup("<div><span><i>a</i></span><b>b</b></div>").unwrap();
        let mut seen = Vec::new();
        walk_elements(&nodes, &mut |e| {
            seen.push(e.name.clone());
            e.name != "span"
        });
        assert_eq!(seen, ["div", "span", "b"]);
    }

    #[test]
    fn test_strip_tags_naive() {
        assert_eq!(strip_tags_naive("<p>@Jo</p><p>hn &amp; co</p>"), "\n@Jo\n\nhn & co\n");
        assert_eq!(strip_tags_naive(r#"Hi <span data-mention="true" data-entity-id="1""#), "Hi ");
        assert_eq!(strip_tags_naive("no markup"), "no markup");
    }
}
