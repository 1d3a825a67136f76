//! Minimal element tree over quick-xml. CAML carries everything in
//! attributes and nested elements, so text nodes are dropped.

use std::borrow::Cow;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::error::{Result, StrataError};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn attr(mut self, key: &str, value: impl ToString) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: &str, value: impl ToString) {
        let value = value.to_string();
        match self.attrs.iter_mut().find(|(k, _)| k == key) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((key.to_string(), value)),
        }
    }

    pub fn child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(child);
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn first(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }
}

/// A parsed document: the root element plus each comment found before the
/// first layer element.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub header_comments: Vec<String>,
    pub root: Element,
}

/// CAML layer class names all follow `CA*Layer`.
pub fn is_layer_element(name: &str) -> bool {
    name.starts_with("CA") && name.ends_with("Layer")
}

pub fn read_document(text: &str) -> Result<Document> {
    let mut reader = Reader::from_str(text);
    reader.trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;
    let mut comments: Vec<String> = Vec::new();
    let mut seen_layer = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let element = element_from(&e)?;
                seen_layer |= is_layer_element(&element.name);
                stack.push(element);
            }
            Event::Empty(e) => {
                let element = element_from(&e)?;
                seen_layer |= is_layer_element(&element.name);
                attach(&mut stack, &mut root, element);
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| StrataError::codec("document", "unbalanced end tag"))?;
                attach(&mut stack, &mut root, element);
            }
            Event::Comment(c) if !seen_layer => {
                comments.push(String::from_utf8_lossy(&c).into_owned());
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(StrataError::codec(open.name.clone(), "element not closed"));
    }
    let root = root.ok_or_else(|| StrataError::codec("document", "no root element"))?;
    Ok(Document {
        header_comments: comments,
        root,
    })
}

fn element_from(start: &BytesStart) -> Result<Element> {
    let mut element = Element::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
    for attr in start.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value: Cow<str> = attr.unescape_value()?;
        element.attrs.push((key, value.into_owned()));
    }
    Ok(element)
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}

/// Write `doc` with an XML declaration, the header comment directly after
/// it, then the element tree indented by two spaces.
pub fn write_document(doc: &Document) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    for comment in &doc.header_comments {
        let text = comment_text(comment);
        writer.write_event(Event::Comment(BytesText::from_escaped(text.as_ref())))?;
    }
    write_element(&mut writer, &doc.root)?;
    String::from_utf8(writer.into_inner())
        .map_err(|e| StrataError::codec("document", format!("non UTF-8 output: {e}")))
}

/// Comment bodies may not contain `--` or end in `-`; break such runs with
/// a space so the output stays well-formed.
fn comment_text(raw: &str) -> Cow<'_, str> {
    if !raw.contains("--") && !raw.ends_with('-') {
        return Cow::Borrowed(raw);
    }
    log::warn!(target: "codec", "header comment contains \"--\"; writing it with spaces inserted");
    let mut out = String::with_capacity(raw.len() + 4);
    for c in raw.chars() {
        if c == '-' && out.ends_with('-') {
            out.push(' ');
        }
        out.push(c);
    }
    if out.ends_with('-') {
        out.push(' ');
    }
    Cow::Owned(out)
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attrs {
        start.push_attribute((key.as_str(), value.as_str()));
    }
    if element.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }
    writer.write_event(Event::Start(start))?;
    for child in &element.children {
        write_element(writer, child)?;
    }
    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_nested_elements_and_attributes() {
        let doc = read_document(
            r#"<?xml version="1.0"?><caml><CALayer name="a &amp; b"><sublayers><CALayer id="x"/></sublayers></CALayer></caml>"#,
        )
        .unwrap();
        let layer = doc.root.first("CALayer").unwrap();
        assert_eq!(layer.get("name"), Some("a & b"));
        assert_eq!(layer.first("sublayers").unwrap().children[0].get("id"), Some("x"));
        assert!(doc.header_comments.is_empty());
    }

    #[test]
    fn comment_before_first_layer_is_header() {
        let doc = read_document(
            "<?xml version=\"1.0\"?>\n<!-- made by hand -->\n<caml><CALayer><!-- inner --></CALayer></caml>",
        )
        .unwrap();
        assert_eq!(doc.header_comments, vec![" made by hand ".to_string()]);
    }

    #[test]
    fn write_then_read_preserves_tree() {
        let root = Element::new("caml").child(
            Element::new("CALayer")
                .attr("name", "<quoted> \"name\"")
                .child(Element::new("sublayers")),
        );
        let doc = Document {
            header_comments: vec![" keep me ".to_string()],
            root,
        };
        let text = write_document(&doc).unwrap();
        assert!(text.starts_with("<?xml"));
        let back = read_document(&text).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn separate_header_comments_stay_separate() {
        let doc = read_document("<!-- one -->\n<!--two-->\n<caml><CALayer/></caml>").unwrap();
        assert_eq!(doc.header_comments, vec![" one ".to_string(), "two".to_string()]);
        let back = read_document(&write_document(&doc).unwrap()).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn double_hyphen_in_header_is_broken_up() {
        let doc = Document {
            header_comments: vec![" a -- b -".to_string()],
            root: Element::new("caml"),
        };
        let text = write_document(&doc).unwrap();
        assert!(text.contains("<!-- a - - b - -->"));
        let back = read_document(&text).unwrap();
        assert_eq!(back.header_comments, vec![" a - - b - ".to_string()]);
    }

    #[test]
    fn unclosed_element_is_an_error() {
        assert!(read_document("<caml><CALayer>").is_err());
    }

    #[test]
    fn set_replaces_existing_attribute() {
        let mut element = Element::new("x").attr("a", 1);
        element.set("a", 2);
        assert_eq!(element.attrs, vec![("a".to_string(), "2".to_string())]);
    }
}
