// In-memory document model mirroring the parts of the DOM the player touches
use std::collections::BTreeMap;
use std::fmt::Write;

use super::PlayerError;

/// Elements rendered without a closing tag
const VOID_ELEMENTS: &[&str] = &["img", "meta", "source", "link", "br", "input"];

/// Element lookup and media control, the surface the track player needs
pub trait Document {
    fn element(&self, id: &str) -> Option<&Element>;

    fn element_mut(&mut self, id: &str) -> Option<&mut Element>;

    /// Select the media resource of the media element `id`, like
    /// `HTMLMediaElement.load()`. A missing resource is not an error.
    fn load(&mut self, id: &str) -> Result<(), PlayerError>;

    /// Request playback of whatever `load` selected
    fn play(&mut self, id: &str) -> Result<(), PlayerError>;
}

/// Playback state of a media element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaState {
    pub current_src: Option<String>,
    pub current_type: Option<String>,
    pub playing: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag: String,
    attributes: BTreeMap<String, String>,
    text: String,
    children: Vec<NodeId>,
    media: MediaState,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attributes: BTreeMap::new(),
            text: String::new(),
            children: Vec::new(),
            media: MediaState::default(),
        }
    }

    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|v| v.as_str())
    }

    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) {
        self.attributes.insert(name.to_string(), value.into());
    }

    pub fn inner_text(&self) -> &str {
        &self.text
    }

    pub fn set_inner_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn media(&self) -> &MediaState {
        &self.media
    }
}

/// Handle to an element of the `Page` that created it. Ids are only
/// meaningful for that page; another page may not hold the node at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeId(usize);

/// An HTML page held as an element tree.
///
/// The server renders its dashboard from a `Page`, and the same page can be
/// driven by the track player in tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    nodes: Vec<Element>,
    head: NodeId,
    body: NodeId,
}

impl Page {
    pub fn new(title: &str) -> Self {
        let mut page = Self {
            nodes: vec![Element::new("html").with_attr("lang", "en")],
            head: NodeId(0),
            body: NodeId(0),
        };
        let root = NodeId(0);
        page.head = page.append(root, Element::new("head"));
        page.body = page.append(root, Element::new("body"));
        page.append(page.head, Element::new("meta").with_attr("charset", "utf-8"));
        page.append(page.head, Element::new("title").with_text(title));
        page
    }

    pub fn head(&self) -> NodeId {
        self.head
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    /// Append `element` as the last child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics if `parent` was not created by this page.
    pub fn append(&mut self, parent: NodeId, element: Element) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(element);
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Element behind `id`, or `None` for an id this page did not create
    pub fn node(&self, id: NodeId) -> Option<&Element> {
        self.nodes.get(id.0)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.nodes.iter().position(|e| e.attribute("id") == Some(id))
    }

    /// Serialise the page as an HTML document
    pub fn to_html(&self) -> String {
        let mut out = String::from("<!DOCTYPE html>\n");
        self.render(NodeId(0), &mut out);
        out.push('\n');
        out
    }

    fn render(&self, id: NodeId, out: &mut String) {
        let Some(element) = self.node(id) else {
            return;
        };
        out.push('<');
        out.push_str(&element.tag);
        for (name, value) in &element.attributes {
            let _ = write!(out, " {}=\"{}\"", name, escape_attribute(value));
        }
        out.push('>');

        if VOID_ELEMENTS.contains(&element.tag.as_str()) {
            return;
        }

        out.push_str(&escape_text(&element.text));
        for child in &element.children {
            self.render(*child, out);
        }
        let _ = write!(out, "</{}>", element.tag);
    }
}

impl Document for Page {
    fn element(&self, id: &str) -> Option<&Element> {
        self.position(id).map(|index| &self.nodes[index])
    }

    fn element_mut(&mut self, id: &str) -> Option<&mut Element> {
        let index = self.position(id)?;
        Some(&mut self.nodes[index])
    }

    fn load(&mut self, id: &str) -> Result<(), PlayerError> {
        let index = self
            .position(id)
            .ok_or_else(|| PlayerError::MissingElement(id.to_string()))?;

        // The element's own src wins over nested <source> children
        let element = &self.nodes[index];
        let selected = if element.attribute("src").is_some() {
            Some(element)
        } else {
            element
                .children
                .iter()
                .map(|child| &self.nodes[child.0])
                .find(|child| child.tag == "source" && child.attribute("src").is_some())
        };

        let media = MediaState {
            current_src: selected.and_then(|e| e.attribute("src")).map(str::to_string),
            current_type: selected.and_then(|e| e.attribute("type")).map(str::to_string),
            playing: false,
        };
        self.nodes[index].media = media;
        Ok(())
    }

    fn play(&mut self, id: &str) -> Result<(), PlayerError> {
        let element = self
            .element_mut(id)
            .ok_or_else(|| PlayerError::MissingElement(id.to_string()))?;
        // Nothing to play is silently ignored, as a browser rejects the
        // play() promise without anyone observing it
        element.media.playing = element.media.current_src.is_some();
        Ok(())
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attribute(value: &str) -> String {
    escape_text(value)
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn media_page() -> Page {
        let mut page = Page::new("test");
        let body = page.body();
        let audio = page.append(body, Element::new("audio").with_attr("id", "audio"));
        page.append(
            audio,
            Element::new("source")
                .with_attr("id", "audio-source")
                .with_attr("src", "/stream/1")
                .with_attr("type", "audio/ogg"),
        );
        page
    }

    #[test]
    fn renders_escaped_html() {
        let mut page = Page::new("Tom & Jerry");
        let body = page.body();
        page.append(
            body,
            Element::new("p")
                .with_attr("data-x", "a\"b'c")
                .with_text("<b>bold</b>"),
        );
        page.append(body, Element::new("img").with_attr("src", "/pic/1"));

        let html = page.to_html();
        assert!(html.starts_with("<!DOCTYPE html>\n<html lang=\"en\"><head><meta charset=\"utf-8\"><title>Tom &amp; Jerry</title></head>"));
        assert!(html.contains("<p data-x=\"a&quot;b&#39;c\">&lt;b&gt;bold&lt;/b&gt;</p>"));
        assert!(html.contains("<img src=\"/pic/1\"></body></html>"));
    }

    #[test]
    fn node_ids_belong_to_their_page() {
        let mut big = media_page();
        let body = big.body();
        let extra = big.append(body, Element::new("p"));

        let small = Page::new("small");
        assert_eq!(big.node(extra).map(|e| e.tag()), Some("p"));
        assert!(small.node(extra).is_none());
    }

    #[test]
    fn lookup_by_id() {
        let mut page = media_page();
        assert_eq!(page.element("audio").map(|e| e.tag()), Some("audio"));
        assert!(page.element("missing").is_none());

        page.element_mut("audio-source").unwrap().set_attribute("src", "/stream/2");
        assert_eq!(page.element("audio-source").unwrap().attribute("src"), Some("/stream/2"));
    }

    #[test]
    fn load_selects_nested_source_when_element_has_no_src() {
        let mut page = media_page();
        page.load("audio").unwrap();
        page.play("audio").unwrap();

        let media = page.element("audio").unwrap().media();
        assert_eq!(media.current_src.as_deref(), Some("/stream/1"));
        assert_eq!(media.current_type.as_deref(), Some("audio/ogg"));
        assert!(media.playing);
    }

    #[test]
    fn own_src_wins_over_nested_source() {
        let mut page = media_page();
        let audio = page.element_mut("audio").unwrap();
        audio.set_attribute("src", "/stream/9");
        audio.set_attribute("type", "audio/mpeg");
        page.load("audio").unwrap();

        let media = page.element("audio").unwrap().media();
        assert_eq!(media.current_src.as_deref(), Some("/stream/9"));
        assert_eq!(media.current_type.as_deref(), Some("audio/mpeg"));
        assert!(!media.playing);
    }

    #[test]
    fn play_without_resource_is_silent() {
        let mut page = Page::new("test");
        let body = page.body();
        page.append(body, Element::new("audio").with_attr("id", "audio"));

        page.load("audio").unwrap();
        page.play("audio").unwrap();
        assert_eq!(page.element("audio").unwrap().media(), &MediaState::default());
    }

    #[test]
    fn media_calls_on_missing_element_fail() {
        let mut page = Page::new("test");
        assert_eq!(
            page.load("audio"),
            Err(PlayerError::MissingElement("audio".to_string()))
        );
        assert!(page.play("audio").is_err());
    }
}
