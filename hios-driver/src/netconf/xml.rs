//! Minimal element tree for NETCONF replies.
//!
//! Namespaces are dropped: elements are named by their local name, which is
//! all the subtree queries need.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::NetconfError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    pub text: String,
    pub children: Vec<XmlElement>,
}

fn element(start: &BytesStart<'_>) -> XmlElement {
    XmlElement {
        name: String::from_utf8_lossy(start.local_name().as_ref()).to_string(),
        ..Default::default()
    }
}

impl XmlElement {
    /// Parse a document and return its root element.
    pub fn parse(xml: &str) -> Result<Self, NetconfError> {
        let mut reader = Reader::from_str(xml.trim_start_matches('\u{feff}'));
        reader.config_mut().trim_text(true);

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root = None;

        loop {
            let closed = match reader.read_event() {
                Ok(Event::Start(e)) => {
                    stack.push(element(&e));
                    None
                }
                Ok(Event::Empty(e)) => Some(element(&e)),
                Ok(Event::Text(e)) => {
                    if let Some(top) = stack.last_mut() {
                        top.text.push_str(&String::from_utf8_lossy(&e));
                    }
                    None
                }
                Ok(Event::CData(e)) => {
                    if let Some(top) = stack.last_mut() {
                        top.text.push_str(&String::from_utf8_lossy(&e));
                    }
                    None
                }
                Ok(Event::End(_)) => stack.pop(),
                Ok(Event::Eof) => break,
                Ok(_) => None,
                Err(e) => return Err(NetconfError::Malformed(e.to_string())),
            };

            if let Some(done) = closed {
                match stack.last_mut() {
                    Some(parent) => parent.children.push(done),
                    None if root.is_none() => root = Some(done),
                    None => {}
                }
            }
        }

        if !stack.is_empty() {
            return Err(NetconfError::Malformed("unclosed element".to_string()));
        }
        root.ok_or_else(|| NetconfError::Malformed("empty document".to_string()))
    }

    /// First direct child named `name`.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// First element named `name` anywhere below this one, depth first.
    pub fn descendant(&self, name: &str) -> Option<&XmlElement> {
        self.children
            .iter()
            .find_map(|c| if c.name == name { Some(c) } else { c.descendant(name) })
    }

    /// Every element named `name` below this one, in document order.
    pub fn descendants<'a>(&'a self, name: &str) -> Vec<&'a XmlElement> {
        let mut found = Vec::new();
        self.collect(name, &mut found);
        found
    }

    fn collect<'a>(&'a self, name: &str, found: &mut Vec<&'a XmlElement>) {
        for child in &self.children {
            if child.name == name {
                found.push(child);
            }
            child.collect(name, found);
        }
    }

    /// Resolve `a/b/c` through direct children, or `.//name` anywhere below.
    pub fn find(&self, path: &str) -> Option<&XmlElement> {
        if let Some(name) = path.strip_prefix(".//") {
            return self.descendant(name);
        }
        path.split('/')
            .filter(|step| !step.is_empty() && *step != ".")
            .try_fold(self, |node, step| node.child(step))
    }
}

/// Text at `path`, or `default` when the path does not exist.
pub fn text_value(element: &XmlElement, path: &str, default: &str) -> String {
    element
        .find(path)
        .map(|e| e.text.trim().to_string())
        .unwrap_or_else(|| default.to_string())
}
