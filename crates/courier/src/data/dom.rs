/// An owned node of a parsed HTML fragment.
///
/// Produced by the `dom` response type. Only the first top-level node of the
/// document is kept, mirroring the first child of a detached container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomNode {
    Element {
        /// Lowercased tag name.
        tag: String,
        /// Attributes in source order. Valueless attributes carry `None`.
        attributes: Vec<(String, Option<String>)>,
        children: Vec<DomNode>,
    },
    Text(String),
    Comment(String),
}

impl DomNode {
    pub fn tag_name(&self) -> Option<&str> {
        match self {
            DomNode::Element { tag, .. } => Some(tag),
            _ => None,
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self, DomNode::Element { .. })
    }

    /// Attribute value by case-insensitive name. Valueless attributes yield `""`.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        let DomNode::Element { attributes, .. } = self else {
            return None;
        };
        attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_deref().unwrap_or(""))
    }

    pub fn children(&self) -> &[DomNode] {
        match self {
            DomNode::Element { children, .. } => children,
            _ => &[],
        }
    }

    /// Concatenated text of this node and its descendants. Comments inside
    /// an element do not contribute.
    pub fn text_content(&self) -> String {
        match self {
            DomNode::Text(text) | DomNode::Comment(text) => text.clone(),
            DomNode::Element { children, .. } => {
                let mut out = String::new();
                collect_text(children, &mut out);
                out
            }
        }
    }
}

fn collect_text(nodes: &[DomNode], out: &mut String) {
    for node in nodes {
        match node {
            DomNode::Text(text) => out.push_str(text),
            DomNode::Element { children, .. } => collect_text(children, out),
            DomNode::Comment(_) => {}
        }
    }
}
