use std::borrow::Cow;

use tl::{HTMLTag, Node, Parser};

use crate::data::DomNode;
use crate::error::{FetchError, Result};

/// Parse markup as a fragment and return its first top-level node.
///
/// Whitespace before the first tag is a text node in its own right, exactly
/// as it would be for a container's first child.
///
/// # Examples
///
/// ```
/// use courier::core::parse_fragment;
///
/// let node = parse_fragment("<p class=\"x\">hi</p><p>ignored</p>").unwrap().unwrap();
/// assert_eq!(node.tag_name(), Some("p"));
/// assert_eq!(node.attribute("class"), Some("x"));
/// assert_eq!(node.text_content(), "hi");
/// ```
pub fn parse_fragment(html: &str) -> Result<Option<DomNode>> {
    let dom = tl::parse(html, tl::ParserOptions::default())
        .map_err(|e| FetchError::Body(format!("failed to parse HTML: {e}").into()))?;
    let parser = dom.parser();

    Ok(dom
        .children()
        .first()
        .and_then(|handle| handle.get(parser))
        .map(|node| to_owned_node(node, parser)))
}

fn to_owned_node(node: &Node<'_>, parser: &Parser<'_>) -> DomNode {
    match node {
        Node::Tag(tag) => DomNode::Element {
            tag: tag.name().as_utf8_str().to_ascii_lowercase(),
            attributes: collect_attributes(tag),
            children: tag
                .children()
                .top()
                .iter()
                .filter_map(|handle| handle.get(parser))
                .map(|child| to_owned_node(child, parser))
                .collect(),
        },
        Node::Raw(raw) => DomNode::Text(decode_entities(&raw.as_utf8_str()).into_owned()),
        Node::Comment(comment) => DomNode::Comment(comment.as_utf8_str().into_owned()),
    }
}

// tl keeps `id` and `class` apart from the other attributes.
fn collect_attributes(tag: &HTMLTag<'_>) -> Vec<(String, Option<String>)> {
    let attributes = tag.attributes();
    let mut collected: Vec<(String, Option<String>)> = attributes
        .iter()
        .map(|(name, value)| {
            let value = value.map(|value| decode_entities(&value).into_owned());
            (name.into_owned(), value)
        })
        .collect();

    for key in ["id", "class"] {
        if !collected.iter().any(|(name, _)| name.eq_ignore_ascii_case(key))
            && let Some(value) = attributes.get(key).flatten()
        {
            let value = decode_entities(&value.as_utf8_str()).into_owned();
            collected.push((key.to_string(), Some(value)));
        }
    }
    collected
}

/// Replace character references with the characters they stand for.
///
/// Covers the markup-significant named entities, `&nbsp;` and numeric
/// references. Anything unrecognised is left as written.
fn decode_entities(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }

    let mut decoded = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find('&') {
        decoded.push_str(&rest[..start]);
        let tail = &rest[start..];
        let reference = tail
            .find(';')
            .filter(|&end| end <= MAX_REFERENCE_LEN)
            .and_then(|end| resolve_reference(&tail[1..end]).map(|ch| (ch, end)));
        match reference {
            Some((ch, end)) => {
                decoded.push(ch);
                rest = &tail[end + 1..];
            }
            None => {
                decoded.push('&');
                rest = &tail[1..];
            }
        }
    }
    decoded.push_str(rest);
    Cow::Owned(decoded)
}

const MAX_REFERENCE_LEN: usize = 12;

fn resolve_reference(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let number = name.strip_prefix('#')?;
            let code = match number.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => number.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_node_only() {
        let node = parse_fragment("<div id=\"a\"><span>one</span></div><div id=\"b\"></div>")
            .unwrap()
            .unwrap();

        assert_eq!(node.tag_name(), Some("div"));
        assert_eq!(node.attribute("id"), Some("a"));
        assert_eq!(node.children().len(), 1);
        assert_eq!(node.children()[0].tag_name(), Some("span"));
        assert_eq!(node.text_content(), "one");
    }

    #[test]
    fn test_text_first() {
        let node = parse_fragment("plain text").unwrap().unwrap();
        assert_eq!(node, DomNode::Text("plain text".to_string()));
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(parse_fragment("").unwrap(), None);
    }

    #[test]
    fn test_entities_are_decoded() {
        let node = parse_fragment(r#"<p title="say &quot;hi&quot;">a &amp; b &#60;&#x3E; &copy;</p>"#)
            .unwrap()
            .unwrap();

        assert_eq!(node.text_content(), "a & b <> &copy;");
        assert_eq!(node.attribute("title"), Some(r#"say "hi""#));
    }

    #[test]
    fn test_stray_ampersand_is_kept() {
        assert_eq!(decode_entities("fish & chips; peas"), "fish & chips; peas");
        assert_eq!(decode_entities("&#xZZ; &nbsp;"), "&#xZZ; \u{a0}");
        assert_eq!(decode_entities("plain"), "plain");
    }

    #[test]
    fn test_tag_names_are_lowercased() {
        let node = parse_fragment("<SECTION>x</SECTION>").unwrap().unwrap();
        assert_eq!(node.tag_name(), Some("section"));
    }
}
