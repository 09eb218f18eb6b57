//! Markup node tree
//!
//! A forgiving parser for the normalized markup: unknown tags are kept as
//! elements, stray closing tags are dropped, unclosed elements are closed at
//! end of input. The only hard failure is a tag that never terminates.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::debug;

use crate::error::{MarkupError, MarkupResult};

/// Elements that never have children
const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "input", "bullet", "order", "attachment"];

static ENTITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|[a-zA-Z]+);").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Text(String),
    Element(Element),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    /// Lower-cased tag name
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Attribute value; boolean attributes have an empty value.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }
}

enum Token<'a> {
    Text(&'a str),
    Open {
        name: String,
        attrs: Vec<(String, String)>,
        self_closing: bool,
    },
    Close(String),
}

/// Parse normalized markup into a node tree.
pub fn parse(input: &str) -> MarkupResult<Vec<Node>> {
    let mut root: Vec<Node> = Vec::new();
    let mut stack: Vec<Element> = Vec::new();

    for token in tokenize(input)? {
        match token {
            Token::Text(text) => {
                if !text.is_empty() {
                    attach(&mut stack, &mut root, Node::Text(decode_entities(text)));
                }
            }
            Token::Open {
                name,
                attrs,
                self_closing,
            } => {
                let element = Element {
                    name,
                    attrs,
                    children: Vec::new(),
                };
                if self_closing || VOID_ELEMENTS.contains(&element.name.as_str()) {
                    attach(&mut stack, &mut root, Node::Element(element));
                } else {
                    stack.push(element);
                }
            }
            Token::Close(name) => match stack.iter().rposition(|open| open.name == name) {
                Some(idx) => close_down_to(&mut stack, &mut root, idx),
                None => debug!("Dropping stray closing tag </{}>", name),
            },
        }
    }

    close_down_to(&mut stack, &mut root, 0);
    Ok(root)
}

fn attach(stack: &mut [Element], root: &mut Vec<Node>, node: Node) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => root.push(node),
    }
}

/// Pop every element above and including `idx`, nesting each into its parent.
fn close_down_to(stack: &mut Vec<Element>, root: &mut Vec<Node>, idx: usize) {
    while stack.len() > idx {
        if let Some(element) = stack.pop() {
            attach(stack, root, Node::Element(element));
        }
    }
}

fn tokenize(input: &str) -> MarkupResult<Vec<Token<'_>>> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut text_start = 0;
    let mut pos = 0;

    while pos < bytes.len() {
        if bytes[pos] == b'<' && starts_tag(bytes, pos) {
            let end = find_tag_end(bytes, pos)?;
            if text_start < pos {
                tokens.push(Token::Text(&input[text_start..pos]));
            }
            tokens.push(parse_tag(&input[pos + 1..end]));
            pos = end + 1;
            text_start = pos;
        } else {
            pos += 1;
        }
    }

    if text_start < bytes.len() {
        tokens.push(Token::Text(&input[text_start..]));
    }
    Ok(tokens)
}

/// `<x` or `</x` with an ASCII letter; anything else is literal text.
fn starts_tag(bytes: &[u8], pos: usize) -> bool {
    match bytes.get(pos + 1) {
        Some(b'/') => bytes.get(pos + 2).is_some_and(u8::is_ascii_alphabetic),
        Some(b) => b.is_ascii_alphabetic(),
        None => false,
    }
}

fn find_tag_end(bytes: &[u8], start: usize) -> MarkupResult<usize> {
    let mut quote: Option<u8> = None;
    for (offset, &b) in bytes[start + 1..].iter().enumerate() {
        match (quote, b) {
            (Some(q), b) if b == q => quote = None,
            (Some(_), _) => {}
            (None, b'"') | (None, b'\'') => quote = Some(b),
            (None, b'>') => return Ok(start + 1 + offset),
            _ => {}
        }
    }
    Err(MarkupError::UnterminatedTag { offset: start })
}

fn parse_tag(raw: &str) -> Token<'_> {
    if let Some(rest) = raw.strip_prefix('/') {
        return Token::Close(rest.trim().to_ascii_lowercase());
    }

    let name_end = raw
        .find(|c: char| c.is_whitespace() || c == '/')
        .unwrap_or(raw.len());
    let name = raw[..name_end].to_ascii_lowercase();
    let rest = &raw[name_end..];
    let self_closing = rest.trim_end().ends_with('/');

    Token::Open {
        name,
        attrs: parse_attrs(rest),
        self_closing,
    }
}

fn parse_attrs(raw: &str) -> Vec<(String, String)> {
    let mut attrs = Vec::new();
    let mut chars = raw.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        if c.is_whitespace() || c == '/' {
            chars.next();
            continue;
        }

        let mut key_end = start;
        while let Some(&(idx, c)) = chars.peek() {
            if c.is_whitespace() || c == '=' || c == '/' {
                break;
            }
            key_end = idx + c.len_utf8();
            chars.next();
        }
        let key = raw[start..key_end].to_ascii_lowercase();

        while chars.peek().is_some_and(|&(_, c)| c.is_whitespace()) {
            chars.next();
        }

        let mut value = String::new();
        if chars.peek().is_some_and(|&(_, c)| c == '=') {
            chars.next();
            while chars.peek().is_some_and(|&(_, c)| c.is_whitespace()) {
                chars.next();
            }
            match chars.peek().map(|&(_, c)| c) {
                Some(q @ ('"' | '\'')) => {
                    chars.next();
                    for (_, c) in chars.by_ref() {
                        if c == q {
                            break;
                        }
                        value.push(c);
                    }
                }
                _ => {
                    while let Some(&(_, c)) = chars.peek() {
                        if c.is_whitespace() || c == '/' {
                            break;
                        }
                        value.push(c);
                        chars.next();
                    }
                }
            }
        }

        if !key.is_empty() {
            attrs.push((key, decode_entities(&value)));
        }
    }

    attrs
}

/// Decode the HTML entities the service emits; unknown names stay verbatim.
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    ENTITY_RE
        .replace_all(text, |caps: &Captures<'_>| {
            let entity = &caps[1];
            let decoded = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                _ => {
                    let code = if let Some(hex) = entity
                        .strip_prefix("#x")
                        .or_else(|| entity.strip_prefix("#X"))
                    {
                        u32::from_str_radix(hex, 16).ok()
                    } else {
                        entity.strip_prefix('#').and_then(|dec| dec.parse::<u32>().ok())
                    };
                    code.and_then(char::from_u32)
                }
            };
            match decoded {
                Some(c) => c.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(node: &Node) -> &Element {
        match node {
            Node::Element(el) => el,
            Node::Text(t) => panic!("expected element, got text {:?}", t),
        }
    }

    #[test]
    fn test_nested_elements() {
        let nodes = parse("<p>a<b>bold</b></p>").unwrap();
        assert_eq!(nodes.len(), 1);
        let p = element(&nodes[0]);
        assert!(p.is("p"));
        assert_eq!(p.children.len(), 2);
        assert_eq!(p.children[0], Node::Text("a".to_string()));
        assert!(element(&p.children[1]).is("b"));
    }

    #[test]
    fn test_boolean_and_quoted_attributes() {
        let nodes = parse("<input type=\"checkbox\" checked/>Done").unwrap();
        let input = element(&nodes[0]);
        assert_eq!(input.attr("type"), Some("checkbox"));
        assert_eq!(input.attr("checked"), Some(""));
        assert!(input.children.is_empty());
        assert_eq!(nodes[1], Node::Text("Done".to_string()));
    }

    #[test]
    fn test_void_element_without_slash() {
        let nodes = parse("<br>x").unwrap();
        assert!(element(&nodes[0]).is("br"));
        assert_eq!(nodes[1], Node::Text("x".to_string()));
    }

    #[test]
    fn test_stray_close_is_dropped_and_unclosed_is_closed() {
        let nodes = parse("a</i><b>x").unwrap();
        assert_eq!(nodes.len(), 2);
        let b = element(&nodes[1]);
        assert_eq!(b.children, vec![Node::Text("x".to_string())]);
    }

    #[test]
    fn test_lone_angle_bracket_is_text() {
        let nodes = parse("1 < 2 and 3 <> 4").unwrap();
        assert_eq!(nodes, vec![Node::Text("1 < 2 and 3 <> 4".to_string())]);
    }

    #[test]
    fn test_unterminated_tag_is_an_error() {
        assert_eq!(
            parse("ok <text indent=\"1\""),
            Err(MarkupError::UnterminatedTag { offset: 3 })
        );
    }

    #[test]
    fn test_quoted_gt_does_not_end_tag() {
        let nodes = parse("<a href=\"x>y\">t</a>").unwrap();
        assert_eq!(element(&nodes[0]).attr("href"), Some("x>y"));
    }

    #[test]
    fn test_entities() {
        assert_eq!(decode_entities("a &amp; b &lt;c&gt; &#26377; &#x41; &bogus;"), "a & b <c> 有 A &bogus;");
    }
}
