//! Tree-to-markdown renderer

use once_cell::sync::Lazy;
use regex::Regex;

use crate::node::Node;
use crate::rules::{find_rule, RuleContext};
use crate::transform::LinkMap;

static BLANK_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());
static TRAILING_SPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)[ \t]+$").unwrap());

/// Renders a parsed node tree with the rule table
pub struct Renderer<'a> {
    links: &'a LinkMap,
}

impl<'a> Renderer<'a> {
    pub fn new(links: &'a LinkMap) -> Self {
        Self { links }
    }

    /// Render a whole document body, tidied and newline-terminated.
    pub fn render(&self, nodes: &[Node]) -> String {
        tidy(&self.render_nodes(nodes))
    }

    /// Render a run of sibling nodes without tidying.
    pub fn render_nodes(&self, nodes: &[Node]) -> String {
        let mut out = String::new();
        let mut idx = 0;

        while idx < nodes.len() {
            match &nodes[idx] {
                Node::Text(text) => out.push_str(text),
                Node::Element(element) => match find_rule(element) {
                    Some(rule) => {
                        let cx = RuleContext {
                            renderer: self,
                            element,
                            following: &nodes[idx + 1..],
                        };
                        let rendered = (rule.render)(&cx);
                        if rendered.block {
                            ensure_line_start(&mut out);
                            out.push_str(&rendered.text);
                            out.push('\n');
                        } else {
                            out.push_str(&rendered.text);
                        }
                        idx += rendered.consumed;
                    }
                    None => out.push_str(&self.render_nodes(&element.children)),
                },
            }
            idx += 1;
        }

        out
    }

    /// Local reference resolved for an attachment, if any
    pub fn link_for(&self, file_id: &str) -> Option<&str> {
        self.links.get(file_id).map(String::as_str)
    }
}

fn ensure_line_start(out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

fn tidy(text: &str) -> String {
    let text = TRAILING_SPACE_RE.replace_all(text, "");
    let text = BLANK_RUN_RE.replace_all(&text, "\n\n");
    let text = text.trim_matches('\n');
    if text.is_empty() {
        String::new()
    } else {
        format!("{}\n", text)
    }
}
