//! Ordered conversion rules
//!
//! The renderer walks the node tree and, for each element, applies the first
//! rule in [`RULES`] whose predicate matches. Elements no rule claims are
//! transparent: their children are rendered in place. Reference text is
//! emitted verbatim, nothing is escaped.

use tracing::debug;

use crate::node::{Element, Node};
use crate::normalize::ATTACHMENT_TAG;
use crate::render::Renderer;

/// Everything a rule sees when it fires
pub struct RuleContext<'r> {
    pub renderer: &'r Renderer<'r>,
    pub element: &'r Element,
    /// Siblings after `element`, for rules that absorb trailing content
    pub following: &'r [Node],
}

impl RuleContext<'_> {
    fn children(&self) -> String {
        self.renderer.render_nodes(&self.element.children)
    }
}

/// Output of one rule application
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Rendered {
    pub text: String,
    /// Block output starts and ends on its own line
    pub block: bool,
    /// Number of following siblings absorbed by the rule
    pub consumed: usize,
}

impl Rendered {
    fn inline(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    fn block(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            block: true,
            consumed: 0,
        }
    }
}

pub struct Rule {
    pub name: &'static str,
    pub matches: fn(&Element) -> bool,
    pub render: fn(&RuleContext<'_>) -> Rendered,
}

/// Rule table, first match wins
pub static RULES: &[Rule] = &[
    Rule {
        name: "highlight",
        matches: |el| el.is("background"),
        render: |cx| Rendered::inline(wrap(&cx.children(), "==", "==")),
    },
    Rule {
        name: "italic",
        matches: |el| el.is("i"),
        render: |cx| Rendered::inline(wrap(&cx.children(), "*", "*")),
    },
    Rule {
        name: "underline",
        matches: |el| el.is("u"),
        render: |cx| Rendered::inline(wrap(&cx.children(), "<u>", "</u>")),
    },
    Rule {
        name: "checkbox",
        matches: |el| el.is("input") && el.attr("type") == Some("checkbox"),
        render: render_checkbox,
    },
    Rule {
        name: "attachment",
        matches: |el| el.is(ATTACHMENT_TAG),
        render: render_attachment,
    },
    Rule {
        name: "bold",
        matches: |el| el.is("b"),
        render: |cx| Rendered::inline(wrap(&cx.children(), "**", "**")),
    },
    Rule {
        name: "strikethrough",
        matches: |el| el.is("delete"),
        render: |cx| Rendered::inline(wrap(&cx.children(), "~~", "~~")),
    },
    Rule {
        name: "heading",
        matches: |el| heading_level(el).is_some(),
        render: render_heading,
    },
    Rule {
        name: "bullet",
        matches: |el| el.is("bullet"),
        render: |cx| Rendered::inline(format!("{}- ", indentation(cx.element))),
    },
    Rule {
        name: "ordered",
        matches: |el| el.is("order"),
        render: render_ordered,
    },
    Rule {
        name: "rule",
        matches: |el| el.is("hr"),
        render: |_| Rendered::block("---"),
    },
    Rule {
        name: "quote",
        matches: |el| el.is("quote"),
        render: render_quote,
    },
    Rule {
        name: "link",
        matches: |el| el.is("a"),
        render: render_link,
    },
    Rule {
        name: "paragraph",
        matches: |el| el.is("p"),
        render: render_paragraph,
    },
    Rule {
        name: "break",
        matches: |el| el.is("br"),
        render: |_| Rendered::inline("\n"),
    },
];

/// First rule claiming `element`
pub fn find_rule(element: &Element) -> Option<&'static Rule> {
    RULES.iter().find(|rule| (rule.matches)(element))
}

/// Wrap `inner` in markers, keeping surrounding whitespace outside them.
fn wrap(inner: &str, open: &str, close: &str) -> String {
    let core = inner.trim();
    if core.is_empty() {
        return inner.to_string();
    }
    let lead = &inner[..inner.len() - inner.trim_start().len()];
    let trail = &inner[inner.trim_end().len()..];
    format!("{}{}{}{}{}", lead, open, core, close, trail)
}

/// Two spaces per indent level beyond the first
fn indentation(element: &Element) -> String {
    let level = element
        .attr("indent")
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(1);
    "  ".repeat(level.saturating_sub(1))
}

/// Siblings that end a checkbox label
fn ends_label(node: &Node) -> bool {
    match node {
        Node::Text(_) => false,
        Node::Element(el) => matches!(
            el.name.as_str(),
            "br" | "p" | "input" | "bullet" | "order" | "hr" | "quote"
        ),
    }
}

fn render_checkbox(cx: &RuleContext<'_>) -> Rendered {
    let consumed = cx
        .following
        .iter()
        .position(ends_label)
        .unwrap_or(cx.following.len());
    let label = cx.renderer.render_nodes(&cx.following[..consumed]);
    let mark = if cx.element.has_attr("checked") { "x" } else { " " };

    Rendered {
        text: format!("{}- [{}] {}", indentation(cx.element), mark, label.trim())
            .trim_end()
            .to_string(),
        block: false,
        consumed,
    }
}

fn render_attachment(cx: &RuleContext<'_>) -> Rendered {
    let Some(file_id) = cx.element.attr("fileid") else {
        return Rendered::default();
    };
    match cx.renderer.link_for(file_id) {
        Some(link) if link.starts_with('!') => Rendered::inline(link),
        Some(link) => Rendered::inline(format!("!{}", link)),
        None => {
            debug!("No local reference for attachment {}", file_id);
            Rendered::default()
        }
    }
}

fn heading_level(element: &Element) -> Option<usize> {
    match element.name.as_str() {
        "size" => Some(1),
        "mid-size" => Some(2),
        "h3-size" => Some(3),
        _ => None,
    }
}

fn render_heading(cx: &RuleContext<'_>) -> Rendered {
    let text = cx.children();
    let text = text.trim();
    if text.is_empty() {
        return Rendered::default();
    }
    let level = heading_level(cx.element).unwrap_or(1);
    Rendered::block(format!("{} {}", "#".repeat(level), text))
}

fn render_ordered(cx: &RuleContext<'_>) -> Rendered {
    let number = cx
        .element
        .attr("inputnumber")
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(0)
        + 1;
    Rendered::inline(format!("{}{}. ", indentation(cx.element), number))
}

fn render_quote(cx: &RuleContext<'_>) -> Rendered {
    let inner = cx.children();
    let quoted: Vec<String> = inner
        .trim_matches('\n')
        .lines()
        .map(|line| {
            if line.is_empty() {
                ">".to_string()
            } else {
                format!("> {}", line)
            }
        })
        .collect();
    Rendered::block(quoted.join("\n"))
}

fn render_link(cx: &RuleContext<'_>) -> Rendered {
    let text = cx.children();
    match cx.element.attr("href").filter(|h| !h.is_empty()) {
        Some(href) if text.trim().is_empty() => Rendered::inline(format!("<{}>", href)),
        Some(href) => Rendered::inline(format!("[{}]({})", text.trim(), href)),
        None => Rendered::inline(text),
    }
}

fn render_paragraph(cx: &RuleContext<'_>) -> Rendered {
    let inner = cx.children();
    if inner.trim().is_empty() {
        // Blank paragraph: the block newline alone yields an empty line
        return Rendered::block("");
    }
    Rendered::block(inner.trim_end_matches('\n'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_keeps_whitespace_outside_markers() {
        assert_eq!(wrap(" hi ", "==", "=="), " ==hi== ");
        assert_eq!(wrap("  ", "**", "**"), "  ");
    }

    #[test]
    fn test_rule_order_is_stable() {
        let names: Vec<&str> = RULES.iter().map(|r| r.name).collect();
        assert_eq!(
            &names[..5],
            &["highlight", "italic", "underline", "checkbox", "attachment"]
        );
    }

    #[test]
    fn test_unknown_elements_have_no_rule() {
        assert!(find_rule(&Element::new("center")).is_none());
        assert!(find_rule(&Element::new("input")).is_none());
    }

    #[test]
    fn test_indentation() {
        let mut el = Element::new("bullet");
        assert_eq!(indentation(&el), "");
        el.attrs.push(("indent".to_string(), "3".to_string()));
        assert_eq!(indentation(&el), "    ");
    }
}
