//! End-to-end conversion of realistic note bodies

use minote_core::{NoteDetail, NoteType};
use minote_markup::{compose_document, FrontMatter, LinkMap, MarkupError, MarkupTransformer};

fn convert(content: &str, links: &LinkMap) -> Result<String, MarkupError> {
    let detail = NoteDetail {
        content: content.to_string(),
        ..Default::default()
    };
    MarkupTransformer::new().transform(&detail, NoteType::Common, "Untitled", links)
}

#[test]
fn test_full_note_body() {
    let content = concat!(
        "<new-format/><text indent=\"1\"><size>Shopping</size></text>\n",
        "<text indent=\"1\"><bullet indent=\"1\" />Milk <b>fresh</b></text>\n",
        "<text indent=\"2\"><bullet indent=\"2\" />Eggs</text>\n",
        "<text indent=\"1\"></text>\n",
        "<text indent=\"1\"><input type=\"checkbox\" indent=\"1\" level=\"3\" checked=\"true\" />Call mom</text>\n",
        "<text indent=\"1\"><order indent=\"1\" inputNumber=\"0\" />first <i>item</i></text>\n",
        "<text indent=\"1\"><img fileid=\"123.abc\" imgshow=\"0\" imgdes=\"\" /></text>\n",
        "<text indent=\"1\">a &amp; b <delete>gone</delete></text>",
    );
    let mut links = LinkMap::new();
    links.insert("123.abc".to_string(), "[[img/123.abc.jpeg]]".to_string());

    let out = convert(content, &links).unwrap();
    assert_eq!(
        out,
        concat!(
            "# Shopping\n",
            "- Milk **fresh**\n",
            "  - Eggs\n",
            "\n",
            "- [x] Call mom\n",
            "1. first *item*\n",
            "![[img/123.abc.jpeg]]\n",
            "a & b ~~gone~~\n",
        )
    );
}

#[test]
fn test_unchecked_tasks_in_legacy_layout() {
    let content = "<input type=\"checkbox\" />buy bread\n<input type=\"checkbox\" checked=\"true\" />pay rent";
    let out = convert(content, &LinkMap::new()).unwrap();
    assert_eq!(out, "- [ ] buy bread\n- [x] pay rent\n");
}

#[test]
fn test_markdown_style_links_get_embed_marker() {
    let mut links = LinkMap::new();
    links.insert("g1".to_string(), "[](img/g1.png)".to_string());

    let out = convert("<text indent=\"1\">☺ g1<0/></></text>", &links).unwrap();
    assert_eq!(out, "![](img/g1.png)\n");
}

#[test]
fn test_missing_attachment_renders_nothing() {
    let out = convert("<text indent=\"1\">see <sound fileid=\"s9\" /></text>", &LinkMap::new()).unwrap();
    assert_eq!(out, "see\n");
}

#[test]
fn test_underline_quote_and_link() {
    let content = concat!(
        "<text indent=\"1\"><u>under</u></text>\n",
        "<text indent=\"1\"><quote>wise words</quote></text>\n",
        "<text indent=\"1\"><a href=\"https://example.com\">site</a></text>",
    );
    let out = convert(content, &LinkMap::new()).unwrap();
    assert_eq!(out, "<u>under</u>\n> wise words\n[site](https://example.com)\n");
}

#[test]
fn test_unterminated_tag_fails_the_note() {
    let err = convert("<text indent=\"1\">broken <b", &LinkMap::new()).unwrap_err();
    assert!(matches!(err, MarkupError::UnterminatedTag { .. }));
}

#[test]
fn test_document_with_front_matter() {
    let body = convert("<text indent=\"1\">hello</text>", &LinkMap::new()).unwrap();
    let fm = FrontMatter::new("42", 1_700_000_000_000, 1_700_000_000_000)
        .with_tag("minote/type/common")
        .with_tag("minote/folder/Work");
    let doc = compose_document(&fm, &body).unwrap();

    assert!(doc.starts_with("---\n"));
    assert!(doc.contains("- minote/folder/Work\n"));
    assert!(doc.ends_with("---\n\nhello\n"));
}
