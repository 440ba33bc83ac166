//! Notion JSON shapes for blocks, rich text and page titles.

use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::convert::{Annotations, Block, HeadingLevel, RichSpan};

/// Fallback title for pages without a title property.
pub const UNTITLED: &str = "Untitled";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ApiRichText {
    plain_text: Option<String>,
    text: Option<ApiText>,
    annotations: Annotations,
    href: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ApiText {
    content: String,
    link: Option<ApiLink>,
}

#[derive(Debug, Deserialize)]
struct ApiLink {
    url: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ApiBlockBody {
    rich_text: Vec<ApiRichText>,
    language: Option<String>,
    checked: bool,
    indent_level: usize,
    icon: Option<ApiIcon>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ApiIcon {
    emoji: Option<String>,
}

impl From<ApiRichText> for RichSpan {
    fn from(api: ApiRichText) -> Self {
        let (content, link) = match api.text {
            Some(text) => (Some(text.content), text.link.map(|l| l.url)),
            None => (None, None),
        };
        RichSpan {
            text: api.plain_text.or(content).unwrap_or_default(),
            style: api.annotations,
            href: api.href.or(link),
        }
    }
}

/// Serialize one span as a Notion `text` rich-text object.
pub fn span_to_api(span: &RichSpan) -> Value {
    let mut text = json!({ "content": span.text });
    if let Some(href) = &span.href {
        text["link"] = json!({ "url": href });
    }

    let mut item = json!({ "type": "text", "text": text });
    if !span.style.is_plain() {
        let style = span.style;
        item["annotations"] = json!({
            "bold": style.bold,
            "italic": style.italic,
            "code": style.code,
            "strikethrough": style.strikethrough,
            "underline": style.underline,
        });
    }
    item
}

fn spans_to_api(spans: &[RichSpan]) -> Value {
    Value::Array(spans.iter().map(span_to_api).collect())
}

/// Serialize a block for a create or append call.
pub fn block_to_api(block: &Block) -> Value {
    let body = match block {
        Block::Paragraph(text)
        | Block::Quote(text)
        | Block::Toggle(text)
        | Block::Heading { text, .. }
        | Block::BulletedItem { text, .. }
        | Block::NumberedItem { text, .. } => json!({ "rich_text": spans_to_api(text) }),
        Block::Code { language, text } => {
            let language = if language.is_empty() {
                "plain text"
            } else {
                language.as_str()
            };
            json!({ "rich_text": spans_to_api(text), "language": language })
        }
        Block::Callout { emoji, text } => {
            let mut body = json!({ "rich_text": spans_to_api(text) });
            if let Some(emoji) = emoji {
                body["icon"] = json!({ "type": "emoji", "emoji": emoji });
            }
            body
        }
        Block::Todo { checked, text } => json!({
            "rich_text": spans_to_api(text),
            "checked": checked,
        }),
        Block::Divider | Block::Unsupported(_) => json!({}),
    };

    let kind = block.kind();
    let mut object = Map::new();
    object.insert("object".into(), "block".into());
    object.insert("type".into(), kind.into());
    object.insert(kind.to_string(), body);
    Value::Object(object)
}

/// Serialize a batch of blocks.
pub fn blocks_to_api(blocks: &[Block]) -> Value {
    Value::Array(blocks.iter().map(block_to_api).collect())
}

/// Read a block returned by the store.
///
/// Never fails: a missing or unknown `type` gives [`Block::Unsupported`],
/// and a malformed body reads as empty content.
pub fn block_from_api(value: &Value) -> Block {
    let Some(kind) = value.get("type").and_then(Value::as_str) else {
        return Block::Unsupported(String::new());
    };
    let body = value
        .get(kind)
        .and_then(|body| ApiBlockBody::deserialize(body).ok())
        .unwrap_or_default();
    let text: Vec<RichSpan> = body.rich_text.into_iter().map(RichSpan::from).collect();

    match kind {
        "paragraph" => Block::Paragraph(text),
        "heading_1" => Block::Heading {
            level: HeadingLevel::H1,
            text,
        },
        "heading_2" => Block::Heading {
            level: HeadingLevel::H2,
            text,
        },
        "heading_3" => Block::Heading {
            level: HeadingLevel::H3,
            text,
        },
        "bulleted_list_item" => Block::BulletedItem {
            text,
            indent: body.indent_level,
        },
        "numbered_list_item" => Block::NumberedItem {
            text,
            indent: body.indent_level,
        },
        "divider" => Block::Divider,
        "code" => Block::Code {
            language: body.language.unwrap_or_default(),
            text,
        },
        "quote" => Block::Quote(text),
        "callout" => Block::Callout {
            emoji: body.icon.and_then(|icon| icon.emoji),
            text,
        },
        "toggle" => Block::Toggle(text),
        "to_do" => Block::Todo {
            checked: body.checked,
            text,
        },
        other => Block::Unsupported(other.to_string()),
    }
}

/// Title of a page object: the `title` property, then `Name`, then any
/// property of type `title`, else [`UNTITLED`].
pub fn page_title(page: &Value) -> String {
    let properties = page.get("properties");
    let named = |name: &str| properties.and_then(|p| p.get(name)).and_then(title_text);

    named("title")
        .or_else(|| named("Name"))
        .or_else(|| {
            properties
                .and_then(Value::as_object)?
                .values()
                .filter(|p| p.get("type").and_then(Value::as_str) == Some("title"))
                .find_map(title_text)
        })
        .unwrap_or_else(|| UNTITLED.to_string())
}

fn title_text(property: &Value) -> Option<String> {
    let text: String = property
        .get("title")?
        .as_array()?
        .iter()
        .filter_map(|item| item.get("plain_text").and_then(Value::as_str))
        .collect();
    (!text.is_empty()).then_some(text)
}

/// Body of a create-page call under a parent page.
pub fn create_page_body(parent_id: &str, title: &str, children: &[Block]) -> Value {
    json!({
        "parent": { "page_id": parent_id },
        "properties": {
            "title": {
                "title": [{ "text": { "content": title } }]
            }
        },
        "children": blocks_to_api(children),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraph_with_bold_serializes_like_notion() {
        let block = Block::Paragraph(vec![RichSpan::plain("a"), RichSpan::bold("b")]);
        assert_eq!(
            block_to_api(&block),
            json!({
                "object": "block",
                "type": "paragraph",
                "paragraph": {
                    "rich_text": [
                        { "type": "text", "text": { "content": "a" } },
                        {
                            "type": "text",
                            "text": { "content": "b" },
                            "annotations": {
                                "bold": true, "italic": false, "code": false,
                                "strikethrough": false, "underline": false
                            }
                        }
                    ]
                }
            })
        );
    }

    #[test]
    fn test_divider_and_heading_shapes() {
        assert_eq!(
            block_to_api(&Block::Divider),
            json!({ "object": "block", "type": "divider", "divider": {} })
        );
        let heading = Block::Heading {
            level: HeadingLevel::H2,
            text: vec![RichSpan::plain("T")],
        };
        assert_eq!(block_to_api(&heading)["type"], "heading_2");
        assert_eq!(
            block_to_api(&heading)["heading_2"]["rich_text"][0]["text"]["content"],
            "T"
        );
    }

    #[test]
    fn test_reads_store_blocks() {
        let value = json!({
            "object": "block",
            "type": "to_do",
            "to_do": {
                "rich_text": [{
                    "type": "text",
                    "text": { "content": "ship", "link": null },
                    "annotations": { "bold": false, "italic": true, "code": false,
                                     "strikethrough": false, "underline": false, "color": "default" },
                    "plain_text": "ship",
                    "href": "https://example.com"
                }],
                "checked": true,
                "color": "default"
            }
        });
        let block = block_from_api(&value);
        let Block::Todo { checked, text } = &block else {
            panic!("expected todo, got {block:?}");
        };
        assert!(*checked);
        assert!(text[0].style.italic);
        assert_eq!(text[0].href.as_deref(), Some("https://example.com"));
    }

    #[test]
    fn test_callout_icon_and_code_language() {
        let callout = block_from_api(&json!({
            "type": "callout",
            "callout": { "rich_text": [], "icon": { "type": "emoji", "emoji": "🔥" } }
        }));
        assert_eq!(
            callout,
            Block::Callout {
                emoji: Some("🔥".into()),
                text: vec![],
            }
        );

        let code = block_from_api(&json!({
            "type": "code",
            "code": { "rich_text": [{ "plain_text": "x = 1" }], "language": "python" }
        }));
        assert_eq!(
            code,
            Block::Code {
                language: "python".into(),
                text: vec![RichSpan::plain("x = 1")],
            }
        );
    }

    #[test]
    fn test_unknown_and_malformed_blocks() {
        assert_eq!(
            block_from_api(&json!({ "type": "synced_block", "synced_block": {} })),
            Block::Unsupported("synced_block".into())
        );
        assert_eq!(
            block_from_api(&json!({ "object": "block" })),
            Block::Unsupported(String::new())
        );
        assert_eq!(
            block_from_api(&json!({ "type": "paragraph", "paragraph": { "rich_text": 7 } })),
            Block::Paragraph(vec![])
        );
    }

    #[test]
    fn test_rich_text_falls_back_to_content_and_link() {
        let block = block_from_api(&json!({
            "type": "quote",
            "quote": { "rich_text": [{ "text": { "content": "c", "link": { "url": "u" } } }] }
        }));
        assert_eq!(block, Block::Quote(vec![RichSpan::plain("c").with_href("u")]));
    }

    #[test]
    fn test_page_title_lookup_order() {
        let titled = json!({ "properties": {
            "title": { "type": "title", "title": [{ "plain_text": "Main" }] }
        }});
        assert_eq!(page_title(&titled), "Main");

        let named = json!({ "properties": {
            "Name": { "type": "title", "title": [{ "plain_text": "Row" }, { "plain_text": " 1" }] }
        }});
        assert_eq!(page_title(&named), "Row 1");

        let custom = json!({ "properties": {
            "Status": { "type": "select" },
            "Task": { "type": "title", "title": [{ "plain_text": "Custom" }] }
        }});
        assert_eq!(page_title(&custom), "Custom");

        assert_eq!(page_title(&json!({})), UNTITLED);
    }

    #[test]
    fn test_create_page_body() {
        let body = create_page_body("parent", "Hello", &[Block::Divider]);
        assert_eq!(body["parent"]["page_id"], "parent");
        assert_eq!(
            body["properties"]["title"]["title"][0]["text"]["content"],
            "Hello"
        );
        assert_eq!(body["children"].as_array().map(Vec::len), Some(1));
    }
}
