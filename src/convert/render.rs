//! [`Block`] to Markdown-like text.

use super::block::Block;
use super::rich_text::to_markdown;

/// Icon used for callouts that carry no emoji.
pub const DEFAULT_CALLOUT_EMOJI: &str = "💡";

/// Render one block as a line of Markdown-like text.
///
/// Only code blocks span several lines. Unsupported kinds render as an
/// empty string so callers can filter them out.
pub fn render_block(block: &Block) -> String {
    match block {
        Block::Paragraph(text) => to_markdown(text),
        Block::Heading { level, text } => format!("{} {}", level.marker(), to_markdown(text)),
        Block::BulletedItem { text, indent } => {
            format!("{}• {}", "  ".repeat(*indent), to_markdown(text))
        }
        Block::NumberedItem { text, indent } => {
            format!("{}1. {}", "  ".repeat(*indent), to_markdown(text))
        }
        Block::Divider => "---".to_string(),
        Block::Code { language, text } => {
            format!("```{language}\n{}\n```", to_markdown(text))
        }
        Block::Quote(text) => format!("> {}", to_markdown(text)),
        Block::Callout { emoji, text } => format!(
            "{} **{}**",
            emoji.as_deref().unwrap_or(DEFAULT_CALLOUT_EMOJI),
            to_markdown(text)
        ),
        Block::Toggle(text) => {
            format!("<details><summary>{}</summary></details>", to_markdown(text))
        }
        Block::Todo { checked, text } => {
            let mark = if *checked { "[x]" } else { "[ ]" };
            format!("{mark} {}", to_markdown(text))
        }
        Block::Unsupported(_) => String::new(),
    }
}

/// Render blocks as a document: blank output dropped, blocks separated by
/// blank lines.
pub fn render_document(blocks: &[Block]) -> String {
    blocks
        .iter()
        .map(render_block)
        .filter(|text| !text.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}
