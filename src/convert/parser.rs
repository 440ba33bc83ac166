//! Line-oriented Markdown subset to [`Block`] parser.
//!
//! Recognised lines (after trimming), first match wins:
//!
//! | Line            | Result                    |
//! |-----------------|---------------------------|
//! | `### text`      | heading 3                 |
//! | `## text`       | heading 2                 |
//! | `# text`        | heading 1                 |
//! | `- text` `* text` | bulleted item           |
//! | `---`           | divider                   |
//! | blank           | paragraph break           |
//! | anything else   | joined into the paragraph |

use super::block::{Block, HeadingLevel};
use super::chunker::{chunk, MAX_BLOCK_CHARS};
use super::rich_text::tokenize;

/// Classification of one trimmed input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// Heading with the text after its marker.
    Heading(HeadingLevel, &'a str),
    /// Bulleted item with the text after its marker.
    Bullet(&'a str),
    /// `---`
    Divider,
    /// Empty after trimming.
    Blank,
    /// Paragraph text.
    Text(&'a str),
}

const PREFIXES: [(&str, fn(&str) -> LineKind<'_>); 5] = [
    ("### ", |rest| LineKind::Heading(HeadingLevel::H3, rest)),
    ("## ", |rest| LineKind::Heading(HeadingLevel::H2, rest)),
    ("# ", |rest| LineKind::Heading(HeadingLevel::H1, rest)),
    ("- ", |rest| LineKind::Bullet(rest)),
    ("* ", |rest| LineKind::Bullet(rest)),
];

/// Classify a single line. The line is trimmed first.
pub fn classify(line: &str) -> LineKind<'_> {
    let line = line.trim();

    for (prefix, make) in PREFIXES {
        if let Some(rest) = line.strip_prefix(prefix) {
            return make(rest);
        }
    }

    match line {
        "---" => LineKind::Divider,
        "" => LineKind::Blank,
        text => LineKind::Text(text),
    }
}

/// Parse Markdown into blocks, in document order.
pub fn parse(content: &str) -> Vec<Block> {
    let mut parser = Parser::default();
    for line in content.split('\n') {
        parser.feed(classify(line));
    }
    parser.finish()
}

#[derive(Default)]
struct Parser {
    blocks: Vec<Block>,
    paragraph: String,
}

impl Parser {
    fn feed(&mut self, line: LineKind<'_>) {
        if let LineKind::Text(text) = line {
            if !self.paragraph.is_empty() {
                self.paragraph.push(' ');
            }
            self.paragraph.push_str(text);
            return;
        }

        self.flush_paragraph();

        match line {
            LineKind::Heading(level, text) => self.blocks.push(Block::Heading {
                level,
                text: tokenize(text),
            }),
            LineKind::Bullet(text) => self.blocks.push(Block::BulletedItem {
                text: tokenize(text),
                indent: 0,
            }),
            LineKind::Divider => self.blocks.push(Block::Divider),
            LineKind::Blank | LineKind::Text(_) => {}
        }
    }

    fn flush_paragraph(&mut self) {
        if self.paragraph.is_empty() {
            return;
        }
        let paragraph = std::mem::take(&mut self.paragraph);
        self.blocks.extend(
            chunk(&paragraph, MAX_BLOCK_CHARS)
                .iter()
                .map(|piece| Block::Paragraph(tokenize(piece))),
        );
    }

    fn finish(mut self) -> Vec<Block> {
        self.flush_paragraph();
        self.blocks
    }
}
