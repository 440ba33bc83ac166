//! Inline styling: `**bold**` tokenization and Markdown reconstruction.

use std::sync::LazyLock;

use regex::Regex;

use super::block::RichSpan;

static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("valid bold pattern"));

/// Split a text run into styled spans.
///
/// Only `**bold**` is recognised. Other inline markers, and unterminated bold
/// markers, stay in the text literally. Never returns an empty vector: empty
/// input yields one empty unstyled span.
pub fn tokenize(text: &str) -> Vec<RichSpan> {
    if text.is_empty() {
        return vec![RichSpan::plain("")];
    }

    let mut spans = Vec::new();
    let mut last = 0;

    for caps in BOLD.captures_iter(text) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() > last {
            spans.push(RichSpan::plain(&text[last..whole.start()]));
        }
        spans.push(RichSpan::bold(inner.as_str()));
        last = whole.end();
    }

    if last < text.len() {
        spans.push(RichSpan::plain(&text[last..]));
    }

    spans
}

/// Render one span back to Markdown.
///
/// Bold wraps outermost, then italic, code and strikethrough, with
/// underline as an inline `<u>` tag innermost. A link wraps everything.
pub fn span_to_markdown(span: &RichSpan) -> String {
    let style = span.style;
    let mut out = span.text.clone();

    if style.underline {
        out = format!("<u>{out}</u>");
    }
    if style.strikethrough {
        out = format!("~~{out}~~");
    }
    if style.code {
        out = format!("`{out}`");
    }
    if style.italic {
        out = format!("*{out}*");
    }
    if style.bold {
        out = format!("**{out}**");
    }
    if let Some(href) = &span.href {
        out = format!("[{out}]({href})");
    }

    out
}

/// Render a span sequence to Markdown with no separator between spans.
pub fn to_markdown(spans: &[RichSpan]) -> String {
    spans.iter().map(span_to_markdown).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::block::Annotations;

    #[test]
    fn test_empty_input_yields_single_plain_span() {
        assert_eq!(tokenize(""), vec![RichSpan::plain("")]);
    }

    #[test]
    fn test_bold_in_middle() {
        assert_eq!(
            tokenize("a**b**c"),
            vec![RichSpan::plain("a"), RichSpan::bold("b"), RichSpan::plain("c")]
        );
    }

    #[test]
    fn test_non_greedy_matches() {
        assert_eq!(
            tokenize("**x** and **y**"),
            vec![RichSpan::bold("x"), RichSpan::plain(" and "), RichSpan::bold("y")]
        );
    }

    #[test]
    fn test_unterminated_marker_is_literal() {
        assert_eq!(tokenize("a **b"), vec![RichSpan::plain("a **b")]);
    }

    #[test]
    fn test_other_markers_are_literal() {
        assert_eq!(
            tokenize("*i* `c` ~~s~~"),
            vec![RichSpan::plain("*i* `c` ~~s~~")]
        );
    }

    #[test]
    fn test_empty_bold() {
        assert_eq!(tokenize("****"), vec![RichSpan::bold("")]);
    }

    #[test]
    fn test_multibyte_text() {
        assert_eq!(
            tokenize("한국어 **굵게** 끝"),
            vec![
                RichSpan::plain("한국어 "),
                RichSpan::bold("굵게"),
                RichSpan::plain(" 끝")
            ]
        );
    }

    #[test]
    fn test_span_text_concatenation_matches_stripped_input() {
        let spans = tokenize("one **two** three **four**");
        let joined: String = spans.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(joined, "one two three four");
    }

    #[test]
    fn test_style_nesting_order() {
        let span = RichSpan {
            text: "t".into(),
            style: Annotations {
                bold: true,
                italic: true,
                code: true,
                strikethrough: true,
                underline: true,
            },
            href: Some("https://example.com".into()),
        };
        assert_eq!(
            span_to_markdown(&span),
            "[***`~~<u>t</u>~~`***](https://example.com)"
        );
    }

    #[test]
    fn test_tokenize_then_render_restores_bold() {
        let input = "plain **bold** tail";
        assert_eq!(to_markdown(&tokenize(input)), input);
    }
}
