//! Page identifier normalization.

use uuid::Uuid;

/// Normalize a page or block identifier to the hyphenated UUID form.
///
/// Accepts hyphenated or bare 32-hex ids, and Notion page URLs whose last
/// path segment ends in the id (`.../My-Page-<32 hex>?pvs=4`). Anything
/// else is returned trimmed and otherwise untouched so the API can reject it.
pub fn normalize_id(raw: &str) -> String {
    let raw = raw.trim();
    if let Ok(id) = Uuid::parse_str(raw) {
        return id.hyphenated().to_string();
    }

    let path = raw.split(['?', '#']).next().unwrap_or(raw);
    let segment = path.trim_end_matches('/').rsplit('/').next().unwrap_or(path);
    segment
        .len()
        .checked_sub(32)
        .and_then(|start| segment.get(start..))
        .and_then(|tail| Uuid::parse_str(tail).ok())
        .map(|id| id.hyphenated().to_string())
        .unwrap_or_else(|| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HYPHENATED: &str = "01234567-89ab-cdef-0123-456789abcdef";

    #[test]
    fn test_bare_and_hyphenated_ids() {
        assert_eq!(normalize_id("0123456789abcdef0123456789abcdef"), HYPHENATED);
        assert_eq!(normalize_id(HYPHENATED), HYPHENATED);
        assert_eq!(normalize_id(" 0123456789ABCDEF0123456789ABCDEF "), HYPHENATED);
    }

    #[test]
    fn test_page_url() {
        assert_eq!(
            normalize_id("https://www.notion.so/team/Roadmap-0123456789abcdef0123456789abcdef?pvs=4"),
            HYPHENATED
        );
        assert_eq!(
            normalize_id("https://www.notion.so/0123456789abcdef0123456789abcdef/"),
            HYPHENATED
        );
    }

    #[test]
    fn test_unrecognised_input_passes_through() {
        assert_eq!(normalize_id("not-an-id"), "not-an-id");
        assert_eq!(normalize_id("제목-페이지"), "제목-페이지");
    }
}
