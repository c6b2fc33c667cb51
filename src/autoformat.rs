//! Markdown autoformat detection. Runs after each content change: when the
//! content is exactly a recognized leading token followed by one space, the
//! block converts to the mapped type and the token is consumed. Patterns are
//! tried in a fixed priority order; the first match wins.

use crate::blocks::BlockType;

fn is_ordered_list_token(token: &str) -> bool {
    let Some(digits) = token.strip_suffix('.') else {
        return false;
    };
    !digits.is_empty() && digits.chars().all(|ch| ch.is_ascii_digit())
}

/// The block type the content's token maps to, or `None` when the content
/// is not exactly `<token><space>`. The token set is disjoint, so the arm
/// order below is the priority order.
pub fn detect(content: &str) -> Option<BlockType> {
    let token = content.strip_suffix(' ')?;
    if token.is_empty() || token.ends_with(' ') {
        return None;
    }

    let block_type = match token {
        "#" => BlockType::Heading1,
        "##" => BlockType::Heading2,
        "###" => BlockType::Heading3,
        "-" | "*" => BlockType::BulletList,
        "[]" | "[ ]" => BlockType::Todo,
        ">" => BlockType::Quote,
        "```" => BlockType::Code,
        "---" | "***" => BlockType::Divider,
        other if is_ordered_list_token(other) => BlockType::NumberedList,
        _ => return None,
    };
    Some(block_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_tokens_map_by_level() {
        assert_eq!(detect("# "), Some(BlockType::Heading1));
        assert_eq!(detect("## "), Some(BlockType::Heading2));
        assert_eq!(detect("### "), Some(BlockType::Heading3));
    }

    #[test]
    fn list_tokens_map_to_lists() {
        assert_eq!(detect("- "), Some(BlockType::BulletList));
        assert_eq!(detect("* "), Some(BlockType::BulletList));
        assert_eq!(detect("1. "), Some(BlockType::NumberedList));
        assert_eq!(detect("42. "), Some(BlockType::NumberedList));
    }

    #[test]
    fn todo_quote_code_divider_tokens() {
        assert_eq!(detect("[] "), Some(BlockType::Todo));
        assert_eq!(detect("[ ] "), Some(BlockType::Todo));
        assert_eq!(detect("> "), Some(BlockType::Quote));
        assert_eq!(detect("``` "), Some(BlockType::Code));
        assert_eq!(detect("--- "), Some(BlockType::Divider));
        assert_eq!(detect("*** "), Some(BlockType::Divider));
    }

    #[test]
    fn unlisted_tokens_do_not_fire() {
        assert_eq!(detect("##3 "), None);
        assert_eq!(detect("#### "), None);
        assert_eq!(detect("1 "), None);
        assert_eq!(detect(". "), None);
        assert_eq!(detect("1a. "), None);
        assert_eq!(detect("-- "), None);
    }

    #[test]
    fn requires_exactly_one_trailing_space() {
        assert_eq!(detect("#"), None);
        assert_eq!(detect("#  "), None);
        assert_eq!(detect(" "), None);
        assert_eq!(detect(""), None);
    }

    #[test]
    fn token_must_stand_alone() {
        assert_eq!(detect("intro # "), None);
        assert_eq!(detect("# heading "), None);
    }
}
