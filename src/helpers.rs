pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Subsequence match with bonuses for runs and word starts. `None` means the
/// query does not match at all; higher scores sort first.
pub(crate) fn fuzzy_score(query: &str, text: &str) -> Option<i64> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Some(0);
    }

    let text_chars: Vec<char> = text.to_lowercase().chars().collect();
    if text_chars.is_empty() {
        return None;
    }

    let mut score: i64 = 0;
    let mut search_from = 0usize;
    let mut last_match: Option<usize> = None;

    for wanted in query.chars() {
        let found = text_chars
            .iter()
            .enumerate()
            .skip(search_from)
            .find(|(_, ch)| **ch == wanted)
            .map(|(ix, _)| ix)?;

        score += 10;
        if let Some(prev) = last_match {
            if found == prev + 1 {
                score += 6;
            } else {
                let gap = (found - prev - 1) as i64;
                score -= gap.min(3);
            }
        }
        if found == 0 || !text_chars[found - 1].is_alphanumeric() {
            score += 3;
        }

        last_match = Some(found);
        search_from = found + 1;
    }

    let length_penalty = (text_chars.len().saturating_sub(query.chars().count())) as i64 / 4;
    Some(score - length_penalty)
}

pub(crate) fn cycle_index(current: usize, len: usize, forward: bool) -> usize {
    if len == 0 {
        return 0;
    }
    if forward {
        (current + 1) % len
    } else {
        current.checked_sub(1).unwrap_or(len.saturating_sub(1))
    }
}
