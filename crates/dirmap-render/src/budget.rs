//! Token-budget heuristics.
//!
//! Tokens are estimated at four characters each, which is close enough
//! for sizing prompt context without a tokenizer.

const CHARS_PER_TOKEN: usize = 4;

/// Estimated token count of `text`.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(CHARS_PER_TOKEN)
}

/// Keep the longest prefix of whole lines that fits `max_tokens`, followed
/// by a truncation marker. Text already within budget is returned as is.
pub fn truncate_to_budget(text: &str, max_tokens: usize) -> String {
    if estimate_tokens(text) <= max_tokens {
        return text.to_string();
    }

    let marker = format!("... [truncated to fit ~{} token budget]", max_tokens);
    let budget_chars = (max_tokens * CHARS_PER_TOKEN).saturating_sub(marker.chars().count() + 1);

    let mut out = String::new();
    let mut used = 0;
    for line in text.lines() {
        let len = line.chars().count() + 1;
        if used + len > budget_chars {
            break;
        }
        out.push_str(line);
        out.push('\n');
        used += len;
    }

    out.push_str(&marker);
    out.push('\n');
    out
}
