//! Heading outline for markdown and plain text.

/// Collect ATX headings as indented bullets, one indent level per heading level.
pub(super) fn headers(lines: &[String]) -> Vec<String> {
    lines.iter().filter_map(|l| heading(l)).collect()
}

fn heading(line: &str) -> Option<String> {
    let level = line.bytes().take_while(|&b| b == b'#').count();
    if level == 0 {
        return None;
    }

    let rest = &line[level..];
    if !rest.starts_with(|c: char| c == ' ' || c == '\t') {
        return None;
    }

    // Closing hashes are decoration: "## Title ##"
    let text = rest.trim().trim_end_matches('#').trim_end();
    if text.is_empty() {
        return None;
    }

    Some(format!("{}- {}", "  ".repeat(level - 1), text))
}
