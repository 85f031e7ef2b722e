use std::fs;
use std::path::Path;

use pb_core::Blocklist;

/// Load a blocklist from a plain or hosts-format file.
pub fn read_blocklist(path: &Path) -> Result<Blocklist, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?;
    Ok(parse_blocklist(&content))
}

/// Accepts one pattern per line, `0.0.0.0 domain` / `127.0.0.1 domain`
/// hosts entries, and `#` or `!` comments.
pub fn parse_blocklist(content: &str) -> Blocklist {
    content.lines().filter_map(extract_pattern).collect()
}

fn extract_pattern(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
        return None;
    }

    if trimmed.starts_with("0.0.0.0 ") || trimmed.starts_with("127.0.0.1 ") {
        return trimmed.split_whitespace().nth(1);
    }

    if trimmed.contains(char::is_whitespace) || !trimmed.contains('.') {
        return None;
    }

    Some(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_blocklist_formats() {
        let blocklist = parse_blocklist(
            "# personal list\n\
             example.com\n\
             0.0.0.0 ads.tracker.net\n\
             127.0.0.1 Spam.ORG\n\
             ! comment\n\
             localhost\n\
             not a pattern\n\
             \n\
             example.com\n",
        );
        assert_eq!(
            blocklist.iter().collect::<Vec<_>>(),
            ["example.com", "ads.tracker.net", "spam.org"]
        );
    }
}
