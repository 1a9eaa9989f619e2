//! Shared utility functions for display formatting.

/// Strips control characters and markdown emphasis from a display name so it
/// renders literally in chat. Blank names become `fallback`.
pub fn sanitize_display_name(input: &str, fallback: &str) -> String {
    let cleaned: String = input
        .chars()
        .filter(|c| !c.is_control() && !"*_~`|>".contains(*c))
        .collect();
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Truncates a string to a maximum number of characters with ellipsis.
pub fn truncate_string(input: &str, max_chars: usize) -> String {
    if input.chars().count() <= max_chars {
        input.to_string()
    } else {
        let kept: String = input.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_display_name() {
        assert_eq!(sanitize_display_name("**bold**_name_", "anon"), "boldname");
        assert_eq!(sanitize_display_name("  \u{0007}  ", "anon"), "anon");
        assert_eq!(sanitize_display_name("Zoë", "anon"), "Zoë");
    }

    #[test]
    fn test_truncate_string() {
        let input = "This is a very long string that should be truncated";
        assert_eq!(truncate_string(input, 20), "This is a very lo...");
        assert_eq!(truncate_string("Short", 20), "Short");
        assert_eq!(truncate_string("ééééééé", 5), "éé...");
    }
}
