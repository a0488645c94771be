//! Shared utility functions for text shown in Discord.

use std::time::Duration;

/// Truncates a string to at most `max_chars` characters, adding an ellipsis
/// when something was cut off.
pub fn truncate_string(input: &str, max_chars: usize) -> String {
    if input.chars().count() <= max_chars {
        return input.to_string();
    }

    let keep = max_chars.saturating_sub(3);
    let mut truncated: String = input.chars().take(keep).collect();
    truncated.push_str("...");
    truncated
}

/// Formats an elapsed duration the way game summaries show it,
/// e.g. `"2 minutes and 5 seconds"`.
pub fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    let (minutes, seconds) = (total / 60, total % 60);
    format!("{minutes} minutes and {seconds} seconds")
}

/// Uppercases the first character of a string, lowercasing the rest.
pub fn capitalize(input: &str) -> String {
    let mut chars = input.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
    })
}

/// Number of pages needed to show `items` entries `per_page` at a time.
pub const fn page_count(items: usize, per_page: usize) -> usize {
    if per_page == 0 {
        return 0;
    }
    items.div_ceil(per_page)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_string() {
        let input = "This is a very long string that should be truncated";
        assert_eq!(truncate_string(input, 20), "This is a very lo...");
        assert_eq!(truncate_string("Short", 20), "Short");
    }

    #[test]
    fn test_truncate_string_is_char_safe() {
        let input = "ありがとうございました";
        assert_eq!(truncate_string(input, 5), "あり...");
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(Duration::from_secs(125)), "2 minutes and 5 seconds");
        assert_eq!(format_elapsed(Duration::from_millis(900)), "0 minutes and 0 seconds");
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("medium"), "Medium");
        assert_eq!(capitalize("CURRENT"), "Current");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(0, 6), 0);
        assert_eq!(page_count(6, 6), 1);
        assert_eq!(page_count(7, 6), 2);
        assert_eq!(page_count(5, 0), 0);
    }
}
