//! Pure helpers for generated post text.
//!
//! No I/O here: inputs in, values out.

/// Count whitespace-separated words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Build a URL slug from a title.
///
/// Lowercases ASCII alphanumerics, turns every other run of characters into a
/// single `-`, and caps the result at `max_len` bytes without a trailing dash.
pub fn slugify(title: &str, max_len: usize) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    if slug.len() > max_len {
        slug.truncate(max_len);
    }
    slug.trim_end_matches('-').to_string()
}

/// Generate a summary by truncation, respecting char boundaries.
pub fn generate_summary(text: &str, max_length: usize) -> String {
    if text.chars().count() > max_length {
        let truncated: String = text.chars().take(max_length.saturating_sub(3)).collect();
        format!("{}...", truncated.trim_end())
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_count_ignores_extra_whitespace() {
        assert_eq!(word_count("  one two\n\tthree  "), 3);
        assert_eq!(word_count(""), 0);
    }

    #[test]
    fn test_slugify_collapses_punctuation() {
        assert_eq!(
            slugify("Edge Computing: What's Next? (2026)", 80),
            "edge-computing-what-s-next-2026"
        );
    }

    #[test]
    fn test_slugify_drops_non_ascii_and_edges() {
        assert_eq!(slugify("  — Café AI —  ", 80), "caf-ai");
    }

    #[test]
    fn test_slugify_respects_max_len_without_trailing_dash() {
        let slug = slugify("alpha beta gamma", 11);
        assert_eq!(slug, "alpha-beta");
    }

    #[test]
    fn test_generate_summary_short_text_unchanged() {
        assert_eq!(generate_summary("Short", 250), "Short");
    }

    #[test]
    fn test_generate_summary_long_text() {
        let long = "a".repeat(300);
        let summary = generate_summary(&long, 250);
        assert_eq!(summary.chars().count(), 250);
        assert!(summary.ends_with("..."));
    }
}
