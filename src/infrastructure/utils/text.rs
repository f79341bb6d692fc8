use chrono::{DateTime, Utc};

const WORDS_PER_MINUTE: usize = 200;

/// URL slug from a title: lowercase ASCII words joined by single hyphens.
pub fn slugify(title: &str) -> String {
    slug::slugify(title)
}

/// Reading-time label shown next to a post, e.g. `"3 min read"`.
pub fn read_time(content: &str) -> String {
    let words = content.split_whitespace().count().max(1);
    let minutes = words.div_ceil(WORDS_PER_MINUTE);
    format!("{} min read", minutes)
}

/// Splits the editor's comma-separated tag field. Entries are trimmed and
/// blanks dropped; order and duplicates are kept.
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// Case-insensitive substring test. An empty needle matches everything.
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Display date stored with a post, e.g. `"Oct 19, 2026"`.
pub fn display_date(at: DateTime<Utc>) -> String {
    at.format("%b %-d, %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn slugify_collapses_punctuation() {
        assert_eq!(slugify("Hello, World! Rust & React"), "hello-world-rust-react");
        assert_eq!(slugify("  --Edge Case--  "), "edge-case");
    }

    #[test]
    fn read_time_rounds_up() {
        assert_eq!(read_time(""), "1 min read");
        assert_eq!(read_time(&"word ".repeat(200)), "1 min read");
        assert_eq!(read_time(&"word ".repeat(201)), "2 min read");
        assert_eq!(read_time(&"word\n".repeat(1000)), "5 min read");
    }

    #[test]
    fn tags_are_split_trimmed_and_filtered() {
        assert_eq!(parse_tags("React, Node.js"), vec!["React", "Node.js"]);
        assert_eq!(parse_tags(" Rust ,, ,Rust"), vec!["Rust", "Rust"]);
        assert!(parse_tags(" , ").is_empty());
    }

    #[test]
    fn contains_ci_ignores_case() {
        assert!(contains_ci("Building a Blog in Rust", "blog"));
        assert!(contains_ci("Anything", ""));
        assert!(!contains_ci("Design", "career"));
    }

    #[test]
    fn display_date_is_short_month() {
        let at = Utc.with_ymd_and_hms(2026, 10, 9, 8, 0, 0).unwrap();
        assert_eq!(display_date(at), "Oct 9, 2026");
    }
}
