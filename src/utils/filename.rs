//! Safe filename generation utilities

use regex::Regex;
use std::sync::OnceLock;

/// Maximum length of a sanitized name, in characters
pub const MAX_FILENAME_CHARS: usize = 200;

/// Characters rejected by common filesystems
pub const RESERVED_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

fn invalid_chars() -> &'static Regex {
    static INVALID: OnceLock<Regex> = OnceLock::new();
    INVALID.get_or_init(|| {
        Regex::new(r#"[<>:"/\\|?*\x00-\x1f]"#).expect("static filename regex is valid")
    })
}

fn trim_edges(name: &str) -> &str {
    name.trim_matches(|c: char| c == '.' || c == ' ')
}

/// Convert a display name to a filesystem-safe name.
///
/// Reserved characters become `_`, leading/trailing spaces and dots are
/// removed and the result is capped at [`MAX_FILENAME_CHARS`] characters.
/// The output may be empty; sanitizing it again returns it unchanged.
pub fn sanitize_filename(name: &str) -> String {
    let replaced = invalid_chars().replace_all(name, "_");
    let trimmed = trim_edges(&replaced);

    if trimmed.chars().count() <= MAX_FILENAME_CHARS {
        return trimmed.to_string();
    }

    let truncated: String = trimmed.chars().take(MAX_FILENAME_CHARS).collect();
    // Truncation can expose a trailing space or dot
    trim_edges(&truncated).to_string()
}

/// Sanitized stem for output files, never empty
pub fn output_stem(name: &str) -> String {
    let safe = sanitize_filename(name);
    if safe.is_empty() {
        "untitled".to_string()
    } else {
        safe
    }
}

/// Check if a name is already safe for the filesystem
pub fn is_safe_filename(name: &str) -> bool {
    !name.is_empty()
        && name.chars().count() <= MAX_FILENAME_CHARS
        && !invalid_chars().is_match(name)
        && trim_edges(name).len() == name.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_sanitized(output: &str) {
        assert!(!output.contains(RESERVED_CHARS), "reserved char in {:?}", output);
        assert!(!output.starts_with(' ') && !output.ends_with(' '));
        assert!(!output.starts_with('.') && !output.ends_with('.'));
        assert!(output.chars().count() <= MAX_FILENAME_CHARS);
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("Test Video: Title"), "Test Video_ Title");
        assert_eq!(
            sanitize_filename("Video with <invalid> chars"),
            "Video with _invalid_ chars"
        );
        assert_eq!(sanitize_filename("a/b\\c|d?e*f\"g"), "a_b_c_d_e_f_g");
        assert_eq!(sanitize_filename("  ..lesson 1..  "), "lesson 1");
        assert_eq!(sanitize_filename("Python教程_第1集"), "Python教程_第1集");
    }

    #[test]
    fn test_sanitize_filename_all_illegal_or_empty() {
        assert_eq!(sanitize_filename(""), "");
        assert_eq!(sanitize_filename(" . . "), "");
        assert_eq!(sanitize_filename("???"), "___");
        assert_eq!(output_stem(" ... "), "untitled");
        assert_eq!(output_stem("clip"), "clip");
    }

    #[test]
    fn test_sanitize_filename_truncates_on_char_boundary() {
        let long = "视".repeat(250);
        let safe = sanitize_filename(&long);
        assert_eq!(safe.chars().count(), MAX_FILENAME_CHARS);
        assert_sanitized(&safe);
    }

    #[test]
    fn test_sanitize_filename_trims_after_truncation() {
        let mut name = "a".repeat(199);
        name.push_str(" .tail");
        let safe = sanitize_filename(&name);
        assert_eq!(safe, "a".repeat(199));
        assert_sanitized(&safe);
    }

    #[test]
    fn test_sanitize_filename_properties() {
        let samples = [
            "normal",
            " leading and trailing ",
            "..dots..",
            "mixed <>:\"/\\|?* chars",
            "tab\tand\nnewline",
            ". :. ",
            &"x ".repeat(150),
            &format!("{}...", "y".repeat(198)),
        ];

        for sample in samples.iter() {
            let once = sanitize_filename(sample);
            assert_sanitized(&once);
            assert_eq!(sanitize_filename(&once), once, "not a fixed point: {:?}", sample);
        }
    }

    #[test]
    fn test_is_safe_filename() {
        assert!(is_safe_filename("normal_file"));
        assert!(is_safe_filename("video with spaces"));
        assert!(!is_safe_filename("file<with>invalid:chars"));
        assert!(!is_safe_filename(""));
        assert!(!is_safe_filename(".hidden"));
        assert!(!is_safe_filename("trailing "));
        assert!(is_safe_filename(&sanitize_filename("Test: <Video>")));
    }
}
