// src/utils/text.rs

//! Text segmentation helpers.

use unicode_segmentation::UnicodeSegmentation;

/// Lowercased words from a text, skipping hashtag tokens entirely.
///
/// Hashtags name topics, not prose, so they carry no signal about the
/// language a text is written in.
pub fn content_words(text: &str) -> Vec<String> {
    text.split_whitespace()
        .filter(|token| !token.starts_with('#'))
        .flat_map(|token| token.unicode_words())
        .map(str::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_words_lowercases_and_strips_punctuation() {
        assert_eq!(
            content_words("Buon Giorno, mondo!"),
            ["buon", "giorno", "mondo"]
        );
    }

    #[test]
    fn test_content_words_skips_hashtags() {
        assert_eq!(content_words("hello #Rust world"), ["hello", "world"]);
    }

    #[test]
    fn test_content_words_empty() {
        assert!(content_words("   ").is_empty());
        assert!(content_words("#only #tags").is_empty());
    }
}
