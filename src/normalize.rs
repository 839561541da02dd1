//! Text cleanup before speech synthesis
//!
//! Generated replies can carry markdown glyphs and odd Unicode forms that
//! TTS voices read aloud. This strips them down to plain speakable text.

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Markdown and punctuation glyphs stripped before synthesis
static GLYPHS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[*_~#`>\-•\[\]\(\)\{\}<>]").unwrap());

/// Runs of whitespace (including newlines) collapsed to one space
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Normalize text for speech synthesis
///
/// Applies NFKC Unicode normalization, replaces markdown glyphs with
/// spaces, collapses whitespace runs, and trims. Pure and idempotent.
#[must_use]
pub fn normalize(text: &str) -> String {
    let composed: String = text.nfkc().collect();
    let stripped = GLYPHS.replace_all(&composed, " ");
    let collapsed = WHITESPACE.replace_all(&stripped, " ");
    collapsed.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_markdown_glyphs() {
        let cleaned = normalize("**Take** _rest_ and `fluids` - [daily]");
        assert_eq!(cleaned, "Take rest and fluids daily");
    }

    #[test]
    fn removes_every_glyph_in_set() {
        let cleaned = normalize("*_~#`>-•[](){}<>");
        for glyph in [
            '*', '_', '~', '#', '`', '>', '-', '•', '[', ']', '(', ')', '{', '}', '<',
        ] {
            assert!(!cleaned.contains(glyph), "glyph {glyph:?} survived");
        }
    }

    #[test]
    fn collapses_whitespace() {
        let cleaned = normalize("take   two\n\ntablets\t daily");
        assert_eq!(cleaned, "take two tablets daily");
        assert!(!cleaned.contains("  "));
    }

    #[test]
    fn trims_edges() {
        assert_eq!(normalize("  hello  "), "hello");
    }

    #[test]
    fn idempotent() {
        let inputs = [
            "**bold** and _italic_",
            "  spaced   out  ",
            "plain sentence already",
            "• bullet {one} <two>",
        ];
        for input in inputs {
            let once = normalize(input);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn applies_nfkc_composition() {
        // U+FB01 LATIN SMALL LIGATURE FI decomposes under NFKC
        assert_eq!(normalize("\u{fb01}nd"), "find");
    }

    #[test]
    fn empty_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("***"), "");
    }
}
