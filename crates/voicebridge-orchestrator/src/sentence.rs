//! Pure functions for the streaming state machine's sentence extraction.
//! Kept separate from the orchestrator loop so they stay trivially
//! testable, per the Design Notes. Grounded in the original's
//! `_has_open_tag`/`_extract_sentence`.

use regex::Regex;
use std::sync::OnceLock;

fn boundary_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[.!?](\s|$)").unwrap())
}

/// True while `text` has an unclosed `[...]` side-channel tag or an odd
/// number of triple-backtick fences — in either case extraction must wait
/// for more tokens rather than cut through the open construct.
#[must_use]
pub fn has_open_tag(text: &str) -> bool {
    let open = text.matches('[').count();
    let close = text.matches(']').count();
    let fences = text.matches("```").count();
    open > close || fences % 2 != 0
}

/// Finds the first sentence-terminator boundary at or past `min_len`.
/// Returns `(sentence, rest)` where `sentence` includes the terminator and
/// `rest` is left-trimmed, or `None` if no boundary qualifies yet.
#[must_use]
pub fn extract_sentence(buf: &str, min_len: usize) -> Option<(String, String)> {
    for m in boundary_re().find_iter(buf) {
        let end = m.end() - m.as_str().len() + 1; // position right after the terminator char
        if end >= min_len {
            let sentence = buf[..end].to_string();
            let rest = buf[end..].trim_start().to_string();
            return Some((sentence, rest));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_bracket_blocks_extraction() {
        assert!(has_open_tag("[CANVAS:x"));
        assert!(!has_open_tag("[CANVAS:x] done."));
    }

    #[test]
    fn odd_code_fence_count_blocks_extraction() {
        assert!(has_open_tag("here is ```code"));
        assert!(!has_open_tag("here is ```code``` done."));
    }

    #[test]
    fn extracts_first_sentence_past_min_len() {
        let buf = "This is a short sentence that is long enough. And more follows";
        let (sentence, rest) = extract_sentence(buf, 40).unwrap();
        assert_eq!(sentence, "This is a short sentence that is long enough.");
        assert_eq!(rest, "And more follows");
    }

    #[test]
    fn no_boundary_below_min_len_returns_none() {
        assert!(extract_sentence("Hi.", 40).is_none());
    }

    // Known limitation: abbreviations like "Dr." or "e.g." are not
    // special-cased and will cut the sentence early if they land past min_len.
    #[test]
    fn abbreviation_period_is_treated_as_a_boundary() {
        let buf = "Dr. Smith is here and this part pads it out past forty chars of text";
        let (sentence, _rest) = extract_sentence(buf, 3).unwrap();
        assert_eq!(sentence, "Dr.");
    }
}
