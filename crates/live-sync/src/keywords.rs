//! Whole-word, case-insensitive title keyword matching.

use regex::{Regex, RegexBuilder};

/// Compiled keyword set of one guild.
///
/// An empty keyword list matches every title.
#[derive(Debug, Clone)]
pub struct KeywordFilter {
    pattern: Option<Regex>,
}

impl KeywordFilter {
    pub fn new<S: AsRef<str>>(keywords: &[S]) -> Result<Self, regex::Error> {
        let alternatives: Vec<String> = keywords
            .iter()
            .map(|k| k.as_ref().trim())
            .filter(|k| !k.is_empty())
            .map(regex::escape)
            .collect();
        if alternatives.is_empty() {
            return Ok(Self { pattern: None });
        }

        // Keywords may start or end with punctuation, so `\b` is not enough.
        let pattern = format!(
            r"(?:^|[^\p{{L}}\p{{N}}_])(?:{})(?:$|[^\p{{L}}\p{{N}}_])",
            alternatives.join("|")
        );
        let regex = RegexBuilder::new(&pattern).case_insensitive(true).build()?;
        Ok(Self {
            pattern: Some(regex),
        })
    }

    pub fn is_unrestricted(&self) -> bool {
        self.pattern.is_none()
    }

    pub fn matches(&self, title: &str) -> bool {
        match &self.pattern {
            Some(regex) => regex.is_match(title),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_list_matches_everything() {
        let filter = KeywordFilter::new::<&str>(&[]).unwrap();
        assert!(filter.is_unrestricted());
        assert!(filter.matches("anything at all"));
    }

    #[test]
    fn blank_keywords_are_ignored() {
        let filter = KeywordFilter::new(&["  ", ""]).unwrap();
        assert!(filter.is_unrestricted());
    }

    #[test]
    fn matches_whole_words_case_insensitively() {
        let filter = KeywordFilter::new(&["chili"]).unwrap();
        assert!(filter.matches("Weekend Chili Cook-off"));
        assert!(filter.matches("CHILI!"));
        assert!(filter.matches("chili"));
        assert!(!filter.matches("Weekend Pasta Night"));
        assert!(!filter.matches("chilis everywhere"));
        assert!(!filter.matches("redchili"));
        assert!(!filter.matches("chili_dogs"));
    }

    #[test]
    fn any_keyword_is_enough() {
        let filter = KeywordFilter::new(&["speedrun", "any%"]).unwrap();
        assert!(filter.matches("Mario any% attempts"));
        assert!(filter.matches("Speedrun practice"));
        assert!(!filter.matches("casual run"));
    }

    #[test]
    fn punctuation_keywords_are_literal() {
        let filter = KeywordFilter::new(&["c++"]).unwrap();
        assert!(filter.matches("Learning C++ today"));
        assert!(!filter.matches("Learning C today"));
    }

    #[test]
    fn multi_word_keywords_match_as_phrase() {
        let filter = KeywordFilter::new(&["world record"]).unwrap();
        assert!(filter.matches("New World Record pace"));
        assert!(!filter.matches("record of the world"));
    }

    #[test]
    fn non_ascii_letters_are_word_characters() {
        let filter = KeywordFilter::new(&["café"]).unwrap();
        assert!(filter.matches("Morning Café stream"));
        assert!(!filter.matches("cafés"));
    }
}
