//! Prose segmentation shared by extraction and scorers

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref RE_PARAGRAPH_BREAK: Regex = Regex::new(r"\n[ \t\r]*\n").unwrap();
    static ref RE_SENTENCE: Regex = Regex::new(r"[^.!?…]+[.!?…]*").unwrap();
    static ref RE_WORD: Regex = Regex::new(r"[\p{L}\p{N}]+(?:['’-][\p{L}\p{N}]+)*").unwrap();
}

/// Paragraphs separated by blank lines, trimmed, empties dropped
pub fn split_paragraphs(prose: &str) -> Vec<&str> {
    RE_PARAGRAPH_BREAK
        .split(prose)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

/// Sentences containing at least one word
pub fn split_sentences(text: &str) -> Vec<&str> {
    RE_SENTENCE
        .find_iter(text)
        .map(|m| m.as_str().trim())
        .filter(|s| RE_WORD.is_match(s))
        .collect()
}

/// Lowercased words
pub fn words(text: &str) -> Vec<String> {
    RE_WORD
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

pub fn word_count(text: &str) -> usize {
    RE_WORD.find_iter(text).count()
}
