use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

/// Tokens shorter than this are not indexed.
pub const MIN_TERM_LEN: usize = 3;

lazy_static! {
    static ref NON_LETTER: Regex = Regex::new(r"[^a-z\s]").expect("valid regex");
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "the","a","an","and","or","but","in","on","at","to","for","of","with","by",
            "is","are","was","were","be","been","have","has","had","do","does","did",
            "will","would","could","should","may","might","must",
            "this","that","these","those",
            "i","you","he","she","it","we","they","me","him","her","us","them",
        ];
        words.iter().copied().collect()
    };
}

pub fn is_stopword(token: &str) -> bool { STOPWORDS.contains(token) }

/// Turn raw text into index terms: NFKC fold, lowercase, drop everything that is not
/// an ASCII letter or whitespace, split, then filter short tokens and stopwords.
///
/// Digits and punctuation are removed in place rather than splitting the token, so
/// `"co2"` becomes `"co"` (and is then too short to keep).
pub fn normalize(text: &str) -> Vec<String> {
    let lowered = text.nfkc().collect::<String>().to_lowercase();
    let letters = NON_LETTER.replace_all(&lowered, "");
    letters
        .split_whitespace()
        .filter(|token| token.len() >= MIN_TERM_LEN && !is_stopword(token))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_normalize() {
        let t = normalize("The Cat sat on the mat, with another cat!");
        assert_eq!(t, vec!["cat", "sat", "mat", "another", "cat"]);
    }

    #[test]
    fn digits_are_stripped_not_split() {
        assert_eq!(normalize("co2 levels 2024 h2o"), vec!["levels"]);
        assert_eq!(normalize("don't stop"), vec!["dont", "stop"]);
    }

    #[test]
    fn empty_and_symbol_only_input() {
        assert!(normalize("").is_empty());
        assert!(normalize("  12 34 -- !! ").is_empty());
    }
}
