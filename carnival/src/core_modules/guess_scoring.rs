// THEORY:
// The `guess_scoring` module holds the rules of the word hunt, separated from the
// session that sequences them:
//
// 1.  **Sanitation**: a raw guess becomes a `Word` only after it is lower-cased,
//     stripped of everything outside `[a-z]` and truncated to ten letters. An
//     empty result never reaches the rest of the game. Because the `Word`
//     constructor is the only way in, every later comparison can be a plain
//     string equality.
// 2.  **Duplicate detection**: a word already in the result list is rejected and
//     does not count as an attempt.
// 3.  **Win detection**: a guess wins when it equals the target word.
// 4.  **Scoring**: a linear decay from 100 points, five points per extra attempt,
//     with a hard floor of 10.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum letters kept from a guess.
pub const MAX_WORD_LENGTH: usize = 10;

pub const MAX_SCORE: i64 = 100;
pub const ATTEMPT_PENALTY: i64 = 5;
pub const MIN_SCORE: i64 = 10;

/// A sanitized, non-empty guess.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Word(String);

impl Word {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Word {
    type Error = ValidationError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        sanitize(&raw)
    }
}

impl From<Word> for String {
    fn from(word: Word) -> Self {
        word.0
    }
}

/// One accepted guess and where the model placed it in latent space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub word: Word,
    pub coords: [f64; 2],
    /// Activation strength of the target feature for this word, if reported.
    pub scalar: Option<f64>,
}

/// The hidden answer and its latent coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub word: Word,
    pub coords: [f64; 2],
}

impl Target {
    pub fn new(word: &str, coords: [f64; 2]) -> Result<Self, ValidationError> {
        Ok(Self {
            word: sanitize(word)?,
            coords,
        })
    }
}

impl Default for Target {
    fn default() -> Self {
        Self {
            word: Word("water".to_string()),
            coords: [17.219, 7.771],
        }
    }
}

/// Lower-cases, keeps only `[a-z]`, truncates to ten letters.
pub fn sanitize(raw: &str) -> Result<Word, ValidationError> {
    let word: String = raw
        .chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_ascii_lowercase())
        .take(MAX_WORD_LENGTH)
        .collect();
    if word.is_empty() {
        return Err(ValidationError::EmptyGuess);
    }
    Ok(Word(word))
}

pub fn is_duplicate(results: &[SearchResult], word: &Word) -> bool {
    results.iter().any(|result| result.word == *word)
}

pub fn is_win(word: &Word, target: &Target) -> bool {
    *word == target.word
}

/// `max(100 - (attempts - 1) * 5, 10)`.
pub fn score(attempts: u32) -> u32 {
    let raw = MAX_SCORE - (attempts as i64 - 1) * ATTEMPT_PENALTY;
    raw.max(MIN_SCORE) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(word: &str) -> SearchResult {
        SearchResult {
            word: sanitize(word).unwrap(),
            coords: [0.0, 0.0],
            scalar: None,
        }
    }

    #[test]
    fn sanitize_lowercases_and_strips() {
        assert_eq!(sanitize("Water").unwrap().as_str(), "water");
        assert_eq!(sanitize(" s3a-W_e3d! ").unwrap().as_str(), "sawed");
        assert_eq!(sanitize("ÉCOLE").unwrap().as_str(), "cole");
    }

    #[test]
    fn sanitize_truncates_to_ten_letters() {
        assert_eq!(sanitize("Abcdefghijklmnop").unwrap().as_str(), "abcdefghij");
    }

    #[test]
    fn sanitize_rejects_empty() {
        assert_eq!(sanitize(""), Err(ValidationError::EmptyGuess));
        assert_eq!(sanitize("1234 !?"), Err(ValidationError::EmptyGuess));
    }

    #[test]
    fn duplicate_is_exact_on_sanitized_word() {
        let results = vec![result("cat"), result("dog")];
        assert!(is_duplicate(&results, &sanitize("CAT").unwrap()));
        assert!(!is_duplicate(&results, &sanitize("cats").unwrap()));
        assert!(!is_duplicate(&[], &sanitize("cat").unwrap()));
    }

    #[test]
    fn win_needs_exact_match() {
        let target = Target::default();
        assert!(is_win(&sanitize("WATER").unwrap(), &target));
        assert!(!is_win(&sanitize("waters").unwrap(), &target));
    }

    #[test]
    fn score_fixed_points() {
        assert_eq!(score(1), 100);
        assert_eq!(score(2), 95);
        assert_eq!(score(18), 15);
        assert_eq!(score(19), 10);
        assert_eq!(score(100), 10);
        assert_eq!(score(u32::MAX), 10);
    }

    #[test]
    fn score_is_non_increasing_with_floor() {
        let mut previous = score(0);
        for attempts in 1..500 {
            let current = score(attempts);
            assert!(current <= previous);
            assert!(current >= 10);
            previous = current;
        }
    }

    #[test]
    fn word_deserializes_through_sanitation() {
        let word: Word = serde_json::from_str("\"Rain!\"").unwrap();
        assert_eq!(word.as_str(), "rain");
        assert!(serde_json::from_str::<Word>("\"42\"").is_err());
        assert_eq!(serde_json::to_string(&word).unwrap(), "\"rain\"");
    }
}
