//! Secret words and word pairs
//!
//! Each round is played over a pair of related secret words: the civilian
//! word dealt to civilians and the undercover word dealt to the Undercover.
//! The pair is drawn at random from the word library for the session's
//! difficulty.

use serde::{Deserialize, Serialize};

/// Difficulty of the word library a round draws from
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Everyday words with an obvious connection
    #[default]
    #[display("easy")]
    Easy,
    /// Closely related words that are hard to tell apart
    #[display("hard")]
    Hard,
}

/// The two related secret words of one round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordPair {
    /// Word dealt to civilians
    pub civilian: String,
    /// Word dealt to the Undercover
    pub undercover: String,
}

impl WordPair {
    /// Creates a word pair from the civilian and undercover words
    pub fn new(civilian: impl Into<String>, undercover: impl Into<String>) -> Self {
        Self {
            civilian: civilian.into(),
            undercover: undercover.into(),
        }
    }

    /// Picks one pair uniformly at random, or `None` if the list is empty
    pub fn pick(pairs: &[WordPair]) -> Option<&WordPair> {
        if pairs.is_empty() {
            None
        } else {
            pairs.get(fastrand::usize(..pairs.len()))
        }
    }
}

/// Checks a Mr. White guess against a secret word
///
/// Matching is case-insensitive and ignores surrounding whitespace.
pub fn guess_matches(secret: &str, guess: &str) -> bool {
    secret.trim().to_lowercase() == guess.trim().to_lowercase()
}
