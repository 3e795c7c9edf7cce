//! Per-round player state
//!
//! A [`Player`] records one identity's role, secret word, liveness, and
//! score for a single round. Role and word are immutable once dealt;
//! elimination is monotonic; the Mr. White guess verdict is set at most
//! once. These invariants are what make retried elimination and scoring
//! calls safe.

use serde::{Deserialize, Serialize};

use super::role::Role;

/// One player's state within a round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Stable identity, unique within a round
    username: String,
    /// Secret role, dealt once
    role: Role,
    /// Secret word, `None` for Mr. White
    word: Option<String>,
    /// Whether the player has been voted out this round
    eliminated: bool,
    /// Mr. White's guess verdict, set once when they guess
    is_mr_white_correct: Option<bool>,
    /// Points earned this round
    round_score: u64,
    /// Cumulative points across all rounds of the session
    total_score: u64,
}

impl Player {
    /// Deals a new player into a round
    ///
    /// `total_score` is the cumulative total carried over from previous
    /// rounds, zero for a first-time player.
    pub fn new(
        username: impl Into<String>,
        role: Role,
        word: Option<String>,
        total_score: u64,
    ) -> Self {
        Self {
            username: username.into(),
            role,
            word,
            eliminated: false,
            is_mr_white_correct: None,
            round_score: 0,
            total_score,
        }
    }

    /// The player's stable identity
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The player's secret role
    pub fn role(&self) -> Role {
        self.role
    }

    /// The player's secret word, `None` for Mr. White
    pub fn word(&self) -> Option<&str> {
        self.word.as_deref()
    }

    /// Whether the player is still in play
    pub fn is_alive(&self) -> bool {
        !self.eliminated
    }

    /// Whether the player has been eliminated
    pub fn is_eliminated(&self) -> bool {
        self.eliminated
    }

    /// Mr. White's guess verdict, if they have guessed
    pub fn is_mr_white_correct(&self) -> Option<bool> {
        self.is_mr_white_correct
    }

    /// Points earned this round
    pub fn round_score(&self) -> u64 {
        self.round_score
    }

    /// Cumulative points across the session
    pub fn total_score(&self) -> u64 {
        self.total_score
    }

    /// Marks the player eliminated
    ///
    /// Monotonic: eliminating an already-eliminated player changes nothing,
    /// so retried calls are harmless.
    pub fn eliminate(&mut self) {
        self.eliminated = true;
    }

    /// Records Mr. White's guess verdict
    ///
    /// The verdict sticks on first write; later calls are ignored.
    pub fn record_guess(&mut self, correct: bool) {
        if self.is_mr_white_correct.is_none() {
            self.is_mr_white_correct = Some(correct);
        }
    }

    /// Credits this round's score delta and folds it into the total
    pub fn apply_round_score(&mut self, delta: u64) {
        self.round_score = delta;
        self.total_score += delta;
    }
}
