//! Persistence collaborator
//!
//! This module defines the trait through which the round engine reads and
//! writes game state. The engine treats every call as fallible and
//! retryable; it never retries by itself, and all of its operations are
//! written so that retrying the whole call after a failure is safe.
//!
//! Network or database implementations live outside this crate. The
//! in-memory [`MemoryStore`] ships as the reference implementation and the
//! test vehicle.

use std::collections::HashMap;

use thiserror::Error;

use super::{
    player::Player,
    round::Round,
    round_id::RoundId,
    word::{Difficulty, WordPair},
};

/// Errors reported by a persistence collaborator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The requested round does not exist
    #[error("round {0} not found")]
    RoundNotFound(RoundId),
    /// The backing storage failed; the operation may be retried
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Trait for reading and writing game state
///
/// Rounds are persisted as whole aggregates; the player-level operations
/// have default implementations in terms of the round-level ones, so a
/// minimal implementation only provides `get_round`, `put_round`, and
/// `word_pairs`.
pub trait Store {
    /// Reads a round by id
    ///
    /// # Errors
    ///
    /// Returns [`Error::RoundNotFound`] for unknown ids, or
    /// [`Error::Unavailable`] on storage failure.
    fn get_round(&self, id: RoundId) -> Result<Round, Error>;

    /// Writes a round, replacing any stored version
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unavailable`] on storage failure.
    fn put_round(&mut self, round: &Round) -> Result<(), Error>;

    /// Lists the word pairs available for a difficulty
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unavailable`] on storage failure.
    fn word_pairs(&self, difficulty: Difficulty) -> Result<Vec<WordPair>, Error>;

    /// Reads all players of a round
    ///
    /// # Errors
    ///
    /// Propagates the errors of [`get_round`](Self::get_round).
    fn get_players(&self, id: RoundId) -> Result<Vec<Player>, Error> {
        Ok(self.get_round(id)?.players().to_vec())
    }

    /// Writes a single player record back into its round
    ///
    /// # Errors
    ///
    /// Propagates the errors of [`get_round`](Self::get_round) and
    /// [`put_round`](Self::put_round).
    fn put_player(&mut self, id: RoundId, player: &Player) -> Result<(), Error> {
        let mut round = self.get_round(id)?;
        round.upsert_player(player.clone());
        self.put_round(&round)
    }
}

/// In-memory store keyed by round id
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    rounds: HashMap<RoundId, Round>,
    words: HashMap<Difficulty, Vec<WordPair>>,
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a word pair to the library for a difficulty
    pub fn add_word_pair(&mut self, difficulty: Difficulty, pair: WordPair) {
        self.words.entry(difficulty).or_default().push(pair);
    }
}

impl Store for MemoryStore {
    fn get_round(&self, id: RoundId) -> Result<Round, Error> {
        self.rounds.get(&id).cloned().ok_or(Error::RoundNotFound(id))
    }

    fn put_round(&mut self, round: &Round) -> Result<(), Error> {
        self.rounds.insert(round.id(), round.clone());
        Ok(())
    }

    fn word_pairs(&self, difficulty: Difficulty) -> Result<Vec<WordPair>, Error> {
        Ok(self.words.get(&difficulty).cloned().unwrap_or_default())
    }
}
