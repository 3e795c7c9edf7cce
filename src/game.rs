//! Session lifecycle and elimination processing
//!
//! This module contains the [`Session`] orchestrator that drives a game
//! across rounds: starting a round, dealing players in, processing
//! eliminations and Mr. White's final guess, scoring, and rolling over into
//! the next round. Every operation reads the round from the persistence
//! collaborator, mutates that copy, and writes it back whole, so a failed
//! write leaves the stored state untouched and the entire call can be
//! retried.
//!
//! State transitions are reported to the caller as [`Event`]s; the
//! surrounding UI decides what screen to show next, never this crate.

use std::collections::HashMap;

use garde::Validate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use thiserror::Error;

use crate::constants::session::{MAX_MR_WHITE_COUNT, MAX_PLAYER_COUNT, MIN_PLAYER_COUNT};

use super::{
    player::Player,
    role::{Role, RoleQuota},
    round::{self, Round, Status},
    round_id::RoundId,
    scoring,
    store::{self, Store},
    word::{self, Difficulty, WordPair},
};

/// Errors reported by session operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A round-level invariant was violated
    #[error(transparent)]
    Round(#[from] round::Error),
    /// The persistence collaborator failed; the whole call may be retried
    #[error(transparent)]
    Store(#[from] store::Error),
    /// The word library has no pairs for the requested difficulty
    #[error("no word pairs available for difficulty {0}")]
    NoWordsAvailable(Difficulty),
    /// The setup configuration failed validation
    #[error("invalid setup: {0}")]
    InvalidConfig(String),
    /// A next round was requested before the current one finished
    #[error("the round is still in progress")]
    RoundInProgress,
    /// A guess was submitted for a round with no Mr. White
    #[error("this round has no mr. white")]
    NoMrWhite,
}

/// Validates that a quota describes a playable game
///
/// Custom validation function for use with the `garde` crate: the total
/// must fall in the supported player range, civilians and the Undercover
/// must be present, and at most one Mr. White is supported.
fn quota_is_playable(quota: &RoleQuota, _ctx: &()) -> garde::Result {
    let total = quota.total();
    if !(MIN_PLAYER_COUNT..=MAX_PLAYER_COUNT).contains(&total) {
        return Err(garde::Error::new(format!(
            "player count {total} outside of bounds [{MIN_PLAYER_COUNT},{MAX_PLAYER_COUNT}]",
        )));
    }
    if quota.count(Role::Civilian) < 1 {
        return Err(garde::Error::new("at least one civilian is required"));
    }
    if quota.count(Role::Undercover) < 1 {
        return Err(garde::Error::new("at least one undercover is required"));
    }
    if quota.count(Role::MrWhite) > MAX_MR_WHITE_COUNT {
        return Err(garde::Error::new(format!(
            "at most {MAX_MR_WHITE_COUNT} mr. white is supported",
        )));
    }
    Ok(())
}

/// Configuration a session is created with
///
/// The quota and difficulty are fixed for the lifetime of the session and
/// reused by every round it creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct SetupConfig {
    /// How many players hold each role
    #[garde(custom(quota_is_playable))]
    pub quota: RoleQuota,
    /// Which word library rounds draw from
    #[garde(skip)]
    pub difficulty: Difficulty,
}

/// Outcome of a session operation, reported to the navigation collaborator
///
/// The core never navigates; it tells the caller what happened and the
/// surrounding UI chooses the next screen.
#[skip_serializing_none]
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub enum Event {
    /// A role and word were dealt (or re-reported) to a player
    RoleAssigned {
        /// The player's identity
        username: String,
        /// The dealt role
        role: Role,
        /// The dealt word, absent for Mr. White
        word: Option<String>,
    },
    /// An elimination was recorded and the round continues
    EliminationRecorded {
        /// The eliminated player
        username: String,
    },
    /// The eliminated player is Mr. White; their final guess is pending
    MrWhiteGuessRequired {
        /// The eliminated Mr. White
        username: String,
    },
    /// The round is over
    RoundFinished {
        /// The winning role
        winner: Role,
    },
}

impl Event {
    /// Converts the event to a JSON string for the caller
    ///
    /// # Panics
    ///
    /// This method panics if serialization fails, which should never happen
    /// with the default JSON serializer for well-formed data.
    pub fn to_message(&self) -> String {
        serde_json::to_string(self).expect("default serializer cannot fail")
    }
}

/// A game session: one group of players across consecutive rounds
///
/// The session owns the setup configuration and the ordered history of
/// round ids. Round state itself lives in the persistence collaborator,
/// passed into each operation by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Quota and difficulty shared by every round
    config: SetupConfig,
    /// Round ids in creation order, most recent last
    rounds: Vec<RoundId>,
}

impl Session {
    /// Creates a session with a validated configuration
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the quota is not playable.
    pub fn new(config: SetupConfig) -> Result<Self, Error> {
        config
            .validate()
            .map_err(|report| Error::InvalidConfig(report.to_string()))?;
        Ok(Self {
            config,
            rounds: Vec::new(),
        })
    }

    /// The configuration this session was created with
    pub fn config(&self) -> SetupConfig {
        self.config
    }

    /// Round ids in creation order
    pub fn rounds(&self) -> &[RoundId] {
        &self.rounds
    }

    /// The most recently created round, if any
    pub fn current_round(&self) -> Option<RoundId> {
        self.rounds.last().copied()
    }

    fn create_round<S: Store>(
        &mut self,
        store: &mut S,
        carried_totals: HashMap<String, u64>,
    ) -> Result<RoundId, Error> {
        let pairs = store.word_pairs(self.config.difficulty)?;
        let words = WordPair::pick(&pairs)
            .cloned()
            .ok_or(Error::NoWordsAvailable(self.config.difficulty))?;

        let mut round = Round::new(
            RoundId::new(),
            self.config.quota,
            words,
            self.config.difficulty,
        );
        round.carry_totals(carried_totals);

        store.put_round(&round)?;
        self.rounds.push(round.id());
        Ok(round.id())
    }

    /// Starts a fresh round with no players
    ///
    /// Draws one word pair at random from the library for the session's
    /// difficulty and persists the round in setup state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoWordsAvailable`] if the library is empty for the
    /// difficulty, or a store error.
    pub fn start_round<S: Store>(&mut self, store: &mut S) -> Result<RoundId, Error> {
        self.create_round(store, HashMap::new())
    }

    /// Deals a role and word to a player, idempotently per identity
    ///
    /// A player who already drew gets their stored assignment reported
    /// again; nothing is redrawn on a repeated call.
    ///
    /// # Errors
    ///
    /// Returns [`role::Error::PoolExhausted`](crate::role::Error) (wrapped)
    /// if more identities join than the quota declares, or a store error.
    pub fn join_round<S: Store>(
        &self,
        store: &mut S,
        round_id: RoundId,
        username: &str,
    ) -> Result<Event, Error> {
        let mut round = store.get_round(round_id)?;

        let event = {
            let player = round.join(username)?;
            Event::RoleAssigned {
                username: player.username().to_owned(),
                role: player.role(),
                word: player.word().map(str::to_owned),
            }
        };

        store.put_round(&round)?;
        Ok(event)
    }

    /// Processes the elimination of a player
    ///
    /// Marks the player eliminated, then either hands control to the Mr.
    /// White guess sub-state or evaluates the win condition, scoring the
    /// round at most once. Calling this again for a finished round is a
    /// no-op reporting the stored winner, so retries are always safe.
    ///
    /// # Errors
    ///
    /// Returns [`round::Error::NotInPlay`] (wrapped) while players are
    /// still drawing, [`round::Error::PlayerNotFound`] (wrapped) for an
    /// unknown identity, or a store error. On a store error nothing has
    /// been persisted and the caller may retry the whole call.
    pub fn eliminate<S: Store>(
        &self,
        store: &mut S,
        round_id: RoundId,
        username: &str,
    ) -> Result<Event, Error> {
        let mut round = store.get_round(round_id)?;

        if let Some(winner) = round.winner() {
            return Ok(Event::RoundFinished { winner });
        }

        let role = round.eliminate(username)?;

        if role == Role::MrWhite {
            // Mr. White gets one guess at the civilian word before any
            // winner is evaluated.
            store.put_round(&round)?;
            return Ok(Event::MrWhiteGuessRequired {
                username: username.to_owned(),
            });
        }

        let event = Self::settle(&mut round, username);
        store.put_round(&round)?;
        Ok(event)
    }

    /// Processes Mr. White's final guess at the civilian word
    ///
    /// A correct guess (case-insensitive, trimmed) wins the round outright
    /// for Mr. White and eliminates everyone else; a wrong guess records
    /// the verdict and falls through to normal win evaluation. Submitting
    /// against a finished round is a no-op reporting the stored winner.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoMrWhite`] if the round has none, or a store
    /// error.
    pub fn submit_mr_white_guess<S: Store>(
        &self,
        store: &mut S,
        round_id: RoundId,
        guess: &str,
    ) -> Result<Event, Error> {
        let mut round = store.get_round(round_id)?;

        if let Some(winner) = round.winner() {
            return Ok(Event::RoundFinished { winner });
        }

        let username = round
            .mr_white()
            .map(|p| p.username().to_owned())
            .ok_or(Error::NoMrWhite)?;

        let correct = word::guess_matches(&round.words().civilian, guess);
        round.record_mr_white_guess(correct);

        if correct {
            round.eliminate_all_except(Role::MrWhite);
            round.finish(Role::MrWhite);
        }

        let event = Self::settle(&mut round, &username);
        store.put_round(&round)?;
        Ok(event)
    }

    /// Evaluates the round and applies scoring exactly once
    fn settle(round: &mut Round, username: &str) -> Event {
        match round.evaluate() {
            Some(winner) => {
                if !round.is_scored() {
                    let deltas = scoring::round_deltas(round.players(), winner);
                    round.apply_scores(&deltas);
                }
                Event::RoundFinished { winner }
            }
            None => Event::EliminationRecorded {
                username: username.to_owned(),
            },
        }
    }

    /// Creates the next round from a finished one
    ///
    /// Reuses the session's quota and difficulty, draws a fresh word pair,
    /// and carries each known identity's cumulative total into the new
    /// round. Roles are not reassigned until players re-draw.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RoundInProgress`] if the given round has not
    /// finished, [`Error::NoWordsAvailable`] if the library is empty, or a
    /// store error.
    pub fn next_round<S: Store>(
        &mut self,
        store: &mut S,
        finished: RoundId,
    ) -> Result<RoundId, Error> {
        let previous = store.get_round(finished)?;
        if previous.status() != Status::Finished {
            return Err(Error::RoundInProgress);
        }

        let carried_totals = previous
            .players()
            .iter()
            .map(|p: &Player| (p.username().to_owned(), p.total_score()))
            .collect();

        self.create_round(store, carried_totals)
    }

    /// Cumulative standings for a round, highest total first
    ///
    /// # Errors
    ///
    /// Returns a store error if the round cannot be read.
    pub fn standings<S: Store>(
        &self,
        store: &S,
        round_id: RoundId,
    ) -> Result<Vec<(String, u64)>, Error> {
        Ok(store
            .get_players(round_id)?
            .into_iter()
            .map(|p| (p.username().to_owned(), p.total_score()))
            .sorted_by_key(|(_, total)| std::cmp::Reverse(*total))
            .collect())
    }
}
