//! Configuration constants for the Undercover game system
//!
//! This module contains the limits and point values used throughout the
//! round engine. Point values in particular are product policy rather than
//! rules of the game, so they live here as named constants.

/// Session and round configuration constants
pub mod session {
    /// Minimum number of players in a round
    pub const MIN_PLAYER_COUNT: usize = 4;
    /// Maximum number of players in a round
    pub const MAX_PLAYER_COUNT: usize = 12;
    /// Maximum number of Mr. White roles in a quota
    pub const MAX_MR_WHITE_COUNT: usize = 1;
}

/// Scoring point values
pub mod scoring {
    /// Base points for a surviving player of the winning role
    pub const BASE_WIN_POINTS: u64 = 100;
    /// Extra points for a winning Undercover
    pub const UNDERCOVER_WIN_BONUS: u64 = 50;
    /// Extra points for a Mr. White who guessed the civilian word
    pub const MR_WHITE_GUESS_BONUS: u64 = 100;
    /// Points deducted from an eliminated player of a losing role
    pub const ELIMINATION_PENALTY: i64 = 30;
}
