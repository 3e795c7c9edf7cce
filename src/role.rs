//! Roles and role quotas
//!
//! This module defines the three secret roles of the game and the per-round
//! quota describing how many players hold each role. It also implements the
//! random draw used to deal roles one player at a time without ever
//! exceeding the declared quota.

use enum_map::{Enum, EnumMap, enum_map};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A player's secret role for one round
///
/// Civilians and the Undercover each hold one of the round's two secret
/// words; Mr. White holds no word and must bluff.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Enum,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
pub enum Role {
    /// Majority role, holds the civilian word
    #[display("civilian")]
    Civilian,
    /// Minority role, holds the undercover word
    #[display("undercover")]
    Undercover,
    /// Holds no word at all
    #[display("mr. white")]
    MrWhite,
}

/// Errors that can occur while drawing roles
#[derive(Error, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Every role's quota has already been consumed
    #[error("every role's quota is already consumed")]
    PoolExhausted,
}

/// How many players hold each role in a round
///
/// The sum of the counts is the round's declared player count. Quotas are
/// immutable once a round is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleQuota(EnumMap<Role, usize>);

impl RoleQuota {
    /// Creates a quota from explicit per-role counts
    pub fn new(civilian: usize, undercover: usize, mr_white: usize) -> Self {
        Self(enum_map! {
            Role::Civilian => civilian,
            Role::Undercover => undercover,
            Role::MrWhite => mr_white,
        })
    }

    /// The default quota for a player count: one Undercover, one Mr. White,
    /// civilians for everyone else
    pub fn standard(player_count: usize) -> Self {
        Self::new(player_count.saturating_sub(2), 1, 1)
    }

    /// Number of players holding `role`
    pub fn count(&self, role: Role) -> usize {
        self.0[role]
    }

    /// Total number of players described by this quota
    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    /// Draws one role uniformly at random from the remaining pool
    ///
    /// `assigned` holds the number of roles already dealt this round. The
    /// draw never exceeds the quota of any role.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PoolExhausted`] if every role's quota is already
    /// consumed. This cannot happen as long as callers deal at most
    /// [`total`](Self::total) roles per round.
    pub fn draw(&self, assigned: &EnumMap<Role, usize>) -> Result<Role, Error> {
        let remaining: EnumMap<Role, usize> = self
            .0
            .map(|role, count| count.saturating_sub(assigned[role]));

        let pool_size: usize = remaining.values().sum();
        if pool_size == 0 {
            return Err(Error::PoolExhausted);
        }

        let mut pick = fastrand::usize(..pool_size);
        for (role, count) in remaining {
            if pick < count {
                return Ok(role);
            }
            pick -= count;
        }

        // Unreachable: pick < pool_size and the counts sum to pool_size.
        Err(Error::PoolExhausted)
    }
}
