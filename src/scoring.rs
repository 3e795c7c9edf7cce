//! Round scoring
//!
//! Pure computation of per-player score deltas once a winner is known. The
//! caller (the elimination processor) applies the deltas to cumulative
//! totals under the round's `scored` guard; this module never mutates
//! anything.
//!
//! Point values live in [`crate::constants::scoring`]: they are product
//! policy and expected to be retuned.

use std::collections::HashMap;

use crate::constants::scoring::{
    BASE_WIN_POINTS, ELIMINATION_PENALTY, MR_WHITE_GUESS_BONUS, UNDERCOVER_WIN_BONUS,
};

use super::{player::Player, role::Role};

/// Computes each player's score delta for a finished round
///
/// - a surviving player of the winning role earns the base points, plus a
///   bonus when the winner is the Undercover;
/// - a Mr. White who won by guessing the civilian word earns base plus the
///   guess bonus, even though the guess mechanic marked them eliminated;
/// - an eliminated player of a losing role takes the elimination penalty;
/// - every delta is floored at zero.
pub fn round_deltas(players: &[Player], winner: Role) -> HashMap<String, u64> {
    players
        .iter()
        .map(|player| {
            let mut points: i64 = 0;

            if player.role() == Role::MrWhite
                && winner == Role::MrWhite
                && player.is_mr_white_correct() == Some(true)
            {
                points = (BASE_WIN_POINTS + MR_WHITE_GUESS_BONUS) as i64;
            } else if player.role() == winner && player.is_alive() {
                points = BASE_WIN_POINTS as i64;
                if winner == Role::Undercover {
                    points += UNDERCOVER_WIN_BONUS as i64;
                }
            } else if player.is_eliminated() && player.role() != winner {
                points -= ELIMINATION_PENALTY;
            }

            (player.username().to_owned(), points.max(0) as u64)
        })
        .collect()
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn make_player(username: &str, role: Role, eliminated: bool) -> Player {
        let mut player = Player::new(username, role, None, 0);
        if eliminated {
            player.eliminate();
        }
        player
    }

    #[test]
    fn test_surviving_civilian_winner_earns_base() {
        let players = vec![
            make_player("a", Role::Civilian, false),
            make_player("b", Role::Undercover, true),
        ];
        let deltas = round_deltas(&players, Role::Civilian);
        assert_eq!(deltas["a"], 100);
    }

    #[test]
    fn test_surviving_undercover_winner_earns_bonus() {
        let players = vec![
            make_player("a", Role::Civilian, true),
            make_player("b", Role::Undercover, false),
        ];
        let deltas = round_deltas(&players, Role::Undercover);
        assert_eq!(deltas["b"], 150);
    }

    #[test]
    fn test_mr_white_correct_guess_earns_double() {
        let mut mr_white = make_player("w", Role::MrWhite, true);
        mr_white.record_guess(true);
        let players = vec![make_player("a", Role::Civilian, true), mr_white];
        let deltas = round_deltas(&players, Role::MrWhite);
        assert_eq!(deltas["w"], 200);
    }

    #[test]
    fn test_mr_white_without_correct_guess_earns_nothing() {
        // Winner is Mr. White in name only if the verdict is missing.
        let players = vec![make_player("w", Role::MrWhite, true)];
        let deltas = round_deltas(&players, Role::MrWhite);
        assert_eq!(deltas["w"], 0);
    }

    #[test]
    fn test_eliminated_winner_role_earns_nothing() {
        let players = vec![make_player("a", Role::Civilian, true)];
        let deltas = round_deltas(&players, Role::Civilian);
        assert_eq!(deltas["a"], 0);
    }

    #[test]
    fn test_eliminated_loser_is_floored_at_zero() {
        let players = vec![make_player("b", Role::Undercover, true)];
        let deltas = round_deltas(&players, Role::Civilian);
        // The -30 penalty cannot push a round score below zero.
        assert_eq!(deltas["b"], 0);
    }

    #[test]
    fn test_surviving_loser_earns_nothing() {
        let players = vec![
            make_player("a", Role::Civilian, false),
            make_player("b", Role::Undercover, false),
        ];
        let deltas = round_deltas(&players, Role::Undercover);
        assert_eq!(deltas["a"], 0);
    }
}
