//! # Undercover Game Library
//!
//! This library provides the core game logic for the Undercover social
//! deduction word game. It handles round setup, secret role and word
//! assignment, elimination processing with win-condition evaluation,
//! Mr. White's final guess, scoring, and carrying totals across rounds.
//!
//! The crate is UI-agnostic: operations report [`game::Event`]s and the
//! embedding application decides what to show. Persistence goes through the
//! [`store::Store`] trait; an in-memory implementation ships for tests and
//! local play.

#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::ignored_unit_patterns)]
#![allow(clippy::doc_markdown)]

pub mod constants;

pub mod game;
pub mod player;
pub mod role;
pub mod round;
pub mod round_id;
pub mod scoring;
pub mod store;
pub mod word;

pub use game::{Event, Session, SetupConfig};
pub use role::{Role, RoleQuota};
pub use round::{Round, Status};
pub use round_id::RoundId;
pub use store::{MemoryStore, Store};
pub use word::{Difficulty, WordPair};
