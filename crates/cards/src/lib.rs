// Copyright (C) 2025 Set Authors
// SPDX-License-Identifier: Apache-2.0

//! Card feature encoding, deck construction, and the default legal-set
//! oracle for the card-matching game Set.
//!
//! This crate is pure and synchronous: no threads, no locks. The
//! concurrency engine in `setgame-core` treats everything here as an
//! external collaborator, reached only through
//! [`setgame_core::SetOracle`].
//!
//! ```
//! use setgame_cards::{Deck, StandardOracle};
//! use setgame_core::SetOracle;
//!
//! let mut deck = Deck::shuffled();
//! let cards: Vec<_> = std::iter::from_fn(|| deck.deal()).take(3).collect();
//!
//! let oracle = StandardOracle::new(3);
//! // Some triples are sets, some aren't; either way the call is total.
//! let _ = oracle.test_set(&cards);
//! ```
#![warn(clippy::all, rust_2018_idioms, missing_docs)]

mod deck;
mod oracle;

pub use deck::{DECK_SIZE, FEATURE_COUNT, FEATURE_VALUES, Deck};
pub use oracle::StandardOracle;
