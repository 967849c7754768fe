// Copyright (C) 2025 Set Authors
// SPDX-License-Identifier: Apache-2.0

//! The legal-set oracle boundary.
//!
//! Card identity and the legality predicate are owned by an external
//! collaborator (see `setgame-cards` for the reference implementation); the
//! engine only ever calls through this trait.

/// An opaque card identifier, `0 <= c < deck_size`.
pub type Card = u32;

/// Deck feature encoding and legality predicate, supplied externally.
///
/// Implementations must be pure and thread-safe: `test_set` and `find_sets`
/// may be called concurrently from the dealer thread and, for hints, from
/// whichever thread services the UI.
pub trait SetOracle: Send + Sync {
    /// Returns true if `cards` form a legal set.
    ///
    /// `cards.len()` is always `feature_size` (the configured `SET_SIZE`).
    fn test_set(&self, cards: &[Card]) -> bool;

    /// Returns up to `limit` legal sets found among `cards`.
    fn find_sets(&self, cards: &[Card], limit: usize) -> Vec<Vec<Card>>;

    /// Decodes `cards` into their feature vectors, for hint display only.
    fn cards_to_features(&self, cards: &[Card]) -> Vec<Vec<u8>>;
}
