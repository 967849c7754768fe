// Copyright (C) 2025 Set Authors
// SPDX-License-Identifier: Apache-2.0

//! Deck construction and shuffling for the classic 81-card Set deck.
use rand::{seq::SliceRandom, thread_rng};

use setgame_core::Card;

/// Number of card features (count, color, shape, shading).
pub const FEATURE_COUNT: u32 = 4;
/// Number of values each feature can take.
pub const FEATURE_VALUES: u32 = 3;
/// Total deck size, `FEATURE_VALUES ^ FEATURE_COUNT`.
pub const DECK_SIZE: usize = 81;

/// An ordered, shuffleable sequence of the full 81-card deck.
///
/// Cards are dealt from the back, mirroring how the engine's own
/// dealer-private deck is used (`deck.pop()` off a shuffled `Vec`).
#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// Builds the full, unshuffled deck: ids `0..DECK_SIZE`.
    pub fn new() -> Self {
        Self {
            cards: (0..DECK_SIZE as Card).collect(),
        }
    }

    /// Builds a deck already shuffled with the thread-local RNG.
    pub fn shuffled() -> Self {
        let mut deck = Self::new();
        deck.shuffle();
        deck
    }

    /// Shuffles the deck in place.
    pub fn shuffle(&mut self) {
        self.cards.shuffle(&mut thread_rng());
    }

    /// Deals (pops) the top card, if any remain.
    pub fn deal(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    /// Number of cards remaining.
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// True if no cards remain.
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// The cards remaining, in dealing order (next card last).
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn fresh_deck_has_every_card_once() {
        let deck = Deck::new();
        assert_eq!(deck.len(), DECK_SIZE);
        let unique: HashSet<_> = deck.cards().iter().copied().collect();
        assert_eq!(unique.len(), DECK_SIZE);
    }

    #[test]
    fn shuffle_preserves_cardinality() {
        let mut deck = Deck::shuffled();
        let mut dealt = HashSet::new();
        while let Some(card) = deck.deal() {
            assert!(dealt.insert(card), "card {card} dealt twice");
        }
        assert_eq!(dealt.len(), DECK_SIZE);
    }

    #[test]
    fn dealing_from_empty_deck_yields_none() {
        let mut deck = Deck::new();
        for _ in 0..DECK_SIZE {
            deck.deal();
        }
        assert_eq!(deck.deal(), None);
    }
}
