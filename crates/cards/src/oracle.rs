// Copyright (C) 2025 Set Authors
// SPDX-License-Identifier: Apache-2.0

//! The default legal-set oracle: classic 4-feature/3-value Set.
use setgame_core::{Card, SetOracle};

use crate::deck::FEATURE_COUNT;

/// Default [`SetOracle`] for the classic 81-card deck.
///
/// A card id is a base-3 number over [`crate::FEATURE_COUNT`] digits, one
/// per feature (count, color, shape, shading); a group of cards is a legal
/// set iff, for every feature, the group's values are either all equal or
/// pairwise distinct. That rule generalizes cleanly to any group size
/// `>= 2`, so `group_size` (the configured `feature_size`/`SET_SIZE`) is
/// carried on the oracle itself rather than baked into the classic `3`.
#[derive(Debug, Clone, Copy)]
pub struct StandardOracle {
    group_size: usize,
}

impl StandardOracle {
    /// Creates an oracle whose sets contain exactly `group_size` cards.
    pub fn new(group_size: usize) -> Self {
        Self { group_size }
    }

    fn features(card: Card) -> [u8; FEATURE_COUNT as usize] {
        let mut value = card;
        let mut features = [0u8; FEATURE_COUNT as usize];
        for f in &mut features {
            *f = (value % 3) as u8;
            value /= 3;
        }
        features
    }

    fn find_combinations(&self, cards: &[Card], start: usize, combo: &mut Vec<Card>, found: &mut Vec<Vec<Card>>, limit: usize) {
        if found.len() >= limit {
            return;
        }
        if combo.len() == self.group_size {
            if self.test_set(combo) {
                found.push(combo.clone());
            }
            return;
        }

        for i in start..cards.len() {
            if found.len() >= limit {
                return;
            }
            combo.push(cards[i]);
            self.find_combinations(cards, i + 1, combo, found, limit);
            combo.pop();
        }
    }
}

impl Default for StandardOracle {
    fn default() -> Self {
        Self { group_size: 3 }
    }
}

impl SetOracle for StandardOracle {
    fn test_set(&self, cards: &[Card]) -> bool {
        if cards.len() < 2 {
            return false;
        }

        let features: Vec<_> = cards.iter().map(|&c| Self::features(c)).collect();
        (0..FEATURE_COUNT as usize).all(|feature| {
            let values: Vec<u8> = features.iter().map(|f| f[feature]).collect();
            all_equal(&values) || all_distinct(&values)
        })
    }

    fn find_sets(&self, cards: &[Card], limit: usize) -> Vec<Vec<Card>> {
        let mut found = Vec::new();
        if limit == 0 || cards.len() < self.group_size {
            return found;
        }

        let mut combo = Vec::with_capacity(self.group_size);
        self.find_combinations(cards, 0, &mut combo, &mut found, limit);
        found
    }

    fn cards_to_features(&self, cards: &[Card]) -> Vec<Vec<u8>> {
        cards.iter().map(|&c| Self::features(c).to_vec()).collect()
    }
}

fn all_equal(values: &[u8]) -> bool {
    values.windows(2).all(|w| w[0] == w[1])
}

fn all_distinct(values: &[u8]) -> bool {
    for i in 0..values.len() {
        for j in (i + 1)..values.len() {
            if values[i] == values[j] {
                return false;
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_cards_are_not_a_set() {
        let oracle = StandardOracle::new(3);
        assert!(!oracle.test_set(&[0, 0, 0]));
    }

    #[test]
    fn all_same_card_feature_combos() {
        // 0, 1, 2 differ only in the lowest-order feature (all-distinct
        // there, all-equal on every other feature): a legal set.
        let oracle = StandardOracle::new(3);
        assert!(oracle.test_set(&[0, 1, 2]));
    }

    #[test]
    fn two_same_one_different_is_not_a_set() {
        // Cards 0 and 1 share every feature but the lowest; card 3 differs
        // on the next feature too, breaking the all-equal/all-distinct rule.
        let oracle = StandardOracle::new(3);
        assert!(!oracle.test_set(&[0, 1, 3]));
    }

    #[test]
    fn find_sets_respects_limit() {
        let oracle = StandardOracle::new(3);
        let all_cards: Vec<Card> = (0..81).collect();
        let sets = oracle.find_sets(&all_cards, 5);
        assert_eq!(sets.len(), 5);
        for set in &sets {
            assert!(oracle.test_set(set));
        }
    }

    #[test]
    fn find_sets_on_too_few_cards_is_empty() {
        let oracle = StandardOracle::new(3);
        assert!(oracle.find_sets(&[0, 1], 10).is_empty());
    }

    #[test]
    fn cards_to_features_decodes_base_three() {
        let oracle = StandardOracle::new(3);
        assert_eq!(oracle.cards_to_features(&[0]), vec![vec![0, 0, 0, 0]]);
        assert_eq!(oracle.cards_to_features(&[80]), vec![vec![2, 2, 2, 2]]);
    }
}
