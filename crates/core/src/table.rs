// Copyright (C) 2025 Set Authors
// SPDX-License-Identifier: Apache-2.0

//! Table state: slot<->card bidirection and per-slot token lists.
use ahash::AHashSet;
use log::warn;
use parking_lot::Mutex;
use std::{sync::Arc, thread, time::Duration};

use crate::{oracle::Card, player::PlayerId, ui::UiSink};

/// Shared table state, synchronized under a single table-wide lock.
///
/// The slot-to-card map and its inverse are written only by the dealer
/// thread; the token lists are written by any player thread and by the
/// dealer (while removing cards). Putting all three behind one lock keeps
/// every token/card invariant trivially true without separate visibility
/// reasoning for the card maps -- the cost is that a player placing a token
/// briefly contends with the dealer mutating cards, an acceptable trade
/// against a finer-grained per-slot lock scheme.
#[derive(Debug)]
pub struct Table {
    inner: Mutex<Inner>,
    ui: Arc<dyn UiSink>,
    delay: Duration,
}

#[derive(Debug)]
struct Inner {
    slot_to_card: Vec<Option<Card>>,
    card_to_slot: Vec<Option<usize>>,
    tokens: Vec<AHashSet<PlayerId>>,
}

impl Table {
    /// Creates an empty table with `table_size` slots over a `deck_size` card
    /// universe.
    pub fn new(table_size: usize, deck_size: usize, delay: Duration, ui: Arc<dyn UiSink>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                slot_to_card: vec![None; table_size],
                card_to_slot: vec![None; deck_size],
                tokens: (0..table_size).map(|_| AHashSet::new()).collect(),
            }),
            ui,
            delay,
        }
    }

    /// Number of slots on this table.
    pub fn len(&self) -> usize {
        self.inner.lock().slot_to_card.len()
    }

    /// True if there are no slots (degenerate, kept for API symmetry).
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dealer-only: places `card` in `slot`.
    ///
    /// Precondition: `slot` is empty and `card` is not already on the table.
    /// A violated precondition is a programming error: logged and dropped
    /// rather than panicking.
    pub fn place_card(&self, card: Card, slot: usize) {
        thread::sleep(self.delay);

        let mut inner = self.inner.lock();
        if inner.slot_to_card[slot].is_some() || inner.card_to_slot[card as usize].is_some() {
            warn!("place_card contract violation: slot={slot} card={card}");
            return;
        }

        inner.slot_to_card[slot] = Some(card);
        inner.card_to_slot[card as usize] = Some(slot);
        drop(inner);

        self.ui.place_card(card, slot);
    }

    /// Dealer-only: removes the card in `slot`, if any, clearing every token
    /// on that slot first. A no-op on an already-empty slot.
    pub fn remove_card(&self, slot: usize) -> Option<Card> {
        thread::sleep(self.delay);

        let (card, removed_tokens) = {
            let mut inner = self.inner.lock();
            let Some(card) = inner.slot_to_card[slot].take() else {
                return None;
            };
            inner.card_to_slot[card as usize] = None;
            let removed_tokens: Vec<PlayerId> = inner.tokens[slot].drain().collect();
            (card, removed_tokens)
        };

        for player in removed_tokens {
            self.ui.remove_token(player, slot);
        }
        self.ui.remove_card(slot);

        Some(card)
    }

    /// Dealer-only: clears every occupied slot, returning the cards removed.
    pub fn remove_all_cards(&self) -> Vec<Card> {
        let occupied: Vec<usize> = {
            let inner = self.inner.lock();
            (0..inner.slot_to_card.len())
                .filter(|&s| inner.slot_to_card[s].is_some())
                .collect()
        };

        occupied
            .into_iter()
            .filter_map(|slot| self.remove_card(slot))
            .collect()
    }

    /// True if `slot` currently holds a card.
    pub fn slot_has_card(&self, slot: usize) -> bool {
        self.inner.lock().slot_to_card[slot].is_some()
    }

    /// Places `player`'s token on `slot`. No-op if the slot is empty.
    /// Returns whether a token was actually placed.
    pub fn place_token(&self, player: PlayerId, slot: usize) -> bool {
        let mut inner = self.inner.lock();
        if inner.slot_to_card[slot].is_none() {
            return false;
        }
        let placed = inner.tokens[slot].insert(player);
        drop(inner);

        if placed {
            self.ui.place_token(player, slot);
        }
        placed
    }

    /// Removes one occurrence of `player`'s token from `slot`. Returns
    /// whether a token was actually removed.
    pub fn remove_token(&self, player: PlayerId, slot: usize) -> bool {
        let removed = self.inner.lock().tokens[slot].remove(&player);
        if removed {
            self.ui.remove_token(player, slot);
        }
        removed
    }

    /// True if `player` has a token on `slot`.
    pub fn has_token(&self, player: PlayerId, slot: usize) -> bool {
        self.inner.lock().tokens[slot].contains(&player)
    }

    /// Cards (not slots) currently tokened by `player`, in slot order.
    pub fn player_cards(&self, player: PlayerId) -> Vec<Card> {
        let inner = self.inner.lock();
        inner
            .tokens
            .iter()
            .enumerate()
            .filter(|(_, toks)| toks.contains(&player))
            .filter_map(|(slot, _)| inner.slot_to_card[slot])
            .collect()
    }

    /// Slots currently tokened by `player`, in slot order.
    pub fn player_slots(&self, player: PlayerId) -> Vec<usize> {
        let inner = self.inner.lock();
        inner
            .tokens
            .iter()
            .enumerate()
            .filter(|(_, toks)| toks.contains(&player))
            .map(|(slot, _)| slot)
            .collect()
    }

    /// Cardinality of [`Table::player_cards`].
    pub fn count_player_tokens(&self, player: PlayerId) -> usize {
        let inner = self.inner.lock();
        inner.tokens.iter().filter(|t| t.contains(&player)).count()
    }

    /// All cards currently on the table, in slot order, skipping empty slots.
    pub fn cards_on_table(&self) -> Vec<Card> {
        self.inner.lock().slot_to_card.iter().filter_map(|c| *c).collect()
    }

    /// The slot currently holding `card`, if it is on the table.
    pub fn slot_for_card(&self, card: Card) -> Option<usize> {
        self.inner.lock().card_to_slot[card as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct NullUi {
        remove_card_calls: AtomicUsize,
    }

    impl UiSink for NullUi {
        fn place_card(&self, _card: Card, _slot: usize) {}
        fn remove_card(&self, _slot: usize) {
            self.remove_card_calls.fetch_add(1, Ordering::SeqCst);
        }
        fn place_token(&self, _player: PlayerId, _slot: usize) {}
        fn remove_token(&self, _player: PlayerId, _slot: usize) {}
        fn set_score(&self, _player: PlayerId, _score: u32) {}
        fn set_freeze(&self, _player: PlayerId, _remaining_millis: u64) {}
        fn set_countdown(&self, _millis_left: u64, _warn: bool) {}
        fn set_hint(&self, _slots: &[usize]) {}
        fn announce_winner(&self, _player_ids: &[PlayerId]) {}
    }

    fn table() -> Table {
        Table::new(12, 81, Duration::ZERO, Arc::new(NullUi::default()))
    }

    #[test]
    fn place_and_remove_card_round_trips() {
        let t = table();
        t.place_card(5, 0);
        assert!(t.slot_has_card(0));
        assert_eq!(t.remove_card(0), Some(5));
        assert!(!t.slot_has_card(0));
    }

    #[test]
    fn removing_empty_slot_is_idempotent() {
        let t = table();
        assert_eq!(t.remove_card(3), None);
        assert_eq!(t.remove_card(3), None);
    }

    #[test]
    fn remove_card_clears_tokens_invariant() {
        let t = table();
        t.place_card(1, 2);
        assert!(t.place_token(0, 2));
        assert!(t.place_token(1, 2));
        assert!(t.has_token(0, 2));

        t.remove_card(2);
        assert!(!t.has_token(0, 2));
        assert!(!t.has_token(1, 2));
    }

    #[test]
    fn place_token_on_empty_slot_is_noop() {
        let t = table();
        assert!(!t.place_token(0, 4));
        assert!(!t.has_token(0, 4));
    }

    #[test]
    fn duplicate_place_token_does_not_duplicate() {
        let t = table();
        t.place_card(7, 1);
        assert!(t.place_token(0, 1));
        assert!(!t.place_token(0, 1));
        assert_eq!(t.count_player_tokens(0), 1);
    }

    #[test]
    fn player_cards_follow_slot_order() {
        let t = table();
        t.place_card(10, 0);
        t.place_card(20, 1);
        t.place_card(30, 2);
        t.place_token(0, 2);
        t.place_token(0, 0);

        assert_eq!(t.player_cards(0), vec![10, 30]);
    }

    #[test]
    fn remove_all_cards_empties_table() {
        let t = table();
        for slot in 0..5 {
            t.place_card(slot as Card, slot);
        }
        let removed = t.remove_all_cards();
        assert_eq!(removed.len(), 5);
        assert!((0..5).all(|s| !t.slot_has_card(s)));
    }
}
