// Copyright (C) 2025 Set Authors
// SPDX-License-Identifier: Apache-2.0

//! The UI sink boundary: fire-and-forget rendering events.
use crate::{oracle::Card, player::PlayerId};

/// Rendering surface the engine reports to; never read back from.
///
/// Every method is fire-and-forget: the engine does not wait for, or care
/// about, how (or whether) an implementation renders an event.
pub trait UiSink: Send + Sync {
    /// A card was placed in `slot`.
    fn place_card(&self, card: Card, slot: usize);

    /// The card in `slot` was removed.
    fn remove_card(&self, slot: usize);

    /// `player` placed a token on `slot`.
    fn place_token(&self, player: PlayerId, slot: usize);

    /// `player`'s token on `slot` was removed.
    fn remove_token(&self, player: PlayerId, slot: usize);

    /// `player`'s score changed to `score`.
    fn set_score(&self, player: PlayerId, score: u32);

    /// `player`'s freeze state changed; `remaining_millis == 0` means
    /// unfrozen.
    fn set_freeze(&self, player: PlayerId, remaining_millis: u64);

    /// The round countdown changed.
    fn set_countdown(&self, millis_left: u64, warn: bool);

    /// One legal set found on the table, for the hint emitter.
    fn set_hint(&self, slots: &[usize]);

    /// The round ended with this list of winning player ids.
    fn announce_winner(&self, player_ids: &[PlayerId]);
}
