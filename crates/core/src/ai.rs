// Copyright (C) 2025 Set Authors
// SPDX-License-Identifier: Apache-2.0

//! The AI presser: one thread per non-human player, pressing uniformly
//! random slots with no skill and no memory.
use parking_lot::Mutex;
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::{sync::Arc, thread, time::Duration};

use crate::player::Player;

/// Drives one non-human [`Player`] by pressing random slots while it is
/// enabled, damped by a sleep between presses so the dealer's submission
/// queue isn't hammered.
pub(crate) struct AiPresser {
    player: Arc<Player>,
    table_size: usize,
    sleep_between: Duration,
    rng: Mutex<StdRng>,
}

impl AiPresser {
    pub(crate) fn new(player: Arc<Player>, table_size: usize, sleep_between: Duration, seed: u64) -> Self {
        Self {
            player,
            table_size,
            sleep_between,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// The presser loop, run on its own thread until the player terminates.
    pub(crate) fn run(&self) {
        loop {
            if self.player.is_terminating() {
                break;
            }

            self.player
                .ai_gate
                .wait_while(|| !self.player.is_enabled() && !self.player.is_terminating());

            if self.player.is_terminating() {
                break;
            }

            let slot = self.rng.lock().gen_range(0..self.table_size);
            self.player.key_press(slot);

            if self.player.is_terminating() {
                break;
            }
            thread::sleep(self.sleep_between);
        }
    }
}
