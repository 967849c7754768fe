// Copyright (C) 2025 Set Authors
// SPDX-License-Identifier: Apache-2.0

//! Terminal rendering: a [`UiSink`] that redraws the whole table on every
//! event it receives.
use crossterm::{
    cursor, queue,
    terminal::{Clear, ClearType},
};
use parking_lot::Mutex;
use std::io::{Write, stdout};

use setgame_core::{Card, PlayerId, UiSink};

#[derive(Debug, Default, Clone, Copy)]
struct Slot {
    card: Option<Card>,
}

#[derive(Debug, Default)]
struct State {
    slots: Vec<Slot>,
    tokens: Vec<Vec<PlayerId>>,
    scores: Vec<u32>,
    freeze_millis: Vec<u64>,
    countdown_millis: u64,
    warn: bool,
    hint: Vec<usize>,
}

/// Renders the table, scores, and countdown to the terminal.
///
/// Every [`UiSink`] callback is fire-and-forget; this sink folds each event
/// into one shared [`State`] and repaints eagerly rather than batching,
/// which is fine at these event rates (animation delays and freeze
/// durations are measured in hundreds-of-milliseconds, not microseconds).
pub struct TerminalUi {
    state: Mutex<State>,
    player_names: Vec<String>,
}

impl TerminalUi {
    /// Creates a sink for a table of `table_size` slots and the given
    /// roster, in player-id order.
    pub fn new(table_size: usize, player_names: Vec<String>) -> Self {
        let players = player_names.len();
        Self {
            state: Mutex::new(State {
                slots: vec![Slot::default(); table_size],
                tokens: vec![Vec::new(); table_size],
                scores: vec![0; players],
                freeze_millis: vec![0; players],
                countdown_millis: 0,
                warn: false,
                hint: Vec::new(),
            }),
            player_names,
        }
    }

    fn player_name(&self, id: PlayerId) -> &str {
        self.player_names.get(id).map(String::as_str).unwrap_or("?")
    }

    fn redraw(&self, state: &State) {
        let mut out = stdout();
        let _ = queue!(out, cursor::MoveTo(0, 0), Clear(ClearType::All));

        let warn_marker = if state.warn { "  [!]" } else { "" };
        let _ = write!(out, "Set -- {} left{warn_marker}\r\n\r\n", format_millis(state.countdown_millis));

        for (slot, s) in state.slots.iter().enumerate() {
            let marker = if state.hint.contains(&slot) { '*' } else { ' ' };
            match s.card {
                Some(card) => {
                    let owners: Vec<&str> = state.tokens[slot].iter().map(|&p| self.player_name(p)).collect();
                    let _ = write!(out, "{marker}[{slot:>2}] card {card:>2}  tokens: {}\r\n", owners.join(","));
                }
                None => {
                    let _ = write!(out, "{marker}[{slot:>2}] --\r\n");
                }
            }
        }

        let _ = write!(out, "\r\n");
        for (id, name) in self.player_names.iter().enumerate() {
            let frozen = state.freeze_millis[id];
            let freeze_note = if frozen > 0 { format!("  (frozen {frozen}ms)") } else { String::new() };
            let _ = write!(out, "{name}: {}{freeze_note}\r\n", state.scores[id]);
        }

        let _ = out.flush();
    }
}

impl UiSink for TerminalUi {
    fn place_card(&self, card: Card, slot: usize) {
        let mut state = self.state.lock();
        state.slots[slot].card = Some(card);
        self.redraw(&state);
    }

    fn remove_card(&self, slot: usize) {
        let mut state = self.state.lock();
        state.slots[slot].card = None;
        state.tokens[slot].clear();
        self.redraw(&state);
    }

    fn place_token(&self, player: PlayerId, slot: usize) {
        let mut state = self.state.lock();
        state.tokens[slot].push(player);
        self.redraw(&state);
    }

    fn remove_token(&self, player: PlayerId, slot: usize) {
        let mut state = self.state.lock();
        if let Some(pos) = state.tokens[slot].iter().position(|&p| p == player) {
            state.tokens[slot].remove(pos);
        }
        self.redraw(&state);
    }

    fn set_score(&self, player: PlayerId, score: u32) {
        let mut state = self.state.lock();
        state.scores[player] = score;
        self.redraw(&state);
    }

    fn set_freeze(&self, player: PlayerId, remaining_millis: u64) {
        let mut state = self.state.lock();
        state.freeze_millis[player] = remaining_millis;
        self.redraw(&state);
    }

    fn set_countdown(&self, millis_left: u64, warn: bool) {
        let mut state = self.state.lock();
        state.countdown_millis = millis_left;
        state.warn = warn;
        self.redraw(&state);
    }

    fn set_hint(&self, slots: &[usize]) {
        let mut state = self.state.lock();
        state.hint = slots.to_vec();
        self.redraw(&state);
    }

    fn announce_winner(&self, player_ids: &[PlayerId]) {
        let state = self.state.lock();
        self.redraw(&state);

        let names: Vec<&str> = player_ids.iter().map(|&p| self.player_name(p)).collect();
        println!("\r\nWinner(s): {}\r\n", names.join(", "));
    }
}

fn format_millis(ms: u64) -> String {
    format!("{}.{}s", ms / 1000, (ms % 1000) / 100)
}
