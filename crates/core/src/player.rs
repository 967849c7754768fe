// Copyright (C) 2025 Set Authors
// SPDX-License-Identifier: Apache-2.0

//! Player lifecycle, key-press queue, and the freeze protocol.
use log::debug;
use parking_lot::{Condvar, Mutex};
use std::{
    collections::VecDeque,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU32, Ordering},
    },
    thread,
    time::Duration,
};

use crate::{dealer::DealerMonitor, table::Table, ui::UiSink};

/// A player's stable index.
pub type PlayerId = usize;

/// A player's current arbitration status, written by the dealer and read by
/// the player after being woken on its verdict monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// No pending arbitration.
    Continue,
    /// The dealer ruled the submitted set legal.
    Point,
    /// The dealer ruled the submitted set illegal.
    Penalty,
    /// The dealer has shut down.
    Terminated,
}

/// A condition variable paired with an empty mutex, used wherever the
/// payload being waited on already lives in its own atomic/lock (the gate
/// and the AI-enablement signal). Keeping the mutex empty means the data it
/// protects is nothing but the wakeup edge itself.
#[derive(Debug, Default)]
pub(crate) struct Gate {
    mutex: Mutex<()>,
    cv: Condvar,
}

impl Gate {
    pub(crate) fn wait_while(&self, mut pred: impl FnMut() -> bool) {
        let mut guard = self.mutex.lock();
        while pred() {
            self.cv.wait(&mut guard);
        }
    }

    pub(crate) fn notify_all(&self) {
        self.cv.notify_all();
    }
}

#[derive(Debug, Default)]
struct ActionQueue {
    queue: Mutex<VecDeque<usize>>,
    cv: Condvar,
}

#[derive(Debug)]
struct Verdict {
    status: Mutex<Status>,
    cv: Condvar,
}

impl Default for Verdict {
    fn default() -> Self {
        Self {
            status: Mutex::new(Status::Continue),
            cv: Condvar::new(),
        }
    }
}

/// One player: its action queue, freeze protocol, and status field.
///
/// See the crate docs for the two-monitor rationale: the actions queue and
/// the dealer rendezvous (`verdict`) are independent so a key press never
/// blocks on an unrelated arbitration wait, and vice versa. The
/// player-enablement `gate` is a third, separate signal because it is
/// broadcast by the dealer to every player at once, not per-player.
#[derive(Debug)]
pub struct Player {
    id: PlayerId,
    name: String,
    human: bool,
    feature_size: usize,
    point_freeze: Duration,
    penalty_freeze: Duration,
    score: AtomicU32,
    enabled: AtomicBool,
    terminate: AtomicBool,
    actions: ActionQueue,
    verdict: Verdict,
    table: Arc<Table>,
    ui: Arc<dyn UiSink>,
    submissions: Arc<Mutex<VecDeque<PlayerId>>>,
    dealer_monitor: Arc<DealerMonitor>,
    /// Shared by every player; the dealer notifies it once per round.
    pub(crate) gate: Arc<Gate>,
    /// Private to this player; only meaningful if `human` is false.
    pub(crate) ai_gate: Gate,
}

impl Player {
    /// Creates a new, disabled player.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        id: PlayerId,
        name: String,
        human: bool,
        feature_size: usize,
        point_freeze: Duration,
        penalty_freeze: Duration,
        table: Arc<Table>,
        ui: Arc<dyn UiSink>,
        submissions: Arc<Mutex<VecDeque<PlayerId>>>,
        dealer_monitor: Arc<DealerMonitor>,
        gate: Arc<Gate>,
    ) -> Arc<Self> {
        Arc::new(Self {
            id,
            name,
            human,
            feature_size,
            point_freeze,
            penalty_freeze,
            score: AtomicU32::new(0),
            enabled: AtomicBool::new(false),
            terminate: AtomicBool::new(false),
            actions: ActionQueue::default(),
            verdict: Verdict::default(),
            table,
            ui,
            submissions,
            dealer_monitor,
            gate,
            ai_gate: Gate::default(),
        })
    }

    /// This player's stable id.
    pub fn id(&self) -> PlayerId {
        self.id
    }

    /// This player's thread label.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True if this player is driven by human input rather than an AI
    /// presser thread.
    pub fn is_human(&self) -> bool {
        self.human
    }

    /// This player's current score.
    pub fn score(&self) -> u32 {
        self.score.load(Ordering::Acquire)
    }

    fn status(&self) -> Status {
        *self.verdict.status.lock()
    }

    pub(crate) fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    pub(crate) fn is_terminating(&self) -> bool {
        self.terminate.load(Ordering::Acquire)
    }

    /// External (human) or internal-AI key press on `slot`.
    ///
    /// Dropped unless the player is not terminating, currently enabled, has
    /// status `Continue`, and `slot` holds a card. Otherwise blocks the
    /// caller until the slot can be enqueued (queue capacity is
    /// `feature_size`).
    pub fn key_press(&self, slot: usize) {
        if self.terminate.load(Ordering::Acquire)
            || !self.enabled.load(Ordering::Acquire)
            || self.status() != Status::Continue
            || !self.table.slot_has_card(slot)
        {
            return;
        }

        let mut queue = self.actions.queue.lock();
        while queue.len() >= self.feature_size && !self.terminate.load(Ordering::Acquire) {
            self.actions.cv.wait(&mut queue);
        }

        if self.terminate.load(Ordering::Acquire) {
            return;
        }

        queue.push_back(slot);
        drop(queue);
        self.actions.cv.notify_all();
    }

    /// Dealer-only: marks this player enabled and wakes its main loop and,
    /// for AI players, the presser thread parked on `ai_gate`.
    pub(crate) fn enable(&self) {
        self.enabled.store(true, Ordering::Release);
        self.verdict.cv.notify_all();
        self.ai_gate.notify_all();
    }

    /// Dealer-only: marks this player disabled (between rounds).
    pub(crate) fn disable(&self) {
        self.enabled.store(false, Ordering::Release);
    }

    /// Dealer-only: drops any queued but unprocessed key presses.
    pub(crate) fn clear_actions(&self) {
        self.actions.queue.lock().clear();
        self.actions.cv.notify_all();
    }

    /// Dealer-only: writes this player's arbitration verdict.
    pub(crate) fn set_status(&self, status: Status) {
        *self.verdict.status.lock() = status;
    }

    /// Dealer-only: wakes a player parked waiting for its verdict.
    pub(crate) fn notify_verdict(&self) {
        self.verdict.cv.notify_all();
    }

    /// Sets the sticky terminate flag and releases every monitor this
    /// player could be parked on.
    pub fn terminate(&self) {
        self.terminate.store(true, Ordering::Release);
        self.verdict.cv.notify_all();
        self.actions.cv.notify_all();
        self.ai_gate.notify_all();
    }

    /// The player main loop, run on its own thread until terminated.
    pub(crate) fn run(self: &Arc<Self>) {
        loop {
            if self.terminate.load(Ordering::Acquire) {
                break;
            }

            self.gate
                .wait_while(|| !self.enabled.load(Ordering::Acquire) && !self.terminate.load(Ordering::Acquire));

            if self.terminate.load(Ordering::Acquire) {
                break;
            }

            {
                let mut queue = self.actions.queue.lock();
                while self.enabled.load(Ordering::Acquire)
                    && queue.is_empty()
                    && !self.terminate.load(Ordering::Acquire)
                {
                    self.actions.cv.wait(&mut queue);
                }
            }

            if self.terminate.load(Ordering::Acquire) {
                break;
            }

            self.handle_action();
            self.handle_freeze();
        }
    }

    fn handle_action(&self) {
        let slot = match self.actions.queue.lock().pop_front() {
            Some(slot) => slot,
            None => return,
        };

        if !self.table.slot_has_card(slot) {
            debug!("player {} action on emptied slot {slot} discarded", self.id);
            return;
        }

        if self.table.has_token(self.id, slot) {
            self.table.remove_token(self.id, slot);
            return;
        }

        if self.table.count_player_tokens(self.id) >= self.feature_size {
            return;
        }

        if !self.table.place_token(self.id, slot) {
            // Slot emptied between the has-card check and the placement.
            return;
        }

        if self.table.count_player_tokens(self.id) == self.feature_size {
            self.enabled.store(false, Ordering::Release);
            self.submissions.lock().push_back(self.id);
            self.dealer_monitor.notify();
            self.wait_for_verdict();
        }
    }

    fn wait_for_verdict(&self) {
        let mut status = self.verdict.status.lock();
        self.verdict.cv.wait_while(&mut status, |s| {
            *s == Status::Continue
                && !self.enabled.load(Ordering::Acquire)
                && !self.terminate.load(Ordering::Acquire)
        });
    }

    fn handle_freeze(&self) {
        match self.status() {
            Status::Point => self.point(),
            Status::Penalty => self.penalty(),
            Status::Continue | Status::Terminated => {}
        }
    }

    fn point(&self) {
        let new_score = self.score.fetch_add(1, Ordering::AcqRel) + 1;
        self.ui.set_score(self.id, new_score);
        self.freeze(self.point_freeze);
        self.reset_status();
    }

    fn penalty(&self) {
        // Only the AI action queue is cleared here; a human's queued
        // presses survive the freeze and resume once it ends.
        if !self.human {
            self.clear_actions();
        }
        self.freeze(self.penalty_freeze);
        self.reset_status();
    }

    fn freeze(&self, duration: Duration) {
        self.ui.set_freeze(self.id, duration.as_millis() as u64);
        thread::sleep(duration);
        self.ui.set_freeze(self.id, 0);
    }

    fn reset_status(&self) {
        *self.verdict.status.lock() = Status::Continue;
    }
}
