// Copyright (C) 2025 Set Authors
// SPDX-License-Identifier: Apache-2.0

//! Round orchestration: deal, timer, arbitrate, terminate.
use log::{debug, info, warn};
use parking_lot::{Condvar, Mutex};
use rand::{Rng, seq::SliceRandom, thread_rng};
use std::{
    collections::VecDeque,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::{Duration, Instant},
};

use crate::{
    ai::AiPresser,
    config::Config,
    oracle::{Card, SetOracle},
    player::{Gate, Player, PlayerId, Status},
    table::Table,
    ui::UiSink,
};

/// Dealer polling cadence once the countdown is inside its warning window.
const FAST_WAKEUP: Duration = Duration::from_millis(10);
/// Dealer polling cadence outside the warning window.
const SLOW_WAKEUP: Duration = Duration::from_secs(1);

/// The dealer's own wait/notify point in [`Dealer::timer_loop`].
///
/// A player submission wakes this monitor early via [`DealerMonitor::notify`];
/// it is distinct from the submission queue's own storage so the dealer's
/// sleep isn't tangled up with the queue's producer/consumer bookkeeping
/// (mirrors the two-lock split documented on [`Player`]).
#[derive(Debug, Default)]
pub(crate) struct DealerMonitor {
    mutex: Mutex<()>,
    cv: Condvar,
}

impl DealerMonitor {
    pub(crate) fn notify(&self) {
        self.cv.notify_all();
    }

    fn wait_for(&self, timeout: Duration) {
        let mut guard = self.mutex.lock();
        self.cv.wait_for(&mut guard, timeout);
    }
}

/// A cloneable handle letting external code (a CLI's ctrl-c or quit key)
/// request dealer shutdown from outside the dealer thread.
#[derive(Debug, Clone)]
pub struct TerminateHandle {
    terminate: Arc<AtomicBool>,
    monitor: Arc<DealerMonitor>,
}

impl TerminateHandle {
    /// Requests that the dealer finish its current round and shut down.
    pub fn terminate(&self) {
        self.terminate.store(true, Ordering::Release);
        self.monitor.notify();
    }
}

/// A cloneable handle letting external code request a hint from outside the
/// dealer thread. See [`Dealer::hint_handle`].
#[derive(Clone)]
pub struct HintHandle {
    table: Arc<Table>,
    oracle: Arc<dyn SetOracle>,
    ui: Arc<dyn UiSink>,
    enabled: bool,
}

impl HintHandle {
    /// If hints are enabled, asks the oracle for one legal set currently on
    /// the table and forwards it to the UI sink.
    pub fn request(&self) -> Option<Vec<usize>> {
        request_hint(&self.table, self.oracle.as_ref(), self.ui.as_ref(), self.enabled)
    }
}

fn request_hint(table: &Table, oracle: &dyn SetOracle, ui: &dyn UiSink, enabled: bool) -> Option<Vec<usize>> {
    if !enabled {
        return None;
    }

    let cards = table.cards_on_table();
    let set = oracle.find_sets(&cards, 1).into_iter().next()?;
    let slots: Vec<usize> = set.iter().filter_map(|&card| table.slot_for_card(card)).collect();
    ui.set_hint(&slots);
    Some(slots)
}

/// Round orchestrator: one dealer thread driving N player threads (plus one
/// AI presser thread per non-human player) against a shared [`Table`].
///
/// Construction starts every player/presser thread; [`Dealer::run`] then
/// drives the round loop until [`Dealer::should_finish`], at which point it
/// joins every thread it started and announces the winner(s).
pub struct Dealer {
    config: Config,
    table: Arc<Table>,
    oracle: Arc<dyn SetOracle>,
    ui: Arc<dyn UiSink>,
    players: Vec<Arc<Player>>,
    submissions: Arc<Mutex<VecDeque<PlayerId>>>,
    monitor: Arc<DealerMonitor>,
    gate: Arc<Gate>,
    terminate: Arc<AtomicBool>,
    deck: Vec<Card>,
    reshuffle_at: Instant,
    player_threads: Vec<thread::JoinHandle<()>>,
    ai_threads: Vec<thread::JoinHandle<()>>,
}

impl Dealer {
    /// Validates `config`, constructs every player and (for non-human
    /// players) its AI presser, and starts their threads. Players begin
    /// disabled, parked on the shared players-gate.
    pub fn new(config: Config, oracle: Arc<dyn SetOracle>, ui: Arc<dyn UiSink>) -> Result<Self, crate::config::ConfigError> {
        config.validate()?;

        let table = Arc::new(Table::new(config.table_size, config.deck_size, config.table_delay, ui.clone()));
        let submissions = Arc::new(Mutex::new(VecDeque::new()));
        let monitor = Arc::new(DealerMonitor::default());
        let gate = Arc::new(Gate::default());
        let terminate = Arc::new(AtomicBool::new(false));

        let mut players = Vec::with_capacity(config.player_names.len());
        let mut player_threads = Vec::with_capacity(config.player_names.len());
        let mut ai_threads = Vec::new();

        for (id, name) in config.player_names.iter().enumerate() {
            let human = id < config.human_player_count;
            let player = Player::new(
                id,
                name.clone(),
                human,
                config.feature_size,
                config.point_freeze,
                config.penalty_freeze,
                table.clone(),
                ui.clone(),
                submissions.clone(),
                monitor.clone(),
                gate.clone(),
            );

            let player_for_thread = player.clone();
            let handle = thread::Builder::new()
                .name(format!("player-{name}"))
                .spawn(move || player_for_thread.run())
                .expect("failed to spawn player thread");
            player_threads.push(handle);

            if !human {
                let seed = config
                    .ai_seed
                    .unwrap_or_else(|| thread_rng().random::<u64>())
                    .wrapping_add(id as u64);
                let presser = AiPresser::new(player.clone(), config.table_size, config.ai_sleep_between_keypress, seed);
                let handle = thread::Builder::new()
                    .name(format!("ai-{name}"))
                    .spawn(move || presser.run())
                    .expect("failed to spawn AI presser thread");
                ai_threads.push(handle);
            }

            players.push(player);
        }

        let deck = (0..config.deck_size as Card).collect();

        Ok(Self {
            config,
            table,
            oracle,
            ui,
            players,
            submissions,
            monitor,
            gate,
            terminate,
            deck,
            reshuffle_at: Instant::now(),
            player_threads,
            ai_threads,
        })
    }

    /// A cloneable handle for requesting shutdown from outside the dealer
    /// thread, e.g. a CLI's ctrl-c or quit-key handler.
    pub fn terminate_handle(&self) -> TerminateHandle {
        TerminateHandle {
            terminate: self.terminate.clone(),
            monitor: self.monitor.clone(),
        }
    }

    /// Every player this dealer started, in roster order.
    pub fn players(&self) -> &[Arc<Player>] {
        &self.players
    }

    /// If hints are enabled, asks the oracle for one legal set currently on
    /// the table and forwards it to the UI sink. Additive: not part of the
    /// main loop, callable by a front end on a user key press.
    pub fn hint(&self) -> Option<Vec<usize>> {
        request_hint(&self.table, self.oracle.as_ref(), self.ui.as_ref(), self.config.hints)
    }

    /// A cloneable handle letting external code (e.g. a CLI's hint key)
    /// request a hint from outside the dealer thread, the same way
    /// [`Dealer::terminate_handle`] lets it request shutdown. Needed because
    /// [`Dealer::run`] takes the dealer by value and blocks, so nothing else
    /// can hold a `&Dealer` once the round loop is running.
    pub fn hint_handle(&self) -> HintHandle {
        HintHandle {
            table: self.table.clone(),
            oracle: self.oracle.clone(),
            ui: self.ui.clone(),
            enabled: self.config.hints,
        }
    }

    /// Runs the dealer's main loop until [`Dealer::should_finish`], then
    /// shuts every thread down and announces the winner(s).
    pub fn run(mut self) {
        info!(
            "dealer starting: {} players ({} human), deck_size={}, table_size={}",
            self.players.len(),
            self.config.human_player_count,
            self.config.deck_size,
            self.config.table_size
        );

        while !self.should_finish() {
            self.deck.shuffle(&mut thread_rng());
            self.place_cards_on_table();
            self.ensure_set_on_table();
            self.update_timer(true);
            info!("round started: {} cards left in deck", self.deck.len());

            self.notify_players();
            self.timer_loop();
            self.suspend_players();

            for player in &self.players {
                player.clear_actions();
            }
            let removed = self.table.remove_all_cards();
            self.deck.extend(removed);
        }

        self.shutdown();
    }

    /// True when the dealer should stop dealing rounds: an external
    /// shutdown request, or the oracle reports no legal set remains in the
    /// deck, independent of the table.
    fn should_finish(&self) -> bool {
        self.terminate.load(Ordering::Acquire) || self.oracle.find_sets(&self.deck, 1).is_empty()
    }

    /// Fills every empty slot from the deck until the table is full or the
    /// deck is empty.
    fn place_cards_on_table(&mut self) {
        for slot in 0..self.config.table_size {
            if self.table.slot_has_card(slot) {
                continue;
            }
            let Some(card) = self.deck.pop() else {
                break;
            };
            debug!("dealing card {card} into slot {slot}");
            self.table.place_card(card, slot);
        }
    }

    /// If the table holds no legal set, returns every card to the deck,
    /// reshuffles, and redeals, repeating until one is found. Assumes the
    /// combined deck and table still contain a legal set somewhere
    /// (enforced in practice by [`Dealer::should_finish`] having already
    /// passed for this round).
    fn ensure_set_on_table(&mut self) {
        loop {
            let cards = self.table.cards_on_table();
            if !self.oracle.find_sets(&cards, 1).is_empty() {
                return;
            }

            warn!("no legal set on table, reshuffling");
            let removed = self.table.remove_all_cards();
            self.deck.extend(removed);
            self.deck.shuffle(&mut thread_rng());
            self.place_cards_on_table();
        }
    }

    /// Resets (`reset=true`) or refreshes the round deadline, and republishes
    /// the countdown to the UI.
    fn update_timer(&mut self, reset: bool) {
        if reset {
            self.reshuffle_at = Instant::now() + self.config.turn_timeout;
        }

        let time_left = self.reshuffle_at.saturating_duration_since(Instant::now());
        let warn = time_left <= self.config.turn_timeout;
        self.ui.set_countdown(time_left.as_millis() as u64, warn);
    }

    /// Enables every player, wakes their AI pressers, and releases the
    /// shared players-gate.
    fn notify_players(&self) {
        for player in &self.players {
            player.enable();
        }
        self.gate.notify_all();
    }

    /// Disables every player; does not touch their action queues (the main
    /// loop clears those separately).
    fn suspend_players(&self) {
        for player in &self.players {
            player.disable();
        }
    }

    /// Sleeps on the dealer monitor until a submission wakes it early or the
    /// tick interval elapses, then arbitrates and refills the table. Repeats
    /// until terminated or the round deadline passes.
    fn timer_loop(&mut self) {
        loop {
            if self.terminate.load(Ordering::Acquire) {
                break;
            }

            let now = Instant::now();
            if now >= self.reshuffle_at {
                break;
            }

            let time_left = self.reshuffle_at - now;
            let warn = time_left <= self.config.turn_timeout;
            let wake_up = if warn { FAST_WAKEUP } else { SLOW_WAKEUP };
            self.monitor.wait_for(wake_up.min(time_left));

            self.update_timer(false);
            self.check_sets();
            self.place_cards_on_table();
        }
    }

    /// Drains the submission queue in FIFO order, arbitrating each
    /// candidate set against the oracle.
    fn check_sets(&mut self) {
        loop {
            let Some(player_id) = self.submissions.lock().pop_front() else {
                break;
            };
            let player = &self.players[player_id];
            let cards = self.table.player_cards(player_id);

            if cards.len() < self.config.feature_size {
                // A prior legal set in this same pass removed one of this
                // player's tokened cards, so the submission no longer holds.
                // Neither re-enabled nor notified here: the player's gate
                // reopens at the dealer's next `notify_players` instead.
                warn!("player {player_id} submission invalidated by a concurrent removal");
                player.set_status(Status::Continue);
                continue;
            }

            if self.oracle.test_set(&cards) {
                debug!("player {player_id} scored a legal set {cards:?}");
                player.set_status(Status::Point);
                for slot in self.table.player_slots(player_id) {
                    self.table.remove_card(slot);
                }
                player.enable();
                player.notify_verdict();
            } else {
                debug!("player {player_id} submitted an illegal set {cards:?}");
                player.set_status(Status::Penalty);
                player.enable();
                player.notify_verdict();
            }
        }
    }

    fn shutdown(&mut self) {
        info!("dealer shutting down");

        for player in &self.players {
            player.terminate();
        }
        self.gate.notify_all();

        for handle in self.player_threads.drain(..) {
            let _ = handle.join();
        }
        for handle in self.ai_threads.drain(..) {
            let _ = handle.join();
        }

        let max_score = self.players.iter().map(|p| p.score()).max().unwrap_or(0);
        let winners: Vec<PlayerId> = self
            .players
            .iter()
            .filter(|p| p.score() == max_score)
            .map(|p| p.id())
            .collect();

        info!("winners: {winners:?} (score {max_score})");
        self.ui.announce_winner(&winners);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex as PMutex;

    #[derive(Debug, Default)]
    struct NullUi {
        winners: PMutex<Vec<PlayerId>>,
    }

    impl UiSink for NullUi {
        fn place_card(&self, _card: Card, _slot: usize) {}
        fn remove_card(&self, _slot: usize) {}
        fn place_token(&self, _player: PlayerId, _slot: usize) {}
        fn remove_token(&self, _player: PlayerId, _slot: usize) {}
        fn set_score(&self, _player: PlayerId, _score: u32) {}
        fn set_freeze(&self, _player: PlayerId, _remaining_millis: u64) {}
        fn set_countdown(&self, _millis_left: u64, _warn: bool) {}
        fn set_hint(&self, _slots: &[usize]) {}
        fn announce_winner(&self, player_ids: &[PlayerId]) {
            *self.winners.lock() = player_ids.to_vec();
        }
    }

    /// Every triple is a legal set: lets a test drive `check_sets` down the
    /// `Point` branch without reproducing the real feature encoding.
    #[derive(Debug, Default)]
    struct AlwaysLegalOracle;

    impl SetOracle for AlwaysLegalOracle {
        fn test_set(&self, cards: &[Card]) -> bool {
            cards.len() == 3
        }

        fn find_sets(&self, cards: &[Card], limit: usize) -> Vec<Vec<Card>> {
            if limit == 0 || cards.len() < 3 {
                return Vec::new();
            }
            vec![cards[..3].to_vec()]
        }

        fn cards_to_features(&self, cards: &[Card]) -> Vec<Vec<u8>> {
            cards.iter().map(|&c| vec![c as u8]).collect()
        }
    }

    /// No triple is ever a legal set, but `find_sets` still reports one so
    /// `ensure_set_on_table`/`should_finish` don't spin forever: a test
    /// double for driving the `Penalty` branch in isolation.
    #[derive(Debug, Default)]
    struct AlwaysIllegalOracle;

    impl SetOracle for AlwaysIllegalOracle {
        fn test_set(&self, _cards: &[Card]) -> bool {
            false
        }

        fn find_sets(&self, cards: &[Card], limit: usize) -> Vec<Vec<Card>> {
            if limit == 0 || cards.len() < 3 {
                return Vec::new();
            }
            vec![cards[..3].to_vec()]
        }

        fn cards_to_features(&self, cards: &[Card]) -> Vec<Vec<u8>> {
            cards.iter().map(|&c| vec![c as u8]).collect()
        }
    }

    fn base_config(player_names: &[&str], human_player_count: usize) -> Config {
        Config {
            deck_size: 81,
            table_size: 12,
            feature_size: 3,
            turn_timeout: Duration::from_secs(5),
            table_delay: Duration::ZERO,
            point_freeze: Duration::from_millis(10),
            penalty_freeze: Duration::from_millis(10),
            player_names: player_names.iter().map(|s| s.to_string()).collect(),
            human_player_count,
            hints: true,
            ai_sleep_between_keypress: Duration::from_millis(5),
            ai_seed: Some(7),
        }
    }

    #[test]
    fn new_rejects_invalid_config() {
        let mut config = base_config(&["A"], 1);
        config.table_size = 200; // bigger than deck_size
        let err = Dealer::new(config, Arc::new(AlwaysLegalOracle), Arc::new(NullUi::default()));
        assert!(err.is_err());
    }

    #[test]
    fn human_submits_legal_set_and_scores() {
        let config = base_config(&["Human"], 1);
        let ui = Arc::new(NullUi::default());
        let dealer = Dealer::new(config, Arc::new(AlwaysLegalOracle), ui.clone()).unwrap();
        let terminate = dealer.terminate_handle();
        let players = dealer.players().to_vec();

        let handle = thread::spawn(move || dealer.run());

        thread::sleep(Duration::from_millis(200));
        players[0].key_press(0);
        players[0].key_press(1);
        players[0].key_press(2);
        thread::sleep(Duration::from_millis(200));

        assert_eq!(players[0].score(), 1);

        terminate.terminate();
        handle.join().unwrap();
        assert_eq!(ui.winners.lock().as_slice(), &[0]);
    }

    #[test]
    fn human_illegal_submission_gives_penalty_not_point() {
        let config = base_config(&["Human"], 1);
        let ui = Arc::new(NullUi::default());
        let dealer = Dealer::new(config, Arc::new(AlwaysIllegalOracle), ui).unwrap();
        let terminate = dealer.terminate_handle();
        let players = dealer.players().to_vec();

        let handle = thread::spawn(move || dealer.run());

        thread::sleep(Duration::from_millis(200));
        players[0].key_press(0);
        players[0].key_press(1);
        players[0].key_press(2);
        thread::sleep(Duration::from_millis(200));

        assert_eq!(players[0].score(), 0);

        terminate.terminate();
        handle.join().unwrap();
    }

    #[test]
    fn terminate_handle_stops_the_round_loop() {
        let config = base_config(&["A", "B"], 0);
        let dealer = Dealer::new(config, Arc::new(AlwaysLegalOracle), Arc::new(NullUi::default())).unwrap();
        let terminate = dealer.terminate_handle();

        let handle = thread::spawn(move || dealer.run());
        thread::sleep(Duration::from_millis(50));
        terminate.terminate();
        handle.join().unwrap();
    }
}
