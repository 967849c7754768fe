// Copyright (C) 2025 Set Authors
// SPDX-License-Identifier: Apache-2.0

//! Terminal front end for the Set dealer engine.
//!
//! Wires a [`setgame_cards::StandardOracle`] and a terminal [`TerminalUi`] +
//! crossterm key-press source into a running [`setgame_core::Dealer`].
#![warn(clippy::all, rust_2018_idioms, missing_docs)]
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::Duration,
};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use log::{error, info};

use setgame_cards::StandardOracle;
use setgame_core::{Config, Dealer, HintHandle, Player, TerminateHandle};

mod terminal;
use terminal::TerminalUi;

/// Maps the top two QWERTY rows to table slots, left to right, matching a
/// classic implementation's keyboard layout. Slots beyond the mapped keys
/// are dealt to and playable by AI, just not reachable from this keyboard.
const SLOT_KEYS: &[char] = &[
    'q', 'w', 'e', 'r', 't', 'y', 'u', 'i', 'o', 'p', 'a', 's', 'd', 'f', 'g', 'h', 'j', 'k', 'l', ';',
];

/// Requests a hint. Deliberately outside `SLOT_KEYS`'s row so it can never
/// collide with a slot binding.
const HINT_KEY: char = '?';

/// Terminal Set dealer.
#[derive(Debug, Parser)]
struct Cli {
    /// Number of cards in the deck.
    #[clap(long, default_value_t = 81)]
    deck_size: usize,
    /// Number of slots on the table.
    #[clap(long, default_value_t = 12)]
    table_size: usize,
    /// Number of cards that make up a legal set.
    #[clap(long, default_value_t = 3)]
    feature_size: usize,
    /// Round duration before an automatic reshuffle, in seconds.
    #[clap(long, default_value_t = 60)]
    turn_timeout_secs: u64,
    /// Card placement/removal animation delay, in milliseconds.
    #[clap(long, default_value_t = 150)]
    table_delay_millis: u64,
    /// Freeze duration after a legal set, in milliseconds.
    #[clap(long, default_value_t = 1000)]
    point_freeze_millis: u64,
    /// Freeze duration after an illegal submission, in milliseconds.
    #[clap(long, default_value_t = 3000)]
    penalty_freeze_millis: u64,
    /// Comma-separated player names; the first `--humans` of these are
    /// keyboard-driven, the rest run an AI presser.
    #[clap(long, value_delimiter = ',', default_value = "You,Bot")]
    players: Vec<String>,
    /// How many of `--players`, from the front, are human.
    #[clap(long, default_value_t = 1)]
    humans: usize,
    /// Disables the '?' hint key.
    #[clap(long)]
    no_hints: bool,
}

fn main() -> Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .format_target(false)
        .format_timestamp_millis()
        .init();

    if let Err(err) = run() {
        error!("{err:#}");
        return Err(err);
    }

    Ok(())
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = Config {
        deck_size: cli.deck_size,
        table_size: cli.table_size,
        feature_size: cli.feature_size,
        turn_timeout: Duration::from_secs(cli.turn_timeout_secs),
        table_delay: Duration::from_millis(cli.table_delay_millis),
        point_freeze: Duration::from_millis(cli.point_freeze_millis),
        penalty_freeze: Duration::from_millis(cli.penalty_freeze_millis),
        player_names: cli.players.clone(),
        human_player_count: cli.humans,
        hints: !cli.no_hints,
        ai_sleep_between_keypress: Duration::from_secs(1),
        ai_seed: None,
    };
    config.validate().context("invalid configuration")?;

    let oracle = Arc::new(StandardOracle::new(config.feature_size));
    let ui = Arc::new(TerminalUi::new(config.table_size, config.player_names.clone()));
    let table_size = config.table_size;

    let dealer = Dealer::new(config, oracle, ui).context("failed to start dealer")?;
    let terminate = dealer.terminate_handle();
    let hint = dealer.hint_handle();
    let players = dealer.players().to_vec();

    enable_raw_mode().context("failed to enable terminal raw mode")?;
    let running = Arc::new(AtomicBool::new(true));
    let input_handle = {
        let running = running.clone();
        let terminate = terminate.clone();
        thread::Builder::new()
            .name("input".into())
            .spawn(move || read_input(&players, table_size, &terminate, &hint, &running))
            .expect("failed to spawn input thread")
    };

    info!("dealer running, press Esc to quit, '?' for a hint");
    dealer.run();

    running.store(false, Ordering::Release);
    let _ = disable_raw_mode();
    let _ = input_handle.join();

    Ok(())
}

/// Reads crossterm key events from a dedicated thread and forwards them to
/// the first human player's `key_press`. A single local keyboard can only
/// stand in for one human; configuring more than one human player still
/// works end to end, the rest simply have no input device wired up here.
fn read_input(players: &[Arc<Player>], table_size: usize, terminate: &TerminateHandle, hint: &HintHandle, running: &AtomicBool) {
    let human = players.iter().find(|p| p.is_human());

    while running.load(Ordering::Acquire) {
        let Ok(has_event) = event::poll(Duration::from_millis(100)) else {
            break;
        };
        if !has_event {
            continue;
        }

        let Ok(ev) = event::read() else { break };
        let Event::Key(key) = ev else { continue };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match key.code {
            KeyCode::Esc => {
                terminate.terminate();
                break;
            }
            KeyCode::Char(c) if c == HINT_KEY => {
                hint.request();
            }
            KeyCode::Char(c) => {
                let Some(player) = human else { continue };
                if let Some(slot) = SLOT_KEYS.iter().position(|&k| k == c.to_ascii_lowercase()) {
                    if slot < table_size {
                        player.key_press(slot);
                    }
                }
            }
            _ => {}
        }
    }
}
