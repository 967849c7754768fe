// Copyright (C) 2025 Set Authors
// SPDX-License-Identifier: Apache-2.0

//! Dealer/table configuration.
use std::time::Duration;
use thiserror::Error;

/// Dealer/table configuration, owned by whoever bootstraps the process.
///
/// The engine never mutates a `Config`: it is read once at `Dealer`
/// construction and held for the lifetime of the run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Number of cards in the deck, `0 <= c < deck_size`.
    pub deck_size: usize,
    /// Number of slots on the table.
    pub table_size: usize,
    /// Number of tokens that make up a submitted set (`SET_SIZE`).
    pub feature_size: usize,
    /// How long a round runs before the dealer reshuffles.
    pub turn_timeout: Duration,
    /// Artificial delay simulating card placement/removal animation.
    pub table_delay: Duration,
    /// How long a player freezes after a legal set.
    pub point_freeze: Duration,
    /// How long a player freezes after an illegal submission.
    pub penalty_freeze: Duration,
    /// Thread labels, also doubling as the player roster.
    pub player_names: Vec<String>,
    /// The first `human_player_count` names are human; the rest run an AI
    /// presser thread.
    pub human_player_count: usize,
    /// Enables the hint emitter.
    pub hints: bool,
    /// How long an AI presser sleeps between key presses, damping its pace.
    pub ai_sleep_between_keypress: Duration,
    /// Seeds each AI presser's RNG deterministically when set; drawn from
    /// entropy per-presser otherwise. Lets a test drive the AI threads
    /// reproducibly.
    pub ai_seed: Option<u64>,
}

/// An error in a user-supplied [`Config`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// There must be at least one player.
    #[error("at least one player is required")]
    NoPlayers,
    /// `human_player_count` can't exceed the roster size.
    #[error("human_player_count ({human}) exceeds player_names.len() ({total})")]
    TooManyHumans {
        /// Configured human count.
        human: usize,
        /// Total roster size.
        total: usize,
    },
    /// The table must hold at least one full set.
    #[error("table_size ({table_size}) must be >= feature_size ({feature_size})")]
    TableSmallerThanSet {
        /// Configured table size.
        table_size: usize,
        /// Configured feature size.
        feature_size: usize,
    },
    /// The deck must be able to fill the table.
    #[error("deck_size ({deck_size}) must be >= table_size ({table_size})")]
    DeckSmallerThanTable {
        /// Configured deck size.
        deck_size: usize,
        /// Configured table size.
        table_size: usize,
    },
    /// `feature_size` must be at least 2 for a set to be meaningful.
    #[error("feature_size ({0}) must be >= 2")]
    FeatureSizeTooSmall(usize),
    /// `feature_size` must divide evenly into `deck_size` for a feature
    /// encoding to cover the deck without leftover cards.
    #[error("feature_size ({feature_size}) does not divide evenly into deck_size ({deck_size})")]
    FeatureSizeTooLarge {
        /// Configured deck size.
        deck_size: usize,
        /// Configured feature size.
        feature_size: usize,
    },
}

impl Config {
    /// Validates the configuration, returning the first violation found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.player_names.is_empty() {
            return Err(ConfigError::NoPlayers);
        }

        if self.human_player_count > self.player_names.len() {
            return Err(ConfigError::TooManyHumans {
                human: self.human_player_count,
                total: self.player_names.len(),
            });
        }

        if self.feature_size < 2 {
            return Err(ConfigError::FeatureSizeTooSmall(self.feature_size));
        }

        if self.table_size < self.feature_size {
            return Err(ConfigError::TableSmallerThanSet {
                table_size: self.table_size,
                feature_size: self.feature_size,
            });
        }

        if self.deck_size < self.table_size {
            return Err(ConfigError::DeckSmallerThanTable {
                deck_size: self.deck_size,
                table_size: self.table_size,
            });
        }

        if self.deck_size % self.feature_size != 0 {
            return Err(ConfigError::FeatureSizeTooLarge {
                deck_size: self.deck_size,
                feature_size: self.feature_size,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            deck_size: 81,
            table_size: 12,
            feature_size: 3,
            turn_timeout: Duration::from_secs(60),
            table_delay: Duration::from_millis(100),
            point_freeze: Duration::from_secs(1),
            penalty_freeze: Duration::from_secs(3),
            player_names: vec!["Alice".into(), "Bob".into()],
            human_player_count: 1,
            hints: true,
            ai_sleep_between_keypress: Duration::from_secs(1),
            ai_seed: Some(42),
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn rejects_empty_roster() {
        let mut config = base_config();
        config.player_names.clear();
        config.human_player_count = 0;
        assert_eq!(config.validate(), Err(ConfigError::NoPlayers));
    }

    #[test]
    fn rejects_table_smaller_than_set() {
        let mut config = base_config();
        config.table_size = 2;
        assert_eq!(
            config.validate(),
            Err(ConfigError::TableSmallerThanSet {
                table_size: 2,
                feature_size: 3
            })
        );
    }

    #[test]
    fn rejects_deck_smaller_than_table() {
        let mut config = base_config();
        config.deck_size = 5;
        assert_eq!(
            config.validate(),
            Err(ConfigError::DeckSmallerThanTable {
                deck_size: 5,
                table_size: 12
            })
        );
    }

    #[test]
    fn rejects_feature_size_that_does_not_divide_deck() {
        let mut config = base_config();
        config.deck_size = 14;
        assert_eq!(
            config.validate(),
            Err(ConfigError::FeatureSizeTooLarge {
                deck_size: 14,
                feature_size: 3
            })
        );
    }
}
