use serde::{Deserialize, Serialize};

use crate::{
    card::MAX_HAND_SIZE,
    core::board::{DEFAULT_HEIGHT, DEFAULT_LOCK_DELAY_MILLIS, DEFAULT_WIDTH},
};

/// Tunable parameters of a [`GameSession`](super::GameSession).
///
/// Every field has a default, so a partial JSON document is accepted:
///
/// ```
/// use cardtris_engine::SessionConfig;
///
/// let config: SessionConfig = serde_json::from_str(r#"{ "lock_delay_millis": 300 }"#).unwrap();
/// assert_eq!(config.lock_delay_millis, 300);
/// assert_eq!(config.board_width, 10);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    pub board_width: usize,
    pub board_height: usize,
    /// Fall interval at session start.
    pub fall_interval_millis: u32,
    /// Speed-ups never push the fall interval below this.
    pub min_fall_interval_millis: u32,
    /// Simulated time between two speed-ups.
    pub speed_up_every_millis: u32,
    pub speed_up_step_millis: u32,
    pub lock_delay_millis: u32,
    /// Ticks a direction must be held before auto-repeat starts.
    pub auto_repeat_delay_ticks: u32,
    pub auto_repeat_interval_ticks: u32,
    /// Cards drawn at session start.
    pub initial_hand_size: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            board_width: DEFAULT_WIDTH,
            board_height: DEFAULT_HEIGHT,
            fall_interval_millis: 800,
            min_fall_interval_millis: 80,
            speed_up_every_millis: 30_000,
            speed_up_step_millis: 60,
            lock_delay_millis: DEFAULT_LOCK_DELAY_MILLIS,
            auto_repeat_delay_ticks: 10,
            auto_repeat_interval_ticks: 2,
            initial_hand_size: 2,
        }
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("board must be at least 4x4, got {width}x{height}")]
    BoardTooSmall { width: usize, height: usize },
    #[display("minimum fall interval {min}ms exceeds the initial interval {initial}ms")]
    FallIntervalBelowMinimum { initial: u32, min: u32 },
    #[display("{field} must be positive")]
    Zero { field: &'static str },
    #[display("initial hand size {_0} exceeds the hand limit")]
    HandTooLarge(#[error(not(source))] usize),
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.board_width < 4 || self.board_height < 4 {
            return Err(ConfigError::BoardTooSmall {
                width: self.board_width,
                height: self.board_height,
            });
        }
        if self.min_fall_interval_millis > self.fall_interval_millis {
            return Err(ConfigError::FallIntervalBelowMinimum {
                initial: self.fall_interval_millis,
                min: self.min_fall_interval_millis,
            });
        }
        for (field, value) in [
            ("min_fall_interval_millis", self.min_fall_interval_millis),
            ("speed_up_every_millis", self.speed_up_every_millis),
            ("auto_repeat_interval_ticks", self.auto_repeat_interval_ticks),
        ] {
            if value == 0 {
                return Err(ConfigError::Zero { field });
            }
        }
        if self.initial_hand_size > MAX_HAND_SIZE {
            return Err(ConfigError::HandTooLarge(self.initial_hand_size));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SessionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.fall_interval_millis, 800);
        assert_eq!(config.lock_delay_millis, 500);
    }

    #[test]
    fn test_empty_json_is_default() {
        let config: SessionConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, SessionConfig::default());
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        assert!(serde_json::from_str::<SessionConfig>(r#"{ "speed": 3 }"#).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = SessionConfig {
            board_width: 3,
            ..SessionConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::BoardTooSmall { width: 3, .. })
        ));

        let config = SessionConfig {
            min_fall_interval_millis: 900,
            ..SessionConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::FallIntervalBelowMinimum { .. })
        ));

        let config = SessionConfig {
            auto_repeat_interval_ticks: 0,
            ..SessionConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Zero {
                field: "auto_repeat_interval_ticks"
            })
        ));

        let config = SessionConfig {
            initial_hand_size: 4,
            ..SessionConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::HandTooLarge(4))));
    }
}
