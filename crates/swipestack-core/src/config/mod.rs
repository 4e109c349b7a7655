//! Configuration loading and validation.
//!
//! Every section is optional; missing values fall back to defaults.
//!
//! ```toml
//! [logging]
//! level = "debug"
//!
//! [classifier]
//! velocity_trigger = 0.2
//! distance_threshold = 100.0
//!
//! [motion]
//! viewport_width = 390.0
//! fly_off = { tension = 200.0, friction = 50.0 }
//!
//! [session]
//! user_id = "alice"
//! stake = "0.01"
//! filter = { category = "crypto", limit = 10 }
//! ```

mod logging;

use std::path::Path;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::Deserialize;

pub use self::logging::LoggingConfig;
use crate::domain::{ClassifierConfig, default_stake};
use crate::engine::{EngineSettings, GestureConfig, MotionConfig, SpringConfig};
use crate::error::ConfigError;
use crate::ports::ItemFilter;

/// Session-level settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Stake attached to agree/disagree outcomes (ETH).
    pub stake: Decimal,
    pub user_id: String,
    pub filter: ItemFilter,
    /// |dx| (px) past which the tick/cross hint shows.
    pub feedback_threshold: f32,
    /// Animation frame interval of the async driver.
    pub frame_interval_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            stake: default_stake(),
            user_id: "anonymous".into(),
            filter: ItemFilter::default(),
            feedback_threshold: 50.0,
            frame_interval_ms: 16,
        }
    }
}

impl SessionConfig {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub gesture: GestureConfig,
    pub classifier: ClassifierConfig,
    pub motion: MotionConfig,
    pub session: SessionConfig,
}

impl Config {
    /// Parse and validate TOML content.
    pub fn parse_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    pub fn init_logging(&self) {
        self.logging.init();
    }

    /// Engine tunables assembled from the gesture, classifier, motion and session sections.
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            gesture: self.gesture.clone(),
            classifier: self.classifier.clone(),
            motion: self.motion.clone(),
            stake: self.session.stake,
            feedback_threshold: self.session.feedback_threshold,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("classifier.velocity_trigger", self.classifier.velocity_trigger)?;
        positive("classifier.distance_threshold", self.classifier.distance_threshold)?;
        if self.gesture.stale_release_ms < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "gesture.stale_release_ms",
                reason: "must be 0 or greater".to_string(),
            });
        }

        let m = &self.motion;
        positive("motion.viewport_width", m.viewport_width)?;
        positive("motion.viewport_height", m.viewport_height)?;
        positive("motion.lift_scale", m.lift_scale)?;
        positive("motion.flick_unit", m.flick_unit)?;
        positive("motion.max_tick_ms", m.max_tick_ms)?;
        positive("motion.settle_timeout_ms", m.settle_timeout_ms)?;
        if m.offstage_margin < 0.0 || m.flick_boost_cap < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "motion.offstage_margin",
                reason: "margin and flick boost cap must be 0 or greater".to_string(),
            });
        }
        spring("motion.follow", &m.follow)?;
        spring("motion.spring_back", &m.spring_back)?;
        spring("motion.fly_off", &m.fly_off)?;
        spring("motion.next_card", &m.next_card)?;
        for (field, value) in [
            ("motion.next_rest_opacity", m.next_rest_opacity),
            ("motion.next_hint_opacity", m.next_hint_opacity),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: "must be between 0 and 1".to_string(),
                });
            }
        }

        let s = &self.session;
        if s.stake <= Decimal::ZERO {
            return Err(ConfigError::InvalidValue {
                field: "session.stake",
                reason: "must be greater than 0".to_string(),
            });
        }
        if s.user_id.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "session.user_id",
            });
        }
        if s.filter.limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "session.filter.limit",
                reason: "must be greater than 0".to_string(),
            });
        }
        if s.frame_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "session.frame_interval_ms",
                reason: "must be greater than 0".to_string(),
            });
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 {
        return Ok(());
    }
    Err(ConfigError::InvalidValue {
        field,
        reason: format!("must be greater than 0, got {value}"),
    })
}

fn spring(field: &'static str, config: &SpringConfig) -> Result<(), ConfigError> {
    if config.is_valid() {
        return Ok(());
    }
    Err(ConfigError::InvalidValue {
        field,
        reason: format!(
            "tension and mass must be > 0 and friction >= 0, got {config:?}"
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Category;

    #[test]
    fn empty_file_is_all_defaults() {
        let config = Config::parse_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.classifier.velocity_trigger, 0.2);
        assert_eq!(config.classifier.distance_threshold, 100.0);
        assert_eq!(config.session.stake, default_stake());
        assert_eq!(config.session.filter.limit, 10);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = Config::parse_toml(
            r#"
            [classifier]
            distance_threshold = 80.0

            [motion]
            viewport_width = 390.0
            fly_off = { tension = 300.0, friction = 40.0 }

            [session]
            user_id = "alice"
            stake = "0.05"
            filter = { category = "sports" }
            "#,
        )
        .unwrap();

        assert_eq!(config.classifier.distance_threshold, 80.0);
        assert_eq!(config.classifier.velocity_trigger, 0.2);
        assert_eq!(config.motion.viewport_width, 390.0);
        assert_eq!(config.motion.fly_off, SpringConfig::new(300.0, 40.0));
        assert_eq!(config.motion.spring_back, SpringConfig::new(500.0, 50.0));
        assert_eq!(config.session.user_id, "alice");
        assert_eq!(config.session.stake, Decimal::new(5, 2));
        assert_eq!(config.session.filter.category, Some(Category::Sports));
        assert_eq!(config.session.filter.limit, 10);

        let settings = config.engine_settings();
        assert_eq!(settings.stake, Decimal::new(5, 2));
        assert_eq!(settings.classifier.distance_threshold, 80.0);
    }

    #[test]
    fn rejects_non_positive_threshold() {
        let err = Config::parse_toml("[classifier]\nvelocity_trigger = 0.0\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                field: "classifier.velocity_trigger",
                ..
            }
        ));
    }

    #[test]
    fn rejects_zero_tension() {
        let err = Config::parse_toml("[motion]\nspring_back = { tension = 0.0, friction = 50.0 }\n")
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                field: "motion.spring_back",
                ..
            }
        ));
    }

    #[test]
    fn rejects_blank_user() {
        let err = Config::parse_toml("[session]\nuser_id = \"  \"\n").unwrap_err();
        assert!(matches!(err, ConfigError::MissingField { .. }));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = Config::parse_toml("[classifier\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = Config::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile(_)));
    }
}
