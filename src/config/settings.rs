//! Operator-tunable settings, loaded from TOML with defaults as fallback.

use serde::Deserialize;

use super::defaults;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DetectionSettings {
    pub posture_window_secs: i64,
    pub posture_region_window_secs: i64,
    pub posture_critical_count: usize,
    pub posture_high_count: usize,
    pub posture_medium_count: usize,
    pub posture_region_count: usize,
    pub emotion_window_secs: i64,
    pub emotion_negative_group_min: usize,
    pub emotion_same_count: usize,
    pub emotion_multi_negative_extra: usize,
    pub emotion_stress_count: usize,
    pub chronic_stress_window_days: i64,
    pub chronic_stress_min_samples: usize,
    pub chronic_stress_threshold: f64,
    pub chronic_posture_window_days: i64,
    pub chronic_posture_threshold: u64,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            posture_window_secs: defaults::POSTURE_WINDOW_SECS,
            posture_region_window_secs: defaults::POSTURE_REGION_WINDOW_SECS,
            posture_critical_count: defaults::POSTURE_CRITICAL_COUNT,
            posture_high_count: defaults::POSTURE_HIGH_COUNT,
            posture_medium_count: defaults::POSTURE_MEDIUM_COUNT,
            posture_region_count: defaults::POSTURE_REGION_COUNT,
            emotion_window_secs: defaults::EMOTION_WINDOW_SECS,
            emotion_negative_group_min: defaults::EMOTION_NEGATIVE_GROUP_MIN,
            emotion_same_count: defaults::EMOTION_SAME_COUNT,
            emotion_multi_negative_extra: defaults::EMOTION_MULTI_NEGATIVE_EXTRA,
            emotion_stress_count: defaults::EMOTION_STRESS_COUNT,
            chronic_stress_window_days: defaults::CHRONIC_STRESS_WINDOW_DAYS,
            chronic_stress_min_samples: defaults::CHRONIC_STRESS_MIN_SAMPLES,
            chronic_stress_threshold: defaults::CHRONIC_STRESS_THRESHOLD,
            chronic_posture_window_days: defaults::CHRONIC_POSTURE_WINDOW_DAYS,
            chronic_posture_threshold: defaults::CHRONIC_POSTURE_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CooldownSettings {
    pub posture_l3_secs: u64,
    pub posture_l2_secs: u64,
    pub emotion_secs: u64,
}

impl Default for CooldownSettings {
    fn default() -> Self {
        Self {
            posture_l3_secs: defaults::COOLDOWN_POSTURE_L3_SECS,
            posture_l2_secs: defaults::COOLDOWN_POSTURE_L2_SECS,
            emotion_secs: defaults::COOLDOWN_EMOTION_SECS,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DispatcherSettings {
    pub tick_interval_secs: u64,
    pub tick_deadline_fraction: f64,
    pub shutdown_grace_secs: u64,
    pub call_timeout_secs: u64,
}

impl Default for DispatcherSettings {
    fn default() -> Self {
        Self {
            tick_interval_secs: defaults::TICK_INTERVAL_SECS,
            tick_deadline_fraction: defaults::TICK_DEADLINE_FRACTION,
            shutdown_grace_secs: defaults::SHUTDOWN_GRACE_SECS,
            call_timeout_secs: defaults::CALL_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    pub embedding_dim: usize,
    pub hidden_dim: usize,
    pub dropout_p: f64,
    pub train_epochs: usize,
    pub train_batch_size: usize,
    pub train_learning_rate: f64,
    pub train_min_rows: usize,
    /// Interval between re-training passes, once armed (seconds). `0` disables
    /// the periodic retrain and leaves training to explicit triggers only.
    pub retrain_interval_secs: u64,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            embedding_dim: defaults::EMBEDDING_DIM,
            hidden_dim: defaults::HIDDEN_DIM,
            dropout_p: defaults::DROPOUT_P,
            train_epochs: defaults::TRAIN_EPOCHS,
            train_batch_size: defaults::TRAIN_BATCH_SIZE,
            train_learning_rate: defaults::TRAIN_LEARNING_RATE,
            train_min_rows: defaults::TRAIN_MIN_ROWS,
            retrain_interval_secs: 0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GatewaySettings {
    pub max_attempts: u32,
    pub retry_base_ms: u64,
    pub retry_jitter_ms: u64,
    pub http_timeout_secs: u64,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            max_attempts: defaults::GATEWAY_MAX_ATTEMPTS,
            retry_base_ms: defaults::GATEWAY_RETRY_BASE_MS,
            retry_jitter_ms: defaults::GATEWAY_RETRY_JITTER_MS,
            http_timeout_secs: defaults::GATEWAY_HTTP_TIMEOUT_SECS,
        }
    }
}

/// Top-level operator-tunable configuration.
///
/// Loaded with three-tier precedence (highest first): the file named by the
/// `AEGIS_CONFIG` environment variable, then `aegis.toml` in the working
/// directory, then built-in defaults for any field the file omits.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub detection: DetectionSettings,
    pub cooldown: CooldownSettings,
    pub dispatcher: DispatcherSettings,
    pub model: ModelSettings,
    pub gateway: GatewaySettings,
}

impl Settings {
    /// Loads settings from `AEGIS_CONFIG`, then `aegis.toml`, falling back to
    /// built-in defaults for anything neither source specifies.
    pub fn load() -> Self {
        let path = std::env::var("AEGIS_CONFIG")
            .ok()
            .map(std::path::PathBuf::from)
            .or_else(|| {
                let cwd = std::path::PathBuf::from("aegis.toml");
                cwd.exists().then_some(cwd)
            });

        let Some(path) = path else {
            tracing::info!("no config file found, using built-in defaults");
            return Self::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(raw) => match toml::from_str(&raw) {
                Ok(settings) => {
                    tracing::info!(path = %path.display(), "loaded configuration");
                    settings
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "failed to parse config, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to read config, using defaults");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_constants() {
        let s = Settings::default();
        assert_eq!(s.detection.posture_critical_count, 4);
        assert_eq!(s.cooldown.posture_l3_secs, 30);
        assert_eq!(s.dispatcher.tick_interval_secs, 10);
        assert_eq!(s.model.embedding_dim, 8);
    }

    #[test]
    fn partial_toml_falls_back_for_missing_fields() {
        let toml_str = r#"
            [cooldown]
            posture_l3_secs = 60
        "#;
        let s: Settings = toml::from_str(toml_str).unwrap();
        assert_eq!(s.cooldown.posture_l3_secs, 60);
        assert_eq!(s.cooldown.emotion_secs, 30);
        assert_eq!(s.detection.posture_critical_count, 4);
    }
}
