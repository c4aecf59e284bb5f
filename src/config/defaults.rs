//! System-wide default constants.
//!
//! Centralises every numeric default named in spec §4.B, §4.F, §4.G so that
//! [`super::Settings`] can override any of them without scattering magic
//! numbers through the detection, cooldown and training code.

// ============================================================================
// Acute posture detection (§4.B)
// ============================================================================

/// Overall-zone window length for the coarse posture pass (seconds).
pub const POSTURE_WINDOW_SECS: i64 = 10;

/// Per-region window length for the finer region pass (seconds).
pub const POSTURE_REGION_WINDOW_SECS: i64 = 20;

/// Minimum `overall_zone>=4` rows in-window to emit CRITICAL.
pub const POSTURE_CRITICAL_COUNT: usize = 4;

/// Minimum `overall_zone>=3` rows in-window to emit HIGH.
pub const POSTURE_HIGH_COUNT: usize = 5;

/// Minimum `overall_zone>=2` rows in-window to emit MEDIUM.
pub const POSTURE_MEDIUM_COUNT: usize = 6;

/// Minimum per-region count (at zone==2 or zone>=3) to emit a region alert.
pub const POSTURE_REGION_COUNT: usize = 4;

// ============================================================================
// Acute emotion detection (§4.B)
// ============================================================================

/// Negative-emotion window length (seconds).
pub const EMOTION_WINDOW_SECS: i64 = 50;

/// Minimum negative-emotion group size before any per-emotion check runs.
pub const EMOTION_NEGATIVE_GROUP_MIN: usize = 5;

/// Minimum count of one specific emotion to emit "persistent <emotion>".
pub const EMOTION_SAME_COUNT: usize = 4;

/// Minimum total negative count (when no single emotion crosses
/// `EMOTION_SAME_COUNT`) to emit the generic "multiple negative emotions" alert.
pub const EMOTION_MULTI_NEGATIVE_EXTRA: usize = 3;

/// Minimum `stress_level == alto` rows in-window to emit "persistent high stress".
pub const EMOTION_STRESS_COUNT: usize = 4;

// ============================================================================
// Chronic detection (§4.B, §4.K)
// ============================================================================

/// Lookback window for the chronic stress average (days).
pub const CHRONIC_STRESS_WINDOW_DAYS: i64 = 7;

/// Minimum sample count before a chronic stress average is considered reliable.
pub const CHRONIC_STRESS_MIN_SAMPLES: usize = 200;

/// Average numeric stress score (1-10 scale) at/above which chronic stress fires.
pub const CHRONIC_STRESS_THRESHOLD: f64 = 7.0;

/// Lookback window for the chronic posture count (days).
pub const CHRONIC_POSTURE_WINDOW_DAYS: i64 = 14;

/// Count of `neck_lateral_bend>=3` rows at/above which chronic posture fires.
pub const CHRONIC_POSTURE_THRESHOLD: u64 = 800;

// ============================================================================
// Cooldown (§4.G)
// ============================================================================

/// Cooldown for level-3+ posture alerts (seconds).
pub const COOLDOWN_POSTURE_L3_SECS: u64 = 30;

/// Cooldown for level-2 (informational) posture alerts (seconds).
pub const COOLDOWN_POSTURE_L2_SECS: u64 = 30;

/// Cooldown for emotion-domain alerts (seconds).
pub const COOLDOWN_EMOTION_SECS: u64 = 30;

// ============================================================================
// Dispatcher (§4.H, §5)
// ============================================================================

/// Tick interval shared by the posture and emotion dispatcher tasks (seconds).
pub const TICK_INTERVAL_SECS: u64 = 10;

/// Fraction of the tick interval allotted to a single detection query before
/// it is considered to have overrun the tick-local deadline.
pub const TICK_DEADLINE_FRACTION: f64 = 0.8;

/// Grace period awaited for in-flight store writes during shutdown (seconds).
pub const SHUTDOWN_GRACE_SECS: u64 = 2;

/// Per-call timeout applied to every outbound HTTP/RPC call (seconds).
pub const CALL_TIMEOUT_SECS: u64 = 10;

// ============================================================================
// Personalisation model (§4.E, §4.F)
// ============================================================================

/// Embedding dimension `d` for user/context embeddings.
pub const EMBEDDING_DIM: usize = 8;

/// Hidden layer width `H`.
pub const HIDDEN_DIM: usize = 32;

/// Dropout probability, active only during training.
pub const DROPOUT_P: f64 = 0.2;

/// Number of training epochs per run.
pub const TRAIN_EPOCHS: usize = 6;

/// Mini-batch size.
pub const TRAIN_BATCH_SIZE: usize = 32;

/// Adam learning rate.
pub const TRAIN_LEARNING_RATE: f64 = 1e-3;

/// Minimum feedback rows required to attempt training; below this the model
/// is left not-ready (§4.F step 5).
pub const TRAIN_MIN_ROWS: usize = 5;

/// Reward values associated with the 3-class head, indexed `[reject, postpone, accept]`.
pub const CLASS_REWARDS: [f64; 3] = [-1.0, 0.1, 1.0];

// ============================================================================
// Row Store Gateway (§4.A)
// ============================================================================

/// Maximum retry attempts for a transient gateway failure.
pub const GATEWAY_MAX_ATTEMPTS: u32 = 3;

/// Base backoff delay between gateway retries (milliseconds).
pub const GATEWAY_RETRY_BASE_MS: u64 = 200;

/// Random jitter added to each retry delay (milliseconds).
pub const GATEWAY_RETRY_JITTER_MS: u64 = 150;

/// HTTP client timeout for row-store calls (seconds).
pub const GATEWAY_HTTP_TIMEOUT_SECS: u64 = 10;

// ============================================================================
// Gamification (§4.J)
// ============================================================================

pub const GAMIFICATION_POINTS_MIN: f64 = 0.0;
pub const GAMIFICATION_POINTS_MAX: f64 = 10.0;
pub const GAMIFICATION_POINTS_INITIAL: f64 = 10.0;
