//! Cooldown Table (§4.G): per-`(subscriber, triggered_user, channel)`
//! last-fire timestamps, guarded by `DashMap` the same way the teacher keeps
//! its pairing/checkpoint stores (`hub/api/pairing.rs`, `hub/api/federation.rs`)
//! lock-free under concurrent single-key writers.

use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::config::CooldownSettings;

/// The three logical alert channels (§3 AlertEvent, §4.G).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    PostureL3,
    PostureL2,
    Emotion,
}

impl Channel {
    fn cooldown(self, settings: &CooldownSettings) -> Duration {
        match self {
            Channel::PostureL3 => Duration::from_secs(settings.posture_l3_secs),
            Channel::PostureL2 => Duration::from_secs(settings.posture_l2_secs),
            Channel::Emotion => Duration::from_secs(settings.emotion_secs),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CooldownKey {
    subscriber_id: String,
    triggered_user_id: String,
    channel: Channel,
}

/// Bounded by `|subscribers| * |users| * 3` entries; never GC'd, matching
/// the spec's "bounded by active population" invariant (§3 AlertEvent).
#[derive(Debug, Default)]
pub struct CooldownTable {
    last_fire: DashMap<CooldownKey, DateTime<Utc>>,
}

impl CooldownTable {
    pub fn new() -> Self {
        Self { last_fire: DashMap::new() }
    }

    /// `is_active(key, now) ⇔ now - last_fire[key] < cooldown(channel)` (§4.G).
    pub fn is_active(&self, subscriber_id: &str, triggered_user_id: &str, channel: Channel, now: DateTime<Utc>, settings: &CooldownSettings) -> bool {
        let key = CooldownKey {
            subscriber_id: subscriber_id.to_string(),
            triggered_user_id: triggered_user_id.to_string(),
            channel,
        };
        let Some(last) = self.last_fire.get(&key) else { return false };
        let elapsed = now.signed_duration_since(*last);
        elapsed < chrono::Duration::from_std(channel.cooldown(settings)).unwrap_or_default()
    }

    /// `fire(key, now)`: sets `last_fire[key] = now`, unconditionally.
    pub fn fire(&self, subscriber_id: &str, triggered_user_id: &str, channel: Channel, now: DateTime<Utc>) {
        let key = CooldownKey {
            subscriber_id: subscriber_id.to_string(),
            triggered_user_id: triggered_user_id.to_string(),
            channel,
        };
        self.last_fire.insert(key, now);
    }

    pub fn len(&self) -> usize {
        self.last_fire.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_fire.is_empty()
    }
}

/// Decides which posture channel, if any, a user's posture alerts should fire
/// through this tick, applying the level-3-preempts-level-2 priority rule
/// (§4.G, §4.H state machine): if any alert is level-3+, only `PostureL3` is
/// considered and level-2 is suppressed entirely for this user this tick.
pub fn posture_channel_for(alerts: &[crate::types::AlertKind]) -> Option<Channel> {
    if alerts.iter().any(crate::types::AlertKind::is_posture_level3_plus) {
        Some(Channel::PostureL3)
    } else if alerts.iter().any(crate::types::AlertKind::is_posture_level2) {
        Some(Channel::PostureL2)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn settings() -> CooldownSettings {
        CooldownSettings { posture_l3_secs: 30, posture_l2_secs: 30, emotion_secs: 30 }
    }

    #[test]
    fn fresh_key_is_not_active() {
        let table = CooldownTable::new();
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        assert!(!table.is_active("100", "7", Channel::PostureL3, now, &settings()));
    }

    #[test]
    fn fired_key_is_active_until_cooldown_elapses() {
        let table = CooldownTable::new();
        let t0 = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        table.fire("100", "7", Channel::PostureL3, t0);

        assert!(table.is_active("100", "7", Channel::PostureL3, t0 + chrono::Duration::seconds(29), &settings()));
        assert!(!table.is_active("100", "7", Channel::PostureL3, t0 + chrono::Duration::seconds(30), &settings()));
    }

    #[test]
    fn channels_are_independent_per_key() {
        let table = CooldownTable::new();
        let t0 = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        table.fire("100", "7", Channel::PostureL3, t0);
        assert!(!table.is_active("100", "7", Channel::PostureL2, t0, &settings()));
        assert!(!table.is_active("200", "7", Channel::PostureL3, t0, &settings()));
        assert!(!table.is_active("100", "8", Channel::PostureL3, t0, &settings()));
    }

    #[test]
    fn level3_preempts_level2_priority() {
        use crate::types::AlertKind;
        let alerts = vec![AlertKind::MediumPosture, AlertKind::CriticalPosture];
        assert_eq!(posture_channel_for(&alerts), Some(Channel::PostureL3));

        let only_l2 = vec![AlertKind::MediumPosture];
        assert_eq!(posture_channel_for(&only_l2), Some(Channel::PostureL2));

        let none: Vec<AlertKind> = vec![];
        assert_eq!(posture_channel_for(&none), None);
    }
}
