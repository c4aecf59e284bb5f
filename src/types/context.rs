//! Time-of-day context index (§4.E) and the derived interaction tensor (§3, §4.F).

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeContext {
    Morning,
    Afternoon,
    Evening,
}

impl TimeContext {
    pub const COUNT: usize = 3;

    /// `[0,12)=morning, [12,18)=afternoon, else evening`, per local hour (§4.E).
    pub fn from_hour(hour: u32) -> Self {
        if hour < 12 {
            TimeContext::Morning
        } else if hour < 18 {
            TimeContext::Afternoon
        } else {
            TimeContext::Evening
        }
    }

    pub fn from_timestamp(ts: DateTime<Utc>) -> Self {
        Self::from_hour(ts.hour())
    }

    pub fn index(&self) -> usize {
        match self {
            TimeContext::Morning => 0,
            TimeContext::Afternoon => 1,
            TimeContext::Evening => 2,
        }
    }
}

use chrono::Timelike;

/// Dense 3-axis reward table over `(user_index, context_index, activity_index)`,
/// rebuilt on each training run from the feedback corpus (§3 InteractionTensor).
#[derive(Debug, Clone)]
pub struct InteractionTensor {
    pub n_users: usize,
    pub n_contexts: usize,
    pub n_activities: usize,
    /// Row-major `[user][context][activity]`, `None` where no feedback cell exists.
    data: Vec<Option<f64>>,
}

impl InteractionTensor {
    pub fn new(n_users: usize, n_contexts: usize, n_activities: usize) -> Self {
        Self {
            n_users,
            n_contexts,
            n_activities,
            data: vec![None; n_users * n_contexts * n_activities],
        }
    }

    fn idx(&self, u: usize, c: usize, a: usize) -> usize {
        (u * self.n_contexts + c) * self.n_activities + a
    }

    pub fn get(&self, u: usize, c: usize, a: usize) -> Option<f64> {
        self.data[self.idx(u, c, a)]
    }

    /// Sets the most-recent reward for a cell (§4.F step 3 — "filled with the
    /// most recent reward per cell" means later writes simply overwrite).
    pub fn set(&mut self, u: usize, c: usize, a: usize, reward: f64) {
        let idx = self.idx(u, c, a);
        self.data[idx] = Some(reward);
    }

    pub fn dense(&self, fill: f64) -> Vec<f64> {
        self.data.iter().map(|v| v.unwrap_or(fill)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_boundaries_match_spec() {
        assert_eq!(TimeContext::from_hour(0), TimeContext::Morning);
        assert_eq!(TimeContext::from_hour(11), TimeContext::Morning);
        assert_eq!(TimeContext::from_hour(12), TimeContext::Afternoon);
        assert_eq!(TimeContext::from_hour(17), TimeContext::Afternoon);
        assert_eq!(TimeContext::from_hour(18), TimeContext::Evening);
        assert_eq!(TimeContext::from_hour(23), TimeContext::Evening);
    }

    #[test]
    fn tensor_overwrites_with_most_recent() {
        let mut t = InteractionTensor::new(2, 3, 2);
        t.set(0, 0, 0, 1.0);
        t.set(0, 0, 0, -1.0);
        assert_eq!(t.get(0, 0, 0), Some(-1.0));
        assert_eq!(t.get(1, 1, 1), None);
    }
}
