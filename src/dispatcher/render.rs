//! Message rendering (§6): urgency icon, triggered user, up to 3 issue
//! bullets, activity name/description/duration/steps. Reserved markup
//! characters in user-controlled strings are escaped before rendering —
//! alert labels and activity content are both core-controlled, but the
//! triggered user id is store-controlled and therefore escaped here.

use crate::types::{AlertKind, Activity, RiskTag, Urgency};

const MAX_BULLETS: usize = 3;

/// Escapes reserved markup characters (`_ * \` [`) so a store-controlled
/// value can't break message formatting (§6).
pub fn escape_markup(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '_' | '*' | '`' | '[' | ']') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn urgency_icon(urgency: Urgency) -> &'static str {
    match urgency {
        Urgency::High => "\u{1F6A8}",
        Urgency::Medium => "\u{26A0}\u{FE0F}",
    }
}

/// Renders the full alert+recommendation message, with accept/postpone/reject
/// buttons keyed by `recommendation_id` (§6).
pub fn render_recommendation_message(
    triggered_user_id: &str,
    alerts: &[AlertKind],
    risk_tag: RiskTag,
    activity: &Activity,
    urgency: Urgency,
) -> String {
    let mut lines = Vec::new();
    lines.push(format!("{} {}", urgency_icon(urgency), title_for(risk_tag)));
    lines.push(format!("User: {}", escape_markup(triggered_user_id)));

    for alert in alerts.iter().take(MAX_BULLETS) {
        lines.push(format!("- {}", alert.label()));
    }

    lines.push(String::new());
    lines.push(format!("Suggested: {} ({})", activity.name, activity.duration));
    lines.push(activity.description.to_string());
    for (i, step) in activity.steps.iter().enumerate() {
        lines.push(format!("{}. {}", i + 1, step));
    }

    lines.join("\n")
}

/// Renders the button-less, informational `posture_l2` message (§4.H step 3).
pub fn render_posture_l2_message(triggered_user_id: &str, alerts: &[AlertKind]) -> String {
    let mut lines = vec![format!("\u{2139}\u{FE0F} Posture check for user {}", escape_markup(triggered_user_id))];
    for alert in alerts.iter().take(MAX_BULLETS) {
        lines.push(format!("- {}", alert.label()));
    }
    lines.join("\n")
}

fn title_for(tag: RiskTag) -> &'static str {
    match tag {
        RiskTag::CriticalPosture => "CRITICAL POSTURE ALERT",
        RiskTag::GeneralPosture => "POSTURE ALERT",
        RiskTag::NeckFlexion => "NECK POSTURE ALERT",
        RiskTag::ShoulderAlignment => "SHOULDER POSTURE ALERT",
        RiskTag::StressHigh => "HIGH STRESS ALERT",
        RiskTag::NegativeEmotion => "WELL-BEING ALERT",
    }
}

/// Opaque callback payloads carried by the three inline buttons (§6).
pub fn callback_payloads(recommendation_id: &str) -> (String, String, String) {
    (
        format!("accept_{recommendation_id}"),
        format!("postpone_{recommendation_id}"),
        format!("reject_{recommendation_id}"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ActivityType;

    #[test]
    fn escapes_reserved_markup_characters() {
        assert_eq!(escape_markup("a_b*c`d[e]"), "a\\_b\\*c\\`d\\[e\\]");
    }

    #[test]
    fn critical_message_contains_title_and_user() {
        let activity = Activity {
            name: "Full Reset",
            activity_type: ActivityType::UrgentBreak,
            duration: "5 min",
            description: "Urgent intervention",
            steps: &["Stand up now"],
        };
        let alerts = vec![AlertKind::CriticalPosture];
        let msg = render_recommendation_message("7", &alerts, RiskTag::CriticalPosture, &activity, Urgency::High);
        assert!(msg.contains("CRITICAL POSTURE ALERT"));
        assert!(msg.contains("User: 7"));
        assert!(msg.contains("Full Reset"));
    }

    #[test]
    fn bullets_are_capped_at_three() {
        let alerts = vec![
            AlertKind::MediumPosture,
            AlertKind::PersistentHighStress,
            AlertKind::MultipleNegative,
            AlertKind::CriticalPosture,
        ];
        let msg = render_posture_l2_message("3", &alerts);
        let bullet_count = msg.lines().filter(|l| l.starts_with("- ")).count();
        assert_eq!(bullet_count, MAX_BULLETS);
    }

    #[test]
    fn callback_payloads_are_prefixed_correctly() {
        let (accept, postpone, reject) = callback_payloads("rec_1_20260101000000_1234");
        assert_eq!(accept, "accept_rec_1_20260101000000_1234");
        assert_eq!(postpone, "postpone_rec_1_20260101000000_1234");
        assert_eq!(reject, "reject_rec_1_20260101000000_1234");
    }
}
