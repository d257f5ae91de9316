use serde::{Deserialize, Serialize};

use crate::{
    ClientProfile, TherapistProfile, Urgency,
    tags::{normalize_language, normalize_language_set},
};

/// Outcome of a single review check.
///
/// Pairs are never dropped: a flagged therapist is still ranked, the admin
/// just gets told to look before proposing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReviewDecision {
    /// Needs a human look before the pairing is proposed.
    NeedsReview { reason: String },
    Pass,
}

impl ReviewDecision {
    pub fn needs_review(&self) -> bool {
        matches!(self, ReviewDecision::NeedsReview { .. })
    }

    /// Review reason (`None` for Pass).
    pub fn reason(&self) -> Option<&str> {
        match self {
            ReviewDecision::NeedsReview { reason } => Some(reason),
            ReviewDecision::Pass => None,
        }
    }
}

/// All review decisions for one client/therapist pair.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewSummary {
    pub needs_review: bool,
    /// (check name, decision)
    pub decisions: Vec<(&'static str, ReviewDecision)>,
}

impl ReviewSummary {
    pub fn new(decisions: Vec<(&'static str, ReviewDecision)>) -> Self {
        let needs_review = decisions.iter().any(|(_, d)| d.needs_review());
        Self {
            needs_review,
            decisions,
        }
    }

    /// `"[check] reason"` for every flagged check, in check order.
    pub fn reasons(&self) -> Vec<String> {
        self.decisions
            .iter()
            .filter_map(|(name, d)| d.reason().map(|r| format!("[{name}] {r}")))
            .collect()
    }
}

/// Run every review check for the pair.
pub fn run_review_checks(
    client: &ClientProfile,
    therapist: &TherapistProfile,
    target_slots: u32,
) -> ReviewSummary {
    ReviewSummary::new(vec![
        ("availability", check_availability(therapist)),
        ("language", check_language(client, therapist)),
        ("gender", check_gender(client, therapist)),
        ("urgency", check_urgency(client, therapist, target_slots)),
    ])
}

fn check_availability(therapist: &TherapistProfile) -> ReviewDecision {
    if therapist.available_slots == 0 {
        ReviewDecision::NeedsReview {
            reason: "no_availability: therapist has no open slots".into(),
        }
    } else {
        ReviewDecision::Pass
    }
}

fn check_language(client: &ClientProfile, therapist: &TherapistProfile) -> ReviewDecision {
    let Some(preferred) = client
        .preferred_language
        .as_deref()
        .filter(|l| !l.trim().is_empty())
    else {
        return ReviewDecision::Pass;
    };

    let spoken = normalize_language_set(&therapist.languages);
    let wanted = normalize_language(preferred);
    if spoken.is_empty() {
        ReviewDecision::NeedsReview {
            reason: format!("language_unknown: cannot confirm therapist speaks {wanted}"),
        }
    } else if spoken.contains(&wanted) {
        ReviewDecision::Pass
    } else {
        ReviewDecision::NeedsReview {
            reason: format!("language_mismatch: client prefers {wanted}"),
        }
    }
}

fn check_gender(client: &ClientProfile, therapist: &TherapistProfile) -> ReviewDecision {
    match (client.preferred_gender, therapist.gender) {
        (Some(preferred), Some(actual)) if preferred != actual => ReviewDecision::NeedsReview {
            reason: format!(
                "gender_mismatch: client prefers {}, therapist is {}",
                preferred.as_str(),
                actual.as_str()
            ),
        },
        _ => ReviewDecision::Pass,
    }
}

fn check_urgency(
    client: &ClientProfile,
    therapist: &TherapistProfile,
    target_slots: u32,
) -> ReviewDecision {
    if client.urgency == Urgency::Crisis && therapist.available_slots < target_slots.max(1) {
        ReviewDecision::NeedsReview {
            reason: format!(
                "crisis_capacity: crisis client, therapist has {} of {} target slots",
                therapist.available_slots,
                target_slots.max(1)
            ),
        }
    } else {
        ReviewDecision::Pass
    }
}
