use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::distance::{distance_decay, resolve_distance_km};
use crate::{
    ClientProfile, TherapistProfile,
    tags::{normalize_language, normalize_language_set, normalize_tag_set},
};

/// Neutral score for factors that cannot be evaluated.
pub const NEUTRAL_SCORE: f64 = 0.5;

/// Success rates above this are read as a 0–5 rating instead of a ratio.
const RATING_SCALE_MAX: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FactorStatus {
    PerfectMatch,
    Match,
    PartialMatch,
    Miss,
    Unknown,
}

impl FactorStatus {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.9 {
            FactorStatus::PerfectMatch
        } else if score >= 0.7 {
            FactorStatus::Match
        } else if score >= 0.4 {
            FactorStatus::PartialMatch
        } else {
            FactorStatus::Miss
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FactorStatus::PerfectMatch => "PERFECT_MATCH",
            FactorStatus::Match => "MATCH",
            FactorStatus::PartialMatch => "PARTIAL_MATCH",
            FactorStatus::Miss => "MISS",
            FactorStatus::Unknown => "UNKNOWN",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorScore {
    /// 0.0〜1.0
    pub score: f64,
    pub status: FactorStatus,
    pub details: String,
}

impl FactorScore {
    fn scored(score: f64, details: impl Into<String>) -> Self {
        let score = sanitize(score);
        Self {
            score,
            status: FactorStatus::from_score(score),
            details: details.into(),
        }
    }

    fn neutral(details: impl Into<String>) -> Self {
        Self {
            score: NEUTRAL_SCORE,
            status: FactorStatus::Unknown,
            details: details.into(),
        }
    }
}

fn sanitize(score: f64) -> f64 {
    if score.is_finite() {
        score.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

fn sorted(set: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut items: Vec<String> = set.into_iter().collect();
    items.sort();
    items
}

/// Fraction of the client's concerns covered by `tags`.
fn coverage(concerns: &HashSet<String>, tags: &HashSet<String>) -> (f64, Vec<String>, Vec<String>) {
    let matched = sorted(concerns.intersection(tags).cloned());
    let missing = sorted(concerns.difference(tags).cloned());
    let ratio = matched.len() as f64 / concerns.len() as f64;
    (ratio, matched, missing)
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}

pub fn score_availability(therapist: &TherapistProfile, target_slots: u32) -> FactorScore {
    let slots = therapist.available_slots;
    if slots == 0 {
        return FactorScore {
            score: 0.0,
            status: FactorStatus::Miss,
            details: "no open slots".into(),
        };
    }

    let target = target_slots.max(1);
    FactorScore::scored(
        (slots as f64 / target as f64).min(1.0),
        format!("{slots} open slots (target {target})"),
    )
}

pub fn score_concern_match(client: &ClientProfile, therapist: &TherapistProfile) -> FactorScore {
    let concerns = normalize_tag_set(&client.concerns);
    if concerns.is_empty() {
        return FactorScore::neutral("client has no hulpvragen; neutral score");
    }

    let expertise = normalize_tag_set(&therapist.expertise);
    let (ratio, matched, missing) = coverage(&concerns, &expertise);
    FactorScore::scored(
        ratio,
        format!(
            "{}/{} hulpvragen covered by expertise (matched: {} / missing: {})",
            matched.len(),
            concerns.len(),
            join_or_none(&matched),
            join_or_none(&missing)
        ),
    )
}

pub fn score_specialization(client: &ClientProfile, therapist: &TherapistProfile) -> FactorScore {
    let concerns = normalize_tag_set(&client.concerns);
    if concerns.is_empty() {
        return FactorScore::neutral("client has no hulpvragen; neutral score");
    }

    let specializations = normalize_tag_set(&therapist.specializations);
    let (ratio, matched, _) = coverage(&concerns, &specializations);
    FactorScore::scored(
        ratio,
        format!(
            "{}/{} hulpvragen within specializations ({})",
            matched.len(),
            concerns.len(),
            join_or_none(&matched)
        ),
    )
}

pub fn score_experience(therapist: &TherapistProfile, target_years: f64) -> FactorScore {
    let Some(years) = therapist.experience_years.filter(|y| y.is_finite() && *y >= 0.0) else {
        return FactorScore::neutral("experience unknown; neutral score");
    };

    if target_years <= 0.0 {
        return FactorScore::scored(1.0, format!("{years:.1} years"));
    }

    FactorScore::scored(
        (years / target_years).min(1.0),
        format!("{years:.1} years (target {target_years:.1})"),
    )
}

/// Normalise a success rate given either as ratio (0–1) or rating (0–5).
pub fn normalize_success_rate(raw: f64) -> Option<f64> {
    if !raw.is_finite() || raw < 0.0 {
        return None;
    }

    let ratio = if raw > 1.0 { raw / RATING_SCALE_MAX } else { raw };
    Some(ratio.clamp(0.0, 1.0))
}

pub fn score_success_rate(therapist: &TherapistProfile) -> FactorScore {
    match therapist.success_rate.and_then(normalize_success_rate) {
        Some(ratio) => FactorScore::scored(ratio, format!("success rate {:.0}%", ratio * 100.0)),
        None => FactorScore::neutral("success rate unknown; neutral score"),
    }
}

pub fn score_distance(
    client: &ClientProfile,
    therapist: &TherapistProfile,
    half_life_km: f64,
) -> FactorScore {
    match resolve_distance_km(client, therapist) {
        Some(km) => FactorScore::scored(
            distance_decay(km, half_life_km),
            format!("{km:.1} km (half-life {half_life_km:.0} km)"),
        ),
        None => FactorScore::neutral("distance unknown; neutral score"),
    }
}

pub fn score_language(client: &ClientProfile, therapist: &TherapistProfile) -> FactorScore {
    let Some(preferred) = client
        .preferred_language
        .as_deref()
        .filter(|l| !l.trim().is_empty())
    else {
        return FactorScore::scored(1.0, "no language preference");
    };

    let spoken = normalize_language_set(&therapist.languages);
    if spoken.is_empty() {
        return FactorScore::neutral("therapist languages unknown; neutral score");
    }

    let wanted = normalize_language(preferred);
    if spoken.contains(&wanted) {
        FactorScore::scored(1.0, format!("speaks {wanted}"))
    } else {
        FactorScore::scored(
            0.0,
            format!(
                "does not speak {wanted} (speaks {})",
                sorted(spoken).join(", ")
            ),
        )
    }
}

pub fn score_gender(client: &ClientProfile, therapist: &TherapistProfile) -> FactorScore {
    let Some(preferred) = client.preferred_gender else {
        return FactorScore::scored(1.0, "no gender preference");
    };

    match therapist.gender {
        Some(gender) if gender == preferred => {
            FactorScore::scored(1.0, format!("matches preference {}", preferred.as_str()))
        }
        Some(gender) => FactorScore::scored(
            0.0,
            format!(
                "preference {} vs therapist {}",
                preferred.as_str(),
                gender.as_str()
            ),
        ),
        None => FactorScore::neutral("therapist gender unknown; neutral score"),
    }
}
