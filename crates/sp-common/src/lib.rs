pub mod api;
pub mod logging;
pub mod matching;
pub mod run_id;
pub mod tags;

#[cfg(test)]
mod test_support;

use serde::{Deserialize, Serialize};

// Commonly used data models for pairing functions.

/// Client record as loaded from the practice system.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientProfile {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    /// Hulpvragen: the presenting problems the client asked help for.
    #[serde(default, alias = "hulpvragen")]
    pub concerns: Vec<String>,
    #[serde(default)]
    pub urgency: Urgency,
    #[serde(default)]
    pub location: Option<GeoLocation>,
    #[serde(default)]
    pub preferred_language: Option<String>,
    #[serde(default)]
    pub preferred_gender: Option<Gender>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TherapistProfile {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub specializations: Vec<String>,
    #[serde(default)]
    pub expertise: Vec<String>,
    #[serde(default)]
    pub available_slots: u32,
    #[serde(default)]
    pub experience_years: Option<f64>,
    /// Either a 0–1 ratio or a 0–5 rating, depending on the source.
    #[serde(default)]
    pub success_rate: Option<f64>,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub distance_km: Option<f64>,
    #[serde(default)]
    pub location: Option<GeoLocation>,
    #[serde(default)]
    pub gender: Option<Gender>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    #[serde(default)]
    pub city: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    #[serde(alias = "laag")]
    Low,
    #[default]
    #[serde(alias = "normaal", alias = "medium")]
    Normal,
    #[serde(alias = "hoog")]
    High,
    #[serde(alias = "acuut", alias = "urgent")]
    Crisis,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Low => "low",
            Urgency::Normal => "normal",
            Urgency::High => "high",
            Urgency::Crisis => "crisis",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    #[serde(alias = "vrouw", alias = "v", alias = "f", alias = "woman")]
    Female,
    #[serde(alias = "man", alias = "m")]
    Male,
    #[serde(alias = "x", alias = "nonbinary", alias = "non-binary")]
    NonBinary,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Female => "female",
            Gender::Male => "male",
            Gender::NonBinary => "non_binary",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_dutch_aliases() {
        let client: ClientProfile = serde_json::from_str(
            r#"{"id": 7, "hulpvragen": ["angst"], "urgency": "hoog", "preferred_gender": "vrouw"}"#,
        )
        .unwrap();

        assert_eq!(client.concerns, vec!["angst".to_string()]);
        assert_eq!(client.urgency, Urgency::High);
        assert_eq!(client.preferred_gender, Some(Gender::Female));
        assert!(client.location.is_none());
    }

    #[test]
    fn therapist_collections_default_to_empty() {
        let therapist: TherapistProfile = serde_json::from_str(r#"{"id": 3}"#).unwrap();

        assert!(therapist.expertise.is_empty());
        assert_eq!(therapist.available_slots, 0);
        assert_eq!(therapist.success_rate, None);
    }
}
