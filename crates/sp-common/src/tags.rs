use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use strsim::damerau_levenshtein;
use unicode_normalization::UnicodeNormalization;

type AliasTable = &'static [(&'static str, &'static [&'static str])];

/// Hulpvraag / expertise aliases → canonical concern key.
///
/// Intake forms are filled in Dutch, therapist profiles are often English.
const CONCERN_ALIASES: AliasTable = &[
    (
        "anxiety",
        &[
            "angst",
            "angsten",
            "angststoornis",
            "angstklachten",
            "paniek",
            "paniekaanvallen",
            "anxiety",
            "anxiety disorder",
            "panic",
            "panic attacks",
            "sociale angst",
            "social anxiety",
        ],
    ),
    (
        "depression",
        &[
            "depressie",
            "depressief",
            "depressieve klachten",
            "somberheid",
            "somber",
            "depression",
            "depressive",
            "low mood",
        ],
    ),
    (
        "trauma",
        &[
            "trauma",
            "traumaverwerking",
            "ptss",
            "ptsd",
            "posttraumatische stress",
            "post-traumatic stress",
            "emdr",
        ],
    ),
    (
        "burnout",
        &[
            "burn-out",
            "burnout",
            "burn out",
            "overspannen",
            "overspannenheid",
            "werkstress",
            "stress",
            "work stress",
        ],
    ),
    (
        "grief",
        &[
            "rouw",
            "rouwverwerking",
            "verlies",
            "grief",
            "bereavement",
            "loss",
        ],
    ),
    (
        "relationship",
        &[
            "relatie",
            "relaties",
            "relatieproblemen",
            "relatietherapie",
            "relationship",
            "relationships",
            "relationship issues",
            "couples therapy",
        ],
    ),
    (
        "self_esteem",
        &[
            "zelfbeeld",
            "zelfvertrouwen",
            "onzekerheid",
            "faalangst",
            "self-esteem",
            "self esteem",
            "self-worth",
            "confidence",
        ],
    ),
    (
        "addiction",
        &[
            "verslaving",
            "middelengebruik",
            "alcohol",
            "gokken",
            "addiction",
            "substance use",
            "gambling",
        ],
    ),
    (
        "eating_disorder",
        &[
            "eetstoornis",
            "eetproblemen",
            "anorexia",
            "boulimia",
            "eating disorder",
            "binge eating",
        ],
    ),
    ("adhd", &["adhd", "add", "aandachtstekort", "attention deficit"]),
    ("autism", &["autisme", "ass", "autism", "asd", "autism spectrum"]),
    (
        "ocd",
        &[
            "ocd",
            "dwang",
            "dwangstoornis",
            "dwanggedachten",
            "obsessive compulsive",
        ],
    ),
    (
        "sleep",
        &[
            "slaapproblemen",
            "slapeloosheid",
            "insomnia",
            "sleep problems",
        ],
    ),
    (
        "personality",
        &[
            "persoonlijkheidsstoornis",
            "borderline",
            "personality disorder",
        ],
    ),
    (
        "phobia",
        &["fobie", "fobieen", "phobia", "specific phobia", "hoogtevrees"],
    ),
    (
        "parenting",
        &["opvoeding", "opvoedingsvragen", "ouderschap", "parenting"],
    ),
];

const LANGUAGE_ALIASES: AliasTable = &[
    ("dutch", &["nl", "nld", "nederlands", "dutch", "vlaams", "flemish"]),
    ("english", &["en", "eng", "engels", "english"]),
    ("german", &["de", "deu", "duits", "german", "deutsch"]),
    ("french", &["fr", "fra", "frans", "french", "francais"]),
    ("turkish", &["tr", "tur", "turks", "turkish", "turkce"]),
    ("arabic", &["ar", "ara", "arabisch", "arabic"]),
    ("spanish", &["es", "spa", "spaans", "spanish", "espanol"]),
    ("polish", &["pl", "pol", "pools", "polish", "polski"]),
    ("papiamento", &["pap", "papiaments", "papiamento"]),
];

static CONCERN_LOOKUP: LazyLock<AliasLookup> = LazyLock::new(|| AliasLookup::new(CONCERN_ALIASES));
static LANGUAGE_LOOKUP: LazyLock<AliasLookup> =
    LazyLock::new(|| AliasLookup::new(LANGUAGE_ALIASES));

struct AliasLookup {
    exact: HashMap<String, &'static str>,
    compact: HashMap<String, &'static str>,
}

impl AliasLookup {
    fn new(table: AliasTable) -> Self {
        let mut exact = HashMap::new();
        let mut compact = HashMap::new();

        for (canonical, aliases) in table {
            exact.insert(canonical.to_string(), *canonical);
            compact.entry(compact_key(canonical)).or_insert(*canonical);
            for alias in *aliases {
                let key = nfkc_lower_trim(alias);
                compact.entry(compact_key(&key)).or_insert(*canonical);
                exact.insert(key, *canonical);
            }
        }

        Self { exact, compact }
    }

    fn canonical(&self, token: &str) -> Option<&'static str> {
        if token.is_empty() {
            return None;
        }

        if let Some(canonical) = self.exact.get(token) {
            return Some(*canonical);
        }

        let compact = compact_key(token);
        if let Some(canonical) = self.compact.get(&compact) {
            return Some(*canonical);
        }

        self.fuzzy(&compact)
    }

    fn fuzzy(&self, compact: &str) -> Option<&'static str> {
        // Short tokens (adhd, ocd, nl) only match exactly; fuzzy matching them
        // produces too many false positives.
        if compact.chars().count() < 5 {
            return None;
        }

        let mut best: Option<(&'static str, usize)> = None;
        for (alias, &canonical) in &self.compact {
            if alias.chars().count() < 5 {
                continue;
            }

            let distance = damerau_levenshtein(compact, alias);
            let len = compact.chars().count().max(alias.chars().count());
            let acceptable = distance <= 1 || (len >= 9 && distance == 2);
            if !acceptable {
                continue;
            }

            match best {
                None => best = Some((canonical, distance)),
                Some((_, best_dist)) if distance < best_dist => best = Some((canonical, distance)),
                Some((current, best_dist)) if distance == best_dist && canonical < current => {
                    best = Some((canonical, distance))
                }
                _ => {}
            }
        }

        best.map(|(canonical, _)| canonical)
    }
}

fn nfkc_lower_trim(input: &str) -> String {
    input.nfkc().collect::<String>().trim().to_lowercase()
}

fn compact_key(input: &str) -> String {
    input
        .nfkc()
        .collect::<String>()
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, ' ' | '.' | '-' | '_' | '/' | ',' | '\''))
        .collect()
}

fn normalize_with(lookup: &AliasLookup, raw: &str) -> String {
    let normalized = nfkc_lower_trim(raw);
    lookup
        .canonical(&normalized)
        .map(str::to_string)
        .unwrap_or(normalized)
}

/// Concern / expertise tag → canonical key. Unknown tags are returned
/// NFKC-lowercased so identical free text still matches.
pub fn normalize_tag(tag: &str) -> String {
    normalize_with(&CONCERN_LOOKUP, tag)
}

/// Tag list → normalised set, blanks dropped.
pub fn normalize_tag_set(tags: &[String]) -> HashSet<String> {
    tags.iter()
        .filter(|t| !t.trim().is_empty())
        .map(|t| normalize_tag(t))
        .collect()
}

pub fn normalize_language(language: &str) -> String {
    normalize_with(&LANGUAGE_LOOKUP, language)
}

pub fn normalize_language_set(languages: &[String]) -> HashSet<String> {
    languages
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| normalize_language(l))
        .collect()
}

/// Sorted, deduplicated canonical tags (for display and snapshots).
pub fn normalize_tags_vec(tags: &[String]) -> Vec<String> {
    let mut result: Vec<String> = normalize_tag_set(tags).into_iter().collect();
    result.sort();
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dutch_and_english_aliases_share_a_key() {
        assert_eq!(normalize_tag("Angst"), "anxiety");
        assert_eq!(normalize_tag("anxiety disorder"), "anxiety");
        assert_eq!(normalize_tag("PTSS"), "trauma");
        assert_eq!(normalize_tag("Burn-out"), "burnout");
        assert_eq!(normalize_tag("  somberheid "), "depression");
    }

    #[test]
    fn compact_key_ignores_separators() {
        assert_eq!(normalize_tag("self  esteem"), "self_esteem");
        assert_eq!(normalize_tag("Burn Out"), "burnout");
    }

    #[test]
    fn fuzzy_match_tolerates_small_typos() {
        assert_eq!(normalize_tag("depresie"), "depression");
        assert_eq!(normalize_tag("rouwverwerkng"), "grief");
    }

    #[test]
    fn short_tokens_do_not_fuzzy_match() {
        assert_eq!(normalize_tag("adh"), "adh");
        assert_eq!(normalize_tag("ADHD"), "adhd");
    }

    #[test]
    fn unknown_tags_pass_through_normalised() {
        assert_eq!(normalize_tag("  Hoogsensitiviteit "), "hoogsensitiviteit");
    }

    #[test]
    fn tag_set_drops_blanks_and_dedups() {
        let set = normalize_tag_set(&[
            "angst".into(),
            "Anxiety".into(),
            " ".into(),
            "rouw".into(),
        ]);
        assert_eq!(set.len(), 2);
        assert!(set.contains("anxiety"));
        assert!(set.contains("grief"));
    }

    #[test]
    fn languages_normalise_codes_and_names() {
        assert_eq!(normalize_language("NL"), "dutch");
        assert_eq!(normalize_language("Nederlands"), "dutch");
        assert_eq!(normalize_language("engels"), "english");
        assert_eq!(normalize_language("Farsi"), "farsi");
    }

    #[test]
    fn tags_vec_is_sorted() {
        let tags = normalize_tags_vec(&["trauma".into(), "angst".into(), "ptsd".into()]);
        assert_eq!(tags, vec!["anxiety".to_string(), "trauma".to_string()]);
    }
}
