//! Heuristic facet/column resolution.
//!
//! The same matcher serves two jobs: picking a facet value (a state, a
//! sector, a fuel type) from a metadata listing, and picking which schema
//! field carries a desired quantity among many possible column names. Only
//! the candidate source differs.
//!
//! Pure functions over immutable slices; no network access.

use serde::Deserialize;

use crate::errors::Error;

/// One facet value or schema field as listed by a metadata endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Candidate {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub alias: Option<String>,
}

impl Candidate {
    pub fn new(id: &str) -> Self {
        Candidate {
            id: id.to_string(),
            name: None,
            alias: None,
        }
    }

    pub fn named(id: &str, name: &str) -> Self {
        Candidate {
            id: id.to_string(),
            name: Some(name.to_string()),
            alias: None,
        }
    }

    /// Identifier, display name, and alias concatenated and normalized for
    /// substring matching.
    fn haystack(&self) -> String {
        let mut blob = normalize_key(&self.id);
        if let Some(name) = &self.name {
            blob.push_str(&normalize_key(name));
        }
        if let Some(alias) = &self.alias {
            blob.push_str(&normalize_key(alias));
        }
        blob
    }
}

/// Ordered matching preferences: exact identifiers first, then substring
/// needles. Both lists rank earlier entries higher.
#[derive(Debug, Clone, Default)]
pub struct PreferenceList {
    pub exact: Vec<String>,
    pub substrings: Vec<String>,
}

impl PreferenceList {
    pub fn new(exact: &[&str], substrings: &[&str]) -> Self {
        PreferenceList {
            exact: exact.iter().map(|s| s.to_string()).collect(),
            substrings: substrings.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// What to do when no candidate satisfies the preference lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackPolicy {
    /// Degrade to the first candidate the service listed.
    FirstAvailable,
    /// Surface [`Error::Resolution`].
    Fail,
}

/// Strips non-alphanumeric characters and lowercases, so `"NET-Generation"`,
/// `"net_generation"`, and `"netgeneration"` all compare equal.
pub fn normalize_key(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

/// Picks the best candidate for the given preferences.
///
/// Tie-break order, strictly: exact identifier matches in preference-list
/// order, then substring matches against the candidate's id/name/alias in
/// preference-list order (first needle wins, first matching candidate
/// wins), then `None`. All comparison happens on normalized keys.
pub fn resolve<'a>(candidates: &'a [Candidate], prefs: &PreferenceList) -> Option<&'a str> {
    for want in &prefs.exact {
        let want = normalize_key(want);
        if want.is_empty() {
            continue;
        }
        for candidate in candidates {
            if normalize_key(&candidate.id) == want {
                return Some(&candidate.id);
            }
        }
    }

    for needle in &prefs.substrings {
        let needle = normalize_key(needle);
        if needle.is_empty() {
            continue;
        }
        for candidate in candidates {
            if candidate.haystack().contains(&needle) {
                return Some(&candidate.id);
            }
        }
    }

    None
}

/// [`resolve`], with the no-match case decided by an explicit policy.
pub fn resolve_or_fallback<'a>(
    subject: &str,
    candidates: &'a [Candidate],
    prefs: &PreferenceList,
    policy: FallbackPolicy,
) -> Result<&'a str, Error> {
    if let Some(id) = resolve(candidates, prefs) {
        return Ok(id);
    }
    match policy {
        FallbackPolicy::FirstAvailable => match candidates.first() {
            Some(candidate) => {
                tracing::warn!(
                    subject,
                    fallback = %candidate.id,
                    "no preferred candidate matched; using first available"
                );
                Ok(&candidate.id)
            }
            None => Err(Error::Resolution {
                subject: subject.to_string(),
            }),
        },
        FallbackPolicy::Fail => Err(Error::Resolution {
            subject: subject.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_id_match() {
        let candidates = vec![Candidate::new("AZ"), Candidate::new("CA")];
        let prefs = PreferenceList::new(&["AZ"], &[]);
        assert_eq!(resolve(&candidates, &prefs), Some("AZ"));
    }

    #[test]
    fn substring_match_over_name() {
        let candidates = vec![Candidate::named("ALL_FUELS", "All fuel types")];
        let prefs = PreferenceList::new(&["TOTAL"], &["all"]);
        assert_eq!(resolve(&candidates, &prefs), Some("ALL_FUELS"));
    }

    #[test]
    fn exact_outranks_substring() {
        // "gen" would match the first candidate by substring, but the
        // exact preference pins the second.
        let candidates = vec![
            Candidate::named("gross-generation", "Gross generation"),
            Candidate::named("net-generation", "Net generation"),
        ];
        let prefs = PreferenceList::new(&["net_generation"], &["gen"]);
        assert_eq!(resolve(&candidates, &prefs), Some("net-generation"));
    }

    #[test]
    fn preference_order_wins_over_candidate_order() {
        let candidates = vec![Candidate::new("US-CO"), Candidate::new("US-AZ")];
        let prefs = PreferenceList::new(&["US-AZ", "US-CO"], &[]);
        assert_eq!(resolve(&candidates, &prefs), Some("US-AZ"));
    }

    #[test]
    fn first_needle_wins_then_first_candidate() {
        let candidates = vec![
            Candidate::named("HYD", "Hydroelectric"),
            Candidate::named("SUN", "Solar total"),
            Candidate::named("WND", "Wind total"),
        ];
        let prefs = PreferenceList::new(&[], &["total", "hydro"]);
        // "total" is ranked first and first matches SUN.
        assert_eq!(resolve(&candidates, &prefs), Some("SUN"));
    }

    #[test]
    fn normalization_bridges_separators_and_case() {
        let candidates = vec![Candidate::new("net-generation")];
        let prefs = PreferenceList::new(&["NET_GENERATION"], &[]);
        assert_eq!(resolve(&candidates, &prefs), Some("net-generation"));
    }

    #[test]
    fn alias_participates_in_substring_match() {
        let candidates = vec![Candidate {
            id: "99".to_string(),
            name: None,
            alias: Some("(AZ) Arizona".to_string()),
        }];
        let prefs = PreferenceList::new(&[], &["arizona"]);
        assert_eq!(resolve(&candidates, &prefs), Some("99"));
    }

    #[test]
    fn no_match_returns_none() {
        let candidates = vec![Candidate::new("COW"), Candidate::new("PEL")];
        let prefs = PreferenceList::new(&["ALL"], &["total"]);
        assert_eq!(resolve(&candidates, &prefs), None);
    }

    #[test]
    fn resolution_is_deterministic() {
        let candidates = vec![
            Candidate::named("A1", "alpha one"),
            Candidate::named("A2", "alpha two"),
        ];
        let prefs = PreferenceList::new(&[], &["alpha"]);
        let first = resolve(&candidates, &prefs);
        for _ in 0..10 {
            assert_eq!(resolve(&candidates, &prefs), first);
        }
    }

    #[test]
    fn fallback_first_available() {
        let candidates = vec![Candidate::new("COW"), Candidate::new("PEL")];
        let prefs = PreferenceList::new(&["ALL"], &[]);
        let id = resolve_or_fallback("fueltypeid", &candidates, &prefs, FallbackPolicy::FirstAvailable)
            .unwrap();
        assert_eq!(id, "COW");
    }

    #[test]
    fn fallback_fail_surfaces_resolution_error() {
        let candidates = vec![Candidate::new("COW")];
        let prefs = PreferenceList::new(&["ALL"], &[]);
        let err = resolve_or_fallback("fueltypeid", &candidates, &prefs, FallbackPolicy::Fail)
            .unwrap_err();
        assert!(matches!(err, Error::Resolution { subject } if subject == "fueltypeid"));
    }

    #[test]
    fn empty_candidate_set_fails_either_way() {
        let prefs = PreferenceList::new(&["ALL"], &["total"]);
        assert!(resolve_or_fallback("sectorid", &[], &prefs, FallbackPolicy::FirstAvailable).is_err());
        assert!(resolve_or_fallback("sectorid", &[], &prefs, FallbackPolicy::Fail).is_err());
    }
}
