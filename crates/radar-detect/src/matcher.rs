use radar_core::CompanyDatabase;
use std::collections::HashSet;

/// Minimum key length for the substring strategy; shorter keys only ever
/// match exactly.
pub const SUBSTRING_MIN_KEY_LEN: usize = 3;

/// Known-company keys derived from the current database snapshot. Rebuilt
/// whenever the snapshot changes. Substring matching iterates keys longest
/// first (then lexicographically), so when one known company contains
/// another, the more specific key wins deterministically.
#[derive(Debug, Clone, Default)]
pub struct KnownCompanies {
    set: HashSet<String>,
    ordered: Vec<String>,
}

impl KnownCompanies {
    pub fn from_database(db: &CompanyDatabase) -> Self {
        let set: HashSet<String> = db.keys().map(str::to_string).collect();
        let mut ordered: Vec<String> = set.iter().cloned().collect();
        ordered.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        Self { set, ordered }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.set.contains(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ordered.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Exact,
    WordBoundary,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyMatch {
    pub company: String,
    pub kind: MatchKind,
}

/// Decides whether normalized text names a known company. Exact key lookup
/// first; otherwise a word-boundary substring pass over keys longer than
/// [`SUBSTRING_MIN_KEY_LEN`]. Only the first occurrence of each key in the
/// text is boundary-checked.
pub fn match_company(clean: &str, known: &KnownCompanies) -> Option<CompanyMatch> {
    if known.contains(clean) {
        return Some(CompanyMatch {
            company: clean.to_string(),
            kind: MatchKind::Exact,
        });
    }

    for company in known.iter() {
        if company.chars().count() <= SUBSTRING_MIN_KEY_LEN {
            continue;
        }
        let Some(start) = clean.find(company) else {
            continue;
        };
        let end = start + company.len();
        let before_ok = clean[..start]
            .chars()
            .next_back()
            .map(|c| !c.is_ascii_alphanumeric())
            .unwrap_or(true);
        let after_ok = clean[end..]
            .chars()
            .next()
            .map(|c| !c.is_ascii_alphanumeric())
            .unwrap_or(true);
        if before_ok && after_ok {
            return Some(CompanyMatch {
                company: company.to_string(),
                kind: MatchKind::WordBoundary,
            });
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use radar_core::Referrer;
    use std::collections::BTreeMap;

    fn known(keys: &[&str]) -> KnownCompanies {
        let entries: BTreeMap<String, Vec<Referrer>> = keys
            .iter()
            .map(|k| {
                (
                    k.to_string(),
                    vec![Referrer {
                        name: "x".to_string(),
                        note: String::new(),
                    }],
                )
            })
            .collect();
        KnownCompanies::from_database(&CompanyDatabase::new(entries))
    }

    #[test]
    fn exact_match_wins_first() {
        let k = known(&["GOOGLE", "GOOGLE CLOUD"]);
        let hit = match_company("GOOGLE", &k).unwrap();
        assert_eq!(hit.company, "GOOGLE");
        assert_eq!(hit.kind, MatchKind::Exact);
    }

    #[test]
    fn word_boundary_accepts_token_edges() {
        let k = known(&["AMAZON"]);
        let hit = match_company("AMAZON WEB SERVICES", &k).unwrap();
        assert_eq!(hit.company, "AMAZON");
        assert_eq!(hit.kind, MatchKind::WordBoundary);
        assert!(match_company("JOBS AT AMAZON", &k).is_some());
        assert!(match_company("AMAZON, SEATTLE", &k).is_some());
    }

    #[test]
    fn word_boundary_rejects_partial_words() {
        let k = known(&["AMAZON"]);
        assert!(match_company("AMAZONABC", &k).is_none());
        assert!(match_company("MYAMAZON", &k).is_none());
    }

    #[test]
    fn short_keys_never_substring_match() {
        let k = known(&["IBM"]);
        assert!(match_company("IBM RESEARCH", &k).is_none());
        assert!(match_company("IBM", &k).is_some());
    }

    #[test]
    fn only_first_occurrence_is_checked() {
        let k = known(&["AMAZON"]);
        // First occurrence fails the boundary test; no second attempt.
        assert!(match_company("XAMAZON AMAZON", &k).is_none());
    }

    #[test]
    fn overlapping_keys_resolve_longest_first() {
        let k = known(&["SONY", "SONY MUSIC"]);
        let hit = match_company("JOIN SONY MUSIC TODAY", &k).unwrap();
        assert_eq!(hit.company, "SONY MUSIC");
    }

    #[test]
    fn empty_known_set_matches_nothing() {
        let k = known(&[]);
        assert!(match_company("GOOGLE", &k).is_none());
    }
}
