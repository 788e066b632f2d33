use radar_core::{RadarError, RadarResult};
use regex::Regex;

pub const DEFAULT_SUFFIX_PATTERN: &str =
    r"(?i)(Inc\.|Ltd\.|Pvt\.|LLC|Corporation|Corp\.|Group|Technology|Technologies|Solutions)";

pub const DEFAULT_SKIP_PREFIXES: &[&str] = &["View page for", "See more about"];

pub const DEFAULT_MIN_LEN: usize = 2;
pub const DEFAULT_MAX_LEN: usize = 50;

/// Canonicalizes candidate text into a company key: trim, filter out
/// hashtags/accessibility text and out-of-range lengths, strip corporate
/// suffix tokens, uppercase. The cleaned output is run through the same
/// filters, so every key this produces is a fixpoint of `normalize`.
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    suffixes: Regex,
    skip_prefixes: Vec<String>,
    min_len: usize,
    max_len: usize,
}

impl TextNormalizer {
    pub fn new(
        suffix_pattern: &str,
        skip_prefixes: &[String],
        min_len: usize,
        max_len: usize,
    ) -> RadarResult<Self> {
        let suffixes = Regex::new(suffix_pattern)
            .map_err(|e| RadarError::Config(format!("bad suffix pattern: {}", e)))?;
        Ok(Self {
            suffixes,
            skip_prefixes: skip_prefixes.to_vec(),
            min_len,
            max_len,
        })
    }

    pub fn normalize(&self, raw: &str) -> Option<String> {
        let trimmed = raw.trim();
        self.validate(trimmed)?;
        let stripped = self.suffixes.replace_all(trimmed, "");
        let clean = stripped.trim().to_uppercase();
        self.validate(&clean)?;
        Some(clean)
    }

    fn validate(&self, text: &str) -> Option<()> {
        let len = text.chars().count();
        if len < self.min_len || len > self.max_len {
            return None;
        }
        if text.starts_with('#') {
            return None;
        }
        if self.skip_prefixes.iter().any(|p| text.starts_with(p.as_str())) {
            return None;
        }
        Some(())
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        let skip_prefixes: Vec<String> =
            DEFAULT_SKIP_PREFIXES.iter().map(|s| s.to_string()).collect();
        Self::new(
            DEFAULT_SUFFIX_PATTERN,
            &skip_prefixes,
            DEFAULT_MIN_LEN,
            DEFAULT_MAX_LEN,
        )
        .expect("default suffix pattern is valid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_suffixes_and_uppercases() {
        let n = TextNormalizer::default();
        assert_eq!(n.normalize("  Google LLC "), Some("GOOGLE".to_string()));
        assert_eq!(
            n.normalize("Tata Consultancy"),
            Some("TATA CONSULTANCY".to_string())
        );
        assert_eq!(n.normalize("Acme Technologies Inc."), Some("ACME".to_string()));
    }

    #[test]
    fn rejects_hashtags_and_accessibility_text() {
        let n = TextNormalizer::default();
        assert_eq!(n.normalize("#Atlassian"), None);
        assert_eq!(n.normalize("View page for Google"), None);
        assert_eq!(n.normalize("See more about Meta"), None);
    }

    #[test]
    fn rejects_out_of_range_lengths() {
        let n = TextNormalizer::default();
        assert_eq!(n.normalize("A"), None);
        assert_eq!(n.normalize(&"x".repeat(51)), None);
        assert_eq!(n.normalize("   "), None);
    }

    #[test]
    fn rejects_text_that_collapses_under_stripping() {
        let n = TextNormalizer::default();
        // "A Inc." passes the raw filters but strips down to a single char.
        assert_eq!(n.normalize("A Inc."), None);
    }

    #[test]
    fn normalize_is_idempotent() {
        let n = TextNormalizer::default();
        let samples = [
            "  Google LLC ",
            "Amazon Web Services",
            "Acme Technologies Inc.",
            "#Atlassian",
            "View page for Google",
            "A Inc.",
            "meta",
            "NETFLIX",
            "Tata Group Solutions",
        ];
        for raw in samples {
            if let Some(once) = n.normalize(raw) {
                assert_eq!(n.normalize(&once), Some(once.clone()), "input {:?}", raw);
            }
        }
    }
}
