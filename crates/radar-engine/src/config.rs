use radar_detect::normalize::{DEFAULT_MAX_LEN, DEFAULT_MIN_LEN};
use radar_detect::{
    TextNormalizer, DEFAULT_CONTAINER_SELECTORS, DEFAULT_HIDDEN_CLASS_PATTERNS,
    DEFAULT_SKIP_PREFIXES, DEFAULT_SUFFIX_PATTERN,
};
use radar_dom::Selector;
use radar_core::RadarResult;
use std::collections::HashSet;
use std::time::Duration;
use tracing::warn;

/// Generic tags plus the site-specific company-name selectors carried over
/// per supported job board.
pub const DEFAULT_CANDIDATE_SELECTORS: &[&str] = &[
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "a",
    "strong",
    "b",
    "span",
    "p",
    ".company-name",
    r#"[class*="company"]"#,
    // LinkedIn
    ".job-card-container__company-name",
    ".jobs-unified-top-card__company-name",
    ".job-details-jobs-unified-top-card__company-name",
    ".jobs-company-name",
    r#"[data-view-name="job-card"] p"#,
    r#"[data-view-name="jobs-unified-top-card"] p"#,
    // Naukri
    ".comp-name",
    ".companyInfo",
    ".cname",
    // Indeed
    r#"[data-testid="company-name"]"#,
    ".companyName",
    ".company",
    ".jobsearch-CompanyInfoContainer",
    ".companyOverviewLink",
    // Glassdoor
    r#"[data-test="employer-short-name"]"#,
    ".EmployerProfile__employerName",
    ".job-search-key-l2rwgq",
    ".css-l2wkq4",
    // Wellfound
    ".company-link",
    r#"[class*="CompanyName"]"#,
];

pub const DEFAULT_IGNORE_TAGS: &[&str] = &["script", "style", "noscript", "iframe"];

pub const BADGE_CLASS: &str = "referral-radar-badge";
pub const TOOLTIP_CLASS: &str = "referral-radar-tooltip";
pub const INJECTED_ATTR: &str = "data-rr-injected";
pub const COMPANY_ATTR: &str = "data-rr-company";

#[derive(Debug, Clone)]
pub struct TooltipConfig {
    pub width: f64,
    pub height: f64,
    pub pointer_offset: f64,
    pub arm_delay: Duration,
    pub copied_revert: Duration,
    pub failed_revert: Duration,
}

impl Default for TooltipConfig {
    fn default() -> Self {
        Self {
            width: 300.0,
            height: 200.0,
            pointer_offset: 10.0,
            arm_delay: Duration::from_millis(50),
            copied_revert: Duration::from_millis(2000),
            failed_revert: Duration::from_millis(1500),
        }
    }
}

/// Every knob of the engine as an enumerated field. Defaults carry the
/// shipped selector lists and timings.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub candidate_selectors: Vec<String>,
    pub container_selectors: Vec<String>,
    pub hidden_class_patterns: Vec<String>,
    pub ignore_tags: Vec<String>,
    pub skip_prefixes: Vec<String>,
    pub suffix_pattern: String,
    pub min_text_len: usize,
    pub max_text_len: usize,
    pub debounce: Duration,
    pub wave_delays: Vec<Duration>,
    pub url_poll_interval: Duration,
    pub badge_class: String,
    pub tooltip_class: String,
    pub injected_attr: String,
    pub company_attr: String,
    pub tooltip: TooltipConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            candidate_selectors: to_strings(DEFAULT_CANDIDATE_SELECTORS),
            container_selectors: to_strings(DEFAULT_CONTAINER_SELECTORS),
            hidden_class_patterns: to_strings(DEFAULT_HIDDEN_CLASS_PATTERNS),
            ignore_tags: to_strings(DEFAULT_IGNORE_TAGS),
            skip_prefixes: to_strings(DEFAULT_SKIP_PREFIXES),
            suffix_pattern: DEFAULT_SUFFIX_PATTERN.to_string(),
            min_text_len: DEFAULT_MIN_LEN,
            max_text_len: DEFAULT_MAX_LEN,
            debounce: Duration::from_millis(300),
            wave_delays: vec![
                Duration::from_millis(100),
                Duration::from_millis(500),
                Duration::from_millis(1500),
                Duration::from_millis(3000),
            ],
            url_poll_interval: Duration::from_millis(1000),
            badge_class: BADGE_CLASS.to_string(),
            tooltip_class: TOOLTIP_CLASS.to_string(),
            injected_attr: INJECTED_ATTR.to_string(),
            company_attr: COMPANY_ATTR.to_string(),
            tooltip: TooltipConfig::default(),
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Selector lists parsed once at engine construction. Entries that fail to
/// parse are logged and skipped rather than aborting startup.
#[derive(Debug, Clone)]
pub(crate) struct Compiled {
    pub(crate) candidates: Vec<Selector>,
    pub(crate) containers: Vec<Selector>,
    pub(crate) ignore_tags: HashSet<String>,
    pub(crate) normalizer: TextNormalizer,
}

impl Compiled {
    pub(crate) fn from_config(config: &EngineConfig) -> RadarResult<Self> {
        let normalizer = TextNormalizer::new(
            &config.suffix_pattern,
            &config.skip_prefixes,
            config.min_text_len,
            config.max_text_len,
        )?;
        Ok(Self {
            candidates: compile_list(&config.candidate_selectors),
            containers: compile_list(&config.container_selectors),
            ignore_tags: config
                .ignore_tags
                .iter()
                .map(|t| t.to_ascii_lowercase())
                .collect(),
            normalizer,
        })
    }
}

fn compile_list(inputs: &[String]) -> Vec<Selector> {
    inputs
        .iter()
        .filter_map(|input| match Selector::parse(input) {
            Ok(selector) => Some(selector),
            Err(e) => {
                warn!(selector = %input, error = %e, "skipping unparsable selector");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_selector_lists_compile_fully() {
        let config = EngineConfig::default();
        let compiled = Compiled::from_config(&config).unwrap();
        assert_eq!(compiled.candidates.len(), config.candidate_selectors.len());
        assert_eq!(compiled.containers.len(), config.container_selectors.len());
    }

    #[test]
    fn bad_selector_is_skipped_not_fatal() {
        let mut config = EngineConfig::default();
        config.candidate_selectors = vec!["h1".to_string(), "a:hover".to_string()];
        let compiled = Compiled::from_config(&config).unwrap();
        assert_eq!(compiled.candidates.len(), 1);
    }

    #[test]
    fn bad_suffix_pattern_is_a_config_error() {
        let mut config = EngineConfig::default();
        config.suffix_pattern = "(".to_string();
        assert!(Compiled::from_config(&config).is_err());
    }
}
