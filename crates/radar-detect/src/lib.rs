pub mod container;
pub mod matcher;
pub mod normalize;
pub mod specificity;
pub mod visibility;

pub use container::{find_result_container, DEFAULT_CONTAINER_SELECTORS};
pub use matcher::{match_company, CompanyMatch, KnownCompanies, MatchKind};
pub use normalize::{TextNormalizer, DEFAULT_SKIP_PREFIXES, DEFAULT_SUFFIX_PATTERN};
pub use specificity::has_more_specific_descendant;
pub use visibility::{is_hidden_element, DEFAULT_HIDDEN_CLASS_PATTERNS};
