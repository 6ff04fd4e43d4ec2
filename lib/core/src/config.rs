use crate::error::{Error, Result};
use crate::normalize::normalize;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default number of matches kept per sheet
pub const DEFAULT_MATCH_CAP: usize = 30;

/// Default upper bound for per-request cap overrides
pub const DEFAULT_MAX_MATCH_CAP: usize = 200;

/// Default cell range requested for every sheet
pub const DEFAULT_RANGE: &str = "A1:Z1000";

/// Header keywords marking an identifier-bearing column
pub const IDENTIFIER_KEYWORDS: &[&str] = &["cpf", "cns", "documento"];

/// Header keywords marking a name/category-bearing column
pub const SUBJECT_KEYWORDS: &[&str] = &[
    "nome",
    "mulher",
    "idoso",
    "puerpera",
    "gestante",
    "cidadao",
    "diabetico",
    "hipertenso",
    "crianca",
];

/// How identifier digit strings are compared
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MatchPolicy {
    /// Equal, or one is a suffix of the other, or the last 11 / last 15
    /// digits coincide. Tolerates lost leading zeros and partial entry.
    #[default]
    Suffix,
    /// Equal after left-padding both sides with zeros to 11 digits
    Exact,
}

impl std::str::FromStr for MatchPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "suffix" => Ok(MatchPolicy::Suffix),
            "exact" => Ok(MatchPolicy::Exact),
            other => Err(Error::InvalidConfig(format!("unknown match policy '{}'", other))),
        }
    }
}

/// Keyword sets used to classify header cells.
///
/// Keywords are stored normalized so they compare against normalized headers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KeywordSets {
    pub identifier: Vec<String>,
    pub subject: Vec<String>,
}

impl KeywordSets {
    pub fn new<I, S, J, T>(identifier: I, subject: J) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        J: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let clean = |k: &str| normalize(k);
        Self {
            identifier: identifier
                .into_iter()
                .map(|k| clean(k.as_ref()))
                .filter(|k| !k.is_empty())
                .collect(),
            subject: subject
                .into_iter()
                .map(|k| clean(k.as_ref()))
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    pub fn is_identifier(&self, normalized_header: &str) -> bool {
        self.identifier.iter().any(|k| normalized_header.contains(k.as_str()))
    }

    pub fn is_subject(&self, normalized_header: &str) -> bool {
        self.subject.iter().any(|k| normalized_header.contains(k.as_str()))
    }
}

impl Default for KeywordSets {
    fn default() -> Self {
        Self::new(IDENTIFIER_KEYWORDS.iter(), SUBJECT_KEYWORDS.iter())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScanConfig {
    /// Matches kept per sheet unless a request overrides it
    pub match_cap: usize,
    /// Ceiling for request overrides
    pub max_match_cap: usize,
    pub policy: MatchPolicy,
    pub keywords: KeywordSets,
    /// A1 range fetched from every sheet, without the sheet title
    pub range: String,
    /// Bound on a single sheet fetch
    pub fetch_timeout: Duration,
    /// Pause between sheet fetches, to stay under the collaborator's rate limits
    pub fetch_pause: Duration,
    /// Raw identifier values kept per sheet in a full trace
    pub sample_size: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            match_cap: DEFAULT_MATCH_CAP,
            max_match_cap: DEFAULT_MAX_MATCH_CAP,
            policy: MatchPolicy::default(),
            keywords: KeywordSets::default(),
            range: DEFAULT_RANGE.to_string(),
            fetch_timeout: Duration::from_secs(20),
            fetch_pause: Duration::ZERO,
            sample_size: 5,
        }
    }
}

impl ScanConfig {
    pub fn with_policy(mut self, policy: MatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_match_cap(mut self, cap: usize) -> Self {
        self.match_cap = cap;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.match_cap == 0 {
            return Err(Error::InvalidConfig("match cap must be at least 1".into()));
        }
        if self.match_cap > self.max_match_cap {
            return Err(Error::InvalidConfig(format!(
                "match cap {} exceeds maximum {}",
                self.match_cap, self.max_match_cap
            )));
        }
        if self.keywords.identifier.is_empty() {
            return Err(Error::InvalidConfig("identifier keyword set is empty".into()));
        }
        if self.keywords.subject.is_empty() {
            return Err(Error::InvalidConfig("subject keyword set is empty".into()));
        }
        if self.range.trim().is_empty() {
            return Err(Error::InvalidConfig("sheet range is empty".into()));
        }
        Ok(())
    }

    /// Resolve the effective cap for one request
    pub fn effective_cap(&self, requested: Option<usize>) -> usize {
        match requested {
            Some(cap) if cap > 0 => cap.min(self.max_match_cap),
            _ => self.match_cap,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ScanConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.match_cap, 30);
        assert_eq!(config.policy, MatchPolicy::Suffix);
    }

    #[test]
    fn test_keywords_are_normalized() {
        let keywords = KeywordSets::new(["CPF", "  "], ["Criança", "Puérpera"]);
        assert_eq!(keywords.identifier, vec!["cpf"]);
        assert_eq!(keywords.subject, vec!["crianca", "puerpera"]);
        assert!(keywords.is_subject("nome da crianca"));
        assert!(!keywords.is_identifier("nome da crianca"));
    }

    #[test]
    fn test_keyword_sets_do_not_overlap() {
        let keywords = KeywordSets::default();
        for k in &keywords.identifier {
            assert!(!keywords.is_subject(k), "{} is in both sets", k);
        }
    }

    #[test]
    fn test_invalid_configs() {
        assert!(matches!(
            ScanConfig::default().with_match_cap(0).validate(),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            ScanConfig::default().with_match_cap(500).validate(),
            Err(Error::InvalidConfig(_))
        ));

        let mut config = ScanConfig::default();
        config.keywords = KeywordSets::new(Vec::<String>::new(), ["nome"]);
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_effective_cap() {
        let config = ScanConfig::default();
        assert_eq!(config.effective_cap(None), 30);
        assert_eq!(config.effective_cap(Some(0)), 30);
        assert_eq!(config.effective_cap(Some(5)), 5);
        assert_eq!(config.effective_cap(Some(10_000)), 200);
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("Suffix".parse::<MatchPolicy>().unwrap(), MatchPolicy::Suffix);
        assert_eq!("exact".parse::<MatchPolicy>().unwrap(), MatchPolicy::Exact);
        assert!("fuzzy".parse::<MatchPolicy>().is_err());
    }
}
