//! Retention rules.
//!
//! A [`RetentionRule`] says how many of the most recent numeric tags to keep
//! in one repository. [`RetentionPolicy`] is the validated set of rules for a
//! run, keyed by repository name.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::parse_config;
use crate::error::{Error, Result};

/// A "keep last N tags" rule for one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RetentionRule {
    /// Repository path within the registry (e.g., "apps/web").
    pub repository: String,

    /// Number of numerically highest tags to keep.
    pub keep_count: u32,
}

impl RetentionRule {
    /// Creates a rule.
    ///
    /// # Examples
    ///
    /// ```
    /// use regprune_core::RetentionRule;
    ///
    /// let rule = RetentionRule::new("apps/web", 5);
    /// assert_eq!(rule.keep_count, 5);
    /// ```
    #[must_use]
    pub fn new(repository: impl Into<String>, keep_count: u32) -> Self {
        Self {
            repository: repository.into(),
            keep_count,
        }
    }

    /// Validates a raw configuration value into a rule.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedRule`] if `value` is not a non-negative
    /// decimal integer.
    pub fn parse(repository: &str, value: &str) -> Result<Self> {
        let malformed = |reason: String| Error::MalformedRule {
            repository: repository.to_string(),
            value: value.to_string(),
            reason,
        };

        match value.parse::<u32>() {
            Ok(keep_count) => Ok(Self::new(repository, keep_count)),
            Err(_) if value.parse::<i64>().is_ok_and(|n| n < 0) => {
                Err(malformed("retention count must not be negative".to_string()))
            }
            Err(e) => Err(malformed(e.to_string())),
        }
    }
}

/// A rule that failed validation and was left out of the policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedRule {
    /// Repository the rule applied to.
    pub repository: String,

    /// Raw value from the configuration.
    pub value: String,

    /// Validation error message.
    pub reason: String,
}

/// The validated retention rules for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetentionPolicy {
    rules: BTreeMap<String, RetentionRule>,
    rejected: Vec<RejectedRule>,
}

impl RetentionPolicy {
    /// Creates an empty policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and validates configuration text.
    ///
    /// # Examples
    ///
    /// ```
    /// use regprune_core::RetentionPolicy;
    ///
    /// let policy = RetentionPolicy::parse("apps/web = 3\napps/api = many\n");
    /// assert_eq!(policy.len(), 1);
    /// assert_eq!(policy.rejected().len(), 1);
    /// ```
    #[must_use]
    pub fn parse(text: &str) -> Self {
        Self::from_entries(parse_config(text))
    }

    /// Validates a raw repository → value mapping.
    ///
    /// Malformed values are logged and recorded in [`Self::rejected`]; the
    /// remaining rules are kept.
    #[must_use]
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut policy = Self::new();

        for (repository, value) in entries {
            match RetentionRule::parse(&repository, &value) {
                Ok(rule) => policy.insert(rule),
                Err(err) => {
                    tracing::warn!(repository = %repository, error = %err, "skipping retention rule");
                    if let Error::MalformedRule { reason, .. } = err {
                        policy.rejected.push(RejectedRule {
                            repository,
                            value,
                            reason,
                        });
                    }
                }
            }
        }

        policy
    }

    /// Adds a rule, replacing any existing rule for the same repository.
    pub fn insert(&mut self, rule: RetentionRule) {
        self.rules.insert(rule.repository.clone(), rule);
    }

    /// Returns the rule for a repository.
    #[must_use]
    pub fn get(&self, repository: &str) -> Option<&RetentionRule> {
        self.rules.get(repository)
    }

    /// Iterates over the valid rules.
    pub fn rules(&self) -> impl Iterator<Item = &RetentionRule> {
        self.rules.values()
    }

    /// Returns the rules rejected during validation.
    #[must_use]
    pub fn rejected(&self) -> &[RejectedRule] {
        &self.rejected
    }

    /// Returns the number of valid rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if there are no valid rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl FromIterator<RetentionRule> for RetentionPolicy {
    fn from_iter<T: IntoIterator<Item = RetentionRule>>(iter: T) -> Self {
        let mut policy = Self::new();
        for rule in iter {
            policy.insert(rule);
        }
        policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_parse_valid() {
        let rule = RetentionRule::parse("apps/web", "3").unwrap();
        assert_eq!(rule, RetentionRule::new("apps/web", 3));
    }

    #[test]
    fn test_rule_parse_zero() {
        let rule = RetentionRule::parse("apps/web", "0").unwrap();
        assert_eq!(rule.keep_count, 0);
    }

    #[test]
    fn test_rule_parse_not_a_number() {
        let err = RetentionRule::parse("apps/web", "three").unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedRule { ref repository, ref value, .. }
            if repository == "apps/web" && value == "three"
        ));
    }

    #[test]
    fn test_rule_parse_negative() {
        let err = RetentionRule::parse("apps/web", "-2").unwrap_err();
        assert!(err.to_string().contains("must not be negative"));
    }

    #[test]
    fn test_rule_parse_empty_value() {
        assert!(RetentionRule::parse("apps/web", "").is_err());
    }

    #[test]
    fn test_policy_skips_malformed_rules() {
        let policy = RetentionPolicy::parse("a = 1\nb = x\nc = 2.5\nd = 4\n");

        assert_eq!(policy.len(), 2);
        assert!(policy.get("a").is_some());
        assert!(policy.get("d").is_some());

        let rejected: Vec<_> = policy.rejected().iter().map(|r| r.repository.as_str()).collect();
        assert_eq!(rejected, vec!["b", "c"]);
    }

    #[test]
    fn test_policy_from_rules() {
        let policy: RetentionPolicy = vec![
            RetentionRule::new("apps/web", 3),
            RetentionRule::new("apps/web", 5),
            RetentionRule::new("apps/api", 1),
        ]
        .into_iter()
        .collect();

        assert_eq!(policy.len(), 2);
        assert_eq!(policy.get("apps/web").unwrap().keep_count, 5);
        assert!(policy.rejected().is_empty());
    }
}
