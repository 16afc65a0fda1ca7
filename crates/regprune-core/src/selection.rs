//! Tag selection.
//!
//! Tags are treated as build sequence numbers. Only tags that parse as
//! integers take part in ordering; anything else (`latest`, `stable`, ...)
//! is reported and never chosen for deletion.

use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;

/// A tag whose string form parses as an integer.
///
/// Ordering is by numeric value, then by the raw string. Differently
/// formatted tags with the same value ("01" and "1") are distinct entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct NumericTag {
    value: i64,
    raw: String,
}

impl NumericTag {
    /// Parses a tag, returning `None` if it is not a decimal integer.
    ///
    /// # Examples
    ///
    /// ```
    /// use regprune_core::NumericTag;
    ///
    /// assert_eq!(NumericTag::parse("042").map(|t| t.value()), Some(42));
    /// assert!(NumericTag::parse("latest").is_none());
    /// ```
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        raw.parse::<i64>().ok().map(|value| Self {
            value,
            raw: raw.to_string(),
        })
    }

    /// Returns the numeric value.
    #[must_use]
    pub const fn value(&self) -> i64 {
        self.value
    }

    /// Returns the tag exactly as the registry reported it.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl Ord for NumericTag {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value
            .cmp(&other.value)
            .then_with(|| self.raw.cmp(&other.raw))
    }
}

impl PartialOrd for NumericTag {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for NumericTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Result of applying a retention count to a tag set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// Tags to delete, oldest first.
    pub candidates: Vec<NumericTag>,

    /// Numeric tags kept by the rule, ascending.
    pub retained: Vec<NumericTag>,

    /// Tags ignored because they are not integers.
    pub skipped: Vec<String>,
}

impl Selection {
    /// Returns the numeric values of the candidates, in deletion order.
    #[must_use]
    pub fn candidate_values(&self) -> Vec<i64> {
        self.candidates.iter().map(NumericTag::value).collect()
    }

    /// Returns the number of tags that took part in ordering.
    #[must_use]
    pub fn numeric_count(&self) -> usize {
        self.candidates.len() + self.retained.len()
    }

    /// Returns true if nothing needs deleting.
    #[must_use]
    pub fn is_satisfied(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Chooses which tags fall outside the retention window.
///
/// Numeric tags are sorted ascending. If there are more than `keep_count`
/// of them, the lowest `len - keep_count` become candidates; otherwise the
/// policy is already satisfied and nothing is selected.
///
/// # Examples
///
/// ```
/// use regprune_core::select_for_deletion;
///
/// let selection = select_for_deletion(&["1", "2", "latest", "3"], 2);
/// assert_eq!(selection.candidate_values(), vec![1]);
/// assert_eq!(selection.skipped, vec!["latest".to_string()]);
/// ```
pub fn select_for_deletion<S: AsRef<str>>(tags: &[S], keep_count: u32) -> Selection {
    let mut numeric = Vec::with_capacity(tags.len());
    let mut skipped = Vec::new();

    for tag in tags {
        let tag = tag.as_ref();
        if let Some(parsed) = NumericTag::parse(tag) {
            numeric.push(parsed);
        } else {
            tracing::warn!(tag, "ignoring non-numeric tag");
            skipped.push(tag.to_string());
        }
    }

    numeric.sort_unstable();

    let keep = usize::try_from(keep_count).unwrap_or(usize::MAX);
    let excess = numeric.len().saturating_sub(keep);
    let retained = numeric.split_off(excess);

    Selection {
        candidates: numeric,
        retained,
        skipped,
    }
}
