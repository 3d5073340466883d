//! Gate/counter filtering
//!
//! A `FilterSet` is parsed from free text ("12, 14,h1") into normalized
//! tokens. A record passes when its gate, its counter range, or a short code
//! derived from the counter range is one of the tokens. An empty set admits
//! everything.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

use crate::constants::DEFAULT_COUNTER_THRESHOLD;
use crate::models::FlightRecord;

/// Trim and case-fold a gate/counter token
pub fn normalize_token(token: &str) -> String {
    token.trim().to_lowercase()
}

/// Set of normalized gate/counter tokens
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    tokens: BTreeSet<String>,
}

impl FilterSet {
    /// Parse comma-separated input. Blank entries are ignored.
    pub fn parse(text: &str) -> Self {
        Self::from_inputs([text])
    }

    /// Parse several comma-separated inputs into one set
    pub fn from_inputs<I, S>(inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tokens = inputs
            .into_iter()
            .flat_map(|input| {
                input
                    .as_ref()
                    .split(',')
                    .map(normalize_token)
                    .filter(|t| !t.is_empty())
                    .collect::<Vec<_>>()
            })
            .collect();
        Self { tokens }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Membership test; `value` is normalized first
    pub fn contains(&self, value: &str) -> bool {
        let key = normalize_token(value);
        !key.is_empty() && self.tokens.contains(&key)
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }
}

/// Derives a secondary filter key from a raw counter-range string
pub trait ShortCodeRule: Send + Sync {
    /// `None` when no short code applies
    fn short_code(&self, raw: &str) -> Option<String>;
}

impl<F> ShortCodeRule for F
where
    F: Fn(&str) -> Option<String> + Send + Sync,
{
    fn short_code(&self, raw: &str) -> Option<String> {
        self(raw)
    }
}

static COUNTER_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z]+)(\d+)").expect("counter prefix pattern is valid")
});

/// Collapses "H05-H18" to "H1" and "H19-H26" to "H2".
///
/// The island letter is kept; the suffix is 1 when the leading counter
/// number is at or below the threshold, 2 otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterRangeRule {
    threshold: u32,
}

impl CounterRangeRule {
    pub fn new(threshold: u32) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }
}

impl Default for CounterRangeRule {
    fn default() -> Self {
        Self::new(DEFAULT_COUNTER_THRESHOLD)
    }
}

impl ShortCodeRule for CounterRangeRule {
    fn short_code(&self, raw: &str) -> Option<String> {
        let caps = COUNTER_PREFIX.captures(raw.trim())?;
        let prefix = caps.get(1)?.as_str().to_uppercase();
        let number: u32 = caps.get(2)?.as_str().parse().ok()?;
        let half = if number <= self.threshold { 1 } else { 2 };
        Some(format!("{}{}", prefix, half))
    }
}

/// Admit `record` when `filters` is empty or its gate is listed
pub fn admits(record: &FlightRecord, filters: &FilterSet) -> bool {
    admits_with(record, filters, None)
}

/// Like `admits`, additionally testing the counter range and, when a rule
/// is given, the short code derived from it
pub fn admits_with(record: &FlightRecord, filters: &FilterSet, rule: Option<&dyn ShortCodeRule>) -> bool {
    if filters.is_empty() {
        return true;
    }
    if filters.contains(&record.gate) {
        return true;
    }

    let Some(counter) = record.counter.as_deref() else {
        return false;
    };
    if filters.contains(counter) {
        return true;
    }

    rule.and_then(|r| r.short_code(counter))
        .is_some_and(|code| filters.contains(&code))
}
