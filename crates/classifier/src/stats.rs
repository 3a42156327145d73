//! Aggregate statistics over classified transactions.

use authscope_core::{EventClassification, EventType, TokenFamily};
use std::collections::BTreeMap;

/// Counts over a batch of classifications.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassificationStats {
    /// Total classifications recorded.
    pub total: u64,
    /// Counts per event type.
    pub by_event: BTreeMap<EventType, u64>,
    /// Counts per token family.
    pub by_token_family: BTreeMap<TokenFamily, u64>,
    /// Classifications whose token type implies a carried credential.
    pub credentialed: u64,
}

impl ClassificationStats {
    /// Tally a batch.
    pub fn from_classifications<'a, I>(classifications: I) -> Self
    where
        I: IntoIterator<Item = &'a EventClassification>,
    {
        let mut stats = Self::default();
        for classification in classifications {
            stats.record(classification);
        }
        stats
    }

    /// Add one classification.
    pub fn record(&mut self, classification: &EventClassification) {
        self.total += 1;
        *self.by_event.entry(classification.event_type).or_default() += 1;
        *self
            .by_token_family
            .entry(classification.token_type.family())
            .or_default() += 1;
        if classification.token_type.requires_credential() {
            self.credentialed += 1;
        }
    }

    pub fn event_count(&self, event_type: EventType) -> u64 {
        self.by_event.get(&event_type).copied().unwrap_or(0)
    }

    pub fn family_count(&self, family: TokenFamily) -> u64 {
        self.by_token_family.get(&family).copied().unwrap_or(0)
    }

    /// Fraction of classifications that carried a credential.
    pub fn credentialed_frac(&self) -> f64 {
        if self.total > 0 {
            self.credentialed as f64 / self.total as f64
        } else {
            0.0
        }
    }

    /// Fraction of classifications left `Unclassified`.
    pub fn unclassified_frac(&self) -> f64 {
        if self.total > 0 {
            self.event_count(EventType::Unclassified) as f64 / self.total as f64
        } else {
            0.0
        }
    }

    /// Reset statistics.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
