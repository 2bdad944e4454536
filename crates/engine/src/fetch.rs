//! Request tokens that keep sibling views from showing stale responses.
//!
//! Each view fetches on its own whenever the filters change, and responses
//! can land out of order. A view only applies the response carrying the
//! newest token it was issued.

use std::collections::{HashMap, HashSet};

/// A view (or catalog) that fetches data independently.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Consumer {
    SummaryCards,
    CategoryBreakdown,
    SpendingTrend,
    TransactionsTable,
    CategoryCatalog,
    PlatformCatalog,
}

impl Consumer {
    /// Views refetched whenever the filters change.
    pub const FILTERED: [Consumer; 4] = [
        Consumer::SummaryCards,
        Consumer::CategoryBreakdown,
        Consumer::SpendingTrend,
        Consumer::TransactionsTable,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::SummaryCards => "summary",
            Self::CategoryBreakdown => "category breakdown",
            Self::SpendingTrend => "spending trend",
            Self::TransactionsTable => "transactions",
            Self::CategoryCatalog => "categories",
            Self::PlatformCatalog => "platforms",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RequestToken {
    consumer: Consumer,
    seq: u64,
}

impl RequestToken {
    pub fn consumer(self) -> Consumer {
        self.consumer
    }

    pub fn seq(self) -> u64 {
        self.seq
    }
}

#[derive(Debug, Default)]
pub struct FetchTracker {
    next_seq: u64,
    latest: HashMap<Consumer, u64>,
    pending: HashSet<Consumer>,
}

impl FetchTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a fetch for `consumer`; any token issued before is now stale.
    pub fn issue(&mut self, consumer: Consumer) -> RequestToken {
        self.next_seq += 1;
        self.latest.insert(consumer, self.next_seq);
        self.pending.insert(consumer);
        RequestToken {
            consumer,
            seq: self.next_seq,
        }
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        self.latest.get(&token.consumer) == Some(&token.seq)
    }

    /// Returns `true` if the response for `token` should be applied.
    ///
    /// A stale token is rejected and leaves the consumer loading; a current
    /// one completes it.
    pub fn accept(&mut self, token: RequestToken) -> bool {
        if !self.is_current(token) {
            tracing::debug!(
                consumer = token.consumer.label(),
                seq = token.seq,
                "discarding stale response"
            );
            return false;
        }
        self.pending.remove(&token.consumer);
        true
    }

    pub fn is_loading(&self, consumer: Consumer) -> bool {
        self.pending.contains(&consumer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_latest_token_is_accepted() {
        let mut tracker = FetchTracker::new();
        let first = tracker.issue(Consumer::TransactionsTable);
        let second = tracker.issue(Consumer::TransactionsTable);

        assert!(tracker.is_loading(Consumer::TransactionsTable));
        assert!(!tracker.accept(first));
        assert!(tracker.is_loading(Consumer::TransactionsTable));
        assert!(tracker.accept(second));
        assert!(!tracker.is_loading(Consumer::TransactionsTable));
    }

    #[test]
    fn consumers_are_tracked_independently() {
        let mut tracker = FetchTracker::new();
        let cards = tracker.issue(Consumer::SummaryCards);
        let trend = tracker.issue(Consumer::SpendingTrend);
        let _newer_cards = tracker.issue(Consumer::SummaryCards);

        assert!(tracker.accept(trend));
        assert!(!tracker.accept(cards));
        assert!(tracker.is_loading(Consumer::SummaryCards));
    }

    #[test]
    fn tokens_increase_monotonically() {
        let mut tracker = FetchTracker::new();
        let a = tracker.issue(Consumer::CategoryCatalog);
        let b = tracker.issue(Consumer::PlatformCatalog);
        assert!(b.seq() > a.seq());
        assert_eq!(a.consumer(), Consumer::CategoryCatalog);
    }
}
