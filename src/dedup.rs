use std::collections::HashSet;

use crate::normalize::NormalizedQuery;

/// Queries already issued during one reconciliation run
#[derive(Debug, Default)]
pub struct QueryDeduplicator {
    seen: HashSet<NormalizedQuery>,
}

impl QueryDeduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` the first time a query is offered (and records it), `false` afterwards.
    pub fn should_query(&mut self, query: &NormalizedQuery) -> bool {
        if self.seen.contains(query) {
            return false;
        }
        self.seen.insert(query.clone())
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }
}
