// SPDX-License-Identifier: MIT

//! Queue-level observability counters.

use std::collections::HashMap;

/// Snapshot of queue health: per-priority tier depth, in-flight/scheduled
/// counts, and monotonic `<action>:<type>` counters.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Stats {
    /// Priority tier name (`"high"`/`"medium"`/`"low"`) → queue length.
    pub priority_lengths: HashMap<String, u64>,
    pub in_flight: u64,
    pub scheduled: u64,
    pub dead_letter: u64,
    /// `"<action>:<type>"` → count, e.g. `"enqueued:scan"`.
    pub counters: HashMap<String, u64>,
}

impl Stats {
    pub fn total_queued(&self) -> u64 {
        self.priority_lengths.values().sum()
    }

    pub fn increment(&mut self, action: &str, type_tag: &str) {
        *self.counters.entry(format!("{action}:{type_tag}")).or_insert(0) += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increment_is_monotonic() {
        let mut stats = Stats::default();
        stats.increment("enqueued", "scan");
        stats.increment("enqueued", "scan");
        assert_eq!(stats.counters.get("enqueued:scan"), Some(&2));
    }

    #[test]
    fn total_queued_sums_priorities() {
        let mut stats = Stats::default();
        stats.priority_lengths.insert("high".to_string(), 3);
        stats.priority_lengths.insert("low".to_string(), 1);
        assert_eq!(stats.total_queued(), 4);
    }
}
