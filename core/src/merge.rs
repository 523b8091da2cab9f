//! # Result Merger
//!
//! Folds each raw scan batch into the session's retained result set.
//!
//! - Batch entries replace retained entries with the same BSSID.
//! - Retained entries the batch lacks are kept. Ageing them out belongs to the
//!   supplicant's BSS table, so folding the same batch again changes nothing.
//! - A force-merged (directed) batch is partial by nature and folds the same
//!   way: it adds and refreshes, never evicts.
//! - An empty batch carries no information and changes nothing.
//!
//! The result is ordered by descending signal level. Equal levels keep their
//! relative order, batch entries first, and the set is cut to the caller's
//! capacity.

use std::collections::HashSet;

use pnet::util::MacAddr;
use tracing::debug;
use wlbridge_common::network::bss::ScanResultEntry;

#[derive(Debug, Clone, Default)]
pub struct ResultMerger {
    retained: Vec<ScanResultEntry>,
}

impl ResultMerger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn retained(&self) -> impl Iterator<Item = &ScanResultEntry> {
        self.retained.iter()
    }

    pub fn len(&self) -> usize {
        self.retained.len()
    }

    pub fn is_empty(&self) -> bool {
        self.retained.is_empty()
    }

    /// Drops one BSS, returning whether it was retained.
    pub fn forget(&mut self, bssid: MacAddr) -> bool {
        let before = self.retained.len();
        self.retained.retain(|entry| entry.bssid != bssid);
        self.retained.len() != before
    }

    pub fn merge(
        &mut self,
        batch: Vec<ScanResultEntry>,
        force_merge: bool,
        capacity: usize,
    ) -> Vec<ScanResultEntry> {
        let previous = std::mem::take(&mut self.retained);

        let mut merged = if batch.is_empty() {
            previous
        } else {
            debug!(
                "Folding {} entries into {} retained (directed: {force_merge})",
                batch.len(),
                previous.len()
            );
            fold(previous, batch)
        };

        merged.sort_by(|a, b| b.level.cmp(&a.level));
        if merged.len() > capacity {
            debug!("Dropping {} weakest entries over capacity", merged.len() - capacity);
            merged.truncate(capacity);
        }

        self.retained = merged;
        self.retained.clone()
    }
}

/// Batch entries first, the last duplicate winning in place, then every
/// retained entry the batch did not refresh.
fn fold(previous: Vec<ScanResultEntry>, batch: Vec<ScanResultEntry>) -> Vec<ScanResultEntry> {
    let mut merged: Vec<ScanResultEntry> = Vec::with_capacity(previous.len() + batch.len());

    for entry in batch {
        match merged.iter_mut().find(|seen| seen.bssid == entry.bssid) {
            Some(seen) => *seen = entry,
            None => merged.push(entry),
        }
    }

    let fresh: HashSet<MacAddr> = merged.iter().map(|entry| entry.bssid).collect();
    merged.extend(
        previous
            .into_iter()
            .filter(|old| !fresh.contains(&old.bssid)),
    );
    merged
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;

    fn ap(last: u8, level: i32) -> ScanResultEntry {
        ScanResultEntry::new(MacAddr::new(0x00, 0x1b, 0x63, 0x00, 0x00, last), level)
    }

    fn levels(entries: &[ScanResultEntry]) -> Vec<(u8, i32)> {
        entries.iter().map(|e| (e.bssid.5, e.level)).collect()
    }

    #[test]
    fn merge_should_replace_and_sort_by_level() {
        let mut merger = ResultMerger::new();
        merger.merge(vec![ap(0xa, -40)], false, 2);

        let merged = merger.merge(vec![ap(0xa, -55), ap(0xb, -30)], false, 2);

        assert_eq!(levels(&merged), vec![(0xb, -30), (0xa, -55)]);
    }

    #[test]
    fn merge_should_be_idempotent_for_same_batch() {
        let mut merger = ResultMerger::new();
        merger.merge(vec![ap(1, -70), ap(2, -50)], false, 8);
        let batch = vec![ap(3, -60), ap(2, -45), ap(4, -60)];

        let once = merger.merge(batch.clone(), false, 8);
        let twice = merger.merge(batch, false, 8);

        assert_eq!(once, twice);
    }

    #[test]
    fn merge_should_keep_everything_when_forced() {
        let mut merger = ResultMerger::new();
        merger.merge(vec![ap(1, -70), ap(2, -50)], false, 8);

        let merged = merger.merge(vec![ap(3, -60)], true, 8);

        assert_eq!(levels(&merged), vec![(2, -50), (3, -60), (1, -70)]);
    }

    #[test]
    fn merge_should_keep_entries_missing_from_batch() {
        let mut merger = ResultMerger::new();
        merger.merge(vec![ap(1, -70), ap(2, -50)], false, 8);

        for _ in 0..6 {
            merger.merge(vec![ap(2, -50)], false, 8);
        }

        let retained: Vec<ScanResultEntry> = merger.retained().cloned().collect();
        assert_eq!(levels(&retained), vec![(2, -50), (1, -70)]);
    }

    #[test]
    fn merge_should_be_idempotent_after_repeated_misses() {
        let mut merger = ResultMerger::new();
        merger.merge(vec![ap(1, -70), ap(2, -50)], false, 8);
        merger.merge(vec![ap(2, -50)], false, 8);
        merger.merge(vec![ap(2, -50)], false, 8);
        merger.merge(vec![ap(2, -50)], false, 8);

        let once = merger.merge(vec![ap(2, -50)], false, 8);
        let twice = merger.merge(vec![ap(2, -50)], false, 8);

        assert_eq!(once, twice);
        assert_eq!(levels(&twice), vec![(2, -50), (1, -70)]);
    }

    #[test]
    fn merge_should_ignore_empty_batch() {
        let mut merger = ResultMerger::new();
        merger.merge(vec![ap(1, -70), ap(2, -50)], false, 8);

        let merged = merger.merge(Vec::new(), false, 8);
        assert_eq!(levels(&merged), vec![(2, -50), (1, -70)]);

        let merged = merger.merge(Vec::new(), false, 1);
        assert_eq!(levels(&merged), vec![(2, -50)]);
    }

    #[test]
    fn merge_should_keep_strongest_within_capacity() {
        let mut merger = ResultMerger::new();
        let batch = vec![ap(1, -80), ap(2, -40), ap(3, -60), ap(4, -20), ap(5, -90)];

        let merged = merger.merge(batch, false, 3);

        assert_eq!(levels(&merged), vec![(4, -20), (2, -40), (3, -60)]);
        assert_eq!(merger.len(), 3);
    }

    #[test]
    fn merge_should_keep_batch_order_for_equal_levels() {
        let mut merger = ResultMerger::new();
        merger.merge(vec![ap(9, -50)], false, 8);

        let merged = merger.merge(vec![ap(3, -50), ap(1, -50)], false, 8);

        assert_eq!(levels(&merged), vec![(3, -50), (1, -50), (9, -50)]);
    }

    #[test]
    fn merge_should_collapse_duplicate_bssids() {
        let mut merger = ResultMerger::new();

        let merged = merger.merge(vec![ap(1, -80), ap(1, -40)], false, 8);

        assert_eq!(levels(&merged), vec![(1, -40)]);
    }

    #[test]
    fn forget_should_drop_single_entry() {
        let mut merger = ResultMerger::new();
        merger.merge(vec![ap(1, -70), ap(2, -50)], false, 8);

        assert!(merger.forget(ap(1, 0).bssid));
        assert!(!merger.forget(ap(1, 0).bssid));
        assert_eq!(merger.len(), 1);
    }
}
