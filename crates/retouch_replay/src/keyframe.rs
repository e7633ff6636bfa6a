//! Sparse keyframes with a bounded sliding window.
//!
//! The genesis keyframe (index -1) is never evicted. Other keyframes live
//! in insertion order; once more than `buffer_size` are held the oldest
//! inserted is dropped, whatever its index.

use crate::config::ReplayConfig;
use crate::error::ReplayResult;
use crate::snapshot::Snapshot;
use crate::state::Document;
use retouch_core::Timestamp;
use std::collections::VecDeque;
use tracing::debug;

/// Index of the genesis keyframe
pub const GENESIS_INDEX: i64 = -1;

/// A snapshot of the document right after the action at `index`
#[derive(Debug, Clone, PartialEq)]
pub struct Keyframe {
    /// Log index the snapshot reflects; -1 for genesis
    pub index: i64,
    /// Captured document
    pub snapshot: Snapshot,
    /// Capture time, informational only
    pub created_at: Timestamp,
}

impl Keyframe {
    fn capture(index: i64, document: &Document) -> Self {
        Self {
            index,
            snapshot: Snapshot::capture(document),
            created_at: Timestamp::now(),
        }
    }
}

/// Genesis plus a window of recent keyframes
#[derive(Debug, Clone)]
pub struct KeyframeCache {
    interval: usize,
    buffer_size: usize,
    genesis: Keyframe,
    window: VecDeque<Keyframe>,
}

impl KeyframeCache {
    /// Create a cache whose genesis is `document`
    ///
    /// # Errors
    ///
    /// Returns error if `config` is invalid
    pub fn new(config: &ReplayConfig, document: &Document) -> ReplayResult<Self> {
        config.validate()?;
        Ok(Self {
            interval: config.keyframe_interval,
            buffer_size: config.keyframe_buffer,
            genesis: Keyframe::capture(GENESIS_INDEX, document),
            window: VecDeque::with_capacity(config.keyframe_buffer + 1),
        })
    }

    /// True if `index` falls on the capture cadence
    #[must_use]
    pub fn is_due(&self, index: i64) -> bool {
        index >= 0 && index % self.interval as i64 == 0
    }

    /// Store a keyframe of `document` at `index`.
    ///
    /// Index -1 replaces the genesis snapshot. Any other index replaces an
    /// existing entry at that index, becomes the most recent entry, and
    /// may evict the oldest.
    pub fn save_keyframe(&mut self, index: i64, document: &Document) {
        debug_assert!(index >= GENESIS_INDEX);
        if index <= GENESIS_INDEX {
            self.genesis = Keyframe::capture(GENESIS_INDEX, document);
            debug!("replaced genesis keyframe");
            return;
        }

        self.window.retain(|k| k.index != index);
        self.window.push_back(Keyframe::capture(index, document));
        debug!(index, retained = self.window.len(), "captured keyframe");
        self.prune();
    }

    fn prune(&mut self) {
        while self.window.len() > self.buffer_size {
            if let Some(evicted) = self.window.pop_front() {
                debug!(index = evicted.index, "evicted keyframe");
            }
        }
    }

    /// Retained keyframe with the greatest index `<= target`.
    ///
    /// Genesis is always a candidate, so this never fails.
    #[must_use]
    pub fn nearest(&self, target: i64) -> &Keyframe {
        self.window
            .iter()
            .filter(|k| k.index <= target)
            .max_by_key(|k| k.index)
            .unwrap_or(&self.genesis)
    }

    /// Drop keyframes after `index`; returns how many went
    pub fn discard_after(&mut self, index: i64) -> usize {
        let before = self.window.len();
        self.window.retain(|k| k.index <= index);
        let dropped = before - self.window.len();
        if dropped > 0 {
            debug!(after = index, dropped, "discarded stale keyframes");
        }
        dropped
    }

    /// Restore the nearest keyframe at or before `target` into `document`.
    ///
    /// Returns the index of the keyframe used.
    pub fn restore(&self, target: i64, document: &mut Document) -> i64 {
        let keyframe = self.nearest(target);
        keyframe.snapshot.restore_into(document);
        keyframe.index
    }

    /// Non-genesis indices in insertion order
    #[must_use]
    pub fn indices(&self) -> Vec<i64> {
        self.window.iter().map(|k| k.index).collect()
    }

    /// True if a keyframe at `index` is retained
    #[must_use]
    pub fn contains(&self, index: i64) -> bool {
        index == GENESIS_INDEX || self.window.iter().any(|k| k.index == index)
    }

    /// Number of non-genesis keyframes
    #[must_use]
    pub fn len(&self) -> usize {
        self.window.len()
    }

    /// True if only genesis is held
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    /// The base keyframe
    #[must_use]
    pub const fn genesis(&self) -> &Keyframe {
        &self.genesis
    }

    /// Capture cadence
    #[must_use]
    pub const fn interval(&self) -> usize {
        self.interval
    }

    /// Window capacity
    #[must_use]
    pub const fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Approximate bytes held by all keyframes, genesis included
    #[must_use]
    pub fn retained_bytes(&self) -> usize {
        self.genesis.snapshot.byte_len()
            + self
                .window
                .iter()
                .map(|k| k.snapshot.byte_len())
                .sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use retouch_core::Dims;

    fn cache(interval: usize, buffer: usize) -> KeyframeCache {
        let config = ReplayConfig::default()
            .with_interval(interval)
            .with_buffer(buffer);
        KeyframeCache::new(&config, &Document::with_dims(Dims::new(4, 4))).unwrap()
    }

    fn marked(opacity: f32) -> Document {
        let mut doc = Document::with_dims(Dims::new(4, 4));
        doc.state.opacity = opacity;
        doc
    }

    #[test]
    fn test_zero_interval_rejected() {
        let config = ReplayConfig::default().with_interval(0);
        assert!(KeyframeCache::new(&config, &Document::new()).is_err());
    }

    #[test]
    fn test_is_due() {
        let kc = cache(3, 2);
        assert!(kc.is_due(0));
        assert!(!kc.is_due(2));
        assert!(kc.is_due(6));
        assert!(!kc.is_due(-1));
    }

    #[test]
    fn test_nearest_falls_back_to_genesis() {
        let kc = cache(3, 2);
        assert_eq!(kc.nearest(-1).index, GENESIS_INDEX);
        assert_eq!(kc.nearest(10).index, GENESIS_INDEX);
    }

    #[test]
    fn test_window_evicts_oldest_inserted() {
        let mut kc = cache(3, 2);
        let doc = marked(0.5);
        for i in [0, 3, 6, 9] {
            kc.save_keyframe(i, &doc);
        }
        assert_eq!(kc.indices(), vec![6, 9]);
        assert!(kc.contains(GENESIS_INDEX));
        assert!(!kc.contains(3));
        assert_eq!(kc.nearest(8).index, 6);
        assert_eq!(kc.nearest(5).index, GENESIS_INDEX);
    }

    #[test]
    fn test_eviction_is_by_insertion_not_index() {
        let mut kc = cache(1, 2);
        let doc = marked(0.5);
        kc.save_keyframe(5, &doc);
        kc.save_keyframe(2, &doc);
        kc.save_keyframe(7, &doc);
        assert_eq!(kc.indices(), vec![2, 7]);
    }

    #[test]
    fn test_resave_replaces_and_refreshes() {
        let mut kc = cache(1, 2);
        kc.save_keyframe(1, &marked(0.1));
        kc.save_keyframe(2, &marked(0.2));
        kc.save_keyframe(1, &marked(0.9));
        assert_eq!(kc.indices(), vec![2, 1]);
        assert_eq!(kc.nearest(1).snapshot.opacity, 0.9);
    }

    #[test]
    fn test_save_genesis_replaces() {
        let mut kc = cache(3, 2);
        kc.save_keyframe(GENESIS_INDEX, &marked(0.25));
        assert_eq!(kc.genesis().snapshot.opacity, 0.25);
        assert!(kc.is_empty());
    }

    #[test]
    fn test_zero_buffer_keeps_only_genesis() {
        let mut kc = cache(1, 0);
        kc.save_keyframe(0, &marked(0.5));
        assert!(kc.is_empty());
        assert_eq!(kc.nearest(0).index, GENESIS_INDEX);
    }

    #[test]
    fn test_discard_after() {
        let mut kc = cache(1, 5);
        let doc = marked(0.5);
        for i in 0..5 {
            kc.save_keyframe(i, &doc);
        }
        assert_eq!(kc.discard_after(1), 3);
        assert_eq!(kc.indices(), vec![0, 1]);
    }

    #[test]
    fn test_restore_into_document() {
        let mut kc = cache(3, 2);
        kc.save_keyframe(3, &marked(0.3));
        let mut doc = marked(0.1);
        assert_eq!(kc.restore(4, &mut doc), 3);
        assert_eq!(doc.state.opacity, 0.3);
        assert_eq!(kc.restore(2, &mut doc), GENESIS_INDEX);
        assert_eq!(doc.state.opacity, Document::new().state.opacity);
    }

    #[test]
    fn test_retained_bytes_grow() {
        let mut kc = cache(1, 3);
        let empty = kc.retained_bytes();
        kc.save_keyframe(0, &marked(0.5));
        assert!(kc.retained_bytes() > empty);
    }

    proptest! {
        #[test]
        fn prop_nearest_is_greatest_retained_below(
            saves in proptest::collection::vec(0i64..40, 0..30),
            buffer in 0usize..6,
            target in -1i64..45,
        ) {
            let mut kc = cache(1, buffer);
            let doc = marked(0.5);
            for i in &saves {
                kc.save_keyframe(*i, &doc);
            }
            prop_assert!(kc.len() <= buffer);

            let found = kc.nearest(target).index;
            prop_assert!(found <= target);
            prop_assert!(kc.contains(found));
            let best = kc
                .indices()
                .into_iter()
                .filter(|i| *i <= target)
                .max()
                .unwrap_or(GENESIS_INDEX);
            prop_assert_eq!(found, best);
        }
    }
}
