//! Source registry (C4): lookup of source state by identity, with
//! idempotent creation on first packet.
//!
//! Grounded in the teacher's `PeerManager`, which keeps a fixed-size
//! slot table keyed by peer id; here sources come and go by network
//! identity rather than connection slot, so a `HashMap` fits better, but
//! the "look up, and create on miss" idiom is the same.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::config::MixerConfig;
use crate::source::{SourceId, SourceKind, SourceState};
use crate::stats::MixerStats;

#[derive(Default)]
pub struct SourceRegistry {
    sources: HashMap<SourceId, SourceState>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: SourceId) -> Option<&SourceState> {
        self.sources.get(&id)
    }

    pub fn get_mut(&mut self, id: SourceId) -> Option<&mut SourceState> {
        self.sources.get_mut(&id)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SourceState> {
        self.sources.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut SourceState> {
        self.sources.values_mut()
    }

    /// Looks up `id`, creating a fresh source (with its own ring buffer
    /// and gap tracker) on first sight. Returns `true` in the second
    /// element if this call created the entry.
    pub fn get_or_create(
        &mut self,
        id: SourceId,
        kind: SourceKind,
        config: &MixerConfig,
    ) -> (&mut SourceState, bool) {
        let mut created = false;
        let entry = self.sources.entry(id).or_insert_with(|| {
            created = true;
            SourceState::new(id, kind, config)
        });
        (entry, created)
    }

    /// As [`Self::get_or_create`], but logs and bumps `stats.sources_created`
    /// on creation — the "unknown source" and "stream-id mismatch" cases
    /// from spec §7(e)/(f) both funnel through here.
    pub fn get_or_create_logged(
        &mut self,
        id: SourceId,
        kind: SourceKind,
        config: &MixerConfig,
        stats: &MixerStats,
    ) -> &mut SourceState {
        let (source, created) = self.get_or_create(id, kind, config);
        if created {
            stats.sources_created.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            log::debug!("registry: created new source {id:?}");
        }
        source
    }
}

/// A `Mutex`-guarded registry for hosts that want to inspect state (a
/// stats endpoint, say) from a thread other than the mixer loop, without
/// routing through it. The mixer loop itself should prefer a bare
/// `SourceRegistry` — no lock is needed when only one thread ever touches it.
pub struct SharedRegistry {
    inner: Mutex<SourceRegistry>,
}

impl SharedRegistry {
    pub fn new() -> Self {
        Self { inner: Mutex::new(SourceRegistry::new()) }
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut SourceRegistry) -> R) -> R {
        f(&mut self.inner.lock())
    }
}

impl Default for SharedRegistry {
    fn default() -> Self {
        Self::new()
    }
}
