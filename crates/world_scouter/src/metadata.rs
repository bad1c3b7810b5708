//! Last-known world metadata.
//!
//! Each refresh builds brand-new tables and swaps them in whole, so a reader
//! holding a snapshot never sees a table mid-rebuild and no lock is needed.

use arc_swap::ArcSwapOption;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::dispatch::ClientThread;
use crate::host::{GameClient, GameState, HostAccess, WorldListProvider, WorldLocationTable};
use crate::types::{WorldId, WorldMetadata};

pub type WorldTable = HashMap<WorldId, WorldMetadata>;

/// Consistent view of both tables taken at one instant.
#[derive(Debug, Clone, Default)]
pub struct MetadataSnapshot {
    worlds: Option<Arc<WorldTable>>,
    locations: Option<Arc<WorldLocationTable>>,
}

impl MetadataSnapshot {
    pub fn world(&self, id: WorldId) -> Option<&WorldMetadata> {
        self.worlds.as_ref()?.get(&id)
    }

    pub fn location(&self, id: WorldId) -> Option<i32> {
        self.locations.as_ref()?.get(id)
    }
}

/// World id → metadata, plus the host's location codes.
#[derive(Debug, Default)]
pub struct MetadataCache {
    worlds: ArcSwapOption<WorldTable>,
    locations: ArcSwapOption<WorldLocationTable>,
}

impl MetadataCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> MetadataSnapshot {
        MetadataSnapshot {
            worlds: self.worlds.load_full(),
            locations: self.locations.load_full(),
        }
    }

    /// Metadata for `id`, or `None` if unknown.
    pub fn world(&self, id: WorldId) -> Option<WorldMetadata> {
        self.worlds.load_full()?.get(&id).cloned()
    }

    /// Location code for `id`, or `None` if unknown.
    pub fn location(&self, id: WorldId) -> Option<i32> {
        self.locations.load_full()?.get(id)
    }

    pub fn world_count(&self) -> usize {
        self.worlds.load_full().map_or(0, |worlds| worlds.len())
    }

    pub fn store_worlds(&self, worlds: Vec<WorldMetadata>) {
        let table: WorldTable = worlds.into_iter().map(|w| (w.id, w)).collect();
        debug!("Cached {} worlds", table.len());
        self.worlds.store(Some(Arc::new(table)));
    }

    pub fn store_locations(&self, locations: WorldLocationTable) {
        debug!("Cached {} world locations", locations.len());
        self.locations.store(Some(Arc::new(locations)));
    }

    /// Rebuilds the world table and queues a location read on the client
    /// context.
    ///
    /// Returns `false` without touching anything before the client reaches the
    /// login screen or when the world list is unavailable. The queued read is
    /// skipped if `is_alive` reports false by the time it runs.
    pub fn refresh<S, F>(
        self: &Arc<Self>,
        client: &dyn GameClient,
        provider: &dyn WorldListProvider,
        client_thread: &ClientThread<S>,
        is_alive: F,
    ) -> bool
    where
        S: HostAccess + 'static,
        F: Fn() -> bool + Send + 'static,
    {
        if !client.game_state().at_least(GameState::LoginScreen) {
            return false;
        }

        let Some(worlds) = provider.worlds() else {
            warn!("World list unavailable");
            return false;
        };
        self.store_worlds(worlds);

        let cache = Arc::clone(self);
        client_thread.invoke_later(move |state: &mut S| {
            if !is_alive() {
                debug!("Skipping world location read after shutdown");
                return;
            }
            if let Some(locations) = state.game_client().world_locations() {
                cache.store_locations(locations);
            }
        });

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::client_thread;
    use crate::test_support::{FakeClient, FakeWorlds, HostOnly};
    use crate::types::WorldRegion;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn uk_world(id: u32) -> WorldMetadata {
        WorldMetadata::new(WorldId(id), Some(WorldRegion::UnitedKingdom))
    }

    #[test]
    fn test_lookup_before_refresh_is_absent() {
        let cache = MetadataCache::new();
        assert!(cache.world(WorldId(302)).is_none());
        assert!(cache.location(WorldId(302)).is_none());
        assert_eq!(cache.world_count(), 0);
    }

    #[test]
    fn test_refresh_waits_for_login_screen() {
        let cache = Arc::new(MetadataCache::new());
        let client = FakeClient::new();
        client.set_game_state(GameState::Starting);
        let worlds = FakeWorlds::new(vec![uk_world(302)]);
        let (handle, _queue) = client_thread::<HostOnly>();

        assert!(!cache.refresh(client.as_ref(), &worlds, &handle, || true));
        assert_eq!(cache.world_count(), 0);
        assert_eq!(worlds.calls(), 0);
    }

    #[test]
    fn test_refresh_fails_without_world_list() {
        let cache = Arc::new(MetadataCache::new());
        let client = FakeClient::new();
        let worlds = FakeWorlds::unavailable();
        let (handle, _queue) = client_thread::<HostOnly>();

        assert!(!cache.refresh(client.as_ref(), &worlds, &handle, || true));
        assert_eq!(cache.world_count(), 0);
    }

    #[test]
    fn test_locations_are_read_on_client_context() {
        let cache = Arc::new(MetadataCache::new());
        let client = FakeClient::new();
        client.set_locations(vec![(WorldId(302), -42)]);
        let worlds = FakeWorlds::new(vec![uk_world(302), uk_world(303)]);
        let (handle, mut queue) = client_thread::<HostOnly>();

        assert!(cache.refresh(client.as_ref(), &worlds, &handle, || true));
        assert_eq!(cache.world_count(), 2);
        assert_eq!(cache.world(WorldId(302)).unwrap().region, Some(WorldRegion::UnitedKingdom));

        // Not read until the client context runs.
        assert!(cache.location(WorldId(302)).is_none());
        assert_eq!(client.location_reads(), 0);

        let mut state = HostOnly::new(client.clone());
        queue.drain(&mut state);
        assert_eq!(client.location_reads(), 1);
        assert_eq!(cache.location(WorldId(302)), Some(-42));
        assert_eq!(cache.location(WorldId(303)), None);
    }

    #[test]
    fn test_location_read_skipped_once_dead() {
        let cache = Arc::new(MetadataCache::new());
        let client = FakeClient::new();
        client.set_locations(vec![(WorldId(302), -42)]);
        let worlds = FakeWorlds::new(vec![uk_world(302)]);
        let (handle, mut queue) = client_thread::<HostOnly>();
        let alive = Arc::new(AtomicBool::new(true));

        let flag = Arc::clone(&alive);
        assert!(cache.refresh(client.as_ref(), &worlds, &handle, move || {
            flag.load(Ordering::Acquire)
        }));
        alive.store(false, Ordering::Release);

        let mut state = HostOnly::new(client.clone());
        queue.drain(&mut state);
        assert_eq!(client.location_reads(), 0);
        assert!(cache.location(WorldId(302)).is_none());
    }

    #[test]
    fn test_snapshot_survives_refresh() {
        let cache = MetadataCache::new();
        cache.store_worlds(vec![uk_world(302)]);
        let before = cache.snapshot();

        cache.store_worlds(vec![uk_world(330)]);

        assert!(before.world(WorldId(302)).is_some());
        assert!(before.world(WorldId(330)).is_none());
        let after = cache.snapshot();
        assert!(after.world(WorldId(302)).is_none());
        assert!(after.world(WorldId(330)).is_some());
    }
}
