//! Sortable world list.
//!
//! [`WorldListView`] owns the list and is only mutated on the client context.
//! Every mutation builds a complete new [`ViewState`] and publishes it in one
//! swap; [`ViewReader`] handles on any thread always see a whole list.

use arc_swap::ArcSwap;
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::debug;

use crate::metadata::MetadataSnapshot;
use crate::types::{AggregatedRecord, RawInstanceRecord};

/// Column the list is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    World,
    Y,
    LastUpdated,
}

/// One published version of the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub sort_key: SortKey,
    pub ascending: bool,
    pub records: Vec<AggregatedRecord>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            sort_key: SortKey::World,
            ascending: true,
            records: Vec::new(),
        }
    }
}

impl ViewState {
    fn sorted(sort_key: SortKey, ascending: bool, mut records: Vec<AggregatedRecord>) -> Self {
        sort_records(&mut records, sort_key, ascending);
        Self {
            sort_key,
            ascending,
            records,
        }
    }
}

/// Stable sort by `key`; missing values go last in either direction.
pub fn sort_records(records: &mut [AggregatedRecord], key: SortKey, ascending: bool) {
    records.sort_by(|a, b| match key {
        SortKey::World => compare_nulls_last(Some(a.world_id), Some(b.world_id), ascending),
        SortKey::Y => compare_nulls_last(a.y, b.y, ascending),
        SortKey::LastUpdated => compare_nulls_last(a.timestamp, b.timestamp, ascending),
    });
}

fn compare_nulls_last<T: Ord>(a: Option<T>, b: Option<T>, ascending: bool) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) if ascending => a.cmp(&b),
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Read-only handle onto the latest published list.
#[derive(Debug, Clone)]
pub struct ViewReader {
    current: Arc<ArcSwap<ViewState>>,
}

impl ViewReader {
    pub fn snapshot(&self) -> Arc<ViewState> {
        self.current.load_full()
    }
}

/// Owner of the world list.
#[derive(Debug)]
pub struct WorldListView {
    current: Arc<ArcSwap<ViewState>>,
}

impl WorldListView {
    pub fn new() -> Self {
        Self {
            current: Arc::new(ArcSwap::from_pointee(ViewState::default())),
        }
    }

    pub fn reader(&self) -> ViewReader {
        ViewReader {
            current: Arc::clone(&self.current),
        }
    }

    pub fn snapshot(&self) -> Arc<ViewState> {
        self.current.load_full()
    }

    /// Replaces the list with `raw` joined against `metadata`, keeping the
    /// current sort.
    pub fn populate(&mut self, raw: &[RawInstanceRecord], metadata: &MetadataSnapshot) {
        let records = raw
            .iter()
            .map(|record| {
                AggregatedRecord::from_raw(
                    record,
                    metadata.world(record.world_id).cloned(),
                    metadata.location(record.world_id),
                )
            })
            .collect();

        let current = self.current.load_full();
        let next = ViewState::sorted(current.sort_key, current.ascending, records);
        debug!("Populated world list with {} records", next.records.len());
        self.current.store(Arc::new(next));
    }

    /// Selects a sort column. Re-selecting the current column flips the
    /// direction; a new column starts ascending.
    pub fn set_sort(&mut self, key: SortKey) {
        let current = self.current.load_full();
        let ascending = if current.sort_key == key {
            !current.ascending
        } else {
            true
        };
        let next = ViewState::sorted(key, ascending, current.records.clone());
        self.current.store(Arc::new(next));
    }
}

impl Default for WorldListView {
    fn default() -> Self {
        Self::new()
    }
}
