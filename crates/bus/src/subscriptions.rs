//! Subscription bookkeeping across the connection's lifetime.

use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::types::Subscription;

struct Entry {
    info: Subscription,
    /// ID the hub currently knows this subscription under. Starts equal
    /// to `info.id` and is refreshed on every reconnect replay.
    wire_id: u64,
}

/// Active subscriptions keyed by the ID they were created with.
///
/// The creating ID stays the caller's handle forever; replays after a
/// reconnect only move the `wire_id` underneath it. BTreeMap keeps
/// iteration in creation order so replays resubscribe oldest first.
#[derive(Default)]
pub(crate) struct SubscriptionTable {
    entries: Mutex<BTreeMap<u64, Entry>>,
}

impl SubscriptionTable {
    pub(crate) fn insert(&self, info: Subscription) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let wire_id = info.id;
        entries.insert(info.id, Entry { info, wire_id });
    }

    pub(crate) fn wire_id(&self, id: u64) -> Option<u64> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.get(&id).map(|entry| entry.wire_id)
    }

    pub(crate) fn set_wire_id(&self, id: u64, wire_id: u64) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(entry) = entries.get_mut(&id) {
            entry.wire_id = wire_id;
        }
    }

    /// Returns whether a record was actually removed.
    pub(crate) fn remove(&self, id: u64) -> bool {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.remove(&id).is_some()
    }

    /// Snapshot of `(handle, filter)` pairs in creation order, for
    /// replaying after a reconnect.
    pub(crate) fn snapshot(&self) -> Vec<(u64, Option<String>)> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries
            .values()
            .map(|entry| (entry.info.id, entry.info.event_type.clone()))
            .collect()
    }

    pub(crate) fn clear(&self) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.clear();
    }
}
