//! Per-site locator registries.
//!
//! A registry maps each site to a copy-on-write set. The outer map is a `DashMap`,
//! so installing a site entry only locks that entry's shard. The per-site set never
//! mutates in place: every insert builds a new frozen `HashSet` and swaps it in with
//! a compare-and-swap, so a reader holding a snapshot can iterate it while other
//! threads keep adding.

use super::types::{LocatorId, SiteId};

use arc_swap::ArcSwap;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::sync::Arc;

/// Set that is safe to read while being extended concurrently.
pub struct CowSet<T> {
    items: ArcSwap<HashSet<T>>,
}

impl<T> CowSet<T>
where
    T: Clone + Eq + Hash,
{
    pub fn new() -> Self {
        Self {
            items: ArcSwap::from_pointee(HashSet::new()),
        }
    }

    pub fn from_items<I: IntoIterator<Item = T>>(items: I) -> Self {
        Self {
            items: ArcSwap::from_pointee(items.into_iter().collect()),
        }
    }

    /// Adds `item` unless an equal item is already present.
    ///
    /// Returns `true` only for the caller whose swap actually published the item,
    /// so concurrent inserts of the same item have exactly one winner.
    pub fn insert(&self, item: T) -> bool {
        loop {
            let current = self.items.load_full();
            if current.contains(&item) {
                return false;
            }

            let mut next = HashSet::with_capacity(current.len() + 1);
            next.extend(current.iter().cloned());
            next.insert(item.clone());

            let prev = self.items.compare_and_swap(&current, Arc::new(next));
            if Arc::ptr_eq(&prev, &current) {
                return true;
            }
            // Lost the race to another writer, retry against the newer set.
        }
    }

    pub fn contains(&self, item: &T) -> bool {
        self.items.load().contains(item)
    }

    /// Immutable view of the set as of this call.
    pub fn snapshot(&self) -> Arc<HashSet<T>> {
        self.items.load_full()
    }

    pub fn len(&self) -> usize {
        self.items.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.load().is_empty()
    }
}

impl<T> Default for CowSet<T>
where
    T: Clone + Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Concurrent mapping from site to the set of items known for that site.
///
/// Entries are created lazily and never removed; a registry lives as long as the
/// listener that owns it.
pub struct SiteRegistry<T> {
    sites: DashMap<SiteId, Arc<CowSet<T>>>,
}

/// Every known locator, per site.
pub type LocatorRegistry = SiteRegistry<LocatorId>;

/// String form of every known client-serving locator, per site.
pub type ServerLocatorRegistry = SiteRegistry<String>;

impl<T> SiteRegistry<T>
where
    T: Clone + Eq + Hash,
{
    pub fn new() -> Self {
        Self {
            sites: DashMap::new(),
        }
    }

    /// Installs the set built by `seed` if `site_id` has no entry yet.
    ///
    /// Returns the entry's set and whether this call created it. `seed` only runs
    /// for the creating caller. The shard lock is released before returning.
    pub fn install_if_absent<F>(&self, site_id: SiteId, seed: F) -> (Arc<CowSet<T>>, bool)
    where
        F: FnOnce() -> CowSet<T>,
    {
        match self.sites.entry(site_id) {
            Entry::Occupied(entry) => (Arc::clone(entry.get()), false),
            Entry::Vacant(entry) => {
                let set = Arc::new(seed());
                entry.insert(Arc::clone(&set));
                (set, true)
            }
        }
    }

    pub fn get(&self, site_id: SiteId) -> Option<Arc<CowSet<T>>> {
        self.sites
            .get(&site_id)
            .map(|entry| Arc::clone(entry.value()))
    }

    pub fn contains(&self, site_id: SiteId, item: &T) -> bool {
        self.get(site_id).is_some_and(|set| set.contains(item))
    }

    /// Copies every site's current set into a plain map.
    ///
    /// Each site is copied from a single consistent set version; sites are not
    /// captured atomically with respect to each other.
    pub fn snapshot(&self) -> HashMap<SiteId, HashSet<T>> {
        self.sites
            .iter()
            .map(|entry| (*entry.key(), entry.value().snapshot().as_ref().clone()))
            .collect()
    }

    /// Items of `site_id` in sorted order; empty if the site is unknown.
    pub fn sorted_items(&self, site_id: SiteId) -> Vec<T>
    where
        T: Ord,
    {
        let mut items: Vec<T> = self
            .get(site_id)
            .map(|set| set.snapshot().iter().cloned().collect())
            .unwrap_or_default();
        items.sort();
        items
    }

    pub fn site_ids(&self) -> Vec<SiteId> {
        self.sites.iter().map(|entry| *entry.key()).collect()
    }

    /// Number of sites with an entry.
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}

impl<T> Default for SiteRegistry<T>
where
    T: Clone + Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}
