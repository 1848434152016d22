//! Entity cache.
//!
//! Maps DNs to resolved entities, one shard per specialised class. There
//! is no TTL and no eviction; entries go away only through
//! [`EntityCache::invalidate`] or [`EntityCache::clear`].
//!
//! Lookups are gated by the enabled flag. Stores always happen, so turning
//! the cache on later serves whatever has been resolved meanwhile.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::class::EntityClass;
use crate::entity::Entity;

type Shard = Mutex<HashMap<String, Entity>>;

/// DN-keyed entity cache.
#[derive(Debug)]
pub struct EntityCache {
    enabled: AtomicBool,
    users: Shard,
    groups: Shard,
    computers: Shard,
}

impl Default for EntityCache {
    fn default() -> Self {
        Self::new(true)
    }
}

fn key(dn: &str) -> String {
    dn.to_ascii_lowercase()
}

impl EntityCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: AtomicBool::new(enabled),
            users: Shard::default(),
            groups: Shard::default(),
            computers: Shard::default(),
        }
    }

    fn shard(&self, class: EntityClass) -> Option<&Shard> {
        match class {
            EntityClass::Base => None,
            EntityClass::User => Some(&self.users),
            EntityClass::Group => Some(&self.groups),
            EntityClass::Computer => Some(&self.computers),
        }
    }

    fn shards(&self) -> [&Shard; 3] {
        [&self.users, &self.groups, &self.computers]
    }

    /// Checks whether lookups are served from the cache.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Turns cache lookups on.
    pub fn enable(&self) {
        self.enabled.store(true, Ordering::Relaxed);
    }

    /// Turns cache lookups off. Stored entities are kept.
    pub fn disable(&self) {
        self.enabled.store(false, Ordering::Relaxed);
    }

    /// Looks up an entity by DN in every shard.
    ///
    /// Ignores the enabled flag.
    #[must_use]
    pub fn lookup(&self, dn: &str) -> Option<Entity> {
        let key = key(dn);
        self.shards()
            .iter()
            .find_map(|shard| shard.lock().get(&key).cloned())
    }

    /// Looks up a DN for a query of `class`.
    ///
    /// Returns `None` when the cache is disabled, the DN is missing, or the
    /// cached entity is not of `class`.
    #[must_use]
    pub fn lookup_for(&self, class: EntityClass, dn: &str) -> Option<Entity> {
        if !self.is_enabled() {
            return None;
        }
        self.lookup(dn).filter(|entity| entity.class().is_a(class))
    }

    /// Looks up every DN for a query of `class`.
    ///
    /// All or nothing: one missing DN or wrong-class hit yields `None`.
    #[must_use]
    pub fn lookup_all(&self, class: EntityClass, dns: &[&str]) -> Option<Vec<Entity>> {
        if !self.is_enabled() {
            return None;
        }
        dns.iter().map(|dn| self.lookup_for(class, dn)).collect()
    }

    /// Stores an entity under its DN.
    ///
    /// Base-class entities are not stored. Returns whether it was stored.
    pub fn store(&self, entity: &Entity) -> bool {
        match self.shard(entity.class()) {
            Some(shard) => {
                shard.lock().insert(key(entity.dn()), entity.clone());
                true
            }
            None => false,
        }
    }

    /// Removes a DN from every shard.
    pub fn invalidate(&self, dn: &str) {
        let key = key(dn);
        for shard in self.shards() {
            shard.lock().remove(&key);
        }
    }

    /// Removes every entity.
    pub fn clear(&self) {
        for shard in self.shards() {
            shard.lock().clear();
        }
    }

    /// Returns the number of cached entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shards().iter().map(|shard| shard.lock().len()).sum()
    }

    /// Checks whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
