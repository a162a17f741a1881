use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::{StoreError, StoreResult};
use crate::record::Record;

/// Entity-store port: one table per record kind, per-item atomic operations.
///
/// Multi-step workflows get no cross-item transaction from this trait; the
/// conditional primitives (`insert`, `update_if`) are the only concurrency
/// control available, matching a key-value store with per-item condition
/// expressions.
pub trait Table<R: Record>: Send + Sync {
    /// Unconditional upsert.
    fn put(&self, record: R) -> StoreResult<()>;

    /// Create-only write; fails with `ConditionFailed` if the key exists.
    fn insert(&self, record: R) -> StoreResult<()>;

    fn get(&self, key: &R::Key) -> StoreResult<Option<R>>;

    /// Atomic read-modify-write. `NotFound` if the key is absent.
    fn update(&self, key: &R::Key, apply: &mut dyn FnMut(&mut R)) -> StoreResult<R>;

    /// Compare-and-swap: `apply` runs only if `check` passes on the current
    /// value, atomically. `ConditionFailed` otherwise.
    fn update_if(
        &self,
        key: &R::Key,
        check: &dyn Fn(&R) -> bool,
        apply: &mut dyn FnMut(&mut R),
    ) -> StoreResult<R>;

    /// Delete by key; `NotFound` if absent.
    fn delete(&self, key: &R::Key) -> StoreResult<()>;

    /// All records whose index entry matches `(index, partition)`, ordered by
    /// sort key ascending (oldest first).
    fn query(&self, index: &str, partition: &str) -> StoreResult<Vec<R>>;

    /// Full-table scan, unordered. Admin aggregation views only.
    fn scan(&self) -> StoreResult<Vec<R>>;
}

impl<R, S> Table<R> for Arc<S>
where
    R: Record,
    S: Table<R> + ?Sized,
{
    fn put(&self, record: R) -> StoreResult<()> {
        (**self).put(record)
    }

    fn insert(&self, record: R) -> StoreResult<()> {
        (**self).insert(record)
    }

    fn get(&self, key: &R::Key) -> StoreResult<Option<R>> {
        (**self).get(key)
    }

    fn update(&self, key: &R::Key, apply: &mut dyn FnMut(&mut R)) -> StoreResult<R> {
        (**self).update(key, apply)
    }

    fn update_if(
        &self,
        key: &R::Key,
        check: &dyn Fn(&R) -> bool,
        apply: &mut dyn FnMut(&mut R),
    ) -> StoreResult<R> {
        (**self).update_if(key, check, apply)
    }

    fn delete(&self, key: &R::Key) -> StoreResult<()> {
        (**self).delete(key)
    }

    fn query(&self, index: &str, partition: &str) -> StoreResult<Vec<R>> {
        (**self).query(index, partition)
    }

    fn scan(&self) -> StoreResult<Vec<R>> {
        (**self).scan()
    }
}

/// In-memory table for tests/dev.
#[derive(Debug)]
pub struct InMemoryTable<R: Record> {
    inner: RwLock<HashMap<R::Key, R>>,
}

impl<R: Record> InMemoryTable<R> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }
}

impl<R: Record> Default for InMemoryTable<R> {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned(entity: &'static str) -> StoreError {
    StoreError::Corrupt(format!("{entity} table lock poisoned"))
}

impl<R: Record> Table<R> for InMemoryTable<R> {
    fn put(&self, record: R) -> StoreResult<()> {
        let mut map = self.inner.write().map_err(|_| poisoned(R::ENTITY))?;
        map.insert(record.key(), record);
        Ok(())
    }

    fn insert(&self, record: R) -> StoreResult<()> {
        let mut map = self.inner.write().map_err(|_| poisoned(R::ENTITY))?;
        match map.entry(record.key()) {
            std::collections::hash_map::Entry::Occupied(_) => Err(StoreError::ConditionFailed(
                format!("{} already exists", R::ENTITY),
            )),
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(record);
                Ok(())
            }
        }
    }

    fn get(&self, key: &R::Key) -> StoreResult<Option<R>> {
        let map = self.inner.read().map_err(|_| poisoned(R::ENTITY))?;
        Ok(map.get(key).cloned())
    }

    fn update(&self, key: &R::Key, apply: &mut dyn FnMut(&mut R)) -> StoreResult<R> {
        let mut map = self.inner.write().map_err(|_| poisoned(R::ENTITY))?;
        let record = map.get_mut(key).ok_or(StoreError::NotFound)?;
        apply(record);
        Ok(record.clone())
    }

    fn update_if(
        &self,
        key: &R::Key,
        check: &dyn Fn(&R) -> bool,
        apply: &mut dyn FnMut(&mut R),
    ) -> StoreResult<R> {
        let mut map = self.inner.write().map_err(|_| poisoned(R::ENTITY))?;
        let record = map.get_mut(key).ok_or(StoreError::NotFound)?;
        if !check(record) {
            return Err(StoreError::ConditionFailed(format!(
                "{} condition not met",
                R::ENTITY
            )));
        }
        apply(record);
        Ok(record.clone())
    }

    fn delete(&self, key: &R::Key) -> StoreResult<()> {
        let mut map = self.inner.write().map_err(|_| poisoned(R::ENTITY))?;
        map.remove(key).map(|_| ()).ok_or(StoreError::NotFound)
    }

    fn query(&self, index: &str, partition: &str) -> StoreResult<Vec<R>> {
        let map = self.inner.read().map_err(|_| poisoned(R::ENTITY))?;

        let mut hits: Vec<_> = map
            .values()
            .filter_map(|record| {
                record
                    .index_entries()
                    .into_iter()
                    .find(|e| e.index == index && e.partition == partition)
                    .map(|e| (e.sort_key, record.clone()))
            })
            .collect();

        hits.sort_by_key(|(sort_key, _)| *sort_key);
        Ok(hits.into_iter().map(|(_, record)| record).collect())
    }

    fn scan(&self) -> StoreResult<Vec<R>> {
        let map = self.inner.read().map_err(|_| poisoned(R::ENTITY))?;
        Ok(map.values().cloned().collect())
    }
}
