//! Ordered key-value storage backends.
//!
//! The registry keeps every record under byte keys and relies on two things
//! from a backend: ascending byte order when scanning a prefix, and atomic
//! application of a [`WriteBatch`].

use parking_lot::RwLock;
use sled::{Db, Tree};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// Storage errors
#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sled::Error),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Key/value pair yielded by a prefix scan.
pub type KvPair = (Vec<u8>, Vec<u8>);

/// Ordered cursor over a key prefix.
///
/// Dropping the cursor releases it, whichever way the scan ends.
pub type PrefixIter<'a> = Box<dyn Iterator<Item = Result<KvPair>> + 'a>;

/// A single write inside a [`WriteBatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOp {
    Set { key: Vec<u8>, value: Vec<u8> },
    Delete { key: Vec<u8> },
}

/// Group of writes committed all together or not at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    ops: Vec<BatchOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> &mut Self {
        self.ops.push(BatchOp::Set {
            key: key.into(),
            value: value.into(),
        });
        self
    }

    pub fn delete(&mut self, key: impl Into<Vec<u8>>) -> &mut Self {
        self.ops.push(BatchOp::Delete { key: key.into() });
        self
    }

    pub fn ops(&self) -> &[BatchOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// Abstract ordered key-value store.
pub trait KvStore {
    fn has(&self, key: &[u8]) -> Result<bool>;
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;
    fn set(&self, key: &[u8], value: &[u8]) -> Result<()>;
    fn delete(&self, key: &[u8]) -> Result<()>;
    /// Scan every key starting with `prefix` in ascending byte order.
    fn prefix_iter(&self, prefix: &[u8]) -> Result<PrefixIter<'_>>;
    /// Apply every operation in `batch` atomically, in order.
    fn apply_batch(&self, batch: WriteBatch) -> Result<()>;
}

impl<S: KvStore + ?Sized> KvStore for Arc<S> {
    fn has(&self, key: &[u8]) -> Result<bool> {
        (**self).has(key)
    }

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn set(&self, key: &[u8], value: &[u8]) -> Result<()> {
        (**self).set(key, value)
    }

    fn delete(&self, key: &[u8]) -> Result<()> {
        (**self).delete(key)
    }

    fn prefix_iter(&self, prefix: &[u8]) -> Result<PrefixIter<'_>> {
        (**self).prefix_iter(prefix)
    }

    fn apply_batch(&self, batch: WriteBatch) -> Result<()> {
        (**self).apply_batch(batch)
    }
}

/// Sled-backed implementation
pub struct SledStore {
    db: Db,
    records: Tree,
}

impl SledStore {
    /// Tree holding every registry key.
    pub const TREE_NAME: &'static str = "names";

    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = sled::open(path.as_ref())?;
        let records = db.open_tree(Self::TREE_NAME)?;
        tracing::debug!(path = %path.as_ref().display(), entries = records.len(), "opened name store");
        Ok(Self { db, records })
    }

    /// Open a throwaway store that is removed when dropped.
    pub fn temporary() -> Result<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        let records = db.open_tree(Self::TREE_NAME)?;
        Ok(Self { db, records })
    }

    pub fn flush(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }
}

impl KvStore for SledStore {
    fn has(&self, key: &[u8]) -> Result<bool> {
        Ok(self.records.contains_key(key)?)
    }

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.records.get(key)?.map(|v| v.to_vec()))
    }

    fn set(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.records.insert(key, value)?;
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> Result<()> {
        self.records.remove(key)?;
        Ok(())
    }

    fn prefix_iter(&self, prefix: &[u8]) -> Result<PrefixIter<'_>> {
        let iter = self.records.scan_prefix(prefix).map(|item| -> Result<KvPair> {
            let (k, v) = item?;
            Ok((k.to_vec(), v.to_vec()))
        });
        Ok(Box::new(iter))
    }

    fn apply_batch(&self, batch: WriteBatch) -> Result<()> {
        let mut sled_batch = sled::Batch::default();
        for op in batch.ops {
            match op {
                BatchOp::Set { key, value } => sled_batch.insert(key, value),
                BatchOp::Delete { key } => sled_batch.remove(key),
            }
        }
        self.records.apply_batch(sled_batch)?;
        Ok(())
    }
}

/// In-memory testing backend
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<BTreeMap<Vec<u8>, Vec<u8>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl KvStore for MemoryStore {
    fn has(&self, key: &[u8]) -> Result<bool> {
        Ok(self.entries.read().contains_key(key))
    }

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.entries.write().insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> Result<()> {
        self.entries.write().remove(key);
        Ok(())
    }

    fn prefix_iter(&self, prefix: &[u8]) -> Result<PrefixIter<'_>> {
        // Snapshot the range so the cursor never holds the lock.
        let snapshot: Vec<KvPair> = self
            .entries
            .read()
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Ok(Box::new(snapshot.into_iter().map(Ok)))
    }

    fn apply_batch(&self, batch: WriteBatch) -> Result<()> {
        let mut entries = self.entries.write();
        for op in batch.ops {
            match op {
                BatchOp::Set { key, value } => {
                    entries.insert(key, value);
                }
                BatchOp::Delete { key } => {
                    entries.remove(&key);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_batch_records_ops_in_order() {
        let mut batch = WriteBatch::new();
        batch.set(b"a".to_vec(), b"1".to_vec()).delete(b"b".to_vec());
        assert_eq!(batch.len(), 2);
        assert_eq!(
            batch.ops()[1],
            BatchOp::Delete {
                key: b"b".to_vec()
            }
        );
    }

    #[test]
    fn memory_prefix_scan_is_bounded() {
        let store = MemoryStore::new();
        store.set(&[1, 1], b"x").unwrap();
        store.set(&[1, 2], b"y").unwrap();
        store.set(&[2, 0], b"z").unwrap();
        store.set(&[0, 9], b"w").unwrap();

        let keys: Vec<Vec<u8>> = store
            .prefix_iter(&[1])
            .unwrap()
            .map(|r| r.unwrap().0)
            .collect();
        assert_eq!(keys, vec![vec![1, 1], vec![1, 2]]);
    }
}
