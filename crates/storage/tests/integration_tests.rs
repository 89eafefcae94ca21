//! Integration tests for storage backends (Sled and in-memory).
//! Covers point operations, ordered prefix scans and atomic batches.

use dotname_storage::{KvStore, MemoryStore, SledStore, StorageError, WriteBatch};
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

fn exercise_point_ops<S: KvStore>(store: &S) {
    assert!(!store.has(b"alpha").unwrap());
    assert_eq!(store.get(b"alpha").unwrap(), None);

    store.set(b"alpha", b"one").unwrap();
    assert!(store.has(b"alpha").unwrap());
    assert_eq!(store.get(b"alpha").unwrap(), Some(b"one".to_vec()));

    store.set(b"alpha", b"two").unwrap();
    assert_eq!(store.get(b"alpha").unwrap(), Some(b"two".to_vec()));

    store.delete(b"alpha").unwrap();
    assert!(!store.has(b"alpha").unwrap());

    // Deleting a missing key is a no-op.
    store.delete(b"alpha").unwrap();
}

fn exercise_prefix_order<S: KvStore>(store: &S) {
    for key in [
        vec![0x03, 0xff],
        vec![0x03, 0x00, 0x01],
        vec![0x05, 0x00],
        vec![0x03],
        vec![0x02, 0xff],
        vec![0x03, 0x00],
    ] {
        store.set(&key, &key).unwrap();
    }

    let keys: Vec<Vec<u8>> = store
        .prefix_iter(&[0x03])
        .unwrap()
        .map(|item| item.unwrap().0)
        .collect();
    assert_eq!(
        keys,
        vec![
            vec![0x03],
            vec![0x03, 0x00],
            vec![0x03, 0x00, 0x01],
            vec![0x03, 0xff],
        ]
    );

    let none: Vec<_> = store.prefix_iter(&[0x09]).unwrap().collect();
    assert!(none.is_empty());
}

fn exercise_batch<S: KvStore>(store: &S) {
    store.set(b"stale", b"x").unwrap();

    let mut batch = WriteBatch::new();
    batch
        .set(b"primary".to_vec(), b"payload".to_vec())
        .set(b"index".to_vec(), b"payload".to_vec())
        .delete(b"stale".to_vec());
    store.apply_batch(batch).unwrap();

    assert_eq!(store.get(b"primary").unwrap(), Some(b"payload".to_vec()));
    assert_eq!(store.get(b"index").unwrap(), Some(b"payload".to_vec()));
    assert!(!store.has(b"stale").unwrap());

    // Later ops in a batch win over earlier ones on the same key.
    let mut batch = WriteBatch::new();
    batch.delete(b"primary".to_vec()).set(b"primary".to_vec(), b"again".to_vec());
    store.apply_batch(batch).unwrap();
    assert_eq!(store.get(b"primary").unwrap(), Some(b"again".to_vec()));
}

#[test]
fn memory_store_point_ops() {
    exercise_point_ops(&MemoryStore::new());
}

#[test]
fn memory_store_prefix_order() {
    exercise_prefix_order(&MemoryStore::new());
}

#[test]
fn memory_store_batch() {
    exercise_batch(&MemoryStore::new());
}

#[test]
fn sled_store_point_ops() {
    let dir = TempDir::new().unwrap();
    exercise_point_ops(&SledStore::new(dir.path()).unwrap());
}

#[test]
fn sled_store_prefix_order() {
    exercise_prefix_order(&SledStore::temporary().unwrap());
}

#[test]
fn sled_store_batch() {
    exercise_batch(&SledStore::temporary().unwrap());
}

#[test]
fn arc_wrapped_store_delegates() {
    let store: Arc<dyn KvStore> = Arc::new(MemoryStore::new());
    exercise_point_ops(&store);
}

/// Reopen a sled path, waiting out the previous handle's file lock.
///
/// sled's flusher thread can outlive the dropped `Db` briefly.
fn reopen_sled(path: &Path) -> SledStore {
    let mut attempts = 0;
    loop {
        match SledStore::new(path) {
            Ok(store) => return store,
            Err(StorageError::Database(sled::Error::Io(err)))
                if err.kind() == ErrorKind::WouldBlock && attempts < 100 =>
            {
                attempts += 1;
                thread::sleep(Duration::from_millis(50));
            }
            Err(err) => panic!("reopening sled store failed: {err}"),
        }
    }
}

#[test]
fn sled_store_persists_across_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("names-db");
    let store = SledStore::new(&path).unwrap();
    store.set(b"durable", b"yes").unwrap();
    store.flush().unwrap();
    drop(store);

    let store = reopen_sled(&path);
    assert_eq!(store.get(b"durable").unwrap(), Some(b"yes".to_vec()));
}

#[test]
fn memory_store_clones_share_state() {
    let store = MemoryStore::new();
    let view = store.clone();
    store.set(b"k", b"v").unwrap();
    assert!(view.has(b"k").unwrap());
    assert_eq!(view.len(), 1);
}

#[test]
fn abandoned_cursor_does_not_block_writes() {
    let store = MemoryStore::new();
    store.set(&[1, 1], b"a").unwrap();
    store.set(&[1, 2], b"b").unwrap();

    let mut cursor = store.prefix_iter(&[1]).unwrap();
    let first = cursor.next().unwrap().unwrap();
    assert_eq!(first.0, vec![1, 1]);
    store.set(&[1, 3], b"c").unwrap();
    drop(cursor);

    assert_eq!(store.prefix_iter(&[1]).unwrap().count(), 3);
}
