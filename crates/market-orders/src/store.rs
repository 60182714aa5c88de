//! # In-Memory Store
//!
//! Thread-safe, cloneable key-value store for order records.
//!
//! Status changes must be atomic check-then-set: read the current status,
//! validate the transition, write the new status. [`Store::try_update()`]
//! runs all three under one write lock, so two concurrent requests can
//! never both observe the same pre-transition status.
//!
//! All operations are synchronous. The lock is `parking_lot`, which does
//! not poison: a panicking writer leaves the map usable.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::RwLock;

/// Cloneable handle to a shared map. Clones see the same data.
#[derive(Debug)]
pub struct Store<K, T> {
    data: Arc<RwLock<HashMap<K, T>>>,
}

impl<K, T> Clone for Store<K, T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
        }
    }
}

impl<K: Eq + Hash + Copy, T: Clone> Store<K, T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert a record, returning the previous value if the key existed.
    pub fn insert(&self, id: K, value: T) -> Option<T> {
        self.data.write().insert(id, value)
    }

    /// Retrieve a record by key.
    pub fn get(&self, id: &K) -> Option<T> {
        self.data.read().get(id).cloned()
    }

    /// Keys of records matching `pred`.
    pub fn find_keys(&self, pred: impl Fn(&T) -> bool) -> Vec<K> {
        self.data
            .read()
            .iter()
            .filter(|(_, v)| pred(v))
            .map(|(k, _)| *k)
            .collect()
    }

    /// Atomically read-validate-update a record.
    ///
    /// The closure sees the current record and may mutate it and return
    /// `Ok`, or return `Err`. It runs under a single write lock. Returns
    /// `None` if the key is absent.
    ///
    /// The closure must not mutate before it is certain to return `Ok`;
    /// the store does not roll back.
    pub fn try_update<R, E>(
        &self,
        id: &K,
        f: impl FnOnce(&mut T) -> Result<R, E>,
    ) -> Option<Result<R, E>> {
        self.data.write().get_mut(id).map(f)
    }
}

impl<K: Eq + Hash + Copy, T: Clone> Default for Store<K, T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_get() {
        let store: Store<u32, String> = Store::new();
        assert!(store.get(&1).is_none());
        assert!(store.insert(1, "a".to_string()).is_none());
        assert_eq!(store.get(&1).as_deref(), Some("a"));
        assert_eq!(store.insert(1, "b".to_string()).as_deref(), Some("a"));
        assert_eq!(store.get(&1).as_deref(), Some("b"));
        assert!(store.get(&2).is_none());
    }

    #[test]
    fn test_clones_share_data() {
        let a: Store<u32, u32> = Store::new();
        let b = a.clone();
        a.insert(7, 70);
        assert_eq!(b.get(&7), Some(70));
    }

    #[test]
    fn test_try_update_ok_and_err() {
        let store: Store<u32, u32> = Store::new();
        store.insert(1, 10);

        let ok: Option<Result<u32, &str>> = store.try_update(&1, |v| {
            *v += 1;
            Ok(*v)
        });
        assert_eq!(ok, Some(Ok(11)));

        let err: Option<Result<(), &str>> = store.try_update(&1, |v| {
            if *v > 5 {
                return Err("too big");
            }
            *v = 0;
            Ok(())
        });
        assert_eq!(err, Some(Err("too big")));
        assert_eq!(store.get(&1), Some(11));

        let missing: Option<Result<(), ()>> = store.try_update(&9, |_| Ok(()));
        assert!(missing.is_none());
    }

    #[test]
    fn test_find_keys() {
        let store: Store<u32, u32> = Store::new();
        for i in 0..6 {
            store.insert(i, i * 10);
        }
        let mut keys = store.find_keys(|v| *v >= 30);
        keys.sort_unstable();
        assert_eq!(keys, vec![3, 4, 5]);
    }

    #[test]
    fn test_concurrent_check_then_set_admits_one_winner() {
        let store: Store<u32, bool> = Store::new();
        store.insert(1, false);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || {
                    store
                        .try_update(&1, |claimed| {
                            if *claimed {
                                return Err(());
                            }
                            *claimed = true;
                            Ok(())
                        })
                        .map(|r| r.is_ok())
                        .unwrap_or(false)
                })
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
    }
}
