use tokio::sync::RwLock;

use crate::location::types::Coordinate;

/// Single-slot register holding the most recently reported coordinate.
///
/// The slot starts out holding the configured default, so readers always get
/// a well-formed coordinate. Each write replaces the whole value under the
/// write lock; a reader never sees half of an update.
#[derive(Debug)]
pub struct LocationStore {
    slot: RwLock<Coordinate>,
}

impl LocationStore {
    pub fn new(default: Coordinate) -> Self {
        Self {
            slot: RwLock::new(default),
        }
    }

    pub async fn read(&self) -> Coordinate {
        *self.slot.read().await
    }

    pub async fn write(&self, coordinate: Coordinate) -> Coordinate {
        let mut slot = self.slot.write().await;
        *slot = coordinate;
        coordinate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn returns_default_before_any_write() {
        let store = LocationStore::new(Coordinate::now(14.5995, 120.9842));
        let c = store.read().await;
        assert_eq!((c.latitude, c.longitude), (14.5995, 120.9842));
    }

    #[tokio::test]
    async fn write_replaces_the_slot() {
        let store = LocationStore::new(Coordinate::now(14.5995, 120.9842));
        let written = store.write(Coordinate::now(14.65, 121.08)).await;

        assert_eq!(store.read().await, written);
    }

    #[tokio::test]
    async fn concurrent_writers_never_mix_fields() {
        let store = Arc::new(LocationStore::new(Coordinate::now(1.0, 1.0)));

        let mut handles = Vec::new();
        for i in 1..=32 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let v = i as f64;
                store.write(Coordinate::now(v, v)).await;
                let seen = store.read().await;
                assert_eq!(seen.latitude, seen.longitude);
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        let last = store.read().await;
        assert_eq!(last.latitude, last.longitude);
    }
}
