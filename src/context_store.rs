//! Holder of the most recently trained context. Reads are lock-free.

use arc_swap::ArcSwapOption;
use std::sync::{Arc, Mutex};

use crate::feature_context::FeatureContext;

/// A context together with the version it was published under.
#[derive(Debug)]
pub struct PublishedContext {
    pub version: u64,
    pub context: FeatureContext,
}

/// Current context, replaced wholesale by a single atomic swap
#[derive(Default)]
pub struct ContextStore {
    current: ArcSwapOption<PublishedContext>,
    /// Last issued version. Held across the swap so publishers store in version order.
    publish_lock: Mutex<u64>,
}

impl ContextStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Readers holding the previous snapshot keep it alive until they drop it.
    pub fn publish(&self, context: FeatureContext) -> u64 {
        let mut last = self.publish_lock.lock().unwrap_or_else(|e| e.into_inner());
        *last += 1;
        let version = *last;
        self.current
            .store(Some(Arc::new(PublishedContext { version, context })));
        version
    }

    pub fn current(&self) -> Option<Arc<PublishedContext>> {
        self.current.load_full()
    }

    /// 0 until the first publication
    pub fn version(&self) -> u64 {
        self.current.load_full().map_or(0, |c| c.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Product, User};

    fn context(price: f32) -> FeatureContext {
        FeatureContext::build(
            &[Product::new("A", price, "shoes", "red")],
            &[User::new(30.0, &[])],
        )
        .unwrap()
    }

    #[test]
    fn test_publish_replaces_snapshot() {
        let store = ContextStore::new();
        assert!(store.current().is_none());
        assert_eq!(store.version(), 0);

        assert_eq!(store.publish(context(10.0)), 1);
        let first = store.current().unwrap();

        assert_eq!(store.publish(context(20.0)), 2);
        let second = store.current().unwrap();

        // Old readers keep their snapshot
        assert_eq!(first.version, 1);
        assert_eq!(first.context.min_price(), 10.0);
        assert_eq!(second.version, 2);
        assert_eq!(second.context.min_price(), 20.0);
        assert_eq!(store.version(), 2);
    }

    #[test]
    fn test_concurrent_publishers_end_on_latest_version() {
        let store = Arc::new(ContextStore::new());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for j in 0..25 {
                        store.publish(context((i * 25 + j) as f32));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.version(), 100);
        assert_eq!(store.current().unwrap().version, 100);
    }
}
