//! Transform contexts cached by block size.

use std::sync::Arc;

use log::{debug, trace};

use crate::core::fft::{Transform, TransformFactory};

/// Owns one transform context per block size the channel has used.
///
/// Entries are kept sorted by size and never evicted. The active context is
/// tracked by index, so there is no separate owner to keep in sync with the
/// map; the active entry can never be dropped while in use.
pub struct TransformCache {
    factory: Arc<dyn TransformFactory>,
    entries: Vec<(usize, Box<dyn Transform>)>,
    active: usize,
    created: usize,
}

impl TransformCache {
    /// Prepares a context for each of `sizes` plus `initial`, and activates
    /// `initial`.
    pub fn new<I>(factory: Arc<dyn TransformFactory>, sizes: I, initial: usize) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        let mut cache = Self {
            factory,
            entries: Vec::new(),
            active: 0,
            created: 0,
        };
        for size in sizes {
            cache.insert(size);
        }
        cache.activate(initial);
        cache
    }

    /// Makes `size` the active context, creating it on a miss.
    ///
    /// Returns `true` if a new context was allocated.
    pub fn activate(&mut self, size: usize) -> bool {
        match self.find(size) {
            Ok(idx) => {
                trace!("transform cache hit for block size {}", size);
                self.active = idx;
                false
            }
            Err(_) => {
                debug!("transform cache miss, creating context for block size {}", size);
                self.active = self.insert(size);
                true
            }
        }
    }

    fn find(&self, size: usize) -> Result<usize, usize> {
        self.entries.binary_search_by_key(&size, |(s, _)| *s)
    }

    /// Inserts a context for `size` if absent and returns its index.
    fn insert(&mut self, size: usize) -> usize {
        match self.find(size) {
            Ok(idx) => idx,
            Err(idx) => {
                let transform = self.factory.create(size);
                debug_assert_eq!(transform.size(), size);
                self.entries.insert(idx, (size, transform));
                self.created += 1;
                if idx <= self.active && self.entries.len() > 1 {
                    self.active += 1;
                }
                idx
            }
        }
    }

    /// Block size of the active context.
    #[inline]
    pub fn active_size(&self) -> usize {
        self.entries[self.active].0
    }

    pub fn active(&self) -> &dyn Transform {
        self.entries[self.active].1.as_ref()
    }

    pub fn active_mut(&mut self) -> &mut dyn Transform {
        self.entries[self.active].1.as_mut()
    }

    pub fn contains(&self, size: usize) -> bool {
        self.find(size).is_ok()
    }

    /// Cached sizes in ascending order.
    pub fn sizes(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries.iter().map(|(s, _)| *s)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false once constructed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of contexts this cache has asked its factory for.
    pub fn created(&self) -> usize {
        self.created
    }
}

impl std::fmt::Debug for TransformCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformCache")
            .field("sizes", &self.sizes().collect::<Vec<_>>())
            .field("active", &self.active_size())
            .field("created", &self.created)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct NullTransform(usize);

    impl Transform for NullTransform {
        fn size(&self) -> usize {
            self.0
        }
        fn forward_polar(&mut self, _: &[f64], _: &mut [f64], _: &mut [f64]) {}
        fn inverse_polar(&mut self, _: &[f64], _: &[f64], _: &mut [f64]) {}
    }

    #[derive(Default)]
    struct CountingFactory {
        calls: AtomicUsize,
    }

    impl TransformFactory for CountingFactory {
        fn create(&self, size: usize) -> Box<dyn Transform> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            Box::new(NullTransform(size))
        }
    }

    #[test]
    fn test_prepares_all_sizes_once() {
        let factory = Arc::new(CountingFactory::default());
        let cache = TransformCache::new(factory.clone(), [4096, 1024, 2048], 2048);
        assert_eq!(cache.sizes().collect::<Vec<_>>(), vec![1024, 2048, 4096]);
        assert_eq!(cache.active_size(), 2048);
        assert_eq!(cache.active().size(), 2048);
        assert_eq!(factory.calls.load(Ordering::Relaxed), 3);
        assert_eq!(cache.created(), 3);
    }

    #[test]
    fn test_initial_outside_set_is_added() {
        let factory = Arc::new(CountingFactory::default());
        let cache = TransformCache::new(factory, std::iter::empty(), 512);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.active_size(), 512);
    }

    #[test]
    fn test_hit_does_not_allocate() {
        let factory = Arc::new(CountingFactory::default());
        let mut cache = TransformCache::new(factory.clone(), [1024, 2048], 1024);
        for _ in 0..10 {
            assert!(!cache.activate(2048));
            assert!(!cache.activate(1024));
        }
        assert_eq!(factory.calls.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_miss_inserts_sorted_and_keeps_active_valid() {
        let factory = Arc::new(CountingFactory::default());
        let mut cache = TransformCache::new(factory.clone(), [1024, 4096], 4096);
        assert!(cache.activate(256));
        assert_eq!(cache.active_size(), 256);
        assert!(cache.activate(2048));
        assert_eq!(cache.active().size(), 2048);
        assert_eq!(cache.sizes().collect::<Vec<_>>(), vec![256, 1024, 2048, 4096]);
        assert!(!cache.activate(256));
        assert_eq!(factory.calls.load(Ordering::Relaxed), 4);
    }
}
