//! A fast local store in front of a slower one.

use tendermint_lite_types::{Hash, Seed};
use tracing::warn;

use super::Provider;
use crate::error::ProviderError;

/// Reads from `cache` first and falls back to `source`, copying what the source returns into
/// the cache.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct CacheProvider<C, S> {
    cache: C,
    source: S,
}

impl<C: Provider, S: Provider> CacheProvider<C, S> {
    /// Chains `cache` in front of `source`.
    #[must_use]
    pub const fn new(cache: C, source: S) -> Self {
        Self { cache, source }
    }

    /// The fast store.
    #[must_use]
    pub const fn cache(&self) -> &C {
        &self.cache
    }

    /// The slow store.
    #[must_use]
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Copies a seed fetched from the source into the cache. Failures are only logged.
    fn populate(&self, seed: &Seed) {
        if let Err(err) = self.cache.store_seed(seed) {
            warn!(height = seed.height(), %err, "failed to cache seed");
        }
    }
}

impl<C: Provider, S: Provider> Provider for CacheProvider<C, S> {
    fn store_seed(&self, seed: &Seed) -> Result<(), ProviderError> {
        self.source.store_seed(seed)?;
        self.cache.store_seed(seed)
    }

    fn get_by_height(&self, height: u64) -> Result<Seed, ProviderError> {
        let cached = match self.cache.get_by_height(height) {
            Ok(seed) if seed.height() == height => return Ok(seed),
            Ok(seed) => Some(seed),
            Err(err) if err.is_not_found() => None,
            Err(err) => {
                warn!(height, %err, "cache read failed, asking source");
                None
            }
        };

        match (self.source.get_by_height(height), cached) {
            (Ok(fetched), Some(cached)) if cached.height() >= fetched.height() => Ok(cached),
            (Ok(fetched), _) => {
                self.populate(&fetched);
                Ok(fetched)
            }
            (Err(err), Some(cached)) => {
                if !err.is_not_found() {
                    warn!(height, %err, "source unavailable, serving cached seed");
                }
                Ok(cached)
            }
            (Err(err), None) => Err(err),
        }
    }

    fn get_by_hash(&self, hash: &Hash) -> Result<Seed, ProviderError> {
        match self.cache.get_by_hash(hash) {
            Ok(seed) => Ok(seed),
            Err(err) => {
                if !err.is_not_found() {
                    warn!(%hash, %err, "cache read failed, asking source");
                }
                let seed = self.source.get_by_hash(hash)?;
                self.populate(&seed);
                Ok(seed)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tendermint_lite_types::test_utils::TestValidators;

    use super::*;
    use crate::provider::MemoryProvider;

    const CHAIN_ID: &str = "test-chain";

    #[derive(Default)]
    struct Counting {
        inner: MemoryProvider,
        reads: AtomicUsize,
    }

    impl Provider for Counting {
        fn store_seed(&self, seed: &Seed) -> Result<(), ProviderError> {
            self.inner.store_seed(seed)
        }

        fn get_by_height(&self, height: u64) -> Result<Seed, ProviderError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.get_by_height(height)
        }

        fn get_by_hash(&self, hash: &Hash) -> Result<Seed, ProviderError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.get_by_hash(hash)
        }
    }

    #[test]
    fn miss_is_served_by_source_then_cached() {
        let vals = TestValidators::new(0, 3, 10);
        let source = Counting::default();
        source.store_seed(&vals.seed(CHAIN_ID, 10)).unwrap();
        let chain = CacheProvider::new(MemoryProvider::new(), &source);

        assert_eq!(chain.get_by_height(10).unwrap().height(), 10);
        assert_eq!(source.reads.load(Ordering::SeqCst), 1);
        assert_eq!(chain.cache().len(), 1);

        assert_eq!(chain.get_by_height(10).unwrap().height(), 10);
        assert_eq!(source.reads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn higher_seed_wins_between_cache_and_source() {
        let vals = TestValidators::new(0, 3, 10);
        let cache = MemoryProvider::new();
        let source = MemoryProvider::new();
        cache.store_seed(&vals.seed(CHAIN_ID, 30)).unwrap();
        source.store_seed(&vals.seed(CHAIN_ID, 20)).unwrap();
        source.store_seed(&vals.seed(CHAIN_ID, 40)).unwrap();
        let chain = CacheProvider::new(cache, source);

        assert_eq!(chain.get_by_height(35).unwrap().height(), 30);
        assert_eq!(chain.get_by_height(45).unwrap().height(), 40);
        assert_eq!(chain.cache().get_by_height(45).unwrap().height(), 40);
    }

    #[test]
    fn cached_predecessor_survives_an_empty_source() {
        let vals = TestValidators::new(0, 3, 10);
        let cache = MemoryProvider::new();
        cache.store_seed(&vals.seed(CHAIN_ID, 30)).unwrap();
        let chain = CacheProvider::new(cache, MemoryProvider::new());
        assert_eq!(chain.get_by_height(35).unwrap().height(), 30);
        assert!(chain.get_by_height(5).unwrap_err().is_not_found());
    }

    #[test]
    fn get_by_hash_falls_back_and_caches() {
        let vals = TestValidators::new(0, 3, 10);
        let source = Counting::default();
        source.store_seed(&vals.seed(CHAIN_ID, 10)).unwrap();
        let chain = CacheProvider::new(MemoryProvider::new(), &source);
        let hash = vals.validator_set().hash();

        chain.get_by_hash(&hash).unwrap();
        chain.get_by_hash(&hash).unwrap();
        assert_eq!(source.reads.load(Ordering::SeqCst), 1);
    }

    /// A store whose every operation fails, like an unreachable node or a full disk.
    struct Broken;

    impl Provider for Broken {
        fn store_seed(&self, _seed: &Seed) -> Result<(), ProviderError> {
            Err(ProviderError::Source(anyhow::anyhow!("disk full")))
        }

        fn get_by_height(&self, _height: u64) -> Result<Seed, ProviderError> {
            Err(ProviderError::Source(anyhow::anyhow!("connection refused")))
        }

        fn get_by_hash(&self, _hash: &Hash) -> Result<Seed, ProviderError> {
            Err(ProviderError::Source(anyhow::anyhow!("connection refused")))
        }
    }

    #[test]
    fn cached_predecessor_survives_an_unreachable_source() {
        let vals = TestValidators::new(0, 3, 10);
        let cache = MemoryProvider::new();
        cache.store_seed(&vals.seed(CHAIN_ID, 30)).unwrap();
        let chain = CacheProvider::new(cache, Broken);

        assert_eq!(chain.get_by_height(35).unwrap().height(), 30);
        assert_eq!(chain.latest_seed().unwrap().height(), 30);
        assert_eq!(chain.get_by_hash(&vals.validator_set().hash()).unwrap().height(), 30);
        assert!(matches!(
            chain.get_by_height(5),
            Err(ProviderError::Source(_))
        ));
    }

    #[test]
    fn unreadable_cache_falls_through_to_source() {
        let vals = TestValidators::new(0, 3, 10);
        let source = MemoryProvider::new();
        source.store_seed(&vals.seed(CHAIN_ID, 10)).unwrap();
        let chain = CacheProvider::new(Broken, source);

        assert_eq!(chain.get_by_height(12).unwrap().height(), 10);
        assert_eq!(chain.get_by_hash(&vals.validator_set().hash()).unwrap().height(), 10);
    }

    #[test]
    fn failing_cache_writes_do_not_fail_reads() {
        let vals = TestValidators::new(0, 3, 10);
        let source = MemoryProvider::new();
        source.store_seed(&vals.seed(CHAIN_ID, 10)).unwrap();
        let chain = CacheProvider::new(Broken, &source);

        let by_height = chain.get_by_height(10).unwrap();
        let by_hash = chain.get_by_hash(&vals.validator_set().hash()).unwrap();
        assert_eq!(by_height, source.get_by_height(10).unwrap());
        assert_eq!(by_hash, by_height);
    }

    #[test]
    fn writes_reach_both_layers() {
        let vals = TestValidators::new(0, 3, 10);
        let chain = CacheProvider::new(MemoryProvider::new(), MemoryProvider::new());
        chain.store_seed(&vals.seed(CHAIN_ID, 10)).unwrap();
        assert_eq!(chain.cache().len(), 1);
        assert_eq!(chain.source().len(), 1);
    }
}
