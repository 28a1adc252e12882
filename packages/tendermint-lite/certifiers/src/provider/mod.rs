//! Trust stores that hand out seeds by height or by validator set hash.

use std::sync::Arc;

use tendermint_lite_types::{Hash, Seed};

use crate::error::ProviderError;

pub mod cache;
pub mod files;
pub mod memory;
pub mod node;

pub use cache::CacheProvider;
pub use files::{FileProvider, SeedEncoding};
pub use memory::MemoryProvider;
pub use node::{NodeProvider, Source};

/// A store of seeds.
///
/// Implementations must tolerate concurrent readers. A store may hold seeds for heights it was
/// never asked about, and lookups by height return the closest seed at or below the request.
pub trait Provider: Send + Sync {
    /// Saves a seed. Storing a seed for a key that is already present leaves the first one.
    ///
    /// # Errors
    /// Returns an error if the seed is invalid or the backing store fails.
    fn store_seed(&self, seed: &Seed) -> Result<(), ProviderError>;

    /// The seed with the greatest height `<= height`.
    ///
    /// # Errors
    /// Returns [`ProviderError::HeightNotFound`] if the store has nothing at or below `height`.
    fn get_by_height(&self, height: u64) -> Result<Seed, ProviderError>;

    /// A seed whose validator set hashes to `hash`.
    ///
    /// # Errors
    /// Returns [`ProviderError::HashNotFound`] if no stored seed carries that set.
    fn get_by_hash(&self, hash: &Hash) -> Result<Seed, ProviderError>;

    /// The highest seed in the store.
    ///
    /// # Errors
    /// Same as [`Provider::get_by_height`].
    fn latest_seed(&self) -> Result<Seed, ProviderError> {
        self.get_by_height(u64::MAX)
    }
}

impl<P: Provider + ?Sized> Provider for &P {
    fn store_seed(&self, seed: &Seed) -> Result<(), ProviderError> {
        (**self).store_seed(seed)
    }

    fn get_by_height(&self, height: u64) -> Result<Seed, ProviderError> {
        (**self).get_by_height(height)
    }

    fn get_by_hash(&self, hash: &Hash) -> Result<Seed, ProviderError> {
        (**self).get_by_hash(hash)
    }

    fn latest_seed(&self) -> Result<Seed, ProviderError> {
        (**self).latest_seed()
    }
}

impl<P: Provider + ?Sized> Provider for Arc<P> {
    fn store_seed(&self, seed: &Seed) -> Result<(), ProviderError> {
        (**self).store_seed(seed)
    }

    fn get_by_height(&self, height: u64) -> Result<Seed, ProviderError> {
        (**self).get_by_height(height)
    }

    fn get_by_hash(&self, hash: &Hash) -> Result<Seed, ProviderError> {
        (**self).get_by_hash(hash)
    }

    fn latest_seed(&self) -> Result<Seed, ProviderError> {
        (**self).latest_seed()
    }
}

impl<P: Provider + ?Sized> Provider for Box<P> {
    fn store_seed(&self, seed: &Seed) -> Result<(), ProviderError> {
        (**self).store_seed(seed)
    }

    fn get_by_height(&self, height: u64) -> Result<Seed, ProviderError> {
        (**self).get_by_height(height)
    }

    fn get_by_hash(&self, hash: &Hash) -> Result<Seed, ProviderError> {
        (**self).get_by_hash(hash)
    }

    fn latest_seed(&self) -> Result<Seed, ProviderError> {
        (**self).latest_seed()
    }
}

/// The highest seed known to any of `providers`.
///
/// Providers that fail are skipped.
///
/// # Errors
/// Returns the last provider's error if none of them has a seed, or
/// [`ProviderError::HeightNotFound`] if `providers` is empty.
pub fn latest_seed(providers: &[&dyn Provider]) -> Result<Seed, ProviderError> {
    let mut best: Option<Seed> = None;
    let mut last_err = ProviderError::HeightNotFound(u64::MAX);
    for provider in providers {
        match provider.latest_seed() {
            Ok(seed) => {
                if !matches!(&best, Some(current) if current.height() >= seed.height()) {
                    best = Some(seed);
                }
            }
            Err(err) => last_err = err,
        }
    }
    best.ok_or(last_err)
}

#[cfg(test)]
mod tests {
    use tendermint_lite_types::test_utils::TestValidators;

    use super::*;

    const CHAIN_ID: &str = "test-chain";

    #[test]
    fn latest_seed_picks_the_highest_provider() {
        let vals = TestValidators::new(0, 3, 10);
        let low = MemoryProvider::new();
        let high = MemoryProvider::new();
        let empty = MemoryProvider::new();
        low.store_seed(&vals.seed(CHAIN_ID, 10)).unwrap();
        high.store_seed(&vals.seed(CHAIN_ID, 30)).unwrap();

        let seed = latest_seed(&[&low, &empty, &high]).unwrap();
        assert_eq!(seed.height(), 30);
        let seed = latest_seed(&[&high, &low]).unwrap();
        assert_eq!(seed.height(), 30);
    }

    #[test]
    fn latest_seed_of_nothing_is_not_found() {
        assert!(latest_seed(&[]).unwrap_err().is_not_found());
        let empty = MemoryProvider::new();
        assert!(latest_seed(&[&empty]).unwrap_err().is_not_found());
    }

    #[test]
    fn providers_work_behind_pointers() {
        let vals = TestValidators::new(0, 3, 10);
        let shared = Arc::new(MemoryProvider::new());
        let boxed: Box<dyn Provider> = Box::new(Arc::clone(&shared));
        boxed.store_seed(&vals.seed(CHAIN_ID, 4)).unwrap();
        assert_eq!(shared.latest_seed().unwrap().height(), 4);
    }
}
