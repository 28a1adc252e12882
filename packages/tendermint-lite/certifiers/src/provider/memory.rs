//! In-memory seed store.

use std::collections::{btree_map, hash_map, BTreeMap, HashMap};

use parking_lot::RwLock;
use tendermint_lite_types::{Hash, Seed};
use tracing::debug;

use super::Provider;
use crate::error::ProviderError;

#[derive(Debug, Default)]
struct Index {
    by_height: BTreeMap<u64, Seed>,
    by_hash: HashMap<String, Seed>,
}

/// Keeps seeds in two maps, by height and by hex validators hash.
///
/// A height keeps the first seed stored for it. A validators hash points at the highest seed
/// seen for that set, so a set that returns after a rotation can be trusted again.
#[derive(Debug, Default)]
#[allow(clippy::module_name_repetitions)]
pub struct MemoryProvider {
    inner: RwLock<Index>,
}

impl MemoryProvider {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct heights stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().by_height.len()
    }

    /// Whether the store holds no seed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().by_height.is_empty()
    }
}

impl Provider for MemoryProvider {
    fn store_seed(&self, seed: &Seed) -> Result<(), ProviderError> {
        seed.validate()?;
        let mut index = self.inner.write();
        if let btree_map::Entry::Vacant(entry) = index.by_height.entry(seed.height()) {
            entry.insert(seed.clone());
        }
        match index.by_hash.entry(seed.validators_hash().to_hex()) {
            hash_map::Entry::Vacant(entry) => {
                entry.insert(seed.clone());
            }
            hash_map::Entry::Occupied(mut entry) if entry.get().height() < seed.height() => {
                entry.insert(seed.clone());
            }
            hash_map::Entry::Occupied(_) => {}
        }
        debug!(height = seed.height(), "stored seed in memory");
        Ok(())
    }

    fn get_by_height(&self, height: u64) -> Result<Seed, ProviderError> {
        self.inner
            .read()
            .by_height
            .range(..=height)
            .next_back()
            .map(|(_, seed)| seed.clone())
            .ok_or(ProviderError::HeightNotFound(height))
    }

    fn get_by_hash(&self, hash: &Hash) -> Result<Seed, ProviderError> {
        self.inner
            .read()
            .by_hash
            .get(&hash.to_hex())
            .cloned()
            .ok_or(ProviderError::HashNotFound(*hash))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use tendermint_lite_types::test_utils::TestValidators;

    use super::*;

    const CHAIN_ID: &str = "test-chain";

    fn store_at(heights: &[u64]) -> MemoryProvider {
        let vals = TestValidators::new(0, 3, 10);
        let store = MemoryProvider::new();
        for &height in heights {
            store.store_seed(&vals.seed(CHAIN_ID, height)).unwrap();
        }
        store
    }

    #[rstest]
    #[case(47, Some(40))]
    #[case(40, Some(40))]
    #[case(39, Some(30))]
    #[case(20, Some(20))]
    #[case(10, None)]
    #[case(5000, Some(40))]
    fn get_by_height_returns_the_predecessor(#[case] query: u64, #[case] expected: Option<u64>) {
        let store = store_at(&[20, 30, 40]);
        let found = store.get_by_height(query).ok().map(|seed| seed.height());
        assert_eq!(found, expected);
    }

    #[test]
    fn get_by_hash_returns_the_highest_seed_for_a_set() {
        let vals = TestValidators::new(0, 3, 10);
        let store = store_at(&[30, 20]);
        let seed = store.get_by_hash(&vals.validator_set().hash()).unwrap();
        assert_eq!(seed.height(), 30);

        let other = TestValidators::new(10, 3, 10).validator_set().hash();
        assert!(matches!(
            store.get_by_hash(&other),
            Err(ProviderError::HashNotFound(hash)) if hash == other
        ));
    }

    #[test]
    fn first_write_wins_for_a_height() {
        let first = TestValidators::new(0, 3, 10).seed(CHAIN_ID, 20);
        let second = TestValidators::new(10, 3, 10).seed(CHAIN_ID, 20);
        let store = MemoryProvider::new();
        store.store_seed(&first).unwrap();
        store.store_seed(&second).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get_by_height(20).unwrap(), first);
        // The second seed still registers its own validator set.
        assert_eq!(store.get_by_hash(&second.validators_hash()).unwrap(), second);
    }

    #[test]
    fn returning_set_points_at_its_latest_seed() {
        let a = TestValidators::new(0, 3, 10);
        let b = TestValidators::new(10, 3, 10);
        let store = MemoryProvider::new();
        for seed in [a.seed(CHAIN_ID, 10), b.seed(CHAIN_ID, 20), a.seed(CHAIN_ID, 30)] {
            store.store_seed(&seed).unwrap();
        }
        assert_eq!(store.get_by_hash(&a.validator_set().hash()).unwrap().height(), 30);
        assert_eq!(store.get_by_hash(&b.validator_set().hash()).unwrap().height(), 20);
        assert_eq!(store.get_by_height(25).unwrap().height(), 20);
    }

    #[test]
    fn inconsistent_seed_is_refused() {
        let mut seed = TestValidators::new(0, 3, 10).seed(CHAIN_ID, 20);
        seed.validators = TestValidators::new(10, 3, 10).validator_set();
        let store = MemoryProvider::new();
        assert!(matches!(
            store.store_seed(&seed),
            Err(ProviderError::InvalidSeed(_))
        ));
        assert!(store.is_empty());
    }
}
