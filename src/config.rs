use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    addr::AddrLayout,
    cache::{Cache, CacheModel},
    error::{CacheError, ConfigViolation},
    replace::{fifo::Fifo, lru::Lru, nmru::Nmru, random::Random},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    Lru,
    Fifo,
    Random,
    Nmru,
}

impl Policy {
    pub fn name(self) -> &'static str {
        match self {
            Policy::Lru => "LRU",
            Policy::Fifo => "FIFO",
            Policy::Random => "RANDOM",
            Policy::Nmru => "NMRU",
        }
    }
}

impl FromStr for Policy {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lru" => Ok(Policy::Lru),
            "fifo" => Ok(Policy::Fifo),
            "random" => Ok(Policy::Random),
            "nmru" => Ok(Policy::Nmru),
            _ => Err(CacheError::UnsupportedPolicy(s.to_string())),
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Policy {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

fn default_name() -> String {
    "cache".to_string()
}

/// Unvalidated description of one cache.
///
/// `associativity == 0` requests a fully associative cache.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(alias = "cacheSize")]
    pub cache_size: u64,
    #[serde(alias = "blockSize")]
    pub block_size: u64,
    pub associativity: u64,
    #[serde(alias = "replacementPolicy")]
    pub policy: String,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl CacheConfig {
    pub fn new(cache_size: u64, block_size: u64, associativity: u64, policy: &str) -> Self {
        CacheConfig {
            name: default_name(),
            cache_size,
            block_size,
            associativity,
            policy: policy.to_string(),
            seed: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration and builds an empty cache.
    ///
    /// Geometry is checked before the policy name.
    pub fn to_cache(&self) -> Result<Box<dyn CacheModel>, CacheError> {
        let geometry = Geometry::derive(self)?;
        let policy: Policy = self.policy.parse()?;
        let rng = || match self.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        let name = self.name.clone();
        let cache = match policy {
            Policy::Lru => Box::new(Cache::new(name, geometry, Lru::new())) as Box<dyn CacheModel>,
            Policy::Fifo => Box::new(Cache::new(name, geometry, Fifo::new())) as Box<dyn CacheModel>,
            Policy::Random => {
                Box::new(Cache::new(name, geometry, Random::new(rng()))) as Box<dyn CacheModel>
            }
            Policy::Nmru => Box::new(Cache::new(
                name,
                geometry,
                Nmru::new(geometry.n_sets, rng()),
            )) as Box<dyn CacheModel>,
        };
        Ok(cache)
    }
}

/// Validated shape of a cache.
///
/// Only [`Geometry::derive`] produces one, so every geometry in hand has a
/// power-of-two block size and set count.
///
/// ```compile_fail
/// let three_sets = cache_sim::Geometry {
///     block_size: 16,
///     n_blocks: 6,
///     n_sets: 3,
///     n_ways: 2,
///     offset_bits: 4,
///     index_bits: 2,
/// };
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Geometry {
    block_size: u64,
    n_blocks: usize,
    n_sets: usize,
    n_ways: usize,
    offset_bits: u32,
    index_bits: u32,
}

impl Geometry {
    pub fn derive(config: &CacheConfig) -> Result<Geometry, ConfigViolation> {
        let block_size = config.block_size;
        if !block_size.is_power_of_two() {
            return Err(ConfigViolation::BlockSize(block_size));
        }

        let cache_size = config.cache_size;
        if cache_size == 0 || cache_size % block_size != 0 {
            return Err(ConfigViolation::CacheSize {
                cache_size,
                block_size,
            });
        }
        let num_blocks = cache_size / block_size;

        let associativity = config.associativity;
        let (num_sets, ways) = if associativity == 0 {
            (1, num_blocks)
        } else if num_blocks % associativity == 0 {
            (num_blocks / associativity, associativity)
        } else {
            return Err(ConfigViolation::Associativity {
                num_blocks,
                associativity,
            });
        };

        if !num_sets.is_power_of_two() {
            return Err(ConfigViolation::SetCount(num_sets));
        }

        let layout = AddrLayout::new(block_size, num_sets);
        Ok(Geometry {
            block_size,
            n_blocks: num_blocks as usize,
            n_sets: num_sets as usize,
            n_ways: ways as usize,
            offset_bits: layout.offset_bits(),
            index_bits: layout.index_bits(),
        })
    }

    pub fn block_size(&self) -> u64 {
        self.block_size
    }

    pub fn n_blocks(&self) -> usize {
        self.n_blocks
    }

    pub fn n_sets(&self) -> usize {
        self.n_sets
    }

    pub fn n_ways(&self) -> usize {
        self.n_ways
    }

    pub fn offset_bits(&self) -> u32 {
        self.offset_bits
    }

    pub fn index_bits(&self) -> u32 {
        self.index_bits
    }

    pub fn layout(&self) -> AddrLayout {
        AddrLayout::new(self.block_size, self.n_sets as u64)
    }

    pub fn is_fully_associative(&self) -> bool {
        self.n_sets == 1
    }
}

/// Driver configuration: a list of caches simulated side by side.
#[derive(Debug, Deserialize)]
pub struct SimConfig {
    pub caches: Vec<CacheConfig>,
}

impl SimConfig {
    pub fn to_caches(&self) -> Result<Vec<Box<dyn CacheModel>>, CacheError> {
        self.caches.iter().map(CacheConfig::to_cache).collect()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn geometry(cache_size: u64, block_size: u64, assoc: u64) -> Result<Geometry, ConfigViolation> {
        Geometry::derive(&CacheConfig::new(cache_size, block_size, assoc, "LRU"))
    }

    #[test]
    fn derives_small_geometry() {
        let g = geometry(64, 16, 2).unwrap();
        assert_eq!(
            g,
            Geometry {
                block_size: 16,
                n_blocks: 4,
                n_sets: 2,
                n_ways: 2,
                offset_bits: 4,
                index_bits: 1,
            }
        );
    }

    #[rstest]
    #[case(32768, 64, 8)]
    #[case(32768, 64, 1)]
    #[case(32768, 64, 512)]
    #[case(1024, 4, 0)]
    #[case(16, 16, 1)]
    fn sets_times_ways_is_blocks(#[case] size: u64, #[case] bs: u64, #[case] assoc: u64) {
        let g = geometry(size, bs, assoc).unwrap();
        assert_eq!(g.n_sets * g.n_ways, g.n_blocks);
        if assoc == 0 {
            assert_eq!(g.n_sets, 1);
            assert_eq!(g.n_ways, g.n_blocks);
        }
    }

    #[test]
    fn zero_and_full_associativity_agree() {
        assert_eq!(geometry(256, 32, 0), geometry(256, 32, 8));
        assert!(geometry(256, 32, 0).unwrap().is_fully_associative());
    }

    #[rstest]
    #[case(64, 17, 2, ConfigViolation::BlockSize(17))]
    #[case(64, 0, 2, ConfigViolation::BlockSize(0))]
    #[case(0, 16, 1, ConfigViolation::CacheSize { cache_size: 0, block_size: 16 })]
    #[case(72, 16, 1, ConfigViolation::CacheSize { cache_size: 72, block_size: 16 })]
    #[case(64, 16, 3, ConfigViolation::Associativity { num_blocks: 4, associativity: 3 })]
    #[case(64, 16, 8, ConfigViolation::Associativity { num_blocks: 4, associativity: 8 })]
    #[case(48, 16, 1, ConfigViolation::SetCount(3))]
    fn rejects_bad_geometry(
        #[case] size: u64,
        #[case] bs: u64,
        #[case] assoc: u64,
        #[case] violation: ConfigViolation,
    ) {
        assert_eq!(geometry(size, bs, assoc), Err(violation));
    }

    #[rstest]
    #[case("LRU", Policy::Lru)]
    #[case("lru", Policy::Lru)]
    #[case("Fifo", Policy::Fifo)]
    #[case("RANDOM", Policy::Random)]
    #[case("nmru", Policy::Nmru)]
    fn parses_policies(#[case] name: &str, #[case] policy: Policy) {
        assert_eq!(name.parse::<Policy>(), Ok(policy));
    }

    #[test]
    fn unknown_policy_is_rejected() {
        let err = CacheConfig::new(64, 16, 2, "MRU").to_cache().err();
        assert_eq!(err, Some(CacheError::UnsupportedPolicy("MRU".to_string())));
    }

    #[test]
    fn geometry_is_checked_before_policy() {
        let err = CacheConfig::new(64, 17, 2, "MRU").to_cache().err();
        assert_eq!(
            err,
            Some(CacheError::InvalidConfiguration(ConfigViolation::BlockSize(17)))
        );
    }

    #[test]
    fn reads_json_with_either_key_style() {
        let json = r#"{
            "caches": [
                { "name": "l1d", "cache_size": 32768, "block_size": 64, "associativity": 8, "policy": "lru" },
                { "cacheSize": 64, "blockSize": 16, "associativity": 0, "replacementPolicy": "RANDOM", "seed": 7 }
            ]
        }"#;
        let config: SimConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.caches.len(), 2);
        assert_eq!(config.caches[0].name, "l1d");
        assert_eq!(config.caches[1].name, "cache");
        assert_eq!(config.caches[1].seed, Some(7));

        let caches = config.to_caches().unwrap();
        assert_eq!(caches[0].geometry().n_sets(), 64);
        assert_eq!(caches[1].policy(), Policy::Random);
        assert!(caches[1].geometry().is_fully_associative());
    }
}
