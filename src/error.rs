use std::fmt;

/// The geometry invariant a rejected configuration broke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigViolation {
    /// Block size is zero or not a power of two.
    BlockSize(u64),
    /// Cache size is zero or not a multiple of the block size.
    CacheSize { cache_size: u64, block_size: u64 },
    /// Block count does not divide evenly into sets of the requested ways.
    Associativity { num_blocks: u64, associativity: u64 },
    /// The derived set count cannot be addressed by an index bit field.
    SetCount(u64),
}

impl fmt::Display for ConfigViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigViolation::BlockSize(bs) => {
                write!(f, "block size {} is not a positive power of two", bs)
            }
            ConfigViolation::CacheSize {
                cache_size,
                block_size,
            } => write!(
                f,
                "cache size {} is not a positive multiple of block size {}",
                cache_size, block_size
            ),
            ConfigViolation::Associativity {
                num_blocks,
                associativity,
            } => write!(
                f,
                "{} blocks cannot be split into sets of {} ways",
                num_blocks, associativity
            ),
            ConfigViolation::SetCount(sets) => {
                write!(f, "set count {} is not a power of two", sets)
            }
        }
    }
}

/// Failure to build a cache or to accept an address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    InvalidConfiguration(ConfigViolation),
    UnsupportedPolicy(String),
    InvalidAddress(String),
}

impl From<ConfigViolation> for CacheError {
    fn from(v: ConfigViolation) -> Self {
        CacheError::InvalidConfiguration(v)
    }
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::InvalidConfiguration(v) => write!(f, "Invalid configuration: {}", v),
            CacheError::UnsupportedPolicy(name) => {
                write!(f, "Unrecognized replacement policy: {}", name)
            }
            CacheError::InvalidAddress(raw) => write!(f, "Invalid address: {:?}", raw),
        }
    }
}

impl std::error::Error for CacheError {}
