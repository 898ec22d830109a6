pub mod fifo;
pub mod lru;
pub mod nmru;
pub mod random;

use crate::{cache::Block, config::Policy};

/// A replacement strategy, consulted by the cache on hits and on full-set misses.
///
/// Ways are identified by their index within the set. Timestamps are values
/// of the cache's access sequence counter.
pub trait Replace {
    fn policy(&self) -> Policy;

    /// Picks the way to evict from `ways`, all of which are valid.
    fn select_victim(&mut self, set: usize, ways: &[Block]) -> usize;

    /// Called when `block` (way `way` of `set`) is hit at time `now`.
    fn on_touch(&mut self, set: usize, way: usize, block: &mut Block, now: u64);

    /// Called after a miss fills `way` of `set`.
    fn on_fill(&mut self, _set: usize, _way: usize) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessResult {
    Hit,
    Miss,
}

/// Index of the first way with the smallest key.
pub(crate) fn min_way_by_key(ways: &[Block], key: impl Fn(&Block) -> u64) -> usize {
    ways.iter()
        .enumerate()
        .min_by_key(|(_way, b)| key(b))
        .map(|(way, _b)| way)
        .unwrap_or(0)
}
