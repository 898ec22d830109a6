use crate::{cache::Block, config::Policy};

use super::{min_way_by_key, Replace};

/// Evicts the way whose last use is oldest.
#[derive(Debug, Default)]
pub struct Lru {}

impl Lru {
    pub fn new() -> Self {
        Lru {}
    }
}

impl Replace for Lru {
    fn policy(&self) -> Policy {
        Policy::Lru
    }

    fn select_victim(&mut self, _set: usize, ways: &[Block]) -> usize {
        min_way_by_key(ways, |b| b.last_used)
    }

    fn on_touch(&mut self, _set: usize, _way: usize, block: &mut Block, now: u64) {
        block.last_used = now;
    }
}
