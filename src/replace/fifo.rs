use crate::{cache::Block, config::Policy};

use super::{min_way_by_key, Replace};

/// Evicts the way that was filled first. Hits do not reorder anything.
#[derive(Debug, Default)]
pub struct Fifo {}

impl Fifo {
    pub fn new() -> Self {
        Fifo {}
    }
}

impl Replace for Fifo {
    fn policy(&self) -> Policy {
        Policy::Fifo
    }

    fn select_victim(&mut self, _set: usize, ways: &[Block]) -> usize {
        min_way_by_key(ways, |b| b.inserted_at)
    }

    fn on_touch(&mut self, _set: usize, _way: usize, _block: &mut Block, _now: u64) {}
}
