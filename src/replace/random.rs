use crate::{cache::Block, config::Policy};

use super::Replace;

/// Evicts a uniformly chosen way.
pub struct Random {
    rng: fastrand::Rng,
}

impl Random {
    pub fn new(rng: fastrand::Rng) -> Self {
        Random { rng }
    }
}

impl Replace for Random {
    fn policy(&self) -> Policy {
        Policy::Random
    }

    fn select_victim(&mut self, _set: usize, ways: &[Block]) -> usize {
        self.rng.usize(0..ways.len())
    }

    fn on_touch(&mut self, _set: usize, _way: usize, _block: &mut Block, _now: u64) {}
}
