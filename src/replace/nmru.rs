use crate::{cache::Block, config::Policy};

use super::Replace;

/// Evicts a random way other than the set's most recently used one.
pub struct Nmru {
    rng: fastrand::Rng,
    mru_way: Vec<usize>,
}

impl Nmru {
    pub fn new(n_sets: usize, rng: fastrand::Rng) -> Self {
        Nmru {
            rng,
            mru_way: vec![0; n_sets],
        }
    }
}

impl Replace for Nmru {
    fn policy(&self) -> Policy {
        Policy::Nmru
    }

    fn select_victim(&mut self, set: usize, ways: &[Block]) -> usize {
        if ways.len() < 2 {
            return 0;
        }
        let mru_way = self.mru_way[set];
        let mut victim_way = self.rng.usize(0..(ways.len() - 1));
        if victim_way >= mru_way {
            victim_way += 1;
        }
        victim_way
    }

    fn on_touch(&mut self, set: usize, way: usize, _block: &mut Block, _now: u64) {
        self.mru_way[set] = way;
    }

    fn on_fill(&mut self, set: usize, way: usize) {
        self.mru_way[set] = way;
    }
}
