use std::ops::Range;

use crate::{
    addr::{self, Addr, AddrLayout},
    config::{Geometry, Policy},
    error::CacheError,
    replace::{AccessResult, Replace},
    stats::{CacheReport, Stats},
};

/// A set-associative cache driven by replacement strategy `R`.
///
/// Blocks live in one flat table; way `w` of set `s` is `blocks[s * n_ways + w]`.
#[derive(Debug)]
pub struct Cache<R: Replace> {
    name: String,
    geometry: Geometry,
    layout: AddrLayout,
    blocks: Vec<Block>,
    repl: R,
    now: u64,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl<R: Replace> Cache<R> {
    pub(crate) fn new(name: String, geometry: Geometry, repl: R) -> Self {
        Cache {
            name,
            geometry,
            layout: geometry.layout(),
            blocks: vec![Block::default(); geometry.n_blocks()],
            repl,
            now: 0,
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }

    fn set_range(&self, set: usize) -> Range<usize> {
        let n_ways = self.geometry.n_ways();
        set * n_ways..(set + 1) * n_ways
    }
}

/// Object-safe view of a cache, whatever its replacement policy.
pub trait CacheModel {
    fn name(&self) -> &str;
    fn geometry(&self) -> &Geometry;
    fn policy(&self) -> Policy;
    fn split_addr(&self, addr: u64) -> Addr;

    /// Classifies one access and updates residency and statistics.
    fn access(&mut self, addr: u64) -> AccessResult;

    /// Probes for residency without counting an access.
    fn contains(&self, addr: u64) -> bool;

    /// Tags resident in `set`, ordered by way. Empty if `set` is out of range.
    fn resident_tags(&self, set: usize) -> Vec<u64>;

    fn stats(&self) -> Stats;

    /// Zeroes counters and per-block statistics. Residency is kept, and
    /// resident blocks start a fresh lifetime at the current access.
    fn clear_stats(&mut self);

    /// Empties every set. Counters are kept.
    ///
    /// Dropped blocks are not evicted: their residency up to this point is
    /// not added to the lifetime statistics.
    fn invalidate(&mut self);

    fn make_report(&self) -> CacheReport;

    /// Validates an address literal, then accesses it.
    ///
    /// A rejected literal leaves the cache untouched.
    fn access_raw(&mut self, raw: &str) -> Result<AccessResult, CacheError> {
        let addr = addr::parse_address(raw)?;
        Ok(self.access(addr))
    }
}

impl<R: Replace> CacheModel for Cache<R> {
    fn name(&self) -> &str {
        &self.name
    }

    fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    fn policy(&self) -> Policy {
        self.repl.policy()
    }

    fn split_addr(&self, addr: u64) -> Addr {
        self.layout.split(addr)
    }

    fn access(&mut self, addr: u64) -> AccessResult {
        self.now += 1;
        let now = self.now;
        let addr = self.layout.split(addr);
        let set_range = self.set_range(addr.set);
        let set_slice = &mut self.blocks[set_range];

        // First, look for a hit
        let hit = set_slice
            .iter_mut()
            .enumerate()
            .find(|(_way, b)| b.valid && b.tag == addr.tag);

        if let Some((way, block)) = hit {
            block.read(now);
            self.repl.on_touch(addr.set, way, block, now);
            self.hits += 1;
            return AccessResult::Hit;
        }

        self.misses += 1;
        let way = match set_slice.iter().position(|b| !b.valid) {
            Some(vacant_way) => vacant_way,
            None => {
                let victim_way = self.repl.select_victim(addr.set, set_slice);
                set_slice[victim_way].evict(now);
                self.evictions += 1;
                victim_way
            }
        };
        set_slice[way].fill(addr.tag, now);
        self.repl.on_fill(addr.set, way);

        AccessResult::Miss
    }

    fn contains(&self, addr: u64) -> bool {
        let addr = self.layout.split(addr);
        self.blocks[self.set_range(addr.set)]
            .iter()
            .any(|b| b.valid && b.tag == addr.tag)
    }

    fn resident_tags(&self, set: usize) -> Vec<u64> {
        if set >= self.geometry.n_sets() {
            return Vec::new();
        }
        self.blocks[self.set_range(set)]
            .iter()
            .filter(|b| b.valid)
            .map(|b| b.tag)
            .collect()
    }

    fn stats(&self) -> Stats {
        Stats::new(self.hits, self.misses)
    }

    fn clear_stats(&mut self) {
        self.misses = 0;
        self.hits = 0;
        self.evictions = 0;
        let now = self.now;
        for block in &mut self.blocks {
            block.live_dur = 0;
            block.dead_dur = 0;
            block.alloc_count = if block.valid { 1 } else { 0 };
            block.alloc_time = now;
            block.access_time = now;
        }
    }

    fn invalidate(&mut self) {
        for block in &mut self.blocks {
            block.valid = false;
        }
    }

    fn make_report(&self) -> CacheReport {
        let total_alloc: f64 = self.blocks.iter().map(|b| b.alloc_count as f64).sum();
        let total_dead: f64 = self.blocks.iter().map(|b| b.dead_dur as f64).sum();
        let total_live: f64 = self.blocks.iter().map(|b| b.live_dur as f64).sum();

        CacheReport::new(
            self.name.clone(),
            self.policy(),
            self.geometry,
            self.stats(),
            self.evictions,
            total_alloc,
            total_live,
            total_dead,
        )
    }
}

/// One way of a set.
#[derive(Debug, Clone, Default)]
pub struct Block {
    pub valid: bool,
    pub tag: u64,

    // Replace Data
    pub last_used: u64,
    pub inserted_at: u64,

    // Stats
    live_dur: u64,
    dead_dur: u64,
    alloc_count: u64,

    // In Flight Stats
    alloc_time: u64,
    access_time: u64,
}

impl Block {
    pub fn fill(&mut self, tag: u64, now: u64) {
        self.valid = true;
        self.tag = tag;
        self.last_used = now;
        self.inserted_at = now;

        self.alloc_time = now;
        self.access_time = now;
        self.alloc_count += 1;
    }

    pub fn read(&mut self, now: u64) {
        self.access_time = now;
    }

    pub fn evict(&mut self, now: u64) {
        self.live_dur += self.access_time - self.alloc_time;
        self.dead_dur += now - self.access_time;
    }
}
