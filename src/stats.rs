use std::fmt;

use serde::Serialize;

use crate::config::{Geometry, Policy};

/// Hit/miss counters at one point in time.
///
/// `hit_rate` is 0.0 when no access has been made.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Stats {
    pub hits: u64,
    pub misses: u64,
    pub total_accesses: u64,
    pub hit_rate: f64,
}

impl Stats {
    pub fn new(hits: u64, misses: u64) -> Self {
        let total_accesses = hits + misses;
        Stats {
            hits,
            misses,
            total_accesses,
            hit_rate: ratio(hits as f64, total_accesses as f64),
        }
    }

    pub fn miss_rate(&self) -> f64 {
        ratio(self.misses as f64, self.total_accesses as f64)
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} accesses, {} hits, {} misses, hit rate {:.2}%",
            self.total_accesses,
            self.hits,
            self.misses,
            self.hit_rate * 100.0
        )
    }
}

fn ratio(num: f64, den: f64) -> f64 {
    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}

#[derive(Debug, Serialize)]
pub struct CacheReport {
    pub name: String,
    pub policy: Policy,
    pub geometry: Geometry,
    pub hits: u64,
    pub misses: u64,
    pub accesses: u64,
    pub hit_rate: f64,
    pub miss_rate: f64,
    pub evictions: u64,
    /// Accesses per allocation.
    pub reuse: f64,
    /// Mean residency per allocation, in accesses.
    pub lifetime: f64,
    /// Share of residency between fill and last touch.
    pub efficiency: f64,
}

impl CacheReport {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: String,
        policy: Policy,
        geometry: Geometry,
        stats: Stats,
        evictions: u64,
        total_alloc: f64,
        total_live: f64,
        total_dead: f64,
    ) -> Self {
        let total_both = total_live + total_dead;
        let total_access = stats.total_accesses as f64;

        CacheReport {
            name,
            policy,
            geometry,
            hits: stats.hits,
            misses: stats.misses,
            accesses: stats.total_accesses,
            hit_rate: stats.hit_rate,
            miss_rate: stats.miss_rate(),
            evictions,
            reuse: ratio(total_access, total_alloc),
            lifetime: ratio(total_both, total_alloc),
            efficiency: ratio(total_live, total_both),
        }
    }
}
