use std::{error::Error, fs, path::PathBuf, process};

use cache_sim::{trace::Trace, CacheConfig, CacheModel, CacheReport, SimConfig};
use log::{error, info, warn};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(err) = run() {
        error!("{}", err);
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let mut args = pico_args::Arguments::from_env();
    let n_warm: u64 = args.opt_value_from_str("-w")?.unwrap_or(0);
    let n_access: u64 = args.opt_value_from_str("-n")?.unwrap_or(0);
    let heartbeat_int: u64 = args.opt_value_from_str("-h")?.unwrap_or(0);

    let config = read_config(&mut args)?;
    let mut caches = config.to_caches()?;
    if caches.is_empty() {
        return Err("Configuration lists no caches".into());
    }

    let stats_path: Option<PathBuf> = args.opt_value_from_str("--json")?;
    let trace_path: PathBuf = args.value_from_str("-t")?;
    let addrs_per_chunk: usize = args
        .opt_value_from_str("--buffer-size")?
        .unwrap_or(1024 * 16);
    let chunks_per_queue: usize = args.opt_value_from_str("--queue-size")?.unwrap_or(32);

    let leftover = args.finish();
    if !leftover.is_empty() {
        warn!("Ignoring unused arguments: {:?}", leftover);
    }

    for cache in &caches {
        let g = cache.geometry();
        info!(
            "{}: {} sets x {} ways, {}-byte blocks, {}",
            cache.name(),
            g.n_sets(),
            g.n_ways(),
            g.block_size(),
            cache.policy()
        );
    }

    let trace = Trace::read(trace_path, addrs_per_chunk, chunks_per_queue)?;
    let n_seen = simulate(&trace, &mut caches, n_warm, n_access, heartbeat_int)?;
    info!("Ran {} accesses", n_seen);

    for cache in &caches {
        info!("{}: {}", cache.name(), cache.stats());
    }

    let reports = caches
        .iter()
        .map(|c| c.make_report())
        .collect::<Vec<CacheReport>>();
    match stats_path {
        Some(path) => {
            let stats_file = fs::File::create(&path)?;
            serde_json::to_writer_pretty(stats_file, &reports)?;
            info!("Wrote report to {}", path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&reports)?),
    }
    Ok(())
}

fn read_config(args: &mut pico_args::Arguments) -> Result<SimConfig, Box<dyn Error>> {
    let seed: Option<u64> = args.opt_value_from_str("--seed")?;

    let mut config = if let Some(config_str) = args.opt_value_from_str::<_, String>("--config")? {
        serde_json::from_str(&config_str)?
    } else if let Some(config_path) = args.opt_value_from_str::<_, PathBuf>("-p")? {
        let config_str = fs::read_to_string(&config_path)
            .map_err(|e| format!("Could not read config {}: {}", config_path.display(), e))?;
        serde_json::from_str(&config_str)?
    } else {
        let cache_size: u64 = args.value_from_str("--cache-size").map_err(|_| {
            "Must provide a config with --config <json>, -p <path> or --cache-size/--block-size/--assoc/--policy"
        })?;
        let block_size: u64 = args.value_from_str("--block-size")?;
        let associativity: u64 = args.opt_value_from_str("--assoc")?.unwrap_or(0);
        let policy: String = args
            .opt_value_from_str("--policy")?
            .unwrap_or_else(|| "LRU".to_string());
        SimConfig {
            caches: vec![CacheConfig::new(cache_size, block_size, associativity, &policy)],
        }
    };

    if let Some(seed) = seed {
        for cache in &mut config.caches {
            cache.seed = Some(seed);
        }
    }
    Ok(config)
}

/// Feeds every address to every cache. Returns the number of addresses consumed.
fn simulate(
    trace: &Trace,
    caches: &mut [Box<dyn CacheModel>],
    n_warm: u64,
    n_access: u64,
    heartbeat_int: u64,
) -> Result<u64, Box<dyn Error>> {
    let mut n_seen: u64 = 0;
    let mut warmup = n_warm > 0;
    let mut goal = (!warmup && n_access > 0).then_some(n_access);
    let mut next_heartbeat = heartbeat_int;

    'trace: for chunk in trace.rec.iter() {
        for addr in chunk? {
            if goal == Some(n_seen) {
                break 'trace;
            }

            for cache in caches.iter_mut() {
                cache.access(addr);
            }
            n_seen += 1;

            if warmup && n_seen == n_warm {
                caches.iter_mut().for_each(|c| c.clear_stats());
                warmup = false;
                goal = (n_access > 0).then_some(n_seen + n_access);
                info!("Finished warmup after {} accesses", n_seen);
            }

            if heartbeat_int != 0 && n_seen >= next_heartbeat {
                info!("Accesses: {}", n_seen);
                next_heartbeat += heartbeat_int;
            }
        }
    }

    if warmup {
        warn!(
            "Trace ended after {} accesses, before the {}-access warmup finished",
            n_seen, n_warm
        );
    }
    Ok(n_seen)
}
