//! Allocate/free churn against a `SlotFinder`, the access pattern of per-frame resource slots.

use std::time::Instant;

use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::{debug, info, warn};

use samples_common::SlotFinder;

use crate::cli::SlotArgs;

#[derive(Debug, Default)]
struct ChurnStats {
    allocations: u32,
    frees: u32,
    failed_allocations: u32,
    peak_used: u32,
}

fn churn(
    slots: &mut SlotFinder,
    rng: &mut StdRng,
    iterations: u32,
    alloc_probability: f64,
) -> ChurnStats {
    let mut stats = ChurnStats::default();
    for _ in 0..iterations {
        if rng.random_bool(alloc_probability) {
            let slot = slots.get_first_available_slot();
            if slot == SlotFinder::INVALID_SLOT_INDEX {
                stats.failed_allocations += 1;
                continue;
            }
            slots.set_in_use(slot);
            stats.allocations += 1;
            stats.peak_used = stats.peak_used.max(slots.get_num_used());
        } else {
            let num_used = slots.get_num_used();
            if num_used == 0 {
                continue;
            }
            let slot = slots.find_nth_used_slot(rng.random_range(0..num_used));
            slots.set_not_in_use(slot);
            stats.frees += 1;
        }
    }
    stats
}

pub(crate) fn run(args: &SlotArgs) -> anyhow::Result<()> {
    anyhow::ensure!(
        (0.0..=1.0).contains(&args.alloc_probability),
        "allocation probability must lie in [0, 1], got {}",
        args.alloc_probability
    );

    let mut slots = SlotFinder::new(args.num_slots);
    let mut rng = StdRng::seed_from_u64(args.seed);
    info!(num_slots = args.num_slots, num_layers = slots.get_num_layers(), "slot finder ready");

    let t = Instant::now();
    let stats = churn(&mut slots, &mut rng, args.iterations, args.alloc_probability);
    info!("{} iterations: {:.2}s", args.iterations, t.elapsed().as_secs_f64());
    info!(?stats, num_used = slots.get_num_used(), "workload finished");
    if stats.failed_allocations > 0 {
        warn!("{} allocations found no free slot", stats.failed_allocations);
    }

    let first_free = slots.get_first_available_slot();
    if first_free == SlotFinder::INVALID_SLOT_INDEX {
        info!("allocator is full");
    } else {
        info!(first_free, first_used = slots.get_first_used_slot(), "occupancy");
    }

    if let Some(num_slots) = args.resize_to {
        slots.resize(num_slots);
        info!(num_slots, num_used = slots.get_num_used(), "resized");
    }

    if args.dump {
        debug!("dumping bitmap pyramid");
        slots.debug_print();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn churn_keeps_counts_consistent() {
        let mut slots = SlotFinder::new(300);
        let mut rng = StdRng::seed_from_u64(5);
        let stats = churn(&mut slots, &mut rng, 5000, 0.7);

        assert_eq!(stats.allocations - stats.frees, slots.get_num_used());
        assert!(stats.peak_used <= 300);
        // with a 70% allocation rate a 300 slot pool saturates
        assert!(stats.failed_allocations > 0);
    }

    #[test]
    fn churn_never_allocates_from_empty_pool() {
        let mut slots = SlotFinder::new(0);
        let mut rng = StdRng::seed_from_u64(1);
        let stats = churn(&mut slots, &mut rng, 100, 1.0);
        assert_eq!(stats.allocations, 0);
        assert_eq!(stats.failed_allocations, 100);
    }
}
