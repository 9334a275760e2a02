//! Burst sizing and cold-start population for multi-storm mode.

use rand::Rng;

use stormfront_core::config::BurstConfig;
use stormfront_core::constants::SEEDED_MIN_LIFE_FRACTION;
use stormfront_storm::weighted::weighted_index;

/// Draw a burst size from the size→weight table. Entries outside
/// `min_burst..=max_burst` are ignored; an empty table is uniform.
pub fn draw_size(config: &BurstConfig, rng: &mut impl Rng) -> u32 {
    let entries: Vec<(u32, f64)> = config
        .size_weights
        .iter()
        .filter(|(size, _)| (config.min_burst..=config.max_burst).contains(size))
        .map(|(&size, &weight)| (size, weight))
        .collect();
    if entries.is_empty() {
        return rng.gen_range(config.min_burst..=config.max_burst.max(config.min_burst));
    }
    let weights: Vec<f64> = entries.iter().map(|(_, w)| *w).collect();
    weighted_index(&weights, rng.gen::<f64>())
        .map(|i| entries[i].0)
        .unwrap_or(config.min_burst)
}

/// Limit `size` so `live + size` never exceeds `max_concurrent`.
pub fn clamp_to_capacity(size: u32, live: u32, max_concurrent: u32) -> u32 {
    size.min(max_concurrent.saturating_sub(live))
}

/// Storms seeded on a cold start.
pub fn initial_population(config: &BurstConfig) -> u32 {
    (config.max_concurrent as f64 * config.initial_fill_ratio).ceil() as u32
}

/// Remaining-life fraction for a seeded storm.
pub fn seeded_life_fraction(rng: &mut impl Rng) -> f64 {
    rng.gen_range(SEEDED_MIN_LIFE_FRACTION..=1.0)
}

/// Delay until the next burst (seconds).
pub fn next_delay(config: &BurstConfig, rng: &mut impl Rng) -> f64 {
    if config.max_interval_secs > config.min_interval_secs {
        rng.gen_range(config.min_interval_secs..=config.max_interval_secs)
    } else {
        config.min_interval_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn config() -> BurstConfig {
        BurstConfig {
            enabled: true,
            min_burst: 1,
            max_burst: 6,
            max_concurrent: 12,
            ..BurstConfig::default()
        }
    }

    #[test]
    fn eleven_live_allows_at_most_one() {
        let cfg = config();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        for _ in 0..1_000 {
            let size = clamp_to_capacity(draw_size(&cfg, &mut rng), 11, cfg.max_concurrent);
            assert!(size <= 1);
        }
        assert_eq!(clamp_to_capacity(6, 12, 12), 0);
        assert_eq!(clamp_to_capacity(6, 20, 12), 0);
    }

    #[test]
    fn uniform_sizes_stay_in_range() {
        let cfg = config();
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        for _ in 0..1_000 {
            let size = draw_size(&cfg, &mut rng);
            assert!((1..=6).contains(&size));
        }
    }

    #[test]
    fn weighted_sizes_follow_table() {
        let mut cfg = config();
        cfg.size_weights.insert(2, 1.0);
        cfg.size_weights.insert(9, 50.0);
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        for _ in 0..200 {
            assert_eq!(draw_size(&cfg, &mut rng), 2);
        }
    }

    #[test]
    fn cold_start_fill() {
        assert_eq!(initial_population(&config()), 9);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..500 {
            let f = seeded_life_fraction(&mut rng);
            assert!((SEEDED_MIN_LIFE_FRACTION..=1.0).contains(&f));
        }
    }
}
