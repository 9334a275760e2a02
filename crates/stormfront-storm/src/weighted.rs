//! Cumulative-weight draws.

/// Index picked by a cumulative draw of `roll ∈ [0, 1)` scaled by the total
/// weight. Non-finite or negative weights count as zero.
///
/// Returns `None` when the total is not positive, or when the scaled roll
/// lands at or beyond the cumulative total (float slack at `roll ≈ 1`).
/// Callers decide the fallback.
pub fn weighted_index(weights: &[f64], roll: f64) -> Option<usize> {
    let clean = |w: f64| if w.is_finite() && w > 0.0 { w } else { 0.0 };
    let total: f64 = weights.iter().map(|&w| clean(w)).sum();
    if total <= 0.0 {
        return None;
    }
    let target = roll * total;
    let mut cumulative = 0.0;
    for (i, &w) in weights.iter().enumerate() {
        cumulative += clean(w);
        if target < cumulative {
            return Some(i);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_by_cumulative_boundary() {
        let w = [0.25, 0.60, 0.15];
        assert_eq!(weighted_index(&w, 0.0), Some(0));
        assert_eq!(weighted_index(&w, 0.2499), Some(0));
        assert_eq!(weighted_index(&w, 0.25), Some(1));
        assert_eq!(weighted_index(&w, 0.8499), Some(1));
        assert_eq!(weighted_index(&w, 0.86), Some(2));
    }

    #[test]
    fn roll_at_total_is_none() {
        assert_eq!(weighted_index(&[0.25, 0.60, 0.15], 1.0), None);
    }

    #[test]
    fn zero_and_invalid_weights_are_skipped() {
        assert_eq!(weighted_index(&[0.0, f64::NAN, 2.0], 0.0), Some(2));
        assert_eq!(weighted_index(&[0.0, -1.0], 0.5), None);
        assert_eq!(weighted_index(&[], 0.5), None);
    }
}
