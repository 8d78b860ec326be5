//! Fixed two-decimal currency arithmetic and the fair-odds payout curve.
//!
//! All currency values flow through [`round_to_cents`] at every arithmetic
//! boundary so repeated settlements never accumulate drift.

use crate::types::CellCount;

/// Rounds a currency amount to two decimal places, half away from zero.
pub fn round_to_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Payout ratio after `revealed_safe` successful reveals.
///
/// Each safe reveal multiplies the payout by the inverse survival probability
/// of that draw, `total / safe`, so `multiplier(.., 0)` is `1.0` and the
/// ratio grows strictly with every reveal. The caller guarantees
/// `hazard_count < total_cells`.
pub fn multiplier(total_cells: CellCount, hazard_count: CellCount, revealed_safe: CellCount) -> f64 {
    let safe_cells = total_cells - hazard_count;
    let per_reveal = f64::from(total_cells) / f64::from(safe_cells);
    per_reveal.powi(i32::from(revealed_safe))
}

/// Potential payout for a stake at the given reveal depth, in cents precision.
pub fn payout(
    stake: f64,
    total_cells: CellCount,
    hazard_count: CellCount,
    revealed_safe: CellCount,
) -> f64 {
    round_to_cents(stake * multiplier(total_cells, hazard_count, revealed_safe))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiplier_starts_at_one() {
        assert_eq!(multiplier(25, 5, 0), 1.0);
        assert_eq!(multiplier(25, 24, 0), 1.0);
    }

    #[test]
    fn multiplier_is_strictly_increasing() {
        let mut previous = multiplier(25, 5, 0);
        for revealed in 1..=20 {
            let current = multiplier(25, 5, revealed);
            assert!(current > previous, "not increasing at reveal {revealed}");
            previous = current;
        }
    }

    #[test]
    fn five_hazard_board_matches_fixtures() {
        assert_eq!(multiplier(25, 5, 1), 1.25);
        assert!((multiplier(25, 5, 5) - 3.0517578125).abs() < 1e-12);
        assert_eq!(payout(10.0, 25, 5, 1), 12.5);
        assert_eq!(payout(10.0, 25, 5, 5), 30.52);
    }

    #[test]
    fn single_safe_cell_pays_full_odds() {
        assert_eq!(multiplier(25, 24, 1), 25.0);
        assert_eq!(payout(1.0, 25, 24, 1), 25.0);
    }

    #[test]
    fn rounding_is_stable_at_cents() {
        assert_eq!(round_to_cents(10.0 / 3.0), 3.33);
        assert_eq!(round_to_cents(2.6666666), 2.67);
        assert_eq!(round_to_cents(-1.2349), -1.23);
        assert_eq!(round_to_cents(round_to_cents(3.14159)), 3.14);
    }
}
