use ndarray::Array2;

use crate::*;
pub use random::*;

mod random;

/// Strategy for placing hazards on a fresh board.
///
/// The round engine never reaches for ambient randomness; it asks this seam,
/// so tests and replays can supply deterministic placements.
pub trait HazardLayoutGenerator {
    fn generate(&mut self, config: BoardConfig) -> HazardLayout;
}

/// Deals boards with a fixed hazard placement, for tests and replays.
#[derive(Clone, Debug, PartialEq)]
pub struct FixedHazardGenerator {
    hazard_indices: Vec<CellIndex>,
}

impl FixedHazardGenerator {
    pub fn new(hazard_indices: Vec<CellIndex>) -> Self {
        Self { hazard_indices }
    }
}

impl HazardLayoutGenerator for FixedHazardGenerator {
    fn generate(&mut self, config: BoardConfig) -> HazardLayout {
        let total = config.total_cells();
        let in_range: Vec<CellIndex> = self
            .hazard_indices
            .iter()
            .copied()
            .filter(|&index| index < total)
            .collect();
        if in_range.len() != self.hazard_indices.len() {
            log::warn!(
                "fixed hazard placement has indices outside a {} cell board, skipped",
                total
            );
        }
        HazardLayout::from_hazard_indices(config.size, &in_range)
            .unwrap_or_else(|_| HazardLayout::from_hazard_mask(Array2::default(config.size.to_nd_index())))
    }
}
