//! Round engine and session ledger for a mines-style wager simulator.
//!
//! A round stakes an amount from the session bankroll on a board seeded with
//! hidden hazards. Each safe reveal grows a payout multiplier; the player
//! either cashes out the multiplied stake or loses it to a hazard. The crate
//! owns the round state machine, the payout arithmetic, and the persistent
//! session statistics; rendering, audio playback, and the concrete storage
//! backend are external collaborators injected through the [`LedgerStore`],
//! [`HazardLayoutGenerator`], and [`CueSink`] seams.

use core::ops::Index;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

pub use engine::*;
pub use error::*;
pub use events::*;
pub use generator::*;
pub use ledger::*;
pub use money::*;
pub use session::*;
pub use store::*;
pub use types::*;

mod engine;
mod error;
mod events;
mod generator;
mod ledger;
mod money;
mod session;
mod store;
mod types;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    pub size: Coord2,
    pub hazards: CellCount,
}

impl BoardConfig {
    pub const fn new_unchecked(size: Coord2, hazards: CellCount) -> Self {
        Self { size, hazards }
    }

    pub fn new((rows, cols): Coord2, hazards: CellCount) -> Self {
        let rows = rows.max(1);
        let cols = cols.max(1);
        Self::new_unchecked((rows, cols), hazards)
    }

    /// A valid wager board keeps at least one safe cell and at least one
    /// hazard besides the minimum of two hazards.
    pub fn validate(&self) -> Result<()> {
        let total = self.total_cells();
        if self.hazards >= 2 && total >= 3 && self.hazards <= total - 1 {
            Ok(())
        } else {
            Err(GameError::InvalidHazardCount)
        }
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }

    pub const fn safe_cell_count(&self) -> CellCount {
        self.total_cells().saturating_sub(self.hazards)
    }
}

impl Default for BoardConfig {
    /// The classic 5x5 board with five hazards.
    fn default() -> Self {
        Self::new_unchecked((5, 5), 5)
    }
}

/// Hazard placement for one round. Fixed at creation, never mutated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HazardLayout {
    hazard_mask: Array2<bool>,
    hazard_count: CellCount,
}

impl HazardLayout {
    pub fn from_hazard_mask(hazard_mask: Array2<bool>) -> Self {
        let hazard_count = hazard_mask
            .iter()
            .filter(|&&is_hazard| is_hazard)
            .count()
            .try_into()
            .unwrap_or(CellCount::MAX);
        Self {
            hazard_mask,
            hazard_count,
        }
    }

    pub fn from_hazard_indices(size: Coord2, hazard_indices: &[CellIndex]) -> Result<Self> {
        let mut hazard_mask: Array2<bool> = Array2::default(size.to_nd_index());
        let total = mult(size.0, size.1);

        for &index in hazard_indices {
            if index >= total {
                return Err(GameError::InvalidCell);
            }
            hazard_mask[index_to_nd(index, size)] = true;
        }

        Ok(Self::from_hazard_mask(hazard_mask))
    }

    pub fn board_config(&self) -> BoardConfig {
        BoardConfig {
            size: self.size(),
            hazards: self.hazard_count,
        }
    }

    pub fn validate_index(&self, index: CellIndex) -> Result<CellIndex> {
        if index < self.total_cells() {
            Ok(index)
        } else {
            Err(GameError::InvalidCell)
        }
    }

    pub fn size(&self) -> Coord2 {
        let dim = self.hazard_mask.dim();
        (
            dim.0.try_into().unwrap_or(Coord::MAX),
            dim.1.try_into().unwrap_or(Coord::MAX),
        )
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.total_cells() - self.hazard_count
    }

    pub fn total_cells(&self) -> CellCount {
        self.hazard_mask.len().try_into().unwrap_or(CellCount::MAX)
    }

    pub fn hazard_count(&self) -> CellCount {
        self.hazard_count
    }

    pub fn contains_hazard(&self, index: CellIndex) -> bool {
        self[index]
    }

    /// Flat indices of every hazard, in board order.
    pub fn hazard_indices(&self) -> SmallVec<[CellIndex; 8]> {
        self.hazard_mask
            .iter()
            .enumerate()
            .filter(|&(_, &is_hazard)| is_hazard)
            .map(|(i, _)| i as CellIndex)
            .collect()
    }
}

impl Index<CellIndex> for HazardLayout {
    type Output = bool;

    fn index(&self, index: CellIndex) -> &Self::Output {
        &self.hazard_mask[index_to_nd(index, self.size())]
    }
}
