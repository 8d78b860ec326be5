use ndarray::Array2;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

/// Valid transitions:
/// - Active -> Lost
/// - Active -> Won
/// - Active -> CashedOut
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum RoundState {
    /// Round accepted, reveals in play.
    Active,
    /// A hazard was revealed, stake lost.
    Lost,
    /// Every safe cell was revealed.
    Won,
    /// The player banked the current payout.
    CashedOut,
}

impl RoundState {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Lost | Self::Won | Self::CashedOut)
    }
}

/// Player-visible state of a single cell.
///
/// `Hazard` is only ever reported for a revealed hazard, or for any hazard
/// once the round is finished; mid-round a hidden hazard is indistinguishable
/// from a hidden safe cell.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CellView {
    Hidden,
    Safe,
    Hazard,
}

/// Outcome of revealing a cell.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RevealOutcome {
    /// Safe cell, round stays active with a grown payout.
    Continue,
    /// Hazard cell, round lost.
    HazardHit,
    /// Last safe cell, board cleared.
    Cleared,
}

impl RevealOutcome {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::HazardHit | Self::Cleared)
    }
}

/// One wagered round from start to settlement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Round {
    hazard_layout: HazardLayout,
    revealed: Array2<bool>,
    revealed_safe_count: CellCount,
    stake: f64,
    potential_payout: f64,
    state: RoundState,
    triggered_hazard: Option<CellIndex>,
}

impl Round {
    /// Starts a round against a generated board, with the stake validated
    /// against the caller's bankroll. The stake debit itself is the ledger's
    /// move, performed by the session when the round is accepted.
    pub fn start(
        config: BoardConfig,
        stake: f64,
        bankroll: f64,
        generator: &mut dyn HazardLayoutGenerator,
    ) -> Result<Self> {
        config.validate()?;
        Self::from_layout(generator.generate(config), stake, bankroll)
    }

    /// Starts a round on an explicit hazard placement. Test and replay entry
    /// point; [`Round::start`] funnels through here.
    pub fn from_layout(hazard_layout: HazardLayout, stake: f64, bankroll: f64) -> Result<Self> {
        hazard_layout.board_config().validate()?;

        let stake = round_to_cents(stake);
        if stake <= 0.0 || stake > round_to_cents(bankroll) {
            return Err(GameError::InvalidStake);
        }

        let size = hazard_layout.size();
        log::debug!(
            "round started, stake {:.2}, {} hazards on {} cells",
            stake,
            hazard_layout.hazard_count(),
            hazard_layout.total_cells()
        );

        Ok(Self {
            hazard_layout,
            revealed: Array2::default(size.to_nd_index()),
            revealed_safe_count: 0,
            stake,
            // multiplier(0) is 1x, nothing extra is banked before a reveal
            potential_payout: stake,
            state: RoundState::Active,
            triggered_hazard: None,
        })
    }

    pub fn state(&self) -> RoundState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    pub fn size(&self) -> Coord2 {
        self.hazard_layout.size()
    }

    pub fn total_cells(&self) -> CellCount {
        self.hazard_layout.total_cells()
    }

    pub fn hazard_count(&self) -> CellCount {
        self.hazard_layout.hazard_count()
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.hazard_layout.safe_cell_count()
    }

    pub fn stake(&self) -> f64 {
        self.stake
    }

    pub fn revealed_safe_count(&self) -> CellCount {
        self.revealed_safe_count
    }

    pub fn potential_payout(&self) -> f64 {
        self.potential_payout
    }

    /// The hazard that ended the round, if it ended in a loss.
    pub fn triggered_hazard(&self) -> Option<CellIndex> {
        self.triggered_hazard
    }

    /// Player view of one cell.
    ///
    /// Panics if `index` is out of range; use [`HazardLayout::validate_index`]
    /// via [`Round::reveal`] for untrusted input.
    pub fn cell_at(&self, index: CellIndex) -> CellView {
        let revealed = self.revealed[index_to_nd(index, self.size())];
        let hazard = self.hazard_layout.contains_hazard(index);
        match (revealed, hazard) {
            (true, true) => CellView::Hazard,
            (true, false) => CellView::Safe,
            (false, true) if self.state.is_finished() => CellView::Hazard,
            (false, _) => CellView::Hidden,
        }
    }

    /// All hazard positions, disclosed only once the round is finished.
    pub fn hazard_indices(&self) -> Result<SmallVec<[CellIndex; 8]>> {
        if self.state.is_finished() {
            Ok(self.hazard_layout.hazard_indices())
        } else {
            Err(GameError::InvalidState)
        }
    }

    /// Reveals one cell. Rejections leave the round untouched.
    pub fn reveal(&mut self, index: CellIndex) -> Result<RevealOutcome> {
        self.check_active()?;
        let index = self.hazard_layout.validate_index(index)?;

        let nd_index = index_to_nd(index, self.size());
        if self.revealed[nd_index] {
            return Err(GameError::InvalidCell);
        }
        self.revealed[nd_index] = true;

        if self.hazard_layout.contains_hazard(index) {
            self.triggered_hazard = Some(index);
            self.potential_payout = 0.0;
            self.state = RoundState::Lost;
            log::debug!("hazard hit at cell {}, stake {:.2} lost", index, self.stake);
            return Ok(RevealOutcome::HazardHit);
        }

        self.revealed_safe_count += 1;
        self.potential_payout = payout(
            self.stake,
            self.total_cells(),
            self.hazard_count(),
            self.revealed_safe_count,
        );

        if self.revealed_safe_count == self.safe_cell_count() {
            self.state = RoundState::Won;
            log::debug!("board cleared, payout {:.2}", self.potential_payout);
            Ok(RevealOutcome::Cleared)
        } else {
            Ok(RevealOutcome::Continue)
        }
    }

    /// Ends the round voluntarily, banking the current payout. Requires at
    /// least one safe reveal; before that there is nothing to bank.
    pub fn cash_out(&mut self) -> Result<f64> {
        self.check_active()?;
        if self.revealed_safe_count == 0 {
            return Err(GameError::InvalidState);
        }

        self.state = RoundState::CashedOut;
        log::debug!("cashed out {:.2}", self.potential_payout);
        Ok(self.potential_payout)
    }

    fn check_active(&self) -> Result<()> {
        if matches!(self.state, RoundState::Active) {
            Ok(())
        } else {
            Err(GameError::InvalidState)
        }
    }
}
