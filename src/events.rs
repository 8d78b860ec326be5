use crate::store::StoreError;
use crate::types::{CellCount, CellIndex};

/// Pure notifications toward audio-cue and interstitial collaborators.
///
/// The engine is correct with no sink attached; every method defaults to a
/// no-op and none may influence game state.
pub trait CueSink {
    fn round_started(&mut self, _stake: f64, _hazards: CellCount) {}
    fn safe_reveal(&mut self, _index: CellIndex, _potential_payout: f64) {}
    fn hazard_hit(&mut self, _index: CellIndex) {}
    fn round_won(&mut self, _payout: f64) {}
    fn cashed_out(&mut self, _payout: f64) {}
    fn persistence_failed(&mut self, _error: &StoreError) {}
}

/// Sink used when no collaborator is attached.
#[derive(Copy, Clone, Debug, Default)]
pub struct NullCueSink;

impl CueSink for NullCueSink {}
