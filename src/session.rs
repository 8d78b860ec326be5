use serde::{Deserialize, Serialize};

use crate::*;

/// Session-level status as the UI sees it: `Idle` between rounds, otherwise
/// the state of the round in play.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SessionStatus {
    Idle,
    Active,
    Lost,
    Won,
    CashedOut,
}

/// Facade tying the round engine to the ledger, generator, and cue sink.
///
/// One session is one mutual-exclusion boundary: operations are sequential
/// and never overlap. Hosts with concurrent event handlers wrap the whole
/// session in a single `Mutex`; there is no interior locking because round
/// state is small and every operation is at worst O(board size).
pub struct GameSession {
    ledger: SessionLedger,
    round: Option<Round>,
    board_config: BoardConfig,
    generator: Box<dyn HazardLayoutGenerator>,
    cues: Box<dyn CueSink>,
}

impl GameSession {
    pub fn new(store: Box<dyn LedgerStore>, generator: Box<dyn HazardLayoutGenerator>) -> Self {
        Self::with_cues(store, generator, Box::new(NullCueSink))
    }

    pub fn with_cues(
        store: Box<dyn LedgerStore>,
        generator: Box<dyn HazardLayoutGenerator>,
        cues: Box<dyn CueSink>,
    ) -> Self {
        let mut session = Self {
            ledger: SessionLedger::open(store),
            round: None,
            board_config: BoardConfig::default(),
            generator,
            cues,
        };
        session.report_persistence_failure();
        session
    }

    pub fn status(&self) -> SessionStatus {
        match self.round.as_ref().map(Round::state) {
            None => SessionStatus::Idle,
            Some(RoundState::Active) => SessionStatus::Active,
            Some(RoundState::Lost) => SessionStatus::Lost,
            Some(RoundState::Won) => SessionStatus::Won,
            Some(RoundState::CashedOut) => SessionStatus::CashedOut,
        }
    }

    pub fn round(&self) -> Option<&Round> {
        self.round.as_ref()
    }

    pub fn board_config(&self) -> BoardConfig {
        self.board_config
    }

    /// Changes the board shape and hazard count for future rounds. Rejected
    /// mid-round.
    pub fn set_board_config(&mut self, config: BoardConfig) -> Result<()> {
        self.check_not_active()?;
        config.validate()?;
        self.board_config = config;
        Ok(())
    }

    pub fn ledger(&self) -> &LedgerSnapshot {
        self.ledger.snapshot()
    }

    pub fn bankroll(&self) -> f64 {
        self.ledger.bankroll()
    }

    pub fn initial_bankroll(&self) -> f64 {
        self.ledger.initial_bankroll()
    }

    pub fn wins(&self) -> u32 {
        self.ledger.wins()
    }

    pub fn losses(&self) -> u32 {
        self.ledger.losses()
    }

    pub fn best_payout(&self) -> f64 {
        self.ledger.best_payout()
    }

    /// Starts a fresh session bankroll. Rejected mid-round.
    pub fn initialize_bankroll(&mut self, amount: f64) -> Result<()> {
        self.check_not_active()?;
        self.ledger.initialize_bankroll(amount)?;
        self.report_persistence_failure();
        Ok(())
    }

    /// Starts a round: validates stake and hazard count against the current
    /// bankroll and board, debits the stake, and deals the board.
    pub fn start_round(&mut self, stake: f64, hazards: CellCount) -> Result<&Round> {
        self.check_not_active()?;

        let config = BoardConfig {
            size: self.board_config.size,
            hazards,
        };
        let round = Round::start(config, stake, self.ledger.bankroll(), self.generator.as_mut())?;

        // the stake is at risk for the whole round
        self.ledger.debit_stake(round.stake())?;
        self.board_config = config;
        self.cues.round_started(round.stake(), hazards);
        self.report_persistence_failure();
        Ok(self.round.insert(round))
    }

    /// Reveals one cell of the active round, settling with the ledger on a
    /// terminal outcome.
    pub fn reveal_cell(&mut self, index: CellIndex) -> Result<RevealOutcome> {
        let round = self.round.as_mut().ok_or(GameError::InvalidState)?;
        let outcome = round.reveal(index)?;
        let state = round.state();
        let payout = round.potential_payout();

        match outcome {
            RevealOutcome::Continue => self.cues.safe_reveal(index, payout),
            RevealOutcome::HazardHit => {
                self.cues.hazard_hit(index);
                self.ledger.settle(state, 0.0);
            }
            RevealOutcome::Cleared => {
                self.cues.round_won(payout);
                self.ledger.settle(state, payout);
            }
        }

        self.report_persistence_failure();
        Ok(outcome)
    }

    /// Banks the active round's payout.
    pub fn cash_out(&mut self) -> Result<f64> {
        let round = self.round.as_mut().ok_or(GameError::InvalidState)?;
        let payout = round.cash_out()?;

        self.ledger.settle(RoundState::CashedOut, payout);
        self.cues.cashed_out(payout);
        self.report_persistence_failure();
        Ok(payout)
    }

    /// Drops a finished round, returning the session to `Idle`. Rejected
    /// while a round is still active.
    pub fn clear_round(&mut self) -> Result<()> {
        self.check_not_active()?;
        self.round = None;
        Ok(())
    }

    /// Resets the statistics and restores the bankroll to its initial value.
    /// Rejected mid-round.
    pub fn reset_stats(&mut self) -> Result<()> {
        self.check_not_active()?;
        self.ledger.reset();
        self.report_persistence_failure();
        Ok(())
    }

    fn check_not_active(&self) -> Result<()> {
        if matches!(self.status(), SessionStatus::Active) {
            Err(GameError::InvalidState)
        } else {
            Ok(())
        }
    }

    fn report_persistence_failure(&mut self) {
        if let Some(err) = self.ledger.take_persistence_failure() {
            self.cues.persistence_failed(&err);
        }
    }
}

impl core::fmt::Debug for GameSession {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GameSession")
            .field("ledger", &self.ledger)
            .field("round", &self.round)
            .field("board_config", &self.board_config)
            .finish_non_exhaustive()
    }
}
