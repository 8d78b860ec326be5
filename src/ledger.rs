use serde::{Deserialize, Serialize};

use crate::*;

/// Unit of persistence: the full cross-round session state.
///
/// Every field defaults so partially written or legacy snapshots still load;
/// [`LedgerSnapshot::normalize`] backfills the initial bankroll from the
/// bankroll when a snapshot predates that field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerSnapshot {
    pub bankroll: f64,
    pub initial_bankroll: f64,
    pub wins: u32,
    pub losses: u32,
    pub best_payout: f64,
}

impl Default for LedgerSnapshot {
    fn default() -> Self {
        Self {
            bankroll: 0.0,
            initial_bankroll: 0.0,
            wins: 0,
            losses: 0,
            best_payout: 0.0,
        }
    }
}

impl LedgerSnapshot {
    fn normalize(mut self) -> Self {
        if self.initial_bankroll <= 0.0 {
            self.initial_bankroll = self.bankroll;
        }
        self.bankroll = round_to_cents(self.bankroll);
        self.initial_bankroll = round_to_cents(self.initial_bankroll);
        self.best_payout = round_to_cents(self.best_payout);
        self
    }
}

/// Persistent session accounting: bankroll, win/loss tallies, best payout.
///
/// Every mutation persists afterward, fire-and-forget: a failed save is
/// logged and queued for [`SessionLedger::take_persistence_failure`], never
/// propagated, and never rolls back in-memory state.
pub struct SessionLedger {
    snapshot: LedgerSnapshot,
    store: Box<dyn LedgerStore>,
    pending_failure: Option<StoreError>,
}

impl SessionLedger {
    /// Opens the ledger, loading any persisted snapshot. Missing or
    /// unreadable data degrades to defaults.
    pub fn open(store: Box<dyn LedgerStore>) -> Self {
        let mut ledger = Self {
            snapshot: LedgerSnapshot::default(),
            store,
            pending_failure: None,
        };
        ledger.reload();
        ledger
    }

    /// Re-reads the persisted snapshot, keeping current state when none is
    /// found or the store fails.
    pub fn reload(&mut self) {
        match self.store.load(LEDGER_KEY) {
            Ok(Some(json)) => match serde_json::from_str::<LedgerSnapshot>(&json) {
                Ok(snapshot) => {
                    self.snapshot = snapshot.normalize();
                    log::debug!("ledger loaded: {:?}", self.snapshot);
                }
                Err(err) => {
                    log::error!("discarding unreadable ledger snapshot: {err}");
                }
            },
            Ok(None) => log::debug!("no persisted ledger, starting fresh"),
            Err(err) => {
                log::error!("failed to load ledger: {err}");
                self.pending_failure = Some(err);
            }
        }
    }

    /// Starts a fresh session from the given bankroll. Does not merge with
    /// prior state.
    pub fn initialize_bankroll(&mut self, amount: f64) -> Result<()> {
        let amount = round_to_cents(amount);
        if amount <= 0.0 {
            return Err(GameError::InvalidStake);
        }

        self.snapshot.bankroll = amount;
        self.snapshot.initial_bankroll = amount;
        self.persist();
        Ok(())
    }

    /// Puts the stake at risk for the duration of a round.
    pub(crate) fn debit_stake(&mut self, stake: f64) -> Result<()> {
        let stake = round_to_cents(stake);
        if stake <= 0.0 || stake > self.snapshot.bankroll {
            return Err(GameError::InvalidStake);
        }

        self.snapshot.bankroll = round_to_cents(self.snapshot.bankroll - stake);
        self.persist();
        Ok(())
    }

    /// Applies a terminal round result: credits the payout on a winning
    /// settlement (the stake was already debited at round start, so a loss
    /// credits nothing), bumps the win/loss tally, and raises the best
    /// payout.
    pub fn settle(&mut self, state: RoundState, payout: f64) {
        let payout = round_to_cents(payout);
        match state {
            RoundState::Won | RoundState::CashedOut => {
                self.snapshot.bankroll = round_to_cents(self.snapshot.bankroll + payout);
                self.snapshot.wins += 1;
                if payout > self.snapshot.best_payout {
                    self.snapshot.best_payout = payout;
                }
            }
            RoundState::Lost => {
                self.snapshot.losses += 1;
            }
            RoundState::Active => {
                log::warn!("settle called on an active round, ignored");
                return;
            }
        }
        self.persist();
    }

    /// Restores the bankroll to the initial bankroll and zeroes the
    /// statistics. The initial bankroll itself is unchanged.
    pub fn reset(&mut self) {
        self.snapshot.bankroll = self.snapshot.initial_bankroll;
        self.snapshot.wins = 0;
        self.snapshot.losses = 0;
        self.snapshot.best_payout = 0.0;
        self.persist();
    }

    pub fn snapshot(&self) -> &LedgerSnapshot {
        &self.snapshot
    }

    pub fn bankroll(&self) -> f64 {
        self.snapshot.bankroll
    }

    pub fn initial_bankroll(&self) -> f64 {
        self.snapshot.initial_bankroll
    }

    pub fn wins(&self) -> u32 {
        self.snapshot.wins
    }

    pub fn losses(&self) -> u32 {
        self.snapshot.losses
    }

    pub fn best_payout(&self) -> f64 {
        self.snapshot.best_payout
    }

    /// Hands over the most recent persistence failure, if any, so the caller
    /// can surface it to a reporting collaborator.
    pub fn take_persistence_failure(&mut self) -> Option<StoreError> {
        self.pending_failure.take()
    }

    fn persist(&mut self) {
        let json = match serde_json::to_string(&self.snapshot) {
            Ok(json) => json,
            Err(err) => {
                log::error!("failed to encode ledger snapshot: {err}");
                self.pending_failure = Some(StoreError::Encode(err.to_string()));
                return;
            }
        };

        if let Err(err) = self.store.save(LEDGER_KEY, &json) {
            log::error!("failed to persist ledger: {err}");
            self.pending_failure = Some(err);
        }
    }
}

impl core::fmt::Debug for SessionLedger {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SessionLedger")
            .field("snapshot", &self.snapshot)
            .field("pending_failure", &self.pending_failure)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingStore;

    impl LedgerStore for FailingStore {
        fn load(&self, _key: &str) -> core::result::Result<Option<String>, StoreError> {
            Err(StoreError::Backend("disk on fire".to_owned()))
        }

        fn save(&self, _key: &str, _value: &str) -> core::result::Result<(), StoreError> {
            Err(StoreError::Backend("disk on fire".to_owned()))
        }
    }

    fn fresh_ledger(store: &MemoryStore) -> SessionLedger {
        let mut ledger = SessionLedger::open(Box::new(store.clone()));
        ledger.initialize_bankroll(100.0).unwrap();
        ledger
    }

    #[test]
    fn initialize_bankroll_rejects_non_positive_amounts() {
        let mut ledger = SessionLedger::open(Box::new(NullStore));
        assert_eq!(
            ledger.initialize_bankroll(0.0).unwrap_err(),
            GameError::InvalidStake
        );
        assert_eq!(
            ledger.initialize_bankroll(-10.0).unwrap_err(),
            GameError::InvalidStake
        );
        assert_eq!(ledger.bankroll(), 0.0);
    }

    #[test]
    fn winning_settlement_conserves_the_bankroll_equation() {
        let store = MemoryStore::new();
        let mut ledger = fresh_ledger(&store);

        ledger.debit_stake(10.0).unwrap();
        assert_eq!(ledger.bankroll(), 90.0);

        ledger.settle(RoundState::CashedOut, 12.5);
        // bankroll_after == bankroll_before - stake + payout
        assert_eq!(ledger.bankroll(), 102.5);
        assert_eq!(ledger.wins(), 1);
        assert_eq!(ledger.losses(), 0);
        assert_eq!(ledger.best_payout(), 12.5);
    }

    #[test]
    fn losing_settlement_only_counts_the_loss() {
        let store = MemoryStore::new();
        let mut ledger = fresh_ledger(&store);

        ledger.debit_stake(10.0).unwrap();
        ledger.settle(RoundState::Lost, 0.0);

        assert_eq!(ledger.bankroll(), 90.0);
        assert_eq!(ledger.losses(), 1);
        assert_eq!(ledger.wins(), 0);
        assert_eq!(ledger.best_payout(), 0.0);
    }

    #[test]
    fn best_payout_only_ever_rises() {
        let store = MemoryStore::new();
        let mut ledger = fresh_ledger(&store);

        ledger.settle(RoundState::Won, 30.52);
        ledger.settle(RoundState::Won, 12.5);
        assert_eq!(ledger.best_payout(), 30.52);
    }

    #[test]
    fn debit_rejects_more_than_the_bankroll() {
        let store = MemoryStore::new();
        let mut ledger = fresh_ledger(&store);

        assert_eq!(
            ledger.debit_stake(100.01).unwrap_err(),
            GameError::InvalidStake
        );
        assert_eq!(ledger.bankroll(), 100.0);
    }

    #[test]
    fn reset_restores_the_initial_bankroll_and_zeroes_stats() {
        let store = MemoryStore::new();
        let mut ledger = fresh_ledger(&store);

        ledger.debit_stake(40.0).unwrap();
        ledger.settle(RoundState::Won, 60.0);
        ledger.reset();

        assert_eq!(ledger.bankroll(), 100.0);
        assert_eq!(ledger.initial_bankroll(), 100.0);
        assert_eq!(ledger.wins(), 0);
        assert_eq!(ledger.losses(), 0);
        assert_eq!(ledger.best_payout(), 0.0);
    }

    #[test]
    fn snapshot_survives_a_reopen() {
        let store = MemoryStore::new();
        {
            let mut ledger = fresh_ledger(&store);
            ledger.debit_stake(10.0).unwrap();
            ledger.settle(RoundState::CashedOut, 12.5);
        }

        let reopened = SessionLedger::open(Box::new(store));
        assert_eq!(reopened.bankroll(), 102.5);
        assert_eq!(reopened.initial_bankroll(), 100.0);
        assert_eq!(reopened.wins(), 1);
        assert_eq!(reopened.best_payout(), 12.5);
    }

    #[test]
    fn partial_and_legacy_snapshots_load_with_defaults() {
        let store = MemoryStore::new();
        store.save(LEDGER_KEY, "{}").unwrap();
        let ledger = SessionLedger::open(Box::new(store.clone()));
        assert_eq!(ledger.snapshot(), &LedgerSnapshot::default());

        // legacy shape without initial_bankroll falls back to the bankroll
        store
            .save(LEDGER_KEY, r#"{"bankroll": 55.0, "wins": 3}"#)
            .unwrap();
        let ledger = SessionLedger::open(Box::new(store));
        assert_eq!(ledger.bankroll(), 55.0);
        assert_eq!(ledger.initial_bankroll(), 55.0);
        assert_eq!(ledger.wins(), 3);
        assert_eq!(ledger.losses(), 0);
    }

    #[test]
    fn garbage_snapshot_degrades_to_defaults() {
        let store = MemoryStore::new();
        store.save(LEDGER_KEY, "not json at all").unwrap();
        let ledger = SessionLedger::open(Box::new(store));
        assert_eq!(ledger.snapshot(), &LedgerSnapshot::default());
    }

    #[test]
    fn save_failures_never_touch_in_memory_state() {
        let mut ledger = SessionLedger::open(Box::new(FailingStore));
        assert!(ledger.take_persistence_failure().is_some());

        ledger.initialize_bankroll(50.0).unwrap();
        assert_eq!(ledger.bankroll(), 50.0);
        assert!(ledger.take_persistence_failure().is_some());
        assert!(ledger.take_persistence_failure().is_none());

        ledger.settle(RoundState::Won, 10.0);
        assert_eq!(ledger.bankroll(), 60.0);
        assert!(ledger.take_persistence_failure().is_some());
    }
}
