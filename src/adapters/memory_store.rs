//! In-process trend state store.
//!
//! Backs `--dry-run` and the test suites. Counts every successful mutation
//! and can be told to fail reads or writes.

use crate::domain::error::TrendwatchError;
use crate::domain::trend::{TrendHistoryEvent, TrendState};
use crate::ports::store_port::TrendStateStore;
use chrono::NaiveDate;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};

#[derive(Default)]
pub struct MemoryStore {
    states: RefCell<HashMap<String, TrendState>>,
    history: RefCell<BTreeMap<(String, NaiveDate), TrendHistoryEvent>>,
    mutations: Cell<usize>,
    fail_reads: Cell<bool>,
    fail_writes: Cell<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Successful `put_state` plus `append_history` calls so far.
    pub fn mutation_count(&self) -> usize {
        self.mutations.get()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.set(fail);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    fn check_write(&self) -> Result<(), TrendwatchError> {
        if self.fail_writes.get() {
            return Err(TrendwatchError::store("memory store rejecting writes"));
        }
        Ok(())
    }
}

impl TrendStateStore for MemoryStore {
    fn get_state(&self, symbol: &str) -> Result<Option<TrendState>, TrendwatchError> {
        if self.fail_reads.get() {
            return Err(TrendwatchError::store("memory store rejecting reads"));
        }
        Ok(self.states.borrow().get(symbol).cloned())
    }

    fn put_state(&self, state: &TrendState) -> Result<(), TrendwatchError> {
        self.check_write()?;
        self.states
            .borrow_mut()
            .insert(state.symbol.clone(), state.clone());
        self.mutations.set(self.mutations.get() + 1);
        Ok(())
    }

    fn append_history(&self, event: &TrendHistoryEvent) -> Result<(), TrendwatchError> {
        self.check_write()?;
        self.history.borrow_mut().insert(
            (event.symbol.clone(), event.occurrence_date),
            event.clone(),
        );
        self.mutations.set(self.mutations.get() + 1);
        Ok(())
    }

    fn list_history(&self, symbol: &str) -> Result<Vec<TrendHistoryEvent>, TrendwatchError> {
        if self.fail_reads.get() {
            return Err(TrendwatchError::store("memory store rejecting reads"));
        }
        Ok(self
            .history
            .borrow()
            .values()
            .filter(|e| e.symbol == symbol)
            .cloned()
            .collect())
    }
}
