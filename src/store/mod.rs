//! In-memory aggregate state: live signals, journal ledger and owner set.
//!
//! The whole aggregate is owned by the runtime and passed into handlers by
//! reference; there is no ambient/static store. Its serialized form is the
//! single persisted JSON document (see `crate::db`).

use crate::models::journal::{JournalRecord, JournalSummary};
use crate::models::signal::Signal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Live signals keyed by id, insertion order preserved
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignalStore {
    signals: Vec<Signal>,
}

impl SignalStore {
    pub fn insert(&mut self, signal: Signal) {
        self.signals.push(signal);
    }

    pub fn get(&self, id: &str) -> Option<&Signal> {
        self.signals.iter().find(|s| s.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Signal> {
        self.signals.iter_mut().find(|s| s.id == id)
    }

    pub fn remove(&mut self, id: &str) -> Option<Signal> {
        let position = self.signals.iter().position(|s| s.id == id)?;
        Some(self.signals.remove(position))
    }

    pub fn list(&self) -> &[Signal] {
        &self.signals
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }
}

/// Append-only journal, grouped by calendar date string (`YYYY-MM-DD`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JournalLedger {
    days: BTreeMap<String, Vec<JournalRecord>>,
}

impl JournalLedger {
    pub fn append(&mut self, date: &str, record: JournalRecord) {
        self.days.entry(date.to_string()).or_default().push(record);
    }

    /// Records for one day in append order; empty for unknown dates
    pub fn for_date(&self, date: &str) -> &[JournalRecord] {
        self.days.get(date).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Daily aggregates; an unknown date yields the zero summary.
    ///
    /// A record is a win iff its risk multiple is strictly positive; zero
    /// counts as a loss.
    pub fn summarize(&self, date: &str) -> JournalSummary {
        let records = self.for_date(date);
        let wins = records.iter().filter(|r| r.risk_multiple > 0.0).count();
        JournalSummary {
            count: records.len(),
            wins,
            losses: records.len() - wins,
            total_r: records.iter().map(|r| r.risk_multiple).sum(),
            total_price_delta: records.iter().map(|r| r.profit_price_units).sum(),
        }
    }
}

/// Owner allow-list and notification fan-out list, insertion order preserved
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerSet {
    owners: Vec<i64>,
}

impl OwnerSet {
    pub fn contains(&self, id: i64) -> bool {
        self.owners.contains(&id)
    }

    /// Returns false without duplicating when the id is already present
    pub fn add(&mut self, id: i64) -> bool {
        if self.owners.contains(&id) {
            return false;
        }
        self.owners.push(id);
        true
    }

    /// Returns false when the id was not present
    pub fn remove(&mut self, id: i64) -> bool {
        let before = self.owners.len();
        self.owners.retain(|o| *o != id);
        self.owners.len() != before
    }

    pub fn list(&self) -> &[i64] {
        &self.owners
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    /// Seed from the configured initial list when empty (backward-compatible
    /// load of documents predating owner management). Returns whether the set
    /// changed.
    pub fn seed_if_empty(&mut self, initial: &[i64]) -> bool {
        if !self.owners.is_empty() || initial.is_empty() {
            return false;
        }
        for id in initial {
            self.add(*id);
        }
        true
    }
}

/// The persisted aggregate: signals, journal and owners as one document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BotState {
    #[serde(default)]
    pub signals: SignalStore,
    #[serde(default)]
    pub journal: JournalLedger,
    #[serde(default)]
    pub owners: OwnerSet,
}
