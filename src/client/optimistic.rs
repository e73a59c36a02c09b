//! Per-session store of server records with at most one optimistic
//! projection per record id.
//!
//! The store is owned by whoever owns the editing session and must be
//! `clear()`ed on logout or when the view holding it goes away. Results of
//! edits issued before a `clear()` are dropped.

use crate::errors::AppError;
use crate::models::record::AttendanceRecord;
use std::collections::HashMap;

/// Handle for one submitted edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EditTicket {
    record_id: i64,
    generation: u64,
}

impl EditTicket {
    pub fn record_id(&self) -> i64 {
        self.record_id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditPhase {
    #[default]
    Idle,
    OptimisticApplied,
    Confirmed,
    RolledBack,
}

#[derive(Debug, Clone)]
struct PendingEdit {
    generation: u64,
    projection: AttendanceRecord,
}

/// What `reconcile` did with a result.
#[derive(Debug)]
pub enum Reconciliation {
    /// The projection was replaced by the server record.
    Confirmed(AttendanceRecord),
    /// The projection was discarded; the error is for the operator.
    RolledBack(AppError),
    /// A newer edit replaced this one. A success still refreshed the server copy.
    Superseded,
    /// The edit had been cancelled. A success still refreshed the server copy.
    Detached,
    /// Issued before the last `clear()`; ignored.
    Discarded,
}

#[derive(Debug, Default)]
pub struct OptimisticStore {
    server: HashMap<i64, AttendanceRecord>,
    pending: HashMap<i64, PendingEdit>,
    phases: HashMap<i64, EditPhase>,
    /// Generation of the last cancelled edit per record. Older cancelled
    /// results reconcile as `Superseded`.
    cancelled: HashMap<i64, u64>,
    next_generation: u64,
    cleared_before: u64,
}

impl OptimisticStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember a record as the server returned it.
    pub fn load(&mut self, record: AttendanceRecord) {
        self.server.insert(record.id, record);
    }

    /// What the UI shows: the projection when one is in flight, otherwise
    /// the last server copy.
    pub fn get(&self, record_id: i64) -> Option<&AttendanceRecord> {
        self.pending
            .get(&record_id)
            .map(|p| &p.projection)
            .or_else(|| self.server.get(&record_id))
    }

    pub fn server_record(&self, record_id: i64) -> Option<&AttendanceRecord> {
        self.server.get(&record_id)
    }

    pub fn phase(&self, record_id: i64) -> EditPhase {
        self.phases.get(&record_id).copied().unwrap_or_default()
    }

    pub fn has_pending(&self, record_id: i64) -> bool {
        self.pending.contains_key(&record_id)
    }

    /// Show `projection` in place of the record. Any projection already in
    /// flight for the same id is replaced, not queued.
    pub fn begin(&mut self, projection: AttendanceRecord) -> EditTicket {
        self.next_generation += 1;
        let ticket = EditTicket {
            record_id: projection.id,
            generation: self.next_generation,
        };

        if let Some(prev) = self.pending.insert(
            ticket.record_id,
            PendingEdit {
                generation: ticket.generation,
                projection,
            },
        ) {
            tracing::debug!(
                record_id = ticket.record_id,
                replaced = prev.generation,
                "optimistic projection replaced"
            );
        }
        self.phases
            .insert(ticket.record_id, EditPhase::OptimisticApplied);
        ticket
    }

    /// Fold the authoritative outcome of `ticket` into the store.
    pub fn reconcile(
        &mut self,
        ticket: EditTicket,
        result: Result<AttendanceRecord, AppError>,
    ) -> Reconciliation {
        if ticket.generation <= self.cleared_before {
            return Reconciliation::Discarded;
        }

        let id = ticket.record_id;
        let current = self
            .pending
            .get(&id)
            .is_some_and(|p| p.generation == ticket.generation);

        if current {
            self.pending.remove(&id);
            return match result {
                Ok(rec) => {
                    self.server.insert(id, rec.clone());
                    self.phases.insert(id, EditPhase::Confirmed);
                    Reconciliation::Confirmed(rec)
                }
                Err(e) => {
                    self.phases.insert(id, EditPhase::RolledBack);
                    Reconciliation::RolledBack(e)
                }
            };
        }

        let was_cancelled = self.cancelled.get(&id) == Some(&ticket.generation);
        if was_cancelled {
            self.cancelled.remove(&id);
        }
        match result {
            Ok(rec) => {
                self.server.insert(id, rec);
            }
            Err(e) => {
                tracing::debug!(record_id = id, error = %e, "late edit failure ignored");
            }
        }

        if was_cancelled {
            Reconciliation::Detached
        } else {
            Reconciliation::Superseded
        }
    }

    /// Detach the UI from an in-flight edit. The projection goes away now;
    /// the eventual result is still folded in as server truth. Returns false
    /// when `ticket` no longer owns the projection.
    pub fn cancel(&mut self, ticket: EditTicket) -> bool {
        let owns = self
            .pending
            .get(&ticket.record_id)
            .is_some_and(|p| p.generation == ticket.generation);
        if !owns {
            return false;
        }

        self.pending.remove(&ticket.record_id);
        self.phases.remove(&ticket.record_id);
        self.cancelled.insert(ticket.record_id, ticket.generation);
        true
    }

    /// Forget everything (logout, view teardown).
    pub fn clear(&mut self) {
        self.server.clear();
        self.pending.clear();
        self.phases.clear();
        self.cancelled.clear();
        self.cleared_before = self.next_generation;
    }
}
