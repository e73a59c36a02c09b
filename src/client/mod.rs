//! Client side of record editing: the optimistic store and the session that
//! drives an edit through it.

pub mod optimistic;
pub mod session;

pub use optimistic::{EditPhase, EditTicket, OptimisticStore, Reconciliation};
pub use session::EditSession;

use crate::core::validator::RecordEdit;
use crate::errors::AppResult;
use crate::models::record::AttendanceRecord;

/// Authoritative side of an edit. The database engine implements it; tests
/// and remote front-ends can plug in their own.
pub trait RecordEditor {
    fn fetch_record(&mut self, record_id: i64) -> AppResult<AttendanceRecord>;

    fn submit_edit(
        &mut self,
        record_id: i64,
        edit: &RecordEdit,
        actor: &str,
    ) -> AppResult<AttendanceRecord>;
}

impl<E: RecordEditor + ?Sized> RecordEditor for &mut E {
    fn fetch_record(&mut self, record_id: i64) -> AppResult<AttendanceRecord> {
        (**self).fetch_record(record_id)
    }

    fn submit_edit(
        &mut self,
        record_id: i64,
        edit: &RecordEdit,
        actor: &str,
    ) -> AppResult<AttendanceRecord> {
        (**self).submit_edit(record_id, edit, actor)
    }
}
