use super::optimistic::{EditTicket, OptimisticStore, Reconciliation};
use super::RecordEditor;
use crate::core::guard::{Editability, can_edit};
use crate::core::validator::{EditValidator, RecordEdit, ValidatedEdit};
use crate::errors::{AppError, AppResult, FieldViolation};
use crate::models::conflict_state::ConflictState;
use crate::models::record::{AttendanceRecord, compute_total_hours};

/// Locally computed stand-in shown while the edit is in flight.
pub fn project(original: &AttendanceRecord, edit: &ValidatedEdit, actor: &str) -> AttendanceRecord {
    let mut p = original.clone();
    p.date = edit.date;
    p.clock_in = edit.clock_in;
    p.clock_out = edit.clock_out;
    p.total_hours = compute_total_hours(edit.clock_in, edit.clock_out);
    p.conflict = ConflictState::ConfirmedResolved;
    p.note = edit.reason.clone();
    p.resolved_by = Some(actor.to_string());
    p
}

/// One operator editing records against an authoritative `RecordEditor`.
pub struct EditSession<'s, E: RecordEditor> {
    editor: E,
    store: &'s mut OptimisticStore,
    validator: EditValidator,
    actor: String,
}

impl<'s, E: RecordEditor> EditSession<'s, E> {
    pub fn new(
        editor: E,
        store: &'s mut OptimisticStore,
        validator: EditValidator,
        actor: impl Into<String>,
    ) -> Self {
        Self {
            editor,
            store,
            validator,
            actor: actor.into(),
        }
    }

    /// Fetch a record from the server and make it the store's base copy.
    pub fn open(&mut self, record_id: i64) -> AppResult<AttendanceRecord> {
        let rec = self.editor.fetch_record(record_id)?;
        self.store.load(rec.clone());
        Ok(rec)
    }

    fn base(&mut self, record_id: i64) -> AppResult<AttendanceRecord> {
        match self.store.server_record(record_id) {
            Some(r) => Ok(r.clone()),
            None => self.open(record_id),
        }
    }

    /// Client-side answer for enabling the form. The server checks again.
    pub fn editability(&mut self, record_id: i64) -> AppResult<Editability> {
        let rec = self.base(record_id)?;
        Ok(can_edit(&rec, None))
    }

    /// Live feedback; no request is made.
    pub fn validate(&mut self, record_id: i64, edit: &RecordEdit) -> AppResult<Vec<FieldViolation>> {
        let rec = self.base(record_id)?;
        Ok(self.validator.validate(edit, &rec))
    }

    /// Guard, validate and apply the projection. Nothing is shown when any
    /// check fails.
    pub fn begin(&mut self, record_id: i64, edit: &RecordEdit) -> AppResult<EditTicket> {
        let original = self.base(record_id)?;
        can_edit(&original, None).ensure()?;
        let valid = self.validator.check(edit, &original)?;
        Ok(self.store.begin(project(&original, &valid, &self.actor)))
    }

    /// Fold the server's answer for `ticket` into the store.
    pub fn finish(
        &mut self,
        ticket: EditTicket,
        result: AppResult<AttendanceRecord>,
    ) -> AppResult<Option<AttendanceRecord>> {
        match self.store.reconcile(ticket, result) {
            Reconciliation::Confirmed(rec) => Ok(Some(rec)),
            Reconciliation::RolledBack(e) => Err(e),
            Reconciliation::Superseded | Reconciliation::Detached | Reconciliation::Discarded => {
                Ok(None)
            }
        }
    }

    /// The whole round trip: project, submit, reconcile or roll back.
    pub fn submit(&mut self, record_id: i64, edit: &RecordEdit) -> AppResult<AttendanceRecord> {
        let ticket = self.begin(record_id, edit)?;
        let result = self.editor.submit_edit(record_id, edit, &self.actor);
        self.finish(ticket, result)?
            .ok_or_else(|| AppError::Other(format!("edit of record #{} was superseded", record_id)))
    }

    pub fn cancel(&mut self, ticket: EditTicket) -> bool {
        self.store.cancel(ticket)
    }

    pub fn store(&self) -> &OptimisticStore {
        &*self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::optimistic::EditPhase;
    use crate::core::validator::ShiftLimits;
    use chrono::NaiveDate;

    /// Answers with a fixed record or a fixed failure.
    struct FakeEditor {
        record: AttendanceRecord,
        fail_with_state: Option<&'static str>,
        submitted: Vec<(i64, String)>,
    }

    impl RecordEditor for FakeEditor {
        fn fetch_record(&mut self, record_id: i64) -> AppResult<AttendanceRecord> {
            if record_id == self.record.id {
                Ok(self.record.clone())
            } else {
                Err(AppError::not_found_record(record_id))
            }
        }

        fn submit_edit(
            &mut self,
            record_id: i64,
            edit: &RecordEdit,
            actor: &str,
        ) -> AppResult<AttendanceRecord> {
            self.submitted.push((record_id, actor.to_string()));
            if let Some(msg) = self.fail_with_state {
                return Err(AppError::InvalidState(msg.to_string()));
            }
            let mut r = self.record.clone();
            r.note = format!("server: {}", edit.reason);
            r.total_hours = Some(7.5);
            r.conflict = ConflictState::ConfirmedResolved;
            r.resolved_by = Some(actor.to_string());
            Ok(r)
        }
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, 1).unwrap()
    }

    fn server_record() -> AttendanceRecord {
        AttendanceRecord {
            id: 4,
            employee_id: "E-4".into(),
            date: day(),
            transaction_id: "t4".into(),
            clock_in: Some(day().and_hms_opt(9, 0, 0).unwrap()),
            clock_out: Some(day().and_hms_opt(17, 0, 0).unwrap()),
            total_hours: Some(8.0),
            conflict: ConflictState::Unresolved,
            period_id: None,
            is_finalized: false,
            note: String::new(),
            resolved_by: None,
            updated_at: None,
        }
    }

    fn editor(fail: Option<&'static str>) -> FakeEditor {
        FakeEditor {
            record: server_record(),
            fail_with_state: fail,
            submitted: Vec::new(),
        }
    }

    fn validator() -> EditValidator {
        EditValidator::new(NaiveDate::from_ymd_opt(2025, 10, 1).unwrap(), ShiftLimits::default())
    }

    fn edit(reason: &str) -> RecordEdit {
        RecordEdit {
            date: "2025-09-01".into(),
            clock_in: Some("08:30".into()),
            clock_out: Some("17:00".into()),
            reason: reason.into(),
        }
    }

    #[test]
    fn projection_recomputes_and_marks_resolved() {
        let valid = validator().check(&edit("badge"), &server_record()).unwrap();
        let p = project(&server_record(), &valid, "op-1");
        assert_eq!(p.total_hours, Some(8.5));
        assert_eq!(p.conflict, ConflictState::ConfirmedResolved);
        assert_eq!(p.note, "badge");
        assert_eq!(p.resolved_by.as_deref(), Some("op-1"));
    }

    #[test]
    fn success_takes_server_values() {
        let mut store = OptimisticStore::new();
        let mut s = EditSession::new(editor(None), &mut store, validator(), "op-1");

        let rec = s.submit(4, &edit("badge")).unwrap();
        assert_eq!(rec.note, "server: badge");
        assert_eq!(rec.total_hours, Some(7.5));
        assert_eq!(s.store().get(4).unwrap().total_hours, Some(7.5));
        assert_eq!(s.store().phase(4), EditPhase::Confirmed);
    }

    #[test]
    fn server_rejection_rolls_back() {
        let mut store = OptimisticStore::new();
        let mut s = EditSession::new(
            editor(Some("Record is part of a finalized period")),
            &mut store,
            validator(),
            "op-1",
        );

        let err = s.submit(4, &edit("badge")).unwrap_err();
        assert!(err.to_string().contains("part of a finalized period"));
        assert_eq!(s.store().get(4).unwrap(), &server_record());
        assert_eq!(s.store().phase(4), EditPhase::RolledBack);
    }

    #[test]
    fn invalid_edit_never_reaches_server() {
        let mut store = OptimisticStore::new();
        let mut fake = editor(None);
        {
            let mut s = EditSession::new(&mut fake, &mut store, validator(), "op-1");
            let err = s.submit(4, &edit("   ")).unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
            assert_eq!(s.store().phase(4), EditPhase::Idle);
        }
        assert!(fake.submitted.is_empty());
    }

    #[test]
    fn finalized_record_is_refused_client_side() {
        let mut store = OptimisticStore::new();
        let mut fake = editor(None);
        fake.record.is_finalized = true;
        let mut s = EditSession::new(&mut fake, &mut store, validator(), "op-1");

        assert!(!s.editability(4).unwrap().allowed);
        let err = s.submit(4, &edit("badge")).unwrap_err();
        assert_eq!(err.kind(), crate::errors::ErrorKind::InvalidState);
    }

    #[test]
    fn cancelled_ticket_still_reconciles_server_truth() {
        let mut store = OptimisticStore::new();
        let mut s = EditSession::new(editor(None), &mut store, validator(), "op-1");

        let ticket = s.begin(4, &edit("badge")).unwrap();
        assert!(s.cancel(ticket));

        let mut committed = server_record();
        committed.note = "committed".into();
        assert!(s.finish(ticket, Ok(committed)).unwrap().is_none());
        assert_eq!(s.store().get(4).unwrap().note, "committed");
    }
}
