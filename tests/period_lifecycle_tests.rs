use chrono::DateTime;
use rattendance::core::edit::resolve_conflict;
use rattendance::core::finalize::finalize_period;
use rattendance::core::period::{create_period, get_period, records_for_period};
use rattendance::core::period_check::validate_period;
use rattendance::core::summary::summarize;
use rattendance::core::unlock::unlock_period;
use rattendance::db::audit::load_for_entity;
use rattendance::errors::{AppError, ErrorKind};
use rattendance::models::conflict_state::ConflictState;
use rattendance::models::issue::IssueType;
use rattendance::models::period_status::PeriodStatus;

mod common;
use common::*;

#[test]
fn finalize_locks_every_record_once() {
    let (_path, mut pool) = fresh_pool("lifecycle_finalize");
    for (i, emp) in ["E-1", "E-2", "E-3"].iter().enumerate() {
        add_clean(&mut pool, emp, "2025-09-03", &format!("t{}", i));
    }

    let created = create_period(&mut pool, d("2025-09-01"), d("2025-09-30"), ACTOR).unwrap();
    assert_eq!(created.associated_records, 3);
    let pid = created.period.id.unwrap();

    let out = finalize_period(&mut pool, pid, ACTOR).unwrap();
    assert_eq!(out.affected_records, 3);
    assert_eq!(out.period.status, PeriodStatus::Finalized);
    assert_eq!(out.period.finalized_by.as_deref(), Some(ACTOR));
    let stamp = out.period.finalized_at.as_deref().unwrap();
    assert!(DateTime::parse_from_rfc3339(stamp).is_ok());
    assert_eq!(finalized_count(&pool, pid), 3);

    let trail = load_for_entity(&pool.conn, "period", pid).unwrap();
    assert!(trail.iter().all(|e| DateTime::parse_from_rfc3339(&e.created_at).is_ok()));

    let again = finalize_period(&mut pool, pid, ACTOR).unwrap_err();
    assert_eq!(again.kind(), ErrorKind::InvalidState);
    assert_eq!(audit_count(&pool, "finalize"), 1);
}

#[test]
fn unresolved_conflicts_block_finalize() {
    let (_path, mut pool) = fresh_pool("lifecycle_conflicts");
    for i in 0..3 {
        add_record(
            &mut pool,
            &format!("E-{}", i),
            "2025-09-10",
            "t",
            Some("09:00"),
            Some("17:00"),
            ConflictState::RejectedResolution,
        );
    }

    let v = validate_period(&pool.conn, d("2025-09-01"), d("2025-09-30")).unwrap();
    assert!(!v.can_finalize);
    assert_eq!(v.issues.len(), 1);
    assert_eq!(v.issues[0].kind, IssueType::UnresolvedConflicts);
    assert_eq!(v.issues[0].count, 3);

    let pid = create_period(&mut pool, d("2025-09-01"), d("2025-09-30"), ACTOR)
        .unwrap()
        .period
        .id
        .unwrap();

    let err = finalize_period(&mut pool, pid, ACTOR).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationFailed);
    match err {
        AppError::Precondition(issues) => assert_eq!(issues[0].count, 3),
        other => panic!("unexpected error: {:?}", other),
    }

    assert_eq!(get_period(&pool.conn, pid).unwrap().status, PeriodStatus::Pending);
    assert_eq!(finalized_count(&pool, pid), 0);
    assert_eq!(audit_count(&pool, "finalize"), 0);
}

#[test]
fn validate_reports_each_issue_and_is_repeatable() {
    let (_path, mut pool) = fresh_pool("lifecycle_validate");
    add_record(
        &mut pool,
        "E-1",
        "2025-09-02",
        "a",
        Some("09:00"),
        None,
        ConflictState::Unresolved,
    );
    add_record(
        &mut pool,
        "E-2",
        "2025-09-02",
        "b",
        Some("09:00"),
        Some("17:00"),
        ConflictState::RejectedResolution,
    );
    add_missing_data(&pool, "E-3", "2025-09-02", "c");
    add_clean(&mut pool, "E-4", "2025-10-01", "outside");

    let first = validate_period(&pool.conn, d("2025-09-01"), d("2025-09-30")).unwrap();
    let second = validate_period(&pool.conn, d("2025-09-01"), d("2025-09-30")).unwrap();
    assert_eq!(first, second);
    assert!(!first.can_finalize);

    let counts: Vec<(IssueType, i64)> = first.issues.iter().map(|i| (i.kind, i.count)).collect();
    assert_eq!(
        counts,
        vec![
            (IssueType::UnresolvedConflicts, 2),
            (IssueType::PendingApprovals, 1),
            (IssueType::MissingData, 1),
        ]
    );

    let clean = validate_period(&pool.conn, d("2025-10-01"), d("2025-10-31")).unwrap();
    assert!(clean.can_finalize);
    assert!(clean.issues.is_empty());
}

#[test]
fn finalize_rechecks_inside_the_transaction() {
    let (_path, mut pool) = fresh_pool("lifecycle_recheck");
    let rid = add_clean(&mut pool, "E-1", "2025-09-05", "t1");
    let pid = create_period(&mut pool, d("2025-09-01"), d("2025-09-30"), ACTOR)
        .unwrap()
        .period
        .id
        .unwrap();

    // the preview says yes...
    assert!(validate_period(&pool.conn, d("2025-09-01"), d("2025-09-30")).unwrap().can_finalize);

    // ...then the record is rejected before the operator clicks finalize
    resolve_conflict(&mut pool, rid, ACTOR, false, Some("badge mismatch")).unwrap();

    let err = finalize_period(&mut pool, pid, ACTOR).unwrap_err();
    assert!(matches!(err, AppError::Precondition(_)));
    assert!(!record(&pool, rid).is_finalized);
}

#[test]
fn missing_period_is_not_found() {
    let (_path, mut pool) = fresh_pool("lifecycle_missing");
    assert_eq!(finalize_period(&mut pool, 99, ACTOR).unwrap_err().kind(), ErrorKind::NotFound);
    assert_eq!(
        unlock_period(&mut pool, 99, ACTOR, "fix").unwrap_err().kind(),
        ErrorKind::NotFound
    );
}

#[test]
fn actor_is_required() {
    let (_path, mut pool) = fresh_pool("lifecycle_actor");
    add_clean(&mut pool, "E-1", "2025-09-05", "t1");
    let pid = create_period(&mut pool, d("2025-09-01"), d("2025-09-30"), ACTOR)
        .unwrap()
        .period
        .id
        .unwrap();

    let err = finalize_period(&mut pool, pid, "   ").unwrap_err();
    assert!(matches!(err, AppError::MissingActor));
    assert_eq!(get_period(&pool.conn, pid).unwrap().status, PeriodStatus::Pending);
}

#[test]
fn unlock_restores_editability_and_keeps_history() {
    let (_path, mut pool) = fresh_pool("lifecycle_unlock");
    add_clean(&mut pool, "E-1", "2025-09-05", "t1");
    add_clean(&mut pool, "E-2", "2025-09-06", "t2");
    let pid = create_period(&mut pool, d("2025-09-01"), d("2025-09-30"), ACTOR)
        .unwrap()
        .period
        .id
        .unwrap();

    let finalized = finalize_period(&mut pool, pid, ACTOR).unwrap().period;

    let out = unlock_period(&mut pool, pid, "payroll-admin", "  wrong overtime code  ").unwrap();
    assert_eq!(out.affected_records, 2);
    assert_eq!(out.period.status, PeriodStatus::Pending);
    assert_eq!(out.period.unlock_reason.as_deref(), Some("wrong overtime code"));
    assert_eq!(out.period.finalized_by, finalized.finalized_by);
    assert_eq!(out.period.finalized_at, finalized.finalized_at);
    assert_eq!(finalized_count(&pool, pid), 0);

    let trail = load_for_entity(&pool.conn, "period", pid).unwrap();
    let unlock = trail.last().unwrap();
    assert_eq!(unlock.actor, "payroll-admin");
    assert!(unlock.after.contains("wrong overtime code"));

    // and the cycle can run again
    let again = finalize_period(&mut pool, pid, ACTOR).unwrap();
    assert_eq!(again.affected_records, 2);
}

#[test]
fn unlock_with_blank_reason_changes_nothing() {
    let (_path, mut pool) = fresh_pool("lifecycle_unlock_blank");
    add_clean(&mut pool, "E-1", "2025-09-05", "t1");
    let pid = create_period(&mut pool, d("2025-09-01"), d("2025-09-30"), ACTOR)
        .unwrap()
        .period
        .id
        .unwrap();
    finalize_period(&mut pool, pid, ACTOR).unwrap();

    for reason in ["", "   \t"] {
        let err = unlock_period(&mut pool, pid, ACTOR, reason).unwrap_err();
        assert!(matches!(err, AppError::MissingReason));
        assert_eq!(err.kind(), ErrorKind::ValidationFailed);
    }

    assert_eq!(get_period(&pool.conn, pid).unwrap().status, PeriodStatus::Finalized);
    assert_eq!(finalized_count(&pool, pid), 1);
    assert_eq!(audit_count(&pool, "unlock"), 0);
}

#[test]
fn unlock_only_from_finalized() {
    let (_path, mut pool) = fresh_pool("lifecycle_unlock_states");
    add_clean(&mut pool, "E-1", "2025-09-05", "t1");
    add_clean(&mut pool, "E-1", "2025-10-05", "t2");
    let pending = create_period(&mut pool, d("2025-09-01"), d("2025-09-30"), ACTOR)
        .unwrap()
        .period
        .id
        .unwrap();
    let locked = create_period(&mut pool, d("2025-10-01"), d("2025-10-31"), ACTOR)
        .unwrap()
        .period
        .id
        .unwrap();
    force_locked(&pool, locked);

    let err = unlock_period(&mut pool, pending, ACTOR, "reason").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);

    let err = unlock_period(&mut pool, locked, ACTOR, "reason").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
    assert!(err.to_string().contains("LOCKED"));

    let err = finalize_period(&mut pool, locked, ACTOR).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
    assert_eq!(get_period(&pool.conn, locked).unwrap().status, PeriodStatus::Locked);
}

#[test]
fn create_period_rejects_overlap_and_bad_range() {
    let (_path, mut pool) = fresh_pool("lifecycle_create");
    create_period(&mut pool, d("2025-09-01"), d("2025-09-30"), ACTOR).unwrap();

    let err = create_period(&mut pool, d("2025-09-30"), d("2025-10-15"), ACTOR).unwrap_err();
    assert!(matches!(err, AppError::Overlap { existing: 1, .. }));

    let err = create_period(&mut pool, d("2025-11-10"), d("2025-11-01"), ACTOR).unwrap_err();
    assert!(matches!(err, AppError::InvalidRange(_)));

    // adjacent is fine
    create_period(&mut pool, d("2025-10-01"), d("2025-10-31"), ACTOR).unwrap();
    assert_eq!(audit_count(&pool, "create_period"), 2);
}

#[test]
fn only_unassigned_records_in_range_are_attached() {
    let (_path, mut pool) = fresh_pool("lifecycle_attach");
    let inside = add_clean(&mut pool, "E-1", "2025-09-01", "t1");
    let edge = add_clean(&mut pool, "E-1", "2025-09-30", "t2");
    let outside = add_clean(&mut pool, "E-1", "2025-10-01", "t3");

    let pid = create_period(&mut pool, d("2025-09-01"), d("2025-09-30"), ACTOR)
        .unwrap()
        .period
        .id
        .unwrap();

    assert_eq!(record(&pool, inside).period_id, Some(pid));
    assert_eq!(record(&pool, edge).period_id, Some(pid));
    assert_eq!(record(&pool, outside).period_id, None);

    // ingestion after creation never associates
    let late = add_clean(&mut pool, "E-2", "2025-09-15", "t4");
    assert_eq!(record(&pool, late).period_id, None);

    let ids: Vec<i64> = records_for_period(&pool.conn, pid)
        .unwrap()
        .iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(ids, vec![inside, edge]);
}

#[test]
fn summary_projects_a_pending_period_until_one_exists() {
    let (_path, mut pool) = fresh_pool("lifecycle_summary");
    add_clean(&mut pool, "E-1", "2025-09-02", "a");
    add_clean(&mut pool, "E-1", "2025-09-03", "b");
    add_record(
        &mut pool,
        "E-2",
        "2025-09-03",
        "c",
        Some("08:00"),
        Some("12:00"),
        ConflictState::Unresolved,
    );

    let s = summarize(&pool.conn, d("2025-09-01"), d("2025-09-30")).unwrap();
    assert_eq!(s.total_records, 3);
    assert_eq!(s.employee_count, 2);
    assert_eq!(s.pending_approvals, 1);
    assert_eq!(s.conflicts, 1);
    assert!(!s.period.is_persisted());
    assert_eq!(s.period.status, PeriodStatus::Pending);
    assert_eq!(audit_count(&pool, "create_period"), 0);

    create_period(&mut pool, d("2025-09-01"), d("2025-09-30"), ACTOR).unwrap();
    let s = summarize(&pool.conn, d("2025-09-01"), d("2025-09-30")).unwrap();
    assert!(s.period.is_persisted());
}

#[test]
fn summary_of_a_slice_reports_the_stored_period() {
    let (_path, mut pool) = fresh_pool("lifecycle_summary_slice");
    add_clean(&mut pool, "E-1", "2025-09-15", "a");
    add_clean(&mut pool, "E-2", "2025-09-25", "b");
    let pid = create_period(&mut pool, d("2025-09-01"), d("2025-09-30"), ACTOR)
        .unwrap()
        .period
        .id
        .unwrap();
    finalize_period(&mut pool, pid, ACTOR).unwrap();

    let s = summarize(&pool.conn, d("2025-09-10"), d("2025-09-20")).unwrap();
    assert_eq!(s.total_records, 1);
    assert_eq!(s.period.id, Some(pid));
    assert_eq!(s.period.status, PeriodStatus::Finalized);

    // straddling the end of the period still shows it
    let s = summarize(&pool.conn, d("2025-09-20"), d("2025-10-10")).unwrap();
    assert_eq!(s.period.id, Some(pid));

    let s = summarize(&pool.conn, d("2025-10-01"), d("2025-10-31")).unwrap();
    assert!(!s.period.is_persisted());
}

#[test]
fn failed_audit_write_rolls_back_finalize() {
    let (_path, mut pool) = fresh_pool("lifecycle_finalize_audit_down");
    add_clean(&mut pool, "E-1", "2025-09-05", "t1");
    add_clean(&mut pool, "E-2", "2025-09-06", "t2");
    let pid = create_period(&mut pool, d("2025-09-01"), d("2025-09-30"), ACTOR)
        .unwrap()
        .period
        .id
        .unwrap();
    fail_audit_writes(&pool);

    let err = finalize_period(&mut pool, pid, ACTOR).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SystemError);

    let period = get_period(&pool.conn, pid).unwrap();
    assert_eq!(period.status, PeriodStatus::Pending);
    assert_eq!(period.finalized_by, None);
    assert_eq!(period.finalized_at, None);
    assert_eq!(finalized_count(&pool, pid), 0);
}

#[test]
fn failed_audit_write_rolls_back_unlock() {
    let (_path, mut pool) = fresh_pool("lifecycle_unlock_audit_down");
    add_clean(&mut pool, "E-1", "2025-09-05", "t1");
    add_clean(&mut pool, "E-2", "2025-09-06", "t2");
    let pid = create_period(&mut pool, d("2025-09-01"), d("2025-09-30"), ACTOR)
        .unwrap()
        .period
        .id
        .unwrap();
    let finalized = finalize_period(&mut pool, pid, ACTOR).unwrap().period;
    fail_audit_writes(&pool);

    let err = unlock_period(&mut pool, pid, ACTOR, "late badge import").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SystemError);

    assert_eq!(get_period(&pool.conn, pid).unwrap(), finalized);
    assert_eq!(finalized_count(&pool, pid), 2);
}

#[test]
fn audit_trail_separates_records_and_periods_sharing_an_id() {
    let (_path, mut pool) = fresh_pool("lifecycle_audit_entity");
    let rid = add_clean(&mut pool, "E-1", "2025-09-05", "t1");
    let pid = create_period(&mut pool, d("2025-09-01"), d("2025-09-30"), ACTOR)
        .unwrap()
        .period
        .id
        .unwrap();
    assert_eq!(rid, pid);
    finalize_period(&mut pool, pid, ACTOR).unwrap();

    let actions: Vec<&str> = load_for_entity(&pool.conn, "period", pid)
        .unwrap()
        .iter()
        .map(|e| e.action.to_db_str())
        .collect();
    assert_eq!(actions, vec!["create_period", "finalize"]);

    let actions: Vec<&str> = load_for_entity(&pool.conn, "record", rid)
        .unwrap()
        .iter()
        .map(|e| e.action.to_db_str())
        .collect();
    assert_eq!(actions, vec!["ingest"]);

    assert!(load_for_entity(&pool.conn, "employee", 1).unwrap().is_empty());
}

#[test]
fn records_are_never_deleted() {
    let (_path, mut pool) = fresh_pool("lifecycle_no_delete");
    let id = add_clean(&mut pool, "E-1", "2025-09-02", "a");
    assert!(pool.conn.execute("DELETE FROM records WHERE id = ?1", [id]).is_err());
    assert!(pool.conn.execute("DELETE FROM audit_log", []).is_err());
    assert!(pool.conn.execute("UPDATE audit_log SET actor = 'x'", []).is_err());
}
