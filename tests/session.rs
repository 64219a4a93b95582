//! Client Session Tests
//!
//! Covers the browser-side list cache: seeding, live pushes, alert
//! selection, optimistic mutations, and divergence tracking.

mod common;

use common::sample_notification;
use herald::client::session::{
    Alert, AlertPermission, ConnectionState, PendingWrite, Session,
};
use herald::domain::notification::DeliveryMethod;
use uuid::Uuid;

// ===========================================================================
// Connection state
// ===========================================================================

#[test]
fn new_session_starts_disconnected() {
    let session = Session::new(AlertPermission::Granted);

    assert_eq!(session.state(), ConnectionState::Disconnected);
    assert!(session.notifications().is_empty());
    assert!(!session.diverged());
}

#[test]
fn connection_lifecycle_transitions() {
    let mut session = Session::new(AlertPermission::Granted);

    session.connect_started();
    assert_eq!(session.state(), ConnectionState::Connecting);

    session.joined();
    assert_eq!(session.state(), ConnectionState::Joined);

    session.connection_lost();
    assert_eq!(session.state(), ConnectionState::Disconnected);
}

// ===========================================================================
// Seeding
// ===========================================================================

#[test]
fn seed_keeps_only_in_app_notifications() {
    let mut session = Session::new(AlertPermission::Granted);
    let in_app = sample_notification("alice");
    let mut email = sample_notification("alice");
    email.delivery_method = DeliveryMethod::Email;
    let mut text = sample_notification("alice");
    text.delivery_method = DeliveryMethod::Text;

    session.seed(vec![in_app.clone(), email, text]);

    assert_eq!(session.notifications().len(), 1);
    assert_eq!(session.notifications()[0].id, in_app.id);
}

#[test]
fn seed_is_the_reconciliation_point() {
    let mut session = Session::new(AlertPermission::Granted);
    session.mark_all_read();
    session.write_completed(&PendingWrite::MarkAllRead, false);
    assert!(session.diverged());

    session.seed(vec![sample_notification("alice")]);

    assert!(!session.diverged());
    assert!(session.pending_writes().is_empty());
}

// ===========================================================================
// Pushes and alerts
// ===========================================================================

#[test]
fn pushes_prepend_newest_first() {
    let mut session = Session::new(AlertPermission::Granted);
    let older = sample_notification("alice");
    let newer = sample_notification("alice");

    session.seed(vec![older.clone()]);
    session.receive_push(newer.clone());

    let ids: Vec<Uuid> = session.notifications().iter().map(|n| n.id).collect();
    assert_eq!(ids, vec![newer.id, older.id]);
}

#[test]
fn duplicate_pushes_are_dropped() {
    let mut session = Session::new(AlertPermission::Granted);
    let notification = sample_notification("alice");

    assert!(session.receive_push(notification.clone()).is_some());
    assert!(session.receive_push(notification).is_none());
    assert_eq!(session.notifications().len(), 1);
}

#[test]
fn granted_permission_raises_a_desktop_alert() {
    let mut session = Session::new(AlertPermission::Granted);
    let notification = sample_notification("alice");

    let alert = session.receive_push(notification.clone());

    assert_eq!(
        alert,
        Some(Alert::Desktop {
            title: notification.title,
            body: notification.message,
        })
    );
}

#[test]
fn denied_permission_falls_back_to_sound_and_toast() {
    let mut session = Session::new(AlertPermission::Denied);
    let notification = sample_notification("alice");

    let alert = session.receive_push(notification.clone());

    assert_eq!(
        alert,
        Some(Alert::SoundAndToast {
            title: notification.title,
            body: notification.message,
        })
    );
}

#[test]
fn unavailable_permission_falls_back_to_sound_and_toast() {
    let mut session = Session::new(AlertPermission::Unavailable);

    let alert = session.receive_push(sample_notification("alice"));

    assert!(matches!(alert, Some(Alert::SoundAndToast { .. })));
}

#[test]
fn permission_can_change_mid_session() {
    let mut session = Session::new(AlertPermission::Unavailable);

    session.set_permission(AlertPermission::Granted);
    let alert = session.receive_push(sample_notification("alice"));

    assert!(matches!(alert, Some(Alert::Desktop { .. })));
}

// ===========================================================================
// Optimistic mutations
// ===========================================================================

#[test]
fn mark_read_flips_locally_and_records_the_write() {
    let mut session = Session::new(AlertPermission::Granted);
    let notification = sample_notification("alice");
    session.seed(vec![notification.clone()]);

    assert!(session.mark_read(notification.id));

    assert!(session.notifications()[0].is_read);
    assert_eq!(
        session.pending_writes(),
        &[PendingWrite::MarkRead(notification.id)]
    );
}

#[test]
fn mark_read_rejects_an_id_that_is_not_displayed() {
    let mut session = Session::new(AlertPermission::Granted);
    session.seed(vec![sample_notification("alice")]);

    assert!(!session.mark_read(Uuid::new_v4()));
    assert!(session.pending_writes().is_empty());
}

#[test]
fn mark_all_read_reports_how_many_flipped() {
    let mut session = Session::new(AlertPermission::Granted);
    let mut read = sample_notification("alice");
    read.is_read = true;
    session.seed(vec![
        sample_notification("alice"),
        sample_notification("alice"),
        read,
    ]);

    assert_eq!(session.mark_all_read(), 2);
    assert_eq!(session.unread_count(), 0);
    assert_eq!(session.pending_writes(), &[PendingWrite::MarkAllRead]);
}

#[test]
fn mark_all_read_records_the_write_even_with_nothing_unread() {
    let mut session = Session::new(AlertPermission::Granted);

    assert_eq!(session.mark_all_read(), 0);
    assert_eq!(session.pending_writes(), &[PendingWrite::MarkAllRead]);
}

#[test]
fn delete_removes_locally_and_records_the_write() {
    let mut session = Session::new(AlertPermission::Granted);
    let notification = sample_notification("alice");
    session.seed(vec![notification.clone()]);

    assert!(session.delete(notification.id));

    assert!(session.notifications().is_empty());
    assert_eq!(
        session.pending_writes(),
        &[PendingWrite::Delete(notification.id)]
    );
}

#[test]
fn delete_rejects_an_id_that_is_not_displayed() {
    let mut session = Session::new(AlertPermission::Granted);

    assert!(!session.delete(Uuid::new_v4()));
    assert!(session.pending_writes().is_empty());
}

// ===========================================================================
// Write settlement
// ===========================================================================

#[test]
fn successful_write_settles_the_ledger() {
    let mut session = Session::new(AlertPermission::Granted);
    let notification = sample_notification("alice");
    session.seed(vec![notification.clone()]);
    session.mark_read(notification.id);

    session.write_completed(&PendingWrite::MarkRead(notification.id), true);

    assert!(session.pending_writes().is_empty());
    assert!(!session.diverged());
}

#[test]
fn failed_write_does_not_roll_back_but_flags_divergence() {
    let mut session = Session::new(AlertPermission::Granted);
    let notification = sample_notification("alice");
    session.seed(vec![notification.clone()]);
    session.delete(notification.id);

    session.write_completed(&PendingWrite::Delete(notification.id), false);

    // The local removal stands; only the flag records the disagreement.
    assert!(session.notifications().is_empty());
    assert!(session.diverged());
}

#[test]
fn divergence_sticks_until_the_next_seed() {
    let mut session = Session::new(AlertPermission::Granted);
    let notification = sample_notification("alice");
    session.seed(vec![notification.clone()]);

    session.mark_all_read();
    session.write_completed(&PendingWrite::MarkAllRead, false);
    assert!(session.diverged());

    session.mark_read(notification.id);
    session.write_completed(&PendingWrite::MarkRead(notification.id), true);
    assert!(session.diverged());
}

// ===========================================================================
// Unread badge
// ===========================================================================

#[test]
fn unread_count_tracks_read_flags() {
    let mut session = Session::new(AlertPermission::Granted);
    let first = sample_notification("alice");
    let second = sample_notification("alice");
    session.seed(vec![first.clone(), second]);
    assert_eq!(session.unread_count(), 2);

    session.mark_read(first.id);
    assert_eq!(session.unread_count(), 1);

    session.receive_push(sample_notification("alice"));
    assert_eq!(session.unread_count(), 2);
}
