//! End-to-end reminder scenarios through the public calendar API.
//!
//! Timer tests run on a paused tokio clock: `sleep` advances virtual time and
//! armed reminders fire as soon as their deadline is reached.

use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};
use golendar_core::notifier::{channel, DEFAULT_CAPACITY};
use golendar_core::{Calendar, JsonStorage, NotificationStream};

// ============================================================================
// Test Helpers
// ============================================================================

const FUTURE: &str = "2999-06-01 12:00";

struct Fixture {
    calendar: Calendar,
    stream: NotificationStream,
    _dir: tempfile::TempDir,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let (notifier, stream) = channel(DEFAULT_CAPACITY);
    let calendar = Calendar::new(JsonStorage::new(dir.path().join("calendar.json")), notifier);
    Fixture {
        calendar,
        stream,
        _dir: dir,
    }
}

fn in_secs(secs: i64) -> String {
    (Utc::now() + ChronoDuration::seconds(secs)).to_rfc3339()
}

fn add_event(calendar: &mut Calendar, title: &str) -> String {
    calendar.add_event(title, FUTURE, "medium").unwrap();
    calendar.resolve(title).unwrap()
}

fn drain(stream: &mut NotificationStream) -> Vec<String> {
    std::iter::from_fn(|| stream.try_next()).collect()
}

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test(start_paused = true)]
async fn doctor_appointment_fires_after_two_seconds() {
    let mut fx = fixture();
    let id = add_event(&mut fx.calendar, "Clinic");

    let status = fx
        .calendar
        .set_event_reminder(&id, "Запись к врачу", &in_secs(2))
        .unwrap();
    assert!(status.ends_with("reminder fires in 2s"), "{status}");

    tokio::time::sleep(Duration::from_millis(1_500)).await;
    assert!(drain(&mut fx.stream).is_empty());

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(drain(&mut fx.stream), vec!["reminder: Запись к врачу"]);
    assert!(fx.calendar.get_event(&id).unwrap().reminder().unwrap().is_fired());
}

#[tokio::test(start_paused = true)]
async fn call_an_hour_ago_reports_passed_and_stays_silent() {
    let mut fx = fixture();
    let id = add_event(&mut fx.calendar, "Phone");

    let status = fx
        .calendar
        .set_event_reminder(&id, "Звонок", &in_secs(-3_600))
        .unwrap();
    assert!(status.ends_with("reminder deadline already passed"), "{status}");

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert!(drain(&mut fx.stream).is_empty());
    assert!(!fx.calendar.get_event(&id).unwrap().reminder().unwrap().is_fired());
}

#[tokio::test(start_paused = true)]
async fn stopping_early_suppresses_the_notification() {
    let mut fx = fixture();
    let id = add_event(&mut fx.calendar, "Meeting");
    fx.calendar
        .set_event_reminder(&id, "Standup", &in_secs(5))
        .unwrap();

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(
        fx.calendar.cancel_event_reminder(&id).unwrap(),
        "timer stopped for reminder: Standup"
    );

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(drain(&mut fx.stream).is_empty());
    assert_eq!(
        fx.calendar.cancel_event_reminder(&id).unwrap(),
        "timer already fired or was stopped: Standup"
    );
}

#[tokio::test(start_paused = true)]
async fn stop_after_fire_never_renotifies() {
    let mut fx = fixture();
    let id = add_event(&mut fx.calendar, "Meeting");
    fx.calendar
        .set_event_reminder(&id, "Standup", &in_secs(1))
        .unwrap();
    tokio::time::sleep(Duration::from_secs(2)).await;

    for _ in 0..3 {
        assert_eq!(
            fx.calendar.cancel_event_reminder(&id).unwrap(),
            "timer already fired or was stopped: Standup"
        );
    }
    assert_eq!(drain(&mut fx.stream), vec!["reminder: Standup"]);
}

#[tokio::test(start_paused = true)]
async fn deleting_an_event_cancels_its_timer() {
    let mut fx = fixture();
    let id = add_event(&mut fx.calendar, "Meeting");
    fx.calendar
        .set_event_reminder(&id, "Standup", &in_secs(2))
        .unwrap();

    fx.calendar.delete_event(&id).unwrap();
    tokio::time::sleep(Duration::from_secs(3)).await;
    assert!(drain(&mut fx.stream).is_empty());
}

#[tokio::test(start_paused = true)]
async fn replacing_a_reminder_only_fires_the_new_one() {
    let mut fx = fixture();
    let id = add_event(&mut fx.calendar, "Meeting");
    fx.calendar
        .set_event_reminder(&id, "Old reminder", &in_secs(1))
        .unwrap();
    fx.calendar
        .set_event_reminder(&id, "New reminder", &in_secs(3))
        .unwrap();

    tokio::time::sleep(Duration::from_secs(4)).await;
    assert_eq!(drain(&mut fx.stream), vec!["reminder: New reminder"]);
}

#[tokio::test(start_paused = true)]
async fn reminders_and_manual_notifications_share_one_ordered_sink() {
    let mut fx = fixture();
    let a = add_event(&mut fx.calendar, "First event");
    let b = add_event(&mut fx.calendar, "Second event");

    fx.calendar.notify("manual before").await.unwrap();
    fx.calendar.set_event_reminder(&a, "Early", &in_secs(1)).unwrap();
    fx.calendar.set_event_reminder(&b, "Late", &in_secs(2)).unwrap();

    tokio::time::sleep(Duration::from_secs(3)).await;
    fx.calendar.notify("manual after").await.unwrap();

    assert_eq!(
        drain(&mut fx.stream),
        vec!["manual before", "reminder: Early", "reminder: Late", "manual after"]
    );
}

#[tokio::test(start_paused = true)]
async fn full_sink_holds_fires_until_the_consumer_reads() {
    let dir = tempfile::tempdir().unwrap();
    let (notifier, mut stream) = channel(1);
    let mut calendar = Calendar::new(JsonStorage::new(dir.path().join("c.json")), notifier);
    let a = add_event(&mut calendar, "First event");
    let b = add_event(&mut calendar, "Second event");

    calendar.set_event_reminder(&a, "Alpha", &in_secs(1)).unwrap();
    calendar.set_event_reminder(&b, "Beta", &in_secs(2)).unwrap();
    tokio::time::sleep(Duration::from_secs(3)).await;

    assert_eq!(stream.next().await.as_deref(), Some("reminder: Alpha"));
    assert_eq!(stream.next().await.as_deref(), Some("reminder: Beta"));
}

#[tokio::test(start_paused = true)]
async fn shutdown_drains_buffer_and_ends_the_stream() {
    let mut fx = fixture();
    let id = add_event(&mut fx.calendar, "Meeting");
    fx.calendar.set_event_reminder(&id, "Standup", &in_secs(1)).unwrap();
    tokio::time::sleep(Duration::from_secs(2)).await;

    fx.calendar.shutdown().unwrap();
    assert!(fx.calendar.notify("too late").await.is_err());

    let consumer = tokio::spawn(async move {
        let mut seen = Vec::new();
        while let Some(msg) = fx.stream.next().await {
            seen.push(msg);
        }
        seen
    });
    assert_eq!(consumer.await.unwrap(), vec!["reminder: Standup"]);
}
