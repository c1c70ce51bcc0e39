//! Save/load round trips and re-arming reminders after a restart.

use std::path::Path;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};
use golendar_core::notifier::{channel, DEFAULT_CAPACITY};
use golendar_core::{Calendar, JsonStorage, NotificationStream, ReminderState};

const FUTURE: &str = "2999-06-01 12:00";

fn open(path: &Path) -> (Calendar, NotificationStream) {
    let (notifier, stream) = channel(DEFAULT_CAPACITY);
    (Calendar::new(JsonStorage::new(path), notifier), stream)
}

fn in_secs(secs: i64) -> String {
    (Utc::now() + ChronoDuration::seconds(secs)).to_rfc3339()
}

#[tokio::test]
async fn events_and_reminders_survive_a_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("calendar.json");

    let (mut cal, _stream) = open(&path);
    cal.add_event("Doctor", FUTURE, "high").unwrap();
    cal.add_event("Gym", FUTURE, "low").unwrap();
    let doctor = cal.resolve("Doctor").unwrap();
    cal.set_event_reminder(&doctor, "Checkup", &in_secs(3_600)).unwrap();
    cal.save().unwrap();

    let (mut reloaded, _stream) = open(&path);
    reloaded.load().unwrap();
    assert_eq!(reloaded.len(), 2);

    let event = reloaded.get_event(&doctor).unwrap();
    assert_eq!(event.title(), "Doctor");
    let reminder = event.reminder().unwrap();
    assert_eq!(reminder.message(), "Checkup");
    assert_eq!(reminder.state(), ReminderState::Unarmed);
}

#[tokio::test]
async fn persisted_reminder_has_only_message_time_and_sent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("calendar.json");

    let (mut cal, _stream) = open(&path);
    cal.add_event("Doctor", FUTURE, "high").unwrap();
    let id = cal.resolve("Doctor").unwrap();
    cal.set_event_reminder(&id, "Checkup", &in_secs(60)).unwrap();
    cal.save().unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let events = json["events"].as_object().unwrap();
    let reminder = events.values().next().unwrap()["reminder"].as_object().unwrap();
    let mut keys: Vec<_> = reminder.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["message", "sent", "time"]);
}

#[tokio::test(start_paused = true)]
async fn fired_reminder_reloads_as_fired_and_is_not_rearmed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("calendar.json");

    let (mut cal, mut stream) = open(&path);
    cal.add_event("Doctor", FUTURE, "high").unwrap();
    let id = cal.resolve("Doctor").unwrap();
    cal.set_event_reminder(&id, "Checkup", &in_secs(1)).unwrap();
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(stream.try_next().as_deref(), Some("reminder: Checkup"));
    cal.save().unwrap();

    let (mut reloaded, mut stream) = open(&path);
    reloaded.load().unwrap();
    assert!(reloaded.rearm_reminders().is_empty());

    let reminder = reloaded.get_event(&id).unwrap().reminder().unwrap();
    assert!(reminder.is_fired());
    assert!(!reminder.is_armed());

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(stream.try_next(), None);
}

#[tokio::test(start_paused = true)]
async fn rearm_schedules_future_and_reports_past_due() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("calendar.json");

    {
        let (mut cal, _stream) = open(&path);
        cal.add_event("Alpha", FUTURE, "high").unwrap();
        cal.add_event("Beta", "2999-06-02 12:00", "low").unwrap();
        let alpha = cal.resolve("Alpha").unwrap();
        let beta = cal.resolve("Beta").unwrap();
        cal.set_event_reminder(&alpha, "Soon", &in_secs(2)).unwrap();
        cal.set_event_reminder(&beta, "Missed", &in_secs(-60)).unwrap();
        cal.save().unwrap();
    }

    let (mut reloaded, mut stream) = open(&path);
    reloaded.load().unwrap();
    let statuses = reloaded.rearm_reminders();
    assert_eq!(statuses.len(), 2);
    assert!(statuses[0].starts_with("Alpha: reminder fires in"), "{statuses:?}");
    assert_eq!(statuses[1], "Beta: reminder deadline already passed");

    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(stream.try_next().as_deref(), Some("reminder: Soon"));
    assert_eq!(stream.try_next(), None);
}

#[tokio::test]
async fn load_replaces_and_cancels_existing_events() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("calendar.json");

    let (mut cal, _stream) = open(&path);
    cal.load().unwrap();
    assert!(cal.is_empty());

    cal.add_event("Scratch", FUTURE, "low").unwrap();
    let id = cal.resolve("Scratch").unwrap();
    cal.set_event_reminder(&id, "Temporary", &in_secs(600)).unwrap();

    cal.load().unwrap();
    assert!(cal.is_empty());
}

#[tokio::test]
async fn corrupt_store_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("calendar.json");
    std::fs::write(&path, "{ broken").unwrap();

    let (mut cal, _stream) = open(&path);
    assert!(cal.load().is_err());
}

#[tokio::test(start_paused = true)]
async fn stopped_reminder_stays_stopped_after_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("calendar.json");

    let id = {
        let (mut cal, _stream) = open(&path);
        cal.add_event("Doctor", FUTURE, "high").unwrap();
        let id = cal.resolve("Doctor").unwrap();
        cal.set_event_reminder(&id, "Checkup", &in_secs(3)).unwrap();
        assert_eq!(
            cal.cancel_event_reminder(&id).unwrap(),
            "timer stopped for reminder: Checkup"
        );
        cal.save().unwrap();
        id
    };

    let (mut reloaded, mut stream) = open(&path);
    reloaded.load().unwrap();
    assert!(reloaded.rearm_reminders().is_empty());
    assert_eq!(
        reloaded.get_event(&id).unwrap().reminder().unwrap().state(),
        ReminderState::Stopped
    );

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(stream.try_next(), None);
}
