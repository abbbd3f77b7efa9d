//! End-to-end store tests over the public API.

use std::sync::Arc;

use tempfile::TempDir;

use drafts_rs::config::Config;
use drafts_rs::{
    Draft, DraftStore, DurabilityMode, ManualClock, NamespaceId, SessionId, SessionStore,
    SkewWindow, Store, StoreError, WallClock,
};

const NOW: u64 = 1_700_000_000_000;

fn open_store(temp: &TempDir) -> (Store, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::at(NOW));
    let store = Store::open_with_clock(
        temp.path(),
        DurabilityMode::Cache,
        SkewWindow::default(),
        clock.clone(),
    )
    .expect("open store");
    (store, clock)
}

#[test]
fn lww_ladder_matches_contract() {
    let temp = TempDir::new().unwrap();
    let (store, clock) = open_store(&temp);
    let ns = NamespaceId::default();
    let session = store.sessions().create(&ns).unwrap().id;
    let drafts = store.drafts();

    // First write lands as submitted.
    let first = drafts
        .set(&session, &ns, "Hello world", WallClock(NOW - 1_000))
        .unwrap();
    assert_eq!(first, Draft::new("Hello world", WallClock(NOW - 1_000)));
    assert_eq!(drafts.get(&session, &ns).unwrap(), Some(first.clone()));

    // An older write is rejected; the response is the existing draft.
    let rejected = drafts
        .set(&session, &ns, "Older", WallClock(NOW - 2_000))
        .unwrap();
    assert_eq!(rejected, first);
    assert_eq!(drafts.get(&session, &ns).unwrap(), Some(first));

    // A newer write replaces the register.
    clock.advance(10);
    let newest = drafts.set(&session, &ns, "Newest", WallClock(NOW)).unwrap();
    assert_eq!(newest, Draft::new("Newest", WallClock(NOW)));
    assert_eq!(drafts.get(&session, &ns).unwrap(), Some(newest));
}

#[test]
fn far_future_timestamp_is_clamped_to_server_time() {
    let temp = TempDir::new().unwrap();
    let (store, _clock) = open_store(&temp);
    let ns = NamespaceId::default();
    let session = store.sessions().create(&ns).unwrap().id;

    let submitted = WallClock(NOW + 3_600_000);
    let stored = store
        .drafts()
        .set(&session, &ns, "Future draft", submitted)
        .unwrap();
    assert!(stored.timestamp < submitted);
    assert_eq!(stored.timestamp, WallClock(NOW));
}

#[test]
fn drafts_survive_reopen() {
    let temp = TempDir::new().unwrap();
    let ns = NamespaceId::default();
    let session;
    {
        let (store, _clock) = open_store(&temp);
        session = store.sessions().create(&ns).unwrap().id;
        store
            .drafts()
            .set(&session, &ns, "Persisted draft", WallClock(NOW - 1_000))
            .unwrap();
    }

    let (store, _clock) = open_store(&temp);
    assert_eq!(
        store.drafts().get(&session, &ns).unwrap(),
        Some(Draft::new("Persisted draft", WallClock(NOW - 1_000)))
    );
}

#[test]
fn session_delete_cascades_and_survives_reopen() {
    let temp = TempDir::new().unwrap();
    let ns_a = NamespaceId::parse("alpha").unwrap();
    let ns_b = NamespaceId::parse("beta").unwrap();
    let doomed;
    let survivor;
    {
        let (store, _clock) = open_store(&temp);
        let sessions = store.sessions();
        let drafts = store.drafts();
        doomed = sessions.create(&ns_a).unwrap().id;
        survivor = sessions.create(&ns_a).unwrap().id;
        drafts
            .set(&doomed, &ns_a, "Doomed A", WallClock(NOW - 1_000))
            .unwrap();
        drafts
            .set(&doomed, &ns_b, "Doomed B", WallClock(NOW - 900))
            .unwrap();
        drafts
            .set(&survivor, &ns_a, "Survivor", WallClock(NOW - 800))
            .unwrap();
        assert!(sessions.delete(&doomed).unwrap());
    }

    let (store, _clock) = open_store(&temp);
    let drafts = store.drafts();
    assert_eq!(drafts.get(&doomed, &ns_a).unwrap(), None);
    assert_eq!(drafts.get(&doomed, &ns_b).unwrap(), None);
    assert_eq!(
        drafts.get(&survivor, &ns_a).unwrap().map(|d| d.text),
        Some("Survivor".to_string())
    );
}

#[test]
fn racing_writers_converge_on_highest_timestamp() {
    let temp = TempDir::new().unwrap();
    let (store, _clock) = open_store(&temp);
    let ns = NamespaceId::default();
    let session = store.sessions().create(&ns).unwrap().id;

    let mut handles = Vec::new();
    for offset in [3_000u64, 1_000, 2_500, 500, 2_000, 1_500] {
        let drafts = store.drafts();
        let session = session.clone();
        let ns = ns.clone();
        handles.push(std::thread::spawn(move || {
            drafts
                .set(
                    &session,
                    &ns,
                    &format!("draft-{offset}"),
                    WallClock(NOW - offset),
                )
                .unwrap();
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    // Whatever order the threads ran in, the highest stamp holds the register.
    let stored = store.drafts().get(&session, &ns).unwrap().unwrap();
    assert_eq!(stored, Draft::new("draft-500", WallClock(NOW - 500)));
}

#[test]
fn rejected_write_leaves_no_trace() {
    let temp = TempDir::new().unwrap();
    let (store, _clock) = open_store(&temp);
    let ns = NamespaceId::default();
    let session = store.sessions().create(&ns).unwrap().id;
    let drafts = store.drafts();

    let kept = drafts
        .set(&session, &ns, "Kept", WallClock(NOW - 1_000))
        .unwrap();
    drafts
        .set(&session, &ns, "Discarded", WallClock(NOW - 5_000))
        .unwrap();

    let stored = drafts.get(&session, &ns).unwrap().unwrap();
    assert_eq!(stored, kept);
}

#[test]
fn unknown_session_write_is_a_typed_error() {
    let temp = TempDir::new().unwrap();
    let (store, _clock) = open_store(&temp);
    let ns = NamespaceId::default();
    let ghost = SessionId::parse("ghost").unwrap();

    let err = store
        .drafts()
        .set(&ghost, &ns, "Orphan", WallClock(NOW - 1_000))
        .unwrap_err();
    assert!(matches!(err, StoreError::UnknownSession { .. }));
    assert_eq!(store.drafts().get(&ghost, &ns).unwrap(), None);
}

#[test]
fn open_at_honors_config() {
    let temp = TempDir::new().unwrap();
    let config = Config::default();
    let store = Store::open_at(temp.path(), &config).unwrap();
    assert_eq!(store.durability_mode(), DurabilityMode::Durable);

    let ns = NamespaceId::default();
    let session = store.sessions().create(&ns).unwrap().id;
    let stored = store
        .drafts()
        .set(&session, &ns, "Configured", WallClock::now())
        .unwrap();
    assert_eq!(stored.text, "Configured");
}
