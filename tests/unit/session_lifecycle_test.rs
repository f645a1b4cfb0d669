//! Unit tests for saved sessions: snapshotting, autosave, restore and the
//! async runtime loop that drives the coalescing queues.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;

use tabkeeper::host::{SimulatedHost, TabEvent};
use tabkeeper::runtime;
use tabkeeper::store::{keys, MemoryStore};
use tabkeeper::types::item::GroupColor;
use tabkeeper::types::session::RestoreOutcome;
use tabkeeper::types::tab::{TabId, WindowId};
use tabkeeper::{Engine, EngineConfig};

type TestEngine = Engine<MemoryStore, SimulatedHost>;

fn ids(v: &[i64]) -> Vec<TabId> {
    v.iter().map(|i| TabId(*i)).collect()
}

fn url(i: i64) -> String {
    format!("https://site{}.example", i)
}

fn setup(n: usize) -> TestEngine {
    let mut host = SimulatedHost::new(WindowId(1));
    for i in 0..n {
        host.open_tab(&url(i as i64 + 1), None);
    }
    host.drain_events();
    let mut engine = Engine::new(MemoryStore::new(), host, EngineConfig::default());
    engine.startup().unwrap();
    engine
}

fn pump(engine: &mut TestEngine, now: Instant) {
    for event in engine.host_mut().drain_events() {
        engine.handle_event(event, now).unwrap();
    }
}

/// Saves a session from `tabs`, then closes them so only the session remains.
fn saved_and_closed(engine: &mut TestEngine, tabs: &[i64]) -> String {
    let group_id = engine.create_group(&ids(tabs), "Research").unwrap().unwrap();
    let session_id = engine.save_session(&group_id).unwrap().unwrap();
    engine.close_group(&group_id).unwrap();
    let now = Instant::now();
    pump(engine, now);
    engine.flush_all(now).unwrap();
    session_id
}

// ─── Saving ───

#[test]
fn test_save_session_snapshots_group_and_links_it() {
    let mut engine = setup(3);
    let group_id = engine.create_group(&ids(&[1, 2]), "Work").unwrap().unwrap();
    engine.set_custom_name(TabId(2), "Docs").unwrap();

    let session_id = engine.save_session(&group_id).unwrap().unwrap();

    let session = &engine.sessions()[0];
    assert_eq!(session.id, session_id);
    assert_eq!(session.name, "Work");
    assert_eq!(session.tabs.len(), 2);
    assert_eq!(session.tabs[0].url, url(1));
    assert_eq!(session.tabs[1].custom_name.as_deref(), Some("Docs"));
    assert_eq!(
        engine.model().group(&group_id).unwrap().linked_session_id.as_deref(),
        Some(session_id.as_str())
    );
    assert!(engine.store().raw(keys::SAVED_SESSIONS).is_some());
}

#[test]
fn test_save_session_again_overwrites_same_session() {
    let mut engine = setup(2);
    let group_id = engine.create_group(&ids(&[1, 2]), "Work").unwrap().unwrap();
    let first = engine.save_session(&group_id).unwrap().unwrap();
    engine.ungroup_tab(TabId(2), &group_id).unwrap();

    let second = engine.save_session(&group_id).unwrap().unwrap();

    assert_eq!(first, second);
    assert_eq!(engine.sessions().len(), 1);
    assert_eq!(engine.sessions()[0].tabs.len(), 1);
}

#[test]
fn test_save_session_for_missing_group() {
    let mut engine = setup(1);
    assert!(engine.save_session("nope").unwrap().is_none());
    assert!(engine.sessions().is_empty());
}

#[test]
fn test_rename_and_delete_session() {
    let mut engine = setup(2);
    let group_id = engine.create_group(&ids(&[1]), "Work").unwrap().unwrap();
    let session_id = engine.save_session(&group_id).unwrap().unwrap();

    assert!(engine.rename_session(&session_id, "Archive").unwrap());
    assert!(!engine.rename_session(&session_id, "  ").unwrap());
    assert_eq!(engine.sessions()[0].name, "Archive");

    assert!(engine.delete_session(&session_id).unwrap());
    assert!(!engine.delete_session(&session_id).unwrap());
    assert!(engine.model().group(&group_id).unwrap().linked_session_id.is_none());
}

// ─── Autosave ───

#[test]
fn test_enabling_autosave_saves_immediately() {
    let mut engine = setup(2);
    let group_id = engine.create_group(&ids(&[1, 2]), "Work").unwrap().unwrap();

    assert!(engine.set_group_auto_save(&group_id, true).unwrap());

    let group = engine.model().group(&group_id).unwrap();
    assert!(group.autosaves());
    assert_eq!(engine.sessions().len(), 1);
    assert!(engine.sessions()[0].auto_save);
}

#[test]
fn test_autosave_is_debounced() {
    let mut engine = setup(2);
    let group_id = engine.create_group(&ids(&[1, 2]), "Work").unwrap().unwrap();
    engine.set_group_auto_save(&group_id, true).unwrap();
    let writes = engine.store().write_count();
    let t0 = Instant::now();

    engine.host_mut().navigate(TabId(1), "https://a.example", "A");
    pump(&mut engine, t0);
    engine.host_mut().navigate(TabId(1), "https://b.example", "B");
    pump(&mut engine, t0 + Duration::from_millis(300));

    let report = engine.flush_due(t0 + Duration::from_millis(799)).unwrap();
    assert_eq!(report.autosaved_groups, 0);

    let report = engine.flush_due(t0 + Duration::from_millis(800)).unwrap();
    assert_eq!(report.autosaved_groups, 1);
    assert_eq!(engine.store().write_count(), writes + 1);
    assert_eq!(engine.sessions()[0].tabs[0].url, "https://b.example");
    assert_eq!(engine.sessions()[0].tabs[0].title, "B");
}

#[test]
fn test_autosave_follows_removals_and_renames() {
    let mut engine = setup(3);
    let group_id = engine.create_group(&ids(&[1, 2, 3]), "Work").unwrap().unwrap();
    engine.set_group_auto_save(&group_id, true).unwrap();

    engine.rename_group(&group_id, "Renamed").unwrap();
    engine.host_mut().close_tab(TabId(3));
    let now = Instant::now();
    pump(&mut engine, now);
    engine.flush_all(now).unwrap();

    let session = &engine.sessions()[0];
    assert_eq!(session.name, "Renamed");
    assert_eq!(session.tabs.len(), 2);
}

#[test]
fn test_autosave_stops_after_session_deleted() {
    let mut engine = setup(2);
    let group_id = engine.create_group(&ids(&[1, 2]), "Work").unwrap().unwrap();
    engine.set_group_auto_save(&group_id, true).unwrap();
    let session_id = engine.sessions()[0].id.clone();
    let t0 = Instant::now();

    // queued before the delete
    engine.host_mut().navigate(TabId(1), "https://a.example", "A");
    pump(&mut engine, t0);
    engine.delete_session(&session_id).unwrap();

    let report = engine.flush_due(t0 + Duration::from_millis(500)).unwrap();
    assert_eq!(report.autosaved_groups, 0);
    assert!(engine.sessions().is_empty());

    // and nothing is queued afterwards
    engine.host_mut().navigate(TabId(2), "https://b.example", "B");
    pump(&mut engine, t0 + Duration::from_millis(600));
    assert!(engine.next_deadline().is_none());
}

#[test]
fn test_groups_without_autosave_never_queue() {
    let mut engine = setup(2);
    let group_id = engine.create_group(&ids(&[1, 2]), "Work").unwrap().unwrap();
    engine.save_session(&group_id).unwrap();

    engine.host_mut().navigate(TabId(1), "https://a.example", "A");
    pump(&mut engine, Instant::now());

    assert!(engine.next_deadline().is_none());
}

// ─── Restore ───

#[tokio::test(start_paused = true)]
async fn test_restore_builds_linked_group() {
    let mut engine = setup(3);
    engine.set_custom_name(TabId(2), "Second").unwrap();
    let session_id = saved_and_closed(&mut engine, &[1, 2]);

    let outcome = engine.restore_session(&session_id).await.unwrap().unwrap();

    let RestoreOutcome::Restored { group_id, created, failed } = outcome else {
        panic!("expected a restored group");
    };
    assert_eq!((created, failed), (2, 0));
    let group = engine.model().group(&group_id).unwrap();
    assert_eq!(group.name, "Research");
    assert_eq!(group.tabs, ids(&[4, 5]));
    assert_eq!(group.linked_session_id.as_deref(), Some(session_id.as_str()));
    assert_eq!(engine.model().flatten(), ids(&[3, 4, 5]));
    assert_eq!(engine.custom_names().get(&TabId(5)).map(String::as_str), Some("Second"));
}

#[tokio::test(start_paused = true)]
async fn test_pending_restore_prevents_double_insert() {
    let mut engine = setup(2);
    let session_id = saved_and_closed(&mut engine, &[1, 2]);

    engine.restore_session(&session_id).await.unwrap();
    assert!(engine.is_pending_restore(TabId(3)));
    assert!(engine.is_pending_restore(TabId(4)));

    pump(&mut engine, Instant::now());

    assert!(!engine.is_pending_restore(TabId(3)));
    assert_eq!(engine.model().flatten(), ids(&[3, 4]));
    assert_eq!(engine.model().items().len(), 1);
    assert!(engine.model().is_consistent());
}

#[tokio::test(start_paused = true)]
async fn test_restore_of_open_session_focuses_existing_group() {
    let mut engine = setup(2);
    let session_id = saved_and_closed(&mut engine, &[1, 2]);
    let Some(RestoreOutcome::Restored { group_id, .. }) = engine.restore_session(&session_id).await.unwrap() else {
        panic!("first restore should create a group");
    };
    pump(&mut engine, Instant::now());
    let created = engine.host().created_count();

    let again = engine.restore_session(&session_id).await.unwrap();

    assert_eq!(again, Some(RestoreOutcome::Focused { group_id: group_id.clone() }));
    assert_eq!(engine.host().created_count(), created);
    assert_eq!(engine.host().activated().last(), Some(&TabId(3)));
    assert_eq!(engine.host().focused_windows(), &[WindowId(1)]);
    assert_eq!(engine.model().groups().count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_restore_while_linked_group_is_closing() {
    let mut engine = setup(3);
    let group_id = engine.create_group(&ids(&[1, 2]), "Research").unwrap().unwrap();
    let session_id = engine.save_session(&group_id).unwrap().unwrap();
    engine.close_group(&group_id).unwrap();
    // removals are queued but not yet applied
    pump(&mut engine, Instant::now());
    assert!(engine.model().group(&group_id).is_some());

    let outcome = engine.restore_session(&session_id).await.unwrap().unwrap();

    let RestoreOutcome::Restored { group_id: restored, created, failed } = outcome else {
        panic!("expected a restored group");
    };
    assert_eq!((created, failed), (2, 0));
    assert!(engine.host().activated().is_empty());

    let now = Instant::now();
    pump(&mut engine, now);
    engine.flush_all(now).unwrap();
    assert_eq!(engine.model().flatten(), ids(&[3, 4, 5]));
    assert_eq!(engine.model().groups().count(), 1);
    assert_eq!(engine.model().group_linked_to(&session_id).unwrap().id, restored);
}

#[tokio::test(start_paused = true)]
async fn test_restore_when_host_already_dropped_linked_tabs() {
    let mut engine = setup(2);
    let group_id = engine.create_group(&ids(&[1, 2]), "Research").unwrap().unwrap();
    let session_id = engine.save_session(&group_id).unwrap().unwrap();
    // closed on the host, removal events not delivered yet
    engine.host_mut().close_tab(TabId(1));
    engine.host_mut().close_tab(TabId(2));

    assert!(!engine.focus_group(&group_id).unwrap());
    let outcome = engine.restore_session(&session_id).await.unwrap().unwrap();

    assert!(matches!(outcome, RestoreOutcome::Restored { created: 2, .. }));
    let now = Instant::now();
    pump(&mut engine, now);
    engine.flush_all(now).unwrap();
    assert_eq!(engine.model().flatten(), ids(&[3, 4]));
    assert!(engine.model().is_consistent());
}

#[tokio::test(start_paused = true)]
async fn test_restore_skips_failed_tabs() {
    let mut engine = setup(3);
    let session_id = saved_and_closed(&mut engine, &[1, 2, 3]);
    engine.host_mut().fail_url(&url(2));

    let outcome = engine.restore_session(&session_id).await.unwrap().unwrap();

    let RestoreOutcome::Restored { group_id, created, failed } = outcome else {
        panic!("expected a restored group");
    };
    assert_eq!((created, failed), (2, 1));
    assert_eq!(engine.model().group(&group_id).unwrap().tabs, ids(&[4, 5]));
}

#[tokio::test(start_paused = true)]
async fn test_restore_with_every_tab_failing_builds_nothing() {
    let mut engine = setup(1);
    let session_id = saved_and_closed(&mut engine, &[1]);
    engine.host_mut().fail_url(&url(1));

    let outcome = engine.restore_session(&session_id).await.unwrap();

    assert_eq!(outcome, Some(RestoreOutcome::NothingRestored { failed: 1 }));
    assert!(engine.model().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_restore_unknown_session() {
    let mut engine = setup(1);
    assert!(engine.restore_session("missing").await.unwrap().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_restore_creates_tabs_in_batches() {
    let mut engine = setup(12);
    let session_id = saved_and_closed(&mut engine, &(1..=12).collect::<Vec<_>>());
    let start = Instant::now();

    engine.restore_session(&session_id).await.unwrap();

    // 12 tabs in batches of 5: two pauses
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(200), "elapsed {:?}", elapsed);
    assert!(elapsed < Duration::from_millis(300), "elapsed {:?}", elapsed);
    assert_eq!(engine.host().created_count(), 12);
}

#[tokio::test(start_paused = true)]
async fn test_restore_places_group_at_top_when_configured() {
    let mut engine = setup(3);
    engine
        .set_setting("newTabPosition", serde_json::json!("top"))
        .unwrap();
    let session_id = saved_and_closed(&mut engine, &[2]);
    let color = engine.sessions()[0].color;

    engine.restore_session(&session_id).await.unwrap();

    let first = engine.model().items()[0].as_group().unwrap();
    assert_eq!(first.tabs, ids(&[4]));
    assert_eq!(first.color, color);
    assert_eq!(color, GroupColor::Grey);
}

// ─── Runtime loop ───

#[tokio::test(start_paused = true)]
async fn test_runtime_flushes_each_quiet_burst() {
    let mut engine = setup(6);
    let (tx, rx) = mpsc::channel(16);

    let producer = async move {
        for id in [2, 3] {
            tx.send(TabEvent::Removed { tab_id: TabId(id), window_id: WindowId(1) })
                .await
                .unwrap();
        }
        tokio::time::sleep(Duration::from_millis(60)).await;
        tx.send(TabEvent::Removed { tab_id: TabId(4), window_id: WindowId(1) })
            .await
            .unwrap();
    };

    tokio::join!(runtime::run(&mut engine, rx), producer);

    assert_eq!(engine.removal_passes(), 2);
    assert_eq!(engine.model().flatten(), ids(&[1, 5, 6]));
}

#[tokio::test(start_paused = true)]
async fn test_runtime_flushes_on_close() {
    let mut engine = setup(6);
    let writes = engine.store().write_count();
    let (tx, rx) = mpsc::channel(16);

    for id in 1..=5 {
        tx.send(TabEvent::Removed { tab_id: TabId(id), window_id: WindowId(1) })
            .await
            .unwrap();
    }
    drop(tx);
    runtime::run(&mut engine, rx).await;

    assert_eq!(engine.removal_passes(), 1);
    assert_eq!(engine.store().write_count(), writes + 1);
    assert_eq!(engine.model().flatten(), ids(&[6]));
}
