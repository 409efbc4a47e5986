use super::*;
use chrono::{TimeZone, Utc};
use std::time::Duration;

use crate::server::scheduler::activity_poller::unseen_events;

fn ids(events: &[&ActivityEvent]) -> Vec<String> {
    events.iter().map(|event| event.id.clone()).collect()
}

fn strings(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|id| id.to_string()).collect()
}

/// Tests the seeding pass of a server without a cursor.
///
/// Verifies that only one entry is requested, nothing is posted, and the cursor is
/// persisted at the newest entry.
///
/// Expected: cursor {"sb4": "105"}, no notices
#[tokio::test]
async fn cold_start_seeds_without_emitting() {
    let harness = Harness::new();
    harness.feed.set("sb4", &["105", "104", "103"]);
    let mut poller = harness.poller(&["sb4"]);

    let summary = poller.run_pass(&CancellationToken::new()).await;

    assert_eq!(harness.feed.calls(), vec![("sb4".to_string(), 1)]);
    assert!(harness.sink.delivered_ids().is_empty());
    assert_eq!(summary.seeded, 1);
    assert_eq!(summary.emitted, 0);
    assert_eq!(poller.cursors().get("sb4"), Some(&Cursor::at("105")));
    assert_eq!(harness.persisted().get("sb4"), Some(&Cursor::at("105")));
}

/// Tests the worked example: seed, then a warm poll with two new entries.
///
/// Expected: 106 then 107 posted, cursor at 107
#[tokio::test]
async fn warm_poll_emits_new_entries_oldest_first() {
    let harness = Harness::new();
    let cancel = CancellationToken::new();
    harness.feed.set("sb4", &["105", "104", "103"]);
    let mut poller = harness.poller(&["sb4"]);
    poller.run_pass(&cancel).await;

    harness.feed.set("sb4", &["107", "106", "105", "104"]);
    let summary = poller.run_pass(&cancel).await;

    assert_eq!(
        harness.feed.calls(),
        vec![("sb4".to_string(), 1), ("sb4".to_string(), 50)]
    );
    assert_eq!(harness.sink.delivered_ids(), strings(&["106", "107"]));
    assert_eq!(summary.emitted, 2);
    assert_eq!(harness.persisted().get("sb4"), Some(&Cursor::at("107")));
}

/// Tests seeding against an empty feed.
///
/// Expected: no cursor, and the next pass seeds again
#[tokio::test]
async fn cold_start_with_empty_feed_stays_cursorless() {
    let harness = Harness::new();
    let cancel = CancellationToken::new();
    let mut poller = harness.poller(&["sb4"]);

    poller.run_pass(&cancel).await;
    assert!(poller.cursors().get("sb4").is_none());
    assert!(harness.persisted().is_empty());

    harness.feed.set("sb4", &["1"]);
    poller.run_pass(&cancel).await;

    assert_eq!(
        harness.feed.calls(),
        vec![("sb4".to_string(), 1), ("sb4".to_string(), 1)]
    );
    assert!(harness.sink.delivered_ids().is_empty());
    assert_eq!(harness.persisted().get("sb4"), Some(&Cursor::at("1")));
}

/// Tests a seeding fetch failure.
///
/// Expected: server stays cursor-less and is seeded on the next successful pass
#[tokio::test]
async fn cold_start_failure_retries_next_pass() {
    let harness = Harness::new();
    let cancel = CancellationToken::new();
    harness.feed.set("sb4", &["105"]);
    harness.feed.fail("sb4");
    let mut poller = harness.poller(&["sb4"]);

    let summary = poller.run_pass(&cancel).await;
    assert_eq!(summary.fetch_failures, 1);
    assert!(poller.cursors().get("sb4").is_none());

    harness.feed.recover("sb4");
    let summary = poller.run_pass(&cancel).await;
    assert_eq!(summary.seeded, 1);
    assert_eq!(poller.cursors().get("sb4"), Some(&Cursor::at("105")));
}

/// Tests that every entry is posted exactly once across growing snapshots.
///
/// Expected: all ids newer than the seed, each once, in feed order
#[tokio::test]
async fn no_duplicate_emission_across_passes() {
    let harness = Harness::new();
    let cancel = CancellationToken::new();
    let mut poller = harness.poller(&["sb4"]);

    let snapshots: [&[&str]; 5] = [
        &["3", "2", "1"],
        &["5", "4", "3", "2", "1"],
        &["5", "4", "3", "2", "1"],
        &["8", "7", "6", "5", "4", "3", "2", "1"],
        &["9", "8", "7", "6", "5", "4", "3", "2", "1"],
    ];
    for snapshot in snapshots {
        harness.feed.set("sb4", snapshot);
        poller.run_pass(&cancel).await;
    }

    assert_eq!(
        harness.sink.delivered_ids(),
        strings(&["4", "5", "6", "7", "8", "9"])
    );
    assert_eq!(harness.persisted().get("sb4"), Some(&Cursor::at("9")));
}

/// Tests a warm poll whose page no longer contains the cursor.
///
/// Verifies the best-effort behaviour: the whole page is posted, older entries in
/// the gap are not fetched, and no error is reported.
///
/// Expected: 203, 204, 205 posted, cursor at 205
#[tokio::test]
async fn gap_larger_than_page_emits_whole_page() {
    let harness = Harness::new().with_cursors(&[("sb4", "100")]);
    harness.feed.set("sb4", &["205", "204", "203", "202", "201"]);
    let mut poller = harness.poller(&["sb4"]).with_page_size(3);

    let summary = poller.run_pass(&CancellationToken::new()).await;

    assert_eq!(harness.feed.calls(), vec![("sb4".to_string(), 3)]);
    assert_eq!(harness.sink.delivered_ids(), strings(&["203", "204", "205"]));
    assert_eq!(summary.fetch_failures, 0);
    assert_eq!(harness.persisted().get("sb4"), Some(&Cursor::at("205")));
}

/// Tests a warm poll fetch failure.
///
/// Expected: no notices and the stored cursor untouched, then recovery from the same cursor
#[tokio::test]
async fn warm_fetch_failure_keeps_cursor() {
    let harness = Harness::new().with_cursors(&[("sb4", "105")]);
    let cancel = CancellationToken::new();
    harness.feed.set("sb4", &["106", "105"]);
    harness.feed.fail("sb4");
    let mut poller = harness.poller(&["sb4"]);

    let summary = poller.run_pass(&cancel).await;
    assert_eq!(summary.fetch_failures, 1);
    assert!(harness.sink.delivered_ids().is_empty());
    assert_eq!(harness.persisted().get("sb4"), Some(&Cursor::at("105")));

    harness.feed.recover("sb4");
    poller.run_pass(&cancel).await;
    assert_eq!(harness.sink.delivered_ids(), strings(&["106"]));
    assert_eq!(harness.persisted().get("sb4"), Some(&Cursor::at("106")));
}

/// Tests an empty page on a warm poll.
///
/// Expected: no-op, cursor unchanged
#[tokio::test]
async fn warm_poll_with_empty_page_is_noop() {
    let harness = Harness::new().with_cursors(&[("sb4", "105")]);
    let mut poller = harness.poller(&["sb4"]);

    let summary = poller.run_pass(&CancellationToken::new()).await;

    assert_eq!(summary, PassSummary { polled: 1, ..Default::default() });
    assert_eq!(poller.cursors().get("sb4"), Some(&Cursor::at("105")));
}

/// Tests a warm poll where the newest entry is the cursor itself.
///
/// Expected: Unchanged outcome and no notices
#[tokio::test]
async fn warm_poll_without_new_entries_is_unchanged() {
    let harness = Harness::new().with_cursors(&[("sb4", "105")]);
    harness.feed.set("sb4", &["105", "104"]);
    let mut poller = harness.poller(&["sb4"]);

    let outcome = poller
        .poll_server(&TrackedServer::from_identifier("sb4"), &CancellationToken::new())
        .await;

    assert_eq!(outcome, ServerOutcome::Unchanged);
    assert!(harness.sink.attempted_ids().is_empty());
}

/// Tests that a failed post does not block later posts or the cursor.
///
/// Expected: 107 posted after 106 failed, cursor at 107
#[tokio::test]
async fn delivery_failure_does_not_block_batch() {
    let harness = Harness::new().with_cursors(&[("sb4", "105")]);
    harness.feed.set("sb4", &["107", "106", "105"]);
    harness.sink.fail_on("106");
    let mut poller = harness.poller(&["sb4"]);

    let summary = poller.run_pass(&CancellationToken::new()).await;

    assert_eq!(harness.sink.attempted_ids(), strings(&["106", "107"]));
    assert_eq!(harness.sink.delivered_ids(), strings(&["107"]));
    assert_eq!(summary.emitted, 1);
    assert_eq!(summary.delivery_failures, 1);
    assert_eq!(harness.persisted().get("sb4"), Some(&Cursor::at("107")));
}

/// Tests that emission order follows feed position, not timestamps or id values.
///
/// Expected: entries posted in reverse page order
#[tokio::test]
async fn ordering_follows_feed_position() {
    let harness = Harness::new().with_cursors(&[("sb4", "c")]);
    let same_time = Utc.with_ymd_and_hms(2025, 11, 30, 18, 0, 0).unwrap();
    let page: Vec<ActivityEvent> = ["a", "z", "m", "c"]
        .iter()
        .map(|id| {
            let mut entry = event(id);
            entry.timestamp = Some(same_time);
            entry
        })
        .collect();
    harness.feed.set_events("sb4", page);
    let mut poller = harness.poller(&["sb4"]);

    poller.run_pass(&CancellationToken::new()).await;

    assert_eq!(harness.sink.delivered_ids(), strings(&["m", "z", "a"]));
    assert_eq!(harness.persisted().get("sb4"), Some(&Cursor::at("a")));
}

/// Tests that notices carry the tracked server's display name.
///
/// Expected: Server field equals the identifier used as display name
#[tokio::test]
async fn notices_use_tracked_server_name() {
    let harness = Harness::new().with_cursors(&[("atm10", "1")]);
    harness.feed.set("atm10", &["2", "1"]);
    let mut poller = harness.poller(&["atm10"]);

    poller.run_pass(&CancellationToken::new()).await;

    let delivered = harness.sink.delivered();
    assert_eq!(delivered.len(), 1);
    assert!(delivered[0]
        .fields
        .iter()
        .any(|field| field.name == "Server" && field.value == "atm10"));
}

/// Tests servers in mixed states during one pass.
///
/// Verifies that one server failing does not affect the others.
///
/// Expected: a seeded, b failed, c advanced
#[tokio::test]
async fn servers_are_independent_within_a_pass() {
    let harness = Harness::new().with_cursors(&[("b", "10"), ("c", "20")]);
    harness.feed.set("a", &["1"]);
    harness.feed.set("b", &["11", "10"]);
    harness.feed.fail("b");
    harness.feed.set("c", &["22", "21", "20"]);
    let mut poller = harness.poller(&["a", "b", "c"]);

    let summary = poller.run_pass(&CancellationToken::new()).await;

    assert_eq!(summary.polled, 3);
    assert_eq!(summary.seeded, 1);
    assert_eq!(summary.fetch_failures, 1);
    assert_eq!(summary.emitted, 2);
    assert_eq!(
        harness.feed.calls(),
        vec![
            ("a".to_string(), 1),
            ("b".to_string(), 50),
            ("c".to_string(), 50)
        ]
    );
    let persisted = harness.persisted();
    assert_eq!(persisted.get("a"), Some(&Cursor::at("1")));
    assert_eq!(persisted.get("b"), Some(&Cursor::at("10")));
    assert_eq!(persisted.get("c"), Some(&Cursor::at("22")));
}

/// Tests progress surviving an interrupted pass.
///
/// Shutdown fires while server B's fetch is in flight, after A's cursor has been
/// persisted. A restarted poller must resume from A's advanced cursor and B's prior
/// cursor, warm-polling both.
///
/// Expected: A at 12 on disk, B still at 50; restart posts only B's new entry
#[tokio::test]
async fn interrupted_pass_keeps_committed_progress() {
    let harness = Harness::new().with_cursors(&[("a", "10"), ("b", "50")]);
    let cancel = CancellationToken::new();
    harness.feed.set("a", &["12", "11", "10"]);
    harness.feed.set("b", &["51", "50"]);
    harness.feed.cancel_when_fetching("b", cancel.clone());
    let mut poller = harness.poller(&["a", "b"]);

    let summary = poller.run_pass(&cancel).await;

    assert!(summary.aborted);
    assert_eq!(harness.sink.delivered_ids(), strings(&["11", "12"]));
    let persisted = harness.persisted();
    assert_eq!(persisted.get("a"), Some(&Cursor::at("12")));
    assert_eq!(persisted.get("b"), Some(&Cursor::at("50")));
    drop(poller);

    let restarted = Harness {
        feed: Arc::new(ScriptedFeed::default()),
        sink: Arc::new(RecordingSink::default()),
        dir: harness.dir,
    };
    restarted.feed.set("a", &["12", "11", "10"]);
    restarted.feed.set("b", &["51", "50"]);
    let mut poller = restarted.poller(&["a", "b"]);

    poller.run_pass(&CancellationToken::new()).await;

    assert_eq!(
        restarted.feed.calls(),
        vec![("a".to_string(), 50), ("b".to_string(), 50)]
    );
    assert_eq!(restarted.sink.delivered_ids(), strings(&["51"]));
    assert_eq!(restarted.persisted().get("b"), Some(&Cursor::at("51")));
}

/// Tests that an unreachable channel skips the pass entirely.
///
/// Expected: no fetches, cursors untouched, aborted summary
#[tokio::test]
async fn unavailable_channel_skips_pass() {
    let harness = Harness::new().with_cursors(&[("sb4", "105")]);
    harness.feed.set("sb4", &["106", "105"]);
    harness.sink.set_unavailable(true);
    let mut poller = harness.poller(&["sb4"]);

    let summary = poller.run_pass(&CancellationToken::new()).await;

    assert!(summary.aborted);
    assert!(harness.feed.calls().is_empty());
    assert_eq!(harness.persisted().get("sb4"), Some(&Cursor::at("105")));

    harness.sink.set_unavailable(false);
    poller.run_pass(&CancellationToken::new()).await;
    assert_eq!(harness.sink.delivered_ids(), strings(&["106"]));
}

/// Tests that cursor writes keep unrelated state in the shared file.
///
/// Expected: foreign section still present after the poller persists
#[tokio::test]
async fn persisting_keeps_other_sections() {
    let harness = Harness::new();
    let path = harness.dir.path().join("state.json");
    std::fs::write(&path, r#"{"applications":{"open":true}}"#).unwrap();
    harness.feed.set("sb4", &["105"]);
    let mut poller = harness.poller(&["sb4"]);

    poller.run_pass(&CancellationToken::new()).await;

    let document: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(document["applications"]["open"], serde_json::json!(true));
    assert_eq!(
        document["pterodactyl"]["servers"]["sb4"]["last_id"],
        serde_json::json!("105")
    );
}

/// Tests the driver with no tracked servers.
///
/// Expected: returns at once without fetching
#[tokio::test]
async fn run_without_servers_disables_itself() {
    let harness = Harness::new();
    let mut poller = harness.poller(&[]);

    tokio::time::timeout(Duration::from_secs(1), poller.run(&CancellationToken::new()))
        .await
        .expect("poller should return immediately");

    assert!(harness.feed.calls().is_empty());
}

/// Tests that a cancelled token stops the loop before the first pass.
///
/// Expected: no fetches
#[tokio::test]
async fn run_honours_cancellation_before_first_tick() {
    let harness = Harness::new();
    harness.feed.set("sb4", &["1"]);
    let cancel = CancellationToken::new();
    cancel.cancel();
    let mut poller = harness.poller(&["sb4"]);

    poller.run(&cancel).await;

    assert!(harness.feed.calls().is_empty());
}

/// Tests the polling cadence.
///
/// Verifies that a pass runs immediately and then once per interval until cancelled.
///
/// Expected: passes at 0s, 30s and 60s
#[tokio::test(start_paused = true)]
async fn run_polls_on_interval_until_cancelled() {
    let harness = Harness::new();
    harness.feed.set("sb4", &["1"]);
    let cancel = CancellationToken::new();
    let mut poller = harness
        .poller(&["sb4"])
        .with_interval(Duration::from_secs(30));

    let task_cancel = cancel.clone();
    let handle = tokio::spawn(async move {
        poller.run(&task_cancel).await;
        poller
    });

    tokio::time::sleep(Duration::from_secs(65)).await;
    cancel.cancel();
    let poller = handle.await.unwrap();

    assert_eq!(
        harness.feed.calls(),
        vec![
            ("sb4".to_string(), 1),
            ("sb4".to_string(), 50),
            ("sb4".to_string(), 50)
        ]
    );
    assert_eq!(poller.cursors().get("sb4"), Some(&Cursor::at("1")));
}

#[test]
fn unseen_events_stop_at_cursor_exclusive() {
    let page: Vec<ActivityEvent> = ["107", "106", "105", "104"]
        .iter()
        .map(|id| event(id))
        .collect();
    assert_eq!(ids(&unseen_events(&page, "105")), strings(&["106", "107"]));
    assert!(unseen_events(&page, "107").is_empty());
}

#[test]
fn unseen_events_without_cursor_match_returns_all() {
    let page: Vec<ActivityEvent> = ["3", "2", "1"].iter().map(|id| event(id)).collect();
    assert_eq!(ids(&unseen_events(&page, "99")), strings(&["1", "2", "3"]));
    assert!(unseen_events(&[], "99").is_empty());
}
