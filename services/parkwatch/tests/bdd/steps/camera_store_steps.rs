//! BDD step definitions for the camera status cache

use std::sync::Arc;
use std::time::Duration;

use cucumber::{given, then, when};

use parkwatch::camera_store::{CacheState, ConnectionStatus};
use parkwatch::error::FALLBACK_FAILURE_MESSAGE;
use parkwatch::FetchFailure;

use crate::world::{command_reply, status_reply, ParkwatchWorld, Reply};

fn parse_connection(s: &str) -> bool {
    match s {
        "connected" => true,
        "disconnected" => false,
        other => panic!("Unknown connection state: {}", other),
    }
}

#[given(expr = "a staleness window of {int} milliseconds")]
fn staleness_window(world: &mut ParkwatchWorld, millis: u64) {
    world.staleness_window = Some(Duration::from_millis(millis));
}

#[given(expr = "a request timeout of {int} milliseconds")]
fn request_timeout(world: &mut ParkwatchWorld, millis: u64) {
    world.request_timeout = Some(Duration::from_millis(millis));
}

#[given(expr = "the camera board reports the camera {word}")]
fn board_reports(world: &mut ParkwatchWorld, state: String) {
    world.board().queue_status(status_reply(parse_connection(&state)));
}

#[given("the camera board is unreachable")]
fn board_unreachable(world: &mut ParkwatchWorld) {
    world
        .board()
        .queue_status(Reply::Refuse("connection refused".to_string()));
}

#[given("the camera board never answers")]
fn board_hangs(world: &mut ParkwatchWorld) {
    world.board().queue_status(Reply::Hang);
}

#[given(expr = "the camera board answers status requests after {int} milliseconds")]
fn board_is_slow(world: &mut ParkwatchWorld, millis: u64) {
    *world.board().status_delay.lock().unwrap() = Duration::from_millis(millis);
}

#[given(expr = "the camera board accepts toggles with message {string}")]
fn board_accepts_toggle(world: &mut ParkwatchWorld, msg: String) {
    world.board().queue_toggle(command_reply(200, &msg));
}

#[given(expr = "the camera board rejects toggles with code {int} and message {string}")]
fn board_rejects_toggle(world: &mut ParkwatchWorld, code: i32, msg: String) {
    world.board().queue_toggle(command_reply(code, &msg));
}

#[given("the camera board drops toggle requests")]
fn board_drops_toggle(world: &mut ParkwatchWorld) {
    world
        .board()
        .queue_toggle(Reply::Refuse("connection reset".to_string()));
}

async fn load_status(world: &mut ParkwatchWorld) {
    let view = world.store().get_status().await;
    world.views.push(view);
}

#[given("the cached status has been loaded")]
async fn status_loaded(world: &mut ParkwatchWorld) {
    load_status(world).await;
}

#[when("the camera status is requested")]
async fn request_status(world: &mut ParkwatchWorld) {
    load_status(world).await;
}

#[when("the cached status ages past the staleness window")]
async fn age_past_window(world: &mut ParkwatchWorld) {
    let window = world.staleness_window.unwrap_or(Duration::from_millis(200));
    tokio::time::sleep(window + Duration::from_millis(50)).await;
}

#[when(expr = "{int} callers refresh the camera status at once")]
async fn concurrent_refresh(world: &mut ParkwatchWorld, callers: usize) {
    let store = world.store();
    let handles: Vec<_> = (0..callers)
        .map(|_| {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.refresh().await })
        })
        .collect();
    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        results.push(handle.await.expect("refresh task panicked"));
    }
    world.refresh_results = results;
}

#[when("the camera is toggled to connect")]
async fn toggle_connect(world: &mut ParkwatchWorld) {
    world.toggle_result = Some(world.store().toggle(true).await);
}

#[when("the camera is toggled to disconnect")]
async fn toggle_disconnect(world: &mut ParkwatchWorld) {
    world.toggle_result = Some(world.store().toggle(false).await);
}

#[then(expr = "the status should read {string}")]
fn status_reads(world: &mut ParkwatchWorld, expected: String) {
    let view = world.views.last().expect("no status requested");
    assert_eq!(view.status.to_string(), expected);
    let expected_connected = view.status == ConnectionStatus::Online;
    assert_eq!(view.connected, expected_connected);
    assert_eq!(view.online_cameras, u32::from(expected_connected));
    assert_eq!(view.total_cameras, 1);
}

#[then(expr = "the camera board should have been asked for status {int} time(s)")]
fn status_call_count(world: &mut ParkwatchWorld, expected: usize) {
    assert_eq!(world.board().status_count(), expected);
}

#[then(expr = "the camera board should have been asked to toggle {int} time(s)")]
fn toggle_call_count(world: &mut ParkwatchWorld, expected: usize) {
    assert_eq!(world.board().toggle_count(), expected);
}

#[then("the cache should be fresh")]
async fn cache_is_fresh(world: &mut ParkwatchWorld) {
    assert_eq!(world.store().cache_state().await, CacheState::Fresh);
}

#[then("the cache should be empty")]
async fn cache_is_empty(world: &mut ParkwatchWorld) {
    assert_eq!(world.store().cache_state().await, CacheState::Empty);
}

#[then("every caller should see the same outcome")]
fn same_outcome(world: &mut ParkwatchWorld) {
    let first = world.refresh_results.first().expect("no refreshes ran");
    assert!(world.refresh_results.iter().all(|r| r == first));
}

#[then("every caller should see a success")]
fn all_succeeded(world: &mut ParkwatchWorld) {
    assert!(!world.refresh_results.is_empty());
    assert!(world.refresh_results.iter().all(Result::is_ok));
}

#[then("the refresh should fail with a timeout")]
fn refresh_timed_out(world: &mut ParkwatchWorld) {
    let result = world.refresh_results.last().expect("no refreshes ran");
    assert!(
        matches!(result, Err(FetchFailure::Timeout(_))),
        "expected timeout, got {:?}",
        result
    );
}

#[then(expr = "the toggle should succeed with message {string}")]
fn toggle_succeeded(world: &mut ParkwatchWorld, expected: String) {
    match world.toggle_result.as_ref().expect("no toggle attempted") {
        Ok(message) => assert_eq!(message, &expected),
        Err(failure) => panic!("toggle failed: {}", failure),
    }
}

fn assert_toggle_failed(world: &ParkwatchWorld, expected: &str) {
    match world.toggle_result.as_ref().expect("no toggle attempted") {
        Ok(message) => panic!("toggle unexpectedly succeeded: {}", message),
        Err(failure) => assert_eq!(failure.message(), expected),
    }
}

#[then(expr = "the toggle should fail with message {string}")]
fn toggle_failed(world: &mut ParkwatchWorld, expected: String) {
    assert_toggle_failed(world, &expected);
}

#[then("the toggle should fail with the fallback message")]
fn toggle_failed_with_fallback(world: &mut ParkwatchWorld) {
    assert_toggle_failed(world, FALLBACK_FAILURE_MESSAGE);
}
