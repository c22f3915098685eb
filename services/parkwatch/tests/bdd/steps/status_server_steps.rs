//! BDD step definitions for the JSON status server

use axum::body::Body;
use axum::http::Request;
use cucumber::{then, when};
use tower::ServiceExt;

use parkwatch::dashboard::build_router;

use crate::world::ParkwatchWorld;

async fn send(world: &mut ParkwatchWorld, request: Request<Body>) {
    let app = build_router(world.store());
    let response = app.oneshot(request).await.unwrap();
    world.response_status = Some(response.status().as_u16());
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    world.response_json = serde_json::from_slice(&body).ok();
}

#[when(expr = "the status server receives GET {string}")]
async fn get_path(world: &mut ParkwatchWorld, path: String) {
    let request = Request::builder().uri(path).body(Body::empty()).unwrap();
    send(world, request).await;
}

#[when(expr = "the status server receives a toggle request with connect {word}")]
async fn post_toggle(world: &mut ParkwatchWorld, connect: String) {
    let request = Request::builder()
        .method("POST")
        .uri("/api/camera/toggle")
        .header("content-type", "application/json")
        .body(Body::from(format!(r#"{{"connect": {}}}"#, connect)))
        .unwrap();
    send(world, request).await;
}

#[then(expr = "the response status should be {int}")]
fn response_status(world: &mut ParkwatchWorld, expected: u16) {
    assert_eq!(world.response_status, Some(expected));
}

#[then(expr = "the response field {string} should be {string}")]
fn response_field(world: &mut ParkwatchWorld, field: String, expected: String) {
    let json = world.response_json.as_ref().expect("response was not JSON");
    let actual = match json.pointer(&field) {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => panic!("field {} missing from {}", field, json),
    };
    assert_eq!(actual, expected, "field {} of {}", field, json);
}
