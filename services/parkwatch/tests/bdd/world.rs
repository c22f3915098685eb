//! BDD test world for parkwatch

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use cucumber::World;
use parkwatch::camera_store::{CameraStatusView, CameraStore};
use parkwatch::client::CameraClient;
use parkwatch::io::{HttpClient, HttpResponse};
use parkwatch::{FetchFailure, ParkwatchError};

/// One scripted reply from the camera board
#[derive(Debug, Clone)]
pub enum Reply {
    Respond(HttpResponse),
    Refuse(String),
    Hang,
}

/// Camera board stand-in that plays back queued replies
#[derive(Debug, Default)]
pub struct ScriptedBoard {
    pub status_replies: Mutex<VecDeque<Reply>>,
    pub toggle_replies: Mutex<VecDeque<Reply>>,
    pub status_calls: AtomicUsize,
    pub toggle_calls: AtomicUsize,
    pub status_delay: Mutex<Duration>,
}

impl ScriptedBoard {
    pub fn queue_status(&self, reply: Reply) {
        self.status_replies.lock().unwrap().push_back(reply);
    }

    pub fn queue_toggle(&self, reply: Reply) {
        self.toggle_replies.lock().unwrap().push_back(reply);
    }

    pub fn status_count(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn toggle_count(&self) -> usize {
        self.toggle_calls.load(Ordering::SeqCst)
    }

    async fn play(reply: Option<Reply>, delay: Duration) -> parkwatch::Result<HttpResponse> {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        match reply {
            Some(Reply::Respond(response)) => Ok(response),
            Some(Reply::Refuse(msg)) => Err(ParkwatchError::Http(msg)),
            Some(Reply::Hang) => std::future::pending().await,
            None => Err(ParkwatchError::Http("no scripted reply".to_string())),
        }
    }
}

#[async_trait::async_trait]
impl HttpClient for ScriptedBoard {
    async fn get(&self, _url: &str, _query: &[(&str, &str)]) -> parkwatch::Result<HttpResponse> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let reply = self.status_replies.lock().unwrap().pop_front();
        let delay = *self.status_delay.lock().unwrap();
        Self::play(reply, delay).await
    }

    async fn post_json(&self, _url: &str, _body: &str) -> parkwatch::Result<HttpResponse> {
        self.toggle_calls.fetch_add(1, Ordering::SeqCst);
        let reply = self.toggle_replies.lock().unwrap().pop_front();
        Self::play(reply, Duration::ZERO).await
    }

    async fn put_json(&self, url: &str, _body: &str) -> parkwatch::Result<HttpResponse> {
        Err(ParkwatchError::Http(format!("unexpected PUT {}", url)))
    }

    async fn delete(&self, url: &str) -> parkwatch::Result<HttpResponse> {
        Err(ParkwatchError::Http(format!("unexpected DELETE {}", url)))
    }
}

#[derive(Debug, Default, World)]
pub struct ParkwatchWorld {
    // Confidence formatting
    pub confidence_input: Option<f64>,
    pub formatted_confidence: Option<String>,
    pub confidence_tier: Option<String>,

    // Camera store
    pub board: Option<Arc<ScriptedBoard>>,
    pub store: Option<Arc<CameraStore>>,
    pub staleness_window: Option<Duration>,
    pub request_timeout: Option<Duration>,
    pub views: Vec<CameraStatusView>,
    pub refresh_results: Vec<Result<(), FetchFailure>>,
    pub toggle_result: Option<Result<String, FetchFailure>>,

    // Status server
    pub response_status: Option<u16>,
    pub response_json: Option<serde_json::Value>,
}

impl ParkwatchWorld {
    pub fn board(&mut self) -> Arc<ScriptedBoard> {
        Arc::clone(self.board.get_or_insert_with(Default::default))
    }

    /// The store under test, built on first use over the scripted board
    pub fn store(&mut self) -> Arc<CameraStore> {
        if let Some(store) = &self.store {
            return Arc::clone(store);
        }
        let board: Arc<dyn HttpClient> = self.board();
        let store = Arc::new(CameraStore::new(
            CameraClient::new("http://board:5050", board),
            self.staleness_window.unwrap_or(Duration::from_millis(200)),
            self.request_timeout.unwrap_or(Duration::from_secs(2)),
        ));
        self.store = Some(Arc::clone(&store));
        store
    }
}

/// Status body the board sends for a single camera
pub fn status_reply(connected: bool) -> Reply {
    Reply::Respond(HttpResponse::text(
        200,
        format!(
            r#"{{"code": 200, "msg": "ok", "data": {{
                "camera": {{"id": 1, "serial": "CAM-001", "interfaceType": "USB",
                           "connected": {connected}, "lastUpdated": "2026-10-17T09:00:00"}},
                "streamUrl": "http://board:5050/stream"}}}}"#
        ),
    ))
}

/// Envelope the board sends back for a command
pub fn command_reply(code: i32, msg: &str) -> Reply {
    Reply::Respond(HttpResponse::text(
        200,
        serde_json::json!({ "code": code, "msg": msg }).to_string(),
    ))
}
