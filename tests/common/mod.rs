//! Shared test utilities: a fake PostgREST table and game wiring helpers

#![allow(dead_code)]

use std::io::Read;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use serde_json::{json, Map, Value};
use tiny_http::{Header, Response, Server};

use expgacha::config::Config;
use expgacha::distribution::{uniform_for_score, ScriptedSource};
use expgacha::leaderboard::RankingTable;
use expgacha::store::{SqliteStore, StateStore};
use expgacha::GameContext;

/// One request as the fake server saw it
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn json_body(&self) -> Value {
        serde_json::from_str(&self.body).expect("request body is not JSON")
    }
}

#[derive(Default)]
struct FakeState {
    rows: Vec<Value>,
    next_id: i64,
    requests: Vec<RecordedRequest>,
    /// Answer every request with this status
    fail_with: Option<u16>,
    /// Accept inserts but echo no rows, like a row-level policy
    swallow_inserts: bool,
    /// Answer reads with 200 and this body, and counts with a broken Content-Range
    malformed_body: Option<Value>,
}

/// Minimal PostgREST table on a local port.
///
/// Understands just the filters the client sends: `client_token=eq.X`,
/// `score=gt.N`, `order=score.desc` and `limit=N`.
pub struct FakePostgrest {
    pub base_url: String,
    pub table: String,
    state: Arc<Mutex<FakeState>>,
    server: Arc<Server>,
    handle: Option<JoinHandle<()>>,
}

impl FakePostgrest {
    pub fn start(table: &str) -> Self {
        let server = Arc::new(Server::http("127.0.0.1:0").expect("Failed to bind fake server"));
        let addr = server
            .server_addr()
            .to_ip()
            .expect("Fake server is not on an IP socket");
        let state = Arc::new(Mutex::new(FakeState::default()));

        let handle = {
            let server = Arc::clone(&server);
            let state = Arc::clone(&state);
            let prefix = format!("/rest/v1/{}", table);
            thread::spawn(move || {
                for request in server.incoming_requests() {
                    handle_request(&state, &prefix, request);
                }
            })
        };

        Self {
            base_url: format!("http://{}", addr),
            table: table.to_string(),
            state,
            server,
            handle: Some(handle),
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    pub fn last_request(&self) -> RecordedRequest {
        self.requests().pop().expect("No request recorded")
    }

    pub fn rows(&self) -> Vec<Value> {
        self.lock().rows.clone()
    }

    pub fn push_row(&self, token: &str, username: &str, score: i64) {
        let mut state = self.lock();
        state.next_id += 1;
        let id = state.next_id;
        state.rows.push(json!({
            "id": id,
            "client_token": token,
            "username": username,
            "score": score,
            "created_at": "2024-05-01T09:30:00+00:00",
            "attempt_count": 3,
        }));
    }

    pub fn fail_with(&self, status: Option<u16>) {
        self.lock().fail_with = status;
    }

    pub fn swallow_inserts(&self, swallow: bool) {
        self.lock().swallow_inserts = swallow;
    }

    pub fn malformed_body(&self, body: Option<Value>) {
        self.lock().malformed_body = body;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().expect("Fake state lock poisoned")
    }
}

impl Drop for FakePostgrest {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn handle_request(state: &Arc<Mutex<FakeState>>, prefix: &str, mut request: tiny_http::Request) {
    let method = request.method().to_string();
    let url = request.url().to_string();
    let (path, raw_query) = url.split_once('?').unwrap_or((url.as_str(), ""));
    let query: Vec<(String, String)> = raw_query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            (percent_decode(k), percent_decode(v))
        })
        .collect();
    let headers = request
        .headers()
        .iter()
        .map(|h| (h.field.to_string(), h.value.to_string()))
        .collect();
    let mut body = String::new();
    let _ = request.as_reader().read_to_string(&mut body);

    let recorded = RecordedRequest {
        method: method.clone(),
        path: path.to_string(),
        query,
        headers,
        body,
    };

    let mut state = state.lock().expect("Fake state lock poisoned");
    state.requests.push(recorded.clone());

    if let Some(status) = state.fail_with {
        respond_json(request, status, json!({ "message": "fake failure" }));
        return;
    }
    if recorded.path != prefix {
        respond_json(request, 404, json!({ "message": "unknown table" }));
        return;
    }
    if let Some(body) = state.malformed_body.clone() {
        match method.as_str() {
            "GET" => {
                respond_json(request, 200, body);
                return;
            }
            "HEAD" => {
                let header = Header::from_bytes(&b"Content-Range"[..], &b"rows"[..]).unwrap();
                let _ = request.respond(Response::empty(200u16).with_header(header));
                return;
            }
            _ => {}
        }
    }

    match method.as_str() {
        "GET" => {
            let mut rows: Vec<Value> = state
                .rows
                .iter()
                .filter(|row| matches_token(row, &recorded))
                .cloned()
                .collect();
            if recorded.query_value("order") == Some("score.desc") {
                rows.sort_by_key(|row| std::cmp::Reverse(row["score"].as_i64().unwrap_or(0)));
            }
            if let Some(limit) = recorded.query_value("limit").and_then(|l| l.parse().ok()) {
                rows.truncate(limit);
            }
            respond_json(request, 200, Value::Array(rows));
        }
        "HEAD" => {
            let threshold = recorded
                .query_value("score")
                .and_then(|v| v.strip_prefix("gt."))
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(i64::MIN);
            let count = state
                .rows
                .iter()
                .filter(|row| row["score"].as_i64().unwrap_or(0) > threshold)
                .count();
            let range = if count == 0 {
                "*/0".to_string()
            } else {
                format!("0-{}/{}", count - 1, count)
            };
            let header = Header::from_bytes(&b"Content-Range"[..], range.as_bytes()).unwrap();
            let _ = request.respond(Response::empty(200u16).with_header(header));
        }
        "POST" => {
            let mut row = recorded.json_body();
            state.next_id += 1;
            row["id"] = json!(state.next_id);
            let echoed = if state.swallow_inserts {
                json!([])
            } else {
                state.rows.push(row.clone());
                json!([row])
            };
            respond_json(request, 201, echoed);
        }
        "PATCH" => {
            let patch: Map<String, Value> = match recorded.json_body() {
                Value::Object(map) => map,
                _ => Map::new(),
            };
            for row in state.rows.iter_mut().filter(|row| matches_token(row, &recorded)) {
                for (k, v) in &patch {
                    row[k.as_str()] = v.clone();
                }
            }
            let _ = request.respond(Response::empty(204u16));
        }
        _ => respond_json(request, 405, json!({ "message": "method not allowed" })),
    }
}

fn matches_token(row: &Value, request: &RecordedRequest) -> bool {
    match request
        .query_value("client_token")
        .and_then(|v| v.strip_prefix("eq."))
    {
        Some(token) => row["client_token"].as_str() == Some(token),
        None => true,
    }
}

fn respond_json(request: tiny_http::Request, status: u16, body: Value) {
    let response = Response::from_string(body.to_string())
        .with_status_code(status)
        .with_header(
            Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap(),
        );
    let _ = request.respond(response);
}

fn percent_decode(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' if i + 2 < bytes.len() => {
                let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).unwrap_or("");
                match u8::from_str_radix(hex, 16) {
                    Ok(b) => {
                        out.push(b);
                        i += 2;
                    }
                    Err(_) => out.push(b'%'),
                }
            }
            b => out.push(b),
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Scripted draws that produce exactly `scores`, in order
pub fn scripted(scores: &[i64]) -> Box<ScriptedSource> {
    Box::new(ScriptedSource::new(
        scores.iter().map(|s| uniform_for_score(50, *s)).collect(),
    ))
}

/// SQLite-backed store in `dir`
pub fn sqlite_store(dir: &Path) -> Arc<dyn StateStore> {
    Arc::new(SqliteStore::open(&dir.join("state.db")).expect("Failed to open state db"))
}

/// Game over SQLite state in `dir`, with scripted scores
pub fn open_game(
    dir: &Path,
    scores: &[i64],
    table: Arc<dyn RankingTable>,
) -> GameContext {
    GameContext::with_source(Config::default(), scripted(scores), sqlite_store(dir), table)
        .expect("Failed to open game")
}
