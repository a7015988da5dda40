#![allow(dead_code)]

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use repo_export_core::contract::{ApiRequest, ApiResponse, MockRemoteClient, TransportError};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing_subscriber::{layer::Context, Layer};

pub const REPO: &str = "/repos/octo/demo";

/// `path?k=v&k=v` in the order the query was built. Used as the route key.
pub fn route_key(req: &ApiRequest) -> String {
    if req.query.is_empty() {
        return req.path.clone();
    }
    let query: Vec<String> = req.query.iter().map(|(k, v)| format!("{k}={v}")).collect();
    format!("{}?{}", req.path, query.join("&"))
}

#[derive(Clone)]
enum Reply {
    Response(ApiResponse),
    Transport,
}

/// Scripted remote: exact route key → reply. Unknown routes answer 404.
#[derive(Default)]
pub struct FakeRemote {
    routes: HashMap<String, Reply>,
}

impl FakeRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn json(mut self, key: &str, body: Value) -> Self {
        self.routes.insert(
            key.to_string(),
            Reply::Response(ApiResponse::new(200, body.to_string())),
        );
        self
    }

    pub fn response(mut self, key: &str, response: ApiResponse) -> Self {
        self.routes.insert(key.to_string(), Reply::Response(response));
        self
    }

    pub fn status(mut self, key: &str, status: u16) -> Self {
        self.routes.insert(
            key.to_string(),
            Reply::Response(ApiResponse::new(status, r#"{"message":"error"}"#)),
        );
        self
    }

    pub fn transport_error(mut self, key: &str) -> Self {
        self.routes.insert(key.to_string(), Reply::Transport);
        self
    }

    /// The mock plus a log of every route key requested, in call order.
    pub fn into_mock(self) -> (MockRemoteClient, Arc<Mutex<Vec<String>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let log = calls.clone();
        let routes = self.routes;
        let mut client = MockRemoteClient::new();
        client.expect_request().returning(move |req| {
            let key = route_key(&req);
            log.lock().unwrap().push(key.clone());
            match routes.get(&key) {
                Some(Reply::Response(resp)) => Ok(resp.clone()),
                Some(Reply::Transport) => Err(TransportError::Request("connection reset".into())),
                None => Ok(ApiResponse::new(404, r#"{"message":"Not Found"}"#)),
            }
        });
        (client, calls)
    }
}

pub fn metadata_json() -> Value {
    json!({
        "full_name": "octo/demo",
        "description": "Demo repository",
        "created_at": "2020-01-01T00:00:00Z",
        "updated_at": "2024-06-01T00:00:00Z",
        "default_branch": "main"
    })
}

pub fn tree_entry(path: &str, size: u64) -> Value {
    json!({
        "path": path,
        "mode": "100644",
        "type": "blob",
        "sha": path,
        "size": size,
        "url": blob_url(path)
    })
}

pub fn blob_url(path: &str) -> String {
    format!("https://api.github.com{REPO}/git/blobs/{}", path.replace('/', "_"))
}

pub fn blob_json(content: &str) -> Value {
    // the blob API wraps base64 at 60 columns
    let encoded = STANDARD.encode(content);
    let wrapped: Vec<String> = encoded
        .as_bytes()
        .chunks(60)
        .map(|c| String::from_utf8_lossy(c).into_owned())
        .collect();
    json!({
        "content": wrapped.join("\n"),
        "encoding": "base64",
        "size": content.len()
    })
}

pub fn issue_json(number: u64, comments: u64) -> Value {
    json!({
        "number": number,
        "title": format!("Issue {number}"),
        "state": if number % 2 == 0 { "closed" } else { "open" },
        "created_at": "2024-01-01T00:00:00Z",
        "body": format!("Body of {number}"),
        "comments": comments,
        "comments_url": format!("https://api.github.com{REPO}/issues/{number}/comments")
    })
}

pub fn comment_json(login: &str, body: &str) -> Value {
    json!({
        "user": { "login": login },
        "created_at": "2024-01-02T00:00:00Z",
        "body": body
    })
}

pub fn issues_page(page: u32) -> String {
    format!("{REPO}/issues?state=all&page={page}&per_page=100")
}

pub fn comments_url(number: u64) -> String {
    format!("https://api.github.com{REPO}/issues/{number}/comments")
}

/// Custom Layer to collect emitted event messages.
pub struct EventCollector {
    pub events: Arc<Mutex<Vec<String>>>,
}

impl<S> Layer<S> for EventCollector
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        self.events.lock().unwrap().push(format!("{:?}", event));
    }
}
