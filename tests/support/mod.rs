#![allow(dead_code)]

//! In-process mock of a WebHDFS-style gateway for protocol tests.
//!
//! Phase-1 create requests arrive on arbitrary paths; the gateway answers
//! with a 307 redirect pointing back at itself under `/write`, and records
//! every request so tests can assert on paths, queries, headers, and
//! bodies.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tokio::net::TcpListener;

/// Path prefix the redirect Location points at.
const WRITE_PREFIX: &str = "/write";

/// How the gateway answers the create (phase 1) request.
#[derive(Debug, Clone, Copy)]
pub enum CreateBehavior {
    /// 307 with a Location pointing back at this server.
    Redirect,
    /// 307 without a Location header.
    RedirectWithoutLocation,
    /// An arbitrary non-redirect status.
    Status(u16),
}

/// How the gateway answers the data write (phase 2) request.
#[derive(Debug, Clone, Copy)]
pub enum WriteBehavior {
    /// 201 Created.
    Created,
    /// An arbitrary status.
    Status(u16),
}

/// One recorded HTTP request.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub query: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    /// Look up a header value by (lowercase) name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

struct GatewayState {
    addr: SocketAddr,
    create: Mutex<CreateBehavior>,
    write: Mutex<WriteBehavior>,
    fail_substring: Mutex<Option<String>>,
    creates: Mutex<Vec<RecordedRequest>>,
    writes: Mutex<Vec<RecordedRequest>>,
}

/// Handle to a running mock gateway.
pub struct MockGateway {
    pub addr: SocketAddr,
    state: Arc<GatewayState>,
}

impl MockGateway {
    /// Bind an ephemeral port and start serving.
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let state = Arc::new(GatewayState {
            addr,
            create: Mutex::new(CreateBehavior::Redirect),
            write: Mutex::new(WriteBehavior::Created),
            fail_substring: Mutex::new(None),
            creates: Mutex::new(Vec::new()),
            writes: Mutex::new(Vec::new()),
        });

        let app = Router::new().fallback(handle).with_state(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    /// Endpoint base URL for client configuration.
    pub fn endpoint(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn set_create(&self, behavior: CreateBehavior) {
        *self.state.create.lock().unwrap() = behavior;
    }

    pub fn set_write(&self, behavior: WriteBehavior) {
        *self.state.write.lock().unwrap() = behavior;
    }

    /// Answer 500 on phase 1 for any path containing `marker`.
    pub fn fail_paths_containing(&self, marker: &str) {
        *self.state.fail_substring.lock().unwrap() = Some(marker.to_string());
    }

    /// Recorded phase-1 requests.
    pub fn creates(&self) -> Vec<RecordedRequest> {
        self.state.creates.lock().unwrap().clone()
    }

    /// Recorded phase-2 requests.
    pub fn writes(&self) -> Vec<RecordedRequest> {
        self.state.writes.lock().unwrap().clone()
    }
}

async fn handle(
    State(state): State<Arc<GatewayState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if method != Method::PUT {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }

    let path = uri.path().to_string();
    let record = RecordedRequest {
        path: path.clone(),
        query: uri.query().unwrap_or("").to_string(),
        headers: headers
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_string()))
            .collect(),
        body: body.to_vec(),
    };

    // Phase 2: data write
    if path.starts_with(WRITE_PREFIX) {
        state.writes.lock().unwrap().push(record);
        return match *state.write.lock().unwrap() {
            WriteBehavior::Created => StatusCode::CREATED.into_response(),
            WriteBehavior::Status(code) => StatusCode::from_u16(code).unwrap().into_response(),
        };
    }

    // Phase 1: create request
    state.creates.lock().unwrap().push(record);

    if let Some(marker) = state.fail_substring.lock().unwrap().as_deref() {
        if path.contains(marker) {
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    }

    match *state.create.lock().unwrap() {
        CreateBehavior::Redirect => {
            let location = format!("http://{}{}{}", state.addr, WRITE_PREFIX, path);
            (StatusCode::TEMPORARY_REDIRECT, [(header::LOCATION, location)]).into_response()
        }
        CreateBehavior::RedirectWithoutLocation => {
            StatusCode::TEMPORARY_REDIRECT.into_response()
        }
        CreateBehavior::Status(code) => StatusCode::from_u16(code).unwrap().into_response(),
    }
}
