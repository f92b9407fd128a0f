//! Scripted transport for tests and offline use
//!
//! Routes match on method and URL suffix, in registration order. Each route
//! holds a queue of responses; the last one repeats once the queue drains.
//! Every request is recorded.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use serde_json::Value;

use super::{HttpRequest, HttpResponse, Transport, TransportError};
use crate::catalog::HttpMethod;

/// One scripted outcome
#[derive(Debug, Clone)]
pub enum MockResponse {
    Respond(HttpResponse),
    Fail(TransportError),
}

impl MockResponse {
    /// JSON body with the given status
    pub fn json(status: u16, body: Value) -> Self {
        MockResponse::Respond(HttpResponse {
            status,
            reason: reason_for(status).to_string(),
            body: body.to_string().into_bytes(),
        })
    }

    /// 200 with a JSON body
    pub fn ok(body: Value) -> Self {
        Self::json(200, body)
    }

    /// Raw body with the given status
    pub fn raw(status: u16, body: impl Into<Vec<u8>>) -> Self {
        MockResponse::Respond(HttpResponse {
            status,
            reason: reason_for(status).to_string(),
            body: body.into(),
        })
    }

    /// Error status with an empty body
    pub fn status(status: u16) -> Self {
        Self::raw(status, Vec::new())
    }

    pub fn timeout() -> Self {
        MockResponse::Fail(TransportError::Timeout("mock timeout".to_string()))
    }
}

fn reason_for(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        413 => "Payload Too Large",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "",
    }
}

#[derive(Debug)]
struct Route {
    method: HttpMethod,
    suffix: String,
    responses: VecDeque<MockResponse>,
}

#[derive(Debug, Default)]
struct MockState {
    routes: Vec<Route>,
    requests: Vec<HttpRequest>,
    api_key: Option<String>,
    latency: Option<Duration>,
}

/// In-memory transport with scripted responses
#[derive(Debug, Default)]
pub struct MockTransport {
    state: Mutex<MockState>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Queue a response for requests whose URL ends with `suffix`
    pub fn on(&self, method: HttpMethod, suffix: &str, response: MockResponse) -> &Self {
        let mut state = self.state();
        if let Some(route) = state
            .routes
            .iter_mut()
            .find(|r| r.method == method && r.suffix == suffix)
        {
            route.responses.push_back(response);
        } else {
            state.routes.push(Route {
                method,
                suffix: suffix.to_string(),
                responses: VecDeque::from([response]),
            });
        }
        self
    }

    /// Queue a 200 JSON response for GET `suffix`
    pub fn on_get(&self, suffix: &str, body: Value) -> &Self {
        self.on(HttpMethod::Get, suffix, MockResponse::ok(body))
    }

    /// Queue a 200 JSON response for POST `suffix`
    pub fn on_post(&self, suffix: &str, body: Value) -> &Self {
        self.on(HttpMethod::Post, suffix, MockResponse::ok(body))
    }

    /// Answer 401 to any request not carrying this `apikey` header
    pub fn require_api_key(&self, key: &str) -> &Self {
        self.state().api_key = Some(key.to_string());
        self
    }

    /// Sleep before answering each request
    pub fn with_latency(&self, latency: Duration) -> &Self {
        self.state().latency = Some(latency);
        self
    }

    /// All requests received so far
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.state().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.state().requests.len()
    }

    /// Requests whose URL ends with `suffix`
    pub fn requests_to(&self, suffix: &str) -> Vec<HttpRequest> {
        self.state()
            .requests
            .iter()
            .filter(|r| r.url.ends_with(suffix))
            .cloned()
            .collect()
    }
}

impl Transport for MockTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let (latency, outcome) = {
            let mut state = self.state();
            state.requests.push(request.clone());

            let rejected = match &state.api_key {
                Some(expected) => request.header("apikey") != Some(expected.as_str()),
                None => false,
            };

            let outcome = if rejected {
                MockResponse::json(401, serde_json::json!({"message": "Invalid API key"}))
            } else {
                match state
                    .routes
                    .iter_mut()
                    .find(|r| r.method == request.method && request.url.ends_with(&r.suffix))
                {
                    Some(route) if route.responses.len() > 1 => {
                        route.responses.pop_front().unwrap_or_else(|| MockResponse::status(404))
                    }
                    Some(route) => route
                        .responses
                        .front()
                        .cloned()
                        .unwrap_or_else(|| MockResponse::status(404)),
                    None => MockResponse::status(404),
                }
            };
            (state.latency, outcome)
        };

        if let Some(latency) = latency {
            std::thread::sleep(latency);
        }

        match outcome {
            MockResponse::Respond(response) => Ok(response),
            MockResponse::Fail(err) => Err(err),
        }
    }
}
