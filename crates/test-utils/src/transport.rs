//! Scripted in-memory transport.
//!
//! Routes are matched by substring against the full request URL, first
//! registered route first. Each route holds a queue of replies: replies are
//! consumed in order and the last one repeats forever. Unmatched requests get
//! an empty 404.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use ogc_common::{HttpResponse, OgcError, OgcResult, Transport};
use url::Url;

#[derive(Debug, Clone)]
enum Reply {
    Respond(HttpResponse),
    Fail(String),
}

#[derive(Debug)]
struct Route {
    pattern: String,
    replies: VecDeque<Reply>,
}

/// Transport that answers from a script and records every request.
#[derive(Debug, Default)]
pub struct MockTransport {
    routes: Mutex<Vec<Route>>,
    calls: Mutex<Vec<String>>,
    call_count: AtomicUsize,
    delay: Option<Duration>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every reply, so concurrent requests overlap.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Answer URLs containing `pattern` with a 200 and this body.
    pub fn respond(self, pattern: &str, body: impl Into<String>) -> Self {
        self.push(pattern, Reply::Respond(HttpResponse::ok(body.into())))
    }

    /// Answer URLs containing `pattern` with a 200 and raw bytes.
    pub fn respond_bytes(self, pattern: &str, body: impl Into<Bytes>) -> Self {
        self.push(pattern, Reply::Respond(HttpResponse::ok(body)))
    }

    /// Answer URLs containing `pattern` with the given status and body.
    pub fn respond_status(self, pattern: &str, status: u16, body: impl Into<String>) -> Self {
        self.push(
            pattern,
            Reply::Respond(HttpResponse::with_status(status, body.into())),
        )
    }

    /// Fail URLs containing `pattern` at the transport level.
    pub fn fail(self, pattern: &str, message: impl Into<String>) -> Self {
        self.push(pattern, Reply::Fail(message.into()))
    }

    fn push(self, pattern: &str, reply: Reply) -> Self {
        {
            let mut routes = self.routes.lock().unwrap();
            match routes.iter_mut().find(|r| r.pattern == pattern) {
                Some(route) => route.replies.push_back(reply),
                None => routes.push(Route {
                    pattern: pattern.to_string(),
                    replies: VecDeque::from([reply]),
                }),
            }
        }
        self
    }

    /// Total number of requests served.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Number of requests whose URL contains `pattern`.
    pub fn calls_matching(&self, pattern: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|url| url.contains(pattern))
            .count()
    }

    /// Every requested URL, in request order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn next_reply(&self, url: &str) -> Option<Reply> {
        let mut routes = self.routes.lock().unwrap();
        let route = routes.iter_mut().find(|r| url.contains(&r.pattern))?;
        if route.replies.len() > 1 {
            route.replies.pop_front()
        } else {
            route.replies.front().cloned()
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, url: &Url) -> OgcResult<HttpResponse> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().unwrap().push(url.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match self.next_reply(url.as_str()) {
            Some(Reply::Respond(response)) => Ok(response),
            Some(Reply::Fail(message)) => Err(OgcError::Transport(message)),
            None => Ok(HttpResponse::with_status(404, String::new())),
        }
    }
}
