//! In-memory collaborators for tests.
//!
//! These record what the pipeline and guard asked of them so tests can
//! assert on notices, navigations and outbound calls without a server.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use serde_json::Value;

use crate::api::{OutboundCall, RequestFailure, Response, Transport};
use crate::notify::{Notice, Notifier, Severity};
use crate::router::{Location, NavigationTarget, Navigator};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Notifier that keeps every notice in order.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        lock(&self.notices).clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, severity: Severity, message: &str) {
        lock(&self.notices).push(Notice::new(severity, message));
    }
}

/// Navigator that stays put and records every push.
#[derive(Debug)]
pub struct RecordingNavigator {
    current: Mutex<Location>,
    pushes: Mutex<Vec<NavigationTarget>>,
}

impl RecordingNavigator {
    pub fn at(location: Location) -> Self {
        Self {
            current: Mutex::new(location),
            pushes: Mutex::new(Vec::new()),
        }
    }

    pub fn pushes(&self) -> Vec<NavigationTarget> {
        lock(&self.pushes).clone()
    }
}

impl Navigator for RecordingNavigator {
    fn current(&self) -> Location {
        lock(&self.current).clone()
    }

    fn push(&self, target: NavigationTarget) {
        lock(&self.pushes).push(target);
    }
}

/// Transport with scripted outcomes, answered in order. Once the script
/// runs out every call gets `200` with an empty body.
#[derive(Debug, Default)]
pub struct MockTransport {
    script: Mutex<VecDeque<Result<Response, RequestFailure>>>,
    calls: Mutex<Vec<OutboundCall>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, outcome: Result<Response, RequestFailure>) {
        lock(&self.script).push_back(outcome);
    }

    /// Calls exactly as the transport received them
    pub fn calls(&self) -> Vec<OutboundCall> {
        lock(&self.calls).clone()
    }
}

impl Transport for MockTransport {
    async fn execute(&self, call: OutboundCall) -> Result<Response, RequestFailure> {
        lock(&self.calls).push(call);
        let next = lock(&self.script).pop_front();
        next.unwrap_or_else(|| Ok(Response::new(200, Value::Null)))
    }
}
