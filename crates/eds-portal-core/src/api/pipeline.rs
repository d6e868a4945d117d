use std::sync::Arc;

use tracing::{debug, warn};

use super::classify::{classify, Reaction};
use super::{OutboundCall, Outcome, RequestFailure, SessionExpiry, Transport};
use crate::notify::Notifier;
use crate::router::Navigator;
use crate::session::SessionStore;

const AUTHORIZATION_HEADER: &str = "Authorization";

/// Wraps a transport with credential attachment and failure handling.
pub struct Pipeline<T> {
    transport: T,
    session: Arc<SessionStore>,
    notifier: Arc<dyn Notifier>,
    expiry: SessionExpiry,
}

impl<T: Transport> Pipeline<T> {
    pub fn new(
        transport: T,
        session: Arc<SessionStore>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
        login_route: impl Into<String>,
    ) -> Self {
        let expiry = SessionExpiry::new(session.clone(), notifier.clone(), navigator, login_route);
        Self {
            transport,
            session,
            notifier,
            expiry,
        }
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Set `Authorization: Bearer <token>` when a session token exists.
    /// Touches no other header and never fails.
    pub fn attach(&self, call: &mut OutboundCall) {
        if let Some(token) = self.session.token() {
            call.headers
                .insert(AUTHORIZATION_HEADER.to_string(), format!("Bearer {}", token));
        }
    }

    /// Send a call. Every failure is handled and then returned to the caller.
    pub async fn send(&self, mut call: OutboundCall) -> Outcome {
        self.attach(&mut call);
        let method = call.method.clone();
        let path = call.path.clone();

        let failure = match self.transport.execute(call).await {
            Ok(response) if response.is_success() => return Ok(response),
            Ok(response) => RequestFailure::Server {
                status: response.status,
                body: response.body,
            },
            Err(failure) => failure,
        };

        warn!(method = %method, path = %path, error = %failure, "Request failed");
        Err(self.report(failure))
    }

    /// Run the failure reaction for a call that failed before reaching the
    /// transport, handing the failure back for the caller.
    pub fn report(&self, failure: RequestFailure) -> RequestFailure {
        self.react(&failure);
        failure
    }

    fn react(&self, failure: &RequestFailure) {
        match classify(failure) {
            Reaction::Notify(notices) => {
                debug!(count = notices.len(), "Dispatching failure notices");
                for notice in &notices {
                    self.notifier.send(notice);
                }
            }
            Reaction::ExpireSession => self.expiry.handle(),
        }
    }
}
