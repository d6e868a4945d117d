use std::sync::Arc;

use tracing::info;

use super::classify::SESSION_EXPIRED;
use crate::notify::{Notifier, Severity};
use crate::router::{NavigationTarget, Navigator, REDIRECT_QUERY};
use crate::session::SessionStore;

/// Reaction to a rejected credential: end the session and send the user to
/// sign in, remembering where they were.
///
/// Not deduplicated: concurrent `401`s each run it. Clearing an empty
/// session and navigating to the current location are both no-ops.
pub struct SessionExpiry {
    session: Arc<SessionStore>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    login_route: String,
}

impl SessionExpiry {
    pub fn new(
        session: Arc<SessionStore>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
        login_route: impl Into<String>,
    ) -> Self {
        Self {
            session,
            notifier,
            navigator,
            login_route: login_route.into(),
        }
    }

    pub fn handle(&self) {
        self.session.clear();

        let current = self.navigator.current();
        if current.is_named(&self.login_route) {
            return;
        }

        info!(from = %current.full_path, "Session expired, redirecting to sign-in");
        self.notifier.notify(Severity::Warning, SESSION_EXPIRED);
        self.navigator.push(
            NavigationTarget::named(self.login_route.clone())
                .with_query(REDIRECT_QUERY, current.full_path),
        );
    }
}
