use std::sync::Arc;

use tracing::debug;

use super::route::{Location, NavigationTarget, RouteTable, Visibility, REDIRECT_QUERY};
use crate::notify::{Notifier, Severity};
use crate::session::SessionStore;

pub const SIGN_IN_REQUIRED: &str = "Please sign in to continue";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Redirect(NavigationTarget),
}

/// Gate in front of every route transition.
///
/// The check is synchronous and does no I/O beyond reading the session
/// store, so it settles before any part of the destination renders.
pub struct NavigationGuard {
    routes: Arc<RouteTable>,
    session: Arc<SessionStore>,
    notifier: Arc<dyn Notifier>,
    login_route: String,
}

impl NavigationGuard {
    pub fn new(
        routes: Arc<RouteTable>,
        session: Arc<SessionStore>,
        notifier: Arc<dyn Notifier>,
        login_route: impl Into<String>,
    ) -> Self {
        Self {
            routes,
            session,
            notifier,
            login_route: login_route.into(),
        }
    }

    pub fn login_route(&self) -> &str {
        &self.login_route
    }

    pub fn check(&self, to: &Location, from: Option<&Location>) -> Decision {
        match self.routes.visibility(to) {
            Visibility::Public => Decision::Allow,
            Visibility::Protected if self.session.is_authenticated() => Decision::Allow,
            Visibility::Protected => {
                debug!(
                    to = %to.full_path,
                    from = from.map(|f| f.full_path.as_str()),
                    "Protected route without session, redirecting to sign-in"
                );
                self.notifier.notify(Severity::Warning, SIGN_IN_REQUIRED);
                Decision::Redirect(
                    NavigationTarget::named(self.login_route.clone())
                        .with_query(REDIRECT_QUERY, to.full_path.clone()),
                )
            }
        }
    }
}
