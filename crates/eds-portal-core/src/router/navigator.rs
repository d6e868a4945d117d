use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use super::guard::{Decision, NavigationGuard};
use super::route::{Location, NavigationError, NavigationTarget, RouteTable};

/// Upper bound on guard redirects followed for a single navigation
const MAX_REDIRECTS: usize = 3;

/// The navigation surface the request pipeline drives.
pub trait Navigator: Send + Sync {
    fn current(&self) -> Location;

    /// Request a transition. Navigating to the current location is a no-op.
    fn push(&self, target: NavigationTarget);
}

/// In-process router: resolves targets against the route table and runs
/// the guard before committing a transition.
pub struct Router {
    routes: Arc<RouteTable>,
    guard: NavigationGuard,
    current: Mutex<Location>,
}

impl Router {
    pub fn new(routes: Arc<RouteTable>, guard: NavigationGuard) -> Self {
        Self {
            routes,
            guard,
            current: Mutex::new(Location::start()),
        }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Navigate by route name.
    pub fn navigate(&self, target: &NavigationTarget) -> Result<Location, NavigationError> {
        let to = self.routes.location(target)?;
        self.transition(to)
    }

    /// Navigate to a concrete `path[?query]`.
    pub fn navigate_path(&self, full_path: &str) -> Result<Location, NavigationError> {
        let to = self.routes.resolve(full_path)?;
        self.transition(to)
    }

    fn transition(&self, mut to: Location) -> Result<Location, NavigationError> {
        let requested = to.full_path.clone();
        for _ in 0..=MAX_REDIRECTS {
            let from = self.current();
            // The start location is not a route, so the first transition is always checked
            if from.name.is_some() && to.full_path == from.full_path {
                debug!(path = %to.full_path, "Already at location");
                return Ok(from);
            }

            match self.guard.check(&to, Some(&from)) {
                Decision::Allow => {
                    info!(from = %from.full_path, to = %to.full_path, "Navigated");
                    *self.lock() = to.clone();
                    return Ok(to);
                }
                Decision::Redirect(target) => {
                    debug!(to = %to.full_path, redirect = %target.name, "Navigation redirected");
                    to = self.routes.location(&target)?;
                }
            }
        }
        Err(NavigationError::RedirectLoop(requested))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Location> {
        self.current.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Navigator for Router {
    fn current(&self) -> Location {
        self.lock().clone()
    }

    fn push(&self, target: NavigationTarget) {
        if let Err(e) = self.navigate(&target) {
            warn!(route = %target.name, error = %e, "Navigation failed");
        }
    }
}
