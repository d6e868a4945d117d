//! Client-side request and navigation control for the enterprise data portal.
//!
//! Two pieces share one `SessionStore`:
//!
//! - [`api::Pipeline`] wraps every outbound call: it attaches the bearer
//!   token, and on failure notifies the user, ends the session on `401`,
//!   and still returns the failure to the caller.
//! - [`router::NavigationGuard`] decides before each route transition
//!   whether it proceeds or redirects to sign-in.
//!
//! Storage, notifications, navigation and HTTP are traits so that the
//! same logic runs against the OS keychain and reqwest in the CLI and
//! against in-memory fakes ([`mocks`]) in tests.

pub mod api;
pub mod config;
pub mod mocks;
pub mod models;
pub mod notify;
pub mod router;
pub mod session;

pub use api::{ApiClient, ApiError, OutboundCall, Outcome, Pipeline, RequestFailure, Response};
pub use config::Config;
pub use notify::{Notice, Notifier, Severity};
pub use router::{Decision, Location, NavigationGuard, NavigationTarget, Navigator, RouteTable, Router};
pub use session::{Persistence, SessionStore};
