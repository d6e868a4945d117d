//! Route configuration and navigation control.
//!
//! - `RouteTable`: the static route list with per-route `Visibility`
//! - `NavigationGuard`: decides, before a view renders, whether a
//!   transition proceeds or is redirected to sign-in
//! - `Navigator`: the navigation surface the request pipeline drives;
//!   `Router` is the in-process implementation

pub mod guard;
pub mod navigator;
pub mod route;

pub use guard::{Decision, NavigationGuard, SIGN_IN_REQUIRED};
pub use navigator::{Navigator, Router};
pub use route::{
    Location, NavigationError, NavigationTarget, RouteDescriptor, RouteTable, Visibility,
    LOGIN_ROUTE, REDIRECT_QUERY,
};
