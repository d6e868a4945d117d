//! Request pipeline for the enterprise data API.
//!
//! Every call goes through `Pipeline::send`, which
//! 1. attaches `Authorization: Bearer <token>` when a session token exists,
//! 2. hands the call to a `Transport`,
//! 3. on failure, classifies it, notifies the user (and on `401` ends the
//!    session and redirects to the login route), then returns the failure
//!    to the caller unchanged.
//!
//! `ApiClient` layers typed JSON endpoints on top of the pipeline.

pub mod call;
pub mod classify;
pub mod client;
pub mod error;
pub mod expiry;
pub mod pipeline;
pub mod transport;

pub use call::{OutboundCall, Response, DEFAULT_TIMEOUT};
pub use classify::{classify, Reaction};
pub use client::ApiClient;
pub use error::{ApiError, Outcome, RequestFailure};
pub use expiry::SessionExpiry;
pub use pipeline::Pipeline;
pub use transport::{ReqwestTransport, Transport};
