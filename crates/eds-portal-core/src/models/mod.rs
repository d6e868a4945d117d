//! Data models exchanged with the enterprise data API.
//!
//! - `LoginRequest`, `LoginResponse`, `UserProfile`: sign-in and the cached
//!   profile kept next to the session token
//! - `Customer`, `NewCustomer`: customer records
//! - `QuoteRequest`, `QuoteResult`: premium calculation

pub mod auth;
pub mod customer;

pub use auth::{LoginRequest, LoginResponse, UserProfile};
pub use customer::{Customer, CustomerStatus, NewCustomer, QuoteRequest, QuoteResult};
