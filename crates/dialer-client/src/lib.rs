//! # dialer-client
//!
//! The dialer's control flow: one outbound socket, two authenticated
//! lookups, and the pipeline that ties them together.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`connection`] | [`ConnectionManager`]: single replaceable socket, state broadcast, send |
//! | [`api`] | HTTP client for subscriber/enrollment lookups and admin login |
//! | [`auth`] | Access-token claim decoding and expiry check |
//! | [`pipeline`] | [`SubmissionPipeline`]: validate → lookup user → lookup enrollment → send |
//! | [`dialer`] | [`Dialer`]: process-level context owning stores, connection, and pipeline |
//!
//! ## Data Flow
//!
//! UI collects digits → [`Dialer::submit`] → [`SubmissionPipeline::submit`]
//! → [`api::Directory`] lookups → [`ConnectionManager::send`] → a
//! [`SubmissionOutcome`] back to the caller.
//!
//! ## Crate Position
//!
//! Depends on dialer-core, dialer-settings, dialer-store.
//! Depended on by: dialer-agent.

#![deny(unsafe_code)]

pub mod api;
pub mod auth;
pub mod connection;
pub mod dialer;
pub mod errors;
pub mod pipeline;

#[cfg(test)]
pub(crate) mod testutil;

pub use api::{ApiClient, Directory, EnrollmentRecord, UserRecord};
pub use connection::{ConnectionManager, Transport, WsTransport};
pub use dialer::Dialer;
pub use errors::{ConnectionError, DialerError, LoginError, LookupError};
pub use pipeline::{Delivery, SubmissionOutcome, SubmissionPipeline};
