//! # dialer-core
//!
//! Foundation types and utilities shared by every dialer crate.
//!
//! - **Phone numbers**: [`phone::PhoneSuffix`] (the 8 operator-entered digits)
//!   with normalization, validation, and `010 - xxxx - xxxx` display
//! - **Session**: [`session::Session`], the authenticated context (tokens + branch)
//! - **Connection state**: [`connection::ConnectionState`], the socket lifecycle
//!   states observed by the UI layer
//! - **Logging**: [`logging::init_subscriber`] for the `tracing` subscriber
//!
//! ## Crate Position
//!
//! Foundation crate. Depended on by all other dialer crates.

#![deny(unsafe_code)]

pub mod connection;
pub mod logging;
pub mod phone;
pub mod session;

pub use connection::ConnectionState;
pub use phone::{PHONE_PREFIX, PhoneError, PhoneSuffix, SUFFIX_LEN, format_partial};
pub use session::Session;
