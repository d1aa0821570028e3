//! Shared utilities.
//!
//! - [`email`]: Email delivery (SMTP or log-only) and message templates

pub mod email;
