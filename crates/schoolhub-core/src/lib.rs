//! # SchoolHub Core
//!
//! Core types, errors, and utilities for the SchoolHub API.
//!
//! - [`errors`]: Application error taxonomy with HTTP response conversion
//! - [`file_storage`]: Storage backends for uploaded school images
//! - [`password`]: Secure password hashing and verification
//!
//! # Example
//!
//! ```ignore
//! use schoolhub_core::{AppError, hash_password, verify_password};
//!
//! let hash = hash_password("Secr3t!")?;
//! if !verify_password("Secr3t!", &hash)? {
//!     return Err(AppError::invalid_credentials());
//! }
//! ```

use std::future::Future;
use std::pin::Pin;

pub mod errors;
pub mod file_storage;
pub mod password;

pub use errors::{AppError, ErrorKind};
pub use file_storage::{FileStorage, ImageType, LocalFileStorage, StorageError};
pub use password::{
    HASH_COST, hash_password, hash_password_blocking, verify_password, verify_password_blocking,
};

/// Boxed, sendable future returned by the object-safe collaborator traits
/// (storage backends, repositories, email senders).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
