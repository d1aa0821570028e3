//! # SchoolHub Auth
//!
//! Bearer-token primitives for the SchoolHub API:
//!
//! - [`claims`]: The [`Claims`] carried by an access token
//! - [`jwt`]: Token creation and verification
//!
//! A single short-lived access token is issued per login. There are no
//! refresh tokens and no server-side sessions.

pub mod claims;
pub mod jwt;

pub use claims::Claims;
pub use jwt::{create_access_token, verify_token};
