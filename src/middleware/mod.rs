//! Request extractors for cross-cutting concerns.
//!
//! - [`auth`]: Bearer token authentication
//!
//! # Authentication Flow
//!
//! 1. Client sends request with `Authorization: Bearer <token>` header
//! 2. `AuthUser` extractor validates the JWT and extracts claims
//! 3. Ownership checks compare `AuthUser::user_id()` with the stored `creator_id`

pub mod auth;
