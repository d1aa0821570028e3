//! # SchoolHub Models
//!
//! Domain models and DTOs for the SchoolHub API.
//!
//! # Modules
//!
//! - [`ids`]: Strongly-typed entity IDs
//! - [`auth`]: Registration, OTP verification and login DTOs
//! - [`users`]: Stored user rows and public user identity
//! - [`schools`]: School rows, write commands and response bodies

pub mod auth;
pub mod ids;
pub mod schools;
pub mod users;

pub use auth::{AuthMessageResponse, LoginRequest, LoginResponse, RegisterRequest, VerifyOtpRequest};

pub use ids::{SchoolId, UserId};

pub use schools::{
    CreateSchoolResponse, MessageResponse, NewSchool, School, SchoolChanges, SchoolDetails,
    SchoolDetailsPatch, SchoolListResponse, SchoolResponse, SchoolSummary, StoredImage,
    UpdateSchoolResponse,
};

pub use users::{PendingUser, UserRecord, UserSummary};
