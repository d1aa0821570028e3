pub mod controller;
pub mod model;
pub mod repository;
pub mod router;
pub mod service;

pub use repository::{PgSchoolRepository, SchoolRepository};
pub use router::init_schools_router;
