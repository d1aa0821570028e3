use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use schoolhub_models::{
    AuthMessageResponse, CreateSchoolResponse, LoginRequest, LoginResponse, MessageResponse,
    RegisterRequest, School, SchoolListResponse, SchoolResponse, SchoolSummary,
    UpdateSchoolResponse, UserSummary, VerifyOtpRequest,
};

use crate::modules::auth::controller::ErrorResponse;
use crate::modules::health::HealthResponse;
use crate::modules::schools::model::{CreateSchoolForm, UpdateSchoolForm};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::health::health,
        crate::modules::auth::controller::register,
        crate::modules::auth::controller::verify_otp,
        crate::modules::auth::controller::login,
        crate::modules::schools::controller::create_school,
        crate::modules::schools::controller::list_schools,
        crate::modules::schools::controller::get_school,
        crate::modules::schools::controller::update_school,
        crate::modules::schools::controller::delete_school,
    ),
    components(
        schemas(
            HealthResponse,
            ErrorResponse,
            RegisterRequest,
            VerifyOtpRequest,
            LoginRequest,
            LoginResponse,
            AuthMessageResponse,
            UserSummary,
            School,
            SchoolSummary,
            CreateSchoolForm,
            UpdateSchoolForm,
            CreateSchoolResponse,
            UpdateSchoolResponse,
            SchoolListResponse,
            SchoolResponse,
            MessageResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service liveness"),
        (name = "Authentication", description = "Registration, email verification and login"),
        (name = "Schools", description = "School directory; writes are limited to the creator")
    ),
    info(
        title = "SchoolHub API",
        version = "0.1.0",
        description = "School directory with OTP-verified registration and JWT bearer authentication.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();

        for expected in [
            "/health",
            "/auth/register",
            "/auth/verify-otp",
            "/auth/login",
            "/schools",
            "/schools/{id}",
        ] {
            assert!(paths.contains(&expected), "missing {}", expected);
        }
    }

    #[test]
    fn test_bearer_scheme_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.unwrap();
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
