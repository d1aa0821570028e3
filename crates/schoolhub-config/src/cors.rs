use crate::env_string;

const DEFAULT_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";

/// Browser origins allowed to call the API, from the comma-separated
/// `ALLOWED_ORIGINS`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    pub fn from_env() -> Self {
        Self::from_list(&env_string("ALLOWED_ORIGINS", DEFAULT_ORIGINS))
    }

    fn from_list(list: &str) -> Self {
        let allowed_origins = list
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect();

        Self { allowed_origins }
    }
}
