use std::path::PathBuf;
use std::time::Duration;

use crate::{env_parse, env_string, outbound_timeout};

const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Where uploaded school images live and how they are addressed.
#[derive(Clone, Debug)]
pub struct StorageConfig {
    /// Directory the local backend writes into.
    pub base_dir: PathBuf,
    /// Public URL prefix under which stored files are served.
    pub public_url: String,
    pub max_upload_bytes: usize,
    pub timeout: Duration,
}

impl StorageConfig {
    pub fn from_env() -> Self {
        Self {
            base_dir: PathBuf::from(env_string("STORAGE_DIR", "./storage/uploads")),
            public_url: env_string("STORAGE_PUBLIC_URL", "http://localhost:3000/files"),
            max_upload_bytes: env_parse("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES),
            timeout: outbound_timeout(),
        }
    }
}
