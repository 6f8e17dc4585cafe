//! Application configuration loaded from environment variables.

use common::ShareCode;

/// Core configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
/// - `SHARE_CODE_LENGTH` — characters in generated share codes (default: 16)
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub log_filter: String,
    pub share_code_length: usize,
}

impl AppConfig {
    /// Loads configuration from environment variables, falling back to
    /// defaults.
    pub fn from_env() -> Self {
        Self {
            log_filter: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            share_code_length: std::env::var("SHARE_CODE_LENGTH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(ShareCode::DEFAULT_LENGTH),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            share_code_length: ShareCode::DEFAULT_LENGTH,
        }
    }
}
