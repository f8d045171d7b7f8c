use serde::Deserialize;

use campus_core::config::Config;

/// Auth service configuration loaded from environment variables.
///
/// Each field is read from its upper-cased name (`jwt_secret` → `JWT_SECRET`).
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// HMAC secret for signing access tokens. At least 32 bytes.
    pub jwt_secret: String,
    #[serde(default = "default_jwt_issuer")]
    pub jwt_issuer: String,
    #[serde(default = "default_jwt_audience")]
    pub jwt_audience: String,
    #[serde(default = "default_access_token_ttl_secs")]
    pub access_token_ttl_secs: u64,
    #[serde(default = "default_refresh_token_ttl_secs")]
    pub refresh_token_ttl_secs: i64,
    #[serde(default = "default_two_factor_code_ttl_secs")]
    pub two_factor_code_ttl_secs: i64,
    #[serde(default = "default_password_reset_ttl_secs")]
    pub password_reset_ttl_secs: i64,
    #[serde(default = "default_min_password_length")]
    pub min_password_length: usize,
    /// Seconds between expiry sweeps.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
    /// Page that accepts `?token=` for password reset (e.g. "https://campus.example/reset").
    pub password_reset_url: String,
    /// Cookie domain attribute (root domain, e.g. "campus.example").
    pub cookie_domain: String,
    /// TCP port to listen on. Env var: `AUTH_PORT`.
    #[serde(default = "default_auth_port")]
    pub auth_port: u16,
    /// Transactional email API endpoint. Emails are only logged when unset.
    #[serde(default)]
    pub email_api_url: Option<String>,
    #[serde(default = "default_email_from")]
    pub email_from: String,
    /// Upper bound on one email API request.
    #[serde(default = "default_email_timeout_secs")]
    pub email_timeout_secs: u64,
}

impl Config for AuthConfig {}

fn default_jwt_issuer() -> String {
    "campus-auth".to_owned()
}

fn default_jwt_audience() -> String {
    "campus".to_owned()
}

fn default_access_token_ttl_secs() -> u64 {
    900
}

fn default_refresh_token_ttl_secs() -> i64 {
    7 * 24 * 60 * 60
}

fn default_two_factor_code_ttl_secs() -> i64 {
    600
}

fn default_password_reset_ttl_secs() -> i64 {
    3600
}

fn default_min_password_length() -> usize {
    8
}

fn default_sweep_interval_secs() -> u64 {
    300
}

fn default_auth_port() -> u16 {
    3112
}

fn default_email_timeout_secs() -> u64 {
    10
}

fn default_email_from() -> String {
    "no-reply@campus.local".to_owned()
}
