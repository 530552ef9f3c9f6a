//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHOPEASY_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `SHOPEASY_HOST` - Bind address (default: 127.0.0.1)
//! - `SHOPEASY_PORT` - Listen port (default: 5000)
//! - `SHOPEASY_BASE_URL` - Public URL (default: `http://localhost:5000`)
//! - `APP_NAME` - Shop name used in pages and emails (default: `ShopEasy`)
//! - `EXTERNAL_TIMEOUT_SECS` - Timeout for payment and email calls (default: 10)
//! - `MAIL_SERVER`, `MAIL_PORT`, `MAIL_USERNAME`, `MAIL_PASSWORD`, `MAIL_DEFAULT_SENDER`
//!   - SMTP settings; email is disabled unless `MAIL_USERNAME` is set
//! - `STRIPE_SECRET_KEY`, `STRIPE_CURRENCY`
//!   - Payment intents; disabled unless the key is set
//! - `SENTRY_DSN`, `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE`, `SENTRY_TRACES_SAMPLE_RATE`

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.0;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "change-in-production",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "insert",
    "put-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: Url,
    /// Shop name shown in page titles and email subjects
    pub app_name: String,
    /// Upper bound on each payment-provider and SMTP call
    pub external_timeout: Duration,
    /// SMTP settings, `None` when email is not configured
    pub email: Option<EmailConfig>,
    /// Payment provider settings, `None` when payments are not configured
    pub payments: Option<PaymentConfig>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag (e.g. "production")
    pub sentry_environment: Option<String>,
    /// Fraction of errors sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

/// SMTP configuration.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: SecretString,
    pub from_address: String,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_username", &self.smtp_username)
            .field("smtp_password", &"[REDACTED]")
            .field("from_address", &self.from_address)
            .finish()
    }
}

/// Stripe configuration.
///
/// Implements `Debug` manually to redact the secret key.
#[derive(Clone)]
pub struct PaymentConfig {
    pub secret_key: SecretString,
    /// Lowercase ISO 4217 code sent with each payment intent
    pub currency: String,
    /// API root, overridable for tests
    pub api_base: String,
}

impl std::fmt::Debug for PaymentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentConfig")
            .field("secret_key", &"[REDACTED]")
            .field("currency", &self.currency)
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = database_url_from_env()?;
        let host = parse_env("SHOPEASY_HOST", "127.0.0.1")?;
        let port = parse_env("SHOPEASY_PORT", "5000")?;
        let base_url_raw = get_env_or_default("SHOPEASY_BASE_URL", "http://localhost:5000");
        let base_url = Url::parse(&base_url_raw).map_err(|e| {
            ConfigError::InvalidEnvVar("SHOPEASY_BASE_URL".to_string(), e.to_string())
        })?;
        let timeout_secs: u64 = parse_env("EXTERNAL_TIMEOUT_SECS", "10")?;

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            app_name: get_env_or_default("APP_NAME", "ShopEasy"),
            external_timeout: Duration::from_secs(timeout_secs),
            email: EmailConfig::from_env()?,
            payments: PaymentConfig::from_env()?,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_env("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: parse_env("SENTRY_TRACES_SAMPLE_RATE", "0.1")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn is_https(&self) -> bool {
        self.base_url.scheme() == "https"
    }
}

impl EmailConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(smtp_username) = get_optional_env("MAIL_USERNAME") else {
            return Ok(None);
        };

        let from_address =
            get_optional_env("MAIL_DEFAULT_SENDER").unwrap_or_else(|| smtp_username.clone());

        Ok(Some(Self {
            smtp_host: get_env_or_default("MAIL_SERVER", "smtp.gmail.com"),
            smtp_port: parse_env("MAIL_PORT", "587")?,
            smtp_password: get_validated_secret("MAIL_PASSWORD")?,
            smtp_username,
            from_address,
        }))
    }
}

impl PaymentConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(key) = get_optional_env("STRIPE_SECRET_KEY") else {
            return Ok(None);
        };
        validate_secret_strength(&key, "STRIPE_SECRET_KEY")?;

        Ok(Some(Self {
            secret_key: SecretString::from(key),
            currency: get_env_or_default("STRIPE_CURRENCY", "usd").to_lowercase(),
            api_base: get_env_or_default("STRIPE_API_BASE", "https://api.stripe.com"),
        }))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
/// Database URL from `SHOPEASY_DATABASE_URL`, falling back to `DATABASE_URL`.
///
/// Shared with the CLI, which needs the database but none of the server settings.
///
/// # Errors
///
/// Returns `ConfigError::MissingEnvVar` if neither variable is set.
pub fn database_url_from_env() -> Result<SecretString, ConfigError> {
    get_database_url("SHOPEASY_DATABASE_URL")
}

fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable (or its default) into `T`.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1})"
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_config(base_url: &str) -> StorefrontConfig {
        StorefrontConfig {
            database_url: SecretString::from("postgres://localhost/shopeasy_test"),
            host: "0.0.0.0".parse().unwrap(),
            port: 5000,
            base_url: Url::parse(base_url).unwrap(),
            app_name: "ShopEasy".to_string(),
            external_timeout: Duration::from_secs(10),
            email: None,
            payments: None,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    #[test]
    fn test_shannon_entropy_uniform_string_is_zero() {
        assert!((shannon_entropy("zzzzzz") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_four_symbols_is_two_bits() {
        assert!((shannon_entropy("abcdabcd") - 2.0).abs() < 0.01);
    }

    #[test]
    fn test_placeholder_secret_rejected() {
        let err = validate_secret_strength("dev-secret-key-change-in-production", "MAIL_PASSWORD")
            .unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(var, _) if var == "MAIL_PASSWORD"));
    }

    #[test]
    fn test_low_entropy_secret_rejected() {
        assert!(validate_secret_strength("aaaabbbbaaaabbbb", "STRIPE_SECRET_KEY").is_err());
    }

    #[test]
    fn test_random_looking_secret_accepted() {
        assert!(validate_secret_strength("sk_test_51Hq8ZkLm2Nw9Rt4Vb7Xc", "STRIPE_SECRET_KEY").is_ok());
    }

    #[test]
    fn test_socket_addr() {
        let addr = test_config("http://localhost:5000").socket_addr();
        assert_eq!(addr.to_string(), "0.0.0.0:5000");
    }

    #[test]
    fn test_is_https_follows_base_url_scheme() {
        assert!(!test_config("http://localhost:5000").is_https());
        assert!(test_config("https://shop.example.org").is_https());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let email = EmailConfig {
            smtp_host: "smtp.mailhost.test".to_string(),
            smtp_port: 587,
            smtp_username: "orders@shop.test".to_string(),
            smtp_password: SecretString::from("Qm9vb3Rz-t0p-S3cr3t"),
            from_address: "orders@shop.test".to_string(),
        };
        let payments = PaymentConfig {
            secret_key: SecretString::from("sk_live_abcdefXYZ123"),
            currency: "usd".to_string(),
            api_base: "https://api.stripe.com".to_string(),
        };

        let debug_output = format!("{email:?} {payments:?}");
        assert!(debug_output.contains("smtp.mailhost.test"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("Qm9vb3Rz-t0p-S3cr3t"));
        assert!(!debug_output.contains("sk_live_abcdefXYZ123"));
    }
}
