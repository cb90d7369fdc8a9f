//! Server configuration

use url::Url;

use burnout_core::SessionId;

use crate::error::ServerError;

#[derive(Debug, Clone)]
pub struct Config {
    /// Port to listen on
    pub port: u16,

    /// Public URL of the front end; payment returns land here
    pub app_base_url: String,

    /// Checkout page of the report product
    pub payment_product_url: String,

    /// SQLite database file. In-memory storage when unset.
    pub database_path: Option<String>,

    pub otp_expiry_minutes: i64,

    /// Issuances allowed per channel after the first one
    pub otp_max_resend_attempts: u32,

    /// Sessions older than this are purged with everything they own
    pub session_expiry_hours: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8001,
            app_base_url: "http://localhost:3000".to_string(),
            payment_product_url: "https://parameswaran8.gumroad.com/l/burnout-report".to_string(),
            database_path: None,
            otp_expiry_minutes: 10,
            otp_max_resend_attempts: 3,
            session_expiry_hours: 24,
        }
    }
}

impl Config {
    /// Read configuration from the environment
    ///
    /// Recognized variables: PORT, APP_BASE_URL, PAYMENT_PRODUCT_URL,
    /// DATABASE_PATH, OTP_EXPIRY_MINUTES, OTP_MAX_RESEND_ATTEMPTS and
    /// SESSION_EXPIRY_HOURS. Missing, empty or unparsable values keep the
    /// default.
    pub fn from_env() -> Self {
        fn get_env(key: &str) -> Option<String> {
            std::env::var(key).ok().filter(|s| !s.is_empty())
        }

        fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
            get_env(key).and_then(|s| s.parse().ok())
        }

        let defaults = Self::default();

        Self {
            port: parse_env("PORT").unwrap_or(defaults.port),
            app_base_url: get_env("APP_BASE_URL").unwrap_or(defaults.app_base_url),
            payment_product_url: get_env("PAYMENT_PRODUCT_URL")
                .unwrap_or(defaults.payment_product_url),
            database_path: get_env("DATABASE_PATH"),
            otp_expiry_minutes: parse_env("OTP_EXPIRY_MINUTES")
                .filter(|m: &i64| *m > 0)
                .unwrap_or(defaults.otp_expiry_minutes),
            otp_max_resend_attempts: parse_env("OTP_MAX_RESEND_ATTEMPTS")
                .unwrap_or(defaults.otp_max_resend_attempts),
            session_expiry_hours: parse_env("SESSION_EXPIRY_HOURS")
                .filter(|h: &i64| *h > 0)
                .unwrap_or(defaults.session_expiry_hours),
        }
    }

    /// Front-end URL the visitor returns to after paying
    pub fn return_url(&self, session_id: &SessionId) -> Result<Url, ServerError> {
        let mut url = Url::parse(&self.app_base_url)
            .map_err(|e| ServerError::Internal(format!("Invalid APP_BASE_URL: {}", e)))?;
        url.set_path("/");
        url.query_pairs_mut()
            .clear()
            .append_pair("payment", "success")
            .append_pair("session_id", session_id.as_str());
        Ok(url)
    }

    /// Checkout URL carrying the return URL as a query parameter
    pub fn payment_url(&self, session_id: &SessionId) -> Result<String, ServerError> {
        let return_url = self.return_url(session_id)?;
        let mut url = Url::parse(&self.payment_product_url)
            .map_err(|e| ServerError::Internal(format!("Invalid PAYMENT_PRODUCT_URL: {}", e)))?;
        url.query_pairs_mut()
            .append_pair("wanted", "true")
            .append_pair("return_url", return_url.as_str());
        Ok(url.to_string())
    }
}
