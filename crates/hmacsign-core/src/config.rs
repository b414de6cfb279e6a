//! Client configuration.
//!
//! All configuration is driven by environment variables. Every field has a
//! default, so an empty environment yields a usable header-signing client.

use tracing::warn;

use crate::types::SigningMode;

/// `detail` strings a remote server sends when a request arrived without a
/// usable session.
const DEFAULT_SESSION_REQUIRED_DETAILS: [&str; 2] =
    ["HMAC Authentication required", "5 - Sessão HMAC não iniciada"];

/// Configuration for an HMAC-signing HTTP client.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HmacClientConfig {
    /// Signing mode used with single-shot engines.
    pub signing_mode: SigningMode,
    /// Hint appended to a remote 401 when a session-capable client is told
    /// it has no session.
    pub session_expired_hint: String,
    /// Hint appended to a remote 401 when a single-shot client is told the
    /// server wants a session.
    pub session_required_hint: String,
    /// Remote `detail` values that trigger one of the two hints above.
    pub session_required_details: Vec<String>,
    /// Log level.
    pub log_level: String,
}

impl Default for HmacClientConfig {
    fn default() -> Self {
        Self {
            signing_mode: SigningMode::default(),
            session_expired_hint: "HMAC session expired".to_owned(),
            session_required_hint: "server requires HMAC session".to_owned(),
            session_required_details: DEFAULT_SESSION_REQUIRED_DETAILS
                .iter()
                .map(|s| (*s).to_owned())
                .collect(),
            log_level: "info".to_owned(),
        }
    }
}

impl HmacClientConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// An unparseable `HMAC_MODE` is logged and the default mode kept.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(v) = lookup("HMAC_MODE") {
            match SigningMode::parse(&v) {
                Ok(mode) => config.signing_mode = mode,
                Err(e) => warn!(error = %e, "ignoring HMAC_MODE"),
            }
        }
        if let Some(v) = lookup("HMAC_SESSION_EXPIRED_HINT") {
            config.session_expired_hint = v;
        }
        if let Some(v) = lookup("HMAC_SESSION_REQUIRED_HINT") {
            config.session_required_hint = v;
        }
        if let Some(v) = lookup("LOG_LEVEL") {
            config.log_level = v;
        }

        config
    }

    /// Override the signing mode.
    #[must_use]
    pub fn with_signing_mode(mut self, mode: SigningMode) -> Self {
        self.signing_mode = mode;
        self
    }

    /// Override both remote-error hints.
    #[must_use]
    pub fn with_hints(
        mut self,
        session_expired: impl Into<String>,
        session_required: impl Into<String>,
    ) -> Self {
        self.session_expired_hint = session_expired.into();
        self.session_required_hint = session_required.into();
        self
    }

    /// Whether a remote `detail` is one of the "no session" phrases.
    #[must_use]
    pub fn is_session_required_detail(&self, detail: &str) -> bool {
        self.session_required_details.iter().any(|d| d == detail)
    }
}
