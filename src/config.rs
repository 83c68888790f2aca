use crate::error::{Result, SyncError};
use std::time::Duration;

/// Well-known registrar API endpoints
pub const REGISTRAR_ENDPOINT_LIVE: &str = "https://api.domrobot.com/jsonrpc/";
pub const REGISTRAR_ENDPOINT_OTE: &str = "https://api.ote.domrobot.com/jsonrpc/";

/// Default path of the local export artifact
pub const DEFAULT_EXPORT_FILE: &str = "dnsseckeydata.json";

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the control-plane remote API
    pub control_plane_url: Option<String>,

    /// Control-plane API credentials
    pub control_plane_user: Option<String>,
    pub control_plane_password: Option<String>,

    /// Registrar JSON-RPC endpoint
    pub registrar_url: String,

    /// Registrar API credentials
    pub registrar_user: Option<String>,
    pub registrar_password: Option<String>,

    /// Path of the JSON export artifact written by `export` and read back
    /// by the registrar actions
    pub export_file: String,

    /// Timeout applied to every API request
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            control_plane_url: None,
            control_plane_user: None,
            control_plane_password: None,
            registrar_url: REGISTRAR_ENDPOINT_LIVE.to_string(),
            registrar_user: None,
            registrar_password: None,
            export_file: DEFAULT_EXPORT_FILE.to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl Config {
    /// Create a Config from environment variables
    /// Returns Err if a provided value is invalid
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("DNSSEC_SYNC_CONTROL_PLANE_URL") {
            config.control_plane_url = Some(url);
        }
        if let Ok(user) = std::env::var("DNSSEC_SYNC_CONTROL_PLANE_USER") {
            config.control_plane_user = Some(user);
        }
        if let Ok(pass) = std::env::var("DNSSEC_SYNC_CONTROL_PLANE_PASS") {
            config.control_plane_password = Some(pass);
        }

        // The registrar runs a production system and a test (OTE) system;
        // an explicit URL overrides the endpoint selector.
        if let Ok(endpoint) = std::env::var("DNSSEC_SYNC_REGISTRAR_ENDPOINT") {
            config.registrar_url = match endpoint.to_ascii_lowercase().as_str() {
                "live" => REGISTRAR_ENDPOINT_LIVE.to_string(),
                "ote" => REGISTRAR_ENDPOINT_OTE.to_string(),
                other => {
                    return Err(SyncError::Config(format!(
                        "Invalid registrar endpoint '{}', expected 'live' or 'ote'",
                        other
                    )));
                }
            };
        }
        if let Ok(url) = std::env::var("DNSSEC_SYNC_REGISTRAR_URL") {
            config.registrar_url = url;
        }
        if let Ok(user) = std::env::var("DNSSEC_SYNC_REGISTRAR_USER") {
            config.registrar_user = Some(user);
        }
        if let Ok(pass) = std::env::var("DNSSEC_SYNC_REGISTRAR_PASS") {
            config.registrar_password = Some(pass);
        }

        if let Ok(path) = std::env::var("DNSSEC_SYNC_EXPORT_FILE") {
            if path.is_empty() {
                return Err(SyncError::Config(
                    "Export file path must not be empty".to_string(),
                ));
            }
            config.export_file = path;
        }

        if let Ok(timeout_str) = std::env::var("DNSSEC_SYNC_TIMEOUT") {
            let timeout_secs = timeout_str
                .parse::<u64>()
                .map_err(|_| SyncError::Config(format!("Invalid timeout: {}", timeout_str)))?;
            if timeout_secs == 0 {
                return Err(SyncError::Config(
                    "Timeout must be greater than 0".to_string(),
                ));
            }
            config.request_timeout = Duration::from_secs(timeout_secs);
        }

        Ok(config)
    }

    /// Control-plane connection settings, or a Config error naming what is missing
    pub fn control_plane_credentials(&self) -> Result<(&str, &str, &str)> {
        match (
            &self.control_plane_url,
            &self.control_plane_user,
            &self.control_plane_password,
        ) {
            (Some(url), Some(user), Some(pass)) => Ok((url, user, pass)),
            _ => Err(SyncError::Config(
                "Control plane is not configured (set DNSSEC_SYNC_CONTROL_PLANE_URL/_USER/_PASS)"
                    .to_string(),
            )),
        }
    }

    /// Registrar credentials, or a Config error naming what is missing
    pub fn registrar_credentials(&self) -> Result<(&str, &str)> {
        match (&self.registrar_user, &self.registrar_password) {
            (Some(user), Some(pass)) => Ok((user, pass)),
            _ => Err(SyncError::Config(
                "Registrar is not configured (set DNSSEC_SYNC_REGISTRAR_USER/_PASS)".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_points_at_live_endpoint() {
        let config = Config::default();
        assert_eq!(config.registrar_url, REGISTRAR_ENDPOINT_LIVE);
        assert_eq!(config.export_file, DEFAULT_EXPORT_FILE);
    }

    #[test]
    fn missing_credentials_are_config_errors() {
        let config = Config::default();
        assert!(matches!(
            config.registrar_credentials(),
            Err(SyncError::Config(_))
        ));
        assert!(matches!(
            config.control_plane_credentials(),
            Err(SyncError::Config(_))
        ));
    }
}
