use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;
use crate::error::{AppError, Result};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL_TIMEOUT_SECS: u64 = 60;

#[derive(Clone)]
pub struct Config {
    pub server_addr: SocketAddr,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_api_base: String,
    pub model_timeout: Duration,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("server_addr", &self.server_addr)
            .field("gemini_api_key", &"<redacted>")
            .field("gemini_model", &self.gemini_model)
            .field("gemini_api_base", &self.gemini_api_base)
            .field("model_timeout", &self.model_timeout)
            .finish()
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load environment variables from .env file if it exists
        dotenv::dotenv().ok();

        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a config from an arbitrary variable source, applying the same
    /// defaults and validation as [`Config::load`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let gemini_api_key = lookup("GEMINI_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| AppError::Config("GEMINI_API_KEY environment variable is required".to_string()))?;

        let gemini_model = lookup("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());
        let gemini_api_base = lookup("GEMINI_API_BASE")
            .unwrap_or_else(|| DEFAULT_GEMINI_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();

        let model_timeout = match lookup("MODEL_TIMEOUT_SECS") {
            Some(raw) => {
                let secs = raw.parse::<u64>().map_err(|e| AppError::Config(format!("Invalid model timeout: {}", e)))?;
                if secs == 0 {
                    return Err(AppError::Config("Invalid model timeout: must be positive".to_string()));
                }
                secs
            }
            None => DEFAULT_MODEL_TIMEOUT_SECS,
        };

        // Load server configuration with defaults
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = lookup("PORT").unwrap_or_else(|| "5000".to_string());
        let port = port.parse::<u16>().map_err(|e| AppError::Config(format!("Invalid port: {}", e)))?;
        let ip = IpAddr::from_str(&host).map_err(|e| AppError::Config(format!("Invalid host address: {}", e)))?;

        Ok(Config {
            server_addr: SocketAddr::new(ip, port),
            gemini_api_key,
            gemini_model,
            gemini_api_base,
            model_timeout: Duration::from_secs(model_timeout),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[("GEMINI_API_KEY", "secret")])).unwrap();
        assert_eq!(config.server_addr, "0.0.0.0:5000".parse().unwrap());
        assert_eq!(config.gemini_model, DEFAULT_GEMINI_MODEL);
        assert_eq!(config.gemini_api_base, DEFAULT_GEMINI_API_BASE);
        assert_eq!(config.model_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_missing_api_key_is_fatal() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));

        let err = Config::from_lookup(lookup_from(&[("GEMINI_API_KEY", "   ")])).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("GEMINI_API_KEY", "secret"),
            ("GEMINI_MODEL", "gemini-1.5-pro"),
            ("GEMINI_API_BASE", "http://localhost:9000/"),
            ("MODEL_TIMEOUT_SECS", "5"),
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
        ]))
        .unwrap();
        assert_eq!(config.server_addr, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config.gemini_model, "gemini-1.5-pro");
        assert_eq!(config.gemini_api_base, "http://localhost:9000");
        assert_eq!(config.model_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_values() {
        for (name, value) in [("PORT", "99999"), ("HOST", "not-an-ip"), ("MODEL_TIMEOUT_SECS", "0")] {
            let result = Config::from_lookup(lookup_from(&[("GEMINI_API_KEY", "secret"), (name, value)]));
            assert!(matches!(result, Err(AppError::Config(_))), "{name}={value} should be rejected");
        }
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = Config::from_lookup(lookup_from(&[("GEMINI_API_KEY", "secret")])).unwrap();
        assert!(!format!("{:?}", config).contains("secret"));
    }
}
