//! Configuration management for the submitter
//!
//! Credentials and knobs are read from the process environment once at
//! startup and threaded through an explicit `Settings` struct; nothing else
//! in the crate touches `std::env`.

use crate::error::{SubmitterError, SubmitterResult};

use ethers::types::Address;
use std::env;
use std::fmt;

/// Default gas limit for a single well-known contract call.
const DEFAULT_CALL_GAS_LIMIT: u64 = 500_000;
/// Default gas limit for a contract-creation transaction.
const DEFAULT_DEPLOY_GAS_LIMIT: u64 = 3_000_000;
/// Default interval between deployment-receipt polls.
const DEFAULT_RECEIPT_POLL_INTERVAL_MS: u64 = 3_000;
/// Default number of deployment-receipt polls before giving up.
const DEFAULT_RECEIPT_POLL_ATTEMPTS: u32 = 40;

/// Root configuration structure
#[derive(Clone)]
pub struct Settings {
    /// JSON-RPC endpoint of the hosted node (usually embeds an API key)
    pub endpoint_url: String,
    /// Account address transactions are sent from
    pub public_key: Address,
    /// Hex-encoded signing key for that account
    pub private_key: String,
    pub gas: GasSettings,
    pub receipt_poll_interval_ms: u64,
    pub receipt_poll_attempts: u32,
}

#[derive(Debug, Clone)]
pub struct GasSettings {
    pub call_gas_limit: u64,
    pub deploy_gas_limit: u64,
    /// Fixed gas price in gwei; when absent the node's quote is used
    pub gas_price_gwei: Option<u64>,
}

impl Settings {
    /// Load settings from the process environment
    pub fn from_env() -> SubmitterResult<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Load settings through an injectable variable lookup
    pub fn from_vars<F>(get: F) -> SubmitterResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let endpoint_url = require(&get, "ENDPOINT_URL")?;
        let public_key = require(&get, "PUBLIC_KEY")?
            .parse::<Address>()
            .map_err(|e| SubmitterError::Config(format!("PUBLIC_KEY is not an address: {e}")))?;
        let private_key = require(&get, "PRIVATE_KEY")?;

        let gas = GasSettings {
            call_gas_limit: optional(&get, "GAS_LIMIT", DEFAULT_CALL_GAS_LIMIT)?,
            deploy_gas_limit: optional(&get, "DEPLOY_GAS_LIMIT", DEFAULT_DEPLOY_GAS_LIMIT)?,
            gas_price_gwei: get("GAS_PRICE_GWEI")
                .map(|raw| parse_var("GAS_PRICE_GWEI", &raw))
                .transpose()?,
        };

        let settings = Settings {
            endpoint_url,
            public_key,
            private_key,
            gas,
            receipt_poll_interval_ms: optional(
                &get,
                "RECEIPT_POLL_INTERVAL_MS",
                DEFAULT_RECEIPT_POLL_INTERVAL_MS,
            )?,
            receipt_poll_attempts: optional(
                &get,
                "RECEIPT_POLL_ATTEMPTS",
                DEFAULT_RECEIPT_POLL_ATTEMPTS,
            )?,
        };

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> SubmitterResult<()> {
        if !self.endpoint_url.starts_with("http://") && !self.endpoint_url.starts_with("https://") {
            return Err(SubmitterError::Config(
                "ENDPOINT_URL must be an http(s) URL".to_string(),
            ));
        }
        if self.gas.call_gas_limit == 0 || self.gas.deploy_gas_limit == 0 {
            return Err(SubmitterError::Config(
                "gas limits must be non-zero".to_string(),
            ));
        }
        if self.receipt_poll_attempts == 0 {
            return Err(SubmitterError::Config(
                "RECEIPT_POLL_ATTEMPTS must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

// The endpoint URL and private key are credentials; keep both out of logs.
impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("endpoint_url", &"<redacted>")
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .field("gas", &self.gas)
            .field("receipt_poll_interval_ms", &self.receipt_poll_interval_ms)
            .field("receipt_poll_attempts", &self.receipt_poll_attempts)
            .finish()
    }
}

fn require<F>(get: &F, key: &str) -> SubmitterResult<String>
where
    F: Fn(&str) -> Option<String>,
{
    get(key)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| SubmitterError::Config(format!("{key} is not set")))
}

fn optional<F, T>(get: &F, key: &str, default: T) -> SubmitterResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    match get(key) {
        Some(raw) => parse_var(key, &raw),
        None => Ok(default),
    }
}

fn parse_var<T>(key: &str, raw: &str) -> SubmitterResult<T>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    raw.parse::<T>()
        .map_err(|e| SubmitterError::Config(format!("{key} is malformed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base_vars() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("ENDPOINT_URL", "https://eth-sepolia.example.com/v2/key"),
            ("PUBLIC_KEY", "0xdf4040d90362e0f4c19d0a35c5c8b7c370f18cc8"),
            (
                "PRIVATE_KEY",
                "4c0883a69102937d6231471b5dcb26f09a6a0a6af2efdb135c109f0d9b723bba",
            ),
        ])
    }

    fn load(vars: &HashMap<&str, &str>) -> SubmitterResult<Settings> {
        Settings::from_vars(|key| vars.get(key).map(|v| v.to_string()))
    }

    #[test]
    fn loads_with_defaults() {
        let settings = load(&base_vars()).unwrap();
        assert_eq!(settings.gas.call_gas_limit, DEFAULT_CALL_GAS_LIMIT);
        assert_eq!(settings.gas.deploy_gas_limit, DEFAULT_DEPLOY_GAS_LIMIT);
        assert_eq!(settings.gas.gas_price_gwei, None);
        assert_eq!(settings.receipt_poll_attempts, DEFAULT_RECEIPT_POLL_ATTEMPTS);
    }

    #[test]
    fn missing_private_key_is_a_config_error() {
        let mut vars = base_vars();
        vars.remove("PRIVATE_KEY");
        assert!(matches!(load(&vars), Err(SubmitterError::Config(_))));
    }

    #[test]
    fn malformed_public_key_is_a_config_error() {
        let mut vars = base_vars();
        vars.insert("PUBLIC_KEY", "not-an-address");
        assert!(matches!(load(&vars), Err(SubmitterError::Config(_))));
    }

    #[test]
    fn non_http_endpoint_is_rejected() {
        let mut vars = base_vars();
        vars.insert("ENDPOINT_URL", "ws://eth.example.com");
        assert!(matches!(load(&vars), Err(SubmitterError::Config(_))));
    }

    #[test]
    fn gas_price_override_is_parsed() {
        let mut vars = base_vars();
        vars.insert("GAS_PRICE_GWEI", "25");
        let settings = load(&vars).unwrap();
        assert_eq!(settings.gas.gas_price_gwei, Some(25));
    }

    #[test]
    fn debug_output_never_contains_credentials() {
        let vars = base_vars();
        let settings = load(&vars).unwrap();
        let rendered = format!("{settings:?}");
        assert!(!rendered.contains(vars["PRIVATE_KEY"]));
        assert!(!rendered.contains(vars["ENDPOINT_URL"]));
    }
}
