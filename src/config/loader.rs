use std::{env, path::PathBuf, str::FromStr, time::Duration};

use super::env::{
    AppConfig, ConfigError, DirectoryConfig, FailurePolicy, LoggingConfig, ModelConfig,
    RegistrationConfig, WhoisConfig,
};

pub const DEFAULT_WHOIS_API_URL: &str = "https://www.whoisxmlapi.com/whoisserver/WhoisService";

pub fn load_config() -> Result<AppConfig, ConfigError> {
    AppConfig::from_lookup(|key| env::var(key).ok())
}

impl AppConfig {
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_addr = parse_or("BIND_ADDR", var("BIND_ADDR"), "0.0.0.0:8000".parse().ok())?;

        let model = ModelConfig {
            path: PathBuf::from(
                var("MODEL_PATH").unwrap_or_else(|| "models/phishing_model.onnx".to_string()),
            ),
        };

        let timeout_ms: u64 = parse_or("WHOIS_TIMEOUT_MS", var("WHOIS_TIMEOUT_MS"), Some(5_000))?;
        if timeout_ms == 0 {
            return Err(ConfigError::Zero("WHOIS_TIMEOUT_MS"));
        }

        let whois = WhoisConfig {
            api_url: var("WHOIS_API_URL").unwrap_or_else(|| DEFAULT_WHOIS_API_URL.to_string()),
            api_key: var("WHOIS_API_KEY"),
            timeout: Duration::from_millis(timeout_ms),
            max_retries: parse_or("WHOIS_MAX_RETRIES", var("WHOIS_MAX_RETRIES"), Some(0))?,
        };

        let recent_days: i64 = parse_or(
            "RECENT_REGISTRATION_DAYS",
            var("RECENT_REGISTRATION_DAYS"),
            Some(180),
        )?;
        if recent_days <= 0 {
            return Err(ConfigError::Zero("RECENT_REGISTRATION_DAYS"));
        }

        let failure_policy = match var("WHOIS_FAILURE_POLICY") {
            Some(value) => FailurePolicy::parse(&value).ok_or(ConfigError::Invalid {
                key: "WHOIS_FAILURE_POLICY",
                value,
            })?,
            None => FailurePolicy::default(),
        };

        let recent_threshold =
            chrono::Duration::try_days(recent_days).ok_or_else(|| ConfigError::Invalid {
                key: "RECENT_REGISTRATION_DAYS",
                value: recent_days.to_string(),
            })?;

        let registration = RegistrationConfig {
            recent_threshold,
            failure_policy,
        };

        let directories = DirectoryConfig {
            logs_dir: var("LOGS_DIR").unwrap_or_else(|| "logs".to_string()),
        };

        let logging = LoggingConfig {
            level: var("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        };

        Ok(Self {
            bind_addr,
            model,
            whois,
            registration,
            directories,
            logging,
        })
    }
}

fn parse_or<T: FromStr>(
    key: &'static str,
    value: Option<String>,
    default: Option<T>,
) -> Result<T, ConfigError> {
    match value {
        Some(value) => value
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => default.ok_or(ConfigError::Invalid {
            key,
            value: String::new(),
        }),
    }
}
