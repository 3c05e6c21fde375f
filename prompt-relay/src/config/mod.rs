use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::str::FromStr;

const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_TEXT_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub common: core_config::Config,
    pub provider: ProviderKind,
    pub gemini: GeminiSettings,
    /// OTLP collector; span export is off when unset.
    pub otlp_endpoint: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub api_key: Secret<String>,
    pub api_base: String,
    /// Model for generate and recommendation calls.
    pub text_model: String,
    /// Model for raw chat pass-through.
    pub chat_model: String,
    pub timeout_secs: u64,
}

/// Which `TextProvider` backs the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Gemini,
    Mock,
}

impl FromStr for ProviderKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(ProviderKind::Gemini),
            "mock" => Ok(ProviderKind::Mock),
            other => Err(AppError::ConfigError(anyhow::anyhow!(
                "RELAY_PROVIDER must be 'gemini' or 'mock', got '{}'",
                other
            ))),
        }
    }
}

impl RelayConfig {
    pub fn load() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;
        Self::from_lookup(common, |key| env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup<F>(common: core_config::Config, lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let is_prod = lookup("ENVIRONMENT").as_deref() == Some("prod");
        let get = |key: &str, default: Option<&str>| get_env(&lookup, key, default, is_prod);

        let provider: ProviderKind = get("RELAY_PROVIDER", Some("gemini"))?.parse()?;

        // The mock never talks to Gemini, so it does not need a key.
        let api_key = match provider {
            ProviderKind::Gemini => get("GEMINI_API_KEY", None)?,
            ProviderKind::Mock => lookup("GEMINI_API_KEY").unwrap_or_default(),
        };
        if provider == ProviderKind::Gemini && api_key.trim().is_empty() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "GEMINI_API_KEY must not be empty"
            )));
        }

        let text_model = get("GEMINI_TEXT_MODEL", Some(DEFAULT_TEXT_MODEL))?;
        let chat_model = get("GEMINI_CHAT_MODEL", Some(text_model.as_str()))?;
        let default_timeout = DEFAULT_TIMEOUT_SECS.to_string();
        let timeout_secs = get("GEMINI_TIMEOUT_SECS", Some(default_timeout.as_str()))?
            .parse::<u64>()
            .map_err(|e| {
                AppError::ConfigError(anyhow::anyhow!(
                    "GEMINI_TIMEOUT_SECS is not a number: {}",
                    e
                ))
            })?;

        Ok(RelayConfig {
            common,
            provider,
            gemini: GeminiSettings {
                api_key: Secret::new(api_key),
                api_base: get("GEMINI_API_BASE", Some(DEFAULT_API_BASE))?
                    .trim_end_matches('/')
                    .to_string(),
                text_model,
                chat_model,
                timeout_secs,
            },
            otlp_endpoint: lookup("OTLP_ENDPOINT").filter(|v| !v.trim().is_empty()),
        })
    }
}

fn get_env<F>(
    lookup: &F,
    key: &str,
    default: Option<&str>,
    is_prod: bool,
) -> Result<String, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(val) => Ok(val),
        None => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
