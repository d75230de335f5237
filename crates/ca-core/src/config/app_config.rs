//! Application configuration DTO mapped from TOML.
//!
//! Missing keys fall back to the documented defaults. No business rules are
//! checked here beyond what is needed to type a value.

use std::path::PathBuf;
use std::time::Duration;

use crate::attachment::{AttachmentSlot, UnknownSlotError, MAX_ATTACHMENT_BYTES};

pub const DEFAULT_SUBMIT_PATH: &str = "/api/v1/companies/add";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid config value for `{key}`: {reason}")]
    InvalidValue { key: &'static str, reason: String },

    #[error(transparent)]
    UnknownSlot(#[from] UnknownSlotError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Base URL of the registration service, e.g. `https://api.example.az`.
    pub api_base_url: String,
    pub submit_path: String,
    pub request_timeout: Duration,
    /// Root for the attachment store, fragment cache and logs. `None` means
    /// the platform data directory.
    pub data_dir: Option<PathBuf>,
    pub max_attachment_bytes: u64,
    pub required_slots: Vec<AttachmentSlot>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: String::new(),
            submit_path: DEFAULT_SUBMIT_PATH.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            data_dir: None,
            max_attachment_bytes: MAX_ATTACHMENT_BYTES,
            required_slots: vec![
                AttachmentSlot::PropertyLawCertificate,
                AttachmentSlot::FinancialStatement,
            ],
        }
    }
}

impl AppConfig {
    pub fn from_toml(toml_value: &toml::Value) -> Result<Self, ConfigError> {
        let defaults = AppConfig::default();
        let api = toml_value.get("api");
        let storage = toml_value.get("storage");
        let attachments = toml_value.get("attachments");

        let api_base_url = api
            .and_then(|a| a.get("base_url"))
            .and_then(|v| v.as_str())
            .map(|s| s.trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_base_url);

        let submit_path = api
            .and_then(|a| a.get("submit_path"))
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or(defaults.submit_path);

        let request_timeout = match api.and_then(|a| a.get("timeout_secs")) {
            Some(value) => {
                let secs = value.as_integer().filter(|s| *s > 0).ok_or_else(|| {
                    ConfigError::InvalidValue {
                        key: "api.timeout_secs",
                        reason: format!("expected a positive integer, got {value}"),
                    }
                })?;
                Duration::from_secs(secs as u64)
            }
            None => defaults.request_timeout,
        };

        let data_dir = storage
            .and_then(|s| s.get("data_dir"))
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        let max_attachment_bytes = match attachments.and_then(|a| a.get("max_bytes")) {
            Some(value) => value.as_integer().filter(|b| *b > 0).ok_or_else(|| {
                ConfigError::InvalidValue {
                    key: "attachments.max_bytes",
                    reason: format!("expected a positive integer, got {value}"),
                }
            })? as u64,
            None => defaults.max_attachment_bytes,
        };

        let required_slots = match attachments.and_then(|a| a.get("required_slots")) {
            Some(value) => {
                let items = value.as_array().ok_or_else(|| ConfigError::InvalidValue {
                    key: "attachments.required_slots",
                    reason: "expected an array of slot names".to_string(),
                })?;
                items
                    .iter()
                    .map(|item| {
                        let name = item.as_str().ok_or_else(|| ConfigError::InvalidValue {
                            key: "attachments.required_slots",
                            reason: format!("expected a string, got {item}"),
                        })?;
                        Ok(name.parse::<AttachmentSlot>()?)
                    })
                    .collect::<Result<Vec<_>, ConfigError>>()?
            }
            None => defaults.required_slots,
        };

        Ok(Self {
            api_base_url,
            submit_path,
            request_timeout,
            data_dir,
            max_attachment_bytes,
            required_slots,
        })
    }

    /// Full URL of the submission endpoint.
    pub fn submit_url(&self) -> String {
        format!("{}{}", self.api_base_url, self.submit_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let value: toml::Value = toml::from_str("").unwrap();
        assert_eq!(AppConfig::from_toml(&value).unwrap(), AppConfig::default());
    }

    #[test]
    fn reads_every_section() {
        let value: toml::Value = toml::from_str(
            r#"
            [api]
            base_url = "https://api.example.az/"
            timeout_secs = 5

            [storage]
            data_dir = "/var/lib/company-apply"

            [attachments]
            max_bytes = 1024
            required_slots = ["propertyLawCertificate", "registerCertificate", "financialStatement"]
            "#,
        )
        .unwrap();

        let config = AppConfig::from_toml(&value).unwrap();
        assert_eq!(config.submit_url(), "https://api.example.az/api/v1/companies/add");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.data_dir, Some(PathBuf::from("/var/lib/company-apply")));
        assert_eq!(config.max_attachment_bytes, 1024);
        assert_eq!(config.required_slots, AttachmentSlot::ALL.to_vec());
    }

    #[test]
    fn unknown_required_slot_is_an_error() {
        let value: toml::Value = toml::from_str(
            r#"
            [attachments]
            required_slots = ["taxCertificate"]
            "#,
        )
        .unwrap();
        assert!(matches!(
            AppConfig::from_toml(&value),
            Err(ConfigError::UnknownSlot(_))
        ));
    }
}
