use crate::domain::aggregation::DateOrder;
use crate::infrastructure::error::ClientError;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use url::Url;

pub const CLIENT_JSON: &str = "client.json";
const SUPPORTED_SCHEMA: u8 = 1;
const DEFAULT_BACK_URL: &str = "http://localhost:4000/api";
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    pub schema: u8,
    pub back_url: String,
    /// IANA name; `None` follows the machine's local zone.
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub date_order: DateOrder,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            schema: SUPPORTED_SCHEMA,
            back_url: DEFAULT_BACK_URL.to_string(),
            timezone: None,
            log_level: default_log_level(),
            date_order: DateOrder::Ascending,
        }
    }
}

impl ClientConfig {
    pub fn back_url(&self) -> Result<Url, ClientError> {
        Url::parse(self.back_url.trim())
            .map_err(|error| ClientError::InvalidConfig(format!("invalid backUrl '{}': {error}", self.back_url)))
    }

    pub fn timezone(&self) -> Result<Option<Tz>, ClientError> {
        self.timezone
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| {
                value
                    .parse::<Tz>()
                    .map_err(|error| ClientError::InvalidConfig(format!("invalid timezone '{value}': {error}")))
            })
            .transpose()
    }

    fn validate(&self, path: &Path) -> Result<(), ClientError> {
        if self.schema != SUPPORTED_SCHEMA {
            return Err(ClientError::InvalidConfig(format!(
                "unsupported schema {} in {}",
                self.schema,
                path.display()
            )));
        }
        self.back_url()?;
        self.timezone()?;
        Ok(())
    }
}

pub fn ensure_default_config(config_dir: &Path) -> Result<(), ClientError> {
    let path = config_dir.join(CLIENT_JSON);
    if !path.exists() {
        let formatted = serde_json::to_string_pretty(&ClientConfig::default())?;
        fs::write(path, format!("{formatted}\n"))?;
    }
    Ok(())
}

pub fn load_config(config_dir: &Path) -> Result<ClientConfig, ClientError> {
    let path = config_dir.join(CLIENT_JSON);
    let raw = fs::read_to_string(&path)?;
    let parsed: serde_json::Value = serde_json::from_str(&raw)?;
    if parsed.get("schema").and_then(serde_json::Value::as_u64).is_none() {
        return Err(ClientError::InvalidConfig(format!(
            "missing schema in {}",
            path.display()
        )));
    }
    let config: ClientConfig = serde_json::from_value(parsed)
        .map_err(|error| ClientError::InvalidConfig(format!("{}: {error}", path.display())))?;
    config.validate(&path)?;
    Ok(config)
}
