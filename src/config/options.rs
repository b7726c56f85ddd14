// src/config/options.rs
use std::collections::HashSet;
use std::path::PathBuf;

use super::consts::*;
use crate::error::ConfigError;

/// Runtime options, read once at startup and handed to the collaborators.
#[derive(Clone, PartialEq, Eq)]
pub struct Options {
    pub customer: String,
    /// Hex MD5 of the customer code; the code itself is never kept.
    pub customer_hash: String,
    pub portal_url: String,
    pub cache_path: PathBuf,
    pub webhook_url: Option<String>,
    pub slack_bearer: Option<String>,
    pub no_mention_users: HashSet<String>,
    pub blocks_workaround: bool,
    pub health_file: Option<PathBuf>,
}

impl Options {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, with the variable source supplied by the caller.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let customer = get("KLANT_NUMMER").ok_or(ConfigError::Missing("KLANT_NUMMER"))?;
        let code = get("KLANT_CODE").ok_or(ConfigError::Missing("KLANT_CODE"))?;

        let blocks_workaround = match get("SLACK_DOTDOT_BUG_WORKAROUND") {
            Some(v) => parse_flag(&v).ok_or(ConfigError::Invalid {
                key: "SLACK_DOTDOT_BUG_WORKAROUND",
                value: v,
            })?,
            None => false,
        };

        let no_mention_users = get("SLACK_NO_MENTION_USERS")
            .map(|v| v.split_whitespace().map(String::from).collect())
            .unwrap_or_default();

        Ok(Self {
            customer,
            customer_hash: hash_credential(&code),
            portal_url: get("ALERTMOBILE_URL").unwrap_or_else(|| s!(PORTAL_URL)),
            cache_path: get("ALARM_RELAY_CACHE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(STORE_DIR).join(CACHE_FILE)),
            webhook_url: get("SLACK_WEBHOOK_URL"),
            slack_bearer: get("SLACK_API_BEARER"),
            no_mention_users,
            blocks_workaround,
            health_file: get("HEALTH_FILE").map(PathBuf::from),
        })
    }

    /// Publishing needs a webhook; print mode does not.
    pub fn webhook_url(&self) -> Result<&str, ConfigError> {
        self.webhook_url
            .as_deref()
            .ok_or(ConfigError::Missing("SLACK_WEBHOOK_URL"))
    }
}

/// The portal login form takes the lowercase hex MD5 of the customer code.
pub fn hash_credential(code: &str) -> String {
    format!("{:x}", md5::compute(code.as_bytes()))
}

fn parse_flag(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
