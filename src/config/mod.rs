use std::fs;

use log::{debug, trace};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::error::{GateError, GateResult};

/// Layer-wide configuration: default landing route, session key prefix and
/// the chrome template ids used by the composer.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Config {
    /// Route callers land on when an intent carries no explicit return URL,
    /// and the target of the access-denied composition.
    #[validate(length(min = 1))]
    pub default_route: String,

    /// Canonical name of the default route, used for the `activeLink` marker
    #[serde(default = "Config::default_route_name")]
    pub default_route_name: String,

    /// Prefix for session keys written by the built-in actions
    #[serde(default = "Config::default_session_prefix")]
    pub session_prefix: String,

    #[validate(nested)]
    #[serde(default)]
    pub templates: TemplateIds,

    #[serde(default)]
    pub log: Log,
}

// Config file load and validation
impl Config {
    pub fn load_from_yaml<P>(path: P) -> GateResult<Self>
    where
        P: AsRef<std::path::Path> + std::fmt::Display,
    {
        let conf_str = fs::read_to_string(&path)
            .map_err(|e| GateError::Configuration(format!("Unable to read conf file from {path}: {e}")))?;
        debug!("Conf file read from {path}");
        Self::from_yaml(&conf_str)
    }

    pub fn from_yaml(conf_str: &str) -> GateResult<Self> {
        trace!("Read conf file: {conf_str}");
        let conf: Config = serde_yaml::from_str(conf_str)
            .map_err(|e| GateError::Configuration(format!("Unable to parse yaml conf: {e}")))?;

        trace!("Loaded conf: {conf:?}");

        // use validator to validate conf file
        conf.validate()
            .map_err(|e| GateError::Configuration(format!("Conf file validation failed: {e}")))?;

        Ok(conf)
    }

    #[allow(dead_code)]
    pub fn to_yaml(&self) -> String {
        serde_yaml::to_string(self).unwrap_or_default()
    }

    fn default_route_name() -> String {
        "console_index".to_string()
    }

    fn default_session_prefix() -> String {
        "console".to_string()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_route: "/".to_string(),
            default_route_name: Self::default_route_name(),
            session_prefix: Self::default_session_prefix(),
            templates: TemplateIds::default(),
            log: Log::default(),
        }
    }
}

/// Template ids for the chrome the composer renders around forwarded content
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TemplateIds {
    /// Fallback content template for canned intents
    #[validate(length(min = 1))]
    #[serde(default = "TemplateIds::default_content")]
    pub content_default: String,

    #[validate(length(min = 1))]
    #[serde(default = "TemplateIds::default_breadcrumbs")]
    pub breadcrumbs: String,

    #[validate(length(min = 1))]
    #[serde(default = "TemplateIds::default_flashes")]
    pub flashes: String,

    #[validate(length(min = 1))]
    #[serde(default = "TemplateIds::default_search_results")]
    pub search_results: String,
}

impl TemplateIds {
    fn default_content() -> String {
        "core:default:index".to_string()
    }

    fn default_breadcrumbs() -> String {
        "core:default:breadcrumbs".to_string()
    }

    fn default_flashes() -> String {
        "core:default:flashes".to_string()
    }

    fn default_search_results() -> String {
        "core:default:globalsearchresults".to_string()
    }
}

impl Default for TemplateIds {
    fn default() -> Self {
        Self {
            content_default: Self::default_content(),
            breadcrumbs: Self::default_breadcrumbs(),
            flashes: Self::default_flashes(),
            search_results: Self::default_search_results(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Log {
    #[serde(default = "Log::default_level")]
    pub level: String,
}

impl Log {
    fn default_level() -> String {
        "info".to_string()
    }
}

impl Default for Log {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
        }
    }
}
