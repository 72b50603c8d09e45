use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Deserializer, Serialize};

use crate::constants::DEFAULT_LOG_LEVEL;
use crate::error::WinsResult;

/// Run configuration, merged from a TOML file, environment variables and CLI flags.
#[derive(Debug, Default, PartialEq, Deserialize)]
pub struct RunConfig {
    /// The declared WINS state
    #[serde(default)]
    pub desired: DesiredOptions,
    /// Report what would change without writing anything
    #[serde(default)]
    pub check: bool,
    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,
}

/// Raw, unvalidated WINS options as accepted from the user.
///
/// Unset fields are skipped on serialization so that an override layer never clears a value
/// coming from a lower-precedence source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DesiredOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_dns: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_lmhosts_lookup: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "adapter_names",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub adapter_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_server: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_server: Option<String>,
}

#[derive(Debug, PartialEq, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// The highest-precedence configuration layer, usually built from CLI flags.
#[derive(Debug, Default, Serialize)]
pub struct ConfigOverrides {
    pub desired: DesiredOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check: Option<bool>,
    pub log: LogOverrides,
}

#[derive(Debug, Default, Serialize)]
pub struct LogOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

impl RunConfig {
    /// Creates a run configuration from the given path, ENV prefix and overrides.
    ///
    /// ### Arguments
    /// - `path` - an optional path to a TOML configuration file, which must exist if given
    /// - `env_prefix` - ENV prefix to use for overrides, nested keys are separated by `__`
    /// - `overrides` - values taking precedence over both the file and the environment
    pub fn load(
        path: Option<&Path>,
        env_prefix: &str,
        overrides: &ConfigOverrides,
    ) -> WinsResult<Self> {
        let mut figment = Figment::new();

        if let Some(path) = path {
            if !path.is_file() {
                return Err(figment::Error::from(format!(
                    "configuration file '{}' does not exist",
                    path.display()
                ))
                .into());
            }

            figment = figment.merge(Toml::file(path));
        }

        let env = Env::prefixed(env_prefix).split("__");
        let verbatim = verbatim_env(&env);

        figment = figment.merge(env);
        for (key, value) in verbatim {
            figment = figment.merge(Serialized::default(key, value));
        }

        let config = figment.merge(Serialized::defaults(overrides)).extract()?;

        Ok(config)
    }
}

/// String-valued keys whose environment values are kept as written.
///
/// `Env` parses values, so a scope like `10.20` would otherwise arrive as the float `10.2`.
const VERBATIM_ENV_KEYS: [&str; 4] = [
    "desired.scope_id",
    "desired.primary_server",
    "desired.secondary_server",
    "log.level",
];

fn verbatim_env(env: &Env) -> Vec<(&'static str, String)> {
    env.iter()
        .filter_map(|(key, value)| {
            VERBATIM_ENV_KEYS
                .iter()
                .find(|verbatim| key.as_str().eq_ignore_ascii_case(verbatim))
                .map(|verbatim| (*verbatim, value))
        })
        .collect()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    String(String),
    Integer(i64),
    Unsigned(u64),
    Float(f64),
    Bool(bool),
}

impl From<Scalar> for String {
    fn from(scalar: Scalar) -> Self {
        match scalar {
            Scalar::String(value) => value,
            Scalar::Integer(value) => value.to_string(),
            Scalar::Unsigned(value) => value.to_string(),
            Scalar::Float(value) => value.to_string(),
            Scalar::Bool(value) => value.to_string(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<Scalar>),
    One(Scalar),
}

/// Accepts a list of names, or a single name, where numeric names like `2` are kept as text.
fn adapter_names<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let names = match OneOrMany::deserialize(deserializer)? {
        OneOrMany::Many(names) => names.into_iter().map(String::from).collect(),
        OneOrMany::One(name) => vec![String::from(name)],
    };

    Ok(names)
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}
