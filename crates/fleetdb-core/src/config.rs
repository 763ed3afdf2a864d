use serde::Deserialize;
use thiserror::Error as ThisError;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("max_take must be greater than zero")]
    ZeroMaxTake,

    #[error("default_take ({default_take}) exceeds max_take ({max_take})")]
    DefaultTakeTooLarge { default_take: u32, max_take: u32 },

    #[error("max_include_depth must be greater than zero")]
    ZeroIncludeDepth,
}

///
/// DbConfig
///
/// Read limits applied by every delegate. Loaded from TOML:
///
/// ```toml
/// [query]
/// default_take = 50
/// max_take = 500
/// max_include_depth = 3
/// ```
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DbConfig {
    #[serde(default)]
    pub query: QueryConfig,
}

impl DbConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.query.validate()
    }
}

///
/// QueryConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct QueryConfig {
    /// Page size used when a read gives no `take`.
    #[serde(default)]
    pub default_take: Option<u32>,

    /// Upper bound for the magnitude of `take`.
    #[serde(default = "default_max_take")]
    pub max_take: u32,

    #[serde(default = "default_max_include_depth")]
    pub max_include_depth: u8,
}

impl QueryConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_take == 0 {
            return Err(ConfigError::ZeroMaxTake);
        }
        if let Some(default_take) = self.default_take
            && default_take > self.max_take
        {
            return Err(ConfigError::DefaultTakeTooLarge {
                default_take,
                max_take: self.max_take,
            });
        }
        if self.max_include_depth == 0 {
            return Err(ConfigError::ZeroIncludeDepth);
        }

        Ok(())
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_take: None,
            max_take: default_max_take(),
            max_include_depth: default_max_include_depth(),
        }
    }
}

const fn default_max_take() -> u32 {
    1_000
}

const fn default_max_include_depth() -> u8 {
    4
}
