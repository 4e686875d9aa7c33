use std::path::Path;

use thiserror::Error;

use airseed_generate::GenerateOptions;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("failed to encode config: {0}")]
    Encode(#[from] toml::ser::Error),
}

/// Load generation options from a TOML file. Missing keys keep their defaults;
/// without a file the defaults are used as is.
pub fn load_options(path: Option<&Path>) -> Result<GenerateOptions, SettingsError> {
    let Some(path) = path else {
        return Ok(GenerateOptions::default());
    };
    let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
        path: path.display().to_string(),
        source,
    })?;
    parse_options(&content).map_err(|source| SettingsError::Parse {
        path: path.display().to_string(),
        source,
    })
}

pub fn parse_options(content: &str) -> Result<GenerateOptions, toml::de::Error> {
    toml::from_str(content)
}

/// JSON Schema describing the configuration file.
pub fn config_schema() -> schemars::schema::RootSchema {
    schemars::schema_for!(GenerateOptions)
}

/// Default options rendered as TOML, suitable as a starting config file.
pub fn default_options_toml() -> Result<String, SettingsError> {
    Ok(toml::to_string_pretty(&GenerateOptions::default())?)
}
