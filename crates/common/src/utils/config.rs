use ::config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::path::Path;

use crate::error::{CommonError, Result};

/// Optional file layered under prefixed environment variables.
/// The file format (TOML, YAML, JSON, ...) follows its extension.
///
/// With prefix `WENMO`, `WENMO__NETWORK__NODE_URL` overrides `network.node_url`.
/// Missing keys fall back to the struct's serde defaults.
pub fn load_layered<T: DeserializeOwned>(path: Option<&Path>, env_prefix: Option<&str>) -> Result<T> {
    let mut builder = Config::builder();

    if let Some(path) = path {
        let path_str = path
            .to_str()
            .ok_or_else(|| CommonError::Config(format!("Invalid config path: {:?}", path)))?;
        builder = builder.add_source(File::with_name(path_str));
    }

    if let Some(prefix) = env_prefix {
        builder = builder.add_source(
            Environment::with_prefix(prefix)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );
    }

    let settings = builder.build()?;
    Ok(settings.try_deserialize::<T>()?)
}
