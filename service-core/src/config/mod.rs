use crate::error::AppError;
use config::{Config, ConfigBuilder, Environment, File, builder::DefaultState};
use std::path::{Path, PathBuf};

/// Locate the `config` directory of a workspace member.
///
/// Services are started either from the workspace root or from inside their
/// own crate directory, so both layouts are accepted.
pub fn configuration_directory(crate_dir_name: &str) -> Result<PathBuf, AppError> {
    let base_path = std::env::current_dir()?;

    if base_path.ends_with(crate_dir_name) {
        Ok(base_path.join("config"))
    } else {
        Ok(base_path.join(crate_dir_name).join("config"))
    }
}

/// Layered configuration builder shared by every service.
///
/// Sources in increasing precedence: `<dir>/base.yaml` (optional) and
/// `APP_`-prefixed environment variables using `__` as the nesting separator.
/// Callers add defaults and overrides on the returned builder.
pub fn layered_builder(configuration_directory: &Path) -> ConfigBuilder<DefaultState> {
    dotenvy::dotenv().ok();

    Config::builder()
        .add_source(File::from(configuration_directory.join("base.yaml")).required(false))
        .add_source(
            Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
}

/// First non-blank value among the given environment variables.
pub fn env_value(keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| std::env::var(key).ok())
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}
