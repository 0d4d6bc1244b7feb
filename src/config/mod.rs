pub mod settings;

pub use settings::Config;

use crate::error::DexError;
use std::sync::Arc;

/// Loads `.env` (if present), reads the environment and validates the result.
pub fn load_config() -> Result<Arc<Config>, DexError> {
    let config = load_config_with(|_| {})?;
    config.log_settings();
    Ok(config)
}

/// Same as [`load_config`], but lets command-line flags override the environment
/// before validation. Does not log the settings.
pub fn load_config_with(overrides: impl FnOnce(&mut Config)) -> Result<Arc<Config>, DexError> {
    dotenv::dotenv().ok();

    let mut config = Config::from_env();
    overrides(&mut config);
    config.validate()?;

    Ok(Arc::new(config))
}
