use crate::error::Result;
use crate::services::backend_client::validate_base_url;
use crate::services::config_service::{self, Config};

pub fn get_base_url() -> Result<String> {
    Ok(config_service::load_config()?.base_url)
}

/// Store a new backend URL, returning it normalised
pub fn set_base_url(url: &str) -> Result<String> {
    let url = validate_base_url(url)?;
    config_service::update_config(|c| c.base_url = url.clone())?;
    tracing::info!("Backend URL set to {}", url);
    Ok(url)
}

pub fn get_model() -> Result<Option<String>> {
    Ok(config_service::load_config()?.model)
}

pub fn set_model(model: &str) -> Result<()> {
    let model = model.trim();
    config_service::update_config(|c| {
        c.model = (!model.is_empty()).then(|| model.to_string());
    })?;
    Ok(())
}

pub fn get_config() -> Result<Config> {
    Ok(config_service::load_config()?)
}
