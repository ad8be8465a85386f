use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{info, warn};

use crate::registry::PictureRegistry;

use super::plugin_params::expand_plugin_parameters;
use super::types::{ConfigError, ConfigIssue, PictureConfigDocument, PictureSettings};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfigEncoding {
    #[default]
    Native,
    PluginParameters,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedPictureConfig {
    pub registry: PictureRegistry,
    pub settings: PictureSettings,
    pub issues: Vec<ConfigIssue>,
}

pub fn load_picture_config(
    path: &Path,
    encoding: ConfigEncoding,
) -> Result<LoadedPictureConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    parse_picture_config(&raw, encoding)
}

pub fn parse_picture_config(
    raw: &str,
    encoding: ConfigEncoding,
) -> Result<LoadedPictureConfig, ConfigError> {
    let value =
        serde_json::from_str::<Value>(raw).map_err(|source| ConfigError::Json { source })?;
    let value = match encoding {
        ConfigEncoding::Native => value,
        ConfigEncoding::PluginParameters => expand_plugin_parameters(value)?,
    };
    let document = decode_with_path::<PictureConfigDocument>(&value)
        .map_err(|(path, source)| ConfigError::Document { path, source })?;
    Ok(build_from_document(&document))
}

pub fn build_from_document(document: &PictureConfigDocument) -> LoadedPictureConfig {
    let (registry, issues) = PictureRegistry::from_document(document);
    let settings = PictureSettings {
        preload_all_at_every_scene: document
            .preload_all_pictures_at_every_scene
            .unwrap_or(PictureSettings::default().preload_all_at_every_scene),
    };

    for issue in &issues {
        warn!(
            code = ?issue.code,
            section = issue.section.key(),
            index = issue.index,
            entry_dropped = issue.drops_entry(),
            message = %issue.message,
            "picture_config_issue"
        );
    }
    info!(
        actors = registry.actor_count(),
        calibrations = registry.calibration_count(),
        animations = registry.animation_count(),
        issues = issues.len(),
        preload_all_at_every_scene = settings.preload_all_at_every_scene,
        "picture_config_loaded"
    );

    LoadedPictureConfig {
        registry,
        settings,
        issues,
    }
}

/// Deserializes `value`, returning the failing field path alongside the error.
pub(crate) fn decode_with_path<T: DeserializeOwned>(
    value: &Value,
) -> Result<T, (String, serde_json::Error)> {
    serde_path_to_error::deserialize::<_, T>(value).map_err(|error| {
        let path = error.path().to_string();
        (path, error.into_inner())
    })
}
