use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::lenient;

pub const DEFAULT_CENTER_X: i64 = -1;
pub const DEFAULT_OFFSET_Y: i64 = 0;
pub const DEFAULT_PATTERN_COUNT: i64 = 3;
pub const DEFAULT_PATTERN_COUNTS: [i64; 3] = [1, 2, 2];
pub const DEFAULT_REPEAT_COUNT: i64 = 4;
pub const DEFAULT_REPEAT_DURATIONS: [i64; 4] = [30, 24, 10, 6];
pub const DEFAULT_PRELOAD_AT_EVERY_SCENE: bool = true;

/// Top-level configuration document. List entries stay as raw JSON so each
/// one can be decoded (and rejected) on its own.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PictureConfigDocument {
    #[serde(default)]
    pub actor_pictures: Vec<Value>,
    #[serde(default)]
    pub picture_calibrations: Vec<Value>,
    #[serde(default)]
    pub animation_pictures: Vec<Value>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_bool",
        skip_serializing_if = "Option::is_none"
    )]
    pub preload_all_pictures_at_every_scene: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorPictureDef {
    #[serde(deserialize_with = "lenient::int")]
    pub actor_id: i64,
    #[serde(default)]
    pub normal_pictures: Vec<String>,
    #[serde(default)]
    pub state_pictures: Vec<StatePictureDef>,
    #[serde(default)]
    pub damage_pictures: Vec<DamagePictureDef>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatePictureDef {
    #[serde(deserialize_with = "lenient::int")]
    pub state_id: i64,
    #[serde(default)]
    pub pictures: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DamagePictureDef {
    #[serde(deserialize_with = "lenient::int")]
    pub damage_rate: i64,
    #[serde(default)]
    pub pictures: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationDef {
    pub picture_name: String,
    #[serde(default, deserialize_with = "lenient::opt_int")]
    pub center_x: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_int")]
    pub offset_y: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationDef {
    pub picture_name: String,
    #[serde(default, deserialize_with = "lenient::opt_int")]
    pub num_pattern: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_int_list")]
    pub pattern_counts: Option<Vec<i64>>,
    #[serde(default, deserialize_with = "lenient::opt_int")]
    pub num_repeat: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_int_list")]
    pub repeat_durations: Option<Vec<i64>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PictureSettings {
    pub preload_all_at_every_scene: bool,
}

impl Default for PictureSettings {
    fn default() -> Self {
        Self {
            preload_all_at_every_scene: DEFAULT_PRELOAD_AT_EVERY_SCENE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigSection {
    ActorPictures,
    PictureCalibrations,
    AnimationPictures,
}

impl ConfigSection {
    pub fn key(self) -> &'static str {
        match self {
            Self::ActorPictures => "actorPictures",
            Self::PictureCalibrations => "pictureCalibrations",
            Self::AnimationPictures => "animationPictures",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueCode {
    Malformed,
    InvalidValue,
    InvalidPictureName,
    DuplicateKey,
}

/// A non-fatal configuration problem. `Malformed`, `InvalidValue` and
/// `InvalidPictureName` drop the entry; `DuplicateKey` keeps the later one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    pub code: IssueCode,
    pub section: ConfigSection,
    pub index: usize,
    pub message: String,
}

impl ConfigIssue {
    pub fn drops_entry(&self) -> bool {
        !matches!(self.code, IssueCode::DuplicateKey)
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}: {} ({}[{}])",
            self.code,
            self.message,
            self.section.key(),
            self.index
        )
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read picture config {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed picture config json: {source}")]
    Json {
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid picture config at {path}: {source}")]
    Document {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("plugin parameters must be a json object of strings")]
    NotAnObject,
    #[error("plugin parameter {key} is not valid nested json: {source}")]
    NestedJson {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
}
