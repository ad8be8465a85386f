mod lenient;
mod loader;
mod plugin_params;
mod types;

pub use loader::{
    build_from_document, load_picture_config, parse_picture_config, ConfigEncoding,
    LoadedPictureConfig,
};
pub(crate) use loader::decode_with_path;
pub use plugin_params::expand_plugin_parameters;
pub use types::{
    ActorPictureDef, AnimationDef, CalibrationDef, ConfigError, ConfigIssue, ConfigSection,
    DamagePictureDef, IssueCode, PictureConfigDocument, PictureSettings, StatePictureDef,
    DEFAULT_CENTER_X, DEFAULT_OFFSET_Y, DEFAULT_PATTERN_COUNT, DEFAULT_PATTERN_COUNTS,
    DEFAULT_PRELOAD_AT_EVERY_SCENE, DEFAULT_REPEAT_COUNT, DEFAULT_REPEAT_DURATIONS,
};
