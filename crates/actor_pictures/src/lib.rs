pub mod assets;
pub mod clock;
pub mod commands;
pub mod config;
pub mod draw;
pub mod geometry;
pub mod host;
mod picture_names;
pub mod registry;
pub mod resolver;

pub use assets::{PictureDirectory, PictureFile, PICTURE_EXTENSION};
pub use clock::{
    frame_at, position_at, AnimationClock, AnimationProfile, AnimationProfileError, ClockPosition,
};
pub use commands::{
    execute_command, preload_names, preload_on_scene_start, preload_pictures,
    should_preload_on_scene_start, CommandError, CommandOutcome, PictureCommand, PreloadScope,
    SceneKind,
};
pub use config::{
    load_picture_config, parse_picture_config, ConfigEncoding, ConfigError, ConfigIssue,
    ConfigSection, IssueCode, LoadedPictureConfig, PictureConfigDocument, PictureSettings,
};
pub use draw::{draw_actor_picture, DrawRequest, DrawnPicture};
pub use geometry::{Alignment, ImageSize, SourceRect};
pub use host::{ActorSnapshot, ActorStatus, AssetLoader, DrawSurface, PartyRoster, PictureImage};
pub use picture_names::{validate_picture_name, PictureNameError};
pub use registry::{
    ActorId, Calibration, DamagePictures, PictureRegistry, PictureSet, StateId, StatePictures,
};
pub use resolver::{
    ActorPictureState, PictureResolver, PictureStates, PictureTier, ResolvedPicture,
};
