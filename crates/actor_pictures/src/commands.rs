use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing::{debug, info};

use crate::config::PictureSettings;
use crate::host::{AssetLoader, PartyRoster};
use crate::registry::{ActorId, PictureRegistry};
use crate::resolver::PictureStates;

pub const SET_PICTURE_INDEX_COMMAND: &str = "setPictureIndex";
pub const PRELOAD_PICTURES_COMMAND: &str = "preloadPictures";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PreloadScope {
    #[default]
    All,
    Party,
}

impl PreloadScope {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Party => "party",
        }
    }
}

impl fmt::Display for PreloadScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PreloadScope {
    type Err = CommandError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            "" | "all" => Ok(Self::All),
            "party" => Ok(Self::Party),
            other => Err(CommandError::InvalidArgument {
                command: PRELOAD_PICTURES_COMMAND,
                arg: "pictureScope",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown picture command '{name}'")]
    UnknownCommand { name: String },
    #[error("{command} is missing argument {arg}")]
    MissingArgument {
        command: &'static str,
        arg: &'static str,
    },
    #[error("{command} argument {arg} has invalid value '{value}'")]
    InvalidArgument {
        command: &'static str,
        arg: &'static str,
        value: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PictureCommand {
    SetCostumeIndex { actor_id: ActorId, index: usize },
    PreloadPictures { scope: PreloadScope },
}

impl PictureCommand {
    /// Decodes a scripted-event command as delivered by the host: a command
    /// name plus string arguments.
    pub fn from_plugin_command(
        name: &str,
        args: &HashMap<String, String>,
    ) -> Result<Self, CommandError> {
        match name {
            SET_PICTURE_INDEX_COMMAND => {
                let actor_id = required_number::<u32>(args, SET_PICTURE_INDEX_COMMAND, "actorId")?;
                let index =
                    required_number::<usize>(args, SET_PICTURE_INDEX_COMMAND, "pictureIndex")?;
                Ok(Self::SetCostumeIndex {
                    actor_id: ActorId(actor_id),
                    index,
                })
            }
            PRELOAD_PICTURES_COMMAND => {
                let scope = match args.get("pictureScope") {
                    Some(raw) => raw.parse::<PreloadScope>()?,
                    None => PreloadScope::default(),
                };
                Ok(Self::PreloadPictures { scope })
            }
            other => Err(CommandError::UnknownCommand {
                name: other.to_string(),
            }),
        }
    }
}

fn required_number<T: FromStr>(
    args: &HashMap<String, String>,
    command: &'static str,
    arg: &'static str,
) -> Result<T, CommandError> {
    let raw = args
        .get(arg)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .ok_or(CommandError::MissingArgument { command, arg })?;
    raw.parse::<T>().map_err(|_| CommandError::InvalidArgument {
        command,
        arg,
        value: raw.to_string(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    CostumeChanged {
        actor_id: ActorId,
        previous: usize,
        index: usize,
    },
    Preloaded {
        scope: PreloadScope,
        requested: usize,
    },
}

pub fn execute_command<P, L>(
    command: PictureCommand,
    registry: &PictureRegistry,
    states: &mut PictureStates,
    party: &P,
    loader: &mut L,
) -> CommandOutcome
where
    P: PartyRoster + ?Sized,
    L: AssetLoader + ?Sized,
{
    match command {
        PictureCommand::SetCostumeIndex { actor_id, index } => {
            let previous = states.costume_index(actor_id);
            states.set_costume_index(actor_id, index);
            info!(
                actor_id = actor_id.0,
                previous, index, "picture_costume_index_set"
            );
            CommandOutcome::CostumeChanged {
                actor_id,
                previous,
                index,
            }
        }
        PictureCommand::PreloadPictures { scope } => CommandOutcome::Preloaded {
            scope,
            requested: preload_pictures(registry, scope, party, loader),
        },
    }
}

/// Every picture name referenced by the actors in `scope`, in registry order
/// for `All` and party order for `Party`. Duplicates are kept.
pub fn preload_names<'a, P>(
    registry: &'a PictureRegistry,
    scope: PreloadScope,
    party: &P,
) -> Vec<&'a str>
where
    P: PartyRoster + ?Sized,
{
    let sets = match scope {
        PreloadScope::All => registry.picture_sets().map(|(_, set)| set).collect::<Vec<_>>(),
        PreloadScope::Party => party
            .party_actor_ids()
            .into_iter()
            .filter_map(|actor_id| registry.picture_set(actor_id))
            .collect::<Vec<_>>(),
    };
    sets.into_iter()
        .flat_map(|set| set.picture_names())
        .filter(|name| !name.is_empty())
        .collect()
}

/// Asks the loader to cache every picture in `scope`. Returns how many
/// requests were issued.
pub fn preload_pictures<P, L>(
    registry: &PictureRegistry,
    scope: PreloadScope,
    party: &P,
    loader: &mut L,
) -> usize
where
    P: PartyRoster + ?Sized,
    L: AssetLoader + ?Sized,
{
    let names = preload_names(registry, scope, party);
    for name in &names {
        debug!(picture = name, "picture_cache_requested");
        loader.request_cache(name);
    }
    info!(scope = %scope, requested = names.len(), "picture_preload_issued");
    names.len()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneKind {
    Boot,
    Other,
}

pub fn should_preload_on_scene_start(settings: &PictureSettings, scene: SceneKind) -> bool {
    settings.preload_all_at_every_scene && scene != SceneKind::Boot
}

/// Scene-start hook: preloads every actor picture when the setting is on.
pub fn preload_on_scene_start<P, L>(
    settings: &PictureSettings,
    scene: SceneKind,
    registry: &PictureRegistry,
    party: &P,
    loader: &mut L,
) -> Option<usize>
where
    P: PartyRoster + ?Sized,
    L: AssetLoader + ?Sized,
{
    if !should_preload_on_scene_start(settings, scene) {
        return None;
    }
    Some(preload_pictures(registry, PreloadScope::All, party, loader))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::config::PictureConfigDocument;
    use crate::geometry::ImageSize;
    use crate::host::PictureImage;

    #[derive(Default)]
    struct RecordingLoader {
        cached: Vec<String>,
    }

    struct FakeImage;

    impl PictureImage for FakeImage {
        fn size(&self) -> ImageSize {
            ImageSize {
                width: 1,
                height: 1,
            }
        }
    }

    impl AssetLoader for RecordingLoader {
        type Image = FakeImage;

        fn load_image(&mut self, _name: &str) -> Option<Self::Image> {
            Some(FakeImage)
        }

        fn request_cache(&mut self, name: &str) {
            self.cached.push(name.to_string());
        }
    }

    fn registry() -> PictureRegistry {
        let document: PictureConfigDocument = serde_json::from_value(json!({
            "actorPictures": [
                {
                    "actorId": 2,
                    "normalPictures": ["b", ""],
                    "damagePictures": [{ "damageRate": 40, "pictures": ["b_hurt"] }]
                },
                {
                    "actorId": 1,
                    "normalPictures": ["a"],
                    "statePictures": [{ "stateId": 4, "pictures": ["a_poison", "a"] }]
                }
            ]
        }))
        .expect("document");
        PictureRegistry::from_document(&document).0
    }

    fn args(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn decodes_set_picture_index() {
        let command = PictureCommand::from_plugin_command(
            "setPictureIndex",
            &args(&[("actorId", "3"), ("pictureIndex", "2")]),
        )
        .expect("command");
        assert_eq!(
            command,
            PictureCommand::SetCostumeIndex {
                actor_id: ActorId(3),
                index: 2
            }
        );
    }

    #[test]
    fn rejects_bad_command_arguments() {
        assert_eq!(
            PictureCommand::from_plugin_command("setPictureIndex", &args(&[("actorId", "1")])),
            Err(CommandError::MissingArgument {
                command: "setPictureIndex",
                arg: "pictureIndex"
            })
        );
        assert_eq!(
            PictureCommand::from_plugin_command(
                "setPictureIndex",
                &args(&[("actorId", "1"), ("pictureIndex", "-1")])
            ),
            Err(CommandError::InvalidArgument {
                command: "setPictureIndex",
                arg: "pictureIndex",
                value: "-1".to_string()
            })
        );
        assert!(matches!(
            PictureCommand::from_plugin_command(
                "preloadPictures",
                &args(&[("pictureScope", "map")])
            ),
            Err(CommandError::InvalidArgument { .. })
        ));
        assert!(matches!(
            PictureCommand::from_plugin_command("showPicture", &args(&[])),
            Err(CommandError::UnknownCommand { .. })
        ));
    }

    #[test]
    fn preload_scope_defaults_to_all() {
        assert_eq!(
            PictureCommand::from_plugin_command("preloadPictures", &args(&[])),
            Ok(PictureCommand::PreloadPictures {
                scope: PreloadScope::All
            })
        );
    }

    #[test]
    fn set_costume_index_updates_picture_states() {
        let registry = registry();
        let mut states = PictureStates::new();
        let mut loader = RecordingLoader::default();
        let outcome = execute_command(
            PictureCommand::SetCostumeIndex {
                actor_id: ActorId(1),
                index: 5,
            },
            &registry,
            &mut states,
            &Vec::<ActorId>::new(),
            &mut loader,
        );
        assert_eq!(
            outcome,
            CommandOutcome::CostumeChanged {
                actor_id: ActorId(1),
                previous: 0,
                index: 5
            }
        );
        assert_eq!(states.costume_index(ActorId(1)), 5);
        assert!(loader.cached.is_empty());
    }

    #[test]
    fn preload_all_requests_every_non_empty_name_in_actor_order() {
        let registry = registry();
        let mut loader = RecordingLoader::default();
        let requested =
            preload_pictures(&registry, PreloadScope::All, &Vec::<ActorId>::new(), &mut loader);
        assert_eq!(requested, 5);
        assert_eq!(loader.cached, vec!["a", "a_poison", "a", "b", "b_hurt"]);
    }

    #[test]
    fn preload_party_skips_actors_without_pictures() {
        let registry = registry();
        let mut loader = RecordingLoader::default();
        let party = vec![ActorId(2), ActorId(9)];
        let outcome = execute_command(
            PictureCommand::PreloadPictures {
                scope: PreloadScope::Party,
            },
            &registry,
            &mut PictureStates::new(),
            &party,
            &mut loader,
        );
        assert_eq!(
            outcome,
            CommandOutcome::Preloaded {
                scope: PreloadScope::Party,
                requested: 2
            }
        );
        assert_eq!(loader.cached, vec!["b", "b_hurt"]);
    }

    #[test]
    fn scene_start_preload_follows_setting_and_skips_boot() {
        let registry = registry();
        let party = Vec::<ActorId>::new();
        let mut loader = RecordingLoader::default();
        let enabled = PictureSettings::default();
        let disabled = PictureSettings {
            preload_all_at_every_scene: false,
        };

        assert_eq!(
            preload_on_scene_start(&enabled, SceneKind::Boot, &registry, &party, &mut loader),
            None
        );
        assert_eq!(
            preload_on_scene_start(&disabled, SceneKind::Other, &registry, &party, &mut loader),
            None
        );
        assert!(loader.cached.is_empty());
        assert_eq!(
            preload_on_scene_start(&enabled, SceneKind::Other, &registry, &party, &mut loader),
            Some(5)
        );
    }
}
