use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::clock::AnimationProfile;
use crate::config::{
    decode_with_path, ActorPictureDef, AnimationDef, CalibrationDef, ConfigIssue, ConfigSection,
    DamagePictureDef, IssueCode, PictureConfigDocument, StatePictureDef, DEFAULT_CENTER_X,
    DEFAULT_OFFSET_Y, DEFAULT_PATTERN_COUNT, DEFAULT_PATTERN_COUNTS, DEFAULT_REPEAT_COUNT,
    DEFAULT_REPEAT_DURATIONS,
};
use crate::picture_names::validate_picture_name;

pub const MAX_DAMAGE_THRESHOLD_PERCENT: u8 = 100;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ActorId(pub u32);

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct StateId(pub u32);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatePictures {
    pub state_id: StateId,
    pub pictures: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DamagePictures {
    pub threshold_percent: u8,
    pub pictures: Vec<String>,
}

/// Picture variants for one actor. Every list is indexed by costume index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PictureSet {
    pub normals: Vec<String>,
    /// Priority order: earlier entries win.
    pub states: Vec<StatePictures>,
    /// Sorted ascending by threshold.
    pub damages: Vec<DamagePictures>,
}

impl PictureSet {
    /// Every referenced name (normals, then state tiers, then damage tiers),
    /// duplicates and empty names included.
    pub fn picture_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.normals
            .iter()
            .chain(self.states.iter().flat_map(|state| state.pictures.iter()))
            .chain(self.damages.iter().flat_map(|damage| damage.pictures.iter()))
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Calibration {
    /// Horizontal face centre within one frame; `None` means half the frame width.
    pub center_x: Option<u32>,
    pub offset_y: i32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PictureRegistry {
    picture_sets: BTreeMap<ActorId, PictureSet>,
    calibrations: HashMap<String, Calibration>,
    animations: HashMap<String, AnimationProfile>,
    static_profile: AnimationProfile,
}

impl PictureRegistry {
    pub fn from_document(document: &PictureConfigDocument) -> (Self, Vec<ConfigIssue>) {
        let mut registry = Self::default();
        let mut issues = Vec::new();

        let section = ConfigSection::ActorPictures;
        for (index, raw) in document.actor_pictures.iter().enumerate() {
            let parsed = decode_entry::<ActorPictureDef>(raw).and_then(picture_set_from_def);
            match parsed {
                Ok((actor_id, set)) => {
                    if registry.picture_sets.insert(actor_id, set).is_some() {
                        issues.push(duplicate_issue(
                            section,
                            index,
                            format!("actor {} is defined more than once", actor_id.0),
                        ));
                    }
                }
                Err(error) => issues.push(error.into_issue(section, index)),
            }
        }

        let section = ConfigSection::PictureCalibrations;
        for (index, raw) in document.picture_calibrations.iter().enumerate() {
            let parsed = decode_entry::<CalibrationDef>(raw).and_then(calibration_from_def);
            match parsed {
                Ok((name, calibration)) => {
                    if registry.calibrations.insert(name.clone(), calibration).is_some() {
                        issues.push(duplicate_issue(
                            section,
                            index,
                            format!("picture '{name}' is calibrated more than once"),
                        ));
                    }
                }
                Err(error) => issues.push(error.into_issue(section, index)),
            }
        }

        let section = ConfigSection::AnimationPictures;
        for (index, raw) in document.animation_pictures.iter().enumerate() {
            let parsed = decode_entry::<AnimationDef>(raw).and_then(animation_from_def);
            match parsed {
                Ok((name, profile)) => {
                    if registry.animations.insert(name.clone(), profile).is_some() {
                        issues.push(duplicate_issue(
                            section,
                            index,
                            format!("picture '{name}' is animated more than once"),
                        ));
                    }
                }
                Err(error) => issues.push(error.into_issue(section, index)),
            }
        }

        (registry, issues)
    }

    pub fn picture_set(&self, actor_id: ActorId) -> Option<&PictureSet> {
        self.picture_sets.get(&actor_id)
    }

    pub fn picture_sets(&self) -> impl Iterator<Item = (ActorId, &PictureSet)> + '_ {
        self.picture_sets.iter().map(|(id, set)| (*id, set))
    }

    pub fn calibration(&self, picture_name: &str) -> Calibration {
        self.calibrations
            .get(picture_name)
            .copied()
            .unwrap_or_default()
    }

    /// The configured profile, or a single static frame.
    pub fn animation_profile(&self, picture_name: &str) -> &AnimationProfile {
        self.animations
            .get(picture_name)
            .unwrap_or(&self.static_profile)
    }

    pub fn has_animation(&self, picture_name: &str) -> bool {
        self.animations.contains_key(picture_name)
    }

    pub fn actor_count(&self) -> usize {
        self.picture_sets.len()
    }

    pub fn calibration_count(&self) -> usize {
        self.calibrations.len()
    }

    pub fn animation_count(&self) -> usize {
        self.animations.len()
    }
}

#[derive(Debug)]
struct EntryError {
    code: IssueCode,
    message: String,
}

impl EntryError {
    fn new(code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    fn into_issue(self, section: ConfigSection, index: usize) -> ConfigIssue {
        ConfigIssue {
            code: self.code,
            section,
            index,
            message: self.message,
        }
    }
}

fn duplicate_issue(section: ConfigSection, index: usize, what: String) -> ConfigIssue {
    ConfigIssue {
        code: IssueCode::DuplicateKey,
        section,
        index,
        message: format!("{what}; the later definition wins"),
    }
}

fn decode_entry<T: serde::de::DeserializeOwned>(
    raw: &serde_json::Value,
) -> Result<T, EntryError> {
    decode_with_path::<T>(raw).map_err(|(path, source)| {
        if path.is_empty() || path == "." {
            EntryError::new(IssueCode::Malformed, format!("malformed entry: {source}"))
        } else {
            EntryError::new(IssueCode::Malformed, format!("malformed entry at {path}: {source}"))
        }
    })
}

fn picture_set_from_def(def: ActorPictureDef) -> Result<(ActorId, PictureSet), EntryError> {
    let actor_id = ActorId(id_from(def.actor_id, "actorId")?);
    let normals = picture_list(def.normal_pictures, "normalPictures")?;

    let mut states = Vec::with_capacity(def.state_pictures.len());
    for (position, state) in def.state_pictures.into_iter().enumerate() {
        let StatePictureDef { state_id, pictures } = state;
        states.push(StatePictures {
            state_id: StateId(id_from(
                state_id,
                &format!("statePictures[{position}].stateId"),
            )?),
            pictures: picture_list(pictures, &format!("statePictures[{position}].pictures"))?,
        });
    }

    let mut damages = Vec::with_capacity(def.damage_pictures.len());
    for (position, damage) in def.damage_pictures.into_iter().enumerate() {
        let DamagePictureDef {
            damage_rate,
            pictures,
        } = damage;
        let threshold_percent = u8::try_from(damage_rate)
            .ok()
            .filter(|rate| *rate <= MAX_DAMAGE_THRESHOLD_PERCENT)
            .ok_or_else(|| {
                EntryError::new(
                    IssueCode::InvalidValue,
                    format!(
                        "damagePictures[{position}].damageRate must be within 0..={MAX_DAMAGE_THRESHOLD_PERCENT}, got {damage_rate}"
                    ),
                )
            })?;
        damages.push(DamagePictures {
            threshold_percent,
            pictures: picture_list(pictures, &format!("damagePictures[{position}].pictures"))?,
        });
    }
    // Stable: equal thresholds keep their configured order.
    damages.sort_by_key(|damage| damage.threshold_percent);

    Ok((
        actor_id,
        PictureSet {
            normals,
            states,
            damages,
        },
    ))
}

fn calibration_from_def(def: CalibrationDef) -> Result<(String, Calibration), EntryError> {
    let name = keyed_picture_name(def.picture_name)?;
    // Zero and negative values select the automatic half-width centre.
    let center_x = match def.center_x.unwrap_or(DEFAULT_CENTER_X) {
        center_x if center_x > 0 => Some(u32::try_from(center_x).map_err(|_| {
            EntryError::new(
                IssueCode::InvalidValue,
                format!("centerX is out of range: {center_x}"),
            )
        })?),
        _ => None,
    };
    let offset_y = def.offset_y.unwrap_or(DEFAULT_OFFSET_Y);
    let offset_y = i32::try_from(offset_y).map_err(|_| {
        EntryError::new(
            IssueCode::InvalidValue,
            format!("offsetY is out of range: {offset_y}"),
        )
    })?;
    Ok((name, Calibration { center_x, offset_y }))
}

fn animation_from_def(def: AnimationDef) -> Result<(String, AnimationProfile), EntryError> {
    let name = keyed_picture_name(def.picture_name)?;
    let pattern_count = positive_count(
        def.num_pattern.unwrap_or(DEFAULT_PATTERN_COUNT),
        "numPattern",
    )?;
    let repeat_count = positive_count(
        def.num_repeat.unwrap_or(DEFAULT_REPEAT_COUNT),
        "numRepeat",
    )?;

    let pattern_counts = match def.pattern_counts {
        Some(counts) => counts,
        None => default_list(&DEFAULT_PATTERN_COUNTS, pattern_count),
    };
    let repeat_durations = match def.repeat_durations {
        Some(durations) => durations,
        None => default_list(&DEFAULT_REPEAT_DURATIONS, repeat_count),
    };
    let pattern_counts = sized_positive_list(pattern_counts, pattern_count, "patternCounts")?;
    let repeat_durations =
        sized_positive_list(repeat_durations, repeat_count, "repeatDurations")?;

    let profile = AnimationProfile::new(pattern_counts, repeat_durations)
        .map_err(|error| EntryError::new(IssueCode::InvalidValue, error.to_string()))?;
    Ok((name, profile))
}

fn id_from(raw: i64, field: &str) -> Result<u32, EntryError> {
    u32::try_from(raw).map_err(|_| {
        EntryError::new(
            IssueCode::InvalidValue,
            format!("{field} must be a non-negative id, got {raw}"),
        )
    })
}

fn picture_list(names: Vec<String>, field: &str) -> Result<Vec<String>, EntryError> {
    for (position, name) in names.iter().enumerate() {
        validate_picture_name(name).map_err(|error| {
            EntryError::new(
                IssueCode::InvalidPictureName,
                format!("{field}[{position}] '{name}': {error}"),
            )
        })?;
    }
    Ok(names)
}

fn keyed_picture_name(name: String) -> Result<String, EntryError> {
    if name.is_empty() {
        return Err(EntryError::new(
            IssueCode::InvalidPictureName,
            "pictureName must not be empty",
        ));
    }
    validate_picture_name(&name).map_err(|error| {
        EntryError::new(
            IssueCode::InvalidPictureName,
            format!("pictureName '{name}': {error}"),
        )
    })?;
    Ok(name)
}

fn positive_count(raw: i64, field: &str) -> Result<usize, EntryError> {
    usize::try_from(raw)
        .ok()
        .filter(|count| *count >= 1)
        .ok_or_else(|| {
            EntryError::new(
                IssueCode::InvalidValue,
                format!("{field} must be at least 1, got {raw}"),
            )
        })
}

/// Defaults stretched to `len`, repeating the last default value.
fn default_list(defaults: &[i64], len: usize) -> Vec<i64> {
    (0..len)
        .map(|index| {
            defaults
                .get(index)
                .or(defaults.last())
                .copied()
                .unwrap_or(1)
        })
        .collect()
}

fn sized_positive_list(values: Vec<i64>, len: usize, field: &str) -> Result<Vec<u32>, EntryError> {
    if values.len() != len {
        return Err(EntryError::new(
            IssueCode::InvalidValue,
            format!("{field} must have {len} entries, got {}", values.len()),
        ));
    }
    values
        .into_iter()
        .enumerate()
        .map(|(position, value)| {
            u32::try_from(value)
                .ok()
                .filter(|value| *value >= 1)
                .ok_or_else(|| {
                    EntryError::new(
                        IssueCode::InvalidValue,
                        format!("{field}[{position}] must be at least 1, got {value}"),
                    )
                })
        })
        .collect()
}
