use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::host::ActorStatus;
use crate::registry::{ActorId, PictureRegistry, PictureSet, StateId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PictureTier {
    State,
    Damage,
    Normal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedPicture<'a> {
    pub name: &'a str,
    pub tier: PictureTier,
}

/// Per-actor picture state. Saved by the host alongside the actor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorPictureState {
    pub costume_index: usize,
}

/// Costume indices for every actor that has been given one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PictureStates {
    actors: BTreeMap<ActorId, ActorPictureState>,
}

impl PictureStates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Not checked against any picture list: out-of-range indices fall back
    /// to index 0 per tier at resolve time.
    pub fn set_costume_index(&mut self, actor_id: ActorId, index: usize) {
        self.actors.entry(actor_id).or_default().costume_index = index;
    }

    pub fn costume_index(&self, actor_id: ActorId) -> usize {
        self.state(actor_id).costume_index
    }

    pub fn state(&self, actor_id: ActorId) -> ActorPictureState {
        self.actors.get(&actor_id).copied().unwrap_or_default()
    }
}

pub struct PictureResolver<'a> {
    registry: &'a PictureRegistry,
}

impl<'a> PictureResolver<'a> {
    pub fn new(registry: &'a PictureRegistry) -> Self {
        Self { registry }
    }

    /// Picks the picture by fixed priority: state tier, then damage tier,
    /// then normal tier. `None` means nothing should be drawn.
    pub fn resolve(
        &self,
        actor_id: ActorId,
        active_states: &HashSet<StateId>,
        hp_ratio_percent: f32,
        costume_index: usize,
    ) -> Option<ResolvedPicture<'a>> {
        let set = self.registry.picture_set(actor_id)?;
        state_picture(set, active_states, costume_index)
            .map(|name| ResolvedPicture {
                name,
                tier: PictureTier::State,
            })
            .or_else(|| {
                damage_picture(set, hp_ratio_percent, costume_index).map(|name| {
                    ResolvedPicture {
                        name,
                        tier: PictureTier::Damage,
                    }
                })
            })
            .or_else(|| {
                costume_picture(&set.normals, costume_index).map(|name| ResolvedPicture {
                    name,
                    tier: PictureTier::Normal,
                })
            })
    }

    pub fn resolve_actor<A>(&self, actor: &A, states: &PictureStates) -> Option<ResolvedPicture<'a>>
    where
        A: ActorStatus + ?Sized,
    {
        let actor_id = actor.actor_id();
        self.resolve(
            actor_id,
            &actor.active_states(),
            actor.hp_ratio_percent(),
            states.costume_index(actor_id),
        )
    }
}

/// Only the first configured state the actor has is considered.
fn state_picture<'a>(
    set: &'a PictureSet,
    active_states: &HashSet<StateId>,
    costume_index: usize,
) -> Option<&'a str> {
    let state = set
        .states
        .iter()
        .find(|state| active_states.contains(&state.state_id))?;
    costume_picture(&state.pictures, costume_index)
}

/// First ascending threshold that still covers the current HP ratio.
fn damage_picture(set: &PictureSet, hp_ratio_percent: f32, costume_index: usize) -> Option<&str> {
    let damage = set
        .damages
        .iter()
        .find(|damage| hp_ratio_percent <= f32::from(damage.threshold_percent))?;
    costume_picture(&damage.pictures, costume_index)
}

fn costume_picture(pictures: &[String], costume_index: usize) -> Option<&str> {
    let non_empty = |name: &&String| !name.is_empty();
    pictures
        .get(costume_index)
        .filter(non_empty)
        .or_else(|| pictures.first().filter(non_empty))
        .map(String::as_str)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::config::PictureConfigDocument;
    use crate::host::ActorSnapshot;

    fn registry() -> PictureRegistry {
        let document: PictureConfigDocument = serde_json::from_value(json!({
            "actorPictures": [
                {
                    "actorId": 1,
                    "normalPictures": ["a", "b"],
                    "damagePictures": [
                        { "damageRate": 60, "pictures": ["d"] },
                        { "damageRate": 30, "pictures": ["c"] }
                    ]
                },
                {
                    "actorId": 2,
                    "normalPictures": ["hero", "hero_swimsuit", ""],
                    "statePictures": [
                        { "stateId": 4, "pictures": ["hero_poison", "hero_swimsuit_poison"] },
                        { "stateId": 1, "pictures": ["hero_ko"] },
                        { "stateId": 7, "pictures": [] }
                    ],
                    "damagePictures": [
                        { "damageRate": 25, "pictures": ["hero_hurt", "hero_swimsuit_hurt"] },
                        { "damageRate": 50, "pictures": [] }
                    ]
                },
                { "actorId": 3, "statePictures": [{ "stateId": 4, "pictures": ["only_state"] }] }
            ]
        }))
        .expect("document");
        let (registry, issues) = PictureRegistry::from_document(&document);
        assert!(issues.is_empty(), "{issues:?}");
        registry
    }

    fn states(ids: &[u32]) -> HashSet<StateId> {
        ids.iter().copied().map(StateId).collect()
    }

    fn name(resolved: Option<ResolvedPicture<'_>>) -> Option<&str> {
        resolved.map(|picture| picture.name)
    }

    #[test]
    fn healthy_actor_shows_default_normal_picture() {
        let registry = registry();
        let resolver = PictureResolver::new(&registry);
        let resolved = resolver.resolve(ActorId(1), &states(&[]), 100.0, 0);
        assert_eq!(
            resolved,
            Some(ResolvedPicture {
                name: "a",
                tier: PictureTier::Normal
            })
        );
    }

    #[test]
    fn damage_tier_picks_first_ascending_threshold() {
        let registry = registry();
        let resolver = PictureResolver::new(&registry);
        assert_eq!(name(resolver.resolve(ActorId(1), &states(&[]), 55.0, 0)), Some("d"));
        assert_eq!(name(resolver.resolve(ActorId(1), &states(&[]), 65.0, 0)), Some("a"));
        assert_eq!(name(resolver.resolve(ActorId(1), &states(&[]), 0.0, 0)), Some("c"));
    }

    #[test]
    fn damage_threshold_is_inclusive() {
        let registry = registry();
        let resolver = PictureResolver::new(&registry);
        assert_eq!(name(resolver.resolve(ActorId(1), &states(&[]), 30.0, 0)), Some("c"));
        assert_eq!(name(resolver.resolve(ActorId(1), &states(&[]), 30.5, 0)), Some("d"));
        assert_eq!(name(resolver.resolve(ActorId(1), &states(&[]), 60.0, 0)), Some("d"));
        assert_eq!(name(resolver.resolve(ActorId(1), &states(&[]), 60.1, 0)), Some("a"));
    }

    #[test]
    fn state_outranks_damage_outranks_normal() {
        let registry = registry();
        let resolver = PictureResolver::new(&registry);
        let resolved = resolver
            .resolve(ActorId(2), &states(&[4]), 10.0, 0)
            .expect("picture");
        assert_eq!(resolved.name, "hero_poison");
        assert_eq!(resolved.tier, PictureTier::State);

        let resolved = resolver
            .resolve(ActorId(2), &states(&[99]), 10.0, 0)
            .expect("picture");
        assert_eq!(resolved.name, "hero_hurt");
        assert_eq!(resolved.tier, PictureTier::Damage);
    }

    #[test]
    fn earliest_configured_state_wins() {
        let registry = registry();
        let resolver = PictureResolver::new(&registry);
        assert_eq!(
            name(resolver.resolve(ActorId(2), &states(&[1, 4]), 100.0, 0)),
            Some("hero_poison")
        );
        assert_eq!(
            name(resolver.resolve(ActorId(2), &states(&[1]), 100.0, 0)),
            Some("hero_ko")
        );
    }

    #[test]
    fn matching_state_without_pictures_falls_through_to_damage() {
        let registry = registry();
        let resolver = PictureResolver::new(&registry);
        let resolved = resolver
            .resolve(ActorId(2), &states(&[7]), 20.0, 0)
            .expect("picture");
        assert_eq!(resolved.tier, PictureTier::Damage);
        assert_eq!(resolved.name, "hero_hurt");
    }

    #[test]
    fn matching_damage_tier_without_pictures_falls_through_to_normal() {
        let registry = registry();
        let resolver = PictureResolver::new(&registry);
        let resolved = resolver
            .resolve(ActorId(2), &states(&[]), 40.0, 1)
            .expect("picture");
        assert_eq!(resolved.tier, PictureTier::Normal);
        assert_eq!(resolved.name, "hero_swimsuit");
    }

    #[test]
    fn costume_index_selects_parallel_variants() {
        let registry = registry();
        let resolver = PictureResolver::new(&registry);
        assert_eq!(
            name(resolver.resolve(ActorId(2), &states(&[4]), 100.0, 1)),
            Some("hero_swimsuit_poison")
        );
        assert_eq!(
            name(resolver.resolve(ActorId(2), &states(&[]), 20.0, 1)),
            Some("hero_swimsuit_hurt")
        );
        assert_eq!(name(resolver.resolve(ActorId(1), &states(&[]), 100.0, 1)), Some("b"));
    }

    #[test]
    fn out_of_range_costume_index_falls_back_to_index_zero() {
        let registry = registry();
        let resolver = PictureResolver::new(&registry);
        assert_eq!(
            name(resolver.resolve(ActorId(2), &states(&[1]), 100.0, 9)),
            Some("hero_ko")
        );
        assert_eq!(
            name(resolver.resolve(ActorId(1), &states(&[]), 100.0, usize::MAX)),
            Some("a")
        );
        // An empty name at the index counts as missing.
        assert_eq!(
            name(resolver.resolve(ActorId(2), &states(&[]), 100.0, 2)),
            Some("hero")
        );
    }

    #[test]
    fn unknown_actor_or_exhausted_tiers_resolve_to_none() {
        let registry = registry();
        let resolver = PictureResolver::new(&registry);
        assert_eq!(resolver.resolve(ActorId(42), &states(&[]), 100.0, 0), None);
        assert_eq!(resolver.resolve(ActorId(3), &states(&[]), 100.0, 0), None);
        assert_eq!(
            name(resolver.resolve(ActorId(3), &states(&[4]), 100.0, 0)),
            Some("only_state")
        );
    }

    #[test]
    fn resolve_actor_reads_costume_from_picture_states() {
        let registry = registry();
        let resolver = PictureResolver::new(&registry);
        let mut picture_states = PictureStates::new();
        let actor = ActorSnapshot::healthy(ActorId(2));
        assert_eq!(
            name(resolver.resolve_actor(&actor, &picture_states)),
            Some("hero")
        );

        picture_states.set_costume_index(ActorId(2), 1);
        assert_eq!(
            name(resolver.resolve_actor(&actor, &picture_states)),
            Some("hero_swimsuit")
        );
        assert_eq!(picture_states.costume_index(ActorId(1)), 0);
    }

    #[test]
    fn picture_states_round_trip_through_save_json() {
        let mut picture_states = PictureStates::new();
        picture_states.set_costume_index(ActorId(2), 3);
        let json = serde_json::to_string(&picture_states).expect("encode");
        assert_eq!(json, r#"{"2":{"costume_index":3}}"#);
        let decoded: PictureStates = serde_json::from_str(&json).expect("decode");
        assert_eq!(decoded, picture_states);
    }
}
