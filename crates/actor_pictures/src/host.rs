//! Seams to the host runtime. The crate never owns actors, images or the
//! screen; it reads and drives them through these traits.

use std::collections::HashSet;

use crate::geometry::{ImageSize, SourceRect};
use crate::registry::{ActorId, StateId};

pub trait ActorStatus {
    fn actor_id(&self) -> ActorId;
    fn active_states(&self) -> HashSet<StateId>;
    /// Current HP as a percentage of max HP, 0 to 100.
    fn hp_ratio_percent(&self) -> f32;
}

pub trait PartyRoster {
    fn party_actor_ids(&self) -> Vec<ActorId>;
}

pub trait PictureImage {
    fn size(&self) -> ImageSize;
}

pub trait AssetLoader {
    type Image: PictureImage;

    /// `None` when the picture does not exist or is not decodable.
    fn load_image(&mut self, name: &str) -> Option<Self::Image>;
    fn request_cache(&mut self, name: &str);
}

pub trait DrawSurface<I> {
    fn blit(&mut self, image: &I, source: SourceRect, dest_x: i32, dest_y: i32);
}

/// Plain actor state captured from the host, for callers that do not want to
/// implement [`ActorStatus`] on their own entity type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActorSnapshot {
    pub actor_id: ActorId,
    pub active_states: HashSet<StateId>,
    pub hp_ratio_percent: f32,
}

impl ActorSnapshot {
    pub fn healthy(actor_id: ActorId) -> Self {
        Self {
            actor_id,
            active_states: HashSet::new(),
            hp_ratio_percent: 100.0,
        }
    }
}

impl ActorStatus for ActorSnapshot {
    fn actor_id(&self) -> ActorId {
        self.actor_id
    }

    fn active_states(&self) -> HashSet<StateId> {
        self.active_states.clone()
    }

    fn hp_ratio_percent(&self) -> f32 {
        self.hp_ratio_percent
    }
}

impl PartyRoster for [ActorId] {
    fn party_actor_ids(&self) -> Vec<ActorId> {
        self.to_vec()
    }
}

impl PartyRoster for Vec<ActorId> {
    fn party_actor_ids(&self) -> Vec<ActorId> {
        self.clone()
    }
}
