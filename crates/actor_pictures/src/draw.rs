use tracing::debug;

use crate::clock::AnimationClock;
use crate::geometry::{Alignment, SourceRect};
use crate::host::{ActorStatus, AssetLoader, DrawSurface, PictureImage};
use crate::registry::PictureRegistry;
use crate::resolver::{PictureResolver, PictureStates, ResolvedPicture};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawRequest {
    pub x: i32,
    pub y: i32,
    /// Zero means the full frame width.
    pub width: u32,
    /// Zero means the full image height.
    pub height: u32,
    pub alignment: Alignment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawnPicture<'a> {
    pub picture: ResolvedPicture<'a>,
    pub frame: usize,
    pub source: SourceRect,
}

/// Resolves the actor's picture and blits the current animation frame.
/// Returns `None` without drawing when no picture applies or it cannot be
/// loaded.
pub fn draw_actor_picture<'a, A, L, S>(
    registry: &'a PictureRegistry,
    actor: &A,
    states: &PictureStates,
    clock: &AnimationClock,
    loader: &mut L,
    surface: &mut S,
    request: DrawRequest,
) -> Option<DrawnPicture<'a>>
where
    A: ActorStatus + ?Sized,
    L: AssetLoader + ?Sized,
    S: DrawSurface<L::Image> + ?Sized,
{
    let picture = PictureResolver::new(registry).resolve_actor(actor, states)?;
    let Some(image) = loader.load_image(picture.name) else {
        debug!(
            actor_id = actor.actor_id().0,
            picture = picture.name,
            "picture_not_loaded"
        );
        return None;
    };

    let size = image.size();
    let frame_width = registry.frame_width(picture.name, size);
    let frame = clock.frame(registry.animation_profile(picture.name));
    let source = registry
        .display_geometry(
            picture.name,
            size,
            request.width,
            request.height,
            request.alignment,
        )
        .at_frame(frame, frame_width);

    surface.blit(&image, source, request.x, request.y);
    Some(DrawnPicture {
        picture,
        frame,
        source,
    })
}
