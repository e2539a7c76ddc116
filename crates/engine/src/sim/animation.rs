use thiserror::Error;

use crate::assets::ImageAsset;
use crate::editor::{PoseId, PoseSet};

use super::character::Facing;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SpriteError {
    #[error("no sprite for state {state}: the standing pose is missing")]
    MissingStanding { state: PoseId },
}

/// Which stored pose to draw for an animation state, and whether to flip it horizontally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedSprite {
    pub pose: PoseId,
    pub mirror: bool,
}

impl ResolvedSprite {
    const fn plain(pose: PoseId) -> Self {
        Self {
            pose,
            mirror: false,
        }
    }

    const fn mirrored(pose: PoseId) -> Self {
        Self { pose, mirror: true }
    }

    pub fn asset<'a>(&self, poses: &'a PoseSet) -> Option<&'a ImageAsset> {
        poses.get(self.pose)
    }
}

/// Sprite fallback chain:
/// - running uses the running pose, mirrored when facing left; without it, the walking pose
///   for the current facing, unmirrored
/// - a missing walking direction borrows the other direction, mirrored
/// - anything still missing falls back to standing
pub fn resolve_sprite(
    poses: &PoseSet,
    state: PoseId,
    facing: Facing,
) -> Result<ResolvedSprite, SpriteError> {
    let candidate = match state {
        PoseId::Running if poses.contains(PoseId::Running) => {
            Some(ResolvedSprite {
                pose: PoseId::Running,
                mirror: facing == Facing::Left,
            })
        }
        PoseId::Running => {
            let walking = match facing {
                Facing::Left => PoseId::WalkingLeft,
                Facing::Right => PoseId::WalkingRight,
            };
            poses
                .contains(walking)
                .then_some(ResolvedSprite::plain(walking))
        }
        PoseId::WalkingRight if !poses.contains(PoseId::WalkingRight) => poses
            .contains(PoseId::WalkingLeft)
            .then_some(ResolvedSprite::mirrored(PoseId::WalkingLeft)),
        PoseId::WalkingLeft if !poses.contains(PoseId::WalkingLeft) => poses
            .contains(PoseId::WalkingRight)
            .then_some(ResolvedSprite::mirrored(PoseId::WalkingRight)),
        other => poses.contains(other).then_some(ResolvedSprite::plain(other)),
    };

    match candidate {
        Some(resolved) => Ok(resolved),
        None if poses.contains(PoseId::Standing) => Ok(ResolvedSprite::plain(PoseId::Standing)),
        None => Err(SpriteError::MissingStanding { state }),
    }
}
