//! Axis-aligned hitboxes, lethal collision and pickups
//!
//! All rectangles are in bottom-up world units (`y = 0` is the world floor).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::actor::Actor;
use super::obstacle::{Collectible, Obstacle, ObstacleKind};
use crate::consts::*;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Bottom-left corner
    pub min: Vec2,
    /// Top-right corner
    pub max: Vec2,
}

impl Rect {
    pub fn new(left: f32, bottom: f32, right: f32, top: f32) -> Self {
        Self {
            min: Vec2::new(left, bottom),
            max: Vec2::new(right, top),
        }
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Rectangle of the given size sharing this one's center
    pub fn centered(&self, width: f32, height: f32) -> Rect {
        let c = self.center();
        let half = Vec2::new(width, height) * 0.5;
        Rect {
            min: c - half,
            max: c + half,
        }
    }

    /// Strict overlap: touching edges do not count
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }
}

/// Hitbox of the actor: ducking shortens the sprite, then the hitbox keeps
/// the middle half vertically and is inset on both sides
pub fn actor_rect(actor: &Actor) -> Rect {
    let visual_h = if actor.ducking {
        actor.height * DUCK_SCALE
    } else {
        actor.height
    };
    let hit_h = visual_h * HITBOX_HEIGHT_SCALE;
    let bottom = actor.y + (visual_h - hit_h) / 2.0;
    Rect::new(
        actor.x + HITBOX_X_INSET,
        bottom,
        actor.x + actor.width - HITBOX_X_INSET,
        bottom + hit_h,
    )
}

/// Collidable part of an obstacle
pub fn obstacle_rect(obstacle: &Obstacle) -> Rect {
    let left = obstacle.x;
    let right = obstacle.x + obstacle.width;
    match &obstacle.kind {
        ObstacleKind::Floor => Rect::new(left, obstacle.y, right, obstacle.y + obstacle.height),
        ObstacleKind::Ceiling | ObstacleKind::Empty { .. } => {
            let top = WORLD_HEIGHT - obstacle.y;
            Rect::new(left, top - obstacle.height, right, top)
        }
        ObstacleKind::Middle {
            trunk_h, canopy_h, ..
        } => {
            let bottom = obstacle.y + trunk_h;
            Rect::new(left, bottom, right, bottom + canopy_h)
        }
    }
}

/// Trunk span of a tree, derived from its canopy rectangle
pub fn trunk_rect(canopy: &Rect, trunk_h: f32, canopy_h: f32) -> Rect {
    let height = canopy.height() * (trunk_h / canopy_h);
    Rect::new(canopy.min.x, canopy.min.y - height, canopy.max.x, canopy.min.y)
}

/// Hitbox of an obstacle's collectible, if it carries one
pub fn collectible_rect(obstacle: &Obstacle) -> Option<Rect> {
    let host = obstacle_rect(obstacle);
    match &obstacle.kind {
        ObstacleKind::Middle {
            trunk_h,
            canopy_h,
            stick: Some(stick),
        } => Some(trunk_rect(&host, *trunk_h, *canopy_h).centered(stick.width, stick.height)),
        ObstacleKind::Empty {
            charge: Some(charge),
        } => Some(host.centered(charge.width, charge.height)),
        _ => None,
    }
}

/// True if any lethal obstacle overlaps the actor hitbox
pub fn lethal_hit(hitbox: &Rect, obstacles: &[Obstacle]) -> bool {
    obstacles
        .iter()
        .filter(|o| o.is_lethal())
        .any(|o| hitbox.overlaps(&obstacle_rect(o)))
}

/// Pickups collected in one step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pickups {
    pub sticks: u32,
    pub charges: u32,
}

fn try_collect(item: &mut Collectible, rect: Rect, hitbox: &Rect) -> bool {
    if item.collected || !hitbox.overlaps(&rect) {
        return false;
    }
    item.collected = true;
    true
}

/// Mark every overlapped, uncollected collectible as collected
pub fn collect_pickups(hitbox: &Rect, obstacles: &mut [Obstacle]) -> Pickups {
    let mut pickups = Pickups::default();

    for obstacle in obstacles.iter_mut() {
        let Some(rect) = collectible_rect(obstacle) else {
            continue;
        };
        match &mut obstacle.kind {
            ObstacleKind::Empty {
                charge: Some(charge),
            } => {
                if try_collect(charge, rect, hitbox) {
                    pickups.charges += 1;
                }
            }
            ObstacleKind::Middle {
                stick: Some(stick), ..
            } => {
                if try_collect(stick, rect, hitbox) {
                    pickups.sticks += 1;
                }
            }
            _ => {}
        }
    }

    pickups
}
