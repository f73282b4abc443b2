//! Read-only view of the game for drawing one frame

use serde::{Deserialize, Serialize};

use super::collision::{Rect, actor_rect, collectible_rect, obstacle_rect};
use super::gameover::GameOverPhase;
use super::obstacle::{Obstacle, ObstacleKind, ObstacleType};
use super::state::{GameState, Lifecycle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pose {
    Running,
    Airborne,
    Ducking,
    Gliding,
    Crashed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorView {
    /// Sprite rectangle
    pub rect: Rect,
    pub pose: Pose,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectibleView {
    pub rect: Rect,
    pub collected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleView {
    pub id: u32,
    pub ty: ObstacleType,
    /// Full sprite rectangle (trunk included for trees)
    pub rect: Rect,
    pub collectible: Option<CollectibleView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameOverView {
    pub phase: GameOverPhase,
    pub recap_step: u8,
    pub distance: u32,
    pub sticks: u32,
    pub charges: u32,
    pub displayed_score: u32,
    pub show_record_message: bool,
    pub is_new_record: Option<bool>,
    pub allow_restart: bool,
}

/// Debug overlay rectangles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hitboxes {
    pub actor: Rect,
    /// Lethal parts of obstacles
    pub obstacles: Vec<Rect>,
    pub collectibles: Vec<Rect>,
}

/// Everything needed to draw one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub lifecycle: Lifecycle,
    pub actor: ActorView,
    pub obstacles: Vec<ObstacleView>,
    pub score: u32,
    pub sticks: u32,
    pub glide_charges: u32,
    pub glide_remaining: f32,
    pub high_score: u32,
    pub bg_offset: f32,
    pub game_over: Option<GameOverView>,
    pub collisions_enabled: bool,
    pub hitboxes: Option<Hitboxes>,
}

fn sprite_rect(obstacle: &Obstacle) -> Rect {
    match obstacle.kind {
        ObstacleKind::Middle { .. } => Rect::new(
            obstacle.x,
            obstacle.y,
            obstacle.x + obstacle.width,
            obstacle.y + obstacle.height,
        ),
        _ => obstacle_rect(obstacle),
    }
}

impl FrameSnapshot {
    pub fn capture(state: &GameState) -> Self {
        let actor = &state.actor;
        let pose = if state.lifecycle == Lifecycle::GameOver {
            Pose::Crashed
        } else if actor.gliding {
            Pose::Gliding
        } else if actor.ducking {
            Pose::Ducking
        } else if actor.on_ground {
            Pose::Running
        } else {
            Pose::Airborne
        };
        let visual_h = if actor.ducking {
            actor.height * crate::consts::DUCK_SCALE
        } else {
            actor.height
        };

        let obstacles = state
            .obstacles
            .iter()
            .map(|o| ObstacleView {
                id: o.id,
                ty: o.obstacle_type(),
                rect: sprite_rect(o),
                collectible: o
                    .collectible()
                    .zip(collectible_rect(o))
                    .map(|(c, rect)| CollectibleView {
                        rect,
                        collected: c.collected,
                    }),
            })
            .collect();

        let game_over = state.game_over.as_ref().map(|seq| GameOverView {
            phase: seq.phase,
            recap_step: seq.recap_step,
            distance: seq.final_run.score,
            sticks: seq.final_run.sticks,
            charges: seq.final_run.charges,
            displayed_score: seq.displayed_score,
            show_record_message: seq.show_record_message,
            is_new_record: seq.is_new_record,
            allow_restart: seq.allow_restart,
        });

        let hitboxes = state.show_hitboxes.then(|| Hitboxes {
            actor: actor_rect(actor),
            obstacles: state
                .obstacles
                .iter()
                .filter(|o| o.is_lethal())
                .map(obstacle_rect)
                .collect(),
            collectibles: state
                .obstacles
                .iter()
                .filter(|o| o.collectible().is_some_and(|c| !c.collected))
                .filter_map(collectible_rect)
                .collect(),
        });

        Self {
            lifecycle: state.lifecycle,
            actor: ActorView {
                rect: Rect::new(actor.x, actor.y, actor.x + actor.width, actor.y + visual_h),
                pose,
            },
            obstacles,
            score: state.run.score,
            sticks: state.run.sticks,
            glide_charges: state.run.glide_charges,
            glide_remaining: state.run.glide_remaining,
            high_score: state.high_score.best,
            bg_offset: state.bg_offset,
            game_over,
            collisions_enabled: state.collisions_enabled,
            hitboxes,
        }
    }
}
