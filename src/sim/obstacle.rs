//! Obstacles and the distance-driven spawner

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::tuning::Tuning;

/// Obstacle type without payload, used for sequencing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstacleType {
    Floor,
    Ceiling,
    Middle,
    Empty,
}

/// A pickup riding inside an obstacle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Collectible {
    pub width: f32,
    pub height: f32,
    pub collected: bool,
}

impl Collectible {
    pub fn stick() -> Self {
        Self {
            width: STICK_WIDTH,
            height: STICK_HEIGHT,
            collected: false,
        }
    }

    pub fn charge() -> Self {
        Self {
            width: CHARGE_WIDTH,
            height: CHARGE_HEIGHT,
            collected: false,
        }
    }
}

/// Type-specific obstacle data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Wall standing on the ground
    Floor,
    /// Block hanging from the top (`y` is measured down from the top)
    Ceiling,
    /// Tree: the trunk is walk-through, the canopy is solid
    Middle {
        trunk_h: f32,
        canopy_h: f32,
        stick: Option<Collectible>,
    },
    /// Harmless slot, `y` measured from the top like `Ceiling`
    Empty { charge: Option<Collectible> },
}

impl ObstacleKind {
    pub fn obstacle_type(&self) -> ObstacleType {
        match self {
            ObstacleKind::Floor => ObstacleType::Floor,
            ObstacleKind::Ceiling => ObstacleType::Ceiling,
            ObstacleKind::Middle { .. } => ObstacleType::Middle,
            ObstacleKind::Empty { .. } => ObstacleType::Empty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    /// Left edge
    pub x: f32,
    /// Type-dependent anchor (see `ObstacleKind`)
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub kind: ObstacleKind,
}

impl Obstacle {
    pub fn obstacle_type(&self) -> ObstacleType {
        self.kind.obstacle_type()
    }

    /// Only empty slots are harmless
    pub fn is_lethal(&self) -> bool {
        self.obstacle_type() != ObstacleType::Empty
    }

    /// Scroll left by `distance`
    pub fn advance(&mut self, distance: f32) {
        self.x -= distance;
    }

    pub fn is_offscreen(&self) -> bool {
        self.x + self.width < -DESPAWN_MARGIN
    }

    /// Embedded collectible, if any
    pub fn collectible(&self) -> Option<&Collectible> {
        match &self.kind {
            ObstacleKind::Middle { stick, .. } => stick.as_ref(),
            ObstacleKind::Empty { charge } => charge.as_ref(),
            _ => None,
        }
    }

    /// Build an obstacle of the given type with its fixed geometry
    pub fn with_type(id: u32, x: f32, ty: ObstacleType) -> Self {
        let (y, width, height, kind) = match ty {
            ObstacleType::Floor => (
                OBSTACLE_ANCHOR,
                FLOOR_OBSTACLE_WIDTH,
                FLOOR_OBSTACLE_HEIGHT,
                ObstacleKind::Floor,
            ),
            ObstacleType::Ceiling => (
                OBSTACLE_ANCHOR,
                CEILING_OBSTACLE_WIDTH,
                CEILING_OBSTACLE_HEIGHT,
                ObstacleKind::Ceiling,
            ),
            ObstacleType::Middle => (
                TREE_ANCHOR,
                TREE_WIDTH,
                TREE_TRUNK_HEIGHT + TREE_CANOPY_HEIGHT,
                ObstacleKind::Middle {
                    trunk_h: TREE_TRUNK_HEIGHT,
                    canopy_h: TREE_CANOPY_HEIGHT,
                    stick: None,
                },
            ),
            ObstacleType::Empty => (
                OBSTACLE_ANCHOR,
                EMPTY_SLOT_WIDTH,
                EMPTY_SLOT_HEIGHT,
                ObstacleKind::Empty { charge: None },
            ),
        };
        Self {
            id,
            x,
            y,
            width,
            height,
            kind,
        }
    }
}

/// The next obstacle to place, fixed until it spawns
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PendingSpawn {
    pub ty: ObstacleType,
    /// Scroll distance required since the previous spawn
    pub required: f32,
}

/// Distance-triggered obstacle generator
#[derive(Debug, Clone)]
pub struct Spawner {
    rng: Pcg32,
    /// Scroll distance since the previous spawn
    accumulated: f32,
    pending: Option<PendingSpawn>,
    last: Option<(ObstacleType, f32)>,
    next_id: u32,
}

impl Spawner {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            accumulated: 0.0,
            pending: None,
            last: None,
            next_id: 1,
        }
    }

    pub fn pending(&self) -> Option<PendingSpawn> {
        self.pending
    }

    pub fn accumulated(&self) -> f32 {
        self.accumulated
    }

    /// Pick the next type given the previous one
    fn choose_type(&mut self, previous: Option<ObstacleType>) -> ObstacleType {
        let roll = self.rng.random_range(0..4u8);
        match previous {
            Some(ObstacleType::Middle) => match roll {
                0 | 1 => ObstacleType::Ceiling,
                2 => ObstacleType::Middle,
                _ => ObstacleType::Empty,
            },
            Some(ObstacleType::Floor) => match roll {
                0 | 1 => ObstacleType::Ceiling,
                2 => ObstacleType::Floor,
                _ => ObstacleType::Empty,
            },
            _ => match roll {
                0 => ObstacleType::Floor,
                1 => ObstacleType::Ceiling,
                2 => ObstacleType::Middle,
                _ => ObstacleType::Empty,
            },
        }
    }

    fn plan_next(&mut self, tuning: &Tuning) -> PendingSpawn {
        let previous = self.last.map(|(ty, _)| ty);
        let ty = self.choose_type(previous);
        let gap = if previous == Some(ty) {
            tuning.same_type_gap
        } else {
            tuning.different_type_gap
        };
        let prev_width = self.last.map(|(_, w)| w).unwrap_or(0.0);
        let pending = PendingSpawn {
            ty,
            required: gap + prev_width,
        };
        log::debug!("Next obstacle: {:?} after {:.1} units", pending.ty, pending.required);
        pending
    }

    /// Advance by `distance` scrolled this step; returns a new obstacle when due
    pub fn advance(&mut self, distance: f32, tuning: &Tuning) -> Option<Obstacle> {
        self.accumulated += distance;
        let pending = match self.pending {
            Some(p) => p,
            None => {
                let p = self.plan_next(tuning);
                self.pending = Some(p);
                p
            }
        };
        if self.accumulated < pending.required {
            return None;
        }

        self.pending = None;
        self.accumulated = 0.0;
        Some(self.spawn(pending.ty, tuning))
    }

    fn spawn(&mut self, ty: ObstacleType, tuning: &Tuning) -> Obstacle {
        let id = self.next_id;
        self.next_id += 1;
        let mut obstacle = Obstacle::with_type(id, WORLD_WIDTH, ty);

        match &mut obstacle.kind {
            ObstacleKind::Middle { stick, .. } => {
                if self.rng.random_bool(tuning.stick_chance) {
                    *stick = Some(Collectible::stick());
                }
            }
            ObstacleKind::Empty { charge } => {
                if self.rng.random_bool(tuning.charge_chance) {
                    *charge = Some(Collectible::charge());
                }
            }
            _ => {}
        }

        self.last = Some((ty, obstacle.width));
        obstacle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    /// Scroll the spawner and the obstacles it produced in lockstep
    /// Returns (previous type, new type, left-edge distance, previous width)
    fn run(seed: u64, steps: usize, step: f32) -> Vec<(ObstacleType, ObstacleType, f32, f32)> {
        let tuning = Tuning::default();
        let mut spawner = Spawner::new(seed);
        let mut placed: Vec<Obstacle> = Vec::new();
        let mut spawned = Vec::new();
        for _ in 0..steps {
            for o in &mut placed {
                o.advance(step);
            }
            if let Some(o) = spawner.advance(step, &tuning) {
                if let Some(prev) = placed.last() {
                    spawned.push((prev.obstacle_type(), o.obstacle_type(), o.x - prev.x, prev.width));
                }
                placed.push(o);
            }
        }
        spawned
    }

    #[test]
    fn spawns_are_never_before_required_distance() {
        let tuning = Tuning::default();
        let mut spawner = Spawner::new(7);
        assert!(spawner.advance(1.0, &tuning).is_none());
        let pending = spawner.pending().unwrap();
        assert_eq!(pending.required, tuning.different_type_gap);

        // Pending choice stays fixed while accumulating
        for _ in 0..30 {
            assert!(spawner.advance(1.0, &tuning).is_none());
            assert_eq!(spawner.pending(), Some(pending));
        }
        let mut spawned = None;
        for _ in 0..20 {
            if let Some(o) = spawner.advance(1.0, &tuning) {
                spawned = Some(o);
                break;
            }
        }
        let o = spawned.expect("obstacle due");
        assert_eq!(o.obstacle_type(), pending.ty);
        assert_eq!(o.x, WORLD_WIDTH);
        assert_eq!(spawner.accumulated(), 0.0);
    }

    #[test]
    fn sequencing_excludes_forbidden_followers() {
        let mut spawner = Spawner::new(99);
        for _ in 0..500 {
            let after_middle = spawner.choose_type(Some(ObstacleType::Middle));
            assert_ne!(after_middle, ObstacleType::Floor);
            let after_floor = spawner.choose_type(Some(ObstacleType::Floor));
            assert_ne!(after_floor, ObstacleType::Middle);
        }
    }

    #[test]
    fn first_spawn_can_be_any_type() {
        let mut spawner = Spawner::new(3);
        let seen: HashSet<_> = (0..200).map(|_| spawner.choose_type(None)).collect();
        assert_eq!(seen.len(), 4);
    }

    #[test]
    fn collectibles_only_in_their_hosts() {
        let tuning = Tuning {
            stick_chance: 1.0,
            charge_chance: 1.0,
            ..Tuning::default()
        };
        let mut spawner = Spawner::new(11);
        for _ in 0..5000 {
            if let Some(o) = spawner.advance(1.0, &tuning) {
                match o.kind {
                    ObstacleKind::Middle { stick, .. } => assert!(stick.is_some()),
                    ObstacleKind::Empty { charge } => assert!(charge.is_some()),
                    _ => assert!(o.collectible().is_none()),
                }
            }
        }
    }

    fn type_shares(previous: Option<ObstacleType>, rolls: u32) -> [f64; 4] {
        let mut spawner = Spawner::new(11);
        let mut counts = [0u32; 4];
        for _ in 0..rolls {
            let slot = match spawner.choose_type(previous) {
                ObstacleType::Floor => 0,
                ObstacleType::Ceiling => 1,
                ObstacleType::Middle => 2,
                ObstacleType::Empty => 3,
            };
            counts[slot] += 1;
        }
        counts.map(|c| c as f64 / rolls as f64)
    }

    fn assert_shares(actual: [f64; 4], expected: [f64; 4]) {
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 0.02, "shares {actual:?}, expected {expected:?}");
        }
    }

    #[test]
    fn type_weights_follow_previous_type() {
        // floor, ceiling, middle, empty
        assert_shares(type_shares(Some(ObstacleType::Middle), 40_000), [0.0, 0.5, 0.25, 0.25]);
        assert_shares(type_shares(Some(ObstacleType::Floor), 40_000), [0.25, 0.5, 0.0, 0.25]);
        assert_shares(type_shares(Some(ObstacleType::Ceiling), 40_000), [0.25; 4]);
        assert_shares(type_shares(Some(ObstacleType::Empty), 40_000), [0.25; 4]);
        assert_shares(type_shares(None, 40_000), [0.25; 4]);
    }

    #[test]
    fn collectible_embedding_rates() {
        let tuning = Tuning::default();
        let mut spawner = Spawner::new(5);
        let trials = 20_000;
        let sticks = (0..trials)
            .filter(|_| spawner.spawn(ObstacleType::Middle, &tuning).collectible().is_some())
            .count();
        let charges = (0..trials)
            .filter(|_| spawner.spawn(ObstacleType::Empty, &tuning).collectible().is_some())
            .count();

        let stick_rate = sticks as f64 / trials as f64;
        let charge_rate = charges as f64 / trials as f64;
        assert!((stick_rate - 0.22).abs() < 0.02, "stick rate {stick_rate}");
        assert!((charge_rate - 0.33).abs() < 0.02, "charge rate {charge_rate}");
    }

    #[test]
    fn empty_is_not_lethal() {
        assert!(!Obstacle::with_type(1, 0.0, ObstacleType::Empty).is_lethal());
        assert!(Obstacle::with_type(1, 0.0, ObstacleType::Floor).is_lethal());
        assert!(Obstacle::with_type(1, 0.0, ObstacleType::Middle).is_lethal());
    }

    #[test]
    fn offscreen_after_margin() {
        let mut o = Obstacle::with_type(1, 0.0, ObstacleType::Floor);
        o.x = -FLOOR_OBSTACLE_WIDTH - DESPAWN_MARGIN;
        assert!(!o.is_offscreen());
        o.advance(0.1);
        assert!(o.is_offscreen());
    }

    #[test]
    fn same_seed_same_sequence() {
        assert_eq!(run(42, 2000, 0.7), run(42, 2000, 0.7));
    }

    proptest! {
        #[test]
        fn consecutive_spawns_respect_gap(seed: u64, step in 0.1f32..2.5) {
            let tuning = Tuning::default();
            for (prev, next, distance, prev_width) in run(seed, 1500, step) {
                let gap = if prev == next {
                    tuning.same_type_gap
                } else {
                    tuning.different_type_gap
                };
                prop_assert!(distance + 1e-3 >= gap + prev_width);
            }
        }
    }
}
