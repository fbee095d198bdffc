//! Hitbox overlap tests
//!
//! A touch is not a hit: both axes have to overlap by more than a threshold,
//! which forgives grazes along the box edges.

use glam::Vec2;

use super::state::{Obstacle, Player};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    /// Box from its top-left corner and size
    pub fn from_rect(origin: Vec2, size: Vec2) -> Self {
        Self {
            min: origin,
            max: origin + size,
        }
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Per-axis overlap length (negative on an axis means a gap)
    #[inline]
    pub fn overlap(&self, other: &Aabb) -> Vec2 {
        self.max.min(other.max) - self.min.max(other.min)
    }

    /// True when the overlap exceeds `min_overlap` on both axes
    #[inline]
    pub fn hits(&self, other: &Aabb, min_overlap: f32) -> bool {
        let overlap = self.overlap(other);
        overlap.x > min_overlap && overlap.y > min_overlap
    }
}

/// Check a single obstacle against the player
pub fn obstacle_hits_player(obstacle: &Obstacle, player: &Player, min_overlap: f32) -> bool {
    obstacle.hitbox().hits(&player.hitbox(), min_overlap)
}

/// Index of the first obstacle (in slice order) hitting the player
pub fn first_hit(obstacles: &[Obstacle], player: &Player, min_overlap: f32) -> Option<usize> {
    obstacles
        .iter()
        .position(|o| obstacle_hits_player(o, player, min_overlap))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::state::ObstacleShape;

    fn obstacle_at(id: u32, x: f32, y: f32, size: f32) -> Obstacle {
        Obstacle {
            id,
            pos: Vec2::new(x, y),
            size,
            shape: ObstacleShape::Square,
            fall_speed: 3.0,
            bouncing: false,
            velocity_x: 0.0,
            bounce_count: 0,
        }
    }

    #[test]
    fn test_overlap_per_axis() {
        let a = Aabb::from_rect(Vec2::ZERO, Vec2::splat(10.0));
        let b = Aabb::from_rect(Vec2::new(7.0, -4.0), Vec2::splat(10.0));
        let overlap = a.overlap(&b);
        assert_eq!(overlap, Vec2::new(3.0, 6.0));

        let c = Aabb::from_rect(Vec2::new(15.0, 0.0), Vec2::splat(10.0));
        assert!(a.overlap(&c).x < 0.0);
    }

    #[test]
    fn test_edge_graze_is_not_a_hit() {
        let player = Player { x: 100.0 };
        // Obstacle's bottom edge 1px into the player's top
        let o = obstacle_at(1, 100.0, PLAYER_Y - 40.0 + 1.0, 40.0);
        assert!(!obstacle_hits_player(&o, &player, MIN_OVERLAP));

        // Full vertical overlap, 1px horizontal overlap
        let o = obstacle_at(2, 100.0 - 40.0 + 1.0, PLAYER_Y, 40.0);
        assert!(!obstacle_hits_player(&o, &player, MIN_OVERLAP));
    }

    #[test]
    fn test_deep_overlap_is_a_hit() {
        let player = Player { x: 100.0 };
        // 20px into the player on both axes
        let o = obstacle_at(1, 100.0 - 40.0 + 20.0, PLAYER_Y - 40.0 + 20.0, 40.0);
        assert!(obstacle_hits_player(&o, &player, MIN_OVERLAP));
    }

    #[test]
    fn test_needs_both_axes() {
        let player = Player { x: 100.0 };
        // Deep horizontally, above the player vertically
        let o = obstacle_at(1, 105.0, PLAYER_Y - 45.0, 40.0);
        assert!(!obstacle_hits_player(&o, &player, MIN_OVERLAP));
    }

    #[test]
    fn test_first_hit_is_stable_by_order() {
        let player = Player { x: 100.0 };
        let obstacles = vec![
            obstacle_at(1, 0.0, 0.0, 40.0),
            obstacle_at(2, 105.0, PLAYER_Y, 40.0),
            obstacle_at(3, 110.0, PLAYER_Y, 40.0),
        ];
        assert_eq!(first_hit(&obstacles, &player, MIN_OVERLAP), Some(1));
        assert_eq!(first_hit(&obstacles[..1], &player, MIN_OVERLAP), None);
    }
}
