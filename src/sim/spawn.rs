//! Spawn cadence, fall speed and obstacle generation
//!
//! Every curve here is a decreasing (interval) or increasing (speed) step
//! in elapsed seconds, scaled by the difficulty tier, jittered, then clamped.

use glam::Vec2;
use rand::Rng;
use rand::seq::IndexedRandom;

use super::difficulty::Difficulty;
use super::state::{GameEvent, GameState, Obstacle, ObstacleShape, Track};
use crate::consts::*;

/// Spawn interval before difficulty and noise (ms).
///
/// Non-increasing in `t`, saturating at 50 ms from 20 s on.
pub fn base_spawn_interval(t: u32) -> f64 {
    let t = t as f64;
    if t < 5.0 {
        800.0 - t * 80.0
    } else if t < 10.0 {
        400.0 - (t - 5.0) * 40.0
    } else if t < 15.0 {
        200.0 - (t - 10.0) * 20.0
    } else if t < 20.0 {
        100.0 - (t - 15.0) * 10.0
    } else {
        50.0
    }
}

/// Delay until the next spawn (ms), never below `MIN_SPAWN_DELAY_MS`
pub fn spawn_delay_ms<R: Rng>(t: u32, difficulty: Difficulty, rng: &mut R) -> u64 {
    let base = base_spawn_interval(t) * difficulty.profile().spawn_rate;
    let spread = base * SPAWN_NOISE;
    let jittered = base + rng.random_range(-spread..=spread);
    jittered.max(MIN_SPAWN_DELAY_MS).round() as u64
}

/// Fall speed before difficulty and noise (px per fall tick)
pub fn base_fall_speed(t: u32) -> f32 {
    let t = t as f32;
    if t < 8.0 {
        2.5 + t * 0.25
    } else if t < 16.0 {
        4.5 + (t - 8.0) * 0.5
    } else {
        8.5 + (t - 16.0) * 0.3
    }
}

/// Fall speed for a new obstacle, within `[MIN_FALL_SPEED, MAX_FALL_SPEED]`
pub fn fall_speed<R: Rng>(t: u32, difficulty: Difficulty, rng: &mut R) -> f32 {
    let base = base_fall_speed(t) * difficulty.profile().fall_speed;
    let spread = base * FALL_NOISE;
    let jittered = base + rng.random_range(-spread..=spread);
    jittered.clamp(MIN_FALL_SPEED, MAX_FALL_SPEED)
}

/// Obstacle sizes available on a track of the given width
pub fn size_band(track_width: f32) -> &'static [f32] {
    if track_width >= 550.0 {
        &[40.0, 45.0, 50.0, 55.0, 60.0]
    } else if track_width >= 450.0 {
        &[35.0, 40.0, 45.0, 50.0, 55.0]
    } else {
        &[30.0, 35.0, 40.0, 45.0, 50.0]
    }
}

/// Roll a new obstacle at the top of the track (does not insert it)
pub fn roll_obstacle<R: Rng>(
    id: u32,
    t: u32,
    difficulty: Difficulty,
    track: &Track,
    rng: &mut R,
) -> Obstacle {
    let band = size_band(track.width);
    let size = band.choose(rng).copied().unwrap_or(band[0]).min(track.width);
    let shape = ObstacleShape::ALL
        .choose(rng)
        .copied()
        .unwrap_or(ObstacleShape::Square);

    let max_x = (track.width - size).max(0.0);
    let x = rng.random_range(0.0..=max_x);
    let fall_speed = fall_speed(t, difficulty, rng);

    let bouncing = rng.random_bool(BOUNCE_CHANCE);
    let velocity_x = if bouncing {
        let magnitude = rng.random_range(BOUNCE_MIN_VX..=BOUNCE_MAX_VX);
        if rng.random_bool(0.5) { magnitude } else { -magnitude }
    } else {
        0.0
    };

    Obstacle {
        id,
        pos: Vec2::new(x, 0.0),
        size,
        shape,
        fall_speed,
        bouncing,
        velocity_x,
        bounce_count: 0,
    }
}

/// Spawn one obstacle into the state
pub fn spawn_obstacle(state: &mut GameState, events: &mut Vec<GameEvent>) -> u32 {
    let id = state.next_entity_id();
    let obstacle = roll_obstacle(
        id,
        state.elapsed_seconds,
        state.difficulty,
        &state.track,
        &mut state.rng,
    );
    events.push(GameEvent::ObstacleSpawned {
        id,
        bouncing: obstacle.bouncing,
    });
    state.obstacles.push(obstacle);
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_base_interval_non_increasing_and_saturates() {
        let mut prev = f64::MAX;
        for t in 0..60 {
            let v = base_spawn_interval(t);
            assert!(v <= prev, "interval rose at t={t}");
            prev = v;
        }
        assert_eq!(base_spawn_interval(20), 50.0);
        assert_eq!(base_spawn_interval(500), 50.0);
        assert_eq!(base_spawn_interval(0), 800.0);
    }

    #[test]
    fn test_spawn_delay_within_noise_and_floor() {
        let mut rng = Pcg32::seed_from_u64(1);
        for _ in 0..200 {
            let d = spawn_delay_ms(0, Difficulty::Normal, &mut rng);
            assert!((600..=1000).contains(&d), "delay {d}");
        }
        for t in [20, 100, 10_000] {
            for tier in Difficulty::ALL {
                let d = spawn_delay_ms(t, tier, &mut rng);
                assert!(d as f64 >= MIN_SPAWN_DELAY_MS);
            }
        }
    }

    #[test]
    fn test_insane_spawns_faster_than_easy() {
        let mut rng = Pcg32::seed_from_u64(2);
        for _ in 0..100 {
            let insane = spawn_delay_ms(0, Difficulty::Insane, &mut rng);
            let easy = spawn_delay_ms(0, Difficulty::Easy, &mut rng);
            assert!(insane < easy);
        }
    }

    #[test]
    fn test_fall_speed_clamped() {
        let mut rng = Pcg32::seed_from_u64(3);
        for t in [0, 8, 16, 60, 1_000] {
            for tier in Difficulty::ALL {
                let s = fall_speed(t, tier, &mut rng);
                assert!((MIN_FALL_SPEED..=MAX_FALL_SPEED).contains(&s));
            }
        }
        // Late game saturates at the cap
        assert_eq!(fall_speed(10_000, Difficulty::Easy, &mut rng), MAX_FALL_SPEED);
    }

    #[test]
    fn test_rolled_obstacle_fits_track() {
        let mut rng = Pcg32::seed_from_u64(4);
        let track = Track::new(320.0);
        let mut bouncing = 0;
        for id in 0..500 {
            let o = roll_obstacle(id, 0, Difficulty::Normal, &track, &mut rng);
            assert!(size_band(track.width).contains(&o.size));
            assert!(o.pos.x >= 0.0 && o.pos.x <= track.width - o.size);
            assert_eq!(o.pos.y, 0.0);
            assert!(o.fall_speed > 0.0);
            if o.bouncing {
                bouncing += 1;
                assert!((BOUNCE_MIN_VX..=BOUNCE_MAX_VX).contains(&o.velocity_x.abs()));
            } else {
                assert_eq!(o.velocity_x, 0.0);
            }
        }
        // ~30% of 500
        assert!((100..200).contains(&bouncing), "bouncing={bouncing}");
    }

    #[test]
    fn test_size_band_by_width() {
        assert_eq!(size_band(600.0)[0], 40.0);
        assert_eq!(size_band(500.0)[0], 35.0);
        assert_eq!(size_band(320.0)[0], 30.0);
    }
}
