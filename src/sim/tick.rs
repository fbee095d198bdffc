//! Fixed-rate simulation ticks
//!
//! Each function is the payload of one periodic activity. All of them check
//! the pause/game-over gate first and do nothing when it is closed.

use rand::Rng;

use super::collision::obstacle_hits_player;
use super::state::{GameEvent, GameState, Obstacle, Track};
use crate::consts::*;

/// What a fall tick resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallOutcome {
    /// Gate closed, nothing moved
    Idle,
    /// Obstacles moved, no overlap with the player
    Clear,
    /// An obstacle was absorbed by the shield
    Absorbed,
    /// Non-shielded hit; the game is now over
    GameOver,
}

/// Move the player one motion step. `direction` is -1 (left), 0 or 1 (right).
pub fn motion_tick(state: &mut GameState, direction: f32) {
    if !state.is_running() || direction == 0.0 {
        return;
    }
    let track = state.track;
    state.player.step(direction.signum() * PLAYER_STEP, &track);
}

/// Reflected horizontal speed after a wall bounce
fn bounce_speed<R: Rng>(speed: f32, rng: &mut R) -> f32 {
    let restitution = rng.random_range(BOUNCE_RESTITUTION_MIN..=BOUNCE_RESTITUTION_MAX);
    (speed * restitution).clamp(BOUNCE_MIN_SPEED, BOUNCE_MAX_SPEED)
}

/// Integrate one obstacle by one fall tick
pub fn advance_obstacle<R: Rng>(obstacle: &mut Obstacle, track: &Track, rng: &mut R) {
    obstacle.pos.y += obstacle.fall_speed;

    let max_x = obstacle.max_x(track);
    if obstacle.bouncing {
        obstacle.pos.x += obstacle.velocity_x;
        if obstacle.pos.x <= 0.0 && obstacle.velocity_x < 0.0 {
            obstacle.pos.x = 0.0;
            obstacle.velocity_x = bounce_speed(obstacle.velocity_x.abs(), rng);
            obstacle.bounce_count += 1;
        } else if obstacle.pos.x >= max_x && obstacle.velocity_x > 0.0 {
            obstacle.pos.x = max_x;
            obstacle.velocity_x = -bounce_speed(obstacle.velocity_x, rng);
            obstacle.bounce_count += 1;
        }
    }
    obstacle.pos.x = obstacle.pos.x.clamp(0.0, max_x);
}

/// Score and experience for an obstacle that cleared the floor line
fn award_avoid(state: &mut GameState, obstacle: &Obstacle, events: &mut Vec<GameEvent>) {
    let base = if obstacle.bouncing {
        BOUNCING_AVOID_SCORE
    } else {
        AVOID_SCORE
    };
    let score = state
        .progression
        .scaled_score(base, state.difficulty.profile().score);
    let exp = AVOID_BASE_EXP + state.progression.level / 2;

    state.avoided += 1;
    state.score += score;
    events.push(GameEvent::Avoided {
        id: obstacle.id,
        score,
        exp,
    });
    state.grant_exp(exp, events);
}

/// Advance every obstacle in spawn order and resolve outcomes.
///
/// The first overlap in a tick wins. A shield-absorb lets the remaining
/// obstacles keep moving; a hit ends the game and flushes the rest unmoved.
pub fn fall_tick(state: &mut GameState, events: &mut Vec<GameEvent>) -> FallOutcome {
    if !state.is_running() {
        return FallOutcome::Idle;
    }

    let mut outcome = FallOutcome::Clear;
    let mut i = 0;
    while i < state.obstacles.len() {
        advance_obstacle(&mut state.obstacles[i], &state.track, &mut state.rng);

        let hit = outcome == FallOutcome::Clear
            && obstacle_hits_player(&state.obstacles[i], &state.player, MIN_OVERLAP);
        if hit {
            let obstacle = state.obstacles.remove(i);
            let at = state.player.hitbox().center();

            if state.progression.is_shielded {
                events.push(GameEvent::ShieldAbsorbed {
                    id: obstacle.id,
                    at,
                    exp: SHIELD_ABSORB_EXP,
                });
                state.grant_exp(SHIELD_ABSORB_EXP, events);
                outcome = FallOutcome::Absorbed;
                continue;
            }

            events.push(GameEvent::Collision { id: obstacle.id, at });
            state.is_over = true;
            let count = state.obstacles.len();
            state.obstacles.clear();
            events.push(GameEvent::ObstaclesFlushed { count });
            log::info!(
                "Collision with obstacle {} at {}s, score {}",
                obstacle.id,
                state.elapsed_seconds,
                state.score
            );
            return FallOutcome::GameOver;
        }

        if state.obstacles[i].is_past_floor() {
            let obstacle = state.obstacles.remove(i);
            award_avoid(state, &obstacle, events);
            continue;
        }

        i += 1;
    }
    outcome
}

/// Per-heartbeat score before multipliers, by elapsed seconds
pub fn base_score_increment(t: u32) -> f64 {
    match t {
        0..5 => 20.0,
        5..10 => 30.0,
        10..15 => 50.0,
        15..20 => 80.0,
        _ => 120.0,
    }
}

/// One heartbeat: advance the clock, accrue score and survival experience.
/// Returns the score added, or None when the gate is closed.
pub fn heartbeat(state: &mut GameState, events: &mut Vec<GameEvent>) -> Option<u64> {
    if !state.is_running() {
        return None;
    }

    state.elapsed_seconds += 1;
    let profile = state.difficulty.profile();
    let base = base_score_increment(state.elapsed_seconds);
    let increment = state
        .progression
        .scaled_score(base, profile.score * profile.survival_bonus);
    state.score += increment;
    state.grant_exp(profile.heartbeat_exp, events);
    Some(increment)
}

/// Spend a shield charge. Refused once the game is over.
pub fn activate_shield(state: &mut GameState, events: &mut Vec<GameEvent>) -> bool {
    if state.is_over || !state.progression.use_shield() {
        return false;
    }
    log::info!(
        "Shield up ({} charges left)",
        state.progression.shield_charges
    );
    events.push(GameEvent::ShieldActivated {
        charges_left: state.progression.shield_charges,
    });
    true
}

/// Flip the pause flag. Ignored once the game is over.
pub fn toggle_pause(state: &mut GameState, events: &mut Vec<GameEvent>) {
    if state.is_over {
        return;
    }
    state.is_paused = !state.is_paused;
    events.push(if state.is_paused {
        GameEvent::Paused
    } else {
        GameEvent::Resumed
    });
}
