//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Input events (holds, swipes, shield trigger)
//! - Event dispatch into shared game state
//! - Storage (LocalStorage on web, see `persistence`)

use std::cell::RefCell;

pub mod input;

pub use input::{Direction, Gesture, InputState, SWIPE_MIN_DISTANCE, classify_swipe};

/// Run `f` on the shared value unless it is already borrowed.
///
/// Browser handlers can fire while the frame callback still holds the game
/// (a modal `prompt` inside game over); those events are dropped.
pub fn dispatch<T, R>(cell: &RefCell<T>, f: impl FnOnce(&mut T) -> R) -> Option<R> {
    match cell.try_borrow_mut() {
        Ok(mut value) => Some(f(&mut value)),
        Err(_) => {
            log::debug!("Event dropped: game busy");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_runs_when_free() {
        let cell = RefCell::new(1);
        assert_eq!(dispatch(&cell, |v| {
            *v += 1;
            *v
        }), Some(2));
        assert_eq!(*cell.borrow(), 2);
    }

    #[test]
    fn test_dispatch_skips_reentrant_event() {
        let cell = RefCell::new(0);
        let outer = dispatch(&cell, |v| {
            *v = 5;
            // Nested handler while the outer borrow is live
            dispatch(&cell, |inner| *inner = 99)
        });
        assert_eq!(outer, Some(None));
        assert_eq!(*cell.borrow(), 5);
    }
}
