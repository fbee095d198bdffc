//! High score leaderboard
//!
//! Persisted as a JSON array of `{name, score}` under one storage key,
//! sorted by score descending and capped at the top 10.

use serde::{Deserialize, Serialize};

use crate::consts::MAX_NAME_CHARS;
use crate::persistence::{Storage, load_json, save_json};

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single leaderboard entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: u64,
}

/// Ranked leaderboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
}

/// Trim a player-entered name and cut it to `MAX_NAME_CHARS` characters.
/// None when nothing is left.
pub fn clean_name(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(MAX_NAME_CHARS).collect())
}

impl Leaderboard {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "candy_dodge_rankings";

    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Sort descending (stable) and cap the length
    fn normalize(&mut self) {
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(MAX_HIGH_SCORES);
    }

    /// Whether a score would make the board: room left, or it beats the
    /// current last place
    pub fn is_high_score(&self, score: u64) -> bool {
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().is_none_or(|e| score > e.score)
    }

    /// Insert an entry and return its 1-based rank, or None if it did not
    /// survive the top-10 cut. Equal scores keep their earlier entrants ahead.
    pub fn add(&mut self, name: &str, score: u64) -> Option<usize> {
        let name: String = name.chars().take(MAX_NAME_CHARS).collect();
        let pos = self
            .entries
            .iter()
            .position(|e| e.score < score)
            .unwrap_or(self.entries.len());
        self.entries.insert(pos, LeaderboardEntry { name, score });
        self.entries.truncate(MAX_HIGH_SCORES);

        (pos < MAX_HIGH_SCORES).then_some(pos + 1)
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Load from storage. Missing, unreadable or malformed data all give an
    /// empty board.
    pub fn load(storage: &dyn Storage) -> Self {
        match load_json::<Leaderboard>(storage, Self::STORAGE_KEY) {
            Ok(Some(mut board)) => {
                board.normalize();
                log::info!("Loaded {} high scores", board.entries.len());
                board
            }
            Ok(None) => {
                log::info!("No high scores found, starting fresh");
                Self::new()
            }
            Err(e) => {
                log::warn!("Ignoring stored high scores: {}", e);
                Self::new()
            }
        }
    }

    /// Save to storage; failures are logged and otherwise ignored
    pub fn save(&self, storage: &mut dyn Storage) -> bool {
        match save_json(storage, Self::STORAGE_KEY, self) {
            Ok(()) => {
                log::info!("High scores saved ({} entries)", self.entries.len());
                true
            }
            Err(e) => {
                log::warn!("High scores not saved: {}", e);
                false
            }
        }
    }

    /// Re-read the stored board, add an entry and write it back.
    /// Returns the refreshed board and the entrant's rank.
    pub fn commit(storage: &mut dyn Storage, name: &str, score: u64) -> (Self, Option<usize>) {
        let mut board = Self::load(storage);
        let rank = board.add(name, score);
        board.save(storage);
        (board, rank)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{MemoryStorage, NullStorage};
    use proptest::prelude::*;

    fn board_with(scores: &[u64]) -> Leaderboard {
        let mut board = Leaderboard::new();
        for (i, &s) in scores.iter().enumerate() {
            board.add(&format!("p{i}"), s);
        }
        board
    }

    #[test]
    fn test_add_returns_rank() {
        let mut board = board_with(&[500, 300, 100]);
        assert_eq!(board.add("mid", 400), Some(2));
        assert_eq!(board.add("low", 50), Some(5));
        let scores: Vec<u64> = board.entries.iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![500, 400, 300, 100, 50]);
    }

    #[test]
    fn test_ties_rank_after_existing() {
        let mut board = board_with(&[300, 200]);
        assert_eq!(board.add("tie", 200), Some(3));
        assert_eq!(board.entries[1].name, "p1");
        assert_eq!(board.entries[2].name, "tie");
    }

    #[test]
    fn test_tie_at_tenth_falls_out() {
        let mut board = board_with(&[100; 10]);
        // Qualification says no, but a forced add still reports no rank
        assert!(!board.is_high_score(100));
        assert_eq!(board.add("late", 100), None);
        assert_eq!(board.len(), MAX_HIGH_SCORES);
        assert!(board.entries.iter().all(|e| e.name != "late"));
    }

    #[test]
    fn test_is_high_score() {
        let board = board_with(&[10, 20, 30]);
        assert!(board.is_high_score(0));

        let full = board_with(&[100, 90, 80, 70, 60, 50, 40, 30, 20, 10]);
        assert!(!full.is_high_score(10));
        assert!(!full.is_high_score(5));
        assert!(full.is_high_score(11));
    }

    #[test]
    fn test_eleventh_lower_score_changes_nothing() {
        let mut board = board_with(&[100, 90, 80, 70, 60, 50, 40, 30, 20, 10]);
        let before = board.clone();
        assert_eq!(board.add("low", 5), None);
        assert_eq!(board, before);
    }

    #[test]
    fn test_clean_name() {
        assert_eq!(clean_name("  Ann  ").as_deref(), Some("Ann"));
        assert_eq!(clean_name("   "), None);
        assert_eq!(
            clean_name("abcdefghijklmnop").as_deref(),
            Some("abcdefghijkl")
        );
        // Counts characters, not bytes
        assert_eq!(clean_name("솜사탕솜사탕솜사탕솜사탕솜사탕").unwrap().chars().count(), 12);
    }

    #[test]
    fn test_storage_round_trip_uses_plain_array() {
        let mut storage = MemoryStorage::new();
        let (board, rank) = Leaderboard::commit(&mut storage, "Ann", 120);
        assert_eq!(rank, Some(1));
        assert_eq!(board.len(), 1);

        let raw = storage.get_item(Leaderboard::STORAGE_KEY).unwrap().unwrap();
        assert_eq!(raw, r#"[{"name":"Ann","score":120}]"#);

        let (board, rank) = Leaderboard::commit(&mut storage, "Bob", 300);
        assert_eq!(rank, Some(1));
        assert_eq!(Leaderboard::load(&storage), board);
    }

    #[test]
    fn test_malformed_storage_loads_empty() {
        let mut storage = MemoryStorage::new();
        storage
            .set_item(Leaderboard::STORAGE_KEY, "{\"not\": \"a list\"}")
            .unwrap();
        assert!(Leaderboard::load(&storage).is_empty());

        storage.set_item(Leaderboard::STORAGE_KEY, "garbage").unwrap();
        assert!(Leaderboard::load(&storage).is_empty());
    }

    #[test]
    fn test_unsorted_storage_is_normalized() {
        let mut storage = MemoryStorage::new();
        storage
            .set_item(
                Leaderboard::STORAGE_KEY,
                r#"[{"name":"a","score":1},{"name":"b","score":9}]"#,
            )
            .unwrap();
        let board = Leaderboard::load(&storage);
        assert_eq!(board.entries[0].score, 9);
    }

    #[test]
    fn test_unavailable_storage_degrades() {
        let mut storage = NullStorage;
        assert!(Leaderboard::load(&storage).is_empty());
        let (board, rank) = Leaderboard::commit(&mut storage, "Ann", 10);
        assert_eq!(rank, Some(1));
        assert_eq!(board.len(), 1);
    }

    proptest! {
        #[test]
        fn prop_board_sorted_and_capped(scores in proptest::collection::vec(0u64..10_000, 0..40)) {
            let board = board_with(&scores);
            prop_assert_eq!(board.len(), scores.len().min(MAX_HIGH_SCORES));
            for pair in board.entries.windows(2) {
                prop_assert!(pair[0].score >= pair[1].score);
            }

            let mut expected = scores.clone();
            expected.sort_unstable_by(|a, b| b.cmp(a));
            expected.truncate(MAX_HIGH_SCORES);
            let actual: Vec<u64> = board.entries.iter().map(|e| e.score).collect();
            prop_assert_eq!(actual, expected);
        }

        #[test]
        fn prop_is_high_score_matches_definition(
            scores in proptest::collection::vec(0u64..1_000, 0..15),
            candidate in 0u64..1_000,
        ) {
            let board = board_with(&scores);
            let expected = board.len() < MAX_HIGH_SCORES
                || candidate > board.entries.iter().map(|e| e.score).min().unwrap_or(0);
            prop_assert_eq!(board.is_high_score(candidate), expected);
        }
    }
}
