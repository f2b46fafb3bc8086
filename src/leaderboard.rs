//! Global best-times board: one entry per callsign, improved in place.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::LeaderboardError;
use crate::profile::ProfileStore;

pub const LEADERBOARD_KEY: &str = "livepuzzle_leaderboard";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub seconds: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitAck {
    /// First entry for this callsign.
    Created,
    /// Existing entry replaced by a faster time.
    Improved,
    /// Existing entry was as fast or faster; nothing written.
    Unchanged,
}

impl SubmitAck {
    pub fn status_text(&self) -> &'static str {
        match self {
            SubmitAck::Improved => "NEW BEST SAVED",
            SubmitAck::Created | SubmitAck::Unchanged => "SCORE SAVED",
        }
    }
}

/// Remote-style board. Futures are not `Send`; everything runs on the page's
/// event loop.
#[allow(async_fn_in_trait)]
pub trait Leaderboard {
    async fn submit_or_update_best(&self, name: &str, seconds: u64) -> Result<SubmitAck, LeaderboardError>;
    /// Fastest `n` entries, ties in insertion order.
    async fn query_top(&self, n: usize) -> Result<Vec<LeaderboardEntry>, LeaderboardError>;
    /// Entries strictly faster than `seconds`.
    async fn count_better(&self, seconds: u64) -> Result<usize, LeaderboardError>;
    async fn register_user(&self, name: &str) -> Result<(), LeaderboardError>;
}

/// Board contents shared by the in-memory and storage-backed boards.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardData {
    pub entries: Vec<LeaderboardEntry>,
    pub users: Vec<String>,
}

impl BoardData {
    fn submit(&mut self, name: &str, seconds: u64) -> SubmitAck {
        match self.entries.iter_mut().find(|e| e.name == name) {
            None => {
                self.entries.push(LeaderboardEntry {
                    name: name.to_string(),
                    seconds,
                });
                SubmitAck::Created
            }
            Some(entry) if seconds < entry.seconds => {
                entry.seconds = seconds;
                SubmitAck::Improved
            }
            Some(_) => SubmitAck::Unchanged,
        }
    }

    fn top(&self, n: usize) -> Vec<LeaderboardEntry> {
        let mut sorted = self.entries.clone();
        sorted.sort_by_key(|e| e.seconds);
        sorted.truncate(n);
        sorted
    }

    fn count_better(&self, seconds: u64) -> usize {
        self.entries.iter().filter(|e| e.seconds < seconds).count()
    }
}

/// Board persisted as one JSON document in a string store.
#[derive(Debug)]
pub struct StorageLeaderboard<S> {
    store: S,
}

impl<S: ProfileStore> StorageLeaderboard<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    fn load(&self) -> Result<BoardData, LeaderboardError> {
        match self.store.get_string(LEADERBOARD_KEY)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(BoardData::default()),
        }
    }

    fn save(&self, data: &BoardData) -> Result<(), LeaderboardError> {
        let raw = serde_json::to_string(data)?;
        self.store.set_string(LEADERBOARD_KEY, &raw)?;
        Ok(())
    }
}

impl<S: ProfileStore> Leaderboard for StorageLeaderboard<S> {
    async fn submit_or_update_best(&self, name: &str, seconds: u64) -> Result<SubmitAck, LeaderboardError> {
        let mut data = self.load()?;
        let ack = data.submit(name, seconds);
        if ack != SubmitAck::Unchanged {
            self.save(&data)?;
        }
        debug!(name, seconds, ?ack, "leaderboard submit");
        Ok(ack)
    }

    async fn query_top(&self, n: usize) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        Ok(self.load()?.top(n))
    }

    async fn count_better(&self, seconds: u64) -> Result<usize, LeaderboardError> {
        Ok(self.load()?.count_better(seconds))
    }

    async fn register_user(&self, name: &str) -> Result<(), LeaderboardError> {
        let mut data = self.load()?;
        data.users.push(name.to_string());
        self.save(&data)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PanelRow {
    pub rank: usize,
    pub name: String,
    pub seconds: u64,
    pub is_user: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PanelState {
    Loading,
    Empty,
    Loaded {
        rows: Vec<PanelRow>,
        /// The player's own row when they rank below the visible rows.
        user_rank: Option<PanelRow>,
    },
    LoadError,
}

impl PanelState {
    /// Fetches the top `n` and, for a registered player outside it, their rank.
    pub async fn load<L: Leaderboard>(
        board: &L,
        username: Option<&str>,
        personal_best: Option<u64>,
        n: usize,
    ) -> PanelState {
        let top = match board.query_top(n).await {
            Ok(top) => top,
            Err(err) => {
                warn!(error = %err, "leaderboard load failed");
                return PanelState::LoadError;
            }
        };
        let username = username.filter(|u| !u.is_empty());
        let rows: Vec<PanelRow> = top
            .into_iter()
            .enumerate()
            .map(|(i, e)| PanelRow {
                rank: i + 1,
                is_user: username == Some(e.name.as_str()),
                name: e.name,
                seconds: e.seconds,
            })
            .collect();
        let user_in_top = rows.iter().any(|r| r.is_user);

        let mut user_rank = None;
        if let (Some(name), Some(best), false) = (username, personal_best, user_in_top) {
            match board.count_better(best).await {
                Ok(better) => {
                    user_rank = Some(PanelRow {
                        rank: better + 1,
                        name: name.to_string(),
                        seconds: best,
                        is_user: true,
                    })
                }
                Err(err) => warn!(error = %err, "leaderboard rank query failed"),
            }
        }

        if rows.is_empty() && user_rank.is_none() {
            PanelState::Empty
        } else {
            PanelState::Loaded { rows, user_rank }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::profile::test_support::MemoryProfileStore;
    use futures::executor::block_on;
    use std::cell::{Cell, RefCell};

    #[derive(Debug, Default)]
    struct MemoryLeaderboard {
        data: RefCell<BoardData>,
    }

    impl MemoryLeaderboard {
        fn new() -> Self {
            Self::default()
        }

        fn users(&self) -> Vec<String> {
            self.data.borrow().users.clone()
        }
    }

    impl Leaderboard for MemoryLeaderboard {
        async fn submit_or_update_best(&self, name: &str, seconds: u64) -> Result<SubmitAck, LeaderboardError> {
            Ok(self.data.borrow_mut().submit(name, seconds))
        }

        async fn query_top(&self, n: usize) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
            Ok(self.data.borrow().top(n))
        }

        async fn count_better(&self, seconds: u64) -> Result<usize, LeaderboardError> {
            Ok(self.data.borrow().count_better(seconds))
        }

        async fn register_user(&self, name: &str) -> Result<(), LeaderboardError> {
            self.data.borrow_mut().users.push(name.to_string());
            Ok(())
        }
    }

    /// Top query works, rank query fails.
    struct FlakyBoard {
        inner: MemoryLeaderboard,
        fail_top: bool,
        rank_calls: Cell<usize>,
    }

    impl Leaderboard for FlakyBoard {
        async fn submit_or_update_best(&self, name: &str, seconds: u64) -> Result<SubmitAck, LeaderboardError> {
            self.inner.submit_or_update_best(name, seconds).await
        }
        async fn query_top(&self, n: usize) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
            if self.fail_top {
                return Err(LeaderboardError::Unavailable);
            }
            self.inner.query_top(n).await
        }
        async fn count_better(&self, _seconds: u64) -> Result<usize, LeaderboardError> {
            self.rank_calls.set(self.rank_calls.get() + 1);
            Err(LeaderboardError::Unavailable)
        }
        async fn register_user(&self, name: &str) -> Result<(), LeaderboardError> {
            self.inner.register_user(name).await
        }
    }

    fn seeded() -> MemoryLeaderboard {
        let board = MemoryLeaderboard::new();
        block_on(async {
            for (name, secs) in [("ACE", 40), ("BEE", 55), ("CAT", 30), ("DOG", 55), ("EEL", 90), ("FOX", 120)] {
                board.submit_or_update_best(name, secs).await.unwrap();
            }
        });
        board
    }

    #[test]
    fn submit_keeps_only_improvements() {
        let board = MemoryLeaderboard::new();
        block_on(async {
            assert_eq!(board.submit_or_update_best("ACE", 60).await.unwrap(), SubmitAck::Created);
            assert_eq!(board.submit_or_update_best("ACE", 70).await.unwrap(), SubmitAck::Unchanged);
            assert_eq!(board.submit_or_update_best("ACE", 60).await.unwrap(), SubmitAck::Unchanged);
            assert_eq!(board.submit_or_update_best("ACE", 50).await.unwrap(), SubmitAck::Improved);
            let top = board.query_top(5).await.unwrap();
            assert_eq!(top, vec![LeaderboardEntry { name: "ACE".into(), seconds: 50 }]);
            board.register_user("ACE").await.unwrap();
        });
        assert_eq!(board.users(), ["ACE"]);
    }

    #[test]
    fn status_text_matches_outcome() {
        assert_eq!(SubmitAck::Created.status_text(), "SCORE SAVED");
        assert_eq!(SubmitAck::Unchanged.status_text(), "SCORE SAVED");
        assert_eq!(SubmitAck::Improved.status_text(), "NEW BEST SAVED");
    }

    #[test]
    fn top_is_ascending_and_stable() {
        let board = seeded();
        let top = block_on(board.query_top(5)).unwrap();
        let names: Vec<_> = top.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["CAT", "ACE", "BEE", "DOG", "EEL"]);
        assert_eq!(block_on(board.count_better(55)).unwrap(), 2);
        assert_eq!(block_on(board.count_better(30)).unwrap(), 0);
    }

    #[test]
    fn panel_marks_user_in_top() {
        let board = seeded();
        let state = block_on(PanelState::load(&board, Some("BEE"), Some(55), 5));
        let PanelState::Loaded { rows, user_rank } = state else {
            panic!("expected loaded panel");
        };
        assert_eq!(rows.len(), 5);
        assert!(rows[2].is_user && rows[2].name == "BEE");
        assert_eq!(rows.iter().filter(|r| r.is_user).count(), 1);
        assert_eq!(user_rank, None);
    }

    #[test]
    fn panel_appends_rank_row_outside_top() {
        let board = seeded();
        let state = block_on(PanelState::load(&board, Some("FOX"), Some(120), 5));
        let PanelState::Loaded { user_rank, .. } = state else {
            panic!("expected loaded panel");
        };
        assert_eq!(
            user_rank,
            Some(PanelRow { rank: 6, name: "FOX".into(), seconds: 120, is_user: true })
        );
    }

    #[test]
    fn guests_and_players_without_best_get_no_rank_row() {
        let board = seeded();
        for (name, best) in [(None, Some(10)), (Some(""), Some(10)), (Some("ZED"), None)] {
            let state = block_on(PanelState::load(&board, name, best, 5));
            assert!(matches!(state, PanelState::Loaded { user_rank: None, .. }));
        }
    }

    #[test]
    fn empty_board_shows_no_submissions() {
        let board = MemoryLeaderboard::new();
        assert_eq!(block_on(PanelState::load(&board, None, None, 5)), PanelState::Empty);
    }

    #[test]
    fn load_failure_and_rank_failure() {
        let failing = FlakyBoard {
            inner: seeded(),
            fail_top: true,
            rank_calls: Cell::new(0),
        };
        assert_eq!(block_on(PanelState::load(&failing, Some("FOX"), Some(120), 5)), PanelState::LoadError);

        let rank_fails = FlakyBoard { fail_top: false, ..failing };
        let state = block_on(PanelState::load(&rank_fails, Some("FOX"), Some(120), 5));
        assert!(matches!(state, PanelState::Loaded { ref rows, user_rank: None } if rows.len() == 5));
        assert_eq!(rank_fails.rank_calls.get(), 1);
    }

    #[test]
    fn storage_board_persists_json() {
        let board = StorageLeaderboard::new(MemoryProfileStore::new());
        block_on(async {
            board.register_user("ACE").await.unwrap();
            board.submit_or_update_best("ACE", 33).await.unwrap();
            board.submit_or_update_best("ACE", 31).await.unwrap();
        });
        let raw = board.store.get_string(LEADERBOARD_KEY).unwrap().unwrap();
        let data: BoardData = serde_json::from_str(&raw).unwrap();
        assert_eq!(data.users, ["ACE"]);
        assert_eq!(data.entries, [LeaderboardEntry { name: "ACE".into(), seconds: 31 }]);
    }

    #[test]
    fn storage_board_reports_corrupt_data() {
        let store = MemoryProfileStore::new();
        store.set_string(LEADERBOARD_KEY, "{not json").unwrap();
        let board = StorageLeaderboard::new(store);
        assert!(matches!(block_on(board.query_top(5)), Err(LeaderboardError::Decode(_))));
        assert_eq!(
            LeaderboardError::from(StoreError::Unavailable),
            LeaderboardError::Unavailable
        );
    }
}
