//! Multiplayer rounds as persisted for the global leaderboard.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{RoundId, UserId, Username};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Round {
    pub id: RoundId,
    pub user_id: UserId,
    pub started_at: NaiveDateTime,
    /// `None` while the round is still being played.
    pub ended_at: Option<NaiveDateTime>,
    pub earnings: i32,
    pub deliveries_completed: i32,
    pub deliveries_failed: i32,
    /// Whole seconds between start and finish.
    pub play_time: Option<i32>,
}

impl Round {
    pub fn is_finished(&self) -> bool {
        self.ended_at.is_some()
    }
}

#[derive(Clone, Debug)]
pub struct NewRound {
    pub user_id: UserId,
    pub started_at: NaiveDateTime,
}

impl NewRound {
    #[must_use]
    pub fn new(user_id: UserId, started_at: NaiveDateTime) -> Self {
        Self {
            user_id,
            started_at,
        }
    }
}

/// Final numbers of a round, written together with the owner's totals.
#[derive(Clone, Debug, PartialEq)]
pub struct FinishedRound {
    pub ended_at: NaiveDateTime,
    pub earnings: i32,
    pub deliveries_completed: i32,
    pub deliveries_failed: i32,
    pub play_time: i32,
}

impl FinishedRound {
    /// Builds the summary, deriving play time in whole seconds.
    #[must_use]
    pub fn new(
        started_at: NaiveDateTime,
        ended_at: NaiveDateTime,
        earnings: i32,
        deliveries_completed: i32,
        deliveries_failed: i32,
    ) -> Self {
        let play_time = (ended_at - started_at).num_seconds().max(0);
        Self {
            ended_at,
            earnings,
            deliveries_completed,
            deliveries_failed,
            play_time: i32::try_from(play_time).unwrap_or(i32::MAX),
        }
    }
}

/// One row of the global leaderboard.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LeaderboardEntry {
    pub username: Username,
    pub score: i32,
    pub deliveries: i32,
    pub date: NaiveDateTime,
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate};

    use super::*;

    #[test]
    fn play_time_is_whole_seconds() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let end = start + Duration::milliseconds(95_900);
        let finished = FinishedRound::new(start, end, 40, 2, 1);
        assert_eq!(finished.play_time, 95);

        let clock_skew = FinishedRound::new(end, start, 0, 0, 0);
        assert_eq!(clock_skew.play_time, 0);
    }
}
