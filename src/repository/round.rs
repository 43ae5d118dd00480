//! Repository implementation for multiplayer rounds and the leaderboard.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::round::{FinishedRound, LeaderboardEntry, NewRound, Round};
use crate::domain::types::{RoundId, Username};
use crate::models::round::{FinishRound as DbFinishRound, NewRound as DbNewRound, Round as DbRound};
use crate::models::user::User as DbUser;
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, RoundReader, RoundWriter};

impl RoundReader for DieselRepository {
    fn get_round_by_id(&self, id: RoundId) -> RepositoryResult<Option<Round>> {
        use crate::schema::rounds;

        let mut conn = self.conn()?;
        let db_round = rounds::table
            .filter(rounds::id.eq(id.get()))
            .first::<DbRound>(&mut conn)
            .optional()?;

        db_round
            .map(|db_round| Round::try_from(db_round).map_err(RepositoryError::from))
            .transpose()
    }

    fn list_leaderboard(&self, limit: usize) -> RepositoryResult<Vec<LeaderboardEntry>> {
        use crate::schema::{rounds, users};

        let mut conn = self.conn()?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let rows = rounds::table
            .inner_join(users::table)
            .filter(rounds::ended_at.is_not_null())
            .filter(rounds::earnings.gt(0))
            .order((
                rounds::earnings.desc(),
                rounds::ended_at.asc(),
                rounds::id.asc(),
            ))
            .limit(limit)
            .select((
                users::username,
                rounds::earnings,
                rounds::deliveries_completed,
                rounds::ended_at,
            ))
            .load::<(String, i32, i32, Option<NaiveDateTime>)>(&mut conn)?;

        rows.into_iter()
            .map(
                |(username, score, deliveries, ended_at)| -> RepositoryResult<LeaderboardEntry> {
                    let date = ended_at.ok_or_else(|| {
                        RepositoryError::Unexpected("finished round without end time".to_string())
                    })?;
                    Ok(LeaderboardEntry {
                        username: Username::new(username)?,
                        score,
                        deliveries,
                        date,
                    })
                },
            )
            .collect()
    }
}

impl RoundWriter for DieselRepository {
    fn create_round(&self, new_round: &NewRound) -> RepositoryResult<Round> {
        use crate::schema::rounds;

        let mut conn = self.conn()?;
        let db_new_round: DbNewRound = new_round.into();

        let db_round = diesel::insert_into(rounds::table)
            .values(&db_new_round)
            .get_result::<DbRound>(&mut conn)?;

        Round::try_from(db_round).map_err(RepositoryError::from)
    }

    fn finish_round(&self, id: RoundId, finished: &FinishedRound) -> RepositoryResult<Round> {
        use crate::schema::{rounds, users};

        let mut conn = self.conn()?;
        let changes: DbFinishRound = finished.into();

        let db_round = conn.transaction::<DbRound, diesel::result::Error, _>(|conn| {
            // Only open rounds can be finished; a closed one reads as not found.
            let db_round = diesel::update(
                rounds::table
                    .filter(rounds::id.eq(id.get()))
                    .filter(rounds::ended_at.is_null()),
            )
            .set(&changes)
            .get_result::<DbRound>(conn)?;

            let owner = users::table
                .filter(users::id.eq(db_round.user_id))
                .first::<DbUser>(conn)?;

            diesel::update(users::table.filter(users::id.eq(owner.id)))
                .set((
                    users::total_earnings.eq(owner.total_earnings + changes.earnings),
                    users::total_deliveries
                        .eq(owner.total_deliveries + changes.deliveries_completed),
                    users::best_session_score
                        .eq(owner.best_session_score.max(changes.earnings)),
                ))
                .execute(conn)?;

            Ok(db_round)
        })?;

        Round::try_from(db_round).map_err(RepositoryError::from)
    }
}
