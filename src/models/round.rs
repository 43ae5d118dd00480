//! Diesel models representing multiplayer rounds.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::round::{FinishedRound, NewRound as DomainNewRound, Round as DomainRound};
use crate::domain::types::{RoundId, TypeConstraintError, UserId};
use crate::models::user::User;

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(belongs_to(User, foreign_key = user_id))]
#[diesel(table_name = crate::schema::rounds)]
/// Diesel model for [`crate::domain::round::Round`].
pub struct Round {
    pub id: i32,
    pub user_id: i32,
    pub started_at: NaiveDateTime,
    pub ended_at: Option<NaiveDateTime>,
    pub earnings: i32,
    pub deliveries_completed: i32,
    pub deliveries_failed: i32,
    pub play_time: Option<i32>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::rounds)]
/// Insertable form of [`Round`].
pub struct NewRound {
    pub user_id: i32,
    pub started_at: NaiveDateTime,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::rounds)]
/// Columns written when a round finishes.
pub struct FinishRound {
    pub ended_at: NaiveDateTime,
    pub earnings: i32,
    pub deliveries_completed: i32,
    pub deliveries_failed: i32,
    pub play_time: i32,
}

impl TryFrom<Round> for DomainRound {
    type Error = TypeConstraintError;

    fn try_from(round: Round) -> Result<Self, Self::Error> {
        Ok(Self {
            id: RoundId::try_from(round.id)?,
            user_id: UserId::try_from(round.user_id)?,
            started_at: round.started_at,
            ended_at: round.ended_at,
            earnings: round.earnings,
            deliveries_completed: round.deliveries_completed,
            deliveries_failed: round.deliveries_failed,
            play_time: round.play_time,
        })
    }
}

impl From<&DomainNewRound> for NewRound {
    fn from(round: &DomainNewRound) -> Self {
        Self {
            user_id: round.user_id.get(),
            started_at: round.started_at,
        }
    }
}

impl From<&FinishedRound> for FinishRound {
    fn from(round: &FinishedRound) -> Self {
        Self {
            ended_at: round.ended_at,
            earnings: round.earnings,
            deliveries_completed: round.deliveries_completed,
            deliveries_failed: round.deliveries_failed,
            play_time: round.play_time,
        }
    }
}
