use crate::domain::round::LeaderboardEntry;
use crate::repository::RoundReader;
use crate::services::ServiceResult;

/// Top finished rounds for the global leaderboard.
pub fn top_rounds<R>(repo: &R, limit: usize) -> ServiceResult<Vec<LeaderboardEntry>>
where
    R: RoundReader + ?Sized,
{
    Ok(repo.list_leaderboard(limit)?)
}

/// Like [`top_rounds`] but logs failures and degrades to an empty board.
pub fn top_rounds_or_empty<R>(repo: &R, limit: usize) -> Vec<LeaderboardEntry>
where
    R: RoundReader + ?Sized,
{
    top_rounds(repo, limit).unwrap_or_else(|err| {
        log::error!("Failed to load leaderboard: {err}");
        Vec::new()
    })
}
