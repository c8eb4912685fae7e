//! Rank assignment for leaderboard snapshots.
//!
//! Ranks are dense and 1-based: for N entries the rank set is exactly
//! {1, 2, ..., N}, with score non-increasing as rank increases. Ties are
//! broken by user id ascending, so the same inputs always produce the
//! same snapshot regardless of source ordering.

use questline_types::UserId;

/// A user with a computed score, before ranking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredUser {
    /// The scored user.
    pub user_id: UserId,
    /// Display name snapshot.
    pub user_name: String,
    /// Avatar URL snapshot.
    pub user_image: Option<String>,
    /// The metric value.
    pub score: i64,
}

/// A scored user with an assigned rank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedUser {
    /// The ranked user.
    pub user_id: UserId,
    /// Display name snapshot.
    pub user_name: String,
    /// Avatar URL snapshot.
    pub user_image: Option<String>,
    /// The metric value.
    pub score: i64,
    /// Dense 1-based rank.
    pub rank: u32,
}

/// Sort by score descending, ties broken by user id ascending, and
/// assign dense ranks.
pub fn rank_descending(mut entries: Vec<ScoredUser>) -> Vec<RankedUser> {
    entries.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.user_id.cmp(&b.user_id)));
    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| RankedUser {
            user_id: entry.user_id,
            user_name: entry.user_name,
            user_image: entry.user_image,
            score: entry.score,
            rank: u32::try_from(index.saturating_add(1)).unwrap_or(u32::MAX),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(name: &str, score: i64) -> ScoredUser {
        ScoredUser {
            user_id: UserId::new(),
            user_name: String::from(name),
            user_image: None,
            score,
        }
    }

    #[test]
    fn ranks_are_dense_and_one_based() {
        let ranked = rank_descending(vec![
            scored("a", 10),
            scored("b", 30),
            scored("c", 20),
            scored("d", 5),
        ]);
        let ranks: Vec<u32> = ranked.iter().map(|e| e.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4]);
    }

    #[test]
    fn scores_are_non_increasing_as_rank_increases() {
        let ranked = rank_descending(vec![
            scored("a", 7),
            scored("b", 7),
            scored("c", 100),
            scored("d", 0),
        ]);
        let mut previous = i64::MAX;
        for entry in &ranked {
            assert!(entry.score <= previous);
            previous = entry.score;
        }
    }

    #[test]
    fn ties_break_by_user_id_regardless_of_input_order() {
        let low_id = UserId::from(uuid::Uuid::from_u128(1));
        let high_id = UserId::from(uuid::Uuid::from_u128(2));
        let entry = |user_id: UserId, name: &str| ScoredUser {
            user_id,
            user_name: String::from(name),
            user_image: None,
            score: 50,
        };

        let forward = rank_descending(vec![entry(low_id, "low"), entry(high_id, "high")]);
        let reversed = rank_descending(vec![entry(high_id, "high"), entry(low_id, "low")]);

        let ids = |ranked: &[RankedUser]| ranked.iter().map(|e| e.user_id).collect::<Vec<_>>();
        assert_eq!(ids(&forward), vec![low_id, high_id]);
        assert_eq!(ids(&forward), ids(&reversed));
    }

    #[test]
    fn empty_input_ranks_to_empty() {
        assert!(rank_descending(Vec::new()).is_empty());
    }
}
