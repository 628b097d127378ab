use game_types::{GameResult, LeaderboardEntry, PlayerId};
use std::cmp::Ordering;
use std::collections::HashMap;

pub const UNKNOWN_DISPLAY_NAME: &str = "Unknown";

pub struct LeaderboardRanker;

impl LeaderboardRanker {
    /// Rank every result using standard competition ranking.
    ///
    /// Display order is score descending, then earlier completion first.
    /// Equal scores share a rank; the next distinct score's rank is one more
    /// than the number of entries ahead of it. The output depends only on the
    /// set of results, never on the order they were read in.
    pub fn rank(
        results: &[GameResult],
        display_names: &HashMap<PlayerId, String>,
    ) -> Vec<LeaderboardEntry> {
        let mut ordered: Vec<&GameResult> = results.iter().collect();
        ordered.sort_by(|a, b| display_order(a, b));

        let mut entries: Vec<LeaderboardEntry> = Vec::with_capacity(ordered.len());
        for (index, result) in ordered.into_iter().enumerate() {
            let rank = match entries.last() {
                Some(previous) if previous.final_score == result.final_score => previous.rank,
                _ => index as u32 + 1,
            };

            entries.push(LeaderboardEntry {
                rank,
                player_id: result.player_id,
                display_name: display_names
                    .get(&result.player_id)
                    .cloned()
                    .unwrap_or_else(|| UNKNOWN_DISPLAY_NAME.to_string()),
                final_score: result.final_score,
                completed_at: result.completed_at,
            });
        }

        entries
    }

    /// Rank only each player's best result (earliest completion wins a tie).
    pub fn rank_best_per_player(
        results: &[GameResult],
        display_names: &HashMap<PlayerId, String>,
    ) -> Vec<LeaderboardEntry> {
        let mut best: HashMap<PlayerId, &GameResult> = HashMap::new();
        for result in results {
            best.entry(result.player_id)
                .and_modify(|current| {
                    if display_order(result, current) == Ordering::Less {
                        *current = result;
                    }
                })
                .or_insert(result);
        }

        let collapsed: Vec<GameResult> = best.into_values().cloned().collect();
        Self::rank(&collapsed, display_names)
    }

    /// Keep the first `limit` entries. Ranks are assigned before truncation.
    pub fn top(mut entries: Vec<LeaderboardEntry>, limit: usize) -> Vec<LeaderboardEntry> {
        entries.truncate(limit);
        entries
    }

    pub fn rank_of(entries: &[LeaderboardEntry], player_id: PlayerId) -> Option<u32> {
        entries
            .iter()
            .find(|entry| entry.player_id == player_id)
            .map(|entry| entry.rank)
    }
}

fn display_order(a: &GameResult, b: &GameResult) -> Ordering {
    b.final_score
        .cmp(&a.final_score)
        .then_with(|| a.completed_at.cmp(&b.completed_at))
        // Total order so identical score and time still sort the same way every run
        .then_with(|| a.player_id.cmp(&b.player_id))
        .then_with(|| a.game_date.cmp(&b.game_date))
}
