//! Aggregation and reporting over vote snapshots.
//!
//! Everything here is pure: each function takes a snapshot slice, builds its
//! report from scratch and returns plain serializable data. Nothing is cached
//! between calls.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::core::model::{Vote, Weekday};

/// Share of `count` over `total` as a percentage with one decimal place,
/// rounded half-away-from-zero. Returns 0.0 when `total` is zero.
pub fn percent(count: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        (count as f64 * 1000.0 / total as f64).round() / 10.0
    }
}

/// Per-day tallies shared by the winner and leaderboard builders.
///
/// Days are tracked in first-seen order: the order in which they appear in
/// the vote stream decides how tied winners are listed, so it is recorded
/// explicitly instead of being left to map iteration order.
#[derive(Debug, Default)]
pub struct VoteBoard {
    order: Vec<Weekday>,
    counts: HashMap<Weekday, u64>,
    players: HashMap<Weekday, Vec<String>>,
    total_votes: u64,
}

impl VoteBoard {
    /// Accumulate a board from votes. Every day a vote lists contributes 1
    /// to that day's count and to the grand total, so a three-day vote
    /// weighs 3. Votes with no days contribute nothing.
    pub fn build<'a, I>(votes: I) -> Self
    where
        I: IntoIterator<Item = &'a Vote>,
    {
        let mut board = VoteBoard::default();
        for vote in votes {
            for &day in &vote.days {
                if !board.counts.contains_key(&day) {
                    board.order.push(day);
                }
                *board.counts.entry(day).or_insert(0) += 1;
                board
                    .players
                    .entry(day)
                    .or_default()
                    .push(vote.name.clone());
                board.total_votes += 1;
            }
        }
        board
    }

    pub fn total_votes(&self) -> u64 {
        self.total_votes
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Winner {
    /// Days sharing the maximum count, in first-seen order. Ties are
    /// expected and listed together, not an error.
    pub winning_days: Vec<Weekday>,
    pub winning_count: u64,
    pub players: BTreeMap<Weekday, Vec<String>>,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardRow {
    pub day: Weekday,
    pub votes: u64,
    /// Blank names filtered out, remainder sorted lexicographically.
    pub players: Vec<String>,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardReport {
    pub winner: Winner,
    pub leaderboard: Vec<LeaderboardRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserSummary {
    pub vote_count: u64,
    /// Distinct days this user ever voted, in first-occurrence order.
    pub days: Vec<Weekday>,
    pub percent: f64,
}

/// The day(s) with the maximum tally. An empty board yields a zero-value
/// winner rather than an error.
pub fn build_winner(board: &VoteBoard) -> Winner {
    if board.is_empty() {
        return Winner {
            winning_days: Vec::new(),
            winning_count: 0,
            players: BTreeMap::new(),
            percent: 0.0,
        };
    }

    let max_votes = board.counts.values().copied().max().unwrap_or(0);

    let winning_days: Vec<Weekday> = board
        .order
        .iter()
        .copied()
        .filter(|day| board.counts[day] == max_votes)
        .collect();

    let players = winning_days
        .iter()
        .map(|&day| (day, board.players.get(&day).cloned().unwrap_or_default()))
        .collect();

    Winner {
        winning_days,
        winning_count: max_votes,
        players,
        percent: percent(max_votes, board.total_votes()),
    }
}

/// One row per day present on the board, sorted by votes descending and day
/// name ascending for equal counts.
pub fn build_leaderboard(board: &VoteBoard) -> Vec<LeaderboardRow> {
    let mut rows: Vec<LeaderboardRow> = Vec::new();

    for &day in &board.order {
        let votes = board.counts[&day];
        let raw = board.players.get(&day);
        if raw.map_or(true, |names| names.is_empty()) {
            tracing::warn!("no players recorded for {}", day);
        }

        // Counting and display are independent: blank names still count
        // toward `votes` but never show up in `players`.
        let mut players: Vec<String> = raw
            .into_iter()
            .flatten()
            .filter(|name| !name.trim().is_empty())
            .cloned()
            .collect();
        players.sort();

        rows.push(LeaderboardRow {
            day,
            votes,
            players,
            percent: percent(votes, board.total_votes()),
        });
    }

    rows.sort_by(|a, b| {
        b.votes
            .cmp(&a.votes)
            .then_with(|| a.day.as_str().cmp(b.day.as_str()))
    });
    rows
}

/// Winner and leaderboard computed from one shared board, so both reports
/// agree on the same totals. Returns None for an empty vote list.
pub fn summarize(votes: &[Vote]) -> Option<BoardReport> {
    if votes.is_empty() {
        return None;
    }

    let board = VoteBoard::build(votes.iter().filter(|v| v.is_active));

    Some(BoardReport {
        winner: build_winner(&board),
        leaderboard: build_leaderboard(&board),
    })
}

/// Per-user aggregates. Two passes: accumulate counts and distinct days,
/// then normalize each user's share once the grand total is known.
pub fn user_votes(votes: &[Vote]) -> BTreeMap<String, UserSummary> {
    let mut users: BTreeMap<String, UserSummary> = BTreeMap::new();

    for vote in votes {
        let entry = users.entry(vote.name.clone()).or_insert_with(|| UserSummary {
            vote_count: 0,
            days: Vec::new(),
            percent: 0.0,
        });
        entry.vote_count += vote.days.len() as u64;
        for &day in &vote.days {
            if !entry.days.contains(&day) {
                entry.days.push(day);
            }
        }
    }

    let total: u64 = users.values().map(|u| u.vote_count).sum();
    for user in users.values_mut() {
        user.percent = if total == 0 {
            0.0
        } else {
            user.vote_count as f64 / total as f64 * 100.0
        };
    }

    users
}

/// Count votes per hour of day, bucketed by the "HH" slice of the creation
/// timestamp. Timestamps too short to slice land in the "unknown" bucket;
/// the format is otherwise taken on faith.
pub fn count_hourly_activity(votes: &[Vote]) -> BTreeMap<String, u64> {
    let mut hourly: BTreeMap<String, u64> = BTreeMap::new();
    for vote in votes {
        let hour = vote.created_at.get(11..13).unwrap_or("unknown");
        *hourly.entry(hour.to_string()).or_insert(0) += 1;
    }
    hourly
}

/// Render hourly counts as proportional glyph bars. No capping: a large
/// count produces a long bar.
pub fn build_text_chart(stats: &BTreeMap<String, u64>) -> BTreeMap<String, String> {
    stats
        .iter()
        .map(|(hour, &count)| (hour.clone(), "🏓".repeat(count as usize)))
        .collect()
}

/// Non-empty note texts, in input order.
pub fn collect_notes(votes: &[Vote]) -> Vec<String> {
    votes
        .iter()
        .filter_map(|v| v.note.as_deref())
        .filter(|note| !note.is_empty())
        .map(str::to_string)
        .collect()
}
