use crate::{bundles::TeamBundle, team::TeamName};
use arrayvec::ArrayVec;
use log::*;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

pub const MAX_RECENT_RESULTS: usize = 5;

/// Final score of a finished match, written as `"<scoreA> x <scoreB>"`
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MatchResult {
    pub scores: TeamBundle<u32>,
}

impl MatchResult {
    pub fn new(scores: TeamBundle<u32>) -> Self {
        Self { scores }
    }
}

impl Display for MatchResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} x {}",
            self.scores[TeamName::A],
            self.scores[TeamName::B]
        )
    }
}

/// The most recent finished matches, oldest first. Entries are kept as the exact strings that
/// get stored, so entries written by other front ends survive a load/save cycle untouched.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct LastFiveGames {
    games: ArrayVec<String, MAX_RECENT_RESULTS>,
}

impl LastFiveGames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a result, evicting the oldest one when full
    pub fn push(&mut self, result: impl Display) {
        if self.games.is_full() {
            let evicted = self.games.remove(0);
            debug!("Dropping oldest result {evicted}");
        }
        self.games.push(result.to_string());
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.games.iter().map(String::as_str)
    }

    pub fn last(&self) -> Option<&str> {
        self.games.last().map(String::as_str)
    }
}

impl From<Vec<String>> for LastFiveGames {
    fn from(games: Vec<String>) -> Self {
        let mut list = Self::new();
        if games.len() > MAX_RECENT_RESULTS {
            warn!(
                "Stored results list has {} entries, keeping the newest {MAX_RECENT_RESULTS}",
                games.len()
            );
        }
        for game in games {
            list.push(game);
        }
        list
    }
}

impl From<LastFiveGames> for Vec<String> {
    fn from(list: LastFiveGames) -> Self {
        list.games.into_iter().collect()
    }
}
