use crate::{
    bundles::TeamBundle,
    results::LastFiveGames,
    settings::GameSettings,
    team::{Team, TeamName},
};

/// Everything a renderer needs to draw the scoreboard at one instant.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct MatchSnapshot {
    pub teams: TeamBundle<Team>,
    pub settings: GameSettings,
    pub last_five_games: LastFiveGames,
    pub can_undo: bool,
    pub can_redo: bool,
    pub pending_point: Option<PendingPointSnapshot>,
    pub winner: Option<TeamName>,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct PendingPointSnapshot {
    pub team: TeamName,
    pub secs_remaining: u32,
}

impl MatchSnapshot {
    pub fn scores(&self) -> TeamBundle<u32> {
        TeamBundle::new(self.teams.a.score, self.teams.b.score)
    }
}

impl core::fmt::Display for PendingPointSnapshot {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let mins = self.secs_remaining / 60;
        let secs = self.secs_remaining % 60;
        write!(f, "{} +1 in {mins}:{secs:02}", self.team)
    }
}
