use beach_common::{
    bundles::TeamBundle,
    match_snapshot::MatchSnapshot,
    results::{LastFiveGames, MatchResult},
    settings::{GameSettings, SettingsError, SettingsPatch},
    store_keys,
    team::{Team, TeamName},
};
use log::*;
use std::fmt::{Display, Formatter};
use thiserror::Error;
use tokio::{sync::watch, time::Instant};

use crate::store::{self, KeyValueStore, StoreError};

mod pending_point;
use pending_point::PendingPoint;

pub type Result<T> = std::result::Result<T, MatchControllerError>;

#[derive(Debug, Error)]
pub enum MatchControllerError {
    #[error("Settings rejected: {0}")]
    Settings(#[from] SettingsError),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Something the players need to acknowledge
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    MatchWon { team: TeamName, result: MatchResult },
}

impl Display for Notification {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MatchWon { team, result } => write!(f, "A equipe {team} venceu! ({result})"),
        }
    }
}

/// Owns the whole match: live teams, the point history used by undo/redo, the rules, the
/// recent results and the automatic point timer. All changes go through `increment`, `undo`,
/// `redo` and `update_settings`.
pub struct MatchController {
    teams: TeamBundle<Team>,
    history: Vec<Team>,
    undo_stack: Vec<Team>,
    settings: GameSettings,
    last_five_games: LastFiveGames,
    pending_point: Option<PendingPoint>,
    winner: Option<TeamName>,
    notifications: Vec<Notification>,
    store: Box<dyn KeyValueStore>,
    next_point_tx: watch::Sender<Option<Instant>>,
    next_point_rx: watch::Receiver<Option<Instant>>,
}

impl std::fmt::Debug for MatchController {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchController")
            .field("teams", &self.teams)
            .field("history", &self.history)
            .field("undo_stack", &self.undo_stack)
            .field("settings", &self.settings)
            .field("last_five_games", &self.last_five_games)
            .field("pending_point", &self.pending_point)
            .field("winner", &self.winner)
            .finish_non_exhaustive()
    }
}

impl MatchController {
    /// Creates a fresh match and loads the stored settings and results. `defaults` are used
    /// when nothing usable is stored.
    pub fn new(store: Box<dyn KeyValueStore>, defaults: GameSettings) -> Self {
        let (next_point_tx, next_point_rx) = watch::channel(None);
        let mut controller = Self {
            teams: TeamBundle::new(Team::new(TeamName::A), Team::new(TeamName::B)),
            history: Vec::new(),
            undo_stack: Vec::new(),
            settings: defaults,
            last_five_games: LastFiveGames::new(),
            pending_point: None,
            winner: None,
            notifications: Vec::new(),
            store,
            next_point_tx,
            next_point_rx,
        };
        controller.load_stored();
        controller
    }

    fn load_stored(&mut self) {
        match store::load_json::<GameSettings>(&*self.store, store_keys::GAME_SETTINGS) {
            Ok(Some(settings)) => match settings.validated() {
                Ok(settings) => {
                    info!("Loaded stored settings: {settings:?}");
                    self.settings = settings;
                }
                Err(e) => warn!("Ignoring stored settings: {e}"),
            },
            Ok(None) => info!("No stored settings, using {:?}", self.settings),
            Err(e) => warn!("Failed to read stored settings, using defaults. Error: {e}"),
        }

        match store::load_json::<LastFiveGames>(&*self.store, store_keys::LAST_FIVE_GAMES) {
            Ok(Some(games)) => {
                info!("Loaded {} recent results", games.len());
                self.last_five_games = games;
            }
            Ok(None) => {}
            Err(e) => warn!("Failed to read recent results, starting empty. Error: {e}"),
        }
    }

    #[cfg(test)]
    pub fn team(&self, name: TeamName) -> Team {
        self.teams[name]
    }

    #[cfg(test)]
    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    #[cfg(test)]
    pub fn last_five_games(&self) -> &LastFiveGames {
        &self.last_five_games
    }

    #[cfg(test)]
    pub fn history(&self) -> &[Team] {
        &self.history
    }

    #[cfg(test)]
    pub fn undo_stack(&self) -> &[Team] {
        &self.undo_stack
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Fires with the due time of the automatic point whenever it is scheduled or cancelled
    pub fn get_next_point_rx(&self) -> watch::Receiver<Option<Instant>> {
        self.next_point_rx.clone()
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    /// Awards a point to the live team called `name`
    pub fn add_point(&mut self, name: TeamName, now: Instant) -> Team {
        self.increment(self.teams[name], now)
    }

    /// Scores one point on top of `team` and makes the result the live state of that team.
    /// Any undone points are forgotten.
    pub fn increment(&mut self, team: Team, now: Instant) -> Team {
        let updated = self.apply_point(team, now);
        if !self.undo_stack.is_empty() {
            debug!("Discarding {} undone points", self.undo_stack.len());
            self.undo_stack.clear();
        }
        updated
    }

    fn apply_point(&mut self, team: Team, now: Instant) -> Team {
        let updated = team.scored();
        self.history.push(updated);
        self.teams[updated.name] = updated;
        info!("{} Point for {}", self.status_string(), updated.name);

        if self.settings.is_winning_score(updated.score) {
            self.cancel_pending_point();
            self.record_win(updated.name);
        } else if let Some(delay) = self.settings.auto_point_delay() {
            self.schedule_point(PendingPoint::new(updated, now + delay));
        } else {
            self.cancel_pending_point();
        }

        updated
    }

    fn record_win(&mut self, team: TeamName) {
        let result = MatchResult::new(self.scores());
        info!("{} {team} won, result {result}", self.status_string());

        self.winner = Some(team);
        self.notifications
            .push(Notification::MatchWon { team, result });
        self.last_five_games.push(result);
        if let Err(e) = store::save_json(
            &mut *self.store,
            store_keys::LAST_FIVE_GAMES,
            &self.last_five_games,
        ) {
            error!("Failed to store recent results: {e}");
        }
    }

    /// Takes back the most recent point. The snapshot leaves the history for the undo stack,
    /// so the two never hold the same entry. Returns `false` if there was nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(last) = self.history.pop() else {
            debug!("Nothing to undo");
            return false;
        };
        self.cancel_pending_point();

        let restored = last.unscored().unwrap_or(Team::new(last.name));
        self.teams[restored.name] = restored;
        self.undo_stack.push(last);
        if self
            .winner
            .is_some_and(|w| !self.settings.is_winning_score(self.teams[w].score))
        {
            self.winner = None;
        }

        info!("{} Undid point for {}", self.status_string(), restored.name);
        true
    }

    /// Scores the most recently undone point again, with the same win and timer handling as a
    /// fresh point. Points undone before it stay available. Returns `false` if there was
    /// nothing to redo.
    pub fn redo(&mut self, now: Instant) -> bool {
        let Some(team) = self.undo_stack.pop() else {
            debug!("Nothing to redo");
            return false;
        };
        self.cancel_pending_point();

        info!("{} Redoing point for {}", self.status_string(), team.name);
        // The stack holds the state after the undone point, so replay from one point below
        self.apply_point(team.unscored().unwrap_or(Team::new(team.name)), now);
        true
    }

    /// Merges raw form values into the settings and stores the result. Invalid values leave
    /// the settings untouched.
    pub fn update_settings(&mut self, patch: &SettingsPatch) -> Result<()> {
        let settings = self.settings.apply(patch).map_err(|e| {
            warn!("Rejected settings change {patch:?}: {e}");
            e
        })?;

        self.cancel_pending_point();
        if settings != self.settings {
            info!("Settings changed to {settings:?}");
            self.settings = settings;
        }
        self.persist_settings()
    }

    fn persist_settings(&mut self) -> Result<()> {
        store::save_json(&mut *self.store, store_keys::GAME_SETTINGS, &self.settings).map_err(
            |e| {
                error!("Failed to store settings: {e}");
                e.into()
            },
        )
    }

    fn schedule_point(&mut self, pending: PendingPoint) {
        debug!(
            "Next automatic point for {} scheduled at {:?}",
            pending.team().name,
            pending.due()
        );
        self.next_point_tx.send_replace(Some(pending.due()));
        self.pending_point = Some(pending);
    }

    fn cancel_pending_point(&mut self) {
        if let Some(pending) = self.pending_point.take() {
            debug!("Cancelled automatic point for {}", pending.team().name);
            self.next_point_tx.send_replace(None);
        }
    }

    #[cfg(test)]
    pub fn next_update_time(&self) -> Option<Instant> {
        self.pending_point.as_ref().map(PendingPoint::due)
    }

    /// Awards every automatic point that is due at `now`. Returns `true` if any point was
    /// awarded.
    pub fn update(&mut self, now: Instant) -> bool {
        let mut awarded = false;
        while let Some(pending) = self.pending_point.take_if(|p| p.is_due(now)) {
            info!(
                "{} Time ran out, awarding point to {}",
                self.status_string(),
                pending.team().name
            );
            // Chained points are timed from when the previous one was due
            self.increment(pending.team(), pending.due());
            awarded = true;
        }
        if awarded && self.pending_point.is_none() {
            self.next_point_tx.send_replace(None);
        }
        awarded
    }

    pub fn scores(&self) -> TeamBundle<u32> {
        TeamBundle::new(self.teams.a.score, self.teams.b.score)
    }

    pub fn generate_snapshot(&self, now: Instant) -> MatchSnapshot {
        MatchSnapshot {
            teams: self.teams,
            settings: self.settings.clone(),
            last_five_games: self.last_five_games.clone(),
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
            pending_point: self.pending_point.as_ref().map(|p| p.as_snapshot(now)),
            winner: self.winner,
        }
    }

    fn status_string(&self) -> String {
        format!(
            "[{} {} x {} {}]",
            TeamName::A,
            self.teams.a.score,
            self.teams.b.score,
            TeamName::B
        )
    }
}
