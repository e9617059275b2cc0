pub mod team;

pub mod bundles;

pub mod settings;

pub mod results;

pub mod match_snapshot;

pub mod store_keys {
    pub const GAME_SETTINGS: &str = "gameSettings";
    pub const LAST_FIVE_GAMES: &str = "lastFiveGames";
}
