use crate::{
    input::{KeyPress, TouchTarget},
    match_controller::Notification,
};
use beach_common::{match_snapshot::MatchSnapshot, settings::SettingsPatch, team::TeamName};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Init,
    AddPoint(TeamName),
    Undo,
    Redo,
    EditSettings(SettingsPatch),
    KeyPress(KeyPress),
    Touch(TouchTarget),
    PointTimeout {
        snapshot: MatchSnapshot,
        notifications: Vec<Notification>,
    },
    Show,
    Help,
    Unknown(String),
    Quit,
}
