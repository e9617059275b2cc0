use beach_common::settings::GameSettings;
use derivative::Derivative;
use enum_derive_2018::EnumDisplay;
use macro_attr_2018::macro_attr;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Storage {
    /// Where stored settings and results live, default is platform dependent
    pub data_dir: Option<PathBuf>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub touch_undo: TouchUndo,
    /// Rules used until a settings change has been stored
    pub defaults: GameSettings,
    pub storage: Storage,
}

// Which touches take back the last point
macro_attr! {
    #[derive(Debug, Clone, Copy, Derivative, PartialEq, Eq, Serialize, Deserialize, EnumDisplay!)]
    #[derivative(Default)]
    pub enum TouchUndo {
        #[derivative(Default)]
        UndoControl,
        WholeSurface,
    }
}
