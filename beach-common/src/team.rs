use derivative::Derivative;
use enum_iterator::Sequence;
use serde::{Deserialize, Serialize};

/// The two fixed sides of a match.
#[derive(Derivative, Serialize, Deserialize, Sequence)]
#[derivative(Debug, Default, PartialEq, Eq, Hash, Clone, Copy)]
pub enum TeamName {
    #[derivative(Default)]
    #[serde(rename = "Equipe A")]
    A,
    #[serde(rename = "Equipe B")]
    B,
}

impl core::fmt::Display for TeamName {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match *self {
            Self::A => write!(f, "Equipe A"),
            Self::B => write!(f, "Equipe B"),
        }
    }
}

/// A team's state at one instant. Snapshots are values: scoring produces a new
/// one instead of mutating the old.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub struct Team {
    pub name: TeamName,
    pub score: u32,
}

impl Team {
    pub fn new(name: TeamName) -> Self {
        Self { name, score: 0 }
    }

    pub fn scored(self) -> Self {
        Self {
            score: self.score.saturating_add(1),
            ..self
        }
    }

    /// Returns `None` when the team has nothing left to take back
    pub fn unscored(self) -> Option<Self> {
        Some(Self {
            score: self.score.checked_sub(1)?,
            ..self
        })
    }
}

impl core::fmt::Display for Team {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "{} ({})", self.name, self.score)
    }
}
