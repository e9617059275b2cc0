use crate::team::TeamName;
use core::ops::{Index, IndexMut};
use derivative::Derivative;
use serde::{Deserialize, Serialize};

#[derive(Derivative, Serialize, Deserialize)]
#[derivative(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeamBundle<T> {
    pub a: T,
    pub b: T,
}

impl<T> TeamBundle<T> {
    pub fn new(a: T, b: T) -> Self {
        Self { a, b }
    }
}

impl<T> Index<TeamName> for TeamBundle<T> {
    type Output = T;

    fn index(&self, name: TeamName) -> &Self::Output {
        match name {
            TeamName::A => &self.a,
            TeamName::B => &self.b,
        }
    }
}

impl<T> IndexMut<TeamName> for TeamBundle<T> {
    fn index_mut(&mut self, name: TeamName) -> &mut Self::Output {
        match name {
            TeamName::A => &mut self.a,
            TeamName::B => &mut self.b,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_index() {
        let mut bundle = TeamBundle::new(1u32, 4);
        assert_eq!(bundle[TeamName::A], 1);
        assert_eq!(bundle[TeamName::B], 4);

        bundle[TeamName::B] += 1;
        assert_eq!(bundle, TeamBundle::new(1, 5));
    }
}
