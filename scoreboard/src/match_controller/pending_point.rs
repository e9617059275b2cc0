use beach_common::{match_snapshot::PendingPointSnapshot, team::Team};
use tokio::time::{Duration, Instant};

/// An automatic point waiting for its delay to run out. Dropping it cancels the point.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingPoint {
    team: Team,
    due: Instant,
}

impl PendingPoint {
    pub fn new(team: Team, due: Instant) -> Self {
        Self { team, due }
    }

    /// The snapshot the point will be awarded on top of
    pub fn team(&self) -> Team {
        self.team
    }

    pub fn due(&self) -> Instant {
        self.due
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.due
    }

    /// Returns `None` if the point is already due
    pub fn time_remaining(&self, now: Instant) -> Option<Duration> {
        self.due
            .checked_duration_since(now)
            .filter(|remaining| !remaining.is_zero())
    }

    pub fn as_snapshot(&self, now: Instant) -> PendingPointSnapshot {
        let secs_remaining = self
            .time_remaining(now)
            .map_or(0, |dur| dur.as_secs_f32().ceil() as u32);
        PendingPointSnapshot {
            team: self.team.name,
            secs_remaining,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use beach_common::team::TeamName;

    #[test]
    fn test_time_remaining() {
        let start = Instant::now();
        let team = Team::new(TeamName::A).scored();
        let pending = PendingPoint::new(team, start + Duration::from_secs(90));

        assert!(!pending.is_due(start));
        assert_eq!(pending.time_remaining(start), Some(Duration::from_secs(90)));
        assert_eq!(
            pending
                .as_snapshot(start + Duration::from_millis(500))
                .secs_remaining,
            90
        );
        assert_eq!(
            pending.as_snapshot(start + Duration::from_secs(89)).secs_remaining,
            1
        );

        let due = start + Duration::from_secs(90);
        assert!(pending.is_due(due));
        assert_eq!(pending.time_remaining(due), None);
        assert_eq!(pending.as_snapshot(due + Duration::from_secs(3)).secs_remaining, 0);
        assert_eq!(pending.team(), team);
    }
}
