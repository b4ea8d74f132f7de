use crate::economy::Colony;
use crate::entities::{Agent, AgentKind, Team};
use crate::game::Status;
use crate::map::{CellState, GridWorld, Position};
use serde::Serialize;
use uuid::Uuid;

/// A read-only copy of the whole simulation, taken between cycles.
#[derive(Clone, Debug, Serialize)]
pub struct WorldSnapshot {
    /// Number of completed movement cycles.
    pub cycle: u64,
    pub status: Status,
    pub width: usize,
    pub height: usize,
    /// Cell states in row-major order.
    pub cells: Vec<CellState>,
    /// Every coordinate holding food, in ascending order.
    pub food: Vec<Position>,
    /// The ally team first, then the enemy team.
    pub teams: Vec<TeamSnapshot>,
}

impl WorldSnapshot {
    pub(crate) fn capture(
        grid: &GridWorld,
        colonies: &[Colony],
        cycle: u64,
        status: Status,
    ) -> Self {
        WorldSnapshot {
            cycle,
            status,
            width: grid.width(),
            height: grid.height(),
            cells: grid.cells().to_vec(),
            food: grid.food().iter().copied().collect(),
            teams: colonies.iter().map(TeamSnapshot::capture).collect(),
        }
    }

    pub fn cell_at(&self, position: Position) -> Option<CellState> {
        if position.x >= self.width || position.y >= self.height {
            return None;
        }

        self.cells.get(position.y * self.width + position.x).copied()
    }

    pub fn team(&self, team: Team) -> &TeamSnapshot {
        &self.teams[team.index()]
    }
}

/// Score, bank and roster of one team.
#[derive(Clone, Debug, Serialize)]
pub struct TeamSnapshot {
    pub team: Team,
    pub colony: Position,
    pub food_collected: u32,
    pub kills: u32,
    pub food_bank: u32,
    pub agents: Vec<AgentSnapshot>,
}

impl TeamSnapshot {
    fn capture(colony: &Colony) -> TeamSnapshot {
        TeamSnapshot {
            team: colony.team(),
            colony: colony.position(),
            food_collected: colony.score().food_collected,
            kills: colony.score().kills,
            food_bank: colony.food_bank(),
            agents: colony.roster().iter().map(AgentSnapshot::from).collect(),
        }
    }
}

/// One ant as seen by a renderer.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct AgentSnapshot {
    pub id: Uuid,
    pub kind: AgentKind,
    pub hit_points: i32,
    pub position: Position,
    /// Where the ant was before the last cycle. Equal to `position` if it did not move.
    pub previous_position: Position,
}

impl AgentSnapshot {
    pub fn is_moving(&self) -> bool {
        self.position != self.previous_position
    }

    /// The ant's location, in cell units, at `progress` (0 to 1) through the animation of
    /// the last cycle's move.
    pub fn interpolate(&self, progress: f32) -> (f32, f32) {
        let progress = progress.clamp(0.0, 1.0);
        let lerp = |from: usize, to: usize| from as f32 + (to as f32 - from as f32) * progress;

        (
            lerp(self.previous_position.x, self.position.x),
            lerp(self.previous_position.y, self.position.y),
        )
    }
}

impl From<&Agent> for AgentSnapshot {
    fn from(agent: &Agent) -> Self {
        AgentSnapshot {
            id: agent.id(),
            kind: agent.kind(),
            hit_points: agent.hit_points(),
            position: agent.position(),
            previous_position: agent.previous_position(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moving_agent() -> AgentSnapshot {
        AgentSnapshot {
            id: Uuid::nil(),
            kind: AgentKind::Forager,
            hit_points: 1,
            position: Position::new(3, 2),
            previous_position: Position::new(2, 2),
        }
    }

    #[test]
    fn when_interpolating_halfway_the_location_is_between_both_cells() {
        let agent = moving_agent();

        assert!(agent.is_moving());
        assert_eq!(agent.interpolate(0.0), (2.0, 2.0));
        assert_eq!(agent.interpolate(0.5), (2.5, 2.0));
        assert_eq!(agent.interpolate(1.0), (3.0, 2.0));
    }

    #[test]
    fn when_interpolating_out_of_range_the_progress_is_clamped() {
        let agent = moving_agent();

        assert_eq!(agent.interpolate(-1.0), (2.0, 2.0));
        assert_eq!(agent.interpolate(4.0), (3.0, 2.0));
    }

    #[test]
    fn when_capturing_a_grid_the_cells_and_food_are_copied() {
        let layout = "\
            rows 2
            cols 3
            m 0*.
            m .%1";
        let (grid, _) = GridWorld::parse(layout).unwrap();
        let colonies = [
            Colony::new(Team::Ally, Position::new(0, 0)),
            Colony::new(Team::Enemy, Position::new(2, 1)),
        ];

        let snapshot = WorldSnapshot::capture(&grid, &colonies, 4, Status::Running);

        assert_eq!(snapshot.cycle, 4);
        assert_eq!(snapshot.food, vec![Position::new(1, 0)]);
        assert_eq!(snapshot.cell_at(Position::new(1, 1)), Some(CellState::Obstacle));
        assert_eq!(snapshot.cell_at(Position::new(3, 0)), None);
        assert_eq!(snapshot.team(Team::Enemy).colony, Position::new(2, 1));
    }
}
