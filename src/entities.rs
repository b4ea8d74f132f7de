use crate::map::{CellState, Position};
use rand::Rng;
use serde::Serialize;
use uuid::{Builder, Uuid};

/// One of the two competing colonies.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Team {
    Ally,
    Enemy,
}

impl Team {
    /// Both teams in the order their rosters are resolved.
    pub const ALL: [Team; 2] = [Team::Ally, Team::Enemy];

    pub fn index(self) -> usize {
        match self {
            Team::Ally => 0,
            Team::Enemy => 1,
        }
    }

    pub fn opponent(self) -> Team {
        match self {
            Team::Ally => Team::Enemy,
            Team::Enemy => Team::Ally,
        }
    }

    /// The cell marker of this team's colony.
    pub fn colony_cell(self) -> CellState {
        match self {
            Team::Ally => CellState::AllyColony,
            Team::Enemy => CellState::EnemyColony,
        }
    }
}

/// The species of an ant. Behavior is selected by matching on this value.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
pub enum AgentKind {
    /// Walks to the nearest food and banks it for the colony.
    Forager,
    /// Hunts and attacks ants of the other colony.
    Warrior,
}

impl AgentKind {
    /// The cell marker for a cell occupied by this kind of ant.
    pub fn marker(self) -> CellState {
        match self {
            AgentKind::Forager => CellState::OccupiedByForager,
            AgentKind::Warrior => CellState::OccupiedByWarrior,
        }
    }
}

/// A single ant.
#[derive(Clone, Debug, PartialEq)]
pub struct Agent {
    id: Uuid,
    team: Team,
    kind: AgentKind,
    hit_points: i32,
    position: Position,
    previous_position: Position,
}

impl Agent {
    /// Hit points above `i32::MAX` are capped.
    pub fn new(
        id: Uuid,
        team: Team,
        kind: AgentKind,
        hit_points: u32,
        position: Position,
    ) -> Agent {
        Agent {
            id,
            team,
            kind,
            hit_points: i32::try_from(hit_points).unwrap_or(i32::MAX),
            position,
            previous_position: position,
        }
    }

    /// Creates an ant whose id is drawn from the given RNG, so seeded runs produce the
    /// same ids every time.
    pub fn spawn<R: Rng + ?Sized>(
        rng: &mut R,
        team: Team,
        kind: AgentKind,
        hit_points: u32,
        position: Position,
    ) -> Agent {
        let id = Builder::from_random_bytes(rng.gen()).into_uuid();
        Agent::new(id, team, kind, hit_points, position)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn team(&self) -> Team {
        self.team
    }

    pub fn kind(&self) -> AgentKind {
        self.kind
    }

    pub fn hit_points(&self) -> i32 {
        self.hit_points
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// The cell the ant occupied before the last committed move.
    pub fn previous_position(&self) -> Position {
        self.previous_position
    }

    pub fn is_alive(&self) -> bool {
        self.hit_points > 0
    }

    /// Removes `damage` hit points and returns whether the ant died.
    pub fn take_damage(&mut self, damage: u32) -> bool {
        let damage = i32::try_from(damage).unwrap_or(i32::MAX);
        self.hit_points = self.hit_points.saturating_sub(damage);
        !self.is_alive()
    }

    pub(crate) fn move_to(&mut self, position: Position) {
        self.previous_position = self.position;
        self.position = position;
    }

    /// Marks the start of a cycle: an ant that does not move stays put for renderers.
    pub(crate) fn settle(&mut self) {
        self.previous_position = self.position;
    }
}
