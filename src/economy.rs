use crate::config::SimulationConfig;
use crate::entities::{Agent, AgentKind, Team};
use crate::map::{CellState, GridWorld, Position};
use rand::distributions::Distribution;
use rand::Rng;
use serde::Serialize;
use tracing::debug;

/// Score counters of a colony.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Score {
    pub food_collected: u32,
    pub kills: u32,
}

/// A team's colony: its fixed location, its ants, its score and its food bank.
#[derive(Clone, Debug)]
pub struct Colony {
    team: Team,
    position: Position,
    pub(crate) roster: Vec<Agent>,
    pub(crate) score: Score,
    pub(crate) food_bank: u32,
}

impl Colony {
    pub fn new(team: Team, position: Position) -> Colony {
        Colony {
            team,
            position,
            roster: Vec::new(),
            score: Score::default(),
            food_bank: 0,
        }
    }

    pub fn team(&self) -> Team {
        self.team
    }

    /// The colony cell. Fixed for the whole game.
    pub fn position(&self) -> Position {
        self.position
    }

    pub fn roster(&self) -> &[Agent] {
        &self.roster
    }

    pub fn score(&self) -> Score {
        self.score
    }

    /// Food available to spend on new ants.
    pub fn food_bank(&self) -> u32 {
        self.food_bank
    }

    pub fn set_food_bank(&mut self, food_bank: u32) {
        self.food_bank = food_bank;
    }

    pub fn live_agents(&self) -> impl Iterator<Item = &Agent> {
        self.roster.iter().filter(|agent| agent.is_alive())
    }

    /// Credits one unit of food to the score and the bank.
    pub(crate) fn bank_food(&mut self) {
        self.score.food_collected += 1;
        self.food_bank += 1;
    }
}

/// Picks the kind of a newly spawned ant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KindDistribution {
    forager_chance: f64,
}

impl KindDistribution {
    /// `forager_chance` is clamped into `[0, 1]`.
    pub fn new(forager_chance: f64) -> KindDistribution {
        KindDistribution {
            forager_chance: forager_chance.clamp(0.0, 1.0),
        }
    }
}

impl Distribution<AgentKind> for KindDistribution {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> AgentKind {
        if rng.gen_bool(self.forager_chance) {
            AgentKind::Forager
        } else {
            AgentKind::Warrior
        }
    }
}

/// The rules that govern spawning.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnPolicy {
    pub max_agents: usize,
    pub kinds: KindDistribution,
    pub forager_hit_points: u32,
    pub warrior_hit_points: u32,
}

impl SpawnPolicy {
    pub fn from_config(config: &SimulationConfig) -> SpawnPolicy {
        SpawnPolicy {
            max_agents: config.max_agents_per_team,
            kinds: KindDistribution::new(config.forager_chance),
            forager_hit_points: config.forager_hit_points,
            warrior_hit_points: config.warrior_hit_points,
        }
    }

    pub fn hit_points(&self, kind: AgentKind) -> u32 {
        match kind {
            AgentKind::Forager => self.forager_hit_points,
            AgentKind::Warrior => self.warrior_hit_points,
        }
    }
}

/// Spends one unit of food to hatch an ant next to the colony.
///
/// Nothing happens when the bank is empty, when the roster is full or when every
/// neighbor of the colony is taken; in the last case the food stays in the bank and
/// the spawn is simply retried at the next spawn cycle. Otherwise the first empty
/// neighbor (left, right, up, down) receives an ant whose kind is drawn from the
/// policy. Returns the colony's food bank after the attempt.
pub fn try_spawn<R: Rng + ?Sized>(
    grid: &mut GridWorld,
    colony: &mut Colony,
    policy: &SpawnPolicy,
    rng: &mut R,
) -> u32 {
    if colony.food_bank == 0 || colony.roster.len() >= policy.max_agents {
        return colony.food_bank;
    }

    // Food cells are passable but an ant hatched on one would orphan the food
    let Some(cell) = grid
        .neighbors(colony.position)
        .into_iter()
        .find(|neighbor| grid.cell_at(*neighbor) == CellState::Empty)
    else {
        debug!(team = ?colony.team, "Spawn deferred, colony is surrounded");
        return colony.food_bank;
    };

    let kind = policy.kinds.sample(rng);
    let agent = Agent::spawn(rng, colony.team, kind, policy.hit_points(kind), cell);
    grid.set_cell(cell, kind.marker());

    debug!(team = ?colony.team, id = %agent.id(), ?kind, x = cell.x, y = cell.y, "Ant spawned");

    colony.roster.push(agent);
    colony.food_bank -= 1;
    colony.food_bank
}
