use crate::combat::{remove_casualties, resolve_attack};
use crate::config::SimulationConfig;
use crate::economy::{try_spawn, Colony, SpawnPolicy};
use crate::entities::{Agent, AgentKind, Team};
use crate::error::SimulationError;
use crate::map::{CellState, GridWorld, Position};
use crate::pathfinding::next_step;
use crate::snapshot::WorldSnapshot;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, info, trace};
use uuid::Uuid;

/// Whether the simulation can still advance.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
pub enum Status {
    Running,
    /// All food has been eaten. Nothing changes anymore.
    Over,
}

/// What a call to [`Simulation::advance_one_cycle`] did.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CycleOutcome {
    /// A cycle was resolved and the game goes on.
    Advanced,
    /// A cycle was resolved and it ate the last food.
    Finished,
    /// The game was already over; nothing was changed.
    AlreadyOver,
}

/// All mutable state of a simulation: the grid and both colonies.
#[derive(Clone, Debug)]
pub struct WorldState {
    grid: GridWorld,
    colonies: [Colony; 2],
}

impl WorldState {
    /// Builds the world state from a grid whose colonies are both placed.
    pub fn new(grid: GridWorld) -> Result<WorldState, SimulationError> {
        let colony = |team: Team| {
            grid.colony(team)
                .map(|position| Colony::new(team, position))
                .ok_or_else(|| {
                    SimulationError::InvariantViolation(format!(
                        "the {:?} colony is not placed",
                        team
                    ))
                })
        };
        let colonies = [colony(Team::Ally)?, colony(Team::Enemy)?];

        Ok(WorldState { grid, colonies })
    }

    pub fn grid(&self) -> &GridWorld {
        &self.grid
    }

    pub fn colony(&self, team: Team) -> &Colony {
        &self.colonies[team.index()]
    }

    pub fn colonies(&self) -> &[Colony] {
        &self.colonies
    }

    /// Number of ants across both rosters.
    pub fn population(&self) -> usize {
        self.colonies.iter().map(|colony| colony.roster().len()).sum()
    }

    /// Checks that the grid and the rosters agree:
    ///
    /// * the food registry and the food cells are the same set,
    /// * every ant is alive and stands on a cell bearing its marker,
    /// * no two ants share a cell and no marker is left without an ant,
    /// * each colony cell shows its colony or an ant standing on it.
    pub fn verify(&self) -> Result<(), SimulationError> {
        let violation = |message: String| Err(SimulationError::InvariantViolation(message));

        for food in self.grid.food() {
            if self.grid.cell_at(*food) != CellState::Food {
                return violation(format!("food registered at {} is not on the grid", food));
            }
        }

        let food_cells = self
            .grid
            .cells()
            .iter()
            .filter(|state| **state == CellState::Food)
            .count();
        if food_cells != self.grid.food().len() {
            return violation(format!(
                "{} food cells but {} registered food",
                food_cells,
                self.grid.food().len()
            ));
        }

        let mut occupied = BTreeSet::new();
        for agent in self.colonies.iter().flat_map(Colony::roster) {
            if !agent.is_alive() {
                return violation(format!("dead ant {} is still in its roster", agent.id()));
            }

            if self.grid.cell_at(agent.position()) != agent.kind().marker() {
                return violation(format!(
                    "ant {} at {} is not marked on the grid",
                    agent.id(),
                    agent.position()
                ));
            }

            if !occupied.insert(agent.position()) {
                return violation(format!("two ants share {}", agent.position()));
            }
        }

        let markers = self.grid.occupied().len();
        if markers != occupied.len() {
            return violation(format!(
                "{} occupied cells for {} ants",
                markers,
                occupied.len()
            ));
        }

        for colony in &self.colonies {
            let state = self.grid.cell_at(colony.position());
            if state != colony.team().colony_cell() && !state.is_occupied() {
                return violation(format!(
                    "the {:?} colony at {} was overwritten",
                    colony.team(),
                    colony.position()
                ));
            }
        }

        Ok(())
    }

    fn pair_mut(&mut self, team: Team) -> (&mut Colony, &mut Colony) {
        let [ally, enemy] = &mut self.colonies;
        match team {
            Team::Ally => (ally, enemy),
            Team::Enemy => (enemy, ally),
        }
    }
}

/// What an ant decided to do this cycle, computed before anything moves.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Intent {
    Idle,
    Attack,
    MoveTo(Position),
}

#[derive(Clone, Copy, Debug)]
struct Plan {
    team: Team,
    index: usize,
    id: Uuid,
    intent: Intent,
}

/// The ant colony simulation.
/// Main entry point for running the game.
#[derive(Debug)]
pub struct Simulation {
    world: WorldState,
    config: SimulationConfig,
    policy: SpawnPolicy,
    status: Status,
    cycle: u64,
    rng: StdRng,
}

impl Simulation {
    /// Creates a random world seeded from `config.seed` and places one forager on each
    /// colony.
    pub fn new(config: SimulationConfig) -> Result<Simulation, SimulationError> {
        let rng = StdRng::seed_from_u64(config.seed);
        Simulation::with_rng(config, rng)
    }

    /// Same as [`Simulation::new`] but draws every random value from `rng`.
    pub fn with_rng(
        config: SimulationConfig,
        mut rng: StdRng,
    ) -> Result<Simulation, SimulationError> {
        config.validate()?;

        let grid = GridWorld::generate(&config, &mut rng)?;
        let mut simulation = Simulation::from_parts(config, WorldState::new(grid)?, rng);

        for team in Team::ALL {
            let colony = simulation.world.colony(team).position();
            simulation.spawn_agent(team, AgentKind::Forager, colony)?;
        }

        info!(
            width = simulation.config.width,
            height = simulation.config.height,
            food = simulation.config.food_count,
            obstacles = simulation.config.obstacle_count,
            seed = simulation.config.seed,
            "Simulation created"
        );

        Ok(simulation)
    }

    /// Creates a simulation from a scenario layout (see [`GridWorld::parse`]).
    ///
    /// The grid size and the food and obstacle counts come from the layout; the other
    /// options come from `config`. Only the ants written in the layout exist.
    pub fn from_layout(
        layout: &str,
        config: SimulationConfig,
    ) -> Result<Simulation, SimulationError> {
        config.validate_rules()?;

        let (grid, agents) = GridWorld::parse(layout)?;
        let config = SimulationConfig {
            width: grid.width(),
            height: grid.height(),
            food_count: grid.food().len(),
            obstacle_count: grid.obstacles().len(),
            ..config
        };

        let rng = StdRng::seed_from_u64(config.seed);
        let mut simulation = Simulation::from_parts(config, WorldState::new(grid)?, rng);

        for placed in agents {
            // The layout already marked the cell
            simulation.world.grid.set_cell(placed.position, CellState::Empty);
            simulation.spawn_agent(placed.team, placed.kind, placed.position)?;
        }

        info!(
            width = simulation.config.width,
            height = simulation.config.height,
            ants = simulation.world.population(),
            "Simulation created from layout"
        );

        Ok(simulation)
    }

    /// Places a new ant on an empty cell or on its own unoccupied colony cell.
    pub fn spawn_agent(
        &mut self,
        team: Team,
        kind: AgentKind,
        position: Position,
    ) -> Result<Uuid, SimulationError> {
        let state = self.world.grid.cell_at(position);
        if state != CellState::Empty && state != team.colony_cell() {
            return Err(SimulationError::CellUnavailable(position));
        }

        let colony = &mut self.world.colonies[team.index()];
        if colony.roster.len() >= self.policy.max_agents {
            return Err(SimulationError::RosterFull(team));
        }

        let hit_points = self.policy.hit_points(kind);
        let agent = Agent::spawn(&mut self.rng, team, kind, hit_points, position);
        let id = agent.id();
        self.world.grid.set_cell(position, kind.marker());
        colony.roster.push(agent);

        Ok(id)
    }

    /// Attempts to hatch one ant next to the team's colony, regardless of the spawn
    /// cadence. Returns the team's food bank afterwards.
    pub fn try_spawn(&mut self, team: Team) -> u32 {
        if self.status == Status::Over {
            return self.world.colony(team).food_bank();
        }

        try_spawn(
            &mut self.world.grid,
            &mut self.world.colonies[team.index()],
            &self.policy,
            &mut self.rng,
        )
    }

    pub fn set_food_bank(&mut self, team: Team, food_bank: u32) {
        self.world.colonies[team.index()].set_food_bank(food_bank);
    }

    /// Resolves one movement cycle:
    ///
    /// 1. every live ant picks an intent against the grid as it was at the start of the
    ///    cycle,
    /// 2. intents are applied one at a time, ally roster first, each roster in order;
    ///    a move only happens if its destination is still free at that moment,
    /// 3. ants killed during the cycle are removed,
    /// 4. colonies try to spawn, every `spawn_interval` cycles,
    /// 5. the game is over once no food is left.
    ///
    /// Once the game is over this returns [`CycleOutcome::AlreadyOver`] and changes
    /// nothing. An error means the engine broke one of its own invariants.
    pub fn advance_one_cycle(&mut self) -> Result<CycleOutcome, SimulationError> {
        if self.status == Status::Over {
            return Ok(CycleOutcome::AlreadyOver);
        }

        for colony in &mut self.world.colonies {
            colony.roster.iter_mut().for_each(Agent::settle);
        }

        let plans = self.plan();
        self.commit(&plans)?;
        self.remove_dead_agents();

        if self.cycle % self.config.spawn_interval == 0 {
            for team in Team::ALL {
                self.try_spawn(team);
            }
        }

        self.check_for_endgame();
        self.world.verify()?;
        self.cycle += 1;

        debug!(
            cycle = self.cycle,
            allies = self.world.colony(Team::Ally).roster().len(),
            enemies = self.world.colony(Team::Enemy).roster().len(),
            food = self.world.grid.food().len(),
            "Cycle resolved"
        );

        Ok(match self.status {
            Status::Running => CycleOutcome::Advanced,
            Status::Over => CycleOutcome::Finished,
        })
    }

    pub fn is_over(&self) -> bool {
        self.status == Status::Over
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// Number of completed movement cycles.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn world(&self) -> &WorldState {
        &self.world
    }

    pub fn grid(&self) -> &GridWorld {
        &self.world.grid
    }

    pub fn colony(&self, team: Team) -> &Colony {
        self.world.colony(team)
    }

    /// Copies the current state for a renderer.
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot::capture(&self.world.grid, &self.world.colonies, self.cycle, self.status)
    }
}

impl Simulation {
    fn from_parts(config: SimulationConfig, world: WorldState, rng: StdRng) -> Simulation {
        Simulation {
            policy: SpawnPolicy::from_config(&config),
            world,
            config,
            status: Status::Running,
            cycle: 0,
            rng,
        }
    }

    fn plan(&self) -> Vec<Plan> {
        let grid = &self.world.grid;
        let mut plans = Vec::with_capacity(self.world.population());

        for team in Team::ALL {
            let enemies: BTreeSet<Position> = self
                .world
                .colony(team.opponent())
                .live_agents()
                .map(Agent::position)
                .collect();

            for (index, agent) in self.world.colony(team).roster().iter().enumerate() {
                let intent = match agent.kind() {
                    AgentKind::Forager => next_step(grid, agent.position(), grid.food())
                        .map_or(Intent::Idle, Intent::MoveTo),
                    AgentKind::Warrior => {
                        if agent
                            .position()
                            .orthogonal()
                            .any(|neighbor| enemies.contains(&neighbor))
                        {
                            Intent::Attack
                        } else {
                            next_step(grid, agent.position(), &enemies)
                                .map_or(Intent::Idle, Intent::MoveTo)
                        }
                    }
                };

                plans.push(Plan {
                    team,
                    index,
                    id: agent.id(),
                    intent,
                });
            }
        }

        plans
    }

    fn commit(&mut self, plans: &[Plan]) -> Result<(), SimulationError> {
        for plan in plans {
            let agent = self.world.colonies[plan.team.index()]
                .roster
                .get(plan.index)
                .filter(|agent| agent.id() == plan.id)
                .ok_or_else(|| {
                    SimulationError::InvariantViolation(format!(
                        "planned ant {} is missing from the {:?} roster",
                        plan.id, plan.team
                    ))
                })?;

            // Killed earlier in this cycle
            if !agent.is_alive() {
                continue;
            }

            match plan.intent {
                Intent::Idle => {}
                Intent::Attack => self.attack(plan.team, plan.index),
                Intent::MoveTo(destination) => {
                    self.move_agent(plan.team, plan.index, destination)?
                }
            }
        }

        Ok(())
    }

    fn attack(&mut self, team: Team, index: usize) {
        let damage = self.config.damage;
        let (own, other) = self.world.pair_mut(team);

        // The enemy may have died or been out of reach since planning; the warrior then
        // simply loses its turn
        resolve_attack(&own.roster[index], &mut other.roster, &mut own.score, damage);
    }

    fn move_agent(
        &mut self,
        team: Team,
        index: usize,
        destination: Position,
    ) -> Result<(), SimulationError> {
        let grid = &mut self.world.grid;
        let colony = &mut self.world.colonies[team.index()];
        let (id, kind, from) = {
            let agent = &colony.roster[index];
            (agent.id(), agent.kind(), agent.position())
        };

        if grid.cell_at(from) != kind.marker() {
            return Err(SimulationError::InvariantViolation(format!(
                "ant {} at {} is not on the grid",
                id, from
            )));
        }

        let enterable = match grid.cell_at(destination) {
            CellState::Empty => true,
            // Only foragers eat; a warrior stepping on food would orphan it
            CellState::Food => kind == AgentKind::Forager,
            _ => false,
        };

        if !from.is_adjacent(destination) || !enterable {
            trace!(%id, x = destination.x, y = destination.y, "Move forfeited");
            return Ok(());
        }

        if grid.consume_food(destination) {
            colony.bank_food();
            debug!(?team, %id, x = destination.x, y = destination.y, "Food collected");
        }

        grid.vacate(from);
        grid.set_cell(destination, kind.marker());
        colony.roster[index].move_to(destination);

        Ok(())
    }

    fn remove_dead_agents(&mut self) {
        for colony in &mut self.world.colonies {
            let dead = remove_casualties(&mut self.world.grid, &mut colony.roster);
            for agent in dead {
                debug!(team = ?agent.team(), id = %agent.id(), "Ant removed");
            }
        }
    }

    fn check_for_endgame(&mut self) {
        if !self.world.grid.food().is_empty() {
            return;
        }

        self.status = Status::Over;

        let ally = self.world.colony(Team::Ally).score();
        let enemy = self.world.colony(Team::Enemy).score();
        info!(
            cycle = self.cycle,
            ally_food = ally.food_collected,
            ally_kills = ally.kills,
            enemy_food = enemy.food_collected,
            enemy_kills = enemy.kills,
            "Game over, all food collected"
        );
    }
}
