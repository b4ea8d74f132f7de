//! # colony_engine
//!
//! A deterministic, tick-based simulation of two ant colonies competing for food on a
//! grid. Foragers collect food that the colony spends on new ants, warriors hunt the
//! other colony's ants, and the game ends once every piece of food has been eaten.
//!
//! ```no_run
//! use colony_engine::{Simulation, SimulationConfig};
//!
//! let mut simulation = Simulation::new(SimulationConfig::default())?;
//! while !simulation.is_over() {
//!     simulation.advance_one_cycle()?;
//! }
//! let snapshot = simulation.snapshot();
//! # Ok::<(), colony_engine::SimulationError>(())
//! ```

pub mod combat;
pub mod config;
pub mod economy;
pub mod entities;
pub mod error;
pub mod game;
pub mod map;
pub mod pathfinding;
pub mod snapshot;

pub use combat::{remove_casualties, resolve_attack, AttackOutcome};
pub use config::SimulationConfig;
pub use economy::{try_spawn, Colony, KindDistribution, Score, SpawnPolicy};
pub use entities::{Agent, AgentKind, Team};
pub use error::SimulationError;
pub use game::{CycleOutcome, Simulation, Status, WorldState};
pub use map::{CellState, GridWorld, PlacedAgent, Position};
pub use pathfinding::next_step;
pub use snapshot::{AgentSnapshot, TeamSnapshot, WorldSnapshot};
