use crate::error::SimulationError;
use serde::{Deserialize, Serialize};

/// Upper bound for hit points and damage, which are stored as signed values.
const MAX_HIT_POINTS: u32 = i32::MAX as u32;

/// Options accepted when building a [`Simulation`](crate::Simulation).
///
/// Missing fields fall back to the defaults: a 24x17 grid with 40 food, 24 obstacles
/// and up to 30 ants per colony.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of columns in the grid.
    pub width: usize,
    /// Number of rows in the grid.
    pub height: usize,
    /// Food items placed at startup. Food never respawns.
    pub food_count: usize,
    /// Obstacles placed at startup.
    pub obstacle_count: usize,
    /// Maximum roster size per colony.
    pub max_agents_per_team: usize,
    /// Spawning is attempted every `spawn_interval` movement cycles.
    pub spawn_interval: u64,
    /// Hit points a warrior removes per attack.
    pub damage: u32,
    /// Starting hit points of a warrior.
    pub warrior_hit_points: u32,
    /// Starting hit points of a forager.
    pub forager_hit_points: u32,
    /// Probability that a spawned ant is a forager rather than a warrior.
    pub forager_chance: f64,
    /// Seed for the random number generator.
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            width: 24,
            height: 17,
            food_count: 40,
            obstacle_count: 24,
            max_agents_per_team: 30,
            spawn_interval: 3,
            damage: 1,
            warrior_hit_points: 3,
            forager_hit_points: 1,
            forager_chance: 0.6,
            seed: 0,
        }
    }
}

impl SimulationConfig {
    /// Reads a configuration from a JSON object. Absent keys keep their default value.
    pub fn from_json(contents: &str) -> Result<SimulationConfig, SimulationError> {
        let config: SimulationConfig = serde_json::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every option, including whether the grid can hold everything that is
    /// placed at startup.
    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.width == 0 || self.height == 0 {
            return Err(SimulationError::InvalidConfig(
                "grid dimensions must be positive",
            ));
        }

        self.validate_rules()?;
        self.check_capacity()
    }

    /// Checks the options that do not depend on the grid size. Used when the grid comes
    /// from a scenario layout instead of being generated.
    pub fn validate_rules(&self) -> Result<(), SimulationError> {
        if self.spawn_interval == 0 {
            return Err(SimulationError::InvalidConfig(
                "spawn interval must be positive",
            ));
        }

        if self.max_agents_per_team == 0 {
            return Err(SimulationError::InvalidConfig(
                "each colony must allow at least one ant",
            ));
        }

        if !(1..=MAX_HIT_POINTS).contains(&self.damage) {
            return Err(SimulationError::InvalidConfig(
                "damage must be between 1 and 2147483647",
            ));
        }

        if !(1..=MAX_HIT_POINTS).contains(&self.warrior_hit_points)
            || !(1..=MAX_HIT_POINTS).contains(&self.forager_hit_points)
        {
            return Err(SimulationError::InvalidConfig(
                "hit points must be between 1 and 2147483647",
            ));
        }

        if !(0.0..=1.0).contains(&self.forager_chance) {
            return Err(SimulationError::InvalidConfig(
                "forager chance must be between 0 and 1",
            ));
        }

        Ok(())
    }

    /// Obstacles, food and the two colonies must fit in distinct cells.
    pub fn check_capacity(&self) -> Result<(), SimulationError> {
        let requested = self
            .obstacle_count
            .checked_add(self.food_count)
            .and_then(|count| count.checked_add(2))
            .ok_or(SimulationError::InvalidConfig(
                "food and obstacle counts are too large",
            ))?;
        let available = self
            .width
            .checked_mul(self.height)
            .ok_or(SimulationError::InvalidConfig("grid dimensions are too large"))?;

        if requested > available {
            return Err(SimulationError::Capacity {
                requested,
                available,
            });
        }

        Ok(())
    }
}
