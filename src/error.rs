use crate::entities::Team;
use crate::map::Position;
use thiserror::Error;

/// Errors produced by the simulation core.
///
/// Everything except [`SimulationError::InvariantViolation`] can only happen while a
/// simulation is being built. Once running, the only failure is an internal bug.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// More obstacles, food and colonies were requested than the grid has cells.
    #[error("cannot place {requested} items on a grid with {available} cells")]
    Capacity { requested: usize, available: usize },

    /// A configuration value is out of its valid range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),

    /// The JSON configuration could not be decoded.
    #[error("malformed configuration: {0}")]
    ConfigFormat(#[from] serde_json::Error),

    /// The scenario layout could not be parsed.
    #[error("invalid layout: {0}")]
    Layout(String),

    /// An agent was requested on a cell it cannot occupy.
    #[error("cell {0} is not available for a new agent")]
    CellUnavailable(Position),

    /// A colony already has as many ants as it may hold.
    #[error("the {0:?} roster is full")]
    RosterFull(Team),

    /// The world state is inconsistent. Always a bug in the engine.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}
