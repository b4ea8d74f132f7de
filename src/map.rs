use crate::config::SimulationConfig;
use crate::entities::{AgentKind, Team};
use crate::error::SimulationError;
use rand::Rng;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// A cell coordinate. `x` is the column (0 is the left edge), `y` is the row (0 is
/// the top edge).
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub const fn new(x: usize, y: usize) -> Position {
        Position { x, y }
    }

    pub fn manhattan_distance(self, other: Position) -> usize {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    pub fn is_adjacent(self, other: Position) -> bool {
        self.manhattan_distance(other) == 1
    }

    /// The orthogonal neighbors in the fixed order: left, right, up, down.
    /// Neighbors below zero are skipped; the upper edge is left to the grid.
    pub fn orthogonal(self) -> impl Iterator<Item = Position> {
        [
            self.x.checked_sub(1).map(|x| Position::new(x, self.y)),
            Some(Position::new(self.x + 1, self.y)),
            self.y.checked_sub(1).map(|y| Position::new(self.x, y)),
            Some(Position::new(self.x, self.y + 1)),
        ]
        .into_iter()
        .flatten()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// The state of a single tile.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
pub enum CellState {
    Empty,
    Food,
    Obstacle,
    AllyColony,
    EnemyColony,
    OccupiedByForager,
    OccupiedByWarrior,
}

impl CellState {
    pub fn is_occupied(self) -> bool {
        matches!(
            self,
            CellState::OccupiedByForager | CellState::OccupiedByWarrior
        )
    }

    pub fn is_colony(self) -> bool {
        matches!(self, CellState::AllyColony | CellState::EnemyColony)
    }

    /// The character used for this cell in scenario layouts.
    pub fn char(self) -> char {
        match self {
            CellState::Empty => '.',
            CellState::Food => '*',
            CellState::Obstacle => '%',
            CellState::AllyColony => '0',
            CellState::EnemyColony => '1',
            CellState::OccupiedByForager => 'f',
            CellState::OccupiedByWarrior => 'w',
        }
    }
}

/// An ant written into a scenario layout.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PlacedAgent {
    pub team: Team,
    pub kind: AgentKind,
    pub position: Position,
}

/// The tile grid together with the food registry and the colony coordinates.
#[derive(Clone, Debug)]
pub struct GridWorld {
    width: usize,
    height: usize,
    cells: Vec<CellState>,
    food: BTreeSet<Position>,
    colonies: [Option<Position>; 2],
}

impl GridWorld {
    /// Creates a grid where every cell is empty.
    pub fn new(width: usize, height: usize) -> GridWorld {
        GridWorld {
            width,
            height,
            cells: vec![CellState::Empty; width * height],
            food: BTreeSet::new(),
            colonies: [None, None],
        }
    }

    /// Builds a random world: obstacles first, then food, then the ally colony and
    /// finally the enemy colony, each on a distinct empty cell.
    pub fn generate<R: Rng + ?Sized>(
        config: &SimulationConfig,
        rng: &mut R,
    ) -> Result<GridWorld, SimulationError> {
        // Checked up front, otherwise the rejection sampling below would never end
        config.check_capacity()?;

        let mut grid = GridWorld::new(config.width, config.height);

        for _ in 0..config.obstacle_count {
            let position = grid.random_empty_cell(rng);
            grid.set_cell(position, CellState::Obstacle);
        }

        for _ in 0..config.food_count {
            let position = grid.random_empty_cell(rng);
            grid.place_food(position);
        }

        for team in Team::ALL {
            let position = grid.random_empty_cell(rng);
            grid.place_colony(team, position);
        }

        Ok(grid)
    }

    /// Parses a scenario layout.
    ///
    /// The layout declares its size with `rows` and `cols` and then lists one `m` line
    /// per row:
    ///
    /// ```text
    /// rows 3
    /// cols 4
    /// m 0.*.
    /// m .%..
    /// m f..1
    /// ```
    ///
    /// Returns the grid and the ants written in it, in reading order.
    pub fn parse(layout: &str) -> Result<(GridWorld, Vec<PlacedAgent>), SimulationError> {
        let height = Self::parse_header(layout, "rows")?;
        let width = Self::parse_header(layout, "cols")?;

        let rows: Vec<&str> = Regex::new(r"(?m)^\s*m (.*)$")
            .map_err(|e| SimulationError::Layout(e.to_string()))?
            .captures_iter(layout)
            .filter_map(|captures| captures.get(1))
            .map(|line| line.as_str().trim())
            .collect();

        if rows.len() != height {
            return Err(SimulationError::Layout(format!(
                "expected {} rows but found {}",
                height,
                rows.len()
            )));
        }

        // The declared size is only trusted once every row matches it
        for (y, line) in rows.iter().enumerate() {
            if line.chars().count() != width {
                return Err(SimulationError::Layout(format!(
                    "row {} has {} cells, expected {}",
                    y,
                    line.chars().count(),
                    width
                )));
            }
        }

        if width.checked_mul(height).is_none() {
            return Err(SimulationError::Layout(format!(
                "a {}x{} grid is too large",
                width, height
            )));
        }

        let mut grid = GridWorld::new(width, height);
        let mut agents = Vec::new();

        for (y, line) in rows.iter().enumerate() {
            for (x, value) in line.chars().enumerate() {
                let position = Position::new(x, y);
                match value {
                    '.' => {}
                    '*' => grid.place_food(position),
                    '%' => grid.set_cell(position, CellState::Obstacle),
                    '0' | '1' => {
                        let team = if value == '0' { Team::Ally } else { Team::Enemy };
                        if grid.colony(team).is_some() {
                            return Err(SimulationError::Layout(format!(
                                "more than one {:?} colony",
                                team
                            )));
                        }
                        grid.place_colony(team, position);
                    }
                    'f' | 'w' | 'F' | 'W' => {
                        let team = if value.is_ascii_lowercase() {
                            Team::Ally
                        } else {
                            Team::Enemy
                        };
                        let kind = if value.eq_ignore_ascii_case(&'f') {
                            AgentKind::Forager
                        } else {
                            AgentKind::Warrior
                        };
                        grid.set_cell(position, kind.marker());
                        agents.push(PlacedAgent {
                            team,
                            kind,
                            position,
                        });
                    }
                    _ => {
                        return Err(SimulationError::Layout(format!(
                            "invalid character {:?} at {}",
                            value, position
                        )))
                    }
                }
            }
        }

        for team in Team::ALL {
            if grid.colony(team).is_none() {
                return Err(SimulationError::Layout(format!(
                    "missing {:?} colony",
                    team
                )));
            }
        }

        Ok((grid, agents))
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_in_bounds(&self, position: Position) -> bool {
        position.x < self.width && position.y < self.height
    }

    /// The state of a cell. Anything outside the grid reads as an obstacle.
    pub fn cell_at(&self, position: Position) -> CellState {
        if !self.is_in_bounds(position) {
            return CellState::Obstacle;
        }

        self.cells[self.index(position)]
    }

    /// Overwrites a cell. Writes outside the grid are ignored.
    ///
    /// This does not maintain the food registry; use [`GridWorld::place_food`] and
    /// [`GridWorld::consume_food`] for food.
    pub fn set_cell(&mut self, position: Position, state: CellState) {
        if !self.is_in_bounds(position) {
            return;
        }

        let index = self.index(position);
        self.cells[index] = state;
    }

    /// A cell can be walked through when it is empty or holds food.
    pub fn is_passable(&self, position: Position) -> bool {
        matches!(self.cell_at(position), CellState::Empty | CellState::Food)
    }

    /// The in-bounds orthogonal neighbors in the fixed order: left, right, up, down.
    pub fn neighbors(&self, position: Position) -> Vec<Position> {
        position
            .orthogonal()
            .filter(|neighbor| self.is_in_bounds(*neighbor))
            .collect()
    }

    /// Every coordinate currently holding food.
    pub fn food(&self) -> &BTreeSet<Position> {
        &self.food
    }

    pub fn obstacles(&self) -> Vec<Position> {
        self.all(|state| state == CellState::Obstacle)
    }

    /// Every cell holding an ant marker.
    pub fn occupied(&self) -> Vec<Position> {
        self.all(CellState::is_occupied)
    }

    pub fn colony(&self, team: Team) -> Option<Position> {
        self.colonies[team.index()]
    }

    /// The cells in row-major order.
    pub fn cells(&self) -> &[CellState] {
        &self.cells
    }

    pub fn place_food(&mut self, position: Position) {
        if !self.is_in_bounds(position) {
            return;
        }

        self.set_cell(position, CellState::Food);
        self.food.insert(position);
    }

    /// Removes the food at `position` from the registry. The cell itself is left for
    /// the caller to overwrite with the ant that ate it. Returns whether food was there.
    pub fn consume_food(&mut self, position: Position) -> bool {
        self.food.remove(&position)
    }

    /// Clears an ant marker. Colony cells go back to their colony marker.
    pub fn vacate(&mut self, position: Position) {
        let state = Team::ALL
            .into_iter()
            .find(|team| self.colony(*team) == Some(position))
            .map_or(CellState::Empty, Team::colony_cell);

        self.set_cell(position, state);
    }

    /// Renders the grid in the scenario layout format.
    ///
    /// Ant markers carry no team, so every ant is written as an ally ant.
    pub fn to_layout(&self) -> String {
        let mut layout = format!("rows {}\ncols {}\n", self.height, self.width);

        for row in self.cells.chunks(self.width) {
            layout.push_str("m ");
            layout.extend(row.iter().map(|state| state.char()));
            layout.push('\n');
        }

        layout
    }

    fn place_colony(&mut self, team: Team, position: Position) {
        self.set_cell(position, team.colony_cell());
        self.colonies[team.index()] = Some(position);
    }

    fn random_empty_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> Position {
        // Terminates because the capacity was checked before placing anything
        loop {
            let position = Position::new(
                rng.gen_range(0..self.width),
                rng.gen_range(0..self.height),
            );
            if self.cell_at(position) == CellState::Empty {
                return position;
            }
        }
    }

    fn all(&self, filter: impl Fn(CellState) -> bool) -> Vec<Position> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, state)| filter(**state))
            .map(|(index, _)| Position::new(index % self.width, index / self.width))
            .collect()
    }

    fn index(&self, position: Position) -> usize {
        position.y * self.width + position.x
    }

    fn parse_header(layout: &str, name: &str) -> Result<usize, SimulationError> {
        Regex::new(&format!(r"{} (\d+)", name))
            .map_err(|e| SimulationError::Layout(e.to_string()))?
            .captures(layout)
            .and_then(|captures| captures.get(1))
            .and_then(|value| value.as_str().parse().ok())
            .filter(|value| *value > 0)
            .ok_or_else(|| SimulationError::Layout(format!("missing or invalid `{}`", name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn when_parsing_a_layout_it_is_created_with_the_correct_width_and_height() {
        let layout = "\
            rows 2
            cols 3
            m 0..
            m ..1";
        let (grid, agents) = GridWorld::parse(layout).unwrap();

        assert_eq!(grid.width(), 3);
        assert_eq!(grid.height(), 2);
        assert!(agents.is_empty());
    }

    #[test]
    fn when_getting_a_cell_the_correct_state_is_returned() {
        let layout = "\
            rows 3
            cols 3
            m 0f*
            m %.W
            m ..1";
        let (grid, agents) = GridWorld::parse(layout).unwrap();

        assert_eq!(grid.cell_at(Position::new(0, 0)), CellState::AllyColony);
        assert_eq!(grid.cell_at(Position::new(1, 0)), CellState::OccupiedByForager);
        assert_eq!(grid.cell_at(Position::new(2, 0)), CellState::Food);
        assert_eq!(grid.cell_at(Position::new(0, 1)), CellState::Obstacle);
        assert_eq!(grid.cell_at(Position::new(1, 1)), CellState::Empty);
        assert_eq!(grid.cell_at(Position::new(2, 1)), CellState::OccupiedByWarrior);
        assert_eq!(grid.cell_at(Position::new(2, 2)), CellState::EnemyColony);

        assert_eq!(
            agents,
            vec![
                PlacedAgent {
                    team: Team::Ally,
                    kind: AgentKind::Forager,
                    position: Position::new(1, 0),
                },
                PlacedAgent {
                    team: Team::Enemy,
                    kind: AgentKind::Warrior,
                    position: Position::new(2, 1),
                },
            ]
        );
    }

    #[test]
    fn when_getting_a_cell_out_of_bounds_it_reads_as_an_obstacle() {
        let grid = GridWorld::new(2, 2);

        assert_eq!(grid.cell_at(Position::new(2, 0)), CellState::Obstacle);
        assert!(!grid.is_in_bounds(Position::new(0, 2)));
        assert!(!grid.is_passable(Position::new(5, 5)));
    }

    #[test]
    fn when_checking_passability_only_empty_and_food_cells_are_passable() {
        let layout = "\
            rows 1
            cols 6
            m .*%0f1";
        let (grid, _) = GridWorld::parse(layout).unwrap();

        let passable: Vec<bool> = (0..6)
            .map(|x| grid.is_passable(Position::new(x, 0)))
            .collect();

        assert_eq!(passable, vec![true, true, false, false, false, false]);
    }

    #[test]
    fn when_parsing_a_layout_without_an_enemy_colony_an_error_is_returned() {
        let layout = "\
            rows 1
            cols 3
            m 0..";

        assert!(matches!(
            GridWorld::parse(layout),
            Err(SimulationError::Layout(_))
        ));
    }

    #[test]
    fn when_parsing_a_layout_with_two_ally_colonies_an_error_is_returned() {
        let layout = "\
            rows 1
            cols 3
            m 001";

        assert!(matches!(
            GridWorld::parse(layout),
            Err(SimulationError::Layout(_))
        ));
    }

    #[test]
    fn when_parsing_a_layout_with_a_short_row_an_error_is_returned() {
        let layout = "\
            rows 2
            cols 3
            m 0..
            m .1";

        assert!(matches!(
            GridWorld::parse(layout),
            Err(SimulationError::Layout(_))
        ));
    }

    #[test]
    fn when_parsing_a_layout_with_a_huge_declared_size_an_error_is_returned() {
        let layouts = [
            "rows 2\ncols 9223372036854775807\nm 0\nm 1",
            "rows 9223372036854775807\ncols 2\nm 01",
            "rows 1\ncols 99999999999999999999999\nm 01",
        ];

        for layout in layouts {
            assert!(matches!(
                GridWorld::parse(layout),
                Err(SimulationError::Layout(_))
            ));
        }
    }

    #[test]
    fn when_parsing_a_layout_with_an_unknown_character_an_error_is_returned() {
        let layout = "\
            rows 1
            cols 3
            m 0?1";

        assert!(matches!(
            GridWorld::parse(layout),
            Err(SimulationError::Layout(_))
        ));
    }

    #[test]
    fn when_getting_the_neighbors_of_a_middle_cell_they_are_left_right_up_down() {
        let grid = GridWorld::new(3, 3);

        assert_eq!(
            grid.neighbors(Position::new(1, 1)),
            vec![
                Position::new(0, 1),
                Position::new(2, 1),
                Position::new(1, 0),
                Position::new(1, 2),
            ]
        );
    }

    #[test]
    fn when_getting_the_neighbors_of_a_corner_cell_out_of_bounds_cells_are_skipped() {
        let grid = GridWorld::new(3, 3);

        assert_eq!(
            grid.neighbors(Position::new(0, 0)),
            vec![Position::new(1, 0), Position::new(0, 1)]
        );
        assert_eq!(
            grid.neighbors(Position::new(2, 2)),
            vec![Position::new(1, 2), Position::new(2, 1)]
        );
    }

    #[test]
    fn when_placing_and_consuming_food_the_registry_is_updated() {
        let mut grid = GridWorld::new(3, 3);
        grid.place_food(Position::new(1, 2));

        assert!(grid.food().contains(&Position::new(1, 2)));
        assert_eq!(grid.cell_at(Position::new(1, 2)), CellState::Food);

        assert!(grid.consume_food(Position::new(1, 2)));
        assert!(grid.food().is_empty());
        assert!(!grid.consume_food(Position::new(1, 2)));
    }

    #[test]
    fn when_vacating_a_colony_cell_the_colony_marker_is_restored() {
        let layout = "\
            rows 1
            cols 3
            m 0.1";
        let (mut grid, _) = GridWorld::parse(layout).unwrap();

        grid.set_cell(Position::new(0, 0), CellState::OccupiedByForager);
        grid.vacate(Position::new(0, 0));
        grid.set_cell(Position::new(1, 0), CellState::OccupiedByWarrior);
        grid.vacate(Position::new(1, 0));

        assert_eq!(grid.cell_at(Position::new(0, 0)), CellState::AllyColony);
        assert_eq!(grid.cell_at(Position::new(1, 0)), CellState::Empty);
    }

    #[test]
    fn when_generating_a_world_every_item_is_placed_on_a_distinct_cell() {
        let config = SimulationConfig::default();
        let mut rng = StdRng::seed_from_u64(3);
        let grid = GridWorld::generate(&config, &mut rng).unwrap();

        assert_eq!(grid.obstacles().len(), config.obstacle_count);
        assert_eq!(grid.food().len(), config.food_count);

        let ally = grid.colony(Team::Ally).unwrap();
        let enemy = grid.colony(Team::Enemy).unwrap();
        assert_ne!(ally, enemy);
        assert_eq!(grid.cell_at(ally), CellState::AllyColony);
        assert_eq!(grid.cell_at(enemy), CellState::EnemyColony);

        for food in grid.food() {
            assert_eq!(grid.cell_at(*food), CellState::Food);
        }
    }

    #[test]
    fn when_generating_with_the_same_seed_the_worlds_are_identical() {
        let config = SimulationConfig::default();
        let first = GridWorld::generate(&config, &mut StdRng::seed_from_u64(11)).unwrap();
        let second = GridWorld::generate(&config, &mut StdRng::seed_from_u64(11)).unwrap();

        assert_eq!(first.cells(), second.cells());
        assert_eq!(first.food(), second.food());
    }

    #[test]
    fn when_generating_a_completely_full_world_placement_still_terminates() {
        let config = SimulationConfig {
            width: 3,
            height: 2,
            food_count: 2,
            obstacle_count: 2,
            ..SimulationConfig::default()
        };
        let grid = GridWorld::generate(&config, &mut StdRng::seed_from_u64(0)).unwrap();

        assert!(!grid.cells().contains(&CellState::Empty));
    }

    #[test]
    fn when_generating_an_overfull_world_a_capacity_error_is_returned() {
        let config = SimulationConfig {
            width: 2,
            height: 2,
            food_count: 2,
            obstacle_count: 1,
            ..SimulationConfig::default()
        };

        assert!(matches!(
            GridWorld::generate(&config, &mut StdRng::seed_from_u64(0)),
            Err(SimulationError::Capacity { .. })
        ));
    }

    #[test]
    fn when_rendering_a_layout_it_can_be_parsed_back() {
        let layout = "\
            rows 2
            cols 4
            m 0*%.
            m .f.1";
        let (grid, _) = GridWorld::parse(layout).unwrap();
        let (reparsed, agents) = GridWorld::parse(&grid.to_layout()).unwrap();

        assert_eq!(reparsed.cells(), grid.cells());
        assert_eq!(agents.len(), 1);
    }
}
