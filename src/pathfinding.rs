use crate::map::{GridWorld, Position};
use std::collections::{BTreeSet, VecDeque};

/// Returns the cell an ant at `start` should step to in order to approach the
/// nearest of `targets`.
///
/// The search is breadth-first over the four orthogonal neighbors, explored left,
/// right, up, down, so ties between equally short paths always resolve the same way.
/// Only passable cells (empty or food) are walked through, but a target is
/// recognised as soon as it is a neighbor, whatever its cell state. That lets
/// warriors path next to an enemy ant and foragers path onto a food cell with the
/// same search.
///
/// * `Some(start)` when `start` is itself a target.
/// * `Some(target)` when a target is directly adjacent to `start`.
/// * `Some(step)`, the first cell of a shortest path, otherwise.
/// * `None` when `targets` is empty or none can be reached.
///
/// Food cells count as passable for everyone, but only foragers may step onto
/// them. A warrior whose only route runs through food keeps getting that food
/// cell as its step, and stalls behind it until a forager eats it.
pub fn next_step(
    grid: &GridWorld,
    start: Position,
    targets: &BTreeSet<Position>,
) -> Option<Position> {
    if targets.is_empty() {
        return None;
    }

    if targets.contains(&start) {
        return Some(start);
    }

    let mut visited = vec![false; grid.width() * grid.height()];
    let index = |position: Position| position.y * grid.width() + position.x;

    if grid.is_in_bounds(start) {
        visited[index(start)] = true;
    }

    // Each entry carries the first step taken from `start` to reach it
    let mut queue: VecDeque<(Position, Option<Position>)> = VecDeque::new();
    queue.push_back((start, None));

    while let Some((current, first_step)) = queue.pop_front() {
        for neighbor in grid.neighbors(current) {
            if targets.contains(&neighbor) {
                return Some(first_step.unwrap_or(neighbor));
            }

            if !grid.is_passable(neighbor) || visited[index(neighbor)] {
                continue;
            }

            visited[index(neighbor)] = true;
            queue.push_back((neighbor, first_step.or(Some(neighbor))));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn targets(positions: &[(usize, usize)]) -> BTreeSet<Position> {
        positions
            .iter()
            .map(|(x, y)| Position::new(*x, *y))
            .collect()
    }

    #[test]
    fn when_there_are_no_targets_no_step_is_returned() {
        let grid = GridWorld::new(3, 3);

        assert_eq!(next_step(&grid, Position::new(1, 1), &BTreeSet::new()), None);
    }

    #[test]
    fn when_the_start_is_a_target_the_start_is_returned() {
        let grid = GridWorld::new(3, 3);

        assert_eq!(
            next_step(&grid, Position::new(1, 1), &targets(&[(1, 1), (0, 0)])),
            Some(Position::new(1, 1))
        );
    }

    #[test]
    fn when_a_target_is_adjacent_the_target_itself_is_returned() {
        let layout = "\
            rows 3
            cols 3
            m 0..
            m .f*
            m ..1";
        let (grid, _) = GridWorld::parse(layout).unwrap();

        assert_eq!(
            next_step(&grid, Position::new(1, 1), grid.food()),
            Some(Position::new(2, 1))
        );
    }

    #[test]
    fn when_the_target_is_an_occupied_cell_the_step_stops_next_to_it() {
        let layout = "\
            rows 1
            cols 6
            m 0w..W1";
        let (grid, _) = GridWorld::parse(layout).unwrap();

        assert_eq!(
            next_step(&grid, Position::new(1, 0), &targets(&[(4, 0)])),
            Some(Position::new(2, 0))
        );
        // Once next to the enemy the returned step is the enemy cell, which is never
        // passable, so the caller will not move onto it
        assert_eq!(
            next_step(&grid, Position::new(3, 0), &targets(&[(4, 0)])),
            Some(Position::new(4, 0))
        );
    }

    #[test]
    fn when_a_target_is_far_away_the_first_step_of_the_shortest_path_is_returned() {
        let layout = "\
            rows 3
            cols 5
            m 0.%..
            m f.%.*
            m ....1";
        let (grid, _) = GridWorld::parse(layout).unwrap();

        // The wall forces the path along the bottom row
        assert_eq!(
            next_step(&grid, Position::new(0, 1), grid.food()),
            Some(Position::new(1, 1))
        );
        assert_eq!(
            next_step(&grid, Position::new(1, 1), grid.food()),
            Some(Position::new(1, 2))
        );
    }

    #[test]
    fn when_several_shortest_paths_exist_ties_are_broken_left_right_up_down() {
        let grid = GridWorld::new(5, 5);

        // Target diagonally down-left: left and down are both on a shortest path
        assert_eq!(
            next_step(&grid, Position::new(2, 2), &targets(&[(0, 4)])),
            Some(Position::new(1, 2))
        );
        // Target diagonally down-right: right comes before down
        assert_eq!(
            next_step(&grid, Position::new(2, 2), &targets(&[(4, 4)])),
            Some(Position::new(3, 2))
        );
        // Target diagonally up-right: right comes before up
        assert_eq!(
            next_step(&grid, Position::new(2, 2), &targets(&[(4, 0)])),
            Some(Position::new(3, 2))
        );
        // Target straight up
        assert_eq!(
            next_step(&grid, Position::new(2, 2), &targets(&[(2, 0)])),
            Some(Position::new(2, 1))
        );
    }

    #[test]
    fn when_the_nearest_target_is_chosen_farther_ones_are_ignored() {
        let grid = GridWorld::new(7, 1);

        assert_eq!(
            next_step(&grid, Position::new(3, 0), &targets(&[(0, 0), (5, 0)])),
            Some(Position::new(4, 0))
        );
    }

    #[test]
    fn when_every_target_is_walled_off_no_step_is_returned() {
        let layout = "\
            rows 3
            cols 5
            m 0.%..
            m f.%.*
            m ..%.1";
        let (grid, _) = GridWorld::parse(layout).unwrap();

        assert_eq!(next_step(&grid, Position::new(0, 1), grid.food()), None);
    }

    #[test]
    fn when_the_start_is_boxed_in_no_step_is_returned() {
        let layout = "\
            rows 3
            cols 3
            m 0%*
            m %f%
            m *%1";
        let (grid, _) = GridWorld::parse(layout).unwrap();

        assert_eq!(next_step(&grid, Position::new(1, 1), grid.food()), None);
    }

    #[test]
    fn when_a_one_wide_corridor_holds_food_the_step_is_the_food_cell() {
        let layout = "\
            rows 2
            cols 5
            m 0w*.W
            m %%%%1";
        let (grid, _) = GridWorld::parse(layout).unwrap();

        // The engine refuses this step to a warrior, which then waits behind the food
        assert_eq!(
            next_step(&grid, Position::new(1, 0), &targets(&[(4, 0)])),
            Some(Position::new(2, 0))
        );
    }

    #[test]
    fn when_searching_the_grid_is_not_mutated() {
        let layout = "\
            rows 3
            cols 4
            m 0...
            m f.%.
            m ..*1";
        let (grid, _) = GridWorld::parse(layout).unwrap();
        let before = grid.cells().to_vec();

        next_step(&grid, Position::new(0, 1), grid.food());

        assert_eq!(grid.cells(), before.as_slice());
    }
}
