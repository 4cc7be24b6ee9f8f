use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::dice::Dice;
use crate::state::Direction;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum Cell {
    Empty,
    Grass,
    Center,
    Trainer,
    Mart,
}

impl Cell {
    /// Maps one uniform roll onto the cumulative generation table.
    pub fn from_roll(roll: f64) -> Self {
        if roll < 0.10 {
            Cell::Grass
        } else if roll < 0.15 {
            Cell::Center
        } else if roll < 0.20 {
            Cell::Trainer
        } else if roll < 0.25 {
            Cell::Mart
        } else {
            Cell::Empty
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Position {
    pub row: u16,
    pub col: u16,
}

impl Position {
    pub const fn new(row: u16, col: u16) -> Self {
        Self { row, col }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Grid {
    pub rows: u16,
    pub cols: u16,
    pub cells: Vec<Cell>,
}

pub const ROUTE_START: Position = Position::new(3, 3);

impl Grid {
    pub fn filled(rows: u16, cols: u16, cell: Cell) -> Self {
        Self {
            rows,
            cols,
            cells: vec![cell; rows as usize * cols as usize],
        }
    }

    /// The hand-made 6x6 route a new game starts on.
    pub fn starting_route() -> Self {
        let mut grid = Self::filled(6, 6, Cell::Empty);
        for (row, col) in [(1, 1), (1, 2), (1, 3), (2, 1), (3, 2), (4, 3)] {
            grid.set(Position::new(row, col), Cell::Grass);
        }
        grid.set(Position::new(0, 5), Cell::Center);
        grid.set(Position::new(2, 5), Cell::Trainer);
        grid.set(Position::new(4, 0), Cell::Trainer);
        grid.set(Position::new(5, 5), Cell::Mart);
        grid
    }

    /// Rolls every cell independently, then forces a center and a mart if
    /// none came up. The forced mart never lands on a center.
    pub fn generate(dice: &mut impl Dice, rows: u16, cols: u16) -> Self {
        let mut grid = Self {
            rows,
            cols,
            cells: (0..rows as usize * cols as usize)
                .map(|_| Cell::from_roll(dice.roll()))
                .collect(),
        };

        if grid.count(Cell::Center) == 0 && !grid.cells.is_empty() {
            let row = dice.pick(rows as usize) as u16;
            let col = dice.pick(cols as usize) as u16;
            grid.set(Position::new(row, col), Cell::Center);
        }

        if grid.count(Cell::Mart) == 0 {
            let candidates: Vec<usize> = grid
                .cells
                .iter()
                .enumerate()
                .filter(|(_, cell)| **cell != Cell::Center)
                .map(|(idx, _)| idx)
                .collect();
            if !candidates.is_empty() {
                let idx = candidates[dice.pick(candidates.len())];
                grid.cells[idx] = Cell::Mart;
            }
        }

        grid
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    pub fn cell(&self, pos: Position) -> Option<Cell> {
        if !self.contains(pos) {
            return None;
        }
        self.cells.get(self.index(pos)).copied()
    }

    pub fn set(&mut self, pos: Position, cell: Cell) {
        if self.contains(pos) {
            let idx = self.index(pos);
            self.cells[idx] = cell;
        }
    }

    /// Neighbor in `direction`, or `None` when it would leave the grid.
    pub fn step(&self, from: Position, direction: Direction) -> Option<Position> {
        let (row, col) = match direction {
            Direction::Up => (from.row.checked_sub(1)?, from.col),
            Direction::Down => (from.row.checked_add(1)?, from.col),
            Direction::Left => (from.row, from.col.checked_sub(1)?),
            Direction::Right => (from.row, from.col.checked_add(1)?),
        };
        let next = Position::new(row, col);
        self.contains(next).then_some(next)
    }

    pub fn count(&self, cell: Cell) -> usize {
        self.cells.iter().filter(|c| **c == cell).count()
    }

    /// First cell of a kind in row-major order.
    pub fn first(&self, cell: Cell) -> Option<Position> {
        self.positions(cell).next()
    }

    pub fn positions(&self, cell: Cell) -> impl Iterator<Item = Position> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(move |(_, c)| **c == cell)
            .map(|(idx, _)| self.position(idx))
    }

    /// Ordinal of a trainer cell among all trainer cells, row-major.
    pub fn trainer_slot(&self, pos: Position) -> Option<usize> {
        self.positions(Cell::Trainer).position(|p| p == pos)
    }

    fn index(&self, pos: Position) -> usize {
        pos.row as usize * self.cols as usize + pos.col as usize
    }

    fn position(&self, idx: usize) -> Position {
        let cols = self.cols.max(1) as usize;
        Position::new((idx / cols) as u16, (idx % cols) as u16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::scripted::ScriptedDice;
    use crate::dice::SeededDice;

    #[test]
    fn roll_table_boundaries() {
        assert_eq!(Cell::from_roll(0.0), Cell::Grass);
        assert_eq!(Cell::from_roll(0.0999), Cell::Grass);
        assert_eq!(Cell::from_roll(0.10), Cell::Center);
        assert_eq!(Cell::from_roll(0.15), Cell::Trainer);
        assert_eq!(Cell::from_roll(0.20), Cell::Mart);
        assert_eq!(Cell::from_roll(0.25), Cell::Empty);
        assert_eq!(Cell::from_roll(0.999), Cell::Empty);
    }

    #[test]
    fn all_empty_rolls_force_one_center_and_one_mart() {
        let mut dice = ScriptedDice::always_roll(0.30, 100).picks([4, 7, 0]);
        let grid = Grid::generate(&mut dice, 10, 10);
        assert_eq!(grid.count(Cell::Center), 1);
        assert_eq!(grid.count(Cell::Mart), 1);
        assert_eq!(grid.count(Cell::Empty), 98);
        assert_eq!(grid.cell(Position::new(4, 7)), Some(Cell::Center));
        // Candidate 0 is (0, 0); the center is elsewhere.
        assert_eq!(grid.cell(Position::new(0, 0)), Some(Cell::Mart));
    }

    #[test]
    fn forced_mart_skips_the_forced_center() {
        let mut dice = ScriptedDice::always_roll(0.30, 4).picks([0, 0, 0]);
        let grid = Grid::generate(&mut dice, 2, 2);
        assert_eq!(grid.cell(Position::new(0, 0)), Some(Cell::Center));
        assert_eq!(grid.cell(Position::new(0, 1)), Some(Cell::Mart));
    }

    #[test]
    fn generated_grids_always_have_center_and_mart() {
        let mut dice = SeededDice::new(2024);
        for _ in 0..200 {
            let grid = Grid::generate(&mut dice, 6, 6);
            assert!(grid.count(Cell::Center) >= 1);
            assert!(grid.count(Cell::Mart) >= 1);
            assert_eq!(grid.cells.len(), 36);
        }
    }

    #[test]
    fn step_rejects_leaving_the_grid() {
        let grid = Grid::starting_route();
        assert_eq!(grid.step(Position::new(0, 0), Direction::Up), None);
        assert_eq!(grid.step(Position::new(0, 0), Direction::Left), None);
        assert_eq!(grid.step(Position::new(5, 5), Direction::Down), None);
        assert_eq!(grid.step(Position::new(5, 5), Direction::Right), None);
        assert_eq!(
            grid.step(Position::new(3, 3), Direction::Up),
            Some(Position::new(2, 3))
        );
    }

    #[test]
    fn starting_route_layout() {
        let grid = Grid::starting_route();
        assert_eq!(grid.first(Cell::Center), Some(Position::new(0, 5)));
        assert_eq!(grid.count(Cell::Grass), 6);
        assert_eq!(grid.cell(ROUTE_START), Some(Cell::Empty));
        assert_eq!(grid.trainer_slot(Position::new(2, 5)), Some(0));
        assert_eq!(grid.trainer_slot(Position::new(4, 0)), Some(1));
        assert_eq!(grid.trainer_slot(Position::new(1, 1)), None);
    }
}
