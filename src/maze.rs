use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::error::{MazeError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    /// Candidate order before shuffling.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// `(row, column)` offset of one step in this direction.
    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Right => (0, 1),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub row: usize,
    pub column: usize,
}

impl Cell {
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

/// A grid of cells plus the passages carved between them.
///
/// `verticals[r][c]` is the passage between `(r, c)` and `(r, c + 1)`,
/// `horizontals[r][c]` the one between `(r, c)` and `(r + 1, c)`.
/// `true` means open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Maze {
    rows: usize,
    columns: usize,
    grid: Vec<Vec<bool>>,
    verticals: Vec<Vec<bool>>,
    horizontals: Vec<Vec<bool>>,
}

impl Maze {
    fn closed(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            grid: vec![vec![false; columns]; rows],
            verticals: vec![vec![false; columns - 1]; rows],
            horizontals: vec![vec![false; columns]; rows - 1],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn grid(&self) -> &[Vec<bool>] {
        &self.grid
    }

    pub fn verticals(&self) -> &[Vec<bool>] {
        &self.verticals
    }

    pub fn horizontals(&self) -> &[Vec<bool>] {
        &self.horizontals
    }

    pub fn is_visited(&self, cell: Cell) -> bool {
        self.grid[cell.row][cell.column]
    }

    /// The adjacent cell in `dir`, if it lies inside the grid.
    pub fn neighbor(&self, cell: Cell, dir: Direction) -> Option<Cell> {
        let (dr, dc) = dir.delta();
        let row = cell.row.checked_add_signed(dr)?;
        let column = cell.column.checked_add_signed(dc)?;
        if row >= self.rows || column >= self.columns {
            return None;
        }
        Some(Cell { row, column })
    }

    pub fn is_open(&self, cell: Cell, dir: Direction) -> bool {
        if self.neighbor(cell, dir).is_none() {
            return false;
        }
        let Cell { row, column } = cell;
        match dir {
            Direction::Left => self.verticals[row][column - 1],
            Direction::Right => self.verticals[row][column],
            Direction::Up => self.horizontals[row - 1][column],
            Direction::Down => self.horizontals[row][column],
        }
    }

    fn open(&mut self, cell: Cell, dir: Direction) {
        let Cell { row, column } = cell;
        match dir {
            Direction::Left => self.verticals[row][column - 1] = true,
            Direction::Right => self.verticals[row][column] = true,
            Direction::Up => self.horizontals[row - 1][column] = true,
            Direction::Down => self.horizontals[row][column] = true,
        }
    }

    pub fn open_passages(&self) -> usize {
        self.verticals
            .iter()
            .chain(self.horizontals.iter())
            .flat_map(|row| row.iter())
            .filter(|&&open| open)
            .count()
    }

    /// Every open passage as the pair of cells it joins.
    pub fn passages(&self) -> impl Iterator<Item = (Cell, Cell)> + '_ {
        let across = self.verticals.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, &open)| open)
                .map(move |(c, _)| (Cell::new(r, c), Cell::new(r, c + 1)))
        });
        let down = self.horizontals.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, &open)| open)
                .map(move |(c, _)| (Cell::new(r, c), Cell::new(r + 1, c)))
        });
        across.chain(down)
    }
}

/// One pending `visit` call: the cell, its shuffled moves and how many of
/// them have been tried.
struct Frame {
    cell: Cell,
    moves: [Direction; 4],
    next: usize,
}

/// Carve a perfect maze by randomized depth-first search.
///
/// Runs on an explicit stack of frames, so the carving order and the
/// sequence of random draws match the recursive formulation exactly while
/// depth is bounded only by the heap.
pub fn generate(rows: usize, columns: usize, rng: &mut impl Rng) -> Result<Maze> {
    if rows == 0 || columns == 0 {
        return Err(MazeError::InvalidDimensions { rows, columns });
    }

    let mut maze = Maze::closed(rows, columns);
    let start = Cell {
        row: rng.gen_range(0..rows),
        column: rng.gen_range(0..columns),
    };
    debug!(rows, columns, ?start, "carving maze");

    let mut stack = Vec::new();
    enter(&mut maze, start, rng, &mut stack);

    while let Some(frame) = stack.last_mut() {
        if frame.next == frame.moves.len() {
            stack.pop();
            continue;
        }
        let dir = frame.moves[frame.next];
        frame.next += 1;
        let cell = frame.cell;

        let Some(target) = maze.neighbor(cell, dir) else {
            continue;
        };
        if maze.is_visited(target) {
            continue;
        }
        maze.open(cell, dir);
        enter(&mut maze, target, rng, &mut stack);
    }

    Ok(maze)
}

fn enter(maze: &mut Maze, cell: Cell, rng: &mut impl Rng, stack: &mut Vec<Frame>) {
    if maze.is_visited(cell) {
        return;
    }
    maze.grid[cell.row][cell.column] = true;

    let mut moves = Direction::ALL;
    moves.shuffle(rng);
    stack.push(Frame {
        cell,
        moves,
        next: 0,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Straight recursive carving, kept as the reference the stack version
    /// must reproduce.
    fn generate_recursive(rows: usize, columns: usize, rng: &mut StdRng) -> Maze {
        fn visit(maze: &mut Maze, cell: Cell, rng: &mut StdRng) {
            if maze.is_visited(cell) {
                return;
            }
            maze.grid[cell.row][cell.column] = true;
            let mut moves = Direction::ALL;
            moves.shuffle(rng);
            for dir in moves {
                let Some(target) = maze.neighbor(cell, dir) else {
                    continue;
                };
                if maze.is_visited(target) {
                    continue;
                }
                maze.open(cell, dir);
                visit(maze, target, rng);
            }
        }

        let mut maze = Maze::closed(rows, columns);
        let start = Cell {
            row: rng.gen_range(0..rows),
            column: rng.gen_range(0..columns),
        };
        visit(&mut maze, start, rng);
        maze
    }

    #[test]
    fn single_cell_has_no_passages() {
        let mut rng = StdRng::seed_from_u64(1);
        let maze = generate(1, 1, &mut rng).unwrap();
        assert!(maze.is_visited(Cell::new(0, 0)));
        assert_eq!(maze.open_passages(), 0);
        assert_eq!(maze.verticals().len(), 1);
        assert!(maze.verticals()[0].is_empty());
        assert!(maze.horizontals().is_empty());
    }

    #[test]
    fn two_by_two_leaves_one_edge_closed() {
        for seed in 0..32 {
            let mut rng = StdRng::seed_from_u64(seed);
            let maze = generate(2, 2, &mut rng).unwrap();
            assert_eq!(maze.open_passages(), 3);
            let closed = maze
                .verticals()
                .iter()
                .chain(maze.horizontals().iter())
                .flatten()
                .filter(|&&open| !open)
                .count();
            assert_eq!(closed, 1);
        }
    }

    #[test]
    fn arrays_have_intended_shapes() {
        let mut rng = StdRng::seed_from_u64(7);
        let maze = generate(7, 9, &mut rng).unwrap();
        assert_eq!(maze.grid().len(), 7);
        assert!(maze.grid().iter().all(|row| row.len() == 9));
        assert_eq!(maze.verticals().len(), 7);
        assert!(maze.verticals().iter().all(|row| row.len() == 8));
        assert_eq!(maze.horizontals().len(), 6);
        assert!(maze.horizontals().iter().all(|row| row.len() == 9));
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            generate(0, 4, &mut rng),
            Err(MazeError::InvalidDimensions { rows: 0, columns: 4 })
        ));
        assert!(matches!(
            generate(3, 0, &mut rng),
            Err(MazeError::InvalidDimensions { rows: 3, columns: 0 })
        ));
    }

    #[test]
    fn same_seed_same_maze() {
        let a = generate(12, 17, &mut StdRng::seed_from_u64(42)).unwrap();
        let b = generate(12, 17, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn stack_matches_recursion() {
        for (rows, columns) in [(1, 1), (1, 6), (5, 1), (4, 4), (7, 9), (13, 8)] {
            for seed in 0..8 {
                let stacked = generate(rows, columns, &mut StdRng::seed_from_u64(seed)).unwrap();
                let recursive = generate_recursive(rows, columns, &mut StdRng::seed_from_u64(seed));
                assert_eq!(stacked, recursive, "{rows}x{columns} seed {seed}");
            }
        }
    }

    #[test]
    fn long_corridor_does_not_overflow() {
        let mut rng = StdRng::seed_from_u64(3);
        let maze = generate(1, 200_000, &mut rng).unwrap();
        assert_eq!(maze.open_passages(), 199_999);
    }

    #[test]
    fn is_open_agrees_from_both_sides() {
        let maze = generate(6, 6, &mut StdRng::seed_from_u64(11)).unwrap();
        for (a, b) in maze.passages() {
            let dir = if a.row == b.row {
                Direction::Right
            } else {
                Direction::Down
            };
            let back = if dir == Direction::Right {
                Direction::Left
            } else {
                Direction::Up
            };
            assert!(maze.is_open(a, dir));
            assert!(maze.is_open(b, back));
        }
        assert!(!maze.is_open(Cell::new(0, 0), Direction::Up));
        assert!(!maze.is_open(Cell::new(0, 0), Direction::Left));
    }
}
