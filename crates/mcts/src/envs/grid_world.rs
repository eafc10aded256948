//! Deterministic frozen-lake-style grid world.
//!
//! An agent walks a rectangular grid of tiles: it starts on `S`, frozen
//! tiles `F` are safe, holes `H` end the episode with no reward, and the
//! goal `G` ends it with reward 1.0. Moves that would leave the grid stay
//! in place. States are flat cell indices, row-major from the top-left.

use std::fmt;

use planner_core::{Environment, PlannerError, Result, Transition};

/// One cell of the grid.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Tile {
    Start,
    Frozen,
    Hole,
    Goal,
}

impl Tile {
    fn from_char(c: char) -> Option<Tile> {
        match c {
            'S' => Some(Tile::Start),
            'F' => Some(Tile::Frozen),
            'H' => Some(Tile::Hole),
            'G' => Some(Tile::Goal),
            _ => None,
        }
    }

    /// Whether entering this tile ends the episode.
    pub fn is_terminal(self) -> bool {
        matches!(self, Tile::Hole | Tile::Goal)
    }
}

/// A movement action. The index order (left, down, right, up) matches the
/// reference grid-world convention.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Move {
    Left,
    Down,
    Right,
    Up,
}

impl Move {
    /// All moves, in index order.
    pub const ALL: [Move; 4] = [Move::Left, Move::Down, Move::Right, Move::Up];

    /// Flat index of this move.
    pub fn index(self) -> usize {
        match self {
            Move::Left => 0,
            Move::Down => 1,
            Move::Right => 2,
            Move::Up => 3,
        }
    }

    /// Move for a flat index, if valid.
    pub fn from_index(index: usize) -> Option<Move> {
        Move::ALL.get(index).copied()
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Move::Left => "left",
            Move::Down => "down",
            Move::Right => "right",
            Move::Up => "up",
        };
        write!(f, "{name}")
    }
}

/// Deterministic grid-world environment.
///
/// Carries its own current position, mutated by `step` and `set_state`,
/// exactly like the simulators the planner is built against.
#[derive(Clone, Debug)]
pub struct GridWorld {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
    start: usize,
    position: usize,
}

impl GridWorld {
    /// Build a grid from row strings of `S`/`F`/`H`/`G` characters.
    ///
    /// # Errors
    /// Rejects empty maps, ragged rows, unknown characters, and maps
    /// without exactly one start tile.
    pub fn from_map(rows: &[&str]) -> Result<Self> {
        if rows.is_empty() || rows[0].is_empty() {
            return Err(PlannerError::InvalidState("empty map".into()));
        }

        let width = rows[0].chars().count();
        let mut tiles = Vec::with_capacity(width * rows.len());
        for row in rows {
            if row.chars().count() != width {
                return Err(PlannerError::InvalidState(format!(
                    "ragged map row {row:?}"
                )));
            }
            for c in row.chars() {
                let tile = Tile::from_char(c).ok_or_else(|| {
                    PlannerError::InvalidState(format!("unknown tile {c:?}"))
                })?;
                tiles.push(tile);
            }
        }

        let starts: Vec<usize> = tiles
            .iter()
            .enumerate()
            .filter(|(_, t)| **t == Tile::Start)
            .map(|(i, _)| i)
            .collect();
        let start = match starts.as_slice() {
            [cell] => *cell,
            _ => {
                return Err(PlannerError::InvalidState(format!(
                    "map must have exactly one start tile, found {}",
                    starts.len()
                )))
            }
        };

        Ok(Self {
            width,
            height: rows.len(),
            tiles,
            start,
            position: start,
        })
    }

    /// The classic 4x4 map with four holes.
    pub fn four_by_four() -> Self {
        Self::from_map(&["SFFF", "FHFH", "FFFH", "HFFG"])
            .expect("BUG: builtin map failed to parse")
    }

    /// Tile at a flat cell index.
    ///
    /// # Panics
    /// Panics if the cell is outside the grid.
    pub fn tile(&self, cell: usize) -> Tile {
        self.tiles[cell]
    }

    /// Number of cells in the grid.
    pub fn num_cells(&self) -> usize {
        self.tiles.len()
    }

    fn check_cell(&self, cell: usize) -> Result<()> {
        if cell < self.tiles.len() {
            Ok(())
        } else {
            Err(PlannerError::InvalidState(format!(
                "cell {cell} is outside the {}x{} grid",
                self.height, self.width
            )))
        }
    }
}

impl Environment for GridWorld {
    type State = usize;
    type Action = Move;

    fn legal_actions(&self, state: &usize) -> Vec<Move> {
        match self.tiles.get(*state) {
            Some(tile) if !tile.is_terminal() => Move::ALL.to_vec(),
            _ => Vec::new(),
        }
    }

    fn step(&mut self, state: &usize, action: Move) -> Result<Transition<usize>> {
        let cell = *state;
        self.check_cell(cell)?;
        if self.tiles[cell].is_terminal() {
            return Err(PlannerError::InvalidAction(format!(
                "cannot step from terminal cell {cell}"
            )));
        }

        let (row, col) = (cell / self.width, cell % self.width);
        let (row, col) = match action {
            Move::Left => (row, col.saturating_sub(1)),
            Move::Down => ((row + 1).min(self.height - 1), col),
            Move::Right => (row, (col + 1).min(self.width - 1)),
            Move::Up => (row.saturating_sub(1), col),
        };
        let next = row * self.width + col;
        let tile = self.tiles[next];

        self.position = next;
        Ok(Transition {
            state: next,
            reward: if tile == Tile::Goal { 1.0 } else { 0.0 },
            terminated: tile.is_terminal(),
        })
    }

    fn reset(&mut self) -> usize {
        self.position = self.start;
        self.start
    }

    fn set_state(&mut self, state: &usize) -> Result<()> {
        self.check_cell(*state)?;
        self.position = *state;
        Ok(())
    }
}
